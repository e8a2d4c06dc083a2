//! 主机会话：接纳两名玩家并主持回合循环
//!
//! 回合严格串行：同一时刻只从执子方的连接读取一条消息，
//! 因此任何时候至多有一手棋在处理中，规则引擎无需加锁。

use protocol::{
    Connection, Listener, MatchOutcome, Mark, Message, ProtocolError, Result, RulesEngine,
};
use tracing::{debug, info, warn};

use crate::config::HostConfig;

/// 主机会话结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostExit {
    /// 分出胜负或和棋
    Finished(MatchOutcome),
    /// 某方掉线，整局终止
    PeerLost(Mark),
}

/// 一次回合读取的结果
enum TurnInput {
    Message(Message),
    /// 无法解析的一行
    Malformed(ProtocolError),
    Lost(Mark),
}

/// 主机会话
pub struct HostSession<C> {
    engine: RulesEngine,
    /// X 方连接（先接入）
    player_x: C,
    /// O 方连接（后接入）
    player_o: C,
    config: HostConfig,
}

impl<C: Connection> HostSession<C> {
    /// 按接入顺序接纳两名玩家：先到者执 X，后到者执 O
    ///
    /// 每接纳一名玩家立即单独发送其标记。接满两人后释放监听器，不再接受第三个连接。
    pub async fn accept<L>(mut listener: L, config: HostConfig) -> Result<Self>
    where
        L: Listener<Conn = C>,
    {
        info!("Waiting for players on {:?}", listener.local_addr());
        let player_x = Self::admit(&mut listener, Mark::X).await?;
        let player_o = Self::admit(&mut listener, Mark::O).await?;
        drop(listener);

        Ok(Self {
            engine: RulesEngine::new(),
            player_x,
            player_o,
            config,
        })
    }

    async fn admit<L>(listener: &mut L, mark: Mark) -> Result<C>
    where
        L: Listener<Conn = C>,
    {
        let mut conn = listener.accept().await?;
        info!("Player {} joined from {:?}", mark, conn.peer_addr());
        conn.send(&Message::Role { mark }).await?;
        Ok(conn)
    }

    fn peer(&mut self, mark: Mark) -> &mut C {
        match mark {
            Mark::X => &mut self.player_x,
            Mark::O => &mut self.player_o,
        }
    }

    /// 运行回合循环直到对局结束或有人掉线
    pub async fn run(mut self) -> HostExit {
        let mut holder = Mark::X;
        info!("Match started");

        loop {
            let prompted = self.peer(holder).send(&Message::YourTurn).await;
            if let Err(e) = prompted {
                warn!("Failed to prompt {}: {}", holder, e);
                return self.abort(holder).await;
            }

            let msg = match self.read_turn(holder).await {
                TurnInput::Message(msg) => msg,
                TurnInput::Malformed(e) => {
                    warn!("Malformed message from {}: {}", holder, e);
                    continue;
                }
                TurnInput::Lost(mark) => return self.abort(mark).await,
            };

            let Some(pos) = msg.as_move() else {
                warn!("Ignoring {} from {}: not a valid move", msg.kind(), holder);
                continue;
            };

            let result = self.engine.apply_move(pos);
            if !result.valid {
                debug!("{} tried occupied cell {}", holder, pos);
                let error = Message::Error {
                    message: format!("{} 已有棋子", pos),
                };
                let sent = self.peer(holder).send(&error).await;
                if let Err(e) = sent {
                    warn!("Failed to send error to {}: {}", holder, e);
                    return self.abort(holder).await;
                }
                continue;
            }

            info!("{} played {}", holder, pos);
            let state = Message::state(&self.engine, &result);
            for mark in [Mark::X, Mark::O] {
                let sent = self.peer(mark).send(&state).await;
                if let Err(e) = sent {
                    warn!("Failed to broadcast state to {}: {}", mark, e);
                    return self.abort(mark).await;
                }
            }

            let outcome = result.outcome();
            if outcome.is_terminal() {
                info!("Match finished: {:?}", outcome);
                self.close_all().await;
                return HostExit::Finished(outcome);
            }

            holder = self.engine.current_player();
        }
    }

    /// 从执子方读取一条消息
    async fn read_turn(&mut self, holder: Mark) -> TurnInput {
        let watch_idle = self.config.watch_idle_peer;
        let (active, idle) = match holder {
            Mark::X => (&mut self.player_x, &mut self.player_o),
            Mark::O => (&mut self.player_o, &mut self.player_x),
        };

        if !watch_idle {
            return classify(holder, active.recv::<Message>().await);
        }

        // 两个读取都可安全取消：半行数据保留在各自的帧读取器中
        loop {
            tokio::select! {
                res = active.recv::<Message>() => return classify(holder, res),
                res = idle.recv::<Message>() => match res {
                    Err(e) if e.is_disconnect() => {
                        warn!("Idle player {} disconnected: {}", holder.opponent(), e);
                        return TurnInput::Lost(holder.opponent());
                    }
                    Ok(msg) => warn!(
                        "Discarding out-of-turn {} from {}",
                        msg.kind(),
                        holder.opponent()
                    ),
                    Err(e) => warn!(
                        "Discarding malformed line from {}: {}",
                        holder.opponent(),
                        e
                    ),
                },
            }
        }
    }

    /// 掉线：关闭双方连接，不再发送任何消息
    async fn abort(mut self, lost: Mark) -> HostExit {
        warn!("Player {} lost, terminating match", lost);
        self.close_all().await;
        HostExit::PeerLost(lost)
    }

    async fn close_all(&mut self) {
        for mark in [Mark::X, Mark::O] {
            if let Err(e) = self.peer(mark).close().await {
                debug!("Closing {} failed: {}", mark, e);
            }
        }
    }
}

fn classify(holder: Mark, res: Result<Message>) -> TurnInput {
    match res {
        Ok(msg) => TurnInput::Message(msg),
        Err(e) if e.is_disconnect() => {
            warn!("Player {} disconnected: {}", holder, e);
            TurnInput::Lost(holder)
        }
        Err(e) => TurnInput::Malformed(e),
    }
}
