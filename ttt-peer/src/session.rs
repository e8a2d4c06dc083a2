//! 玩家会话状态机
//!
//! 镜像主机下发的局面，并把本地输入限制在自己的回合内。
//! 所有状态变更都发生在同一个上下文中：要么处理一条转交过来的消息，要么处理一次本地输入。

use protocol::{Board, MatchOutcome, Mark, Message, Position};
use tracing::{debug, info, warn};

use crate::view::PeerView;

/// 会话阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerPhase {
    /// 正在建立连接
    Connecting,
    /// 已连接，等待主机分配标记
    WaitingForRole,
    /// 已分配标记，等待对局开始
    WaitingForGame,
    /// 轮到自己，可以落子
    MyTurn,
    /// 等待对手或主机
    OpponentTurn,
    /// 对局结束
    GameOver(MatchOutcome),
    /// 连接意外断开
    Disconnected,
}

/// 会话结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerExit {
    GameOver(MatchOutcome),
    Disconnected,
}

/// 玩家会话
pub struct PeerSession<V> {
    phase: PeerPhase,
    own_mark: Option<Mark>,
    board: Board,
    current_player: Mark,
    view: V,
}

impl<V: PeerView> PeerSession<V> {
    pub fn new(view: V) -> Self {
        Self {
            phase: PeerPhase::Connecting,
            own_mark: None,
            board: Board::empty(),
            current_player: Mark::X,
            view,
        }
    }

    /// 连接建立
    pub fn connected(&mut self) {
        if self.phase == PeerPhase::Connecting {
            self.phase = PeerPhase::WaitingForRole;
            self.view.set_input_enabled(false);
        }
    }

    /// 处理一条主机消息
    pub fn handle_message(&mut self, msg: Message) {
        if self.is_finished() {
            debug!("Ignoring {} after session end", msg.kind());
            return;
        }

        match msg {
            Message::Role { mark } => self.on_role(mark),
            Message::State {
                board,
                current_player,
                winner,
                draw,
            } => self.on_state(board, current_player, MatchOutcome::from_fields(winner, draw)),
            Message::YourTurn => self.on_your_turn(),
            Message::Error { message } => {
                warn!("Host error: {}", message);
                self.view.show_error(&message);
            }
            Message::Move { .. } => {
                warn!("Unexpected move message from host, ignoring");
            }
        }
    }

    fn on_role(&mut self, mark: Mark) {
        if self.phase != PeerPhase::WaitingForRole {
            warn!("Unexpected role message in {:?}, ignoring", self.phase);
            return;
        }
        info!("Assigned mark {}", mark);
        self.own_mark = Some(mark);
        self.phase = PeerPhase::WaitingForGame;
        self.view.show_role(mark);
    }

    fn on_state(&mut self, board: Board, current_player: Mark, outcome: MatchOutcome) {
        // 局面完全以主机为准，本地不重新判定胜负
        self.board = board;
        self.current_player = current_player;
        self.view.render_board(&self.board, self.current_player);

        if outcome.is_terminal() {
            info!("Game over: {:?}", outcome);
            self.phase = PeerPhase::GameOver(outcome);
            self.view.set_input_enabled(false);
            self.view.show_outcome(outcome, self.own_mark);
        } else if self.own_mark.is_some() {
            self.enter_opponent_turn();
        }
    }

    fn on_your_turn(&mut self) {
        let Some(own) = self.own_mark else {
            warn!("Turn prompt before role assignment, ignoring");
            return;
        };

        if self.current_player == own {
            debug!("My turn as {}", own);
            self.phase = PeerPhase::MyTurn;
            self.view.set_input_enabled(true);
        } else {
            self.enter_opponent_turn();
        }
    }

    fn enter_opponent_turn(&mut self) {
        self.phase = PeerPhase::OpponentTurn;
        self.view.set_input_enabled(false);
    }

    /// 本地选择了一个格子
    ///
    /// 仅在自己回合且本地镜像中该格为空时返回要发送的落子请求，
    /// 并立即禁用输入，防止在下一次提示到达前重复落子。
    pub fn select_cell(&mut self, pos: Position) -> Option<Message> {
        if self.phase != PeerPhase::MyTurn {
            debug!("Ignoring selection {} in {:?}", pos, self.phase);
            return None;
        }
        if !self.board.get(pos).is_empty() {
            self.view.show_error("该格已有棋子");
            return None;
        }

        self.enter_opponent_turn();
        Some(Message::move_to(pos))
    }

    /// 连接关闭
    pub fn channel_closed(&mut self) {
        match self.phase {
            // 对局结束后主机会主动关闭连接
            PeerPhase::GameOver(_) | PeerPhase::Disconnected => {}
            _ => {
                warn!("Connection lost in {:?}", self.phase);
                self.phase = PeerPhase::Disconnected;
                self.view.set_input_enabled(false);
                self.view.connection_lost();
            }
        }
    }

    pub fn phase(&self) -> PeerPhase {
        self.phase
    }

    pub fn own_mark(&self) -> Option<Mark> {
        self.own_mark
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Mark {
        self.current_player
    }

    pub fn input_enabled(&self) -> bool {
        self.phase == PeerPhase::MyTurn
    }

    pub fn is_finished(&self) -> bool {
        self.exit().is_some()
    }

    /// 会话已结束时返回结束方式
    pub fn exit(&self) -> Option<PeerExit> {
        match self.phase {
            PeerPhase::GameOver(outcome) => Some(PeerExit::GameOver(outcome)),
            PeerPhase::Disconnected => Some(PeerExit::Disconnected),
            _ => None,
        }
    }
}
