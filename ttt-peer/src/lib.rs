//! 井字棋玩家端
//!
//! 包含:
//! - 玩家会话状态机（镜像主机局面、回合内才允许落子）
//! - 监听任务与状态机之间的消息转交
//! - 渲染接口与终端前端
//! - 热座模式

pub mod console;
pub mod hotseat;
pub mod runner;
pub mod session;
pub mod view;

pub use console::{spawn_stdin_input, ConsoleView};
pub use hotseat::{run_hotseat, HotSeatSummary};
pub use runner::{run, spawn_listener, ListenerEvent};
pub use session::{PeerExit, PeerPhase, PeerSession};
pub use view::{ChannelView, PeerView, ViewEvent};

use protocol::{
    connect_with_retry, TcpConnection, TcpConnector, CONNECT_RETRY_INTERVAL, CONNECT_RETRY_WINDOW,
};
use tracing::info;

/// 在终端上进行一局联网对局
pub async fn play_console(conn: TcpConnection) -> PeerExit {
    let (reader, writer) = conn.split();
    run(reader, writer, ConsoleView::stdout(), spawn_stdin_input()).await
}

/// 连接到主机（在短时间内重试）并在终端上对局
pub async fn join(addr: &str) -> protocol::Result<PeerExit> {
    let conn = connect_with_retry(&TcpConnector, addr, CONNECT_RETRY_WINDOW, CONNECT_RETRY_INTERVAL)
        .await?;
    info!("Connected to host at {}", addr);
    Ok(play_console(conn).await)
}
