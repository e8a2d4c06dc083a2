//! 会话驱动
//!
//! 监听任务只负责“读一行、解码、转交”，状态机在单一循环里处理转交来的消息和本地输入，
//! 两者之间只通过通道传递，不共享可变状态。

use protocol::{FrameReader, FrameWriter, Message, Position, ProtocolError};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::session::{PeerExit, PeerSession};
use crate::view::PeerView;

/// 监听任务转交给状态机的事件
#[derive(Debug)]
pub enum ListenerEvent {
    /// 解码成功的消息
    Message(Message),
    /// 收到一整行但结构不合法
    Malformed(ProtocolError),
    /// 连接关闭
    Closed,
}

/// 启动监听任务：逐行读取并转交，直到连接关闭或接收端释放
pub fn spawn_listener<R>(
    mut reader: FrameReader<R>,
    tx: mpsc::UnboundedSender<ListenerEvent>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let event = match reader.read_frame::<Message>().await {
                Ok(msg) => ListenerEvent::Message(msg),
                Err(e) if e.is_disconnect() => {
                    debug!("Listener stopped: {}", e);
                    let _ = tx.send(ListenerEvent::Closed);
                    break;
                }
                Err(e) => ListenerEvent::Malformed(e),
            };
            if tx.send(event).is_err() {
                break;
            }
        }
    })
}

/// 运行一个玩家会话直到对局结束或断线
///
/// `input` 为本地落子输入；输入端关闭后会话仍会继续接收主机消息。
pub async fn run<R, W, V>(
    reader: FrameReader<R>,
    mut writer: FrameWriter<W>,
    view: V,
    mut input: mpsc::Receiver<Position>,
) -> PeerExit
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send,
    V: PeerView,
{
    let mut session = PeerSession::new(view);
    session.connected();

    let (tx, mut events) = mpsc::unbounded_channel();
    let listener = spawn_listener(reader, tx);

    let exit = loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(ListenerEvent::Message(msg)) => {
                    debug!("Received {}", msg.kind());
                    session.handle_message(msg);
                }
                Some(ListenerEvent::Malformed(e)) => {
                    warn!("Dropping malformed message: {}", e);
                }
                Some(ListenerEvent::Closed) | None => session.channel_closed(),
            },
            Some(pos) = input.recv() => {
                if let Some(msg) = session.select_cell(pos) {
                    debug!("Sending move {}", pos);
                    if let Err(e) = writer.write_frame(&msg).await {
                        warn!("Failed to send move: {}", e);
                        session.channel_closed();
                    }
                }
            }
        }

        if let Some(exit) = session.exit() {
            break exit;
        }
    };

    listener.abort();
    if let Err(e) = writer.shutdown().await {
        debug!("Shutdown after session end: {}", e);
    }
    exit
}
