//! 井字棋共享协议库
//!
//! 包含:
//! - 标记、格子、坐标、棋盘等核心数据结构
//! - 规则引擎（落子校验、胜负与和棋判定）
//! - 消息类型定义 (Message)
//! - 传输层抽象 (Connector, Connection, Listener traits)
//! - 按行分帧的 JSON 编解码

mod board;
mod constants;
mod engine;
mod error;
mod mark;
mod message;
mod transport;

pub use board::Board;
pub use constants::*;
pub use engine::{MatchOutcome, MoveResult, RulesEngine};
pub use error::{ProtocolError, Result};
pub use mark::{Cell, Mark, Position};
pub use message::Message;
pub use transport::{
    connect_with_retry, Connection, Connector, FrameReader, FrameWriter, Listener,
    NetworkConfig, TcpConnection, TcpConnector, TcpListener,
};
