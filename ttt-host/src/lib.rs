//! 井字棋主机端
//!
//! 包含:
//! - 主机会话（按接入顺序分配标记、串行回合循环、局面广播）
//! - 主机配置

pub mod config;
pub mod session;

pub use config::HostConfig;
pub use session::{HostExit, HostSession};
