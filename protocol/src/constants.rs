//! 协议常量定义

use std::time::Duration;

/// 棋盘边长（行数 = 列数）
pub const BOARD_SIZE: usize = 3;

/// 单行消息最大字节数（不含换行符）
pub const MAX_LINE_LEN: usize = 4096;

/// 单次连接超时（毫秒）
pub const CONNECT_TIMEOUT_MS: u64 = 500;

/// 加入对局时重试连接的总时长（秒）
pub const CONNECT_RETRY_WINDOW_SECS: u64 = 10;

/// 两次连接重试之间的间隔（毫秒）
pub const CONNECT_RETRY_INTERVAL_MS: u64 = 200;

/// 监听队列长度：一局只接纳两名玩家
pub const LISTEN_BACKLOG: u32 = 2;

/// 默认主机地址
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// 默认端口
pub const DEFAULT_PORT: u16 = 9527;

/// 连接超时 Duration
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(CONNECT_TIMEOUT_MS);

/// 连接重试总时长 Duration
pub const CONNECT_RETRY_WINDOW: Duration = Duration::from_secs(CONNECT_RETRY_WINDOW_SECS);

/// 连接重试间隔 Duration
pub const CONNECT_RETRY_INTERVAL: Duration = Duration::from_millis(CONNECT_RETRY_INTERVAL_MS);
