//! 错误类型定义

use thiserror::Error;

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 解析错误（消息结构不符合约定）
    #[error("JSON schema error: {0}")]
    Json(#[from] serde_json::Error),

    /// 单行消息超长
    #[error("Line too long: {size} bytes (max: {max})")]
    LineTooLong { size: usize, max: usize },

    /// 编码结果中出现换行符，会破坏分帧
    #[error("Encoded message contains an embedded newline")]
    EmbeddedNewline,

    /// 连接超时
    #[error("Connection timeout")]
    ConnectionTimeout,

    /// 连接已关闭（读到完整的一行之前对端关闭）
    #[error("Connection closed")]
    ConnectionClosed,
}

impl ProtocolError {
    /// 是否代表对端已断开（分帧失败 / 掉线），这类错误对整局是致命的
    pub fn is_disconnect(&self) -> bool {
        matches!(self, ProtocolError::ConnectionClosed | ProtocolError::Io(_))
    }

    /// 是否为结构违规：收到了一整行，但无法解析为约定的消息
    pub fn is_schema_violation(&self) -> bool {
        matches!(self, ProtocolError::Json(_) | ProtocolError::LineTooLong { .. })
    }
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(ProtocolError::ConnectionClosed.is_disconnect());
        assert!(!ProtocolError::ConnectionClosed.is_schema_violation());

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(ProtocolError::from(io).is_disconnect());

        let json = serde_json::from_str::<u8>("nope").unwrap_err();
        let err = ProtocolError::from(json);
        assert!(err.is_schema_violation());
        assert!(!err.is_disconnect());

        assert!(ProtocolError::LineTooLong { size: 10, max: 5 }.is_schema_violation());
    }
}
