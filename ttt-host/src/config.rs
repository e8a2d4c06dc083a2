//! 主机配置

/// 主机会话配置
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostConfig {
    /// 等待执子方时是否同时监视另一方的连接
    ///
    /// 关闭时（默认）只读取执子方，非执子方掉线要到下次轮到它时才会被发现；
    /// 开启后非执子方掉线会立即结束对局，它在非回合内发来的消息一律丢弃。
    pub watch_idle_peer: bool,
}
