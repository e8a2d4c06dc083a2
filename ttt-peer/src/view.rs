//! 渲染接口
//!
//! 会话状态机只通过 [`PeerView`] 对外展示，不关心具体是终端还是窗口。

use protocol::{Board, MatchOutcome, Mark};
use tokio::sync::mpsc;

/// 玩家侧视图
pub trait PeerView: Send {
    /// 收到主机分配的标记
    fn show_role(&mut self, mark: Mark);

    /// 刷新棋盘
    fn render_board(&mut self, board: &Board, current_player: Mark);

    /// 对局结束
    fn show_outcome(&mut self, outcome: MatchOutcome, own_mark: Option<Mark>);

    /// 启用 / 禁用落子输入
    fn set_input_enabled(&mut self, enabled: bool);

    /// 展示错误提示
    fn show_error(&mut self, message: &str);

    /// 连接意外断开
    fn connection_lost(&mut self);
}

/// 视图事件（由 [`ChannelView`] 转发）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Role(Mark),
    Board { board: Board, current_player: Mark },
    Outcome(MatchOutcome),
    InputEnabled(bool),
    Error(String),
    ConnectionLost,
}

/// 把视图调用转成事件发往另一个上下文（例如另一线程上的界面）
pub struct ChannelView {
    tx: mpsc::UnboundedSender<ViewEvent>,
}

impl ChannelView {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ViewEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn emit(&self, event: ViewEvent) {
        // 接收端已释放说明界面已关闭，丢弃即可
        let _ = self.tx.send(event);
    }
}

impl PeerView for ChannelView {
    fn show_role(&mut self, mark: Mark) {
        self.emit(ViewEvent::Role(mark));
    }

    fn render_board(&mut self, board: &Board, current_player: Mark) {
        self.emit(ViewEvent::Board {
            board: *board,
            current_player,
        });
    }

    fn show_outcome(&mut self, outcome: MatchOutcome, _own_mark: Option<Mark>) {
        self.emit(ViewEvent::Outcome(outcome));
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.emit(ViewEvent::InputEnabled(enabled));
    }

    fn show_error(&mut self, message: &str) {
        self.emit(ViewEvent::Error(message.to_string()));
    }

    fn connection_lost(&mut self) {
        self.emit(ViewEvent::ConnectionLost);
    }
}
