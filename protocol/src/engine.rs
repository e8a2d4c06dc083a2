//! 规则引擎：落子校验与胜负判定
//!
//! 纯状态，不涉及任何网络或计时。主机用它裁决对局，热座模式直接驱动它。

use tracing::debug;

use crate::board::Board;
use crate::mark::{Mark, Position};

/// 对局结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// 进行中
    InProgress,
    /// 某方三连获胜
    Won(Mark),
    /// 棋盘下满且无人获胜
    Drawn,
}

impl MatchOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MatchOutcome::InProgress)
    }

    /// 由线上的 winner / draw 字段还原
    pub fn from_fields(winner: Option<Mark>, draw: bool) -> Self {
        match (winner, draw) {
            (Some(mark), _) => MatchOutcome::Won(mark),
            (None, true) => MatchOutcome::Drawn,
            (None, false) => MatchOutcome::InProgress,
        }
    }
}

/// 一次落子的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveResult {
    /// 目标格为空且已落子
    pub valid: bool,
    pub winner: Option<Mark>,
    pub draw: bool,
}

impl MoveResult {
    fn rejected() -> Self {
        Self {
            valid: false,
            winner: None,
            draw: false,
        }
    }

    pub fn outcome(&self) -> MatchOutcome {
        MatchOutcome::from_fields(self.winner, self.draw)
    }
}

/// 规则引擎
#[derive(Debug, Clone)]
pub struct RulesEngine {
    board: Board,
    current_player: Mark,
}

impl RulesEngine {
    /// 创建新引擎（空棋盘，X 先手）
    pub fn new() -> Self {
        Self {
            board: Board::empty(),
            current_player: Mark::X,
        }
    }

    /// 重置为空棋盘，X 先手
    pub fn reset(&mut self) {
        self.board = Board::empty();
        self.current_player = Mark::X;
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Mark {
        self.current_player
    }

    /// 当前局面的结果
    pub fn outcome(&self) -> MatchOutcome {
        let winner = self.board.winner();
        MatchOutcome::from_fields(winner, winner.is_none() && self.board.is_full())
    }

    /// 以当前玩家身份落子
    ///
    /// 目标格已有子时返回 `valid = false`，棋盘与当前玩家均不变。
    /// 落子后若对局未结束则轮换当前玩家；若已分胜负或和棋，当前玩家保持为落子方。
    pub fn apply_move(&mut self, pos: Position) -> MoveResult {
        if !self.board.get(pos).is_empty() {
            debug!("Rejected move at {}: cell occupied", pos);
            return MoveResult::rejected();
        }

        self.board.set(pos, self.current_player.into());

        let winner = self.board.winner();
        let draw = winner.is_none() && self.board.is_full();

        if winner.is_none() && !draw {
            self.current_player = self.current_player.opponent();
        }

        MoveResult {
            valid: true,
            winner,
            draw,
        }
    }
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::new()
    }
}
