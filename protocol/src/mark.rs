//! 棋子标记与坐标定义

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::BOARD_SIZE;

/// 玩家标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    /// 先手
    X,
    /// 后手
    O,
}

impl Mark {
    /// 获取对方标记
    pub fn opponent(&self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::X => write!(f, "X"),
            Mark::O => write!(f, "O"),
        }
    }
}

/// 格子状态，线上格式为 `""` / `"X"` / `"O"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    #[serde(rename = "")]
    Empty,
    X,
    O,
}

impl Cell {
    /// 获取格子上的标记
    pub fn mark(&self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::X => Some(Mark::X),
            Cell::O => Some(Mark::O),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Cell::Empty
    }
}

impl From<Mark> for Cell {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Cell::X,
            Mark::O => Cell::O,
        }
    }
}

/// 棋盘坐标
///
/// 只能通过 [`Position::new`] 在 `[0, 2]` 范围内构造，越界坐标在类型边界处即被拒绝。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    row: u8,
    col: u8,
}

impl Position {
    /// 创建坐标（越界返回 None）
    pub fn new(row: u8, col: u8) -> Option<Self> {
        if (row as usize) < BOARD_SIZE && (col as usize) < BOARD_SIZE {
            Some(Self { row, col })
        } else {
            None
        }
    }

    /// 从 1-9 的数字键位解析（1 为左上角，按行排列）
    pub fn from_keypad(n: u8) -> Option<Self> {
        if (1..=9).contains(&n) {
            Self::new((n - 1) / 3, (n - 1) % 3)
        } else {
            None
        }
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn col(&self) -> u8 {
        self.col
    }

    /// 遍历全部 9 个坐标（按行优先）
    pub fn all() -> impl Iterator<Item = Position> {
        (0..BOARD_SIZE as u8)
            .flat_map(|row| (0..BOARD_SIZE as u8).map(move |col| Position { row, col }))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent() {
        assert_eq!(Mark::X.opponent(), Mark::O);
        assert_eq!(Mark::O.opponent(), Mark::X);
    }

    #[test]
    fn test_position_bounds() {
        assert!(Position::new(0, 0).is_some());
        assert!(Position::new(2, 2).is_some());
        assert!(Position::new(3, 0).is_none());
        assert!(Position::new(0, 3).is_none());
        assert_eq!(Position::all().count(), 9);
    }

    #[test]
    fn test_keypad() {
        assert_eq!(Position::from_keypad(1), Position::new(0, 0));
        assert_eq!(Position::from_keypad(5), Position::new(1, 1));
        assert_eq!(Position::from_keypad(9), Position::new(2, 2));
        assert_eq!(Position::from_keypad(0), None);
        assert_eq!(Position::from_keypad(10), None);
    }

    #[test]
    fn test_cell_wire_format() {
        assert_eq!(serde_json::to_string(&Cell::Empty).unwrap(), "\"\"");
        assert_eq!(serde_json::to_string(&Cell::X).unwrap(), "\"X\"");
        let cell: Cell = serde_json::from_str("\"O\"").unwrap();
        assert_eq!(cell.mark(), Some(Mark::O));
        assert!(serde_json::from_str::<Cell>("\"Z\"").is_err());
    }
}
