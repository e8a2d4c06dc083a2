//! 棋盘状态

use serde::{Deserialize, Serialize};

use crate::constants::BOARD_SIZE;
use crate::mark::{Cell, Mark, Position};

/// 8 条连线：3 行、3 列、2 条对角线，坐标为 (row, col)
const LINES: [[(usize, usize); 3]; 8] = [
    // 行
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    // 列
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    // 对角线
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

/// 3x3 棋盘，线上格式为 3x3 的字符串数组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self::default()
    }

    /// 从行数组构造（用于测试和镜像主机下发的棋盘）
    pub fn from_rows(cells: [[Cell; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Self { cells }
    }

    /// 获取指定位置的格子
    pub fn get(&self, pos: Position) -> Cell {
        self.cells[pos.row() as usize][pos.col() as usize]
    }

    /// 设置指定位置的格子（不检查规则）
    pub(crate) fn set(&mut self, pos: Position, cell: Cell) {
        self.cells[pos.row() as usize][pos.col() as usize] = cell;
    }

    /// 按行访问
    pub fn rows(&self) -> &[[Cell; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    /// 棋盘是否已下满
    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(|cell| !cell.is_empty())
    }

    /// 已落子数
    pub fn occupied(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| !cell.is_empty()).count()
    }

    /// 检查胜者：返回第一条三子相同且非空的连线的标记
    pub fn winner(&self) -> Option<Mark> {
        LINES.iter().find_map(|&line| {
            let [a, b, c] = line.map(|(row, col)| self.cells[row][col]);
            if a == b && b == c {
                a.mark()
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mark::Cell::{Empty as E, O, X};

    #[test]
    fn test_empty_board() {
        let board = Board::empty();
        assert_eq!(board.occupied(), 0);
        assert!(!board.is_full());
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_winner_row_column_diagonal() {
        let row = Board::from_rows([[E, E, E], [O, O, O], [X, X, E]]);
        assert_eq!(row.winner(), Some(Mark::O));

        let col = Board::from_rows([[E, X, O], [E, X, O], [E, X, E]]);
        assert_eq!(col.winner(), Some(Mark::X));

        let anti = Board::from_rows([[X, X, O], [E, O, E], [O, E, X]]);
        assert_eq!(anti.winner(), Some(Mark::O));
    }

    #[test]
    fn test_full_board_without_winner() {
        let board = Board::from_rows([[X, O, X], [X, O, O], [O, X, X]]);
        assert!(board.is_full());
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_board_wire_format() {
        let board = Board::from_rows([[X, E, E], [E, O, E], [E, E, E]]);
        let json = serde_json::to_string(&board).unwrap();
        assert_eq!(json, r#"[["X","",""],["","O",""],["","",""]]"#);

        // 行数不足视为非法
        assert!(serde_json::from_str::<Board>(r#"[["X","",""]]"#).is_err());
    }
}
