//! 消息类型定义
//!
//! 每条消息是一个带 `type` 标签的 JSON 对象，主机和玩家共用同一套结构。

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::engine::{MatchOutcome, MoveResult, RulesEngine};
use crate::mark::{Mark, Position};

/// 线上消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// 主机 → 玩家：接入时分配的标记（每条连接仅一次）
    Role { mark: Mark },
    /// 主机 → 双方：每次有效落子后的完整局面
    State {
        board: Board,
        current_player: Mark,
        #[serde(default)]
        winner: Option<Mark>,
        #[serde(default)]
        draw: bool,
    },
    /// 主机 → 当前执子方：轮到你了
    YourTurn,
    /// 玩家 → 主机：落子请求
    Move { row: u8, col: u8 },
    /// 主机 → 单个玩家：错误提示
    Error { message: String },
}

impl Message {
    /// 根据引擎状态与落子结果构造局面广播
    pub fn state(engine: &RulesEngine, result: &MoveResult) -> Self {
        Message::State {
            board: *engine.board(),
            current_player: engine.current_player(),
            winner: result.winner,
            draw: result.draw,
        }
    }

    /// 构造落子请求
    pub fn move_to(pos: Position) -> Self {
        Message::Move {
            row: pos.row(),
            col: pos.col(),
        }
    }

    /// 若为坐标合法的落子请求，返回目标坐标
    pub fn as_move(&self) -> Option<Position> {
        match *self {
            Message::Move { row, col } => Position::new(row, col),
            _ => None,
        }
    }

    /// 局面消息携带的对局结果
    pub fn outcome(&self) -> Option<MatchOutcome> {
        match *self {
            Message::State { winner, draw, .. } => Some(MatchOutcome::from_fields(winner, draw)),
            _ => None,
        }
    }

    /// 消息标签（用于日志）
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Role { .. } => "role",
            Message::State { .. } => "state",
            Message::YourTurn => "your_turn",
            Message::Move { .. } => "move",
            Message::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shapes() {
        let role = serde_json::to_string(&Message::Role { mark: Mark::O }).unwrap();
        assert_eq!(role, r#"{"type":"role","mark":"O"}"#);

        let turn = serde_json::to_string(&Message::YourTurn).unwrap();
        assert_eq!(turn, r#"{"type":"your_turn"}"#);

        let mv = serde_json::to_string(&Message::Move { row: 2, col: 1 }).unwrap();
        assert_eq!(mv, r#"{"type":"move","row":2,"col":1}"#);
    }

    #[test]
    fn test_state_from_engine() {
        let mut engine = RulesEngine::new();
        let result = engine.apply_move(Position::new(0, 0).unwrap());
        let msg = Message::state(&engine, &result);

        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "state");
        assert_eq!(value["board"][0][0], "X");
        assert_eq!(value["board"][1][1], "");
        assert_eq!(value["current_player"], "O");
        assert!(value["winner"].is_null());
        assert_eq!(value["draw"], false);
        assert_eq!(msg.outcome(), Some(MatchOutcome::InProgress));
    }

    #[test]
    fn test_state_optional_fields() {
        let line = r#"{"type":"state","board":[["X","",""],["","",""],["","",""]],"current_player":"O"}"#;
        let msg: Message = serde_json::from_str(line).unwrap();
        match msg {
            Message::State { winner, draw, .. } => {
                assert_eq!(winner, None);
                assert!(!draw);
            }
            _ => panic!("Wrong message type"),
        }
    }

    #[test]
    fn test_move_validation() {
        assert_eq!(
            Message::Move { row: 1, col: 2 }.as_move(),
            Position::new(1, 2)
        );
        assert_eq!(Message::Move { row: 3, col: 0 }.as_move(), None);
        assert_eq!(Message::YourTurn.as_move(), None);
        assert_eq!(
            Message::move_to(Position::new(2, 0).unwrap()),
            Message::Move { row: 2, col: 0 }
        );
    }

    #[test]
    fn test_schema_violations() {
        // 缺少字段
        assert!(serde_json::from_str::<Message>(r#"{"type":"move","row":1}"#).is_err());
        // 负数坐标
        assert!(serde_json::from_str::<Message>(r#"{"type":"move","row":-1,"col":0}"#).is_err());
        // 未知标签
        assert!(serde_json::from_str::<Message>(r#"{"type":"chat","text":"hi"}"#).is_err());
        // 非法标记
        assert!(serde_json::from_str::<Message>(r#"{"type":"role","mark":"Z"}"#).is_err());
    }
}
