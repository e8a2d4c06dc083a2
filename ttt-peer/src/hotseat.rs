//! 热座模式：双方在同一终端轮流落子，直接驱动规则引擎

use std::io::Write;

use protocol::{MatchOutcome, RulesEngine};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;

use crate::console::{outcome_text, parse_cell, render_board_text};

/// 热座模式战绩
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HotSeatSummary {
    pub x_wins: u32,
    pub o_wins: u32,
    pub draws: u32,
}

impl HotSeatSummary {
    fn record(&mut self, outcome: MatchOutcome) {
        match outcome {
            MatchOutcome::Won(protocol::Mark::X) => self.x_wins += 1,
            MatchOutcome::Won(protocol::Mark::O) => self.o_wins += 1,
            MatchOutcome::Drawn => self.draws += 1,
            MatchOutcome::InProgress => {}
        }
    }

    pub fn games(&self) -> u32 {
        self.x_wins + self.o_wins + self.draws
    }
}

/// 运行热座对局
///
/// 输入命令：`1`-`9` 或 `行 列` 落子，`r` 重开本局，`q` 退出。
/// 一局结束后输入 `y` 再来一局，其他输入退出。
pub async fn run_hotseat<R, W>(input: R, out: &mut W) -> std::io::Result<HotSeatSummary>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut engine = RulesEngine::new();
    let mut summary = HotSeatSummary::default();
    let mut lines = input.lines();
    let mut game_over = false;

    write!(out, "{}", render_board_text(engine.board()))?;
    writeln!(out, "{} 落子：", engine.current_player())?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();

        if game_over {
            if !line.eq_ignore_ascii_case("y") {
                break;
            }
            engine.reset();
            game_over = false;
        } else if line.eq_ignore_ascii_case("q") {
            break;
        } else if line.eq_ignore_ascii_case("r") {
            engine.reset();
            writeln!(out, "已重开。")?;
        } else {
            let Some(pos) = parse_cell(line) else {
                writeln!(out, "无法识别的输入：{}", line)?;
                continue;
            };

            let result = engine.apply_move(pos);
            if !result.valid {
                writeln!(out, "该格已有棋子，请重新选择。")?;
                continue;
            }

            let outcome = result.outcome();
            if outcome.is_terminal() {
                write!(out, "{}", render_board_text(engine.board()))?;
                writeln!(out, "对局结束：{}", outcome_text(outcome, None))?;
                writeln!(out, "再来一局？(y/n)")?;
                info!("Hot-seat game finished: {:?}", outcome);
                summary.record(outcome);
                game_over = true;
                continue;
            }
        }

        write!(out, "{}", render_board_text(engine.board()))?;
        writeln!(out, "{} 落子：", engine.current_player())?;
    }

    writeln!(
        out,
        "共 {} 局：X 胜 {}，O 胜 {}，平 {}",
        summary.games(),
        summary.x_wins,
        summary.o_wins,
        summary.draws
    )?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn play(script: &str) -> (HotSeatSummary, String) {
        let mut out = Vec::new();
        let summary = run_hotseat(script.as_bytes(), &mut out).await.unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_x_wins_then_quit() {
        let (summary, out) = play("1\n5\n2\n9\n3\nn\n").await;
        assert_eq!(summary.x_wins, 1);
        assert_eq!(summary.games(), 1);
        assert!(out.contains("X 获胜"));
    }

    #[tokio::test]
    async fn test_occupied_cell_is_reprompted() {
        let (summary, out) = play("5\n5\nq\n").await;
        assert_eq!(summary.games(), 0);
        assert!(out.contains("该格已有棋子"));
        // 被拒绝后仍由 O 落子
        assert!(out.trim_end().ends_with("共 0 局：X 胜 0，O 胜 0，平 0"));
        assert!(!out.contains("X 落子：\n共"));
    }

    #[tokio::test]
    async fn test_draw_and_rematch() {
        // X O X / X O O / O X X，然后再来一局由 O 获胜
        let script = "1\n2\n3\n5\n4\n6\n8\n7\n9\ny\n1\n5\n2\n3\n9\n7\nn\n";
        let (summary, out) = play(script).await;
        assert_eq!(summary.draws, 1);
        assert_eq!(summary.o_wins, 1);
        assert_eq!(summary.games(), 2);
        assert!(out.contains("平局！"));
    }

    #[tokio::test]
    async fn test_reset_mid_game() {
        let (summary, out) = play("1\nr\n1\nq\n").await;
        assert_eq!(summary.games(), 0);
        assert!(out.contains("已重开"));
        assert!(!out.contains("该格已有棋子"));
    }
}
