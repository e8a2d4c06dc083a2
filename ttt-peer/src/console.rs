//! 终端前端：文本棋盘与按行输入

use std::io::{BufRead, Write};

use protocol::{Board, Cell, MatchOutcome, Mark, Position, BOARD_SIZE};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::view::PeerView;

/// 把棋盘渲染为文本，空格显示为数字键位（1-9）
pub fn render_board_text(board: &Board) -> String {
    let mut out = String::new();
    for (r, row) in board.rows().iter().enumerate() {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(c, cell)| match cell {
                Cell::Empty => (r * BOARD_SIZE + c + 1).to_string(),
                Cell::X => "X".to_string(),
                Cell::O => "O".to_string(),
            })
            .collect();
        out.push_str(&format!(" {} \n", cells.join(" | ")));
        if r + 1 < BOARD_SIZE {
            out.push_str("---+---+---\n");
        }
    }
    out
}

/// 解析一行输入：`1`-`9` 数字键位，或 `行 列`（均从 0 开始）
pub fn parse_cell(line: &str) -> Option<Position> {
    let parts: Vec<&str> = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .collect();
    match parts.as_slice() {
        [n] => Position::from_keypad(n.parse().ok()?),
        [row, col] => Position::new(row.parse().ok()?, col.parse().ok()?),
        _ => None,
    }
}

/// 对局结果的提示文本
pub fn outcome_text(outcome: MatchOutcome, own_mark: Option<Mark>) -> String {
    match (outcome, own_mark) {
        (MatchOutcome::Won(winner), Some(own)) if winner == own => format!("你赢了！（{}）", winner),
        (MatchOutcome::Won(winner), Some(_)) => format!("你输了，{} 获胜", winner),
        (MatchOutcome::Won(winner), None) => format!("{} 获胜", winner),
        (MatchOutcome::Drawn, _) => "平局！".to_string(),
        (MatchOutcome::InProgress, _) => "对局进行中".to_string(),
    }
}

/// 终端视图
pub struct ConsoleView<W> {
    out: W,
}

impl ConsoleView<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            debug!("Console write failed: {}", e);
        }
    }
}

impl<W: Write + Send> PeerView for ConsoleView<W> {
    fn show_role(&mut self, mark: Mark) {
        self.line(&format!("你执 {}，等待对局开始...", mark));
    }

    fn render_board(&mut self, board: &Board, current_player: Mark) {
        let text = render_board_text(board);
        self.line(&text);
        self.line(&format!("当前执子方：{}", current_player));
    }

    fn show_outcome(&mut self, outcome: MatchOutcome, own_mark: Option<Mark>) {
        self.line(&format!("对局结束：{}", outcome_text(outcome, own_mark)));
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        if enabled {
            self.line("轮到你了，输入 1-9 或 \"行 列\" 落子：");
        }
    }

    fn show_error(&mut self, message: &str) {
        self.line(&format!("错误：{}", message));
    }

    fn connection_lost(&mut self) {
        self.line("与主机的连接已断开，对局终止。");
    }
}

/// 启动标准输入读取线程，把每行解析出的坐标送入通道
///
/// 读取在独立的系统线程上阻塞进行，对局结束后进程可以直接退出，不必等待下一行输入。
pub fn spawn_stdin_input() -> mpsc::Receiver<Position> {
    let (tx, rx) = mpsc::channel(8);
    std::thread::spawn(move || forward_input(std::io::stdin().lock(), &tx));
    rx
}

/// 逐行解析输入并转发，直到输入结束或接收端释放
fn forward_input<R: BufRead>(input: R, tx: &mpsc::Sender<Position>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                debug!("Stdin read failed: {}", e);
                break;
            }
        };
        match parse_cell(&line) {
            Some(pos) => {
                if tx.blocking_send(pos).is_err() {
                    break;
                }
            }
            None => warn!("Unrecognized input: {}", line.trim()),
        }
    }
}
