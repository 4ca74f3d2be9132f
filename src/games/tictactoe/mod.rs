pub mod game;

pub use game::{Board, Level, Mark, Verdict};

use std::time::Duration;

use crossterm::event::KeyCode;

use crate::core::game::{InitResult, ScoreReporter};
use crate::core::host::HostContext;
use crate::core::prefs::Tone;
use crate::games::session::{grid_cell, Screen, Session};

const BOARD_TOP: u16 = 2;
const COMPUTER_DELAY: Duration = Duration::from_millis(300);

pub struct TicTacToe {
    board: Board,
    level: Level,
    /// Whose turn it is; `None` once the game is over.
    turn: Option<Mark>,
    info: String,
}

impl TicTacToe {
    pub fn new(level: Level) -> Self {
        Self {
            board: Board::default(),
            level,
            turn: Some(Mark::X),
            info: String::new(),
        }
    }

    fn restart(&mut self) {
        *self = Self::new(self.level);
    }

    /// Settles the game if the last move ended it, otherwise passes the turn.
    fn after_move(&mut self, next: Mark) -> Option<Verdict> {
        match self.board.verdict() {
            Some(verdict) => {
                self.turn = None;
                self.info = match verdict {
                    Verdict::Won(mark) => format!("{} Wins!", mark.symbol()),
                    Verdict::Draw => "Draw!".into(),
                };
                Some(verdict)
            }
            None => {
                self.turn = Some(next);
                None
            }
        }
    }
}

impl Screen for TicTacToe {
    fn render(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Level: {}   [e]asy [m]edium [h]ard", self.level.name()),
            String::new(),
        ];
        for row in 0..3 {
            let cells: Vec<String> = (0..3)
                .map(|col| {
                    let symbol = self.board.get(row * 3 + col).map_or(' ', Mark::symbol);
                    format!(" {symbol} ")
                })
                .collect();
            lines.push(cells.join("|"));
            if row < 2 {
                lines.push("---+---+---".into());
            }
        }
        lines.push(String::new());
        lines.push(self.info.clone());
        lines.push("[1-9] or click to move  [n] new game".into());
        lines
    }
}

fn settle(session: &Session<TicTacToe>, report: &ScoreReporter, verdict: Verdict) {
    let sound = &session.ctx().sound;
    match verdict {
        Verdict::Won(Mark::X) => {
            sound.beep(Tone::Win);
            report.report(1);
        }
        Verdict::Won(Mark::O) => {
            sound.beep(Tone::Lose);
            report.report(0);
        }
        Verdict::Draw => sound.beep(Tone::Lose),
    }
}

fn player_move(session: &Session<TicTacToe>, report: &ScoreReporter, cell: usize) {
    let outcome = session.update(|game| {
        if game.turn != Some(Mark::X) || !game.board.place(cell, Mark::X) {
            return None;
        }
        Some(game.after_move(Mark::O))
    });
    let Some(verdict) = outcome else { return };
    session.ctx().sound.beep(Tone::Click);
    if let Some(verdict) = verdict {
        settle(session, report, verdict);
        return;
    }
    let report = report.clone();
    session.after(COMPUTER_DELAY, move |s| computer_move(s, &report));
}

fn computer_move(session: &Session<TicTacToe>, report: &ScoreReporter) {
    let outcome = session.update(|game| {
        if game.turn != Some(Mark::O) {
            return None;
        }
        let cell = game.board.computer_move(game.level, &mut rand::rng())?;
        if !game.board.place(cell, Mark::O) {
            return None;
        }
        Some(game.after_move(Mark::X))
    });
    let Some(verdict) = outcome else { return };
    session.ctx().sound.beep(Tone::Click);
    if let Some(verdict) = verdict {
        settle(session, report, verdict);
    }
}

pub fn init(ctx: &HostContext, report: ScoreReporter) -> InitResult {
    let session = Session::start(ctx, TicTacToe::new(Level::default()));

    let pointer_report = report.clone();
    session.on_pointer(move |s, col, row| {
        if let Some((r, c)) = grid_cell(col, row, BOARD_TOP, (4, 2), (3, 3)) {
            player_move(s, &pointer_report, r * 3 + c);
        }
    });
    session.on_key(move |s, key| match key.code {
        KeyCode::Char(ch @ '1'..='9') => {
            let cell = ch as usize - '1' as usize;
            player_move(s, &report, cell);
        }
        KeyCode::Char('n') => s.update(TicTacToe::restart),
        KeyCode::Char(ch @ ('e' | 'm' | 'h')) => {
            let level = match ch {
                'e' => Level::Easy,
                'm' => Level::Medium,
                _ => Level::Hard,
            };
            s.update(|game| *game = TicTacToe::new(level));
        }
        _ => {}
    });
    Ok(None)
}
