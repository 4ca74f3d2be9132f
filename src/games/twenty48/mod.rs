pub mod game;

pub use game::{slide, Board};

use crossterm::event::KeyCode;

use crate::core::game::{InitResult, ScoreReporter};
use crate::core::host::HostContext;
use crate::games::session::{Screen, Session};

use game::SIZE;

impl Screen for Board {
    fn render(&self) -> Vec<String> {
        let rule = format!("+{}", "------+".repeat(SIZE));
        let mut lines = vec![rule.clone()];
        for row in &self.grid {
            let cells: String = row
                .iter()
                .map(|&v| if v == 0 { "      |".to_string() } else { format!("{v:^6}|") })
                .collect();
            lines.push(format!("|{cells}"));
            lines.push(rule.clone());
        }
        lines.push(format!("Score: {}", self.score));
        if self.is_over() {
            lines.push("No moves left! [n] new game".into());
        } else {
            lines.push("Arrows / swipe to merge  [n] new game".into());
        }
        lines
    }
}

pub fn init(ctx: &HostContext, report: ScoreReporter) -> InitResult {
    let session = Session::start(ctx, Board::new(&mut rand::rng()));

    session.on_direction(move |s, direction| {
        let finished = s.update(|board| {
            if !board.shift(direction) {
                return None;
            }
            board.spawn(&mut rand::rng());
            board.is_over().then_some(board.score)
        });
        if let Some(score) = finished {
            report.report(score);
        }
    });
    session.on_key(|s, key| {
        if key.code == KeyCode::Char('n') {
            s.update(|board| *board = Board::new(&mut rand::rng()));
        }
    });
    Ok(None)
}
