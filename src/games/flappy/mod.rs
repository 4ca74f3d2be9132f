pub mod game;

pub use game::{Flight, Tick};

use crossterm::event::KeyCode;

use crate::core::game::{InitResult, ScoreReporter};
use crate::core::host::HostContext;
use crate::core::prefs::Tone;
use crate::games::session::{Screen, Session};

const COLS: u16 = 36;
const ROWS: u16 = 24;
const CELL_W: f32 = game::WIDTH / COLS as f32;
const CELL_H: f32 = game::HEIGHT / ROWS as f32;

impl Screen for Flight {
    fn render(&self) -> Vec<String> {
        let mut lines = vec![format!("Score: {}", self.score)];
        for row in 0..ROWS {
            let y = (f32::from(row) + 0.5) * CELL_H;
            let line: String = (0..COLS)
                .map(|col| {
                    let x = (f32::from(col) + 0.5) * CELL_W;
                    if (x - self.bird_x()).abs() <= CELL_W / 2.0 && (y - self.bird_y).abs() <= CELL_H / 2.0 {
                        '@'
                    } else if self.pipes.iter().any(|p| p.covers(x, y)) {
                        '#'
                    } else {
                        ' '
                    }
                })
                .collect();
            lines.push(format!("|{line}|"));
        }
        lines.push(format!("+{}+", "-".repeat(usize::from(COLS))));
        lines.push(if self.alive {
            "[Space] or click to flap".into()
        } else {
            "Crashed! [Space] or click to fly again".into()
        });
        lines
    }
}

fn flap(session: &Session<Flight>) {
    if session.is_paused() {
        return;
    }
    session.update(|flight| flight.flap(&mut rand::rng()));
    session.ctx().sound.beep(Tone::Click);
}

pub fn init(ctx: &HostContext, report: ScoreReporter) -> InitResult {
    let session = Session::start(ctx, Flight::new(&mut rand::rng()));

    session.on_key(|s, key| {
        if matches!(key.code, KeyCode::Char(' ') | KeyCode::Up) {
            flap(s);
        }
    });
    session.on_pointer(|s, _, _| flap(s));

    session.frame_loop(move |s| {
        let (tick, score) = s.update(|flight| (flight.tick(&mut rand::rng()), flight.score));
        match tick {
            Tick::Scored => s.ctx().sound.beep(Tone::Win),
            Tick::Crashed => {
                s.ctx().sound.beep(Tone::Lose);
                report.report(score);
            }
            Tick::Flying | Tick::Dead => {}
        }
    });
    Ok(None)
}
