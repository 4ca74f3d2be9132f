pub mod game;

pub use game::{PongState, Rally};

use crate::core::game::{InitResult, ScoreReporter};
use crate::core::host::HostContext;
use crate::core::input::Direction;
use crate::core::prefs::Tone;
use crate::games::session::{Screen, Session};

use game::{HEIGHT, PADDLE, WIDTH};

const COLS: u16 = 48;
const ROWS: u16 = 15;
const COURT_TOP: u16 = 1;
const CELL_W: f32 = WIDTH / COLS as f32;
const CELL_H: f32 = HEIGHT / ROWS as f32;
const NUDGE: f32 = 20.0;

impl Screen for PongState {
    fn render(&self) -> Vec<String> {
        let mut lines = vec![format!("Score: {}", self.score)];
        let paddle_rows = |center: f32| {
            let top = ((center - PADDLE / 2.0) / CELL_H).floor() as i32;
            let bottom = ((center + PADDLE / 2.0) / CELL_H).ceil() as i32;
            top..bottom
        };
        let (left, right) = (paddle_rows(self.left), paddle_rows(self.right));
        let ball = (
            (self.ball.0 / CELL_W) as i32,
            (self.ball.1 / CELL_H) as i32,
        );
        for row in 0..i32::from(ROWS) {
            let line: String = (0..i32::from(COLS))
                .map(|col| {
                    if (col, row) == ball {
                        'o'
                    } else if (col == 1 && left.contains(&row))
                        || (col == i32::from(COLS) - 2 && right.contains(&row))
                    {
                        '|'
                    } else if col == i32::from(COLS) / 2 {
                        ':'
                    } else {
                        ' '
                    }
                })
                .collect();
            lines.push(line);
        }
        lines.push("Click a row or use Up/Down to move your paddle".into());
        lines
    }
}

pub fn init(ctx: &HostContext, report: ScoreReporter) -> InitResult {
    let session = Session::start(ctx, PongState::default());

    session.on_pointer(|s, _, row| {
        if row >= COURT_TOP {
            let y = (f32::from(row - COURT_TOP) + 0.5) * CELL_H;
            s.update(|pong| pong.set_left(y));
        }
    });
    session.on_direction(|s, direction| match direction {
        Direction::Up => s.update(|pong| pong.nudge_left(-NUDGE)),
        Direction::Down => s.update(|pong| pong.nudge_left(NUDGE)),
        Direction::Left | Direction::Right => {}
    });

    session.frame_loop(move |s| {
        let rally = s.update(|pong| pong.step(&mut rand::rng()));
        let sound = &s.ctx().sound;
        match rally {
            Rally::Returned => sound.beep(Tone::Win),
            Rally::Countered => sound.beep(Tone::Click),
            Rally::Over(score) => {
                sound.beep(Tone::Lose);
                report.report(score);
            }
            Rally::Continue => {}
        }
    });
    Ok(None)
}
