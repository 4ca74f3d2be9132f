pub mod game;

pub use game::{SnakeState, Step};

use crossterm::event::KeyCode;

use crate::core::game::{InitResult, ScoreReporter, Teardown};
use crate::core::host::HostContext;
use crate::core::prefs::Tone;
use crate::games::session::{Screen, Session};

use game::GRID;

impl Screen for SnakeState {
    fn render(&self) -> Vec<String> {
        let mut lines = vec![format!("Score: {}", self.score)];
        let border = format!("+{}+", "-".repeat((GRID * 2) as usize));
        lines.push(border.clone());
        for y in 0..GRID {
            let mut row = String::from("|");
            for x in 0..GRID {
                let cell = if self.body.front() == Some(&(x, y)) {
                    "@@"
                } else if self.body.contains(&(x, y)) {
                    "[]"
                } else if self.food == (x, y) {
                    "<>"
                } else {
                    "  "
                };
                row.push_str(cell);
            }
            row.push('|');
            lines.push(row);
        }
        lines.push(border);
        lines.push(if self.alive {
            "Arrows / swipe / d-pad to steer".into()
        } else {
            "Game over! [Enter] play again".into()
        });
        lines
    }
}

pub fn init(ctx: &HostContext, report: ScoreReporter) -> InitResult {
    let session = Session::start(ctx, SnakeState::default());

    ctx.input.show_dpad(true);
    session.on_direction(|s, direction| s.update(|snake| snake.turn(direction)));
    session.on_key(|s, key| {
        if key.code == KeyCode::Enter && !s.read(|snake| snake.alive) {
            s.update(|snake| *snake = SnakeState::default());
        }
    });

    let mut period = game::START_SPEED;
    let task = session.every(period, move |s| {
        if s.is_paused() || !s.read(|snake| snake.alive) {
            return;
        }
        let (step, score, speed) = s.update(|snake| {
            let step = snake.step(&mut rand::rng());
            (step, snake.score, snake.speed)
        });
        if speed != period {
            let scheduler = &s.ctx().scheduler;
            if let Some(id) = scheduler.current() {
                scheduler.set_period(id, speed);
                period = speed;
            }
        }
        match step {
            Step::Ate => s.ctx().sound.beep(Tone::Win),
            Step::Died => {
                s.ctx().sound.beep(Tone::Lose);
                report.report(score);
            }
            Step::Moved => {}
        }
    });

    let scheduler = ctx.scheduler.clone();
    Ok(Some(Teardown::new(move || {
        scheduler.cancel(task);
        Ok(())
    })))
}
