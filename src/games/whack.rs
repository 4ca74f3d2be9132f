use std::time::Duration;

use crossterm::event::KeyCode;
use rand::Rng;

use crate::core::game::{InitResult, ScoreReporter, Teardown};
use crate::core::host::HostContext;
use crate::core::prefs::Tone;
use crate::core::scheduler::TaskId;
use crate::games::session::{grid_cell, Screen, Session};

const HOLES: usize = 9;
const ROUND_SECS: u32 = 30;
const GRID_TOP: u16 = 2;
const TICK: Duration = Duration::from_secs(1);

pub struct Whack {
    score: u32,
    time_left: u32,
    mole: Option<usize>,
    /// Hole just whacked, shown until the next tick.
    bonked: Option<usize>,
    timer: Option<TaskId>,
}

impl Whack {
    pub fn new() -> Self {
        Self {
            score: 0,
            time_left: ROUND_SECS,
            mole: None,
            bonked: None,
            timer: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Moves the mole to a random hole.
    pub fn pop_up(&mut self, rng: &mut impl Rng) {
        self.bonked = None;
        self.mole = Some(rng.random_range(0..HOLES));
    }

    pub fn whack(&mut self, hole: usize) -> bool {
        if self.mole != Some(hole) {
            return false;
        }
        self.score += 1;
        self.mole = None;
        self.bonked = Some(hole);
        true
    }

    /// One second passes. Returns whether time is up.
    pub fn countdown(&mut self) -> bool {
        self.time_left = self.time_left.saturating_sub(1);
        self.time_left == 0
    }
}

impl Default for Whack {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for Whack {
    fn render(&self) -> Vec<String> {
        let mut lines = vec![format!("Score: {} | Time: {}s", self.score, self.time_left), String::new()];
        for row in 0..3 {
            let line: Vec<String> = (0..3)
                .map(|col| {
                    let hole = row * 3 + col;
                    if self.mole == Some(hole) {
                        "[(o.o)]".to_string()
                    } else if self.bonked == Some(hole) {
                        "[*BAM*]".to_string()
                    } else {
                        "[     ]".to_string()
                    }
                })
                .collect();
            lines.push(line.join(" "));
            lines.push(String::new());
        }
        lines.push(if self.is_running() {
            "Click the mole or press its number [1-9]".into()
        } else {
            "[Space] start".into()
        });
        lines
    }
}

fn end(session: &Session<Whack>, report: &ScoreReporter) {
    let (timer, score) = session.update(|game| {
        game.mole = None;
        game.bonked = None;
        (game.timer.take(), game.score)
    });
    if let Some(id) = timer {
        session.ctx().scheduler.cancel(id);
    }
    report.report(score);
}

fn start(session: &Session<Whack>, report: &ScoreReporter) {
    if session.read(Whack::is_running) {
        end(session, report);
    }
    session.update(|game| {
        *game = Whack::new();
        game.pop_up(&mut rand::rng());
    });
    // Mole and clock share one cadence.
    let tick_report = report.clone();
    let id = session.every(TICK, move |s| {
        if s.is_paused() {
            return;
        }
        let over = s.update(|game| {
            game.pop_up(&mut rand::rng());
            game.countdown()
        });
        if over {
            end(s, &tick_report);
        }
    });
    session.update(|game| game.timer = Some(id));
}

fn whack(session: &Session<Whack>, hole: usize) {
    if session.is_paused() {
        return;
    }
    if session.update(|game| game.whack(hole)) {
        session.ctx().sound.beep(Tone::Win);
    }
}

pub fn init(ctx: &HostContext, report: ScoreReporter) -> InitResult {
    let session = Session::start(ctx, Whack::new());

    session.on_pointer(|s, col, row| {
        if let Some((r, c)) = grid_cell(col, row, GRID_TOP, (8, 2), (3, 3)) {
            whack(s, r * 3 + c);
        }
    });
    session.on_key(move |s, key| match key.code {
        KeyCode::Char(ch @ '1'..='9') => whack(s, ch as usize - '1' as usize),
        KeyCode::Char(' ') | KeyCode::Enter => start(s, &report),
        _ => {}
    });

    let teardown_session = session.clone();
    Ok(Some(Teardown::new(move || {
        if let Some(id) = teardown_session.update(|game| game.timer.take()) {
            teardown_session.ctx().scheduler.cancel(id);
        }
        Ok(())
    })))
}
