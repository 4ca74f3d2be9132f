use std::time::Duration;

use crossterm::event::KeyCode;
use rand::Rng;

use crate::core::game::{InitResult, ScoreReporter};
use crate::core::host::HostContext;
use crate::core::prefs::Tone;
use crate::games::session::{Screen, Session};

const FIELD_WIDTH: u16 = 44;
const FIELD_HEIGHT: u16 = 8;
const FIELD_TOP: u16 = 2;
const BUTTON_WIDTH: u16 = 12;
const ROUND_TIMEOUT: Duration = Duration::from_millis(1200);
const ROUND_GAP: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Tap it.
    Good,
    /// Leave it alone.
    Bad,
    /// Rare bonus.
    Mega,
}

impl Target {
    fn random(rng: &mut impl Rng) -> Self {
        let roll: f64 = rng.random();
        if roll < 0.6 {
            Target::Good
        } else if roll < 0.9 {
            Target::Bad
        } else {
            Target::Mega
        }
    }

    fn label(self) -> &'static str {
        match self {
            Target::Good => "[   TAP!   ]",
            Target::Bad => "[DON'T TAP!]",
            Target::Mega => "[  MEGA!!  ]",
        }
    }
}

#[derive(Default)]
pub struct Reaction {
    score: u32,
    streak: u32,
    /// Bumped each round so stale timeouts can be told apart.
    round: u64,
    target: Option<(Target, (u16, u16))>,
    started: bool,
}

impl Reaction {
    pub fn next_round(&mut self, target: Target, rng: &mut impl Rng) -> u64 {
        self.started = true;
        self.round += 1;
        let position = (
            rng.random_range(0..=FIELD_WIDTH - BUTTON_WIDTH),
            rng.random_range(0..FIELD_HEIGHT),
        );
        self.target = Some((target, position));
        self.round
    }

    /// Scores a tap on the current target.
    pub fn hit(&mut self) -> Option<Target> {
        let (target, _) = self.target.take()?;
        match target {
            Target::Good => {
                self.streak += 1;
                self.score += 10 + self.streak * 2;
            }
            Target::Mega => {
                self.streak += 1;
                self.score += 30 + self.streak * 3;
            }
            Target::Bad => {
                self.streak = 0;
                self.score = self.score.saturating_sub(10);
            }
        }
        Some(target)
    }

    /// The round's time ran out. Missing a good target costs points.
    /// Returns whether `round` was still live.
    pub fn expire(&mut self, round: u64) -> bool {
        if round != self.round || self.target.is_none() {
            return false;
        }
        if let Some((Target::Good, _)) = self.target.take() {
            self.streak = 0;
            self.score = self.score.saturating_sub(5);
        }
        true
    }

    fn hits_target(&self, col: u16, row: u16) -> bool {
        match self.target {
            Some((_, (x, y))) => row == FIELD_TOP + y && (x..x + BUTTON_WIDTH).contains(&col),
            None => false,
        }
    }
}

impl Screen for Reaction {
    fn render(&self) -> Vec<String> {
        let mut lines = vec![format!("Score: {} | Streak: {}", self.score, self.streak), String::new()];
        for row in 0..FIELD_HEIGHT {
            match self.target {
                Some((target, (x, y))) if y == row => {
                    lines.push(format!("{}{}", " ".repeat(usize::from(x)), target.label()));
                }
                _ => lines.push(String::new()),
            }
        }
        lines.push(String::new());
        lines.push(if self.started {
            "Click the button (or Space) fast, but never the red one".into()
        } else {
            "[Space] start".into()
        });
        lines
    }
}

fn start_round(session: &Session<Reaction>) {
    let round = session.update(|game| {
        let mut rng = rand::rng();
        let target = Target::random(&mut rng);
        game.next_round(target, &mut rng)
    });
    session.after(ROUND_TIMEOUT, move |s| expire(s, round));
}

fn expire(session: &Session<Reaction>, round: u64) {
    if session.is_paused() {
        session.after(ROUND_TIMEOUT, move |s| expire(s, round));
        return;
    }
    if session.update(|game| game.expire(round)) {
        start_round(session);
    }
}

fn tap(session: &Session<Reaction>, report: &ScoreReporter) {
    if !session.read(|game| game.started) {
        start_round(session);
        return;
    }
    let Some((target, score)) = session.update(|game| game.hit().map(|t| (t, game.score))) else {
        return;
    };
    let tone = if target == Target::Bad { Tone::Lose } else { Tone::Win };
    session.ctx().sound.beep(tone);
    report.report(score);
    session.after(ROUND_GAP, start_round);
}

pub fn init(ctx: &HostContext, report: ScoreReporter) -> InitResult {
    let session = Session::start(ctx, Reaction::default());

    let pointer_report = report.clone();
    session.on_pointer(move |s, col, row| {
        if s.read(|game| !game.started || game.hits_target(col, row)) {
            tap(s, &pointer_report);
        }
    });
    session.on_key(move |s, key| {
        if matches!(key.code, KeyCode::Char(' ') | KeyCode::Enter) {
            tap(s, &report);
        }
    });
    Ok(None)
}
