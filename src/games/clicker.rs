use std::time::Duration;

use crossterm::event::KeyCode;
use rand::Rng;

use crate::core::game::{InitResult, ScoreReporter};
use crate::core::host::HostContext;
use crate::core::prefs::Tone;
use crate::games::session::{Screen, Session};

const FIELD_WIDTH: u16 = 44;
const FIELD_HEIGHT: u16 = 8;
/// Panel row where the field starts (status line plus a gap above it).
const FIELD_TOP: u16 = 2;
const BUTTON: &str = "[ Tap Me! ]";
const BUTTON_PRESSED: &str = "[  *tap*  ]";

pub struct Clicker {
    score: u32,
    streak: u32,
    high: u32,
    /// Column and row of the button inside the field.
    button: (u16, u16),
    pressed: bool,
}

impl Clicker {
    pub fn new() -> Self {
        let mut clicker = Self {
            score: 0,
            streak: 0,
            high: 0,
            button: (0, 0),
            pressed: false,
        };
        clicker.relocate();
        clicker
    }

    /// Every third consecutive tap is worth one more point.
    pub fn tap(&mut self) -> u32 {
        self.streak += 1;
        self.score += 1 + self.streak / 3;
        self.high = self.high.max(self.score);
        self.pressed = true;
        self.score
    }

    pub fn reset(&mut self) {
        self.score = 0;
        self.streak = 0;
        self.relocate();
    }

    fn relocate(&mut self) {
        let mut rng = rand::rng();
        let max_col = FIELD_WIDTH - BUTTON.len() as u16;
        self.button = (rng.random_range(0..=max_col), rng.random_range(0..FIELD_HEIGHT));
        self.pressed = false;
    }

    fn hits_button(&self, col: u16, row: u16) -> bool {
        let (bx, by) = self.button;
        row == FIELD_TOP + by && (bx..bx + BUTTON.len() as u16).contains(&col)
    }
}

impl Default for Clicker {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for Clicker {
    fn render(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Score: {} | Streak: {} | High: {}", self.score, self.streak, self.high),
            String::new(),
        ];
        let label = if self.pressed { BUTTON_PRESSED } else { BUTTON };
        for row in 0..FIELD_HEIGHT {
            if row == self.button.1 {
                lines.push(format!("{}{}", " ".repeat(usize::from(self.button.0)), label));
            } else {
                lines.push(String::new());
            }
        }
        lines.push(String::new());
        lines.push("Click the button (or Space)  [r] reset".into());
        lines
    }
}

fn tap(session: &Session<Clicker>, report: &ScoreReporter) {
    let score = session.update(Clicker::tap);
    session.ctx().sound.beep(Tone::Click);
    report.report(score);
    session.after(Duration::from_millis(150), |s| s.update(Clicker::relocate));
}

pub fn init(ctx: &HostContext, report: ScoreReporter) -> InitResult {
    let session = Session::start(ctx, Clicker::new());

    let pointer_report = report.clone();
    session.on_pointer(move |s, col, row| {
        if s.read(|c| c.hits_button(col, row)) {
            tap(s, &pointer_report);
        }
    });
    session.on_key(move |s, key| match key.code {
        KeyCode::Char(' ') | KeyCode::Enter => tap(s, &report),
        KeyCode::Char('r') => s.update(Clicker::reset),
        _ => {}
    });
    Ok(None)
}
