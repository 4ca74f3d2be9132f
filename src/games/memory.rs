use std::time::Duration;

use crossterm::event::KeyCode;
use rand::seq::SliceRandom;

use crate::core::game::{InitResult, ScoreReporter};
use crate::core::host::HostContext;
use crate::core::input::Direction;
use crate::core::prefs::Tone;
use crate::games::session::{grid_cell, Screen, Session};

const SYMBOLS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];
const SIDE: usize = 4;
const GRID_TOP: u16 = 2;
const FLIP_BACK: Duration = Duration::from_millis(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flip {
    /// First card of a pair turned up.
    Opened,
    Matched { finished: bool },
    Mismatched,
}

pub struct Memory {
    cards: Vec<char>,
    face_up: Vec<bool>,
    /// Unmatched cards currently turned up.
    open: Vec<usize>,
    found: usize,
    clicks: u32,
    cursor: usize,
}

impl Memory {
    pub fn new(cards: Vec<char>) -> Self {
        let count = cards.len();
        Self {
            cards,
            face_up: vec![false; count],
            open: Vec::new(),
            found: 0,
            clicks: 0,
            cursor: 0,
        }
    }

    pub fn shuffled() -> Self {
        let mut cards: Vec<char> = SYMBOLS.iter().chain(SYMBOLS.iter()).copied().collect();
        cards.shuffle(&mut rand::rng());
        Self::new(cards)
    }

    /// Turns card `i` up. Ignored while two cards are waiting to flip back
    /// or when `i` is already showing.
    pub fn flip(&mut self, i: usize) -> Option<Flip> {
        if self.open.len() == 2 || self.face_up.get(i).copied().unwrap_or(true) {
            return None;
        }
        self.face_up[i] = true;
        self.clicks += 1;
        self.open.push(i);
        if self.open.len() < 2 {
            return Some(Flip::Opened);
        }
        let (a, b) = (self.open[0], self.open[1]);
        if self.cards[a] == self.cards[b] {
            self.found += 2;
            self.open.clear();
            Some(Flip::Matched {
                finished: self.found == self.cards.len(),
            })
        } else {
            Some(Flip::Mismatched)
        }
    }

    pub fn hide_mismatch(&mut self) {
        for i in self.open.drain(..) {
            self.face_up[i] = false;
        }
    }

    pub fn score(&self) -> i64 {
        -i64::from(self.clicks)
    }

    fn move_cursor(&mut self, direction: Direction) {
        let (row, col) = ((self.cursor / SIDE) as i32, (self.cursor % SIDE) as i32);
        let (dx, dy) = direction.delta();
        let max = SIDE as i32 - 1;
        let (row, col) = ((row + dy).clamp(0, max), (col + dx).clamp(0, max));
        self.cursor = row as usize * SIDE + col as usize;
    }
}

impl Screen for Memory {
    fn render(&self) -> Vec<String> {
        let mut lines = vec![format!("Flips: {}", self.clicks), String::new()];
        for row in 0..self.cards.len().div_ceil(SIDE) {
            let mut line = String::new();
            for i in (row * SIDE..(row + 1) * SIDE).take_while(|&i| i < self.cards.len()) {
                let face = if self.face_up[i] { self.cards[i] } else { '?' };
                if i == self.cursor {
                    line.push_str(&format!(">{face}< "));
                } else {
                    line.push_str(&format!("[{face}] "));
                }
            }
            lines.push(line);
            lines.push(String::new());
        }
        if self.found == self.cards.len() {
            lines.push(format!("All matched in {} flips!", self.clicks));
        } else {
            lines.push("Arrows + [Space] or click to flip".into());
        }
        lines
    }
}

fn flip(session: &Session<Memory>, report: &ScoreReporter, i: usize) {
    let outcome = session.update(|memory| memory.flip(i).map(|flip| (flip, memory.score())));
    let sound = &session.ctx().sound;
    match outcome {
        Some((Flip::Matched { finished }, score)) => {
            sound.beep(Tone::Win);
            if finished {
                report.report(score);
            }
        }
        Some((Flip::Mismatched, _)) => {
            sound.beep(Tone::Lose);
            session.after(FLIP_BACK, |s| s.update(Memory::hide_mismatch));
        }
        Some((Flip::Opened, _)) | None => {}
    }
}

pub fn init(ctx: &HostContext, report: ScoreReporter) -> InitResult {
    let session = Session::start(ctx, Memory::shuffled());

    session.on_direction(|s, direction| s.update(|memory| memory.move_cursor(direction)));
    let pointer_report = report.clone();
    session.on_pointer(move |s, col, row| {
        if let Some((r, c)) = grid_cell(col, row, GRID_TOP, (4, 2), (SIDE, SIDE)) {
            flip(s, &pointer_report, r * SIDE + c);
        }
    });
    session.on_key(move |s, key| {
        if matches!(key.code, KeyCode::Char(' ') | KeyCode::Enter) {
            let cursor = s.read(|memory| memory.cursor);
            flip(s, &report, cursor);
        }
    });
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_match_and_mismatches_flip_back() {
        let mut memory = Memory::new(vec!['A', 'B', 'A', 'B']);
        assert_eq!(memory.flip(0), Some(Flip::Opened));
        assert_eq!(memory.flip(1), Some(Flip::Mismatched));
        // Locked until the pair is hidden again.
        assert_eq!(memory.flip(2), None);
        memory.hide_mismatch();

        assert_eq!(memory.flip(0), Some(Flip::Opened));
        assert_eq!(memory.flip(0), None);
        assert_eq!(memory.flip(2), Some(Flip::Matched { finished: false }));
        memory.flip(1);
        assert_eq!(memory.flip(3), Some(Flip::Matched { finished: true }));
        assert_eq!(memory.score(), -6);
    }

    #[test]
    fn mismatch_hides_after_delay() {
        use std::time::Instant;
        let t0 = Instant::now();
        let ctx = HostContext::default();
        let session = Session::start(&ctx, Memory::new(vec!['A', 'B', 'A', 'B']));
        flip(&session, &ScoreReporter::discard(), 0);
        flip(&session, &ScoreReporter::discard(), 1);
        assert!(session.read(|m| m.face_up[1]));
        ctx.scheduler.pump(t0 + Duration::from_millis(700));
        assert!(session.read(|m| !m.face_up[0] && !m.face_up[1]));
    }
}
