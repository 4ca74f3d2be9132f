use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use crate::core::game::{InitResult, ScoreReporter};
use crate::core::host::HostContext;
use crate::core::input::Direction;
use crate::core::prefs::Tone;
use crate::core::scheduler::TaskId;
use crate::games::session::{grid_cell, Screen, Session};

const SIZE: usize = 4;
const GRID_TOP: u16 = 2;

const SOLUTION: [[u8; SIZE]; SIZE] = [[1, 2, 3, 4], [3, 4, 1, 2], [2, 1, 4, 3], [4, 3, 2, 1]];
const START: [[u8; SIZE]; SIZE] = [[1, 0, 0, 4], [0, 4, 1, 0], [0, 1, 4, 0], [4, 0, 0, 1]];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Incomplete,
    Wrong,
    Solved,
}

/// Every row, column and 2x2 box holds 1..=4 exactly once.
pub fn check(grid: &[[u8; SIZE]; SIZE]) -> Check {
    if grid.iter().flatten().any(|&v| !(1..=4).contains(&v)) {
        return Check::Incomplete;
    }
    let complete = |cells: [u8; SIZE]| {
        let mut seen = [false; SIZE + 1];
        cells.iter().all(|&v| !std::mem::replace(&mut seen[usize::from(v)], true))
    };
    let rows = (0..SIZE).all(|r| complete(grid[r]));
    let cols = (0..SIZE).all(|c| complete(std::array::from_fn(|r| grid[r][c])));
    let boxes = (0..SIZE).all(|b| {
        let (top, left) = ((b / 2) * 2, (b % 2) * 2);
        complete(std::array::from_fn(|i| grid[top + i / 2][left + i % 2]))
    });
    if rows && cols && boxes {
        Check::Solved
    } else {
        Check::Wrong
    }
}

pub struct Sudoku {
    grid: [[u8; SIZE]; SIZE],
    cursor: (usize, usize),
    started: Instant,
    elapsed: Duration,
    /// Clock task; dropped once the puzzle is solved or revealed.
    clock: Option<TaskId>,
    info: String,
}

impl Sudoku {
    pub fn new(started: Instant) -> Self {
        Self {
            grid: START,
            cursor: (0, 1),
            started,
            elapsed: Duration::ZERO,
            clock: None,
            info: String::new(),
        }
    }

    fn is_given(r: usize, c: usize) -> bool {
        START[r][c] != 0
    }

    pub fn set(&mut self, value: u8) {
        let (r, c) = self.cursor;
        if !Self::is_given(r, c) && value <= 4 {
            self.grid[r][c] = value;
        }
    }

    fn move_cursor(&mut self, direction: Direction) {
        let (dx, dy) = direction.delta();
        let max = SIZE as i32 - 1;
        let (r, c) = self.cursor;
        self.cursor = (
            (r as i32 + dy).clamp(0, max) as usize,
            (c as i32 + dx).clamp(0, max) as usize,
        );
    }

    pub fn seconds(&self) -> u64 {
        self.elapsed.as_secs()
    }
}

impl Screen for Sudoku {
    fn render(&self) -> Vec<String> {
        let mut lines = vec![format!("Time: {}s", self.seconds()), String::new()];
        for r in 0..SIZE {
            let mut line = String::new();
            for c in 0..SIZE {
                let v = self.grid[r][c];
                let digit = if v == 0 { '.' } else { char::from(b'0' + v) };
                let cell = if self.cursor == (r, c) {
                    format!(">{digit}<")
                } else if Self::is_given(r, c) {
                    format!("({digit})")
                } else {
                    format!(" {digit} ")
                };
                line.push_str(&cell);
                line.push(if c == 1 { '|' } else { ' ' });
            }
            lines.push(line);
            if r == 1 {
                lines.push("--------+-------".into());
            } else {
                lines.push(String::new());
            }
        }
        lines.push(self.info.clone());
        lines.push("Arrows move, [1-4] fill, [0] clear, [Enter] check, [s] show solution".into());
        lines
    }
}

fn stop_clock(session: &Session<Sudoku>) {
    if let Some(id) = session.update(|game| game.clock.take()) {
        session.ctx().scheduler.cancel(id);
    }
}

fn submit(session: &Session<Sudoku>, report: &ScoreReporter) {
    let now = session.ctx().scheduler.now();
    let (verdict, secs) = session.update(|game| {
        game.elapsed = now.saturating_duration_since(game.started);
        let verdict = check(&game.grid);
        game.info = match verdict {
            Check::Incomplete => "Fill all cells with numbers 1-4".into(),
            Check::Wrong => "Not correct, try again!".into(),
            Check::Solved => format!("Solved! {}s", game.seconds()),
        };
        (verdict, game.seconds())
    });
    if verdict == Check::Solved {
        session.ctx().sound.beep(Tone::Win);
        stop_clock(session);
        report.report(1000 - secs as i64);
    } else {
        session.ctx().sound.beep(Tone::Lose);
    }
}

fn reveal(session: &Session<Sudoku>) {
    session.update(|game| {
        game.grid = SOLUTION;
        game.info = "Solution revealed".into();
    });
    session.ctx().sound.beep(Tone::Click);
    stop_clock(session);
}

pub fn init(ctx: &HostContext, report: ScoreReporter) -> InitResult {
    let session = Session::start(ctx, Sudoku::new(ctx.scheduler.now()));

    let clock = session.every(Duration::from_millis(500), |s| {
        let now = s.ctx().scheduler.now();
        s.update(|game| game.elapsed = now.saturating_duration_since(game.started));
    });
    session.update(|game| game.clock = Some(clock));

    session.on_direction(|s, direction| s.update(|game| game.move_cursor(direction)));
    session.on_pointer(|s, col, row| {
        if let Some(cell) = grid_cell(col, row, GRID_TOP, (4, 2), (SIZE, SIZE)) {
            s.update(|game| game.cursor = cell);
        }
    });
    session.on_key(move |s, key| match key.code {
        KeyCode::Char(ch @ '0'..='4') => s.update(|game| game.set(ch as u8 - b'0')),
        KeyCode::Backspace | KeyCode::Delete => s.update(|game| game.set(0)),
        KeyCode::Enter => submit(s, &report),
        KeyCode::Char('s') => reveal(s),
        _ => {}
    });
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solution_is_valid_and_givens_agree_with_it() {
        assert_eq!(check(&SOLUTION), Check::Solved);
        assert_eq!(check(&START), Check::Incomplete);
        for r in 0..SIZE {
            for c in 0..SIZE {
                assert!(START[r][c] == 0 || START[r][c] == SOLUTION[r][c]);
            }
        }
    }

    #[test]
    fn duplicates_are_wrong() {
        let mut grid = SOLUTION;
        grid[0].swap(0, 1);
        assert_eq!(check(&grid), Check::Wrong);
    }

    #[test]
    fn givens_cannot_be_overwritten() {
        let mut game = Sudoku::new(Instant::now());
        game.cursor = (0, 0);
        game.set(3);
        assert_eq!(game.grid[0][0], 1);
        game.cursor = (0, 1);
        game.set(2);
        assert_eq!(game.grid[0][1], 2);
    }

    #[test]
    fn solving_reports_time_based_score() {
        use crate::core::score::ScoreValue;
        use std::cell::RefCell;
        use std::rc::Rc;

        let ctx = HostContext::default();
        let t0 = ctx.scheduler.now();
        let reported = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&reported);
        let report = ScoreReporter::new(move |v| sink.borrow_mut().push(v));
        let session = Session::start(&ctx, Sudoku::new(t0));
        session.update(|game| game.grid = SOLUTION);
        ctx.scheduler.pump(t0 + Duration::from_secs(12));
        submit(&session, &report);
        assert_eq!(*reported.borrow(), vec![ScoreValue::Numeric(988.0)]);
    }
}
