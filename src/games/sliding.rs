use crossterm::event::KeyCode;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::game::{InitResult, ScoreReporter};
use crate::core::host::HostContext;
use crate::core::input::Direction;
use crate::core::prefs::Tone;
use crate::games::session::{grid_cell, Screen, Session};

const SIZE: usize = 3;
const GRID_TOP: u16 = 2;
const GOAL: [u8; SIZE * SIZE] = [1, 2, 3, 4, 5, 6, 7, 8, 0];

/// On a 3x3 board a layout is reachable from the goal iff its inversion
/// count (blank ignored) is even.
pub fn is_solvable(tiles: &[u8]) -> bool {
    let values: Vec<u8> = tiles.iter().copied().filter(|&t| t != 0).collect();
    let inversions = (0..values.len())
        .flat_map(|i| (i + 1..values.len()).map(move |j| (i, j)))
        .filter(|&(i, j)| values[i] > values[j])
        .count();
    inversions % 2 == 0
}

pub fn shuffled(rng: &mut impl Rng) -> [u8; SIZE * SIZE] {
    let mut tiles = GOAL;
    loop {
        tiles.shuffle(rng);
        if is_solvable(&tiles) && tiles != GOAL {
            return tiles;
        }
    }
}

pub struct Sliding {
    tiles: [u8; SIZE * SIZE],
    moves: u32,
    solved: bool,
}

impl Sliding {
    pub fn new(tiles: [u8; SIZE * SIZE]) -> Self {
        Self {
            tiles,
            moves: 0,
            solved: tiles == GOAL,
        }
    }

    fn blank(&self) -> usize {
        self.tiles.iter().position(|&t| t == 0).unwrap_or(SIZE * SIZE - 1)
    }

    fn adjacent(a: usize, b: usize) -> bool {
        let (ar, ac) = (a / SIZE, a % SIZE);
        let (br, bc) = (b / SIZE, b % SIZE);
        ar.abs_diff(br) + ac.abs_diff(bc) == 1
    }

    /// Slides tile `i` into the blank if they touch. Returns whether the
    /// puzzle just became solved.
    pub fn slide(&mut self, i: usize) -> Option<bool> {
        let blank = self.blank();
        if self.solved || i >= self.tiles.len() || !Self::adjacent(i, blank) {
            return None;
        }
        self.tiles.swap(i, blank);
        self.moves += 1;
        self.solved = self.tiles == GOAL;
        Some(self.solved)
    }

    /// Moves the tile that sits opposite `direction` from the blank, so
    /// the tile travels in `direction`.
    pub fn push(&mut self, direction: Direction) -> Option<bool> {
        let blank = self.blank();
        let (dx, dy) = direction.opposite().delta();
        let (r, c) = ((blank / SIZE) as i32 + dy, (blank % SIZE) as i32 + dx);
        if !(0..SIZE as i32).contains(&r) || !(0..SIZE as i32).contains(&c) {
            return None;
        }
        self.slide(r as usize * SIZE + c as usize)
    }

    pub fn score(&self) -> i64 {
        10_000 - i64::from(self.moves)
    }
}

impl Screen for Sliding {
    fn render(&self) -> Vec<String> {
        let mut lines = vec![format!("Moves: {}", self.moves), String::new()];
        for row in self.tiles.chunks(SIZE) {
            let cells: Vec<String> = row
                .iter()
                .map(|&t| if t == 0 { "     ".to_string() } else { format!("[ {t} ]") })
                .collect();
            lines.push(cells.join(" "));
            lines.push(String::new());
        }
        if self.solved {
            lines.push(format!("Solved in {} moves!", self.moves));
        }
        lines.push("Arrows / click to slide  [s] shuffle  [r] reset".into());
        lines
    }
}

fn after_move(session: &Session<Sliding>, report: &ScoreReporter, outcome: Option<bool>) {
    let Some(solved) = outcome else { return };
    if solved {
        session.ctx().sound.beep(Tone::Win);
        report.report(session.read(Sliding::score));
    } else {
        session.ctx().sound.beep(Tone::Click);
    }
}

pub fn init(ctx: &HostContext, report: ScoreReporter) -> InitResult {
    let session = Session::start(ctx, Sliding::new(shuffled(&mut rand::rng())));

    let direction_report = report.clone();
    session.on_direction(move |s, direction| {
        let outcome = s.update(|game| game.push(direction));
        after_move(s, &direction_report, outcome);
    });
    let pointer_report = report.clone();
    session.on_pointer(move |s, col, row| {
        if let Some((r, c)) = grid_cell(col, row, GRID_TOP, (6, 2), (SIZE, SIZE)) {
            let outcome = s.update(|game| game.slide(r * SIZE + c));
            after_move(s, &pointer_report, outcome);
        }
    });
    session.on_key(|s, key| match key.code {
        KeyCode::Char('s') => s.update(|game| *game = Sliding::new(shuffled(&mut rand::rng()))),
        KeyCode::Char('r') => s.update(|game| {
            *game = Sliding::new(GOAL);
            game.solved = false;
        }),
        _ => {}
    });
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solvability_parity() {
        assert!(is_solvable(&GOAL));
        assert!(!is_solvable(&[2, 1, 3, 4, 5, 6, 7, 8, 0]));
        let mut rng = rand::rng();
        for _ in 0..20 {
            assert!(is_solvable(&shuffled(&mut rng)));
        }
    }

    #[test]
    fn one_move_from_goal() {
        let mut game = Sliding::new([1, 2, 3, 4, 5, 6, 7, 0, 8]);
        assert_eq!(game.slide(0), None);
        assert_eq!(game.push(Direction::Left), Some(true));
        assert_eq!(game.moves, 1);
        assert_eq!(game.score(), 9_999);
        assert_eq!(game.push(Direction::Right), None);
    }
}
