use rand::seq::IndexedRandom;
use rand::Rng;

use crate::core::input::Direction;

pub const SIZE: usize = 4;

/// Slides one line towards index 0, merging each pair of equal tiles once.
/// Returns the new line and the points gained.
pub fn slide(line: [u32; SIZE]) -> ([u32; SIZE], u32) {
    let tiles: Vec<u32> = line.into_iter().filter(|&v| v != 0).collect();
    let mut out = [0; SIZE];
    let mut gained = 0;
    let mut write = 0;
    let mut i = 0;
    while i < tiles.len() {
        if i + 1 < tiles.len() && tiles[i] == tiles[i + 1] {
            out[write] = tiles[i] * 2;
            gained += out[write];
            i += 2;
        } else {
            out[write] = tiles[i];
            i += 1;
        }
        write += 1;
    }
    (out, gained)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    pub grid: [[u32; SIZE]; SIZE],
    pub score: u32,
}

impl Board {
    /// Fresh board with two starting tiles.
    pub fn new(rng: &mut impl Rng) -> Self {
        let mut board = Self::default();
        board.spawn(rng);
        board.spawn(rng);
        board
    }

    /// Drops a 2 (90%) or a 4 on a random empty cell.
    pub fn spawn(&mut self, rng: &mut impl Rng) {
        let empty: Vec<(usize, usize)> = (0..SIZE)
            .flat_map(|r| (0..SIZE).map(move |c| (r, c)))
            .filter(|&(r, c)| self.grid[r][c] == 0)
            .collect();
        if let Some(&(r, c)) = empty.choose(rng) {
            self.grid[r][c] = if rng.random_bool(0.9) { 2 } else { 4 };
        }
    }

    fn line(&self, direction: Direction, k: usize) -> [[usize; 2]; SIZE] {
        std::array::from_fn(|i| match direction {
            Direction::Left => [k, i],
            Direction::Right => [k, SIZE - 1 - i],
            Direction::Up => [i, k],
            Direction::Down => [SIZE - 1 - i, k],
        })
    }

    /// Shifts every line towards `direction`. Returns whether anything moved.
    pub fn shift(&mut self, direction: Direction) -> bool {
        let mut moved = false;
        for k in 0..SIZE {
            let cells = self.line(direction, k);
            let values = cells.map(|[r, c]| self.grid[r][c]);
            let (slid, gained) = slide(values);
            if slid != values {
                moved = true;
            }
            self.score += gained;
            for ([r, c], v) in cells.into_iter().zip(slid) {
                self.grid[r][c] = v;
            }
        }
        moved
    }

    pub fn is_over(&self) -> bool {
        for r in 0..SIZE {
            for c in 0..SIZE {
                let v = self.grid[r][c];
                if v == 0 {
                    return false;
                }
                if c + 1 < SIZE && self.grid[r][c + 1] == v {
                    return false;
                }
                if r + 1 < SIZE && self.grid[r + 1][c] == v {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slide_merges_each_tile_once() {
        assert_eq!(slide([2, 2, 2, 2]), ([4, 4, 0, 0], 8));
        assert_eq!(slide([0, 2, 0, 2]), ([4, 0, 0, 0], 4));
        assert_eq!(slide([4, 4, 8, 0]), ([8, 8, 0, 0], 8));
        assert_eq!(slide([2, 4, 8, 16]), ([2, 4, 8, 16], 0));
    }

    #[test]
    fn shift_right_and_down() {
        let mut board = Board {
            grid: [[2, 2, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 4]],
            score: 0,
        };
        assert!(board.shift(Direction::Right));
        assert_eq!(board.grid[0], [0, 0, 0, 4]);
        assert_eq!(board.score, 4);

        assert!(board.shift(Direction::Down));
        assert_eq!(board.grid[3], [0, 0, 0, 8]);
        assert_eq!(board.grid[0], [0, 0, 0, 0]);
        assert_eq!(board.score, 12);
        assert!(!board.shift(Direction::Down));
    }

    #[test]
    fn full_board_without_pairs_is_over() {
        let board = Board {
            grid: [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]],
            score: 0,
        };
        assert!(board.is_over());
        let mut open = board.clone();
        open.grid[0][0] = 4;
        assert!(!open.is_over());
    }
}
