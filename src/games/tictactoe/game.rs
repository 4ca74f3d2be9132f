use rand::seq::IndexedRandom;
use rand::Rng;

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn symbol(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

/// Computer strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Level {
    pub fn name(self) -> &'static str {
        match self {
            Level::Easy => "easy",
            Level::Medium => "medium",
            Level::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Won(Mark),
    Draw,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Mark>; 9],
}

impl Board {
    pub fn get(&self, i: usize) -> Option<Mark> {
        self.cells.get(i).copied().flatten()
    }

    /// Places `mark` on an empty cell. Returns whether it was placed.
    pub fn place(&mut self, i: usize, mark: Mark) -> bool {
        match self.cells.get_mut(i) {
            Some(cell @ None) => {
                *cell = Some(mark);
                true
            }
            _ => false,
        }
    }

    pub fn empty_cells(&self) -> Vec<usize> {
        (0..9).filter(|&i| self.cells[i].is_none()).collect()
    }

    pub fn verdict(&self) -> Option<Verdict> {
        for [a, b, c] in LINES {
            if let Some(mark) = self.cells[a] {
                if self.cells[b] == Some(mark) && self.cells[c] == Some(mark) {
                    return Some(Verdict::Won(mark));
                }
            }
        }
        self.cells.iter().all(Option::is_some).then_some(Verdict::Draw)
    }

    /// A cell that completes a line of two `mark`s.
    pub fn winning_move(&self, mark: Mark) -> Option<usize> {
        LINES.iter().find_map(|line| {
            let owned = line.iter().filter(|&&i| self.cells[i] == Some(mark)).count();
            let empty: Vec<usize> = line.iter().copied().filter(|&i| self.cells[i].is_none()).collect();
            (owned == 2 && empty.len() == 1).then(|| empty[0])
        })
    }

    /// Picks the computer's (O) cell for `level`, or `None` on a full board.
    pub fn computer_move(&self, level: Level, rng: &mut impl Rng) -> Option<usize> {
        let free = self.empty_cells();
        let random = free.choose(rng).copied();
        match level {
            Level::Easy => random,
            Level::Medium => self
                .winning_move(Mark::O)
                .or_else(|| self.winning_move(Mark::X))
                .or(random),
            Level::Hard => {
                if let Some(i) = self.winning_move(Mark::O).or_else(|| self.winning_move(Mark::X)) {
                    return Some(i);
                }
                if self.cells[4].is_none() {
                    return Some(4);
                }
                let corners: Vec<usize> = [0, 2, 6, 8].into_iter().filter(|&i| self.cells[i].is_none()).collect();
                corners.choose(rng).copied().or(random)
            }
        }
    }
}
