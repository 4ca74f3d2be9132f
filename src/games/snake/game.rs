use std::collections::VecDeque;
use std::time::Duration;

use rand::Rng;

use crate::core::input::Direction;

pub const GRID: i32 = 20;
pub const START_SPEED: Duration = Duration::from_millis(110);
const MIN_SPEED: Duration = Duration::from_millis(70);
const SPEEDUP: Duration = Duration::from_millis(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Moved,
    Ate,
    Died,
}

#[derive(Debug, Clone)]
pub struct SnakeState {
    /// Head first.
    pub body: VecDeque<(i32, i32)>,
    pub heading: Direction,
    pub food: (i32, i32),
    pub score: u32,
    pub alive: bool,
    pub speed: Duration,
}

impl Default for SnakeState {
    fn default() -> Self {
        Self {
            body: VecDeque::from([(GRID / 2, GRID / 2)]),
            heading: Direction::Right,
            food: (5, 5),
            score: 0,
            alive: true,
            speed: START_SPEED,
        }
    }
}

impl SnakeState {
    /// Only quarter turns are accepted; reversing is ignored.
    pub fn turn(&mut self, direction: Direction) {
        let (dx, _) = self.heading.delta();
        let (ndx, _) = direction.delta();
        if (dx == 0) != (ndx == 0) {
            self.heading = direction;
        }
    }

    pub fn step(&mut self, rng: &mut impl Rng) -> Step {
        if !self.alive {
            return Step::Died;
        }
        let (hx, hy) = self.body.front().copied().unwrap_or((GRID / 2, GRID / 2));
        let (dx, dy) = self.heading.delta();
        let head = (hx + dx, hy + dy);

        self.body.push_front(head);
        let ate = head == self.food;
        if ate {
            self.score += 1;
            if self.speed > MIN_SPEED {
                self.speed -= SPEEDUP;
            }
            self.place_food(rng);
        } else {
            self.body.pop_back();
        }

        let out_of_bounds = !(0..GRID).contains(&head.0) || !(0..GRID).contains(&head.1);
        let bit_itself = self.body.iter().skip(1).any(|&p| p == head);
        if out_of_bounds || bit_itself {
            self.alive = false;
            return Step::Died;
        }
        if ate {
            Step::Ate
        } else {
            Step::Moved
        }
    }

    fn place_food(&mut self, rng: &mut impl Rng) {
        if self.body.len() >= (GRID * GRID) as usize {
            return;
        }
        loop {
            let food = (rng.random_range(0..GRID), rng.random_range(0..GRID));
            if !self.body.contains(&food) {
                self.food = food;
                return;
            }
        }
    }
}
