use rand::Rng;

pub const WIDTH: f32 = 480.0;
pub const HEIGHT: f32 = 300.0;
pub const PADDLE: f32 = 60.0;
pub const THICK: f32 = 8.0;
pub const RADIUS: f32 = 8.0;
const MARGIN: f32 = 10.0;
const AI_SPEED: f32 = 2.2;
const SPEEDUP: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rally {
    Continue,
    /// Player returned the ball.
    Returned,
    /// Computer returned the ball.
    Countered,
    /// Ball left the court; carries the rally score.
    Over(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PongState {
    pub ball: (f32, f32),
    pub velocity: (f32, f32),
    /// Paddle centers.
    pub left: f32,
    pub right: f32,
    pub score: u32,
}

impl Default for PongState {
    fn default() -> Self {
        Self {
            ball: (WIDTH / 2.0, HEIGHT / 2.0),
            velocity: (3.0, 2.5),
            left: HEIGHT / 2.0,
            right: HEIGHT / 2.0,
            score: 0,
        }
    }
}

fn clamp_paddle(y: f32) -> f32 {
    y.clamp(PADDLE / 2.0, HEIGHT - PADDLE / 2.0)
}

impl PongState {
    pub fn set_left(&mut self, y: f32) {
        self.left = clamp_paddle(y);
    }

    pub fn nudge_left(&mut self, dy: f32) {
        self.set_left(self.left + dy);
    }

    pub fn step(&mut self, rng: &mut impl Rng) -> Rally {
        let (mut bx, mut by) = self.ball;
        let (mut vx, mut vy) = self.velocity;
        bx += vx;
        by += vy;
        if by < RADIUS || by > HEIGHT - RADIUS {
            vy = -vy;
        }

        self.right = clamp_paddle(self.right + (by - self.right).signum() * AI_SPEED);

        let mut rally = Rally::Continue;
        if bx - RADIUS < MARGIN + THICK && (by - self.left).abs() < PADDLE / 2.0 {
            vx = vx.abs() + SPEEDUP;
            self.score += 1;
            rally = Rally::Returned;
        }
        if bx + RADIUS > WIDTH - MARGIN - THICK && (by - self.right).abs() < PADDLE / 2.0 {
            vx = -(vx.abs() + SPEEDUP);
            rally = Rally::Countered;
        }

        if !(0.0..=WIDTH).contains(&bx) {
            let score = self.score;
            self.score = 0;
            bx = WIDTH / 2.0;
            by = HEIGHT / 2.0;
            vx = if rng.random_bool(0.5) { 3.0 } else { -3.0 };
            vy = if rng.random_bool(0.5) { 2.0 } else { -2.0 };
            rally = Rally::Over(score);
        }

        self.ball = (bx, by);
        self.velocity = (vx, vy);
        rally
    }
}
