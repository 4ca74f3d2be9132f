use rand::Rng;

pub const WIDTH: f32 = 360.0;
pub const HEIGHT: f32 = 480.0;
const BIRD_X: f32 = 80.0;
const RADIUS: f32 = 12.0;
const GRAVITY: f32 = 0.5;
const JUMP: f32 = -8.0;
const PIPE_WIDTH: f32 = 52.0;
const PIPE_GAP: f32 = 120.0;
const PIPE_SPEED: f32 = 2.0;
const PIPE_EVERY: u32 = 120;

#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub x: f32,
    /// Bottom edge of the upper pipe; the gap starts here.
    pub top: f32,
    pub passed: bool,
}

impl Pipe {
    fn random(x: f32, rng: &mut impl Rng) -> Self {
        Self {
            x,
            top: 60.0 + rng.random_range(0.0..220.0),
            passed: false,
        }
    }

    pub fn covers(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + PIPE_WIDTH && (y < self.top || y > self.top + PIPE_GAP)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Flying,
    Scored,
    Crashed,
    /// Nothing moves until the next flap.
    Dead,
}

#[derive(Debug, Clone)]
pub struct Flight {
    pub bird_y: f32,
    pub velocity: f32,
    pub pipes: Vec<Pipe>,
    pub frame: u32,
    pub alive: bool,
    pub score: u32,
}

impl Flight {
    pub fn new(rng: &mut impl Rng) -> Self {
        Self {
            bird_y: 200.0,
            velocity: 0.0,
            pipes: (0..3).map(|i| Pipe::random(WIDTH + i as f32 * 180.0, rng)).collect(),
            frame: 0,
            alive: true,
            score: 0,
        }
    }

    pub fn bird_x(&self) -> f32 {
        BIRD_X
    }

    /// Flap; after a crash this starts a fresh flight first.
    pub fn flap(&mut self, rng: &mut impl Rng) {
        if !self.alive {
            *self = Self::new(rng);
        }
        self.velocity = JUMP;
    }

    pub fn tick(&mut self, rng: &mut impl Rng) -> Tick {
        if !self.alive {
            return Tick::Dead;
        }
        self.frame += 1;
        if self.frame % PIPE_EVERY == 0 {
            self.pipes.push(Pipe::random(WIDTH, rng));
        }
        self.velocity += GRAVITY;
        self.bird_y += self.velocity;
        for pipe in &mut self.pipes {
            pipe.x -= PIPE_SPEED;
        }
        self.pipes.retain(|p| p.x + PIPE_WIDTH > -10.0);

        let y = self.bird_y;
        let mut scored = false;
        for pipe in &mut self.pipes {
            let overlaps = BIRD_X + RADIUS > pipe.x && BIRD_X - RADIUS < pipe.x + PIPE_WIDTH;
            if overlaps && (y - RADIUS < pipe.top || y + RADIUS > pipe.top + PIPE_GAP) {
                self.alive = false;
            }
            if !pipe.passed && pipe.x + PIPE_WIDTH < BIRD_X - RADIUS {
                pipe.passed = true;
                self.score += 1;
                scored = true;
            }
        }
        if y > HEIGHT - RADIUS || y < RADIUS {
            self.alive = false;
        }

        if !self.alive {
            Tick::Crashed
        } else if scored {
            Tick::Scored
        } else {
            Tick::Flying
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falling_into_the_floor_crashes_once() {
        let mut rng = rand::rng();
        let mut flight = Flight::new(&mut rng);
        flight.pipes.clear();
        let mut ticks = 0;
        let crash = loop {
            ticks += 1;
            match flight.tick(&mut rng) {
                Tick::Flying => continue,
                other => break other,
            }
        };
        assert_eq!(crash, Tick::Crashed);
        assert!(ticks < 60);
        assert_eq!(flight.tick(&mut rng), Tick::Dead);

        flight.flap(&mut rng);
        assert!(flight.alive);
        assert_eq!(flight.score, 0);
        assert_eq!(flight.velocity, JUMP);
    }

    #[test]
    fn passing_a_pipe_scores() {
        let mut rng = rand::rng();
        let mut flight = Flight::new(&mut rng);
        flight.pipes = vec![Pipe {
            x: BIRD_X - RADIUS - PIPE_WIDTH + 1.0,
            top: 0.0,
            passed: false,
        }];
        flight.bird_y = 100.0;
        assert_eq!(flight.tick(&mut rng), Tick::Scored);
        assert_eq!(flight.score, 1);
    }
}
