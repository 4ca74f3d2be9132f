use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use tracing::trace;

/// The one direction vocabulary shared by arrows, swipes and the dpad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Arrow keys map 1:1; everything else is not a direction.
    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Up => Some(Direction::Up),
            KeyCode::Down => Some(Direction::Down),
            KeyCode::Left => Some(Direction::Left),
            KeyCode::Right => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Unit step as (dx, dy), y growing downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other => Err(format!("unknown direction '{other}'")),
        }
    }
}

/// Thresholds that decide whether a gesture is a swipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeConfig {
    /// Gestures must be strictly shorter than this.
    pub max_duration: Duration,
    /// The dominant axis must move strictly further than this, in pixels.
    pub min_distance: f32,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            max_duration: Duration::from_millis(500),
            min_distance: 25.0,
        }
    }
}

/// Classifies a finished gesture. The larger absolute delta picks the axis
/// (ties go vertical) and its sign picks the direction.
pub fn classify_swipe(dx: f32, dy: f32, dt: Duration, config: &SwipeConfig) -> Option<Direction> {
    let (adx, ady) = (dx.abs(), dy.abs());
    if dt >= config.max_duration || adx.max(ady) <= config.min_distance {
        return None;
    }
    if adx > ady {
        Some(if dx > 0.0 { Direction::Right } else { Direction::Left })
    } else {
        Some(if dy > 0.0 { Direction::Down } else { Direction::Up })
    }
}

pub type DirectionHandler = Box<dyn FnMut(Direction)>;

#[derive(Debug, Clone, Copy)]
struct GestureStart {
    x: f32,
    y: f32,
    at: Instant,
}

struct RouterState {
    handler: Option<DirectionHandler>,
    bound: bool,
    /// Bumped on every bind/unbind so a dispatch can tell whether its
    /// handler was replaced while it ran.
    generation: u64,
    gesture: Option<GestureStart>,
    swipe: SwipeConfig,
    dpad_visible: bool,
}

/// Normalizes keyboard arrows, swipes and dpad taps into one direction
/// stream with at most one subscriber.
#[derive(Clone)]
pub struct InputRouter {
    state: Rc<RefCell<RouterState>>,
}

impl InputRouter {
    pub fn new(swipe: SwipeConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(RouterState {
                handler: None,
                bound: false,
                generation: 0,
                gesture: None,
                swipe,
                dpad_visible: false,
            })),
        }
    }

    /// Replaces any previous handler.
    pub fn bind(&self, handler: impl FnMut(Direction) + 'static) {
        let mut state = self.state.borrow_mut();
        state.handler = Some(Box::new(handler));
        state.bound = true;
        state.generation += 1;
        state.gesture = None;
    }

    /// Drops the handler, any half-finished gesture and the dpad. The old
    /// handler is never invoked again.
    pub fn unbind(&self) {
        let mut state = self.state.borrow_mut();
        state.handler = None;
        state.bound = false;
        state.generation += 1;
        state.gesture = None;
        state.dpad_visible = false;
    }

    pub fn is_bound(&self) -> bool {
        self.state.borrow().bound
    }

    pub fn show_dpad(&self, visible: bool) {
        self.state.borrow_mut().dpad_visible = visible;
    }

    pub fn dpad_visible(&self) -> bool {
        self.state.borrow().dpad_visible
    }

    pub fn swipe_config(&self) -> SwipeConfig {
        self.state.borrow().swipe
    }

    /// Keyboard channel. Returns `true` when `code` is a direction key
    /// (whether or not anyone was listening).
    pub fn key(&self, code: KeyCode) -> bool {
        match Direction::from_key(code) {
            Some(direction) => {
                self.dispatch(direction);
                true
            }
            None => false,
        }
    }

    /// Directional pad channel.
    pub fn dpad(&self, direction: Direction) -> bool {
        self.dispatch(direction)
    }

    /// Swipe channel: pointer went down at pixel position (`x`, `y`).
    pub fn gesture_start(&self, x: f32, y: f32, at: Instant) {
        self.state.borrow_mut().gesture = Some(GestureStart { x, y, at });
    }

    /// Swipe channel: pointer released. Emits the classified direction, if
    /// any, and returns it.
    pub fn gesture_end(&self, x: f32, y: f32, at: Instant) -> Option<Direction> {
        let (start, swipe) = {
            let mut state = self.state.borrow_mut();
            (state.gesture.take()?, state.swipe)
        };
        let dt = at.saturating_duration_since(start.at);
        let direction = classify_swipe(x - start.x, y - start.y, dt, &swipe)?;
        trace!(%direction, ?dt, "swipe recognized");
        self.dispatch(direction);
        Some(direction)
    }

    /// Delivers `direction` to the bound handler. Returns whether a handler
    /// received it.
    pub fn dispatch(&self, direction: Direction) -> bool {
        let (mut handler, generation) = {
            let mut state = self.state.borrow_mut();
            match state.handler.take() {
                Some(handler) => (handler, state.generation),
                None => return false,
            }
        };

        handler(direction);

        // Put the handler back unless it was replaced or unbound meanwhile.
        let mut state = self.state.borrow_mut();
        if state.generation == generation {
            state.handler = Some(handler);
        }
        true
    }
}

impl Default for InputRouter {
    fn default() -> Self {
        Self::new(SwipeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn recording_router() -> (InputRouter, Rc<RefCell<Vec<Direction>>>) {
        let router = InputRouter::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        router.bind(move |d| sink.borrow_mut().push(d));
        (router, seen)
    }

    #[test]
    fn swipe_examples() {
        let cfg = SwipeConfig::default();
        assert_eq!(classify_swipe(30.0, 0.0, ms(400), &cfg), Some(Direction::Right));
        assert_eq!(classify_swipe(30.0, 0.0, ms(600), &cfg), None);
        assert_eq!(classify_swipe(10.0, 40.0, ms(100), &cfg), Some(Direction::Down));
        assert_eq!(classify_swipe(-26.0, 3.0, ms(10), &cfg), Some(Direction::Left));
        assert_eq!(classify_swipe(0.0, -80.0, ms(10), &cfg), Some(Direction::Up));
    }

    #[test]
    fn swipe_thresholds_are_strict() {
        let cfg = SwipeConfig::default();
        assert_eq!(classify_swipe(25.0, 0.0, ms(10), &cfg), None);
        assert_eq!(classify_swipe(40.0, 0.0, ms(500), &cfg), None);
        // Diagonal ties resolve vertically.
        assert_eq!(classify_swipe(30.0, 30.0, ms(10), &cfg), Some(Direction::Down));
    }

    #[test]
    fn arrows_are_directions_other_keys_are_not() {
        let (router, seen) = recording_router();
        assert!(router.key(KeyCode::Left));
        assert!(!router.key(KeyCode::Char(' ')));
        assert_eq!(*seen.borrow(), vec![Direction::Left]);
    }

    #[test]
    fn gesture_is_delivered_through_handler() {
        let (router, seen) = recording_router();
        let t0 = Instant::now();
        router.gesture_start(100.0, 100.0, t0);
        assert_eq!(router.gesture_end(100.0, 60.0, t0 + ms(120)), Some(Direction::Up));
        // A second end without a start is ignored.
        assert_eq!(router.gesture_end(200.0, 60.0, t0 + ms(130)), None);
        assert_eq!(*seen.borrow(), vec![Direction::Up]);
    }

    #[test]
    fn bind_replaces_previous_handler() {
        let (router, first) = recording_router();
        let second = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&second);
        router.bind(move |d| sink.borrow_mut().push(d));

        router.dpad(Direction::Right);
        assert!(first.borrow().is_empty());
        assert_eq!(*second.borrow(), vec![Direction::Right]);
    }

    #[test]
    fn unbind_discards_in_flight_gesture() {
        let (router, seen) = recording_router();
        let t0 = Instant::now();
        router.gesture_start(0.0, 0.0, t0);
        router.unbind();
        assert!(!router.is_bound());
        assert_eq!(router.gesture_end(90.0, 0.0, t0 + ms(50)), None);
        assert!(!router.dpad(Direction::Left));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn handler_may_unbind_itself() {
        let router = InputRouter::default();
        let inner = router.clone();
        let count = Rc::new(RefCell::new(0));
        let hits = Rc::clone(&count);
        router.bind(move |_| {
            *hits.borrow_mut() += 1;
            inner.unbind();
        });
        assert!(router.dpad(Direction::Up));
        assert!(!router.dpad(Direction::Up));
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn direction_names_parse() {
        for d in Direction::ALL {
            assert_eq!(d.as_str().parse::<Direction>(), Ok(d));
            assert_eq!(d.opposite().opposite(), d);
        }
        assert!("north".parse::<Direction>().is_err());
    }

    proptest! {
        #[test]
        fn slow_gestures_never_swipe(dx in -500.0f32..500.0, dy in -500.0f32..500.0, extra in 0u64..5_000) {
            let cfg = SwipeConfig::default();
            prop_assert_eq!(classify_swipe(dx, dy, ms(500 + extra), &cfg), None);
        }

        #[test]
        fn recognized_swipes_follow_dominant_axis(dx in -500.0f32..500.0, dy in -500.0f32..500.0, dt in 0u64..500) {
            let cfg = SwipeConfig::default();
            match classify_swipe(dx, dy, ms(dt), &cfg) {
                Some(Direction::Left) => prop_assert!(dx < 0.0 && dx.abs() > dy.abs()),
                Some(Direction::Right) => prop_assert!(dx > 0.0 && dx.abs() > dy.abs()),
                Some(Direction::Up) => prop_assert!(dy < 0.0 && dy.abs() >= dx.abs()),
                Some(Direction::Down) => prop_assert!(dy > 0.0 && dy.abs() >= dx.abs()),
                None => prop_assert!(dx.abs().max(dy.abs()) <= cfg.min_distance),
            }
        }
    }
}
