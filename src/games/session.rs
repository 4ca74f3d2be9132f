//! Glue between one game's state and the host context.
//!
//! A game keeps its state in a plain struct implementing [`Screen`] and
//! wires its handlers through a [`Session`]. Every handler gets the session
//! back, so it can mutate the state, schedule follow-up work and have the
//! panel redrawn without juggling `Rc` clones itself.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::KeyEvent;

use crate::core::host::HostContext;
use crate::core::input::Direction;
use crate::core::scheduler::{FrameControl, TaskId};

/// Anything that can draw itself as panel text.
pub trait Screen: 'static {
    fn render(&self) -> Vec<String>;
}

pub struct Session<S> {
    state: Rc<RefCell<S>>,
    ctx: HostContext,
}

impl<S> Clone for Session<S> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            ctx: self.ctx.clone(),
        }
    }
}

impl<S: Screen> Session<S> {
    /// Takes ownership of `state` and draws it once.
    pub fn start(ctx: &HostContext, state: S) -> Self {
        let session = Self {
            state: Rc::new(RefCell::new(state)),
            ctx: ctx.clone(),
        };
        session.redraw();
        session
    }

    pub fn ctx(&self) -> &HostContext {
        &self.ctx
    }

    pub fn is_paused(&self) -> bool {
        self.ctx.pause.is_paused()
    }

    pub fn redraw(&self) {
        let lines = self.state.borrow().render();
        self.ctx.mount.set_lines(lines);
    }

    /// Mutates the state, then redraws. `f` must not call back into the
    /// session.
    pub fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let result = f(&mut self.state.borrow_mut());
        self.redraw();
        result
    }

    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Non-direction keys delivered to the panel.
    pub fn on_key(&self, mut handler: impl FnMut(&Self, KeyEvent) + 'static) {
        let session = self.clone();
        self.ctx.mount.on_key(move |key| handler(&session, key));
    }

    /// Clicks inside the panel, in panel-relative cells.
    pub fn on_pointer(&self, mut handler: impl FnMut(&Self, u16, u16) + 'static) {
        let session = self.clone();
        self.ctx.mount.on_pointer(move |col, row| handler(&session, col, row));
    }

    /// Binds the input router: arrows, swipes and dpad taps.
    pub fn on_direction(&self, mut handler: impl FnMut(&Self, Direction) + 'static) {
        let session = self.clone();
        self.ctx.input.bind(move |direction| handler(&session, direction));
    }

    pub fn every(&self, period: Duration, mut run: impl FnMut(&Self) + 'static) -> TaskId {
        let session = self.clone();
        self.ctx.scheduler.every(period, move || run(&session))
    }

    pub fn after(&self, delay: Duration, run: impl FnOnce(&Self) + 'static) -> TaskId {
        let session = self.clone();
        self.ctx.scheduler.after(delay, move || run(&session))
    }

    /// Self-rescheduling frame loop that stops itself while paused and is
    /// re-entered by the resume hook.
    pub fn frame_loop(&self, mut step: impl FnMut(&Self) + 'static) -> TaskId {
        let session = self.clone();
        let id = self.ctx.scheduler.frame(move || {
            if session.is_paused() {
                return FrameControl::Suspend;
            }
            step(&session);
            FrameControl::Continue
        });
        let scheduler = self.ctx.scheduler.clone();
        self.ctx.pause.register_resume_hook(move || {
            scheduler.resume(id);
        });
        id
    }
}

/// Maps a click to a cell of a grid drawn from `top` with cells of
/// `cell_width` x `cell_height` characters.
pub fn grid_cell(
    col: u16,
    row: u16,
    top: u16,
    (cell_width, cell_height): (u16, u16),
    (cols, rows): (usize, usize),
) -> Option<(usize, usize)> {
    if row < top || cell_width == 0 || cell_height == 0 {
        return None;
    }
    let c = usize::from(col / cell_width);
    let r = usize::from((row - top) / cell_height);
    (c < cols && r < rows).then_some((r, c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    struct Counter(u32);

    impl Screen for Counter {
        fn render(&self) -> Vec<String> {
            vec![format!("count {}", self.0)]
        }
    }

    #[test]
    fn update_redraws_the_panel() {
        let ctx = HostContext::default();
        let session = Session::start(&ctx, Counter(0));
        assert_eq!(ctx.mount.lines(), vec!["count 0".to_string()]);
        session.update(|c| c.0 += 2);
        assert_eq!(ctx.mount.lines(), vec!["count 2".to_string()]);
    }

    #[test]
    fn frame_loop_suspends_while_paused_and_resumes_via_hook() {
        let t0 = Instant::now();
        let ctx = HostContext::default();
        let session = Session::start(&ctx, Counter(0));
        let id = session.frame_loop(|s| s.update(|c| c.0 += 1));

        ctx.scheduler.pump(t0 + Duration::from_millis(16));
        assert_eq!(session.read(|c| c.0), 1);

        ctx.pause.toggle();
        ctx.scheduler.pump(t0 + Duration::from_millis(32));
        ctx.scheduler.pump(t0 + Duration::from_millis(48));
        assert!(ctx.scheduler.is_suspended(id));
        assert_eq!(session.read(|c| c.0), 1);

        ctx.pause.toggle();
        assert!(!ctx.scheduler.is_suspended(id));
        ctx.scheduler.pump(t0 + Duration::from_millis(64));
        assert_eq!(session.read(|c| c.0), 2);
    }

    #[test]
    fn grid_cell_hit_testing() {
        assert_eq!(grid_cell(5, 3, 1, (4, 2), (3, 3)), Some((1, 1)));
        assert_eq!(grid_cell(5, 0, 1, (4, 2), (3, 3)), None);
        assert_eq!(grid_cell(12, 1, 1, (4, 2), (3, 3)), None);
    }
}
