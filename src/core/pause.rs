use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

pub type ResumeHook = Box<dyn FnMut()>;

#[derive(Default)]
struct PauseState {
    paused: bool,
    hook: Option<ResumeHook>,
    has_hook: bool,
    generation: u64,
}

/// One pause flag plus at most one resume hook.
///
/// The controller never suspends anything itself: interval-driven games poll
/// [`PauseController::is_paused`] at the top of each step, frame-driven games
/// stop rescheduling and rely on the hook to start again.
#[derive(Clone, Default)]
pub struct PauseController {
    state: Rc<RefCell<PauseState>>,
}

impl PauseController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    /// Flips the flag and returns the new value. On paused -> running the
    /// registered hook (if any) runs exactly once and stays registered.
    pub fn toggle(&self) -> bool {
        let resumed_hook = {
            let mut state = self.state.borrow_mut();
            state.paused = !state.paused;
            debug!(paused = state.paused, "pause toggled");
            if state.paused {
                return true;
            }
            let generation = state.generation;
            state.hook.take().map(|hook| (hook, generation))
        };

        if let Some((mut hook, generation)) = resumed_hook {
            hook();
            let mut state = self.state.borrow_mut();
            if state.generation == generation {
                state.hook = Some(hook);
            }
        }
        false
    }

    /// Replaces any previous hook.
    pub fn register_resume_hook(&self, hook: impl FnMut() + 'static) {
        let mut state = self.state.borrow_mut();
        state.hook = Some(Box::new(hook));
        state.has_hook = true;
        state.generation += 1;
    }

    pub fn clear_resume_hook(&self) {
        let mut state = self.state.borrow_mut();
        state.hook = None;
        state.has_hook = false;
        state.generation += 1;
    }

    pub fn has_resume_hook(&self) -> bool {
        self.state.borrow().has_hook
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counting_hook(pause: &PauseController) -> Rc<Cell<u32>> {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        pause.register_resume_hook(move || counter.set(counter.get() + 1));
        calls
    }

    #[test]
    fn toggle_without_hook_only_flips() {
        let pause = PauseController::new();
        assert!(!pause.is_paused());
        assert!(pause.toggle());
        assert!(pause.is_paused());
        assert!(!pause.toggle());
        assert!(!pause.is_paused());
    }

    #[test]
    fn hook_runs_once_per_resume_and_stays_registered() {
        let pause = PauseController::new();
        let calls = counting_hook(&pause);

        pause.toggle();
        assert_eq!(calls.get(), 0);
        pause.toggle();
        assert_eq!(calls.get(), 1);

        pause.toggle();
        pause.toggle();
        assert_eq!(calls.get(), 2);
        assert!(pause.has_resume_hook());
    }

    #[test]
    fn cleared_hook_never_fires() {
        let pause = PauseController::new();
        let calls = counting_hook(&pause);
        pause.toggle();
        pause.clear_resume_hook();
        pause.toggle();
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn register_replaces_previous_hook() {
        let pause = PauseController::new();
        let first = counting_hook(&pause);
        let second = counting_hook(&pause);
        pause.toggle();
        pause.toggle();
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn hook_observes_running_state_and_may_clear_itself() {
        let pause = PauseController::new();
        let inner = pause.clone();
        let saw_running = Rc::new(Cell::new(false));
        let flag = Rc::clone(&saw_running);
        pause.register_resume_hook(move || {
            flag.set(!inner.is_paused());
            inner.clear_resume_hook();
        });
        pause.toggle();
        pause.toggle();
        assert!(saw_running.get());
        assert!(!pause.has_resume_hook());
    }
}
