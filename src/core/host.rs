//! Lifecycle of the single active game.
//!
//! The host owns one [`HostContext`] for its whole life and lends it to
//! each game in turn. Switching games is always close-then-open, and close
//! releases every slot of the context whether or not the game's own
//! teardown succeeded.

use std::any::Any;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::Once;
use std::time::Instant;

use anyhow::anyhow;
use tracing::{debug, error, info};

use crate::core::error::HostError;
use crate::core::game::{GameFactory, ScoreReporter, Teardown};
use crate::core::input::{InputRouter, SwipeConfig};
use crate::core::mount::MountPoint;
use crate::core::pause::PauseController;
use crate::core::prefs::Sound;
use crate::core::registry::GameRegistry;
use crate::core::scheduler::Scheduler;
use crate::core::score::SharedScores;

/// Everything a running game may touch. Cloning a field shares it.
#[derive(Clone)]
pub struct HostContext {
    pub mount: MountPoint,
    pub input: InputRouter,
    pub pause: PauseController,
    pub scheduler: Scheduler,
    pub sound: Sound,
}

impl HostContext {
    pub fn new(swipe: SwipeConfig, sound: Sound, now: Instant) -> Self {
        Self {
            mount: MountPoint::new(),
            input: InputRouter::new(swipe),
            pause: PauseController::new(),
            scheduler: Scheduler::new(now),
            sound,
        }
    }

    /// Drops whatever the last game left behind: binding, resume hook,
    /// tasks, dpad, panel content and listeners.
    fn release(&self) {
        self.input.unbind();
        self.pause.clear_resume_hook();
        self.scheduler.cancel_all();
        self.mount.clear();
    }
}

impl Default for HostContext {
    fn default() -> Self {
        Self::new(SwipeConfig::default(), Sound::default(), Instant::now())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostState {
    Idle,
    Running(String),
}

struct ActiveGame {
    id: String,
    teardown: Teardown,
}

/// Id plus the factory it resolved to, kept so restart never re-reads the
/// catalog.
struct Selection {
    id: String,
    factory: Rc<dyn GameFactory>,
}

pub struct GameHost {
    context: HostContext,
    registry: Rc<GameRegistry>,
    scores: SharedScores,
    active: Option<ActiveGame>,
    selected: Option<Selection>,
}

impl GameHost {
    pub fn new(registry: Rc<GameRegistry>, scores: SharedScores, context: HostContext) -> Self {
        Self {
            context,
            registry,
            scores,
            active: None,
            selected: None,
        }
    }

    pub fn context(&self) -> &HostContext {
        &self.context
    }

    pub fn registry(&self) -> &GameRegistry {
        &self.registry
    }

    pub fn scores(&self) -> &SharedScores {
        &self.scores
    }

    pub fn state(&self) -> HostState {
        match &self.active {
            Some(active) => HostState::Running(active.id.clone()),
            None => HostState::Idle,
        }
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.id.as_str())
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_ref().map(|s| s.id.as_str())
    }

    /// Closes whatever is running, then starts `id`.
    pub fn open(&mut self, id: &str) -> Result<(), HostError> {
        self.close();
        let factory = self
            .registry
            .get(id)
            .map(|descriptor| Rc::clone(&descriptor.factory))
            .ok_or_else(|| HostError::UnknownGame(id.to_string()))?;
        self.selected = Some(Selection {
            id: id.to_string(),
            factory: Rc::clone(&factory),
        });
        self.start(id.to_string(), factory)
    }

    /// Closes the running game and re-runs the selected factory.
    pub fn restart(&mut self) -> Result<(), HostError> {
        let (id, factory) = match &self.selected {
            Some(selection) => (selection.id.clone(), Rc::clone(&selection.factory)),
            None => return Err(HostError::NothingSelected),
        };
        self.close();
        info!(game = %id, "restarting game");
        self.start(id, factory)
    }

    /// Runs the active teardown (failures are swallowed) and releases every
    /// context slot. Safe to call when idle.
    pub fn close(&mut self) {
        if let Some(active) = self.active.take() {
            let id = active.id;
            let teardown = active.teardown;
            if let Err(err) = isolate("teardown", &id, move || teardown.run()) {
                debug!(game = %id, error = %err, "teardown failed");
            }
            info!(game = %id, "game closed");
        }
        self.context.release();
    }

    fn start(&mut self, id: String, factory: Rc<dyn GameFactory>) -> Result<(), HostError> {
        let reporter = self.reporter_for(&id);
        let context = &self.context;
        let outcome = isolate("init", &id, || factory.init(context, reporter));
        match outcome {
            Ok(teardown) => {
                info!(game = %id, "game started");
                self.active = Some(ActiveGame {
                    id,
                    teardown: teardown.unwrap_or_else(Teardown::noop),
                });
                Ok(())
            }
            Err(err) => {
                error!(game = %id, error = %err, "game failed to start");
                self.context.release();
                Err(HostError::InitFailed {
                    id,
                    reason: format!("{err:#}"),
                })
            }
        }
    }

    fn reporter_for(&self, id: &str) -> ScoreReporter {
        let scores = Rc::clone(&self.scores);
        let id = id.to_string();
        ScoreReporter::new(move |value| {
            let Ok(mut store) = scores.try_borrow_mut() else {
                debug!(game = %id, "score store busy, report dropped");
                return;
            };
            match store.set(&id, value) {
                Ok(true) => debug!(game = %id, best = %store.display(&id), "new best score"),
                Ok(false) => {}
                Err(err) => error!(game = %id, error = %err, "failed to persist score"),
            }
        })
    }
}

impl Drop for GameHost {
    fn drop(&mut self) {
        self.close();
    }
}

thread_local! {
    /// (stage, game) of every `isolate` call running on this thread.
    static ISOLATED: RefCell<Vec<(&'static str, String)>> = const { RefCell::new(Vec::new()) };
}

static PANIC_HOOK: Once = Once::new();

/// Wraps the process panic hook once. Panics raised inside `isolate` on the
/// current thread become a debug log line; all others reach the previous hook.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let inner = ISOLATED.try_with(|stack| stack.borrow().last().cloned()).ok().flatten();
            match inner {
                Some((stage, game)) => debug!(game = %game, stage, panic = %info, "game panicked"),
                None => previous(info),
            }
        }));
    });
}

fn is_isolated() -> bool {
    ISOLATED.with(|stack| !stack.borrow().is_empty())
}

/// Runs `f`, turning a panic into an error. A contained panic neither
/// prints over the UI nor tears the terminal down.
fn isolate<T>(stage: &'static str, id: &str, f: impl FnOnce() -> anyhow::Result<T>) -> anyhow::Result<T> {
    install_panic_hook();
    ISOLATED.with(|stack| stack.borrow_mut().push((stage, id.to_string())));
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    ISOLATED.with(|stack| stack.borrow_mut().pop());
    match outcome {
        Ok(result) => result,
        Err(payload) => Err(anyhow!("{stage} panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
