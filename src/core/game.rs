/// Core game interface: the one contract every hosted game implements.
use std::fmt;
use std::rc::Rc;

use anyhow::Result;

use crate::core::host::HostContext;
use crate::core::score::ScoreValue;

/// Zero-argument cleanup returned by a game factory. Consumed when run, so
/// it can only ever run once.
pub struct Teardown(Box<dyn FnOnce() -> Result<()>>);

impl Teardown {
    pub fn new(release: impl FnOnce() -> Result<()> + 'static) -> Self {
        Self(Box::new(release))
    }

    pub fn noop() -> Self {
        Self::new(|| Ok(()))
    }

    pub fn run(self) -> Result<()> {
        (self.0)()
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Teardown")
    }
}

/// Callback a game uses to propose a new best score, any number of times.
#[derive(Clone)]
pub struct ScoreReporter {
    sink: Rc<dyn Fn(ScoreValue)>,
}

impl ScoreReporter {
    pub fn new(sink: impl Fn(ScoreValue) + 'static) -> Self {
        Self { sink: Rc::new(sink) }
    }

    /// A reporter that drops everything.
    pub fn discard() -> Self {
        Self::new(|_| {})
    }

    pub fn report(&self, value: impl Into<ScoreValue>) {
        (self.sink)(value.into());
    }
}

impl fmt::Debug for ScoreReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ScoreReporter")
    }
}

/// What a factory returns: an optional teardown, or why it could not start.
pub type InitResult = Result<Option<Teardown>>;

/// Creates a running game instance inside the host context.
///
/// The game may draw into `ctx.mount`, bind `ctx.input`, register a resume
/// hook on `ctx.pause` and schedule work on `ctx.scheduler`. Whatever it
/// acquires must be released by the returned teardown, if any.
pub trait GameFactory {
    fn init(&self, ctx: &HostContext, report: ScoreReporter) -> InitResult;
}

impl<F> GameFactory for F
where
    F: Fn(&HostContext, ScoreReporter) -> InitResult,
{
    fn init(&self, ctx: &HostContext, report: ScoreReporter) -> InitResult {
        self(ctx, report)
    }
}
