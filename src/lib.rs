pub mod cli;
pub mod core;
pub mod games;
pub mod logging;

// Re-export for convenience
pub use crate::core::game::{GameFactory, InitResult, ScoreReporter, Teardown};
pub use crate::core::host::{GameHost, HostContext, HostState};
pub use crate::core::score::{ScoreStore, ScoreValue};
