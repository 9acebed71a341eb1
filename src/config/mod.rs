//! Per-model policies and collaborators.
//!
//! Everything the engine would otherwise take from process-wide state (the
//! logger, the random source used by Choice pseudostates, the internal
//! transition completion flag) is carried by a `Config` value owned by each
//! model, so models with different policies can run side by side.

mod logger;

pub use logger::{Logger, NullLogger, TracingLogger};

use rand::Rng;
use std::fmt;
use std::sync::Arc;

/// Type alias for the random index source: returns a value in `[0, max)`.
pub type RandomIndex = Arc<dyn Fn(usize) -> usize + Send + Sync>;

/// What the engine does after reporting a recoverable modeling error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Stop the evaluation and return the error to the caller.
    Abort,

    /// Continue as if no transition had fired, after logging the error.
    #[default]
    IgnoreAndLog,
}

/// Engine configuration.
#[derive(Clone)]
pub struct Config {
    pub logger: Arc<dyn Logger>,
    pub random: RandomIndex,
    pub internal_transitions_trigger_completion: bool,
    pub on_error: ErrorPolicy,
}

impl Config {
    pub fn new() -> Self {
        Self {
            logger: Arc::new(TracingLogger),
            random: Arc::new(|max| rand::thread_rng().gen_range(0..max)),
            internal_transitions_trigger_completion: false,
            on_error: ErrorPolicy::default(),
        }
    }

    /// Replace the logger.
    pub fn with_logger<L: Logger + 'static>(mut self, logger: L) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    /// Replace the random index source used to pick among Choice branches.
    pub fn with_random<F>(mut self, random: F) -> Self
    where
        F: Fn(usize) -> usize + Send + Sync + 'static,
    {
        self.random = Arc::new(random);
        self
    }

    /// Make internal transitions re-check completion of their source state.
    pub fn internal_transitions_trigger_completion(mut self, value: bool) -> Self {
        self.internal_transitions_trigger_completion = value;
        self
    }

    /// Set the modeling error policy.
    pub fn on_error(mut self, policy: ErrorPolicy) -> Self {
        self.on_error = policy;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field(
                "internal_transitions_trigger_completion",
                &self.internal_transitions_trigger_completion,
            )
            .field("on_error", &self.on_error)
            .finish_non_exhaustive()
    }
}
