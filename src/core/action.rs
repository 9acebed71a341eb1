//! User-defined behavior run on entry, exit and transition traversal.
//!
//! Actions are factories of Stillwater effects: each invocation produces a
//! fresh effect that the engine runs against the caller's environment and
//! awaits before moving on to the next action.

use super::guard::Trigger;
use std::sync::Arc;
use stillwater::effect::BoxedEffect;
use stillwater::prelude::*;
use thiserror::Error;

/// Failure reported by a user action. Propagates unchanged to the caller of
/// `evaluate` or `initialise_instance`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("action failed: {message}")]
pub struct ActionError {
    pub message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Type alias for action factories.
pub type Action<M, Env> =
    Arc<dyn Fn(&Trigger<'_, M>) -> BoxedEffect<(), ActionError, Env> + Send + Sync>;

/// Wrap a plain function of the environment as an action factory.
///
/// # Example
///
/// ```rust
/// use statechart::core::{action, ActionError, Trigger};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// #[derive(Clone, Default)]
/// struct Counter(Arc<AtomicUsize>);
///
/// let increment = action::<(), Counter, _>(|counter: &Counter| {
///     counter.0.fetch_add(1, Ordering::SeqCst);
///     Ok::<(), ActionError>(())
/// });
/// # let _ = increment;
/// ```
pub fn action<M, Env, F>(
    f: F,
) -> impl Fn(&Trigger<'_, M>) -> BoxedEffect<(), ActionError, Env> + Clone + Send + Sync + 'static
where
    M: 'static,
    Env: Clone + Send + Sync + 'static,
    F: Fn(&Env) -> Result<(), ActionError> + Clone + Send + Sync + 'static,
{
    move |_: &Trigger<'_, M>| from_fn(f.clone()).boxed()
}
