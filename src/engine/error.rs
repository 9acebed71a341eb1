//! Engine error types.

use crate::core::ActionError;
use thiserror::Error;

/// Faults in the model itself, detected while compiling or evaluating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelingError {
    #[error("{state}: multiple outbound transitions evaluated true for message {message}")]
    AmbiguousTransition { state: String, message: String },

    #[error("{pseudo_state}: multiple outbound transition guards returned true for {message}")]
    AmbiguousJunction { pseudo_state: String, message: String },

    #[error("{pseudo_state}: no outbound transition or else transition for {message}")]
    NoEligibleTransition { pseudo_state: String, message: String },

    #[error("{pseudo_state}: no outgoing transition to follow on entry")]
    MissingInitialTransition { pseudo_state: String },

    #[error("local transition {transition} does not target a descendant of its source")]
    LocalTargetNotDescendant { transition: String },
}

/// Errors returned by `initialise_instance` and `evaluate`.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("state machine {0} has not been initialised since its last change")]
    NotInitialised(String),

    #[error(transparent)]
    Modeling(#[from] ModelingError),

    #[error(transparent)]
    Action(#[from] ActionError),
}
