//! Errors raised while editing a model.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("The state machine root cannot be removed")]
    CannotRemoveRoot,

    #[error("{0} has already been removed from the model")]
    AlreadyRemoved(String),
}
