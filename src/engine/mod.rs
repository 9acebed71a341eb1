//! Compilation and evaluation.
//!
//! `initialise` turns a model into a `Compiled` program of flat step
//! sequences; `initialise_instance` and `evaluate` run that program against
//! an instance.

mod compiler;
mod error;
mod evaluator;

pub use compiler::{Compiled, ElementBehavior, Step};
pub use error::{EngineError, ModelingError};
