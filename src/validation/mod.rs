//! Structural validation of models.
//!
//! `StateMachine::validate` walks the model once and accumulates every
//! violation with Stillwater's `Validation` rather than stopping at the
//! first. Validation never changes the model and never blocks evaluation;
//! a model with violations can still be compiled and run.
//!
//! # Example
//!
//! ```rust
//! use statechart::core::PseudoStateKind;
//! use statechart::StateMachine;
//!
//! let mut model: StateMachine<(), ()> = StateMachine::new("machine");
//! let root = model.root();
//! model.pseudo_state("first", root, PseudoStateKind::Initial);
//! model.pseudo_state("second", root, PseudoStateKind::Initial);
//!
//! assert!(model.validate().is_failure());
//! ```

pub mod rules;
pub mod violations;

pub use violations::{ModelViolation, Severity};
