//! The state machine model.
//!
//! A `StateMachine` pairs the structural `Topology` with the caller's
//! behavior (entry and exit actions, guards, transition effects) and keeps
//! the compiled program produced from them.

mod machine;

pub use machine::{StateBehavior, StateMachine, TransitionBehavior};
