//! Fluent handles for editing a state machine model.
//!
//! Vertices, regions and transitions are created through `StateMachine`;
//! these builders borrow the model to attach guards, effects and entry or
//! exit behavior to what was created.

pub mod error;
pub mod state;
pub mod transition;

pub use error::BuildError;
pub use state::StateBuilder;
pub use transition::TransitionBuilder;
