//! Statechart: hierarchical state machines compiled once, run many times
//!
//! A model is built from states, regions, pseudostates and transitions.
//! Compiling it derives, for every element and every transition, the flat
//! sequence of exit, effect and entry steps to run, so evaluating a message
//! never recomputes paths through the hierarchy. Each run of the model is
//! an independent instance that holds only its active state configuration.
//!
//! # Core Concepts
//!
//! - **Model**: `StateMachine<M, Env>` over a caller message type `M` and an
//!   environment `Env` handed to guards and actions
//! - **Instances**: `MemoryInstance` for in-process runs, `JsonInstance` for
//!   runs that must be persisted and restored
//! - **Actions**: Stillwater effects, awaited one at a time in order
//! - **Validation**: structural checks that accumulate every violation
//!
//! # Example
//!
//! ```rust
//! use statechart::core::PseudoStateKind;
//! use statechart::{MemoryInstance, StateMachine};
//!
//! # futures::executor::block_on(async {
//! let mut model: StateMachine<&str, ()> = StateMachine::new("light");
//! let root = model.root();
//! let initial = model.pseudo_state("initial", root, PseudoStateKind::Initial);
//! let off = model.state("off", root);
//! let on = model.state("on", root);
//! model.to(initial, off);
//! model.to(off, on).on("turn on");
//! model.to(on, off).on("turn off");
//!
//! let mut instance = MemoryInstance::new("kitchen");
//! model.initialise_instance(&mut instance, &()).await.unwrap();
//!
//! assert!(model.evaluate(&mut instance, &"turn on", &()).await.unwrap());
//! assert!(model.is_active(&instance, on));
//! assert!(!model.evaluate(&mut instance, &"turn on", &()).await.unwrap());
//! # });
//! ```

pub mod builder;
pub mod checkpoint;
pub mod config;
pub mod core;
pub mod engine;
pub mod instance;
pub mod model;
pub mod validation;

// Re-export commonly used types
pub use crate::builder::{BuildError, StateBuilder, TransitionBuilder};
pub use crate::checkpoint::{Checkpoint, CheckpointError};
pub use crate::config::{Config, ErrorPolicy, Logger, TracingLogger};
pub use crate::core::{action, ActionError, Guard, PseudoStateKind, TransitionKind, Trigger};
pub use crate::engine::{EngineError, ModelingError};
pub use crate::instance::{Instance, JsonInstance, MemoryInstance};
pub use crate::model::StateMachine;
pub use crate::validation::{ModelViolation, Severity};
