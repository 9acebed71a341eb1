//! Core model vocabulary.
//!
//! This module contains the pieces every other layer builds on:
//! - Handles addressing regions, vertices and transitions
//! - Vertex and transition kinds
//! - The structural `Topology` arena and its ancestry queries
//! - Triggers, guards and the action type
//!
//! Nothing here runs behavior; the engine does that.

pub mod ancestry;
mod action;
mod element;
mod guard;
mod kind;
mod topology;

pub use action::{action, Action, ActionError};
pub use element::{Element, Parent, PseudoStateId, RegionId, StateId, TransitionId, VertexId};
pub use guard::{Guard, GuardContext, Trigger};
pub use kind::{PseudoStateKind, TransitionKind, VertexKind};
pub use topology::{
    RegionNode, Topology, TransitionNode, VertexNode, DEFAULT_REGION_NAME, DEFAULT_SEPARATOR,
};
