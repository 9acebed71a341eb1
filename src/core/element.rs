//! Handles addressing elements of a state machine model.
//!
//! The model is an arena; every region, vertex and transition is referred
//! to by a small `Copy` handle rather than by reference. Handles stay valid
//! for the lifetime of the model, including after the element is removed.

use serde::{Deserialize, Serialize};

/// Handle to a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId(pub(crate) usize);

/// Handle to any vertex: pseudostate, state, final state or the machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub(crate) usize);

/// Handle to a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransitionId(pub(crate) usize);

/// Handle to a vertex known to be a state (including the machine root).
///
/// Only states may own regions or carry entry/exit behavior, so builder
/// operations that need one take a `StateId`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(pub(crate) VertexId);

/// Handle to a vertex known to be a pseudostate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PseudoStateId(pub(crate) VertexId);

impl StateId {
    pub fn vertex(self) -> VertexId {
        self.0
    }
}

impl PseudoStateId {
    pub fn vertex(self) -> VertexId {
        self.0
    }
}

impl From<StateId> for VertexId {
    fn from(id: StateId) -> Self {
        id.0
    }
}

impl From<PseudoStateId> for VertexId {
    fn from(id: PseudoStateId) -> Self {
        id.0
    }
}

/// A named element of the model that has a place in the ownership tree.
///
/// Regions are owned by states; vertices are owned by regions (the machine
/// root has no owner).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element {
    Region(RegionId),
    Vertex(VertexId),
}

impl From<RegionId> for Element {
    fn from(id: RegionId) -> Self {
        Element::Region(id)
    }
}

impl From<VertexId> for Element {
    fn from(id: VertexId) -> Self {
        Element::Vertex(id)
    }
}

impl From<StateId> for Element {
    fn from(id: StateId) -> Self {
        Element::Vertex(id.0)
    }
}

impl From<PseudoStateId> for Element {
    fn from(id: PseudoStateId) -> Self {
        Element::Vertex(id.0)
    }
}

/// Where a new vertex is placed.
///
/// Passing a state places the vertex in that state's default region,
/// creating the region on first use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parent {
    Region(RegionId),
    State(StateId),
}

impl From<RegionId> for Parent {
    fn from(id: RegionId) -> Self {
        Parent::Region(id)
    }
}

impl From<StateId> for Parent {
    fn from(id: StateId) -> Self {
        Parent::State(id)
    }
}
