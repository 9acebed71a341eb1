//! State machine instances.
//!
//! An instance holds the active state configuration of one run of a model:
//! the current vertex of each region, the last known state of each region
//! (for history and completion), and whether the run has terminated. It
//! owns no model data; region and vertex handles are resolved through the
//! model's `Topology`.

mod json;
mod memory;

pub use json::{ActiveStateNode, JsonInstance, Snapshot};
pub use memory::MemoryInstance;

use crate::core::{RegionId, Topology, VertexId};

/// Capability required by the engine to drive a run.
pub trait Instance {
    fn name(&self) -> &str;

    /// Record `vertex` as current in `region`. States also become the
    /// region's last known state.
    fn set_current(&mut self, topology: &Topology, region: RegionId, vertex: VertexId);

    fn current(&self, topology: &Topology, region: RegionId) -> Option<VertexId>;

    fn last_known_state(&self, topology: &Topology, region: RegionId) -> Option<VertexId>;

    fn is_terminated(&self) -> bool;

    /// Called when a Terminate pseudostate is entered.
    fn terminate(&mut self);

    /// Diagnostic hook receiving `evaluate`, `enter` and `leave` lines.
    fn trace(&mut self, _message: &str) {}
}
