use super::Instance;
use crate::core::{RegionId, Topology, VertexId};
use std::collections::HashMap;
use uuid::Uuid;

/// Map-backed instance for runs that never leave the process.
#[derive(Clone, Debug)]
pub struct MemoryInstance {
    name: String,
    trace_id: Uuid,
    current: HashMap<RegionId, VertexId>,
    last: HashMap<RegionId, VertexId>,
    terminated: bool,
}

impl MemoryInstance {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trace_id: Uuid::new_v4(),
            current: HashMap::new(),
            last: HashMap::new(),
            terminated: false,
        }
    }

    /// Identifier correlating this run's log lines.
    pub fn trace_id(&self) -> Uuid {
        self.trace_id
    }
}

impl Default for MemoryInstance {
    fn default() -> Self {
        Self::new("unnamed")
    }
}

impl Instance for MemoryInstance {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_current(&mut self, topology: &Topology, region: RegionId, vertex: VertexId) {
        self.current.insert(region, vertex);
        if topology.is_state(vertex) {
            self.last.insert(region, vertex);
        }
    }

    fn current(&self, _topology: &Topology, region: RegionId) -> Option<VertexId> {
        self.current.get(&region).copied()
    }

    fn last_known_state(&self, _topology: &Topology, region: RegionId) -> Option<VertexId> {
        self.last.get(&region).copied()
    }

    fn is_terminated(&self) -> bool {
        self.terminated
    }

    fn terminate(&mut self) {
        self.terminated = true;
    }
}
