//! Instance whose active state configuration is a serializable tree.
//!
//! The tree mirrors the model's ownership: the root node is named after the
//! machine, its children after regions, theirs after states, and so on.
//! Region nodes record the name of their last known state, which is all
//! that is needed to resume a run after a restart.
//!
//! In JSON, `lastKnown` is omitted from nodes that have none. Binary
//! encodings always carry the field.

use super::Instance;
use crate::core::{Element, RegionId, Topology, VertexId};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

/// One node of the active state configuration tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ActiveStateNode {
    pub name: String,
    #[serde(rename = "lastKnown", default)]
    pub last_known: Option<String>,
    #[serde(default)]
    pub children: Vec<ActiveStateNode>,
}

impl ActiveStateNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last_known: None,
            children: Vec::new(),
        }
    }

    pub fn child(&self, name: &str) -> Option<&ActiveStateNode> {
        self.children.iter().find(|child| child.name == name)
    }
}

impl Serialize for ActiveStateNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // self-describing formats may drop the field; positional ones may not
        let omit = serializer.is_human_readable() && self.last_known.is_none();
        let mut node = serializer.serialize_struct("ActiveStateNode", if omit { 2 } else { 3 })?;
        node.serialize_field("name", &self.name)?;
        if omit {
            node.skip_field("lastKnown")?;
        } else {
            node.serialize_field("lastKnown", &self.last_known)?;
        }
        node.serialize_field("children", &self.children)?;
        node.end()
    }
}

/// Persisted form of a `JsonInstance`. Events are listed most recent first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub active_state: Option<ActiveStateNode>,
    #[serde(default)]
    pub event_history: Vec<String>,
    #[serde(default)]
    pub terminated: bool,
}

#[derive(Clone, Debug)]
pub struct JsonInstance {
    name: String,
    trace_id: Uuid,
    current: HashMap<RegionId, VertexId>,
    active_state: Option<ActiveStateNode>,
    event_history: VecDeque<String>,
    history_limit: Option<usize>,
    terminated: bool,
}

impl JsonInstance {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trace_id: Uuid::new_v4(),
            current: HashMap::new(),
            active_state: None,
            event_history: VecDeque::new(),
            history_limit: None,
            terminated: false,
        }
    }

    /// Keep at most `limit` traced events, dropping the oldest.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self.event_history.truncate(limit);
        self
    }

    /// Rebuild an instance from a snapshot taken earlier.
    pub fn restore(name: impl Into<String>, snapshot: Snapshot) -> Self {
        let mut instance = Self::new(name);
        instance.apply(snapshot);
        instance
    }

    pub fn trace_id(&self) -> Uuid {
        self.trace_id
    }

    pub fn active_state(&self) -> Option<&ActiveStateNode> {
        self.active_state.as_ref()
    }

    /// Traced events, most recent first.
    pub fn event_history(&self) -> &VecDeque<String> {
        &self.event_history
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            active_state: self.active_state.clone(),
            event_history: self.event_history.iter().cloned().collect(),
            terminated: self.terminated,
        }
    }

    /// Replace the active state configuration. In-memory pseudostate
    /// bookkeeping is dropped; the last known states take over.
    pub fn apply(&mut self, snapshot: Snapshot) {
        self.current.clear();
        self.active_state = snapshot.active_state;
        self.event_history = snapshot.event_history.into();
        if let Some(limit) = self.history_limit {
            self.event_history.truncate(limit);
        }
        self.terminated = snapshot.terminated;
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.snapshot())
    }

    pub fn from_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        self.apply(snapshot);
        Ok(())
    }

    fn node(&self, topology: &Topology, element: Element) -> Option<&ActiveStateNode> {
        let mut node = self.active_state.as_ref()?;
        for ancestor in topology.ancestry(element).into_iter().skip(1) {
            node = node.child(topology.name(ancestor))?;
        }
        Some(node)
    }

    fn node_mut(&mut self, topology: &Topology, element: Element) -> &mut ActiveStateNode {
        let root = topology.name(topology.root().into());
        let mut node = self
            .active_state
            .get_or_insert_with(|| ActiveStateNode::new(root));
        for ancestor in topology.ancestry(element).into_iter().skip(1) {
            let name = topology.name(ancestor);
            let index = match node.children.iter().position(|child| child.name == name) {
                Some(index) => index,
                None => {
                    node.children.push(ActiveStateNode::new(name));
                    node.children.len() - 1
                }
            };
            node = &mut node.children[index];
        }
        node
    }
}

impl Default for JsonInstance {
    fn default() -> Self {
        Self::new("unnamed")
    }
}

impl Instance for JsonInstance {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_current(&mut self, topology: &Topology, region: RegionId, vertex: VertexId) {
        self.current.insert(region, vertex);
        if topology.is_state(vertex) {
            let name = topology.name(vertex.into()).to_string();
            self.node_mut(topology, region.into()).last_known = Some(name);
        }
    }

    /// Falls back to the last known state so restored runs can be exited.
    fn current(&self, topology: &Topology, region: RegionId) -> Option<VertexId> {
        self.current
            .get(&region)
            .copied()
            .or_else(|| self.last_known_state(topology, region))
    }

    fn last_known_state(&self, topology: &Topology, region: RegionId) -> Option<VertexId> {
        let name = self.node(topology, region.into())?.last_known.as_deref()?;
        topology.find_state(region, name)
    }

    fn is_terminated(&self) -> bool {
        self.terminated
    }

    fn terminate(&mut self) {
        self.terminated = true;
    }

    fn trace(&mut self, message: &str) {
        self.event_history.push_front(message.to_string());
        if let Some(limit) = self.history_limit {
            self.event_history.truncate(limit);
        }
    }
}
