//! The structural graph of a state machine model.
//!
//! `Topology` holds names, ownership and transition endpoints only; it has
//! no knowledge of the caller's message or environment types, which is what
//! lets instances resolve regions and vertices without being generic.

use super::ancestry;
use super::element::{Element, Parent, RegionId, TransitionId, VertexId};
use super::kind::{PseudoStateKind, TransitionKind, VertexKind};

/// Name given to regions created implicitly when a state is used as a parent.
pub const DEFAULT_REGION_NAME: &str = "default";

/// Separator used when building qualified names unless overridden.
pub const DEFAULT_SEPARATOR: &str = ".";

#[derive(Clone, Debug)]
pub struct RegionNode {
    name: String,
    parent: VertexId,
    vertices: Vec<VertexId>,
    detached: bool,
}

impl RegionNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The state (or machine) owning this region.
    pub fn parent(&self) -> VertexId {
        self.parent
    }

    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }
}

#[derive(Clone, Debug)]
pub struct VertexNode {
    name: String,
    parent: Option<RegionId>,
    kind: VertexKind,
    regions: Vec<RegionId>,
    default_region: Option<RegionId>,
    outgoing: Vec<TransitionId>,
    incoming: Vec<TransitionId>,
    detached: bool,
}

impl VertexNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owning region; `None` only for the machine root.
    pub fn parent(&self) -> Option<RegionId> {
        self.parent
    }

    pub fn kind(&self) -> VertexKind {
        self.kind
    }

    pub fn regions(&self) -> &[RegionId] {
        &self.regions
    }

    pub fn outgoing(&self) -> &[TransitionId] {
        &self.outgoing
    }

    pub fn incoming(&self) -> &[TransitionId] {
        &self.incoming
    }
}

#[derive(Clone, Debug)]
pub struct TransitionNode {
    source: VertexId,
    target: Option<VertexId>,
    kind: TransitionKind,
    detached: bool,
}

impl TransitionNode {
    pub fn source(&self) -> VertexId {
        self.source
    }

    pub fn target(&self) -> Option<VertexId> {
        self.target
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }
}

/// Arena of regions, vertices and transitions rooted at the machine vertex.
#[derive(Clone, Debug)]
pub struct Topology {
    separator: String,
    regions: Vec<RegionNode>,
    vertices: Vec<VertexNode>,
    transitions: Vec<TransitionNode>,
}

impl Topology {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            regions: Vec::new(),
            vertices: vec![VertexNode {
                name: name.to_string(),
                parent: None,
                kind: VertexKind::Machine,
                regions: Vec::new(),
                default_region: None,
                outgoing: Vec::new(),
                incoming: Vec::new(),
                detached: false,
            }],
            transitions: Vec::new(),
        }
    }

    /// The machine vertex.
    pub fn root(&self) -> VertexId {
        VertexId(0)
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub(crate) fn set_separator(&mut self, separator: &str) {
        self.separator = separator.to_string();
    }

    pub fn region(&self, id: RegionId) -> &RegionNode {
        &self.regions[id.0]
    }

    pub fn vertex(&self, id: VertexId) -> &VertexNode {
        &self.vertices[id.0]
    }

    pub fn transition(&self, id: TransitionId) -> &TransitionNode {
        &self.transitions[id.0]
    }

    pub fn name(&self, element: Element) -> &str {
        match element {
            Element::Region(id) => self.region(id).name(),
            Element::Vertex(id) => self.vertex(id).name(),
        }
    }

    /// The owner of an element: a region's state, or a vertex's region.
    pub fn parent(&self, element: Element) -> Option<Element> {
        match element {
            Element::Region(id) => Some(Element::Vertex(self.region(id).parent)),
            Element::Vertex(id) => self.vertex(id).parent.map(Element::Region),
        }
    }

    /// Root-to-self ancestry alternating vertices and regions.
    pub fn ancestry(&self, element: Element) -> Vec<Element> {
        ancestry::ancestors(element, |e| self.parent(e))
    }

    /// Root-to-self ancestry of a vertex, skipping regions.
    pub fn vertex_ancestry(&self, vertex: VertexId) -> Vec<VertexId> {
        ancestry::ancestors(vertex, |v| self.parent_state(v))
    }

    /// True if `vertex` and each of its ancestors is the last known state
    /// of its region, as reported by `last_known`.
    pub fn is_active_with<F>(&self, vertex: VertexId, last_known: F) -> bool
    where
        F: Fn(RegionId) -> Option<VertexId>,
    {
        self.vertex_ancestry(vertex)
            .into_iter()
            .all(|v| match self.vertex(v).parent() {
                Some(region) => last_known(region) == Some(v),
                None => true,
            })
    }

    /// The state owning the region that owns `vertex`.
    pub fn parent_state(&self, vertex: VertexId) -> Option<VertexId> {
        self.vertex(vertex).parent.map(|region| self.region(region).parent)
    }

    /// True if `vertex` lies strictly beneath `ancestor`.
    pub fn is_descendant(&self, vertex: VertexId, ancestor: VertexId) -> bool {
        ancestry::is_child(vertex, ancestor, |v| self.parent_state(v))
    }

    pub fn depth(&self, element: Element) -> usize {
        ancestry::depth(element, |e| self.parent(e))
    }

    pub fn qualified_name(&self, element: Element) -> String {
        self.ancestry(element)
            .into_iter()
            .map(|e| self.name(e))
            .collect::<Vec<_>>()
            .join(&self.separator)
    }

    /// `[source -> target]`, or `[source]` for internal transitions.
    pub fn describe_transition(&self, id: TransitionId) -> String {
        let transition = self.transition(id);
        let source = self.qualified_name(transition.source.into());
        match transition.target {
            Some(target) => format!("[{} -> {}]", source, self.qualified_name(target.into())),
            None => format!("[{}]", source),
        }
    }

    pub fn kind(&self, vertex: VertexId) -> VertexKind {
        self.vertex(vertex).kind
    }

    pub fn pseudo_state_kind(&self, vertex: VertexId) -> Option<PseudoStateKind> {
        self.kind(vertex).pseudo_state_kind()
    }

    pub fn is_state(&self, vertex: VertexId) -> bool {
        self.kind(vertex).is_state()
    }

    pub fn is_history(&self, vertex: VertexId) -> bool {
        self.pseudo_state_kind(vertex).is_some_and(PseudoStateKind::is_history)
    }

    /// A state with no outgoing transitions.
    pub fn is_final(&self, vertex: VertexId) -> bool {
        self.vertex(vertex).outgoing.is_empty()
    }

    pub fn is_simple(&self, vertex: VertexId) -> bool {
        self.vertex(vertex).regions.is_empty()
    }

    pub fn is_composite(&self, vertex: VertexId) -> bool {
        !self.vertex(vertex).regions.is_empty()
    }

    pub fn is_orthogonal(&self, vertex: VertexId) -> bool {
        self.vertex(vertex).regions.len() > 1
    }

    pub fn is_attached(&self, element: Element) -> bool {
        match element {
            Element::Region(id) => !self.region(id).detached,
            Element::Vertex(id) => !self.vertex(id).detached,
        }
    }

    /// The region's entry point: its last declared initial or history
    /// pseudostate, or its sole vertex when it declares none.
    pub fn region_initial(&self, region: RegionId) -> Option<VertexId> {
        let vertices = self.region(region).vertices();
        vertices
            .iter()
            .rev()
            .copied()
            .find(|&v| self.pseudo_state_kind(v).is_some_and(PseudoStateKind::is_initial))
            .or(match vertices {
                [only] => Some(*only),
                _ => None,
            })
    }

    /// The state among `region`'s vertices with the given name.
    pub fn find_state(&self, region: RegionId, name: &str) -> Option<VertexId> {
        self.region(region)
            .vertices()
            .iter()
            .copied()
            .find(|&v| self.is_state(v) && self.vertex(v).name == name)
    }

    /// Every attached vertex, in depth-first declaration order from the root.
    pub fn vertices(&self) -> Vec<VertexId> {
        let mut result = Vec::new();
        self.collect_vertices(self.root(), &mut result);
        result
    }

    fn collect_vertices(&self, vertex: VertexId, into: &mut Vec<VertexId>) {
        into.push(vertex);
        for &region in &self.vertex(vertex).regions {
            for &child in &self.region(region).vertices {
                self.collect_vertices(child, into);
            }
        }
    }

    /// Every attached region, in depth-first declaration order.
    pub fn regions(&self) -> Vec<RegionId> {
        self.vertices()
            .into_iter()
            .flat_map(|v| self.vertex(v).regions.iter().copied())
            .collect()
    }

    /// Every attached transition, grouped by source in declaration order.
    pub fn transitions(&self) -> Vec<TransitionId> {
        self.vertices()
            .into_iter()
            .flat_map(|v| self.vertex(v).outgoing.iter().copied())
            .collect()
    }

    pub(crate) fn add_region(&mut self, name: &str, state: VertexId) -> RegionId {
        let id = RegionId(self.regions.len());
        self.regions.push(RegionNode {
            name: name.to_string(),
            parent: state,
            vertices: Vec::new(),
            detached: false,
        });
        self.vertices[state.0].regions.push(id);
        id
    }

    pub(crate) fn default_region(&mut self, state: VertexId) -> RegionId {
        match self.vertices[state.0].default_region {
            Some(region) if !self.regions[region.0].detached => region,
            _ => {
                let region = self.add_region(DEFAULT_REGION_NAME, state);
                self.vertices[state.0].default_region = Some(region);
                region
            }
        }
    }

    pub(crate) fn add_vertex(&mut self, name: &str, parent: Parent, kind: VertexKind) -> VertexId {
        let region = match parent {
            Parent::Region(region) => region,
            Parent::State(state) => self.default_region(state.vertex()),
        };
        let id = VertexId(self.vertices.len());
        self.vertices.push(VertexNode {
            name: name.to_string(),
            parent: Some(region),
            kind,
            regions: Vec::new(),
            default_region: None,
            outgoing: Vec::new(),
            incoming: Vec::new(),
            detached: false,
        });
        self.regions[region.0].vertices.push(id);
        id
    }

    pub(crate) fn add_transition(
        &mut self,
        source: VertexId,
        target: Option<VertexId>,
        kind: TransitionKind,
    ) -> TransitionId {
        let id = TransitionId(self.transitions.len());
        self.transitions.push(TransitionNode {
            source,
            target,
            kind: if target.is_some() { kind } else { TransitionKind::Internal },
            detached: false,
        });
        self.vertices[source.0].outgoing.push(id);
        if let Some(target) = target {
            self.vertices[target.0].incoming.push(id);
        }
        id
    }

    pub(crate) fn set_transition_kind(&mut self, id: TransitionId, kind: TransitionKind) {
        let transition = &mut self.transitions[id.0];
        transition.kind = if transition.target.is_some() {
            kind
        } else {
            TransitionKind::Internal
        };
    }

    pub(crate) fn transition_attached(&self, id: TransitionId) -> bool {
        !self.transitions[id.0].detached
    }

    pub(crate) fn detach_transition(&mut self, id: TransitionId) {
        let (source, target) = {
            let transition = &mut self.transitions[id.0];
            transition.detached = true;
            (transition.source, transition.target)
        };
        self.vertices[source.0].outgoing.retain(|&t| t != id);
        if let Some(target) = target {
            self.vertices[target.0].incoming.retain(|&t| t != id);
        }
    }

    pub(crate) fn detach_vertex(&mut self, id: VertexId) {
        for region in self.vertices[id.0].regions.clone() {
            self.detach_region(region);
        }
        let node = &self.vertices[id.0];
        let touching: Vec<TransitionId> = node.outgoing.iter().chain(&node.incoming).copied().collect();
        for transition in touching {
            self.detach_transition(transition);
        }
        if let Some(region) = self.vertices[id.0].parent {
            self.regions[region.0].vertices.retain(|&v| v != id);
        }
        self.vertices[id.0].detached = true;
    }

    pub(crate) fn detach_region(&mut self, id: RegionId) {
        for vertex in self.regions[id.0].vertices.clone() {
            self.detach_vertex(vertex);
        }
        let parent = self.regions[id.0].parent;
        self.vertices[parent.0].regions.retain(|&r| r != id);
        self.regions[id.0].detached = true;
    }
}
