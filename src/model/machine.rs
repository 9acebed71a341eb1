//! The state machine model: structure plus user behavior.

use crate::builder::{BuildError, StateBuilder, TransitionBuilder};
use crate::config::Config;
use crate::core::{
    Action, Element, Guard, Parent, PseudoStateId, PseudoStateKind, RegionId, StateId, Topology,
    TransitionId, TransitionKind, VertexId, VertexKind,
};
use crate::engine::Compiled;

/// Entry and exit behavior of a vertex. Only states carry any.
pub struct StateBehavior<M, Env> {
    pub(crate) entry: Vec<Action<M, Env>>,
    pub(crate) exit: Vec<Action<M, Env>>,
}

impl<M, Env> StateBehavior<M, Env> {
    pub fn entry(&self) -> &[Action<M, Env>] {
        &self.entry
    }

    pub fn exit(&self) -> &[Action<M, Env>] {
        &self.exit
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_empty() && self.exit.is_empty()
    }
}

impl<M, Env> Default for StateBehavior<M, Env> {
    fn default() -> Self {
        Self {
            entry: Vec::new(),
            exit: Vec::new(),
        }
    }
}

/// Guard and effects of a transition.
pub struct TransitionBehavior<M, Env> {
    pub(crate) guard: Guard<M, Env>,
    pub(crate) effects: Vec<Action<M, Env>>,
}

impl<M, Env> TransitionBehavior<M, Env> {
    pub fn guard(&self) -> &Guard<M, Env> {
        &self.guard
    }

    pub fn effects(&self) -> &[Action<M, Env>] {
        &self.effects
    }
}

/// A hierarchical state machine model.
///
/// `M` is the caller's message type and `Env` the environment handed to
/// guards and actions on each evaluation. Every structural or behavioral
/// change marks the model dirty; it is compiled again on the next
/// `initialise`, `initialise_instance` or `evaluate`.
///
/// # Example
///
/// ```rust
/// use statechart::StateMachine;
///
/// let mut model: StateMachine<&str, ()> = StateMachine::new("light");
/// let root = model.root();
/// let off = model.state("off", root);
/// let on = model.state("on", root);
/// model.to(off, on).on("turn on");
/// model.to(on, off).on("turn off");
///
/// assert!(!model.is_clean());
/// model.initialise();
/// assert!(model.is_clean());
/// ```
pub struct StateMachine<M, Env> {
    pub(crate) topology: Topology,
    pub(crate) states: Vec<StateBehavior<M, Env>>,
    pub(crate) transitions: Vec<TransitionBehavior<M, Env>>,
    pub(crate) config: Config,
    pub(crate) clean: bool,
    pub(crate) compiled: Option<Compiled<M, Env>>,
}

impl<M, Env> StateMachine<M, Env> {
    pub fn new(name: &str) -> Self {
        Self {
            topology: Topology::new(name),
            states: vec![StateBehavior::default()],
            transitions: Vec::new(),
            config: Config::default(),
            clean: false,
            compiled: None,
        }
    }

    /// Replace the configuration while building.
    pub fn with_config(mut self, config: Config) -> Self {
        self.set_config(config);
        self
    }

    pub fn set_config(&mut self, config: Config) {
        self.config = config;
        self.invalidate();
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Change the separator used in qualified names.
    pub fn set_separator(&mut self, separator: &str) {
        self.topology.set_separator(separator);
        self.invalidate();
    }

    pub fn name(&self) -> &str {
        self.topology.name(self.topology.root().into())
    }

    pub fn root(&self) -> StateId {
        StateId(self.topology.root())
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// True once compiled and not mutated since.
    pub fn is_clean(&self) -> bool {
        self.clean
    }

    pub fn state_behavior(&self, vertex: VertexId) -> &StateBehavior<M, Env> {
        &self.states[vertex.0]
    }

    pub fn transition_behavior(&self, transition: TransitionId) -> &TransitionBehavior<M, Env> {
        &self.transitions[transition.0]
    }

    pub fn qualified_name(&self, element: impl Into<Element>) -> String {
        self.topology.qualified_name(element.into())
    }

    pub(crate) fn invalidate(&mut self) {
        self.clean = false;
    }

    /// Add an explicitly named region to `state`.
    pub fn region(&mut self, name: &str, state: StateId) -> RegionId {
        self.invalidate();
        self.topology.add_region(name, state.vertex())
    }

    /// The region vertices land in when `state` is given as their parent.
    pub fn default_region(&mut self, state: StateId) -> RegionId {
        self.invalidate();
        self.topology.default_region(state.vertex())
    }

    pub fn state(&mut self, name: &str, parent: impl Into<Parent>) -> StateId {
        StateId(self.add_vertex(name, parent.into(), VertexKind::State))
    }

    pub fn final_state(&mut self, name: &str, parent: impl Into<Parent>) -> StateId {
        StateId(self.add_vertex(name, parent.into(), VertexKind::FinalState))
    }

    pub fn pseudo_state(
        &mut self,
        name: &str,
        parent: impl Into<Parent>,
        kind: PseudoStateKind,
    ) -> PseudoStateId {
        PseudoStateId(self.add_vertex(name, parent.into(), VertexKind::Pseudo(kind)))
    }

    fn add_vertex(&mut self, name: &str, parent: Parent, kind: VertexKind) -> VertexId {
        self.invalidate();
        let id = self.topology.add_vertex(name, parent, kind);
        self.states.push(StateBehavior::default());
        id
    }

    /// Start an external transition from `source` to `target`.
    pub fn to(
        &mut self,
        source: impl Into<VertexId>,
        target: impl Into<VertexId>,
    ) -> TransitionBuilder<'_, M, Env> {
        let id = self.add_transition(source.into(), Some(target.into()));
        TransitionBuilder::new(self, id)
    }

    /// Start an internal transition on `source`.
    pub fn internal(&mut self, source: impl Into<VertexId>) -> TransitionBuilder<'_, M, Env> {
        let id = self.add_transition(source.into(), None);
        TransitionBuilder::new(self, id)
    }

    /// Reopen an existing transition for modification.
    pub fn transition_mut(&mut self, id: TransitionId) -> TransitionBuilder<'_, M, Env> {
        TransitionBuilder::new(self, id)
    }

    /// Open a state for adding entry and exit behavior.
    pub fn state_mut(&mut self, id: StateId) -> StateBuilder<'_, M, Env> {
        StateBuilder::new(self, id)
    }

    fn add_transition(&mut self, source: VertexId, target: Option<VertexId>) -> TransitionId {
        self.invalidate();
        let guard = if self.topology.is_state(source) {
            Guard::Completion(source)
        } else {
            Guard::Always
        };
        let id = self
            .topology
            .add_transition(source, target, TransitionKind::External);
        self.transitions.push(TransitionBehavior {
            guard,
            effects: Vec::new(),
        });
        id
    }

    pub fn remove_transition(&mut self, id: TransitionId) -> Result<(), BuildError> {
        if !self.topology.transition_attached(id) {
            return Err(BuildError::AlreadyRemoved(format!("transition {:?}", id)));
        }
        self.topology.detach_transition(id);
        self.invalidate();
        Ok(())
    }

    /// Remove a vertex, its subtree and every transition touching them.
    pub fn remove_vertex(&mut self, id: impl Into<VertexId>) -> Result<(), BuildError> {
        let id = id.into();
        if id == self.topology.root() {
            return Err(BuildError::CannotRemoveRoot);
        }
        if !self.topology.is_attached(id.into()) {
            return Err(BuildError::AlreadyRemoved(self.qualified_name(id)));
        }
        self.topology.detach_vertex(id);
        self.invalidate();
        Ok(())
    }

    /// Remove a region and everything it contains.
    pub fn remove_region(&mut self, id: RegionId) -> Result<(), BuildError> {
        if !self.topology.is_attached(id.into()) {
            return Err(BuildError::AlreadyRemoved(self.qualified_name(id)));
        }
        self.topology.detach_region(id);
        self.invalidate();
        Ok(())
    }
}
