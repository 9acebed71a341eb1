//! Compilation of a model into flat step sequences.
//!
//! The first pass walks the ownership tree and derives, for every region and
//! vertex, the steps run when it is left, when its entry begins, and when
//! its entry completes. The second pass uses those to lay out the full
//! exit, effect and entry sequence of every transition, so evaluation never
//! recomputes the common ancestor of a transition's endpoints.

use super::error::ModelingError;
use crate::core::{
    ancestry, Action, Element, PseudoStateKind, RegionId, Topology, TransitionId, TransitionKind,
    VertexId, VertexKind,
};
use crate::model::StateMachine;
use std::collections::BTreeMap;
use std::fmt;

/// One instruction of a compiled sequence.
pub enum Step<M, Env> {
    /// Log and trace entry of the element.
    Enter(Element),
    /// Log and trace exit of the element.
    Leave(Element),
    SetCurrent {
        region: RegionId,
        vertex: VertexId,
    },
    /// Run a user action.
    Behavior(Action<M, Env>),
    /// Leave whatever vertex is current in the region.
    LeaveActive(RegionId),
    /// Enter the region, choosing between history and its initial vertex
    /// at run time.
    EnterRegion {
        region: RegionId,
        initial: Option<VertexId>,
    },
    /// Finish entering an initial or history pseudostate.
    Resume(VertexId),
    Terminate,
    /// Re-check completion of a state after an internal transition.
    CompleteInternal(VertexId),
    /// Traverse a local transition; its path depends on the active states.
    Local(TransitionId),
}

impl<M, Env> Clone for Step<M, Env> {
    fn clone(&self) -> Self {
        match self {
            Self::Enter(element) => Self::Enter(*element),
            Self::Leave(element) => Self::Leave(*element),
            Self::SetCurrent { region, vertex } => Self::SetCurrent {
                region: *region,
                vertex: *vertex,
            },
            Self::Behavior(action) => Self::Behavior(action.clone()),
            Self::LeaveActive(region) => Self::LeaveActive(*region),
            Self::EnterRegion { region, initial } => Self::EnterRegion {
                region: *region,
                initial: *initial,
            },
            Self::Resume(vertex) => Self::Resume(*vertex),
            Self::Terminate => Self::Terminate,
            Self::CompleteInternal(vertex) => Self::CompleteInternal(*vertex),
            Self::Local(transition) => Self::Local(*transition),
        }
    }
}

impl<M, Env> fmt::Debug for Step<M, Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enter(element) => write!(f, "Enter({:?})", element),
            Self::Leave(element) => write!(f, "Leave({:?})", element),
            Self::SetCurrent { region, vertex } => {
                write!(f, "SetCurrent({:?}, {:?})", region, vertex)
            }
            Self::Behavior(_) => f.write_str("Behavior"),
            Self::LeaveActive(region) => write!(f, "LeaveActive({:?})", region),
            Self::EnterRegion { region, initial } => {
                write!(f, "EnterRegion({:?}, {:?})", region, initial)
            }
            Self::Resume(vertex) => write!(f, "Resume({:?})", vertex),
            Self::Terminate => f.write_str("Terminate"),
            Self::CompleteInternal(vertex) => write!(f, "CompleteInternal({:?})", vertex),
            Self::Local(transition) => write!(f, "Local({:?})", transition),
        }
    }
}

/// The three step lists of one element.
pub struct ElementBehavior<M, Env> {
    pub leave: Vec<Step<M, Env>>,
    pub begin_enter: Vec<Step<M, Env>>,
    pub end_enter: Vec<Step<M, Env>>,
}

impl<M, Env> Default for ElementBehavior<M, Env> {
    fn default() -> Self {
        Self {
            leave: Vec::new(),
            begin_enter: Vec::new(),
            end_enter: Vec::new(),
        }
    }
}

impl<M, Env> fmt::Debug for ElementBehavior<M, Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementBehavior")
            .field("leave", &self.leave)
            .field("begin_enter", &self.begin_enter)
            .field("end_enter", &self.end_enter)
            .finish()
    }
}

/// The compiled program of a model.
pub struct Compiled<M, Env> {
    behaviors: BTreeMap<Element, ElementBehavior<M, Env>>,
    traversals: BTreeMap<TransitionId, Vec<Step<M, Env>>>,
    on_initialise: Vec<Step<M, Env>>,
}

impl<M, Env> Compiled<M, Env> {
    fn new() -> Self {
        Self {
            behaviors: BTreeMap::new(),
            traversals: BTreeMap::new(),
            on_initialise: Vec::new(),
        }
    }

    /// Steps run when an instance enters the machine for the first time.
    pub fn on_initialise(&self) -> &[Step<M, Env>] {
        &self.on_initialise
    }

    pub fn traversal(&self, transition: TransitionId) -> &[Step<M, Env>] {
        self.traversals
            .get(&transition)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn leave(&self, element: impl Into<Element>) -> &[Step<M, Env>] {
        self.behaviors
            .get(&element.into())
            .map(|behavior| behavior.leave.as_slice())
            .unwrap_or_default()
    }

    pub fn begin_enter(&self, element: impl Into<Element>) -> &[Step<M, Env>] {
        self.behaviors
            .get(&element.into())
            .map(|behavior| behavior.begin_enter.as_slice())
            .unwrap_or_default()
    }

    pub fn end_enter(&self, element: impl Into<Element>) -> &[Step<M, Env>] {
        self.behaviors
            .get(&element.into())
            .map(|behavior| behavior.end_enter.as_slice())
            .unwrap_or_default()
    }

    /// Begin entry followed by end entry.
    pub fn enter(&self, element: impl Into<Element>) -> Vec<Step<M, Env>> {
        let element = element.into();
        self.begin_enter(element)
            .iter()
            .chain(self.end_enter(element))
            .cloned()
            .collect()
    }

    /// Entry steps down `path` starting at `from`.
    ///
    /// Each vertex begins entry; when the path continues below a state,
    /// every region of that state begins entry and all but the region on
    /// the path also complete it. The last vertex's end entry is left to
    /// the caller.
    pub fn cascade_entry(
        &self,
        topology: &Topology,
        path: &[VertexId],
        from: usize,
    ) -> Vec<Step<M, Env>> {
        let mut steps = Vec::new();
        for (index, &vertex) in path.iter().enumerate().skip(from) {
            steps.extend_from_slice(self.begin_enter(vertex));
            let Some(&next) = path.get(index + 1) else {
                continue;
            };
            if !topology.is_state(vertex) {
                continue;
            }
            let next_region = topology.vertex(next).parent();
            for &region in topology.vertex(vertex).regions() {
                steps.extend_from_slice(self.begin_enter(region));
                if Some(region) != next_region {
                    steps.extend_from_slice(self.end_enter(region));
                }
            }
        }
        steps
    }

    fn behavior(&mut self, element: impl Into<Element>) -> &mut ElementBehavior<M, Env> {
        self.behaviors.entry(element.into()).or_default()
    }
}

impl<M, Env> fmt::Debug for Compiled<M, Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiled")
            .field("behaviors", &self.behaviors)
            .field("traversals", &self.traversals)
            .field("on_initialise", &self.on_initialise)
            .finish()
    }
}

struct Compiler<'m, M, Env> {
    machine: &'m StateMachine<M, Env>,
    compiled: Compiled<M, Env>,
}

impl<'m, M, Env> Compiler<'m, M, Env> {
    fn topology(&self) -> &'m Topology {
        &self.machine.topology
    }

    fn visit_named_element(&mut self, element: Element) {
        let behavior = self.compiled.behavior(element);
        behavior.leave.push(Step::Leave(element));
        behavior.begin_enter.push(Step::Enter(element));
    }

    fn visit_region(&mut self, region: RegionId, deep_history_above: bool) {
        let topology = self.topology();
        let initial = topology.region_initial(region);
        let initial_kind = initial.and_then(|vertex| topology.pseudo_state_kind(vertex));
        let deep_history = deep_history_above || initial_kind == Some(PseudoStateKind::DeepHistory);

        for &vertex in topology.region(region).vertices() {
            self.visit_vertex(vertex, deep_history);
        }

        self.compiled
            .behavior(region)
            .leave
            .push(Step::LeaveActive(region));

        let history = initial_kind.is_some_and(PseudoStateKind::is_history);
        match initial {
            Some(initial) if !deep_history_above && !history => {
                let steps = self.compiled.enter(initial);
                self.compiled.behavior(region).end_enter.extend(steps);
            }
            _ => self
                .compiled
                .behavior(region)
                .end_enter
                .push(Step::EnterRegion { region, initial }),
        }

        self.visit_named_element(region.into());
    }

    fn visit_vertex(&mut self, vertex: VertexId, deep_history_above: bool) {
        match self.topology().kind(vertex) {
            VertexKind::Pseudo(kind) => self.visit_pseudo_state(vertex, kind),
            VertexKind::State | VertexKind::FinalState | VertexKind::Machine => {
                self.visit_state(vertex, deep_history_above)
            }
        }
    }

    fn visit_vertex_common(&mut self, vertex: VertexId) {
        self.visit_named_element(vertex.into());
        if let Some(region) = self.topology().vertex(vertex).parent() {
            self.compiled
                .behavior(vertex)
                .begin_enter
                .push(Step::SetCurrent { region, vertex });
        }
    }

    fn visit_pseudo_state(&mut self, vertex: VertexId, kind: PseudoStateKind) {
        self.visit_vertex_common(vertex);
        if kind.is_initial() {
            self.compiled
                .behavior(vertex)
                .end_enter
                .push(Step::Resume(vertex));
        } else if kind == PseudoStateKind::Terminate {
            self.compiled
                .behavior(vertex)
                .begin_enter
                .push(Step::Terminate);
        }
    }

    fn visit_state(&mut self, vertex: VertexId, deep_history_above: bool) {
        for &region in self.topology().vertex(vertex).regions() {
            self.visit_region(region, deep_history_above);
            let leave = self.compiled.leave(region).to_vec();
            let enter = self.compiled.enter(region);
            let behavior = self.compiled.behavior(vertex);
            behavior.leave.extend(leave);
            behavior.end_enter.extend(enter);
        }

        self.visit_vertex_common(vertex);

        let machine = self.machine;
        let user = machine.state_behavior(vertex);
        let behavior = self.compiled.behavior(vertex);
        behavior
            .leave
            .extend(user.exit().iter().cloned().map(Step::Behavior));
        behavior
            .begin_enter
            .extend(user.entry().iter().cloned().map(Step::Behavior));
    }

    fn visit_transition(&mut self, transition: TransitionId) {
        let machine = self.machine;
        let topology = self.topology();
        let node = topology.transition(transition);
        let effects = machine.transition_behavior(transition).effects();
        let mut steps: Vec<Step<M, Env>> = Vec::new();

        match (node.kind(), node.target()) {
            (TransitionKind::Internal, _) | (_, None) => {
                steps.extend(effects.iter().cloned().map(Step::Behavior));
                if machine.config.internal_transitions_trigger_completion {
                    steps.push(Step::CompleteInternal(node.source()));
                }
            }
            (TransitionKind::Local, Some(target))
                if target == node.source() || topology.is_descendant(target, node.source()) =>
            {
                steps.push(Step::Local(transition));
            }
            (kind, Some(target)) => {
                if kind == TransitionKind::Local {
                    let error = ModelingError::LocalTargetNotDescendant {
                        transition: topology.describe_transition(transition),
                    };
                    machine.config.logger.error(&error.to_string());
                }
                steps = self.external(node.source(), target, effects);
            }
        }

        self.compiled.traversals.insert(transition, steps);
    }

    fn external(
        &self,
        source: VertexId,
        target: VertexId,
        effects: &[Action<M, Env>],
    ) -> Vec<Step<M, Env>> {
        let topology = self.topology();
        let source_path = topology.vertex_ancestry(source);
        let target_path = topology.vertex_ancestry(target);
        let last = source_path.len().min(target_path.len()) - 1;
        let split = ancestry::lowest_common_ancestor_index(&source_path, &target_path)
            .map_or(0, |lca| lca + 1)
            .min(last);

        let mut steps = self.compiled.leave(source_path[split]).to_vec();
        steps.extend(effects.iter().cloned().map(Step::Behavior));
        steps.extend(self.compiled.cascade_entry(topology, &target_path, split));
        steps.extend_from_slice(self.compiled.end_enter(target));
        steps
    }
}

/// Compile every attached element and transition of `machine`.
pub(crate) fn compile<M, Env>(machine: &StateMachine<M, Env>) -> Compiled<M, Env> {
    let mut compiler = Compiler {
        machine,
        compiled: Compiled::new(),
    };
    let root = machine.topology.root();

    compiler.visit_state(root, false);
    for transition in machine.topology.transitions() {
        compiler.visit_transition(transition);
    }
    compiler.compiled.on_initialise = compiler.compiled.enter(root);

    compiler.compiled
}

impl<M, Env> StateMachine<M, Env> {
    /// Compile the model. Idempotent; leaves the model clean.
    pub fn initialise(&mut self) {
        self.config.logger.log(&format!("initialise {}", self.name()));
        self.compiled = Some(compile(self));
        self.clean = true;
    }

    /// The compiled program, if the model has been initialised.
    pub fn compiled(&self) -> Option<&Compiled<M, Env>> {
        self.compiled.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StateId;

    type Model = StateMachine<&'static str, ()>;

    fn flat() -> (Model, StateId, StateId, TransitionId) {
        let mut model = Model::new("machine");
        let root = model.root();
        let initial = model.pseudo_state("initial", root, PseudoStateKind::Initial);
        let a = model.state("a", root);
        let b = model.state("b", root);
        model.to(initial, a);
        let t = model.to(a, b).on("go").id();
        (model, a, b, t)
    }

    #[test]
    fn external_sibling_transition_leaves_source_and_enters_target() {
        let (mut model, a, b, t) = flat();
        model.initialise();
        let compiled = model.compiled().unwrap();
        let region = model.topology().vertex(a.vertex()).parent().unwrap();

        let steps = format!("{:?}", compiled.traversal(t));
        let expected = format!(
            "{:?}",
            vec![
                Step::<&str, ()>::Leave(a.into()),
                Step::Enter(b.into()),
                Step::SetCurrent {
                    region,
                    vertex: b.vertex()
                },
            ]
        );
        assert_eq!(steps, expected);
    }

    #[test]
    fn region_leave_delegates_to_active_vertex_first() {
        let (mut model, a, _, _) = flat();
        model.initialise();
        let region = model.topology().vertex(a.vertex()).parent().unwrap();
        let compiled = model.compiled().unwrap();

        assert!(matches!(
            compiled.leave(region),
            [Step::LeaveActive(r), Step::Leave(_)] if *r == region
        ));
    }

    #[test]
    fn static_initial_is_inlined_into_region_entry() {
        let (mut model, _, _, _) = flat();
        model.initialise();
        let region = model.topology().vertex(model.root().vertex()).regions()[0];
        let compiled = model.compiled().unwrap();

        assert!(compiled
            .end_enter(region)
            .iter()
            .any(|step| matches!(step, Step::Resume(_))));
        assert!(!compiled
            .end_enter(region)
            .iter()
            .any(|step| matches!(step, Step::EnterRegion { .. })));
    }

    #[test]
    fn history_region_defers_entry_to_run_time() {
        let mut model = Model::new("machine");
        let root = model.root();
        let history = model.pseudo_state("history", root, PseudoStateKind::ShallowHistory);
        let a = model.state("a", root);
        model.to(history, a);
        model.initialise();
        let region = model.topology().vertex(a.vertex()).parent().unwrap();

        assert!(matches!(
            model.compiled().unwrap().end_enter(region),
            [Step::EnterRegion { initial: Some(v), .. }] if *v == history.vertex()
        ));
    }

    #[test]
    fn internal_transition_runs_only_effects() {
        let mut model = Model::new("machine");
        let root = model.root();
        let a = model.state("a", root);
        let noop = crate::core::action::<&'static str, (), _>(|_: &()| Ok(()));
        let t = model.internal(a).on("tick").effect(noop).id();
        model.initialise();

        assert!(matches!(
            model.compiled().unwrap().traversal(t),
            [Step::Behavior(_)]
        ));
    }

    #[test]
    fn internal_completion_check_follows_config() {
        let mut model = Model::new("machine").with_config(
            crate::config::Config::default().internal_transitions_trigger_completion(true),
        );
        let root = model.root();
        let a = model.state("a", root);
        let t = model.internal(a).id();
        model.initialise();

        assert!(matches!(
            model.compiled().unwrap().traversal(t),
            [Step::CompleteInternal(v)] if *v == a.vertex()
        ));
    }

    #[test]
    fn local_transition_to_non_descendant_compiles_as_external() {
        let (mut model, a, b, _) = flat();
        let t = model.to(b, a).kind(TransitionKind::Local).id();
        model.initialise();

        assert!(matches!(
            model.compiled().unwrap().traversal(t).first(),
            Some(Step::Leave(element)) if *element == Element::from(b)
        ));
    }

    #[test]
    fn self_transition_exits_and_reenters() {
        let (mut model, a, _, _) = flat();
        let t = model.to(a, a).on("again").id();
        model.initialise();
        let steps = model.compiled().unwrap().traversal(t);

        assert!(matches!(steps.first(), Some(Step::Leave(element)) if *element == Element::from(a)));
        assert!(steps
            .iter()
            .any(|step| matches!(step, Step::Enter(element) if *element == Element::from(a))));
    }

    #[test]
    fn compile_is_idempotent() {
        let (mut model, _, _, _) = flat();
        model.initialise();
        let first = format!("{:?}", model.compiled().unwrap());
        model.initialise();
        let second = format!("{:?}", model.compiled().unwrap());

        assert_eq!(first, second);
        assert!(model.is_clean());
    }
}
