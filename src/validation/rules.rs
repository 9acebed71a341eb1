//! Structural rules checked against a model.

use crate::core::{
    Element, PseudoStateKind, RegionId, Topology, TransitionKind, VertexId, VertexKind,
    DEFAULT_REGION_NAME,
};
use crate::model::StateMachine;
use crate::validation::violations::{ModelViolation, Severity};
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<ModelViolation>>;

fn check(holds: bool, violation: impl FnOnce() -> ModelViolation) -> Check {
    if holds {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}

struct Validator<'m, M, Env> {
    machine: &'m StateMachine<M, Env>,
    checks: Vec<Check>,
}

impl<'m, M, Env> Validator<'m, M, Env> {
    fn topology(&self) -> &'m Topology {
        &self.machine.topology
    }

    fn name(&self, element: impl Into<Element>) -> String {
        self.topology().qualified_name(element.into())
    }

    fn visit_pseudo_state(&mut self, vertex: VertexId, kind: PseudoStateKind) {
        let machine = self.machine;
        let outgoing = machine.topology.vertex(vertex).outgoing();
        let else_count = outgoing
            .iter()
            .filter(|&&t| machine.transition_behavior(t).guard().is_else())
            .count();
        let pseudo_state = self.name(vertex);

        match kind {
            PseudoStateKind::Choice | PseudoStateKind::Junction => {
                self.checks.push(check(!outgoing.is_empty(), || {
                    ModelViolation::MissingOutgoingTransition {
                        pseudo_state: pseudo_state.clone(),
                        kind,
                    }
                }));
                self.checks.push(check(else_count <= 1, || {
                    ModelViolation::MultipleElseTransitions {
                        pseudo_state: pseudo_state.clone(),
                        kind,
                    }
                }));
            }
            _ => {
                self.checks.push(check(else_count == 0, || {
                    ModelViolation::UnexpectedElseTransition {
                        pseudo_state: pseudo_state.clone(),
                        kind,
                    }
                }));
                if kind.is_initial() {
                    self.checks.push(check(outgoing.len() <= 1, || {
                        ModelViolation::MultipleInitialTransitions {
                            pseudo_state: pseudo_state.clone(),
                        }
                    }));
                    if let [only] = outgoing {
                        let guard = machine.transition_behavior(*only).guard();
                        self.checks.push(check(guard.is_default() || guard.is_else(), || {
                            ModelViolation::GuardedInitialTransition {
                                pseudo_state: pseudo_state.clone(),
                            }
                        }));
                    }
                }
            }
        }
    }

    fn visit_region(&mut self, region: RegionId) {
        let topology = self.topology();
        for kind in [
            PseudoStateKind::Initial,
            PseudoStateKind::DeepHistory,
            PseudoStateKind::ShallowHistory,
        ] {
            let count = topology
                .region(region)
                .vertices()
                .iter()
                .filter(|&&v| topology.pseudo_state_kind(v) == Some(kind))
                .count();
            let result = check(count <= 1, || ModelViolation::DuplicatePseudoState {
                region: self.name(region),
                kind,
            });
            self.checks.push(result);
        }
    }

    fn visit_state(&mut self, vertex: VertexId) {
        let topology = self.topology();
        let defaults = topology
            .vertex(vertex)
            .regions()
            .iter()
            .filter(|&&r| topology.region(r).name() == DEFAULT_REGION_NAME)
            .count();
        let result = check(defaults <= 1, || ModelViolation::DuplicateDefaultRegion {
            state: self.name(vertex),
            name: DEFAULT_REGION_NAME.to_string(),
        });
        self.checks.push(result);
    }

    fn visit_final_state(&mut self, vertex: VertexId) {
        let topology = self.topology();
        let behavior = self.machine.state_behavior(vertex);
        let state = self.name(vertex);
        self.checks.push(check(topology.vertex(vertex).outgoing().is_empty(), || {
            ModelViolation::FinalStateWithTransitions {
                state: state.clone(),
            }
        }));
        self.checks.push(check(topology.is_simple(vertex), || {
            ModelViolation::FinalStateWithRegions {
                state: state.clone(),
            }
        }));
        self.checks.push(check(behavior.entry().is_empty(), || {
            ModelViolation::FinalStateWithEntry {
                state: state.clone(),
            }
        }));
        self.checks.push(check(behavior.exit().is_empty(), || {
            ModelViolation::FinalStateWithExit { state }
        }));
    }

    fn visit_transitions(&mut self) {
        let topology = self.topology();
        for transition in topology.transitions() {
            let node = topology.transition(transition);
            if node.kind() != TransitionKind::Local {
                continue;
            }
            let contained = node
                .target()
                .is_some_and(|t| t == node.source() || topology.is_descendant(t, node.source()));
            self.checks.push(check(contained, || {
                ModelViolation::LocalTargetNotDescendant {
                    transition: topology.describe_transition(transition),
                }
            }));
        }
    }

    fn visit_names(&mut self) {
        let topology = self.topology();
        let elements = topology
            .vertices()
            .into_iter()
            .map(Element::from)
            .chain(topology.regions().into_iter().map(Element::from));
        let mut seen = HashSet::new();
        for element in elements {
            let name = topology.qualified_name(element);
            let unique = seen.insert(name.clone());
            self.checks.push(check(unique, || ModelViolation::DuplicateQualifiedName { name }));
        }
    }

    fn run(mut self) -> Check {
        let topology = self.topology();
        for region in topology.regions() {
            self.visit_region(region);
        }
        for vertex in topology.vertices() {
            match topology.kind(vertex) {
                VertexKind::Pseudo(kind) => self.visit_pseudo_state(vertex, kind),
                VertexKind::FinalState => {
                    self.visit_state(vertex);
                    self.visit_final_state(vertex);
                }
                VertexKind::State | VertexKind::Machine => self.visit_state(vertex),
            }
        }
        self.visit_transitions();
        self.visit_names();

        Validation::all_vec(self.checks).map(|_| ())
    }
}

impl<M, Env> StateMachine<M, Env> {
    /// Check the model's structure, reporting every violation found.
    ///
    /// Each violation is also sent to the configured logger: warnings via
    /// `warn` and errors via `error`. The model is not changed and remains
    /// usable whatever the outcome.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<ModelViolation>> {
        let result = Validator {
            machine: self,
            checks: Vec::new(),
        }
        .run();

        if let Validation::Failure(violations) = &result {
            for violation in violations.iter() {
                match violation.severity() {
                    Severity::Warning => self.config.logger.warn(&violation.to_string()),
                    Severity::Error => self.config.logger.error(&violation.to_string()),
                }
            }
        }
        result
    }
}
