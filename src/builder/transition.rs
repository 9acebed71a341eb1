//! Fluent modifier for transitions.

use crate::core::{ActionError, Guard, GuardContext, TransitionId, TransitionKind, Trigger};
use crate::model::StateMachine;
use std::sync::Arc;
use stillwater::effect::BoxedEffect;

/// Handle for configuring a transition with a fluent API.
///
/// Obtained from `StateMachine::to`, `StateMachine::internal` or
/// `StateMachine::transition_mut`. Every call marks the model dirty.
pub struct TransitionBuilder<'a, M, Env> {
    machine: &'a mut StateMachine<M, Env>,
    id: TransitionId,
}

impl<'a, M, Env> TransitionBuilder<'a, M, Env> {
    pub(crate) fn new(machine: &'a mut StateMachine<M, Env>, id: TransitionId) -> Self {
        Self { machine, id }
    }

    /// The handle of the transition being configured.
    pub fn id(&self) -> TransitionId {
        self.id
    }

    /// Set the transition kind. Transitions without a target stay internal.
    pub fn kind(self, kind: TransitionKind) -> Self {
        self.machine.topology.set_transition_kind(self.id, kind);
        self.machine.invalidate();
        self
    }

    /// Replace the guard.
    pub fn guard(self, guard: Guard<M, Env>) -> Self {
        self.machine.transitions[self.id.0].guard = guard;
        self.machine.invalidate();
        self
    }

    /// Replace the guard with a predicate over the trigger, the environment
    /// and the instance being evaluated.
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&Trigger<'_, M>, &GuardContext<'_, Env>) -> bool + Send + Sync + 'static,
    {
        self.guard(Guard::new(predicate))
    }

    /// Fire only for messages equal to `message`.
    pub fn on(self, message: M) -> Self
    where
        M: PartialEq + Send + Sync + 'static,
    {
        self.when(move |trigger: &Trigger<'_, M>, _: &GuardContext<'_, Env>| trigger.is(&message))
    }

    /// Mark this as the else branch of a Choice or Junction.
    pub fn otherwise(self) -> Self {
        self.guard(Guard::Else)
    }

    /// Append an effect run while the transition is traversed.
    pub fn effect<F>(self, effect: F) -> Self
    where
        F: Fn(&Trigger<'_, M>) -> BoxedEffect<(), ActionError, Env> + Send + Sync + 'static,
    {
        self.machine.transitions[self.id.0]
            .effects
            .push(Arc::new(effect));
        self.machine.invalidate();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{action, PseudoStateKind, RegionId, VertexId};

    type Model = StateMachine<&'static str, ()>;

    #[test]
    fn on_matches_only_the_given_message() {
        let mut model = Model::new("machine");
        let root = model.root();
        let a = model.state("a", root);
        let b = model.state("b", root);
        let id = model.to(a, b).on("go").id();

        let guard = model.transition_behavior(id).guard();
        let nothing_active = |_: RegionId| -> Option<VertexId> { None };
        let context = GuardContext::new(&(), model.topology(), &nothing_active);
        assert!(guard.check(&Trigger::Message(&"go"), &context));
        assert!(!guard.check(&Trigger::Message(&"stop"), &context));
        assert!(!guard.check(&Trigger::Completion(a.vertex()), &context));
    }

    #[test]
    fn otherwise_marks_else_branch() {
        let mut model = Model::new("machine");
        let root = model.root();
        let choice = model.pseudo_state("choice", root, PseudoStateKind::Choice);
        let a = model.state("a", root);
        let id = model.to(choice, a).otherwise().id();

        assert!(model.transition_behavior(id).guard().is_else());
    }

    #[test]
    fn kind_is_ignored_without_target() {
        let mut model = Model::new("machine");
        let root = model.root();
        let a = model.state("a", root);
        let id = model.internal(a).kind(TransitionKind::Local).id();

        assert_eq!(model.topology().transition(id).kind(), TransitionKind::Internal);
    }

    #[test]
    fn effects_accumulate_in_order() {
        let mut model = Model::new("machine");
        let root = model.root();
        let a = model.state("a", root);
        let b = model.state("b", root);
        let noop = action::<&'static str, (), _>(|_: &()| Ok(()));
        let id = model.to(a, b).effect(noop.clone()).effect(noop).id();

        model.clean = true;
        model.transition_mut(id).kind(TransitionKind::Local);

        assert_eq!(model.transition_behavior(id).effects().len(), 2);
        assert_eq!(model.topology().transition(id).kind(), TransitionKind::Local);
        assert!(!model.is_clean());
    }
}
