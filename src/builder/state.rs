//! Fluent modifier for state behavior.

use crate::core::{ActionError, StateId, Trigger};
use crate::model::StateMachine;
use std::sync::Arc;
use stillwater::effect::BoxedEffect;

/// Handle for adding entry and exit behavior to a state.
pub struct StateBuilder<'a, M, Env> {
    machine: &'a mut StateMachine<M, Env>,
    id: StateId,
}

impl<'a, M, Env> StateBuilder<'a, M, Env> {
    pub(crate) fn new(machine: &'a mut StateMachine<M, Env>, id: StateId) -> Self {
        Self { machine, id }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    /// Append an action run when the state is entered.
    pub fn entry<F>(self, action: F) -> Self
    where
        F: Fn(&Trigger<'_, M>) -> BoxedEffect<(), ActionError, Env> + Send + Sync + 'static,
    {
        self.machine.states[self.id.vertex().0]
            .entry
            .push(Arc::new(action));
        self.machine.invalidate();
        self
    }

    /// Append an action run when the state is exited.
    pub fn exit<F>(self, action: F) -> Self
    where
        F: Fn(&Trigger<'_, M>) -> BoxedEffect<(), ActionError, Env> + Send + Sync + 'static,
    {
        self.machine.states[self.id.vertex().0]
            .exit
            .push(Arc::new(action));
        self.machine.invalidate();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action;

    #[test]
    fn entry_and_exit_are_recorded_per_state() {
        let mut model: StateMachine<(), ()> = StateMachine::new("machine");
        let root = model.root();
        let a = model.state("a", root);
        let b = model.state("b", root);
        let noop = action::<(), (), _>(|_: &()| Ok(()));

        model.state_mut(a).entry(noop.clone()).exit(noop.clone()).exit(noop);

        assert_eq!(model.state_behavior(a.vertex()).entry().len(), 1);
        assert_eq!(model.state_behavior(a.vertex()).exit().len(), 2);
        assert!(model.state_behavior(b.vertex()).is_empty());
    }
}
