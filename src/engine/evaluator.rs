//! Run-time evaluation of messages against instances.
//!
//! Evaluation only reads the model; every change lands in the instance.
//! Actions are Stillwater effects run against the caller's environment and
//! awaited one at a time, in the order they were compiled.

use super::compiler::{Compiled, Step};
use super::error::{EngineError, ModelingError};
use crate::config::ErrorPolicy;
use crate::core::{
    Action, Element, GuardContext, PseudoStateKind, RegionId, Topology, TransitionId, Trigger,
    VertexId,
};
use crate::instance::Instance;
use crate::model::StateMachine;
use futures::future::{FutureExt, LocalBoxFuture};
use std::fmt;
use stillwater::effect::Effect;

/// True if `vertex` and each of its ancestors is the last known state of
/// its region.
pub(crate) fn is_active<I>(topology: &Topology, instance: &I, vertex: VertexId) -> bool
where
    I: Instance + ?Sized,
{
    topology.is_active_with(vertex, |region| instance.last_known_state(topology, region))
}

/// A region is complete when its last known state is final; a state when
/// all of its regions are.
pub(crate) fn is_complete<I>(topology: &Topology, instance: &I, element: Element) -> bool
where
    I: Instance + ?Sized,
{
    match element {
        Element::Region(region) => instance
            .last_known_state(topology, region)
            .is_some_and(|state| topology.is_final(state)),
        Element::Vertex(vertex) => topology
            .vertex(vertex)
            .regions()
            .iter()
            .all(|&region| is_complete(topology, instance, region.into())),
    }
}

struct Evaluator<'m, M, Env> {
    machine: &'m StateMachine<M, Env>,
    compiled: &'m Compiled<M, Env>,
    env: &'m Env,
}

impl<'m, M, Env> Evaluator<'m, M, Env>
where
    M: fmt::Debug + 'static,
    Env: Clone + Send + Sync + 'static,
{
    fn topology(&self) -> &'m Topology {
        &self.machine.topology
    }

    /// Log a recoverable modeling error and apply the error policy.
    fn report(&self, error: ModelingError) -> Result<(), EngineError> {
        self.machine.config.logger.error(&error.to_string());
        match self.machine.config.on_error {
            ErrorPolicy::Abort => Err(error.into()),
            ErrorPolicy::IgnoreAndLog => Ok(()),
        }
    }

    /// Log a modeling error that leaves nothing sensible to do.
    fn fatal(&self, error: ModelingError) -> EngineError {
        self.machine.config.logger.error(&error.to_string());
        error.into()
    }

    /// The transitions among `outgoing` whose guards pass.
    fn passing<I>(
        &self,
        outgoing: &[TransitionId],
        trigger: Trigger<'_, M>,
        instance: &I,
    ) -> Vec<TransitionId>
    where
        I: Instance + ?Sized,
    {
        let topology = self.topology();
        let last_known = |region: RegionId| instance.last_known_state(topology, region);
        let context = GuardContext::new(self.env, topology, &last_known);
        outgoing
            .iter()
            .copied()
            .filter(|&t| self.machine.transition_behavior(t).guard.check(&trigger, &context))
            .collect()
    }

    fn describe(&self, element: impl Into<Element>) -> String {
        self.topology().qualified_name(element.into())
    }

    async fn run_actions(
        &self,
        actions: &[Action<M, Env>],
        trigger: Trigger<'_, M>,
    ) -> Result<(), EngineError> {
        for action in actions {
            action(&trigger).run(self.env).await?;
        }
        Ok(())
    }

    fn invoke<'a, I>(
        &'a self,
        steps: &'a [Step<M, Env>],
        instance: &'a mut I,
        trigger: Trigger<'a, M>,
        deep_history: bool,
    ) -> LocalBoxFuture<'a, Result<(), EngineError>>
    where
        I: Instance + ?Sized,
    {
        async move {
            for step in steps {
                self.run_step(step, instance, trigger, deep_history).await?;
            }
            Ok(())
        }
        .boxed_local()
    }

    /// Begin and end entry of `element`.
    async fn enter<I>(
        &self,
        element: Element,
        instance: &mut I,
        trigger: Trigger<'_, M>,
        deep_history: bool,
    ) -> Result<(), EngineError>
    where
        I: Instance + ?Sized,
    {
        self.invoke(self.compiled.begin_enter(element), instance, trigger, deep_history)
            .await?;
        self.invoke(self.compiled.end_enter(element), instance, trigger, deep_history)
            .await
    }

    fn run_step<'a, I>(
        &'a self,
        step: &'a Step<M, Env>,
        instance: &'a mut I,
        trigger: Trigger<'a, M>,
        deep_history: bool,
    ) -> LocalBoxFuture<'a, Result<(), EngineError>>
    where
        I: Instance + ?Sized,
    {
        async move {
            let topology = self.topology();
            let logger = &self.machine.config.logger;
            match step {
                Step::Enter(element) => {
                    let name = self.describe(*element);
                    logger.log(&format!("{} enter {}", instance.name(), name));
                    instance.trace(&format!("enter {}", name));
                }
                Step::Leave(element) => {
                    let name = self.describe(*element);
                    logger.log(&format!("{} leave {}", instance.name(), name));
                    instance.trace(&format!("leave {}", name));
                }
                Step::SetCurrent { region, vertex } => {
                    instance.set_current(topology, *region, *vertex);
                }
                Step::Behavior(action) => {
                    action(&trigger).run(self.env).await?;
                }
                Step::LeaveActive(region) => {
                    if let Some(current) = instance.current(topology, *region) {
                        self.invoke(self.compiled.leave(current), instance, trigger, false)
                            .await?;
                    }
                }
                Step::EnterRegion { region, initial } => {
                    let initial_kind = initial.and_then(|v| topology.pseudo_state_kind(v));
                    let history = initial_kind.is_some_and(PseudoStateKind::is_history);
                    let target = if deep_history || history {
                        instance.last_known_state(topology, *region).or(*initial)
                    } else {
                        *initial
                    };
                    match target {
                        Some(target) => {
                            let deeper = deep_history
                                || initial_kind == Some(PseudoStateKind::DeepHistory);
                            self.enter(target.into(), instance, trigger, deeper).await?;
                        }
                        None if !topology.region(*region).vertices().is_empty() => {
                            logger.warn(&format!(
                                "{}: region has no initial vertex to enter",
                                self.describe(*region)
                            ));
                        }
                        None => {}
                    }
                }
                Step::Resume(pseudo_state) => {
                    self.resume(*pseudo_state, instance, trigger, deep_history)
                        .await?;
                }
                Step::Terminate => instance.terminate(),
                Step::CompleteInternal(state) => {
                    if topology.is_state(*state)
                        && is_complete(topology, &*instance, (*state).into())
                    {
                        self.evaluate_state(*state, instance, Trigger::Completion(*state))
                            .await?;
                    }
                }
                Step::Local(transition) => {
                    self.traverse_local(*transition, instance, trigger).await?;
                }
            }
            Ok(())
        }
        .boxed_local()
    }

    /// Complete entry of an initial or history pseudostate: restore the
    /// last known state when history applies, otherwise follow the
    /// pseudostate's outgoing transition.
    async fn resume<I>(
        &self,
        pseudo_state: VertexId,
        instance: &mut I,
        trigger: Trigger<'_, M>,
        deep_history: bool,
    ) -> Result<(), EngineError>
    where
        I: Instance + ?Sized,
    {
        let topology = self.topology();
        let kind = topology.pseudo_state_kind(pseudo_state);
        let history = deep_history || kind.is_some_and(PseudoStateKind::is_history);
        let last_known = match topology.vertex(pseudo_state).parent() {
            Some(region) if history => instance.last_known_state(topology, region),
            _ => None,
        };

        if let Some(state) = last_known {
            self.invoke(self.compiled.leave(pseudo_state), instance, trigger, false)
                .await?;
            let deeper = deep_history || kind == Some(PseudoStateKind::DeepHistory);
            return self.enter(state.into(), instance, trigger, deeper).await;
        }

        match topology.vertex(pseudo_state).outgoing().first() {
            Some(&transition) => {
                self.traverse(transition, instance, trigger).await?;
                Ok(())
            }
            None => Err(self.fatal(ModelingError::MissingInitialTransition {
                pseudo_state: self.describe(pseudo_state),
            })),
        }
    }

    fn evaluate_state<'a, I>(
        &'a self,
        state: VertexId,
        instance: &'a mut I,
        trigger: Trigger<'a, M>,
    ) -> LocalBoxFuture<'a, Result<bool, EngineError>>
    where
        I: Instance + ?Sized,
    {
        async move {
            let topology = self.topology();
            let continuation = trigger.is_completion_of(state);
            let mut result = false;

            if !continuation {
                for &region in topology.vertex(state).regions() {
                    let Some(current) = instance.last_known_state(topology, region) else {
                        continue;
                    };
                    if self.evaluate_state(current, instance, trigger).await? {
                        result = true;
                        if !is_active(topology, &*instance, state) {
                            break;
                        }
                    }
                }
            }

            if result {
                if !continuation && is_complete(topology, &*instance, state.into()) {
                    self.evaluate_state(state, instance, Trigger::Completion(state))
                        .await?;
                }
                return Ok(true);
            }

            let passing = self.passing(topology.vertex(state).outgoing(), trigger, &*instance);

            match passing.as_slice() {
                [] => Ok(false),
                [transition] => self.traverse(*transition, instance, trigger).await,
                _ => {
                    self.report(ModelingError::AmbiguousTransition {
                        state: self.describe(state),
                        message: format!("{:?}", trigger),
                    })?;
                    Ok(false)
                }
            }
        }
        .boxed_local()
    }

    fn traverse<'a, I>(
        &'a self,
        transition: TransitionId,
        instance: &'a mut I,
        trigger: Trigger<'a, M>,
    ) -> LocalBoxFuture<'a, Result<bool, EngineError>>
    where
        I: Instance + ?Sized,
    {
        async move {
            let topology = self.topology();

            // junction legs are resolved before any of them runs
            let mut legs = vec![transition];
            let mut last = transition;
            while let Some(target) = topology.transition(last).target() {
                if topology.pseudo_state_kind(target) != Some(PseudoStateKind::Junction) {
                    break;
                }
                last = self.select_transition(target, trigger, &*instance)?;
                legs.push(last);
            }

            for leg in legs {
                self.invoke(self.compiled.traversal(leg), instance, trigger, false)
                    .await?;
            }

            if let Some(target) = topology.transition(last).target() {
                if topology.pseudo_state_kind(target) == Some(PseudoStateKind::Choice) {
                    let next = self.select_transition(target, trigger, &*instance)?;
                    self.traverse(next, instance, trigger).await?;
                } else if topology.is_state(target)
                    && is_complete(topology, &*instance, target.into())
                {
                    self.evaluate_state(target, instance, Trigger::Completion(target))
                        .await?;
                }
            }

            Ok(true)
        }
        .boxed_local()
    }

    /// Pick the outgoing transition of a Choice or Junction.
    fn select_transition<I>(
        &self,
        pseudo_state: VertexId,
        trigger: Trigger<'_, M>,
        instance: &I,
    ) -> Result<TransitionId, EngineError>
    where
        I: Instance + ?Sized,
    {
        let topology = self.topology();
        let outgoing = topology.vertex(pseudo_state).outgoing();
        let passing = self.passing(outgoing, trigger, instance);

        let selected = if topology.pseudo_state_kind(pseudo_state) == Some(PseudoStateKind::Choice)
        {
            match passing.len() {
                0 => None,
                len => Some(passing[(self.machine.config.random)(len) % len]),
            }
        } else {
            if passing.len() > 1 {
                self.report(ModelingError::AmbiguousJunction {
                    pseudo_state: self.describe(pseudo_state),
                    message: format!("{:?}", trigger),
                })?;
            }
            passing.first().copied()
        };

        selected
            .or_else(|| {
                outgoing
                    .iter()
                    .copied()
                    .find(|&t| self.machine.transition_behavior(t).guard.is_else())
            })
            .ok_or_else(|| {
                self.fatal(ModelingError::NoEligibleTransition {
                    pseudo_state: self.describe(pseudo_state),
                    message: format!("{:?}", trigger),
                })
            })
    }

    /// Leave the active sibling of the first inactive vertex on the
    /// target's path, run the effects, then enter down to the target.
    fn traverse_local<'a, I>(
        &'a self,
        transition: TransitionId,
        instance: &'a mut I,
        trigger: Trigger<'a, M>,
    ) -> LocalBoxFuture<'a, Result<(), EngineError>>
    where
        I: Instance + ?Sized,
    {
        async move {
            let topology = self.topology();
            let not_descendant = || {
                self.fatal(ModelingError::LocalTargetNotDescendant {
                    transition: topology.describe_transition(transition),
                })
            };
            let target = topology.transition(transition).target().ok_or_else(not_descendant)?;
            let path = topology.vertex_ancestry(target);

            // a fully active path re-enters the target itself
            let index = path
                .iter()
                .position(|&v| !is_active(topology, &*instance, v))
                .unwrap_or(path.len() - 1);
            let region = topology
                .vertex(path[index])
                .parent()
                .ok_or_else(not_descendant)?;

            if let Some(current) = instance.current(topology, region) {
                self.invoke(self.compiled.leave(current), instance, trigger, false)
                    .await?;
            }

            let effects = self.machine.transition_behavior(transition).effects();
            self.run_actions(effects, trigger).await?;

            let entry = self.compiled.cascade_entry(topology, &path, index);
            self.invoke(&entry, instance, trigger, false).await?;
            self.invoke(self.compiled.end_enter(target), instance, trigger, false)
                .await
        }
        .boxed_local()
    }
}

impl<M, Env> StateMachine<M, Env>
where
    M: fmt::Debug + 'static,
    Env: Clone + Send + Sync + 'static,
{
    fn program(&self) -> Result<&Compiled<M, Env>, EngineError> {
        match &self.compiled {
            Some(compiled) if self.clean => Ok(compiled),
            _ => Err(EngineError::NotInitialised(self.name().to_string())),
        }
    }

    /// Enter the machine for the first time, compiling it if it changed.
    pub async fn initialise_instance<I>(
        &mut self,
        instance: &mut I,
        env: &Env,
    ) -> Result<(), EngineError>
    where
        I: Instance + ?Sized,
    {
        if !self.clean {
            self.initialise();
        }
        self.initialise_compiled(instance, env).await
    }

    /// Enter the machine for the first time; the model must be clean.
    pub async fn initialise_compiled<I>(&self, instance: &mut I, env: &Env) -> Result<(), EngineError>
    where
        I: Instance + ?Sized,
    {
        let compiled = self.program()?;
        self.config
            .logger
            .log(&format!("initialise {}", instance.name()));
        let evaluator = Evaluator {
            machine: self,
            compiled,
            env,
        };
        evaluator
            .invoke(compiled.on_initialise(), instance, Trigger::Initialise, false)
            .await
    }

    /// Evaluate a message, compiling the model first if it changed.
    ///
    /// Returns `Ok(true)` if a transition fired. A terminated instance
    /// never evaluates and yields `Ok(false)`.
    pub async fn evaluate<I>(
        &mut self,
        instance: &mut I,
        message: &M,
        env: &Env,
    ) -> Result<bool, EngineError>
    where
        I: Instance + ?Sized,
    {
        if !self.clean {
            self.initialise();
        }
        self.evaluate_compiled(instance, message, env).await
    }

    /// Evaluate a message against a clean model.
    pub async fn evaluate_compiled<I>(
        &self,
        instance: &mut I,
        message: &M,
        env: &Env,
    ) -> Result<bool, EngineError>
    where
        I: Instance + ?Sized,
    {
        let compiled = self.program()?;
        self.config
            .logger
            .log(&format!("{} evaluate {:?}", instance.name(), message));
        instance.trace(&format!("evaluate {:?}", message));

        if instance.is_terminated() {
            return Ok(false);
        }

        let evaluator = Evaluator {
            machine: self,
            compiled,
            env,
        };
        evaluator
            .evaluate_state(self.topology.root(), instance, Trigger::Message(message))
            .await
    }

    /// True if `vertex` is active in `instance`.
    pub fn is_active<I>(&self, instance: &I, vertex: impl Into<VertexId>) -> bool
    where
        I: Instance + ?Sized,
    {
        is_active(&self.topology, instance, vertex.into())
    }

    /// True if the state or region has completed in `instance`.
    pub fn is_complete<I>(&self, instance: &I, element: impl Into<Element>) -> bool
    where
        I: Instance + ?Sized,
    {
        is_complete(&self.topology, instance, element.into())
    }
}
