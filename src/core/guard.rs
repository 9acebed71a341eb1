//! Guard predicates for controlling transitions.
//!
//! Guards are pure boolean functions that determine whether a transition
//! can be traversed for a given trigger. They read the environment and the
//! instance through a `GuardContext` and never mutate either.

use super::element::{RegionId, VertexId};
use super::topology::Topology;
use std::fmt;
use std::sync::Arc;

/// What caused the current evaluation.
///
/// A `Completion` trigger is raised by the engine when a state has finished
/// its work (every child region reached a final state, or the state is
/// simple); transitions created without an explicit guard respond to it.
pub enum Trigger<'a, M> {
    /// First entry of an instance into the machine.
    Initialise,
    /// A caller-supplied message.
    Message(&'a M),
    /// Completion of the given state.
    Completion(VertexId),
}

impl<M> Clone for Trigger<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for Trigger<'_, M> {}

impl<'a, M> Trigger<'a, M> {
    /// The caller's message, if this trigger carries one.
    pub fn message(&self) -> Option<&'a M> {
        match self {
            Self::Message(message) => Some(*message),
            _ => None,
        }
    }

    /// True if this is the completion trigger of `state`.
    pub fn is_completion_of(&self, state: VertexId) -> bool {
        matches!(self, Self::Completion(completed) if *completed == state)
    }

    /// True if this trigger carries a message equal to `expected`.
    pub fn is(&self, expected: &M) -> bool
    where
        M: PartialEq,
    {
        self.message().is_some_and(|message| message == expected)
    }
}

impl<M: fmt::Debug> fmt::Debug for Trigger<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initialise => f.write_str("initialise"),
            Self::Message(message) => write!(f, "{:?}", message),
            Self::Completion(state) => write!(f, "completion of {:?}", state),
        }
    }
}

/// What a guard sees besides the trigger: the caller's environment and a
/// read-only view of the instance being evaluated.
///
/// The view answers in terms of last known states, so a guard on one
/// orthogonal region can test where a sibling region currently is.
pub struct GuardContext<'a, Env> {
    env: &'a Env,
    topology: &'a Topology,
    last_known: &'a dyn Fn(RegionId) -> Option<VertexId>,
}

impl<'a, Env> GuardContext<'a, Env> {
    pub fn new(
        env: &'a Env,
        topology: &'a Topology,
        last_known: &'a dyn Fn(RegionId) -> Option<VertexId>,
    ) -> Self {
        Self {
            env,
            topology,
            last_known,
        }
    }

    pub fn env(&self) -> &'a Env {
        self.env
    }

    pub fn topology(&self) -> &'a Topology {
        self.topology
    }

    pub fn last_known_state(&self, region: RegionId) -> Option<VertexId> {
        (self.last_known)(region)
    }

    /// True if `vertex` is active in the instance being evaluated.
    pub fn is_active(&self, vertex: impl Into<VertexId>) -> bool {
        self.topology.is_active_with(vertex.into(), self.last_known)
    }
}

type Predicate<M, Env> =
    Arc<dyn Fn(&Trigger<'_, M>, &GuardContext<'_, Env>) -> bool + Send + Sync>;

/// Pure predicate that determines if a transition can be traversed.
///
/// # Example
///
/// ```rust
/// use statechart::core::{Guard, GuardContext, RegionId, Trigger, VertexId};
/// use statechart::StateMachine;
///
/// #[derive(Debug, PartialEq)]
/// enum Switch { On, Off }
///
/// let guard: Guard<Switch, ()> = Guard::new(|trigger: &Trigger<Switch>, _: &GuardContext<()>| {
///     trigger.is(&Switch::On)
/// });
///
/// let model: StateMachine<Switch, ()> = StateMachine::new("switch");
/// let nothing_active = |_: RegionId| -> Option<VertexId> { None };
/// let context = GuardContext::new(&(), model.topology(), &nothing_active);
///
/// assert!(guard.check(&Trigger::Message(&Switch::On), &context));
/// assert!(!guard.check(&Trigger::Message(&Switch::Off), &context));
/// ```
pub enum Guard<M, Env> {
    /// Default for state sources: passes only on the source's completion.
    Completion(VertexId),
    /// Default for pseudostate sources.
    Always,
    /// Constant false; marks the fallback branch of a Choice or Junction.
    Else,
    /// Caller-supplied predicate.
    Custom(Predicate<M, Env>),
}

impl<M, Env> Guard<M, Env> {
    /// Create a guard from a pure predicate function.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Trigger<'_, M>, &GuardContext<'_, Env>) -> bool + Send + Sync + 'static,
    {
        Guard::Custom(Arc::new(predicate))
    }

    /// Check if the guard allows traversal for this trigger.
    pub fn check(&self, trigger: &Trigger<'_, M>, context: &GuardContext<'_, Env>) -> bool {
        match self {
            Self::Completion(source) => trigger.is_completion_of(*source),
            Self::Always => true,
            Self::Else => false,
            Self::Custom(predicate) => predicate(trigger, context),
        }
    }

    pub fn is_else(&self) -> bool {
        matches!(self, Self::Else)
    }

    /// True unless a caller-supplied predicate or else marker was set.
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Completion(_) | Self::Always)
    }
}

impl<M, Env> Clone for Guard<M, Env> {
    fn clone(&self) -> Self {
        match self {
            Self::Completion(source) => Self::Completion(*source),
            Self::Always => Self::Always,
            Self::Else => Self::Else,
            Self::Custom(predicate) => Self::Custom(Arc::clone(predicate)),
        }
    }
}

impl<M, Env> fmt::Debug for Guard<M, Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completion(source) => write!(f, "Completion({:?})", source),
            Self::Always => f.write_str("Always"),
            Self::Else => f.write_str("Else"),
            Self::Custom(_) => f.write_str("Custom"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Parent, VertexKind};

    #[derive(Debug, PartialEq)]
    enum Message {
        Start,
        Stop,
    }

    fn check<Env>(guard: &Guard<Message, Env>, trigger: Trigger<'_, Message>, env: &Env) -> bool {
        let topology = Topology::new("machine");
        let nothing_active = |_: RegionId| -> Option<VertexId> { None };
        guard.check(&trigger, &GuardContext::new(env, &topology, &nothing_active))
    }

    #[test]
    fn custom_guard_sees_message() {
        let guard: Guard<Message, ()> = Guard::new(|t: &Trigger<Message>, _: &GuardContext<()>| {
            t.is(&Message::Start)
        });

        assert!(check(&guard, Trigger::Message(&Message::Start), &()));
        assert!(!check(&guard, Trigger::Message(&Message::Stop), &()));
        assert!(!check(&guard, Trigger::Initialise, &()));
    }

    #[test]
    fn completion_guard_matches_only_its_source() {
        let source = VertexId(3);
        let guard: Guard<Message, ()> = Guard::Completion(source);

        assert!(check(&guard, Trigger::Completion(source), &()));
        assert!(!check(&guard, Trigger::Completion(VertexId(4)), &()));
        assert!(!check(&guard, Trigger::Message(&Message::Start), &()));
    }

    #[test]
    fn else_guard_never_passes() {
        let guard: Guard<Message, ()> = Guard::Else;

        assert!(!check(&guard, Trigger::Initialise, &()));
        assert!(guard.is_else());
        assert!(!guard.is_default());
    }

    #[test]
    fn guard_can_read_environment() {
        let guard: Guard<Message, u32> = Guard::new(|_: &Trigger<Message>, context: &GuardContext<u32>| {
            *context.env() > 2
        });

        assert!(check(&guard, Trigger::Initialise, &3));
        assert!(!check(&guard, Trigger::Initialise, &1));
    }

    #[test]
    fn guard_can_read_the_instance() {
        let mut topology = Topology::new("machine");
        let root = topology.root();
        let region = topology.default_region(root);
        let idle = topology.add_vertex("idle", Parent::Region(region), VertexKind::State);
        let busy = topology.add_vertex("busy", Parent::Region(region), VertexKind::State);
        let guard: Guard<Message, ()> = Guard::new(move |_: &Trigger<Message>, context: &GuardContext<()>| {
            context.is_active(busy)
        });

        let idle_active = |_: RegionId| Some(idle);
        let busy_active = |_: RegionId| Some(busy);

        assert!(!guard.check(&Trigger::Initialise, &GuardContext::new(&(), &topology, &idle_active)));
        assert!(guard.check(&Trigger::Initialise, &GuardContext::new(&(), &topology, &busy_active)));
    }

    #[test]
    fn guard_is_deterministic() {
        let guard: Guard<Message, ()> = Guard::new(|t: &Trigger<Message>, _: &GuardContext<()>| {
            t.message().is_some()
        });

        assert_eq!(
            check(&guard, Trigger::Message(&Message::Stop), &()),
            check(&guard, Trigger::Message(&Message::Stop), &())
        );
    }
}
