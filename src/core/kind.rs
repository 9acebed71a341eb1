//! Kinds of vertices and transitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Behavior of a pseudostate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PseudoStateKind {
    /// Dynamic conditional branch; guards are evaluated after the incoming
    /// leg has executed.
    Choice,
    /// As `ShallowHistory`, but the history semantic cascades through every
    /// child region.
    DeepHistory,
    /// Default starting point of the enclosing region.
    Initial,
    /// Static conditional branch; resolved before any leg executes.
    Junction,
    /// Re-entry of the enclosing region resumes its last known state.
    ShallowHistory,
    /// Entering it terminates the instance.
    Terminate,
}

impl PseudoStateKind {
    /// Initial, ShallowHistory and DeepHistory all mark a region's entry point.
    pub fn is_initial(self) -> bool {
        matches!(self, Self::Initial) || self.is_history()
    }

    pub fn is_history(self) -> bool {
        matches!(self, Self::ShallowHistory | Self::DeepHistory)
    }
}

impl fmt::Display for PseudoStateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Choice => "Choice",
            Self::DeepHistory => "DeepHistory",
            Self::Initial => "Initial",
            Self::Junction => "Junction",
            Self::ShallowHistory => "ShallowHistory",
            Self::Terminate => "Terminate",
        };
        f.write_str(name)
    }
}

/// How a transition moves between its source and target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionKind {
    /// Exits the source and enters the target regardless of their proximity.
    #[default]
    External,
    /// Runs only the transition's effects; no state is exited or entered.
    Internal,
    /// Does not exit the source; the target must be one of its descendants.
    Local,
}

/// The closed set of vertex variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexKind {
    Pseudo(PseudoStateKind),
    State,
    /// A state that must have no outgoing transitions, regions or behavior.
    FinalState,
    /// The root of the model.
    Machine,
}

impl VertexKind {
    /// States, final states and the machine can be active and own regions.
    pub fn is_state(self) -> bool {
        !matches!(self, Self::Pseudo(_))
    }

    pub fn pseudo_state_kind(self) -> Option<PseudoStateKind> {
        match self {
            Self::Pseudo(kind) => Some(kind),
            _ => None,
        }
    }
}
