//! Structural violations reported by the validator.

use crate::core::PseudoStateKind;
use thiserror::Error;

/// How serious a violation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelViolation {
    #[error("{pseudo_state}: {kind} pseudo states must have at least one outgoing transition")]
    MissingOutgoingTransition {
        pseudo_state: String,
        kind: PseudoStateKind,
    },

    #[error("{pseudo_state}: {kind} pseudo states cannot have more than one else transition")]
    MultipleElseTransitions {
        pseudo_state: String,
        kind: PseudoStateKind,
    },

    #[error("{pseudo_state}: {kind} pseudo states cannot have else transitions")]
    UnexpectedElseTransition {
        pseudo_state: String,
        kind: PseudoStateKind,
    },

    #[error("{pseudo_state}: initial pseudo states must have no more than one outgoing transition")]
    MultipleInitialTransitions { pseudo_state: String },

    #[error("{pseudo_state}: initial pseudo states cannot have a guard condition")]
    GuardedInitialTransition { pseudo_state: String },

    #[error("{region}: regions may have at most one {kind} pseudo state")]
    DuplicatePseudoState {
        region: String,
        kind: PseudoStateKind,
    },

    #[error("{state}: a state cannot have more than one region named {name}")]
    DuplicateDefaultRegion { state: String, name: String },

    #[error("{state}: final states must not have outgoing transitions")]
    FinalStateWithTransitions { state: String },

    #[error("{state}: final states must not have child regions")]
    FinalStateWithRegions { state: String },

    #[error("{state}: final states may not have entry behavior")]
    FinalStateWithEntry { state: String },

    #[error("{state}: final states may not have exit behavior")]
    FinalStateWithExit { state: String },

    #[error("{transition}: local transition target vertices must be a child of the source state")]
    LocalTargetNotDescendant { transition: String },

    #[error("{name}: qualified name is used by more than one element")]
    DuplicateQualifiedName { name: String },
}

impl ModelViolation {
    pub fn severity(&self) -> Severity {
        match self {
            Self::FinalStateWithEntry { .. } | Self::FinalStateWithExit { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}
