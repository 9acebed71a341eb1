//! Checkpoint and resume of state machine instances.
//!
//! A checkpoint wraps a `JsonInstance` snapshot with a format version, an
//! identifier and a timestamp, so a run can survive a process restart. It
//! carries no model data: restoring requires the same model, rebuilt by
//! the application, and is checked against the model's name.

use crate::instance::{Instance, JsonInstance, Snapshot};
use crate::model::StateMachine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable checkpoint of one instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Name of the model the instance runs
    pub machine: String,

    /// Name of the instance
    pub instance: String,

    pub snapshot: Snapshot,
}

impl Checkpoint {
    /// Capture the current configuration of `instance`.
    pub fn capture<M, Env>(model: &StateMachine<M, Env>, instance: &JsonInstance) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            machine: model.name().to_string(),
            instance: instance.name().to_string(),
            snapshot: instance.snapshot(),
        }
    }

    /// Rebuild the instance for `model`.
    pub fn restore<M, Env>(
        self,
        model: &StateMachine<M, Env>,
    ) -> Result<JsonInstance, CheckpointError> {
        if self.machine != model.name() {
            return Err(CheckpointError::ValidationFailed(format!(
                "checkpoint was taken from {} but restored into {}",
                self.machine,
                model.name()
            )));
        }
        Ok(JsonInstance::restore(self.instance, self.snapshot))
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()
    }

    fn check_version(self) -> Result<Self, CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (StateMachine<(), ()>, JsonInstance) {
        let mut model = StateMachine::new("machine");
        let root = model.root();
        let a = model.state("a", root);
        let region = model.default_region(root);
        let mut instance = JsonInstance::new("run");
        instance.set_current(model.topology(), region, a.vertex());
        instance.trace("enter machine.default.a");
        (model, instance)
    }

    #[test]
    fn json_checkpoint_round_trips() {
        let (model, instance) = sample();
        let checkpoint = Checkpoint::capture(&model, &instance);

        let json = checkpoint.to_json().unwrap();
        let restored = Checkpoint::from_json(&json).unwrap();

        assert_eq!(restored, checkpoint);
    }

    #[test]
    fn binary_checkpoint_round_trips() {
        let (model, instance) = sample();
        let checkpoint = Checkpoint::capture(&model, &instance);

        let bytes = checkpoint.to_binary().unwrap();
        let restored = Checkpoint::from_binary(&bytes).unwrap();

        assert_eq!(restored.snapshot, instance.snapshot());
        assert_eq!(restored.id, checkpoint.id);
    }

    #[test]
    fn restore_rebuilds_last_known_state() {
        let (model, instance) = sample();
        let region = model.topology().vertex(model.root().vertex()).regions()[0];

        let restored = Checkpoint::capture(&model, &instance).restore(&model).unwrap();

        assert_eq!(restored.name(), "run");
        assert_eq!(
            restored.last_known_state(model.topology(), region),
            instance.last_known_state(model.topology(), region)
        );
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let (model, instance) = sample();
        let mut checkpoint = Checkpoint::capture(&model, &instance);
        checkpoint.version = CHECKPOINT_VERSION + 1;
        let json = checkpoint.to_json().unwrap();

        assert!(matches!(
            Checkpoint::from_json(&json),
            Err(CheckpointError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn restore_into_another_model_is_rejected() {
        let (model, instance) = sample();
        let other: StateMachine<(), ()> = StateMachine::new("other");

        assert!(matches!(
            Checkpoint::capture(&model, &instance).restore(&other),
            Err(CheckpointError::ValidationFailed(_))
        ));
    }

    #[test]
    fn corrupt_input_fails_to_deserialize() {
        assert!(matches!(
            Checkpoint::from_json("not json"),
            Err(CheckpointError::DeserializationFailed(_))
        ));
        assert!(matches!(
            Checkpoint::from_binary(&[1, 2, 3]),
            Err(CheckpointError::DeserializationFailed(_))
        ));
    }
}
