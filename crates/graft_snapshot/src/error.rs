//! Snapshot, store and configuration errors

use graft_core::{FormatVersion, HandleError, RegistryError};
use graft_scene::Entity;
use thiserror::Error;

/// Errors raised by the capture / inject / link pipeline
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Snapshot slot is empty: never captured or loaded, or already injected
    #[error("coordinator '{coordinator}' has no snapshot to inject")]
    NothingToInject { coordinator: String },
    /// No injection ran since the last link
    #[error("coordinator '{coordinator}' has no pending injections to link")]
    NothingToLink { coordinator: String },
    /// Target entity was despawned
    #[error("coordinator '{coordinator}': target {entity} is not alive")]
    StaleTarget { coordinator: String, entity: Entity },
    /// Two coordinators in one set share a name
    #[error("duplicate coordinator name: {0}")]
    DuplicateCoordinator(String),
    /// Behaviour registry error
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Entity or behaviour handle error
    #[error(transparent)]
    Handle(#[from] HandleError),
}

/// Snapshot store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    /// Document written by an incompatible layout
    #[error("Version mismatch: document version {found}, supported {supported}")]
    VersionMismatch {
        found: FormatVersion,
        supported: FormatVersion,
    },
    /// Slot not found
    #[error("Snapshot slot not found: {0}")]
    SlotNotFound(String),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Unknown snapshot format: {0}")]
    UnknownFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_error_display() {
        let err = SnapshotError::NothingToInject {
            coordinator: "crate".into(),
        };
        assert_eq!(err.to_string(), "coordinator 'crate' has no snapshot to inject");

        let err: SnapshotError = RegistryError::NotRegistered("ghost".into()).into();
        assert_eq!(err.to_string(), "Type not registered: ghost");
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::VersionMismatch {
            found: FormatVersion::new(2, 0),
            supported: FormatVersion::new(1, 0),
        };
        assert_eq!(
            err.to_string(),
            "Version mismatch: document version 2.0, supported 1.0"
        );
    }
}
