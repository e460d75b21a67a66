//! Persisted snapshot document
//!
//! One document holds the snapshots of every coordinator in a set, keyed by
//! coordinator name, behind a small header.

use std::collections::BTreeMap;

use graft_core::FormatVersion;
use serde::{Deserialize, Serialize};

use crate::entity::GameObjectState;

/// Document header
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    /// Layout version the document was written with
    pub format_version: FormatVersion,
    /// Human-readable name
    pub name: String,
    /// Creation time (Unix seconds)
    pub timestamp: u64,
}

impl SnapshotHeader {
    /// Header stamped with the current layout version and time
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            format_version: FormatVersion::CURRENT,
            name: name.into(),
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }
}

/// Snapshots of a whole coordinator set
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub header: SnapshotHeader,
    pub coordinators: BTreeMap<String, Vec<GameObjectState>>,
}

impl SceneSnapshot {
    /// Empty document
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            header: SnapshotHeader::new(name),
            coordinators: BTreeMap::new(),
        }
    }

    /// Builder: add one coordinator's snapshots
    pub fn with_coordinator(mut self, name: impl Into<String>, states: Vec<GameObjectState>) -> Self {
        self.coordinators.insert(name.into(), states);
        self
    }

    pub fn get(&self, coordinator: &str) -> Option<&[GameObjectState]> {
        self.coordinators.get(coordinator).map(Vec::as_slice)
    }

    /// Total number of entity snapshots
    pub fn entity_count(&self) -> usize {
        self.coordinators.values().map(Vec::len).sum()
    }
}
