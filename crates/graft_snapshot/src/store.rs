//! Snapshot store
//!
//! Slot-based persistence of [`SceneSnapshot`] documents. Each slot is one
//! file in the save directory, written as pretty JSON or bincode depending on
//! the configured format. Loading rejects documents whose layout version this
//! build cannot read.
//!
//! JSON has no encoding for infinite or NaN floats, so a JSON save refuses
//! documents holding them instead of writing a slot that cannot be read
//! back. The binary format stores them as is.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use graft_core::FormatVersion;
use graft_scene::Value;
use serde::{Deserialize, Serialize};

use crate::document::{SceneSnapshot, SnapshotHeader};
use crate::error::{ConfigError, StoreError};
use crate::transform::TransformSnapshot;

/// On-disk encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    /// JSON (human readable)
    #[default]
    Json,
    /// Binary (compact)
    Binary,
}

impl SnapshotFormat {
    /// File extension for slots in this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Binary => "snap",
        }
    }
}

impl std::fmt::Display for SnapshotFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Binary => write!(f, "binary"),
        }
    }
}

impl FromStr for SnapshotFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "binary" | "bincode" | "bin" => Ok(Self::Binary),
            other => Err(ConfigError::UnknownFormat(other.to_string())),
        }
    }
}

/// Summary of one stored slot
#[derive(Debug, Clone)]
pub struct SlotInfo {
    pub slot: String,
    pub header: SnapshotHeader,
    pub path: PathBuf,
}

/// Slot-based document store
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    save_dir: PathBuf,
    format: SnapshotFormat,
    /// Newest layout this store reads
    supported: FormatVersion,
}

impl SnapshotStore {
    /// Create a store rooted at `save_dir`
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
            format: SnapshotFormat::default(),
            supported: FormatVersion::CURRENT,
        }
    }

    /// Set format (builder pattern)
    pub fn with_format(mut self, format: SnapshotFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the supported layout version (builder pattern)
    pub fn with_supported_version(mut self, version: FormatVersion) -> Self {
        self.supported = version;
        self
    }

    pub fn format(&self) -> SnapshotFormat {
        self.format
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Ensure the save directory exists
    pub fn ensure_dir(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.save_dir)?;
        Ok(())
    }

    /// File path for a slot
    pub fn slot_path(&self, slot: &str) -> PathBuf {
        self.save_dir.join(format!("{}.{}", slot, self.format.extension()))
    }

    /// Write a document to a slot, replacing any previous contents
    pub fn save(&self, slot: &str, document: &SceneSnapshot) -> Result<PathBuf, StoreError> {
        self.ensure_dir()?;
        let path = self.slot_path(slot);
        let bytes = self.encode(document)?;
        fs::write(&path, bytes)?;
        log::info!(
            "Saved '{}' ({} entities) to {}",
            document.header.name,
            document.entity_count(),
            path.display()
        );
        Ok(path)
    }

    /// Read a document from a slot
    pub fn load(&self, slot: &str) -> Result<SceneSnapshot, StoreError> {
        let path = self.slot_path(slot);
        if !path.exists() {
            return Err(StoreError::SlotNotFound(slot.to_string()));
        }

        let bytes = fs::read(&path)?;
        let document = self.decode(&bytes)?;

        let found = document.header.format_version;
        if !self.supported.can_read(&found) {
            return Err(StoreError::VersionMismatch {
                found,
                supported: self.supported,
            });
        }

        log::info!("Loaded '{}' from {}", document.header.name, path.display());
        Ok(document)
    }

    /// Delete a slot. Deleting an empty slot is not an error.
    pub fn delete(&self, slot: &str) -> Result<(), StoreError> {
        let path = self.slot_path(slot);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Check if slot exists
    pub fn exists(&self, slot: &str) -> bool {
        self.slot_path(slot).exists()
    }

    /// All readable slots in this store's format, newest first
    pub fn list(&self) -> Result<Vec<SlotInfo>, StoreError> {
        self.ensure_dir()?;

        let mut slots = Vec::new();
        for entry in fs::read_dir(&self.save_dir)? {
            let path = entry?.path();
            if path.extension().map_or(true, |e| e != self.format.extension()) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match self.load(stem) {
                Ok(document) => slots.push(SlotInfo {
                    slot: stem.to_string(),
                    header: document.header,
                    path: path.clone(),
                }),
                Err(e) => log::warn!("Ignoring unreadable slot {}: {}", path.display(), e),
            }
        }

        slots.sort_by(|a, b| {
            b.header
                .timestamp
                .cmp(&a.header.timestamp)
                .then_with(|| a.slot.cmp(&b.slot))
        });
        Ok(slots)
    }

    fn encode(&self, document: &SceneSnapshot) -> Result<Vec<u8>, StoreError> {
        match self.format {
            SnapshotFormat::Json => {
                if let Some(location) = find_non_finite(document) {
                    return Err(StoreError::Serialization(format!(
                        "non-finite float at {} cannot be stored as JSON",
                        location
                    )));
                }
                serde_json::to_vec_pretty(document)
                    .map_err(|e| StoreError::Serialization(e.to_string()))
            }
            SnapshotFormat::Binary => bincode::serialize(document)
                .map_err(|e| StoreError::Serialization(e.to_string())),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<SceneSnapshot, StoreError> {
        match self.format {
            SnapshotFormat::Json => serde_json::from_slice(bytes)
                .map_err(|e| StoreError::Deserialization(e.to_string())),
            SnapshotFormat::Binary => bincode::deserialize(bytes)
                .map_err(|e| StoreError::Deserialization(e.to_string())),
        }
    }
}

/// Location of the first infinite or NaN float in a document
fn find_non_finite(document: &SceneSnapshot) -> Option<String> {
    for (coordinator, states) in &document.coordinators {
        for (index, state) in states.iter().enumerate() {
            let at = format!("'{}'[{}]", coordinator, index);
            if let Some(part) = non_finite_transform(&state.transform) {
                return Some(format!("{} transform {}", at, part));
            }
            for component in &state.components {
                for (name, value) in &component.fields {
                    if !value_is_finite(value) {
                        return Some(format!("{} {}.{}", at, component.component_type, name));
                    }
                }
            }
        }
    }
    None
}

fn non_finite_transform(transform: &TransformSnapshot) -> Option<&'static str> {
    if !transform.relative_position.is_finite() {
        Some("position")
    } else if !transform.relative_rotation.is_finite() {
        Some("rotation")
    } else if !transform.local_scale.is_finite() {
        Some("scale")
    } else {
        None
    }
}

fn value_is_finite(value: &Value) -> bool {
    match value {
        Value::Float(f) => f.is_finite(),
        Value::Vec3(v) => v.iter().all(|c| c.is_finite()),
        Value::Array(items) => items.iter().all(value_is_finite),
        Value::Object(map) => map.values().all(value_is_finite),
        Value::Null | Value::Bool(_) | Value::Int(_) | Value::String(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentSnapshot;
    use crate::entity::GameObjectState;
    use graft_math::Vec3;

    fn document() -> SceneSnapshot {
        SceneSnapshot::new("test").with_coordinator("root", vec![GameObjectState::default()])
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("json".parse::<SnapshotFormat>().unwrap(), SnapshotFormat::Json);
        assert_eq!("Binary".parse::<SnapshotFormat>().unwrap(), SnapshotFormat::Binary);
        assert!("yaml".parse::<SnapshotFormat>().is_err());
        assert_eq!(SnapshotFormat::Binary.to_string(), "binary");
    }

    #[test]
    fn test_save_load_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path()).with_format(SnapshotFormat::Binary);

        assert!(!store.exists("slot"));
        assert!(matches!(store.load("slot"), Err(StoreError::SlotNotFound(_))));

        let doc = document();
        let path = store.save("slot", &doc).unwrap();
        assert!(path.ends_with("slot.snap"));
        assert!(store.exists("slot"));
        assert_eq!(store.load("slot").unwrap(), doc);

        store.delete("slot").unwrap();
        assert!(!store.exists("slot"));
        store.delete("slot").unwrap();
    }

    #[test]
    fn test_newer_version_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        let mut doc = document();
        doc.header.format_version = FormatVersion::new(FormatVersion::CURRENT.major, FormatVersion::CURRENT.minor + 1);
        store.save("future", &doc).unwrap();

        assert!(matches!(
            store.load("future"),
            Err(StoreError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_list_only_matching_format() {
        let dir = tempfile::tempdir().unwrap();
        let json = SnapshotStore::new(dir.path());
        let binary = SnapshotStore::new(dir.path()).with_format(SnapshotFormat::Binary);

        json.save("a", &document()).unwrap();
        json.save("b", &document()).unwrap();
        binary.save("c", &document()).unwrap();

        let mut listed: Vec<_> = json.list().unwrap().into_iter().map(|s| s.slot).collect();
        listed.sort();
        assert_eq!(listed, vec!["a", "b"]);
        assert_eq!(binary.list().unwrap().len(), 1);
    }

    fn unbounded_document() -> SceneSnapshot {
        let state = GameObjectState::default().with_component(
            ComponentSnapshot::new("light")
                .with_field("intensity", 1.0f32)
                .with_field("range", Value::Array(vec![Value::Float(0.0), Value::Float(f64::INFINITY)])),
        );
        SceneSnapshot::new("unbounded").with_coordinator("lights", vec![state])
    }

    #[test]
    fn test_json_rejects_non_finite_field() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        let err = store.save("s", &unbounded_document()).unwrap_err();
        match err {
            StoreError::Serialization(msg) => assert!(msg.contains("light.range"), "{}", msg),
            other => panic!("unexpected error: {}", other),
        }
        assert!(!store.exists("s"));
    }

    #[test]
    fn test_json_rejects_non_finite_transform() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        let mut state = GameObjectState::default();
        state.transform.local_scale = Vec3::new(1.0, f32::NAN, 1.0);
        let doc = SceneSnapshot::new("nan").with_coordinator("root", vec![state]);

        assert!(matches!(store.save("s", &doc), Err(StoreError::Serialization(_))));
        assert!(!store.exists("s"));
    }

    #[test]
    fn test_binary_keeps_non_finite_values() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path()).with_format(SnapshotFormat::Binary);

        let mut doc = unbounded_document();
        if let Some(states) = doc.coordinators.get_mut("lights") {
            states[0].transform.relative_rotation = f32::NEG_INFINITY;
        }
        store.save("s", &doc).unwrap();
        assert_eq!(store.load("s").unwrap(), doc);
    }

    #[test]
    fn test_supported_version_bounds_reads() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotStore::new(dir.path());
        writer.save("slot", &document()).unwrap();

        let current = FormatVersion::CURRENT;
        let newer = SnapshotStore::new(dir.path())
            .with_supported_version(FormatVersion::new(current.major, current.minor + 1));
        assert!(newer.load("slot").is_ok());

        let other_major = SnapshotStore::new(dir.path())
            .with_supported_version(FormatVersion::new(current.major + 1, 0));
        assert!(matches!(
            other_major.load("slot"),
            Err(StoreError::VersionMismatch { .. })
        ));
    }
}
