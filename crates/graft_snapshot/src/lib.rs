//! # graft_snapshot - Sub-tree Snapshots
//!
//! Captures the state of a bounded set of child entities, persists it, and
//! rebuilds equivalent state on a (possibly new) set of entities:
//!
//! - **Capture**: local transform plus filtered behaviour fields, with
//!   reference fields stored as identity tags
//! - **Inject**: snapshots written back by position; behaviours matched by
//!   type tag and created when missing
//! - **Link**: once a whole batch is injected, identity tags resolve back to
//!   live entities
//!
//! ## Example
//!
//! ```ignore
//! use graft_snapshot::prelude::*;
//!
//! let mut set = CoordinatorSet::new();
//! set.add(SnapshotCoordinator::new("shelf"))?
//!     .set_targets(&mut scene, shelf_children)?;
//!
//! let doc = set.capture_all(&scene, &registry, "quicksave")?;
//! store.save("quicksave", &doc)?;
//!
//! let doc = store.load("quicksave")?;
//! set.begin_load(doc)
//!     .inject_all(&mut scene, &registry)?
//!     .link_all(&mut scene, &[level_root])?;
//! ```

pub mod batch;
pub mod component;
pub mod config;
pub mod coordinator;
pub mod document;
pub mod entity;
pub mod error;
pub mod filter;
pub mod linker;
pub mod store;
pub mod transform;

pub use batch::{CoordinatorSet, InjectionPhase, LinkBarrier};
pub use component::ComponentSnapshot;
pub use config::SnapshotConfig;
pub use coordinator::{InjectReport, LinkReport, PendingInjection, SnapshotCoordinator};
pub use document::{SceneSnapshot, SnapshotHeader};
pub use entity::{EntitySnapshot, GameObjectState};
pub use error::{ConfigError, SnapshotError, StoreError};
pub use filter::{CaptureFilter, Verdict, DEFAULT_DENY_LIST};
pub use linker::ReferenceLinker;
pub use store::{SlotInfo, SnapshotFormat, SnapshotStore};
pub use transform::TransformSnapshot;

pub mod prelude {
    pub use crate::batch::CoordinatorSet;
    pub use crate::component::ComponentSnapshot;
    pub use crate::config::SnapshotConfig;
    pub use crate::coordinator::SnapshotCoordinator;
    pub use crate::document::SceneSnapshot;
    pub use crate::entity::GameObjectState;
    pub use crate::error::SnapshotError;
    pub use crate::filter::CaptureFilter;
    pub use crate::linker::ReferenceLinker;
    pub use crate::store::{SnapshotFormat, SnapshotStore};
    pub use crate::transform::TransformSnapshot;
}
