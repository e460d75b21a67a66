//! # graft_scene - Scene Collaborator
//!
//! The scene side of the snapshot pipeline:
//! - Generational entity handles
//! - Behaviours with named fields and the [`impl_behaviour!`] macro
//! - A registry mapping type tags to factories, schemas and skip flags
//! - Identity behaviours used to address entities across a load batch
//! - The [`SceneHost`] seam and the in-memory [`Scene`]
//!
//! ## Example
//!
//! ```ignore
//! use graft_scene::prelude::*;
//!
//! #[derive(Default)]
//! struct Door { open: bool, linked: Option<Entity> }
//!
//! impl_behaviour!(Door => "door" {
//!     data: [open],
//!     references: [linked],
//! });
//!
//! let mut registry = BehaviourRegistry::with_builtins();
//! registry.register::<Door>()?;
//!
//! let mut scene = Scene::new();
//! let root = scene.spawn("level");
//! let door = scene.spawn_child(root, "door")?;
//! scene.add(door, Door::default())?;
//! ```

pub mod behaviour;
pub mod entity;
pub mod hierarchy;
pub mod host;
pub mod identity;
pub mod registry;
pub mod scene;
pub mod value;

pub use behaviour::{Behaviour, BehaviourType};
pub use entity::{Entity, EntityAllocator};
pub use hierarchy::HierarchyError;
pub use host::SceneHost;
pub use identity::{PersistOptOut, SerialisableIdentity};
pub use registry::BehaviourRegistry;
pub use scene::{BehaviourId, Scene};
pub use value::{FieldValue, Value};

// Used by `impl_behaviour!` expansions
pub use graft_core::{FieldError, TypeSchema, TypeTag};

pub mod prelude {
    pub use crate::behaviour::{Behaviour, BehaviourType};
    pub use crate::entity::Entity;
    pub use crate::hierarchy::HierarchyError;
    pub use crate::host::SceneHost;
    pub use crate::identity::{PersistOptOut, SerialisableIdentity};
    pub use crate::impl_behaviour;
    pub use crate::registry::BehaviourRegistry;
    pub use crate::scene::{BehaviourId, Scene};
    pub use crate::value::{FieldValue, Value};
    pub use graft_core::IdentityTag;
    pub use graft_math::{Transform, Vec3};
}
