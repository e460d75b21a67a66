//! # graft_core - Graft Core
//!
//! Shared primitives for the sub-tree snapshot workspace:
//! - **Errors**: focused error enums for the registry, field access and
//!   handles
//! - **Identity**: regenerable identity tags used to address entities
//!   across a deserialization batch
//! - **Type information**: stable type tags and field schemas that replace
//!   runtime reflection
//! - **Versioning**: format versions for persisted snapshot documents

pub mod error;
pub mod id;
pub mod type_info;
pub mod version;

pub use error::*;
pub use id::*;
pub use type_info::*;
pub use version::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{FieldError, HandleError, RegistryError};
    pub use crate::id::IdentityTag;
    pub use crate::type_info::{FieldInfo, FieldKind, TypeInfo, TypeSchema, TypeTag};
    pub use crate::version::FormatVersion;
}
