//! Type tags and field schemas
//!
//! Runtime type identity is expressed through a stable string tag instead of
//! reflection. Each registered type also carries a schema listing its
//! serialisable fields, split into plain data fields and reference fields
//! that point at other entities.

use core::any::TypeId;
use core::fmt;
use std::borrow::{Borrow, Cow};

use serde::{Deserialize, Serialize};

/// Stable, persistable name of a behaviour type
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTag(Cow<'static, str>);

impl TypeTag {
    /// Create from a static string (no allocation)
    #[inline]
    pub const fn from_static(tag: &'static str) -> Self {
        Self(Cow::Borrowed(tag))
    }

    /// Create from an owned string
    pub fn new(tag: impl Into<String>) -> Self {
        Self(Cow::Owned(tag.into()))
    }

    /// Get the tag as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({:?})", self.as_str())
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&'static str> for TypeTag {
    fn from(tag: &'static str) -> Self {
        Self::from_static(tag)
    }
}

impl From<String> for TypeTag {
    fn from(tag: String) -> Self {
        Self::new(tag)
    }
}

impl Borrow<str> for TypeTag {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for TypeTag {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for TypeTag {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// How a field is carried through a snapshot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Value copied directly
    Data,
    /// Handle to another entity, persisted as that entity's identity tag and
    /// resolved after the whole batch is rebuilt
    Reference,
}

/// Information about a single serialisable field
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// Ordered list of the serialisable fields of a type
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeSchema {
    fields: Vec<FieldInfo>,
}

impl TypeSchema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a data field
    pub fn data(mut self, name: &'static str) -> Self {
        self.fields.push(FieldInfo { name, kind: FieldKind::Data });
        self
    }

    /// Append a reference field
    pub fn reference(mut self, name: &'static str) -> Self {
        self.fields.push(FieldInfo { name, kind: FieldKind::Reference });
        self
    }

    /// All fields in declaration order
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of data fields in declaration order
    pub fn data_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|f| f.kind == FieldKind::Data)
            .map(|f| f.name)
    }

    /// Names of reference fields in declaration order
    pub fn reference_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|f| f.kind == FieldKind::Reference)
            .map(|f| f.name)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the schema has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Information about a registered type
#[derive(Clone)]
pub struct TypeInfo {
    /// Persisted type tag
    pub tag: TypeTag,
    /// Rust type name for diagnostics
    pub rust_name: &'static str,
    /// The Rust TypeId
    pub type_id: TypeId,
    /// Serialisable fields
    pub schema: TypeSchema,
    /// Type-level opt-out: instances are never captured
    pub skip_serialisation: bool,
}

impl TypeInfo {
    /// Create type info for a concrete type
    pub fn of<T: 'static>(tag: TypeTag, schema: TypeSchema) -> Self {
        Self {
            tag,
            rust_name: core::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
            schema,
            skip_serialisation: false,
        }
    }

    /// Mark the type as never serialised
    pub fn skipping_serialisation(mut self, skip: bool) -> Self {
        self.skip_serialisation = skip;
        self
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("tag", &self.tag)
            .field("rust_name", &self.rust_name)
            .field("fields", &self.schema.len())
            .field("skip_serialisation", &self.skip_serialisation)
            .finish()
    }
}
