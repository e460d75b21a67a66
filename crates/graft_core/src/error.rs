//! Error types for the core library
//!
//! Each concern has its own enum. Higher layers wrap them in their own
//! error types.

use std::fmt;

/// Behaviour registry errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No type registered under this tag
    NotRegistered(Box<str>),
    /// Tag already claimed by a different Rust type
    AlreadyRegistered(Box<str>),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::NotRegistered(tag) => write!(f, "Type not registered: {}", tag),
            RegistryError::AlreadyRegistered(tag) => {
                write!(f, "Type tag already registered by another type: {}", tag)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Field access errors raised by generated behaviour accessors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The type has no data field with this name
    UnknownField { type_tag: Box<str>, field: Box<str> },
    /// The type has no reference field with this name
    UnknownReference { type_tag: Box<str>, field: Box<str> },
    /// The stored value cannot be converted into the field's type
    ValueMismatch { type_tag: Box<str>, field: Box<str>, found: Box<str> },
}

impl FieldError {
    /// Unknown data field
    pub fn unknown(type_tag: &str, field: &str) -> Self {
        FieldError::UnknownField {
            type_tag: type_tag.into(),
            field: field.into(),
        }
    }

    /// Unknown reference field
    pub fn unknown_reference(type_tag: &str, field: &str) -> Self {
        FieldError::UnknownReference {
            type_tag: type_tag.into(),
            field: field.into(),
        }
    }

    /// Value of the wrong shape for a field
    pub fn mismatch(type_tag: &str, field: &str, found: impl fmt::Debug) -> Self {
        FieldError::ValueMismatch {
            type_tag: type_tag.into(),
            field: field.into(),
            found: format!("{:?}", found).into_boxed_str(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::UnknownField { type_tag, field } => {
                write!(f, "'{}' has no data field '{}'", type_tag, field)
            }
            FieldError::UnknownReference { type_tag, field } => {
                write!(f, "'{}' has no reference field '{}'", type_tag, field)
            }
            FieldError::ValueMismatch { type_tag, field, found } => {
                write!(f, "'{}.{}' cannot hold value {}", type_tag, field, found)
            }
        }
    }
}

impl std::error::Error for FieldError {}

/// Handle errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    /// Handle is null
    Null,
    /// Entity handle is stale (generation mismatch or despawned)
    Stale,
    /// Behaviour is no longer attached to the entity
    MissingBehaviour,
}

impl fmt::Display for HandleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleError::Null => write!(f, "Handle is null"),
            HandleError::Stale => write!(f, "Handle is stale (entity despawned)"),
            HandleError::MissingBehaviour => write!(f, "Behaviour is not attached to the entity"),
        }
    }
}

impl std::error::Error for HandleError {}
