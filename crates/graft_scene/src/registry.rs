//! Behaviour registry
//!
//! Maps a persisted type tag to everything needed to rebuild an instance:
//! a factory producing the default state, the field schema, and the
//! type-level skip flag.

use std::collections::BTreeMap;
use std::fmt;

use graft_core::{RegistryError, TypeInfo, TypeSchema, TypeTag};

use crate::behaviour::{Behaviour, BehaviourType};
use crate::identity::{PersistOptOut, SerialisableIdentity};

type Factory = fn() -> Box<dyn Behaviour>;

fn construct<T: BehaviourType>() -> Box<dyn Behaviour> {
    Box::new(T::default())
}

struct Registration {
    info: TypeInfo,
    factory: Factory,
}

/// Registry of behaviour types keyed by tag
#[derive(Default)]
pub struct BehaviourRegistry {
    types: BTreeMap<TypeTag, Registration>,
}

impl BehaviourRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the identity behaviours every scene needs
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert::<SerialisableIdentity>();
        registry.insert::<PersistOptOut>();
        registry
    }

    fn insert<T: BehaviourType>(&mut self) {
        let info = TypeInfo::of::<T>(T::tag(), T::schema())
            .skipping_serialisation(T::SKIP_SERIALISATION);
        self.types.insert(
            T::tag(),
            Registration {
                info,
                factory: construct::<T>,
            },
        );
    }

    /// Register a behaviour type. Tags must be unique.
    pub fn register<T: BehaviourType>(&mut self) -> Result<&mut Self, RegistryError> {
        if self.types.contains_key(T::TAG) {
            return Err(RegistryError::AlreadyRegistered(T::TAG.into()));
        }
        self.insert::<T>();
        log::debug!("Registered behaviour '{}'", T::TAG);
        Ok(self)
    }

    /// Create a default instance of the tagged type
    pub fn create(&self, tag: &str) -> Result<Box<dyn Behaviour>, RegistryError> {
        self.types
            .get(tag)
            .map(|r| (r.factory)())
            .ok_or_else(|| RegistryError::NotRegistered(tag.into()))
    }

    /// Type information for a tag
    pub fn info(&self, tag: &str) -> Option<&TypeInfo> {
        self.types.get(tag).map(|r| &r.info)
    }

    /// Field schema for a tag
    pub fn schema(&self, tag: &str) -> Option<&TypeSchema> {
        self.info(tag).map(|i| &i.schema)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.types.contains_key(tag)
    }

    /// Whether the type is registered with the skip flag
    pub fn is_skipped(&self, tag: &str) -> bool {
        self.info(tag).map_or(false, |i| i.skip_serialisation)
    }

    /// All registered tags in order
    pub fn tags(&self) -> impl Iterator<Item = &TypeTag> {
        self.types.keys()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl fmt::Debug for BehaviourRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviourRegistry")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::impl_behaviour;

    #[derive(Default)]
    struct Lamp {
        lit: bool,
        target: Option<Entity>,
    }

    impl_behaviour!(Lamp => "lamp" {
        data: [lit],
        references: [target],
    });

    #[test]
    fn test_builtins_present() {
        let registry = BehaviourRegistry::with_builtins();
        assert!(registry.contains(SerialisableIdentity::TAG));
        assert!(registry.contains(PersistOptOut::TAG));
        assert!(registry.is_skipped(PersistOptOut::TAG));
        assert!(!registry.is_skipped(SerialisableIdentity::TAG));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_register_and_create() {
        let mut registry = BehaviourRegistry::new();
        registry.register::<Lamp>().unwrap();

        let lamp = registry.create("lamp").unwrap();
        assert!(lamp.is::<Lamp>());
        assert!(!lamp.downcast_ref::<Lamp>().unwrap().lit);

        let schema = registry.schema("lamp").unwrap();
        assert_eq!(schema.reference_fields().collect::<Vec<_>>(), vec!["target"]);
        assert_eq!(registry.tags().map(TypeTag::as_str).collect::<Vec<_>>(), vec!["lamp"]);
    }

    #[test]
    fn test_duplicate_and_missing() {
        let mut registry = BehaviourRegistry::new();
        registry.register::<Lamp>().unwrap();

        assert_eq!(
            registry.register::<Lamp>().err(),
            Some(RegistryError::AlreadyRegistered("lamp".into()))
        );
        assert_eq!(
            registry.create("ghost").err(),
            Some(RegistryError::NotRegistered("ghost".into()))
        );
        assert!(!registry.is_skipped("ghost"));
    }
}
