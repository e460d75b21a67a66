//! Behaviours - Typed components attached to entities
//!
//! An entity carries an ordered list of behaviours, and several behaviours of
//! the same type may sit on one entity. Instead of runtime reflection, every
//! behaviour type exposes its serialisable fields by name through the
//! [`Behaviour`] trait, normally generated with [`impl_behaviour!`].
//!
//! Data fields travel as [`Value`](crate::Value). Reference fields hold an
//! `Option<Entity>` pointing at another entity of the same scene.

use core::any::Any;

use graft_core::{FieldError, TypeSchema, TypeTag};

use crate::entity::Entity;
use crate::value::Value;

/// Object-safe access to a live behaviour instance
pub trait Behaviour: Any + Send + Sync {
    /// Persisted type tag of this instance
    fn type_tag(&self) -> TypeTag;

    /// Read a data field, `None` if the type has no such data field
    fn read_field(&self, field: &str) -> Option<Value>;

    /// Write a data field from a dynamic value
    fn write_field(&mut self, field: &str, value: &Value) -> Result<(), FieldError>;

    /// Read a reference field, `None` if the type has no such reference field
    fn read_reference(&self, field: &str) -> Option<Option<Entity>>;

    /// Point a reference field at an entity, or clear it
    fn write_reference(&mut self, field: &str, target: Option<Entity>) -> Result<(), FieldError>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<'a> dyn Behaviour + 'a {
    /// Try to downcast to a concrete type
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Try to downcast mutably to a concrete type
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Check the concrete type
    pub fn is<T: 'static>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// Static description of a behaviour type, required for registration
pub trait BehaviourType: Behaviour + Default {
    /// Persisted type tag
    const TAG: &'static str;

    /// Instances of this type are never captured
    const SKIP_SERIALISATION: bool = false;

    /// Serialisable fields in declaration order
    fn schema() -> TypeSchema;

    fn tag() -> TypeTag {
        TypeTag::from_static(Self::TAG)
    }
}

/// Implement [`Behaviour`] and [`BehaviourType`] for a struct
///
/// Data fields must implement [`FieldValue`](crate::FieldValue); reference
/// fields must be `Option<Entity>`. The struct must implement `Default`.
///
/// ```ignore
/// #[derive(Default)]
/// struct Door { open: bool, linked: Option<Entity> }
///
/// impl_behaviour!(Door => "door" {
///     data: [open],
///     references: [linked],
/// });
/// ```
///
/// `skip_serialisation = true` after the tag marks the type as never
/// captured.
#[macro_export]
macro_rules! impl_behaviour {
    (
        $ty:ty => $tag:literal $(, skip_serialisation = $skip:literal)? {
            data: [$($data:ident),* $(,)?],
            references: [$($reference:ident),* $(,)?] $(,)?
        }
    ) => {
        impl $crate::Behaviour for $ty {
            fn type_tag(&self) -> $crate::TypeTag {
                $crate::TypeTag::from_static($tag)
            }

            #[allow(unused_variables)]
            fn read_field(&self, field: &str) -> ::core::option::Option<$crate::Value> {
                $(
                    if field == stringify!($data) {
                        return ::core::option::Option::Some($crate::FieldValue::to_value(&self.$data));
                    }
                )*
                ::core::option::Option::None
            }

            #[allow(unused_variables)]
            fn write_field(
                &mut self,
                field: &str,
                value: &$crate::Value,
            ) -> ::core::result::Result<(), $crate::FieldError> {
                $(
                    if field == stringify!($data) {
                        return match $crate::FieldValue::from_value(value) {
                            ::core::option::Option::Some(v) => {
                                self.$data = v;
                                ::core::result::Result::Ok(())
                            }
                            ::core::option::Option::None => ::core::result::Result::Err(
                                $crate::FieldError::mismatch($tag, field, value),
                            ),
                        };
                    }
                )*
                ::core::result::Result::Err($crate::FieldError::unknown($tag, field))
            }

            #[allow(unused_variables)]
            fn read_reference(
                &self,
                field: &str,
            ) -> ::core::option::Option<::core::option::Option<$crate::Entity>> {
                $(
                    if field == stringify!($reference) {
                        return ::core::option::Option::Some(self.$reference);
                    }
                )*
                ::core::option::Option::None
            }

            #[allow(unused_variables)]
            fn write_reference(
                &mut self,
                field: &str,
                target: ::core::option::Option<$crate::Entity>,
            ) -> ::core::result::Result<(), $crate::FieldError> {
                $(
                    if field == stringify!($reference) {
                        self.$reference = target;
                        return ::core::result::Result::Ok(());
                    }
                )*
                ::core::result::Result::Err($crate::FieldError::unknown_reference($tag, field))
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }
        }

        impl $crate::BehaviourType for $ty {
            const TAG: &'static str = $tag;
            const SKIP_SERIALISATION: bool = false $(|| $skip)?;

            fn schema() -> $crate::TypeSchema {
                $crate::TypeSchema::new()
                    $(.data(stringify!($data)))*
                    $(.reference(stringify!($reference)))*
            }
        }
    };
}
