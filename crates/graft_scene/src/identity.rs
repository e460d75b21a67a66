//! Identity behaviours
//!
//! [`SerialisableIdentity`] gives an entity a tag other entities' reference
//! fields can be persisted as. It is an ordinary serialised behaviour, so the
//! tag survives capture and restore unchanged and only moves when an owner
//! explicitly regenerates it.
//!
//! [`PersistOptOut`] marks an entity whose state is persisted by someone
//! else. It is never captured itself.

use graft_core::IdentityTag;

use crate::impl_behaviour;

/// Persistent identity of an entity
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SerialisableIdentity {
    pub tag: IdentityTag,
}

impl SerialisableIdentity {
    pub fn new(tag: IdentityTag) -> Self {
        Self { tag }
    }

    /// Replace the tag with a fresh one
    pub fn regenerate(&mut self) {
        self.tag.regenerate();
    }
}

impl_behaviour!(SerialisableIdentity => "serialisable_identity" {
    data: [tag],
    references: [],
});

/// Marker: a generic persistence pass must leave this entity alone
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PersistOptOut;

impl_behaviour!(PersistOptOut => "persist_opt_out", skip_serialisation = true {
    data: [],
    references: [],
});
