//! Capture filter
//!
//! Decides which behaviours on a target entity are captured. A behaviour is
//! left out when its tag is on the deny-list, when its type is registered
//! with the skip flag, or when the registry does not know the type at all.

use std::collections::BTreeSet;

use graft_core::TypeTag;
use graft_scene::BehaviourRegistry;

/// Behaviour types that are never captured unless the deny-list is replaced
pub const DEFAULT_DENY_LIST: &[&str] = &["audio_time_scale", "context_menu_option", "decal_controller"];

/// Outcome of filtering one behaviour
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Capture,
    /// Exact tag is on the deny-list
    Denied,
    /// Type is registered with the skip flag
    Skipped,
    /// Type is unknown to the registry
    Unregistered,
}

/// Deny-list plus registry-driven skip rules
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureFilter {
    deny: BTreeSet<TypeTag>,
}

impl CaptureFilter {
    /// Filter with an explicit deny-list
    pub fn new<I, T>(deny: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeTag>,
    {
        Self {
            deny: deny.into_iter().map(Into::into).collect(),
        }
    }

    /// Filter that denies nothing
    pub fn allow_all() -> Self {
        Self { deny: BTreeSet::new() }
    }

    /// Add a tag to the deny-list
    pub fn deny(mut self, tag: impl Into<TypeTag>) -> Self {
        self.deny.insert(tag.into());
        self
    }

    pub fn is_denied(&self, tag: &str) -> bool {
        self.deny.contains(tag)
    }

    /// Denied tags in order
    pub fn denied(&self) -> impl Iterator<Item = &TypeTag> {
        self.deny.iter()
    }

    /// Classify a behaviour by its tag
    pub fn verdict(&self, registry: &BehaviourRegistry, tag: &str) -> Verdict {
        if self.is_denied(tag) {
            Verdict::Denied
        } else if !registry.contains(tag) {
            Verdict::Unregistered
        } else if registry.is_skipped(tag) {
            Verdict::Skipped
        } else {
            Verdict::Capture
        }
    }
}

impl Default for CaptureFilter {
    fn default() -> Self {
        Self::new(DEFAULT_DENY_LIST.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_scene::{BehaviourType, PersistOptOut, SerialisableIdentity};

    #[test]
    fn test_default_deny_list() {
        let filter = CaptureFilter::default();
        assert!(filter.is_denied("audio_time_scale"));
        assert!(filter.is_denied("context_menu_option"));
        assert!(filter.is_denied("decal_controller"));
        assert!(!filter.is_denied("decal"));
        assert_eq!(filter.denied().count(), 3);
    }

    #[test]
    fn test_verdicts() {
        let registry = BehaviourRegistry::with_builtins();
        let filter = CaptureFilter::allow_all().deny(SerialisableIdentity::TAG);

        assert_eq!(filter.verdict(&registry, SerialisableIdentity::TAG), Verdict::Denied);
        assert_eq!(filter.verdict(&registry, PersistOptOut::TAG), Verdict::Skipped);
        assert_eq!(filter.verdict(&registry, "ghost"), Verdict::Unregistered);
        assert_eq!(
            CaptureFilter::allow_all().verdict(&registry, SerialisableIdentity::TAG),
            Verdict::Capture
        );
    }
}
