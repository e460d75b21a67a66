//! Reference linker
//!
//! Reference fields are persisted as identity tags. After a whole batch has
//! been injected, the linker scans the batch for identity behaviours and
//! maps every tag back to a live entity.
//!
//! Scanning covers each batch root together with all of its descendants, so
//! references may cross coordinator boundaries freely.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use graft_core::IdentityTag;
use graft_scene::{Behaviour, Entity, SceneHost, SerialisableIdentity};

use crate::component::ComponentSnapshot;
use crate::coordinator::LinkReport;

/// Identity pool for one deserialized batch
#[derive(Clone, Debug, Default)]
pub struct ReferenceLinker {
    pool: BTreeMap<IdentityTag, Entity>,
    duplicates: usize,
}

impl ReferenceLinker {
    /// Build the pool from every batch root and its descendants.
    ///
    /// If two entities carry the same tag, the first one in scan order wins.
    pub fn scan<H: SceneHost>(host: &H, batch: &[Entity]) -> Self {
        let mut linker = Self::default();

        for &root in batch {
            if !host.contains(root) {
                log::warn!("Batch root {} is not alive, skipping", root);
                continue;
            }
            for entity in std::iter::once(root).chain(host.descendants(root)) {
                linker.collect(host, entity);
            }
        }

        log::debug!(
            "Identity pool holds {} tags ({} duplicates ignored)",
            linker.pool.len(),
            linker.duplicates
        );
        linker
    }

    fn collect<H: SceneHost>(&mut self, host: &H, entity: Entity) {
        for id in host.behaviour_ids(entity) {
            let Some(identity) = host
                .behaviour(entity, id)
                .and_then(|b| b.downcast_ref::<SerialisableIdentity>())
            else {
                continue;
            };

            match self.pool.entry(identity.tag) {
                Entry::Occupied(first) => {
                    self.duplicates += 1;
                    log::warn!(
                        "Identity {} on {} already claimed by {}, ignoring",
                        identity.tag,
                        entity,
                        first.get()
                    );
                }
                Entry::Vacant(slot) => {
                    slot.insert(entity);
                }
            }
        }
    }

    /// Live entity carrying `tag`
    pub fn resolve(&self, tag: Option<IdentityTag>) -> Option<Entity> {
        tag.and_then(|t| self.pool.get(&t).copied())
    }

    /// Number of distinct tags in the pool
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Tags seen more than once while scanning
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Assign every reference field of `snapshot` on the live behaviour.
    /// Targets missing from the pool become `None`.
    pub fn link_component(&self, snapshot: &ComponentSnapshot, behaviour: &mut dyn Behaviour) -> LinkReport {
        let mut report = LinkReport::default();
        for (field, tag) in &snapshot.references {
            let target = self.resolve(*tag);
            match behaviour.write_reference(field, target) {
                Ok(()) if target.is_some() => report.resolved += 1,
                Ok(()) => {
                    if tag.is_some() {
                        log::debug!("Reference '{}.{}' target not in batch", snapshot.component_type, field);
                    }
                    report.unresolved += 1;
                }
                Err(e) => log::warn!("Skipping reference while linking: {}", e),
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_scene::{impl_behaviour, Scene};

    #[derive(Debug, Default)]
    struct Wire {
        from: Option<Entity>,
        to: Option<Entity>,
    }

    impl_behaviour!(Wire => "wire" {
        data: [],
        references: [from, to],
    });

    fn tagged(scene: &mut Scene, parent: Entity, name: &str, tag: u128) -> Entity {
        let e = scene.spawn_child(parent, name).unwrap();
        scene
            .add(e, SerialisableIdentity::new(IdentityTag::from_u128(tag)))
            .unwrap();
        e
    }

    #[test]
    fn test_scan_includes_roots_and_descendants() {
        let mut scene = Scene::new();
        let root = scene.spawn("root");
        scene
            .add(root, SerialisableIdentity::new(IdentityTag::from_u128(1)))
            .unwrap();
        let a = tagged(&mut scene, root, "a", 2);
        let a1 = tagged(&mut scene, a, "a1", 3);
        let outside = scene.spawn("outside");
        scene
            .add(outside, SerialisableIdentity::new(IdentityTag::from_u128(4)))
            .unwrap();

        let linker = ReferenceLinker::scan(&scene, &[root]);
        assert_eq!(linker.len(), 3);
        assert_eq!(linker.resolve(Some(IdentityTag::from_u128(1))), Some(root));
        assert_eq!(linker.resolve(Some(IdentityTag::from_u128(3))), Some(a1));
        assert_eq!(linker.resolve(Some(IdentityTag::from_u128(4))), None);
        assert_eq!(linker.resolve(None), None);
    }

    #[test]
    fn test_duplicate_tag_first_wins() {
        let mut scene = Scene::new();
        let root = scene.spawn("root");
        let first = tagged(&mut scene, root, "first", 7);
        let _second = tagged(&mut scene, root, "second", 7);

        let linker = ReferenceLinker::scan(&scene, &[root]);
        assert_eq!(linker.len(), 1);
        assert_eq!(linker.duplicates(), 1);
        assert_eq!(linker.resolve(Some(IdentityTag::from_u128(7))), Some(first));
    }

    #[test]
    fn test_link_component_assigns_or_clears() {
        let mut scene = Scene::new();
        let root = scene.spawn("root");
        let target = tagged(&mut scene, root, "target", 5);
        let linker = ReferenceLinker::scan(&scene, &[root]);

        let snapshot = ComponentSnapshot::new("wire")
            .with_reference("from", Some(IdentityTag::from_u128(5)))
            .with_reference("to", Some(IdentityTag::from_u128(99)));
        let mut wire = Wire {
            from: None,
            to: Some(root),
        };

        let report = linker.link_component(&snapshot, &mut wire);
        assert_eq!(report, LinkReport { resolved: 1, unresolved: 1 });
        assert_eq!(wire.from, Some(target));
        assert_eq!(wire.to, None);
    }
}
