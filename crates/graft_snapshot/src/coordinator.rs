//! Snapshot coordinator
//!
//! Owns a fixed, ordered list of target entities and moves their state
//! through three phases:
//!
//! 1. **Capture**: read each target's local transform and filtered
//!    behaviours into an [`EntitySnapshot`].
//! 2. **Inject**: write a snapshot sequence back onto the targets, pairing
//!    snapshots and targets by position. Behaviours are matched by type tag,
//!    first unconsumed match wins, and missing ones are created from the
//!    registry. Reference fields are only recorded.
//! 3. **Link**: once the whole batch has been injected, resolve the recorded
//!    reference fields through a [`ReferenceLinker`].
//!
//! The snapshot slot is single use: injecting empties it. The pending list
//! exists only between inject and link.

use graft_core::HandleError;
use graft_scene::{
    BehaviourId, BehaviourRegistry, BehaviourType, Entity, PersistOptOut, SceneHost,
    SerialisableIdentity,
};

use crate::component::ComponentSnapshot;
use crate::entity::EntitySnapshot;
use crate::error::SnapshotError;
use crate::filter::{CaptureFilter, Verdict};
use crate::linker::ReferenceLinker;
use crate::transform::TransformSnapshot;

/// A component snapshot waiting for its references to be linked, paired
/// with the live behaviour it was injected into
#[derive(Clone, Debug, PartialEq)]
pub struct PendingInjection {
    pub snapshot: ComponentSnapshot,
    pub entity: Entity,
    pub behaviour: BehaviourId,
}

/// Counters from one injection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InjectReport {
    /// Targets written
    pub entities: usize,
    /// Component snapshots that reused an existing behaviour
    pub matched: usize,
    /// Component snapshots that needed a new behaviour
    pub created: usize,
    /// Data fields that could not be written
    pub skipped_fields: usize,
}

impl InjectReport {
    pub(crate) fn merge(&mut self, other: InjectReport) {
        self.entities += other.entities;
        self.matched += other.matched;
        self.created += other.created;
        self.skipped_fields += other.skipped_fields;
    }
}

/// Counters from one linking pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// Reference fields pointed at a live entity
    pub resolved: usize,
    /// Reference fields cleared because the target was absent
    pub unresolved: usize,
}

impl LinkReport {
    pub(crate) fn merge(&mut self, other: LinkReport) {
        self.resolved += other.resolved;
        self.unresolved += other.unresolved;
    }
}

/// Captures and restores the state of an ordered list of child entities
#[derive(Debug)]
pub struct SnapshotCoordinator {
    name: String,
    targets: Vec<Entity>,
    filter: CaptureFilter,
    snapshots: Option<Vec<EntitySnapshot>>,
    pending: Option<Vec<PendingInjection>>,
    awaiting_tick_end: bool,
}

impl SnapshotCoordinator {
    /// Create a coordinator with the default capture filter
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            targets: Vec::new(),
            filter: CaptureFilter::default(),
            snapshots: None,
            pending: None,
            awaiting_tick_end: false,
        }
    }

    /// Replace the capture filter (builder pattern)
    pub fn with_filter(mut self, filter: CaptureFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filter(&self) -> &CaptureFilter {
        &self.filter
    }

    // --- Targets and identity lifecycle ---

    /// Fix the ordered target list. Each target gets a [`PersistOptOut`]
    /// marker so a generic persistence pass leaves it to this coordinator.
    pub fn set_targets<H: SceneHost>(&mut self, host: &mut H, targets: Vec<Entity>) -> Result<(), SnapshotError> {
        for &entity in &targets {
            self.ensure_alive(&*host, entity)?;
            host.get_or_attach::<PersistOptOut>(entity)?;
        }
        log::debug!("Coordinator '{}' targets {} entities", self.name, targets.len());
        self.targets = targets;
        Ok(())
    }

    pub fn targets(&self) -> &[Entity] {
        &self.targets
    }

    /// Give every target a fresh identity tag, attaching the identity
    /// behaviour where missing. Opt-out markers stay until
    /// [`on_tick_end`](Self::on_tick_end).
    pub fn adopt<H: SceneHost>(&mut self, host: &mut H) -> Result<(), SnapshotError> {
        for &entity in &self.targets {
            self.ensure_alive(&*host, entity)?;
            let id = host.get_or_attach::<SerialisableIdentity>(entity)?;
            let identity = host
                .behaviour_mut(entity, id)
                .and_then(|b| b.downcast_mut::<SerialisableIdentity>())
                .ok_or(HandleError::MissingBehaviour)?;
            identity.regenerate();
            log::debug!("Adopted {} as {}", entity, identity.tag);
        }
        self.awaiting_tick_end = true;
        Ok(())
    }

    /// Whether adoption is waiting for the end of the tick
    pub fn is_awaiting_tick_end(&self) -> bool {
        self.awaiting_tick_end
    }

    /// Finish adoption: remove the opt-out markers from live targets
    pub fn on_tick_end<H: SceneHost>(&mut self, host: &mut H) -> Result<(), SnapshotError> {
        if !self.awaiting_tick_end {
            return Ok(());
        }
        for &entity in &self.targets {
            if !host.contains(entity) {
                continue;
            }
            while let Some(id) = host.find_behaviour(entity, PersistOptOut::TAG) {
                host.detach(entity, id)?;
            }
        }
        self.awaiting_tick_end = false;
        log::debug!("Coordinator '{}' finished adoption", self.name);
        Ok(())
    }

    // --- Snapshot slot ---

    /// Current snapshots, `None` when not captured or already injected
    pub fn snapshots(&self) -> Option<&[EntitySnapshot]> {
        self.snapshots.as_deref()
    }

    /// Fill the snapshot slot, typically with freshly deserialized data
    pub fn set_snapshots(&mut self, snapshots: Vec<EntitySnapshot>) {
        self.snapshots = Some(snapshots);
    }

    /// Empty the snapshot slot, returning its contents
    pub fn take_snapshots(&mut self) -> Option<Vec<EntitySnapshot>> {
        self.snapshots.take()
    }

    /// Pending injections awaiting a link, `None` outside that window
    pub fn pending(&self) -> Option<&[PendingInjection]> {
        self.pending.as_deref()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    // --- Capture ---

    /// Capture every target in list order into the snapshot slot.
    ///
    /// Live entities are not modified, so capturing twice yields the same
    /// snapshots.
    pub fn capture<H: SceneHost>(&mut self, host: &H, registry: &BehaviourRegistry) -> Result<&[EntitySnapshot], SnapshotError> {
        let mut snapshots = Vec::with_capacity(self.targets.len());
        for &entity in &self.targets {
            snapshots.push(self.capture_entity(host, registry, entity)?);
        }
        log::debug!("Coordinator '{}' captured {} entities", self.name, snapshots.len());
        let snapshots = self.snapshots.insert(snapshots);
        Ok(snapshots.as_slice())
    }

    fn capture_entity<H: SceneHost>(
        &self,
        host: &H,
        registry: &BehaviourRegistry,
        entity: Entity,
    ) -> Result<EntitySnapshot, SnapshotError> {
        self.ensure_alive(host, entity)?;
        let transform = TransformSnapshot::capture(&host.local_transform(entity)?);
        let mut state = EntitySnapshot::new(transform);

        for id in host.behaviour_ids(entity) {
            let behaviour = host.behaviour(entity, id).ok_or(HandleError::MissingBehaviour)?;
            let tag = behaviour.type_tag();
            match self.filter.verdict(registry, tag.as_str()) {
                Verdict::Capture => {}
                Verdict::Unregistered => {
                    log::debug!("Not capturing unregistered behaviour '{}' on {}", tag, entity);
                    continue;
                }
                Verdict::Denied | Verdict::Skipped => continue,
            }
            if let Some(schema) = registry.schema(tag.as_str()) {
                state
                    .components
                    .push(ComponentSnapshot::capture(host, behaviour, schema));
            }
        }
        Ok(state)
    }

    // --- Inject ---

    /// Write the snapshot slot onto the targets, emptying the slot.
    ///
    /// Pairs snapshots and targets by position up to the shorter list.
    /// Reference fields are recorded in the pending list for
    /// [`link`](Self::link), replacing any list left unlinked by an earlier
    /// injection. An unregistered type or a dead target aborts the injection
    /// without rolling back targets already written.
    pub fn inject<H: SceneHost>(&mut self, host: &mut H, registry: &BehaviourRegistry) -> Result<InjectReport, SnapshotError> {
        let snapshots = self.snapshots.take().ok_or_else(|| SnapshotError::NothingToInject {
            coordinator: self.name.clone(),
        })?;
        if self.pending.take().is_some() {
            log::warn!("Coordinator '{}' dropping unlinked injections", self.name);
        }

        if snapshots.len() != self.targets.len() {
            log::debug!(
                "Coordinator '{}': {} snapshots for {} targets, injecting the first {}",
                self.name,
                snapshots.len(),
                self.targets.len(),
                snapshots.len().min(self.targets.len())
            );
        }

        let mut report = InjectReport::default();
        let mut pending = Vec::new();
        for (state, &entity) in snapshots.into_iter().zip(&self.targets) {
            self.inject_entity(host, registry, entity, state, &mut pending, &mut report)?;
        }

        log::debug!(
            "Coordinator '{}' injected {} entities ({} matched, {} created)",
            self.name,
            report.entities,
            report.matched,
            report.created
        );
        self.pending = Some(pending);
        Ok(report)
    }

    fn inject_entity<H: SceneHost>(
        &self,
        host: &mut H,
        registry: &BehaviourRegistry,
        entity: Entity,
        state: EntitySnapshot,
        pending: &mut Vec<PendingInjection>,
        report: &mut InjectReport,
    ) -> Result<(), SnapshotError> {
        self.ensure_alive(&*host, entity)?;

        let current = host.local_transform(entity)?;
        host.set_local_transform(entity, state.transform.apply_to(current))?;

        // Behaviours present before injection; each may be claimed once
        let mut candidates = host.behaviour_ids(entity);

        for snapshot in state.components {
            let tag = snapshot.component_type.as_str();
            let found = candidates.iter().position(|&id| {
                host.behaviour(entity, id)
                    .map_or(false, |b| b.type_tag() == tag)
            });

            let id = match found {
                Some(index) => {
                    report.matched += 1;
                    candidates.remove(index)
                }
                None => {
                    let behaviour = registry.create(tag)?;
                    report.created += 1;
                    log::debug!("Created '{}' on {}", tag, entity);
                    host.attach(entity, behaviour)?
                }
            };

            let behaviour = host
                .behaviour_mut(entity, id)
                .ok_or(HandleError::MissingBehaviour)?;
            report.skipped_fields += snapshot.populate(behaviour);
            pending.push(PendingInjection {
                snapshot,
                entity,
                behaviour: id,
            });
        }

        report.entities += 1;
        Ok(())
    }

    // --- Link ---

    /// Resolve the reference fields recorded by the last injection and
    /// clear the pending list.
    pub fn link<H: SceneHost>(&mut self, host: &mut H, linker: &ReferenceLinker) -> Result<LinkReport, SnapshotError> {
        let pending = self.pending.take().ok_or_else(|| SnapshotError::NothingToLink {
            coordinator: self.name.clone(),
        })?;

        let mut report = LinkReport::default();
        for record in &pending {
            let behaviour = host
                .behaviour_mut(record.entity, record.behaviour)
                .ok_or(HandleError::MissingBehaviour)?;
            report.merge(linker.link_component(&record.snapshot, behaviour));
        }

        log::debug!(
            "Coordinator '{}' linked {} references ({} unresolved)",
            self.name,
            report.resolved,
            report.unresolved
        );
        Ok(report)
    }

    fn ensure_alive<H: SceneHost>(&self, host: &H, entity: Entity) -> Result<(), SnapshotError> {
        if host.contains(entity) {
            Ok(())
        } else {
            Err(SnapshotError::StaleTarget {
                coordinator: self.name.clone(),
                entity,
            })
        }
    }
}
