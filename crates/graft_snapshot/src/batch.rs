//! Coordinator sets and load phases
//!
//! Loading a batch is split into two phases separated by a barrier. Every
//! coordinator injects first; only then can references be linked, because a
//! reference may point at an entity restored by a sibling coordinator.
//!
//! ```text
//! CoordinatorSet::begin_load(doc) -> InjectionPhase
//!     InjectionPhase::inject_all(..) -> LinkBarrier
//!         LinkBarrier::link_all(..) -> LinkReport
//! ```
//!
//! Each phase consumes the previous one, so linking before the whole batch
//! has injected does not compile.

use graft_scene::{BehaviourRegistry, Entity, SceneHost};

use crate::coordinator::{InjectReport, LinkReport, SnapshotCoordinator};
use crate::document::SceneSnapshot;
use crate::error::SnapshotError;
use crate::linker::ReferenceLinker;

/// Named coordinators that save and load together
#[derive(Debug, Default)]
pub struct CoordinatorSet {
    coordinators: Vec<SnapshotCoordinator>,
}

impl CoordinatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a coordinator. Names must be unique within the set.
    pub fn add(&mut self, coordinator: SnapshotCoordinator) -> Result<&mut SnapshotCoordinator, SnapshotError> {
        if self.get(coordinator.name()).is_some() {
            return Err(SnapshotError::DuplicateCoordinator(coordinator.name().to_string()));
        }
        self.coordinators.push(coordinator);
        let index = self.coordinators.len() - 1;
        Ok(&mut self.coordinators[index])
    }

    pub fn get(&self, name: &str) -> Option<&SnapshotCoordinator> {
        self.coordinators.iter().find(|c| c.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SnapshotCoordinator> {
        self.coordinators.iter_mut().find(|c| c.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SnapshotCoordinator> {
        self.coordinators.iter()
    }

    pub fn len(&self) -> usize {
        self.coordinators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinators.is_empty()
    }

    /// Adopt the targets of every coordinator
    pub fn adopt_all<H: SceneHost>(&mut self, host: &mut H) -> Result<(), SnapshotError> {
        for coordinator in &mut self.coordinators {
            coordinator.adopt(host)?;
        }
        Ok(())
    }

    /// One-tick continuation: finish pending adoptions
    pub fn end_tick<H: SceneHost>(&mut self, host: &mut H) -> Result<(), SnapshotError> {
        for coordinator in &mut self.coordinators {
            coordinator.on_tick_end(host)?;
        }
        Ok(())
    }

    /// Capture every coordinator into a new document
    pub fn capture_all<H: SceneHost>(
        &mut self,
        host: &H,
        registry: &BehaviourRegistry,
        name: &str,
    ) -> Result<SceneSnapshot, SnapshotError> {
        let mut document = SceneSnapshot::new(name);
        for coordinator in &mut self.coordinators {
            let states = coordinator.capture(host, registry)?.to_vec();
            document.coordinators.insert(coordinator.name().to_string(), states);
        }
        log::info!(
            "Captured '{}': {} coordinators, {} entities",
            name,
            document.coordinators.len(),
            document.entity_count()
        );
        Ok(document)
    }

    /// Hand each coordinator its snapshots from `document` and start loading
    pub fn begin_load(&mut self, document: SceneSnapshot) -> InjectionPhase<'_> {
        let SceneSnapshot { header, coordinators } = document;
        log::info!("Loading '{}' (format {})", header.name, header.format_version);

        // The document replaces anything captured earlier
        for coordinator in &mut self.coordinators {
            coordinator.take_snapshots();
        }
        for (name, states) in coordinators {
            match self.get_mut(&name) {
                Some(coordinator) => coordinator.set_snapshots(states),
                None => log::warn!("Document has snapshots for unknown coordinator '{}'", name),
            }
        }
        for coordinator in &self.coordinators {
            if coordinator.snapshots().is_none() {
                log::warn!("Document has no snapshots for coordinator '{}'", coordinator.name());
            }
        }

        self.begin_injection()
    }

    /// Start loading from whatever the snapshot slots already hold
    pub fn begin_injection(&mut self) -> InjectionPhase<'_> {
        InjectionPhase { set: self }
    }
}

/// First load phase: coordinators with a filled snapshot slot inject
#[must_use = "nothing is injected until inject_all runs"]
pub struct InjectionPhase<'a> {
    set: &'a mut CoordinatorSet,
}

impl<'a> InjectionPhase<'a> {
    /// Inject every coordinator holding snapshots. Coordinators with an
    /// empty slot are skipped.
    pub fn inject_all<H: SceneHost>(
        self,
        host: &mut H,
        registry: &BehaviourRegistry,
    ) -> Result<LinkBarrier<'a>, SnapshotError> {
        let mut report = InjectReport::default();
        for coordinator in &mut self.set.coordinators {
            if coordinator.snapshots().is_none() {
                continue;
            }
            report.merge(coordinator.inject(host, registry)?);
        }

        log::info!(
            "Injected {} entities ({} behaviours matched, {} created, {} fields skipped)",
            report.entities,
            report.matched,
            report.created,
            report.skipped_fields
        );
        Ok(LinkBarrier { set: self.set, report })
    }
}

/// Second load phase: the whole batch has injected and references may link
#[must_use = "references stay unlinked until link_all runs"]
pub struct LinkBarrier<'a> {
    set: &'a mut CoordinatorSet,
    report: InjectReport,
}

impl<'a> LinkBarrier<'a> {
    /// Counters from the injection phase
    pub fn report(&self) -> InjectReport {
        self.report
    }

    /// Resolve the references of every coordinator that injected, against
    /// identities found under the `batch` roots.
    pub fn link_all<H: SceneHost>(self, host: &mut H, batch: &[Entity]) -> Result<LinkReport, SnapshotError> {
        let linker = ReferenceLinker::scan(&*host, batch);

        let mut report = LinkReport::default();
        for coordinator in &mut self.set.coordinators {
            if !coordinator.has_pending() {
                continue;
            }
            report.merge(coordinator.link(host, &linker)?);
        }

        log::info!(
            "Linked {} references ({} unresolved) against {} identities",
            report.resolved,
            report.unresolved,
            linker.len()
        );
        Ok(report)
    }
}
