//! Demo workshop scene
//!
//! A workshop root with two groups of children, each group owned by its own
//! coordinator. Crates on the bench reference shelves in the other group, so
//! restoring them exercises cross-coordinator linking.

use graft_core::{HandleError, RegistryError};
use graft_scene::prelude::*;
use graft_snapshot::{CaptureFilter, CoordinatorSet, SnapshotCoordinator, SnapshotError};

pub const SHELF_COUNT: usize = 2;
pub const BENCH_COUNT: usize = 3;

#[derive(Debug, Default)]
pub struct Lamp {
    pub brightness: f32,
    pub on: bool,
}

impl_behaviour!(Lamp => "lamp" {
    data: [brightness, on],
    references: [],
});

#[derive(Debug, Default)]
pub struct Crate {
    pub contents: Vec<String>,
    pub weight: f32,
    pub stored_on: Option<Entity>,
}

impl_behaviour!(Crate => "crate" {
    data: [contents, weight],
    references: [stored_on],
});

/// Cosmetic animation state, rebuilt on load
#[derive(Debug, Default)]
pub struct Spinner {
    pub angle: f32,
}

impl_behaviour!(Spinner => "spinner", skip_serialisation = true {
    data: [angle],
    references: [],
});

/// Playback speed shared with the audio mixer
#[derive(Debug, Default)]
pub struct AudioTimeScale {
    pub scale: f32,
}

impl_behaviour!(AudioTimeScale => "audio_time_scale" {
    data: [scale],
    references: [],
});

/// Registry holding the built-in and workshop behaviour types
pub fn registry() -> Result<BehaviourRegistry, RegistryError> {
    let mut registry = BehaviourRegistry::with_builtins();
    registry
        .register::<Lamp>()?
        .register::<Crate>()?
        .register::<Spinner>()?
        .register::<AudioTimeScale>()?;
    Ok(registry)
}

/// Workshop layout plus the coordinators that own its children
pub struct Workshop {
    pub scene: Scene,
    pub coordinators: CoordinatorSet,
    pub root: Entity,
    pub shelves: Vec<Entity>,
    pub bench: Vec<Entity>,
}

impl Workshop {
    /// Build the empty layout and point one coordinator at each group
    pub fn build(filter: &CaptureFilter) -> Result<Self, WorkshopError> {
        let mut scene = Scene::new();
        let root = scene.spawn("workshop");
        let shelf_group = scene.spawn_child(root, "shelves")?;
        let bench_group = scene.spawn_child(root, "bench")?;

        let mut shelves = Vec::with_capacity(SHELF_COUNT);
        for i in 0..SHELF_COUNT {
            let shelf = scene.spawn_child(shelf_group, format!("shelf_{}", i))?;
            shelves.push(shelf);
        }
        let mut bench = Vec::with_capacity(BENCH_COUNT);
        for i in 0..BENCH_COUNT {
            bench.push(scene.spawn_child(bench_group, format!("slot_{}", i))?);
        }

        let mut coordinators = CoordinatorSet::new();
        coordinators
            .add(SnapshotCoordinator::new("shelves").with_filter(filter.clone()))?
            .set_targets(&mut scene, shelves.clone())?;
        coordinators
            .add(SnapshotCoordinator::new("bench").with_filter(filter.clone()))?
            .set_targets(&mut scene, bench.clone())?;

        Ok(Self {
            scene,
            coordinators,
            root,
            shelves,
            bench,
        })
    }

    /// Give every child a fresh identity and run the adoption tick
    pub fn adopt(&mut self) -> Result<(), SnapshotError> {
        self.coordinators.adopt_all(&mut self.scene)?;
        self.coordinators.end_tick(&mut self.scene)
    }

    /// Place lamps, crates and transient state
    pub fn furnish(&mut self) -> Result<(), HandleError> {
        let scene = &mut self.scene;

        for (i, &shelf) in self.shelves.iter().enumerate() {
            let x = i as f32 * 2.5;
            scene.set_local_transform(shelf, Transform::from_position(Vec3::new(x, 0.0, 0.0)))?;
            scene.add(shelf, Lamp { brightness: 0.5 + i as f32 * 0.25, on: i % 2 == 0 })?;
        }

        for (i, &slot) in self.bench.iter().enumerate() {
            let transform = Transform::from_position(Vec3::new(i as f32, 1.0, 0.0))
                .with_rotation_z(15.0 * i as f32)
                .with_scale(Vec3::splat(0.5));
            scene.set_local_transform(slot, transform)?;

            scene.add(
                slot,
                Crate {
                    contents: vec![format!("bolts_{}", i), "washers".to_string()],
                    weight: 4.0 + i as f32,
                    stored_on: self.shelves.get(i % SHELF_COUNT).copied(),
                },
            )?;
            scene.add(slot, Spinner { angle: 90.0 })?;
            scene.add(slot, AudioTimeScale { scale: 1.0 })?;
        }

        // Two lamps on the first slot to exercise ordered matching
        if let Some(&first) = self.bench.first() {
            scene.add(first, Lamp { brightness: 0.1, on: true })?;
            scene.add(first, Lamp { brightness: 0.9, on: false })?;
        }
        Ok(())
    }

    /// Log what every child holds
    pub fn describe(&self) {
        for &entity in self.shelves.iter().chain(&self.bench) {
            let name = self.scene.name(entity).unwrap_or("?");
            let position = self
                .scene
                .transform(entity)
                .map(|t| t.position)
                .unwrap_or_default();
            let lamps: Vec<_> = self
                .scene
                .get_all::<Lamp>(entity)
                .iter()
                .map(|l| l.brightness)
                .collect();
            match self.scene.get::<Crate>(entity) {
                Some(c) => log::info!(
                    "  {} at ({}, {}, {}) lamps {:?} crate {:?} on {}",
                    name,
                    position.x,
                    position.y,
                    position.z,
                    lamps,
                    c.contents,
                    c.stored_on
                        .and_then(|e| self.scene.name(e))
                        .unwrap_or("nothing")
                ),
                None => log::info!(
                    "  {} at ({}, {}, {}) lamps {:?}",
                    name,
                    position.x,
                    position.y,
                    position.z,
                    lamps
                ),
            }
        }
    }
}

/// Errors while building the workshop
#[derive(Debug)]
pub enum WorkshopError {
    Hierarchy(HierarchyError),
    Snapshot(SnapshotError),
}

impl std::fmt::Display for WorkshopError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hierarchy(e) => write!(f, "Hierarchy error: {}", e),
            Self::Snapshot(e) => write!(f, "Snapshot error: {}", e),
        }
    }
}

impl std::error::Error for WorkshopError {}

impl From<HierarchyError> for WorkshopError {
    fn from(e: HierarchyError) -> Self {
        Self::Hierarchy(e)
    }
}

impl From<SnapshotError> for WorkshopError {
    fn from(e: SnapshotError) -> Self {
        Self::Snapshot(e)
    }
}
