//! End-to-end capture, persist, inject and link over the in-memory scene

use graft_core::IdentityTag;
use graft_math::{Transform, Vec3};
use graft_scene::prelude::*;
use graft_snapshot::{
    CaptureFilter, ComponentSnapshot, CoordinatorSet, GameObjectState, InjectReport, LinkReport,
    ReferenceLinker, SceneSnapshot, SnapshotCoordinator, SnapshotError, SnapshotFormat,
    SnapshotStore,
};

#[derive(Debug, Default)]
struct Shelf {
    capacity: i32,
    label: String,
    neighbour: Option<Entity>,
}

impl_behaviour!(Shelf => "shelf" {
    data: [capacity, label],
    references: [neighbour],
});

#[derive(Debug, Default)]
struct Light {
    intensity: f32,
}

impl_behaviour!(Light => "light" {
    data: [intensity],
    references: [],
});

#[derive(Debug, Default)]
struct Sparkle;

impl_behaviour!(Sparkle => "sparkle", skip_serialisation = true {
    data: [],
    references: [],
});

#[derive(Debug, Default)]
struct AudioTimeScale {
    factor: f32,
}

impl_behaviour!(AudioTimeScale => "audio_time_scale" {
    data: [factor],
    references: [],
});

fn registry() -> BehaviourRegistry {
    let mut registry = BehaviourRegistry::with_builtins();
    registry
        .register::<Shelf>()
        .and_then(|r| r.register::<Light>())
        .and_then(|r| r.register::<Sparkle>())
        .and_then(|r| r.register::<AudioTimeScale>())
        .unwrap();
    registry
}

/// A level with two sibling groups of two children, one coordinator per
/// group, adopted and past the end of the adoption tick
struct World {
    scene: Scene,
    set: CoordinatorSet,
    level: Entity,
    left: Vec<Entity>,
    right: Vec<Entity>,
}

fn build_world() -> World {
    let mut scene = Scene::new();
    let level = scene.spawn("level");
    let left_root = scene.spawn_child(level, "left").unwrap();
    let right_root = scene.spawn_child(level, "right").unwrap();
    let left: Vec<_> = (0..2)
        .map(|i| scene.spawn_child(left_root, format!("left_{i}")).unwrap())
        .collect();
    let right: Vec<_> = (0..2)
        .map(|i| scene.spawn_child(right_root, format!("right_{i}")).unwrap())
        .collect();

    let mut set = CoordinatorSet::new();
    set.add(SnapshotCoordinator::new("left"))
        .unwrap()
        .set_targets(&mut scene, left.clone())
        .unwrap();
    set.add(SnapshotCoordinator::new("right"))
        .unwrap()
        .set_targets(&mut scene, right.clone())
        .unwrap();
    set.adopt_all(&mut scene).unwrap();
    set.end_tick(&mut scene).unwrap();

    World {
        scene,
        set,
        level,
        left,
        right,
    }
}

/// Populate the source world. `left[0]` points at `right[1]` and `right[0]`
/// points at an entity outside the level.
fn furnish(world: &mut World) -> Entity {
    let scene = &mut world.scene;
    let (l0, l1) = (world.left[0], world.left[1]);
    let (r0, r1) = (world.right[0], world.right[1]);

    scene
        .set_local_transform(
            l0,
            Transform::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(10.0, 20.0, 30.0), Vec3::splat(2.0)),
        )
        .unwrap();
    scene
        .set_local_transform(r1, Transform::from_position(Vec3::new(-4.0, 0.5, 0.0)).with_rotation_z(90.0))
        .unwrap();

    scene
        .add(l0, Shelf { capacity: 4, label: "top".into(), neighbour: Some(r1) })
        .unwrap();
    scene.add(l0, Light { intensity: 1.0 }).unwrap();
    scene.add(l0, Light { intensity: 2.0 }).unwrap();
    scene.add(l1, Light { intensity: 0.25 }).unwrap();

    let outside = scene.spawn("outside");
    scene
        .add(outside, SerialisableIdentity::new(IdentityTag::from_u128(0xfeed)))
        .unwrap();
    scene
        .add(r0, Shelf { capacity: 9, label: "floor".into(), neighbour: Some(outside) })
        .unwrap();
    outside
}

fn intensities(scene: &Scene, entity: Entity) -> Vec<f32> {
    scene.get_all::<Light>(entity).iter().map(|l| l.intensity).collect()
}

fn load_into(world: &mut World, doc: SceneSnapshot, registry: &BehaviourRegistry) -> (InjectReport, LinkReport) {
    let barrier = world
        .set
        .begin_load(doc)
        .inject_all(&mut world.scene, registry)
        .unwrap();
    let injected = barrier.report();
    let linked = barrier.link_all(&mut world.scene, &[world.level]).unwrap();
    (injected, linked)
}

#[test]
fn test_round_trip_into_fresh_world() {
    let registry = registry();
    let mut source = build_world();
    furnish(&mut source);
    let doc = source.set.capture_all(&source.scene, &registry, "round_trip").unwrap();

    let mut fresh = build_world();
    // Live X/Y rotation survives injection
    fresh
        .scene
        .set_local_transform(fresh.left[0], Transform::IDENTITY.with_rotation(Vec3::new(5.0, 6.0, 7.0)))
        .unwrap();

    let (injected, linked) = load_into(&mut fresh, doc, &registry);
    assert_eq!(injected.entities, 4);

    let t = fresh.scene.local_transform(fresh.left[0]).unwrap();
    assert_eq!(t.position, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(t.rotation, Vec3::new(5.0, 6.0, 30.0));
    assert_eq!(t.scale, Vec3::splat(2.0));
    let t = fresh.scene.local_transform(fresh.right[1]).unwrap();
    assert_eq!(t.position, Vec3::new(-4.0, 0.5, 0.0));
    assert_eq!(t.rotation_z(), 90.0);

    let shelf = fresh.scene.get::<Shelf>(fresh.left[0]).unwrap();
    assert_eq!(shelf.capacity, 4);
    assert_eq!(shelf.label, "top");
    assert_eq!(shelf.neighbour, Some(fresh.right[1]));
    assert_eq!(intensities(&fresh.scene, fresh.left[0]), vec![1.0, 2.0]);
    assert_eq!(intensities(&fresh.scene, fresh.left[1]), vec![0.25]);

    // Identity tags are carried over with the entities
    for (old, new) in source.left.iter().chain(&source.right).zip(fresh.left.iter().chain(&fresh.right)) {
        assert_eq!(source.scene.identity_of(*old), fresh.scene.identity_of(*new));
    }

    // Outside entity is not part of the fresh batch
    assert_eq!(fresh.scene.get::<Shelf>(fresh.right[0]).unwrap().neighbour, None);
    assert_eq!(linked, LinkReport { resolved: 1, unresolved: 1 });
}

#[test]
fn test_capture_is_idempotent() {
    let registry = registry();
    let mut world = build_world();
    furnish(&mut world);

    let first = world.set.capture_all(&world.scene, &registry, "a").unwrap();
    let second = world.set.capture_all(&world.scene, &registry, "b").unwrap();
    assert_eq!(first.coordinators, second.coordinators);
    assert_eq!(intensities(&world.scene, world.left[0]), vec![1.0, 2.0]);
}

#[test]
fn test_reference_outside_batch_is_cleared() {
    let registry = registry();
    let mut source = build_world();
    furnish(&mut source);
    let doc = source.set.capture_all(&source.scene, &registry, "scope").unwrap();

    // Same tag exists in the fresh scene but outside the batch roots
    let mut fresh = build_world();
    let stray = fresh.scene.spawn("outside");
    fresh
        .scene
        .add(stray, SerialisableIdentity::new(IdentityTag::from_u128(0xfeed)))
        .unwrap();
    fresh
        .scene
        .add(fresh.right[0], Shelf { neighbour: Some(stray), ..Default::default() })
        .unwrap();

    load_into(&mut fresh, doc, &registry);
    assert_eq!(fresh.scene.get::<Shelf>(fresh.right[0]).unwrap().neighbour, None);
}

#[test]
fn test_duplicate_types_match_in_order() {
    let registry = registry();
    let mut world = build_world();
    let target = world.left[0];
    world.scene.add(target, Light::default()).unwrap();
    world.scene.add(target, Light::default()).unwrap();
    let before = world.scene.behaviour_count(target);

    let coordinator = world.set.get_mut("left").unwrap();
    coordinator.set_snapshots(vec![
        GameObjectState::default()
            .with_component(ComponentSnapshot::new("light").with_field("intensity", 3.0f32))
            .with_component(ComponentSnapshot::new("light").with_field("intensity", 4.0f32)),
    ]);
    let report = coordinator.inject(&mut world.scene, &registry).unwrap();

    assert_eq!(report.matched, 2);
    assert_eq!(report.created, 0);
    assert_eq!(world.scene.behaviour_count(target), before);
    assert_eq!(intensities(&world.scene, target), vec![3.0, 4.0]);
}

#[test]
fn test_missing_behaviour_created_once() {
    let registry = registry();
    let mut world = build_world();
    let target = world.left[0];
    world.scene.add(target, Light::default()).unwrap();
    let before = world.scene.behaviour_count(target);

    let coordinator = world.set.get_mut("left").unwrap();
    coordinator.set_snapshots(vec![GameObjectState::default()
        .with_component(ComponentSnapshot::new("light").with_field("intensity", 1.5f32))
        .with_component(ComponentSnapshot::new("light").with_field("intensity", 2.5f32))
        .with_component(ComponentSnapshot::new("shelf").with_field("capacity", 2i32))]);
    let report = coordinator.inject(&mut world.scene, &registry).unwrap();

    assert_eq!(report.matched, 1);
    assert_eq!(report.created, 2);
    assert_eq!(world.scene.behaviour_count(target), before + 2);
    assert_eq!(world.scene.get_all::<Shelf>(target).len(), 1);
    assert_eq!(world.scene.get::<Shelf>(target).unwrap().capacity, 2);
    assert_eq!(intensities(&world.scene, target), vec![1.5, 2.5]);
}

#[test]
fn test_deny_list_and_skip_flag() {
    let registry = registry();
    let mut world = build_world();
    let target = world.left[0];
    world.scene.add(target, Sparkle).unwrap();
    world.scene.add(target, AudioTimeScale { factor: 0.5 }).unwrap();
    world.scene.add(target, Light { intensity: 1.0 }).unwrap();
    world.scene.add(target, PersistOptOut).unwrap();

    let tags = |doc: &SceneSnapshot| -> Vec<String> {
        doc.get("left").unwrap()[0]
            .components
            .iter()
            .map(|c| c.component_type.to_string())
            .collect()
    };

    let doc = world.set.capture_all(&world.scene, &registry, "filtered").unwrap();
    assert_eq!(tags(&doc), vec!["serialisable_identity", "light"]);

    let mut custom = build_world();
    let target = custom.left[0];
    custom.scene.add(target, AudioTimeScale { factor: 0.5 }).unwrap();
    custom.scene.add(target, Light { intensity: 1.0 }).unwrap();
    let mut set = CoordinatorSet::new();
    set.add(SnapshotCoordinator::new("left").with_filter(CaptureFilter::allow_all().deny("light")))
        .unwrap()
        .set_targets(&mut custom.scene, custom.left.clone())
        .unwrap();
    let doc = set.capture_all(&custom.scene, &registry, "custom").unwrap();
    assert_eq!(tags(&doc), vec!["serialisable_identity", "audio_time_scale"]);
}

#[test]
fn test_slot_and_pending_lifecycle() {
    let registry = registry();
    let mut world = build_world();
    furnish(&mut world);
    let coordinator = world.set.get_mut("left").unwrap();

    coordinator.capture(&world.scene, &registry).unwrap();
    assert!(coordinator.snapshots().is_some());
    assert!(coordinator.pending().is_none());

    coordinator.inject(&mut world.scene, &registry).unwrap();
    assert!(coordinator.snapshots().is_none());
    assert!(coordinator.pending().map_or(false, |p| !p.is_empty()));

    let linker = ReferenceLinker::scan(&world.scene, &[world.level]);
    coordinator.link(&mut world.scene, &linker).unwrap();
    assert!(coordinator.pending().is_none());

    assert!(matches!(
        coordinator.link(&mut world.scene, &linker),
        Err(SnapshotError::NothingToLink { .. })
    ));
    assert!(matches!(
        coordinator.inject(&mut world.scene, &registry),
        Err(SnapshotError::NothingToInject { .. })
    ));
}

#[test]
fn test_length_mismatch_uses_common_prefix() {
    let registry = registry();
    let mut world = build_world();
    let coordinator = world.set.get_mut("left").unwrap();

    let mut moved = GameObjectState::default()
        .with_component(ComponentSnapshot::new("light").with_field("intensity", 7.0f32));
    moved.transform.relative_position = Vec3::new(0.0, 9.0, 0.0);

    coordinator.set_snapshots(vec![moved.clone()]);
    let report = coordinator.inject(&mut world.scene, &registry).unwrap();
    assert_eq!(report.entities, 1);
    assert_eq!(world.scene.local_transform(world.left[0]).unwrap().position, Vec3::new(0.0, 9.0, 0.0));
    assert_eq!(world.scene.local_transform(world.left[1]).unwrap().position, Vec3::ZERO);
    assert!(world.scene.get::<Light>(world.left[1]).is_none());

    coordinator.set_snapshots(vec![moved.clone(), moved.clone(), moved]);
    let report = coordinator.inject(&mut world.scene, &registry).unwrap();
    assert_eq!(report.entities, 2);
    assert_eq!(intensities(&world.scene, world.left[1]), vec![7.0]);
}

#[test]
fn test_store_round_trip_both_formats() {
    let registry = registry();
    let mut source = build_world();
    furnish(&mut source);
    let doc = source.set.capture_all(&source.scene, &registry, "stored").unwrap();

    let dir = tempfile::tempdir().unwrap();
    for format in [SnapshotFormat::Json, SnapshotFormat::Binary] {
        let store = SnapshotStore::new(dir.path()).with_format(format);
        store.save("slot", &doc).unwrap();
        let loaded = store.load("slot").unwrap();
        assert_eq!(loaded, doc, "{format} round trip");

        let mut fresh = build_world();
        load_into(&mut fresh, loaded, &registry);
        let shelf = fresh.scene.get::<Shelf>(fresh.left[0]).unwrap();
        assert_eq!(shelf.label, "top");
        assert_eq!(shelf.neighbour, Some(fresh.right[1]));
    }
}

#[test]
fn test_infinite_field_saved_only_as_binary() {
    let registry = registry();
    let mut source = build_world();
    furnish(&mut source);
    source.scene.get_mut::<Light>(source.left[1]).unwrap().intensity = f32::INFINITY;
    let doc = source.set.capture_all(&source.scene, &registry, "bright").unwrap();

    let dir = tempfile::tempdir().unwrap();
    let json = SnapshotStore::new(dir.path());
    assert!(json.save("slot", &doc).is_err());
    assert!(!json.exists("slot"));

    let binary = SnapshotStore::new(dir.path()).with_format(SnapshotFormat::Binary);
    binary.save("slot", &doc).unwrap();
    let mut fresh = build_world();
    load_into(&mut fresh, binary.load("slot").unwrap(), &registry);
    assert_eq!(intensities(&fresh.scene, fresh.left[1]), vec![f32::INFINITY]);
}

#[test]
fn test_json_record_layout() {
    let state = GameObjectState::default()
        .with_component(ComponentSnapshot::new("light").with_field("intensity", 1.0f32));
    let json = serde_json::to_value(&state).unwrap();

    assert!(json["Transform"]["RelativePosition"].is_object());
    assert_eq!(json["Transform"]["RelativeRotation"], 0.0);
    assert!(json["Transform"]["LocalScale"].is_object());
    assert_eq!(json["Components"][0]["Type"], "light");
}
