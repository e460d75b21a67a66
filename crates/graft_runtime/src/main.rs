//! Graft demo runtime
//!
//! Runs one save/load cycle over the demo workshop:
//! - builds and furnishes the workshop, then adopts its children
//! - captures every coordinator and saves the document to the configured slot
//! - loads the slot into a freshly built, empty workshop
//! - injects the whole batch, then links references across coordinators
//!
//! Run with: cargo run -p graft_runtime
//!       or: cargo run --bin graft
//!
//! Configuration comes from `graft.toml` and `GRAFT_*` environment
//! variables (see `graft_snapshot::config`).

mod workshop;

use graft_snapshot::SnapshotConfig;

use crate::workshop::Workshop;

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Graft v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run() {
        log::error!("Save/load cycle failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = SnapshotConfig::load()?;
    config.print_summary();

    let registry = workshop::registry()?;
    log::info!("Registered {} behaviour types", registry.len());
    let filter = config.filter();
    let store = config.store();

    // Save
    let mut source = Workshop::build(&filter)?;
    source.adopt()?;
    source.furnish()?;
    log::info!("Workshop before save:");
    source.describe();

    let document = source
        .coordinators
        .capture_all(&source.scene, &registry, &config.slot)?;
    store.save(&config.slot, &document)?;

    // Load into an empty workshop
    let document = store.load(&config.slot)?;
    let mut restored = Workshop::build(&filter)?;

    let barrier = restored
        .coordinators
        .begin_load(document)
        .inject_all(&mut restored.scene, &registry)?;
    let injected = barrier.report();
    let linked = barrier.link_all(&mut restored.scene, &[restored.root])?;

    log::info!("Workshop after load:");
    restored.describe();
    log::info!(
        "Restored {} entities: {} behaviours created, {} references linked, {} cleared",
        injected.entities,
        injected.created,
        linked.resolved,
        linked.unresolved
    );

    for slot in store.list()? {
        log::info!(
            "Slot '{}': '{}' (format {}) at {}",
            slot.slot,
            slot.header.name,
            slot.header.format_version,
            slot.path.display()
        );
    }

    Ok(())
}
