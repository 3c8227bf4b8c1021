//! portwatch agent entrypoint: samples port-owning processes once at start,
//! then every `interval_ms`, appending to the CSV store until Ctrl+C.

use portwatch::{
    collectors::{SsSocketResolver, SysinfoInventory, SysinfoSampler},
    config::AgentConfig,
    cycle::CollectionCycle,
    filter::ImportanceFilter,
    logging::StructuredLogger,
    scheduler::Scheduler,
    storage::CsvStore,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config_path = AgentConfig::path_from_env();
    let loaded = AgentConfig::load(&config_path);
    let config = loaded.as_ref().cloned().unwrap_or_default();

    StructuredLogger::init(&config.log);
    if let Err(e) = &loaded {
        warn!(error = %e, "config unreadable, using defaults");
    }

    info!(store = ?config.store_path, interval_ms = config.interval_ms, "portwatch agent starting");

    let store = Arc::new(CsvStore::open(&config.store_path)?);
    let filter = ImportanceFilter::new(&config.keywords);
    info!(keywords = filter.keywords().len(), "importance filter ready");

    let cycle = CollectionCycle::new(
        Box::new(SsSocketResolver::from_config(&config.sockets)),
        Box::new(SysinfoInventory::new()),
        Box::new(SysinfoSampler::new()),
        filter,
        store,
    );
    let scheduler = Scheduler::new(cycle, config.interval());

    let stop = scheduler.stop_handle();
    if let Err(e) = ctrlc::set_handler(move || stop.store(true, Ordering::Relaxed)) {
        warn!(error = %e, "no Ctrl+C handler installed");
    }

    scheduler.run();
    info!("portwatch agent stopping");
    Ok(())
}
