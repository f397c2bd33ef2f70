//! The top-level crate: wires the feature registry, unit index, bigram
//! store, scorer, and search lifecycle from the collaborator crates
//! into one running engine, and carries the ambient configuration,
//! error and logging surface every entry point shares.

pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;

use std::sync::Once;

use env_logger::Target;
use log::LevelFilter;

static LOGGER_INIT: Once = Once::new();

/// Installs `env_logger` once per process, configurable via `RUST_LOG`.
/// Safe to call from multiple entry points (CLI, tests, embedders);
/// only the first call takes effect.
pub fn init_logging() {
    LOGGER_INIT.call_once(|| {
        let _ = env_logger::builder().target(Target::Stdout).filter_level(LevelFilter::Info).try_init();
    });
}
