//! Logger bootstrap for the session driver.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes the global logger for a session run.
///
/// Verbose runs surface per-spawn and stance detail; quiet runs keep to wave
/// milestones, vitals, and warnings. `RUST_LOG` still overrides either.
pub(crate) fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    let mut builder = Builder::from_env(env);

    // try_init only fails when a logger is already installed; a second call
    // must not bring the session down.
    let _ = builder.try_init();
}
