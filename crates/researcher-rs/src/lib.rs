//! Public surface for the researcher query router.
//!
//! Re-exports the building blocks and wires them into a ready-to-serve
//! [`core::Orchestrator`] from a loaded configuration.

pub mod app;

/// Re-export for convenience.
pub use researcher_rs_config as config;
pub use researcher_rs_core as core;
/// Re-export for convenience.
pub use researcher_rs_protocol as protocol;
pub use researcher_rs_server as server;
pub use researcher_rs_sources as sources;
pub use researcher_rs_store as store;

/// Initialize env_logger with millisecond timestamps.
///
/// `RUST_LOG` overrides the default `info` filter. Safe to call more than
/// once; later calls are ignored.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}
