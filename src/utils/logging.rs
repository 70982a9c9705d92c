//! Tracing Setup
//!
//! Installs the process-wide `tracing` subscriber. Output goes to stderr so
//! that stdout stays reserved for answers and plan JSON.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Filter applied when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "carewise=info,carewise_llm=info";

/// Initialize logging.
///
/// Reads `RUST_LOG` for per-module levels, e.g.
/// `RUST_LOG=carewise::services::planning=debug`. With `json` set, events are
/// emitted as one JSON object per line. Safe to call more than once.
pub fn init_logging(json: bool) {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        let registry = tracing_subscriber::registry().with(filter);
        if json {
            registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        } else {
            registry
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
                .init();
        }
    });
}
