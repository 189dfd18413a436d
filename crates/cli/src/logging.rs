//! Log output for the CLI process.
//!
//! The engine logs through the `log` facade; the subscriber installed here
//! picks those records up through its `tracing-log` bridge.

use tracing_subscriber::EnvFilter;

/// Initialize logging to stderr.
///
/// `-v` / `-vv` select info / debug. Without a flag, `RUST_LOG` applies,
/// falling back to warnings only.
pub fn init(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
