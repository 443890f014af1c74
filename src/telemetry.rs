//! Logging setup
//!
//! Console output through `tracing-subscriber`. The default filter is
//! `warn`, which keeps the daemon silent while it runs. Use `RUST_LOG` for
//! more, e.g. `RUST_LOG=microthrottle=debug` logs every quantum.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or invalid
const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber
pub fn init_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
