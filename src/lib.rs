//! microthrottle - single-CPU duty-cycle throttler
//!
//! Makes a single-CPU virtual machine behave like a burstable instance with
//! a fixed CPU share. Every 100ms quantum, all processes not owned by root
//! are frozen with SIGSTOP for part of the quantum and released with
//! SIGCONT for the rest. A proportional controller adjusts that split until
//! measured host utilization settles at the setpoint (30%).
//!
//! # Modules
//!
//! - `sampler` - utilization from the idle counter in `/proc/stat`
//! - `procs` - set of unprivileged pids from `/proc`
//! - `controller` - proportional duty-cycle law with clamping
//! - `enforcer` - SIGSTOP / sleep / SIGCONT / sleep for one quantum
//! - `lifecycle` - privilege and topology checks, priority, shutdown flag
//! - `throttler` - the control loop tying them together
//! - `config` - compiled-in tunables
//! - `metrics` - Prometheus gauges and counters
//! - `telemetry` - logging setup
//!
//! # Quick Start
//!
//! ```ignore
//! use microthrottle::{lifecycle, ProcThrottler, Shutdown, ThrottleConfig};
//!
//! let config = ThrottleConfig::default();
//! let shutdown = Shutdown::new();
//! lifecycle::listen_for_shutdown(shutdown.clone())?;
//!
//! let mut throttler = ProcThrottler::from_config(&config)?;
//! throttler.run(&shutdown).await?;
//! ```

pub mod config;
pub mod controller;
pub mod enforcer;
pub mod error;
pub mod lifecycle;
pub mod metrics;
pub mod procs;
pub mod sampler;
pub mod telemetry;
pub mod throttler;

// Re-export commonly used types at crate root for convenience
pub use config::ThrottleConfig;
pub use error::{Result, ThrottleError};
pub use lifecycle::Shutdown;
pub use throttler::{ProcThrottler, Throttler};
