//! CPU utilization sampling from kernel accounting
//!
//! The kernel keeps cumulative per-state CPU time counters in `/proc/stat`.
//! The first line aggregates all CPUs:
//!
//! ```text
//! cpu  4705 356 584 3699176 23060 0 277 0 0 0
//!      │    │   │   │
//!      │    │   │   └─ idle     (ticks since boot)
//!      │    │   └───── system
//!      │    └───────── nice
//!      └────────────── user
//! ```
//!
//! Utilization over an interval is derived from how much the idle counter
//! moved compared to how much wall-clock time passed:
//!
//! ```text
//! utilization = 1 - (idle_delta / CLK_TCK) / elapsed_secs
//! ```
//!
//! # Example Usage
//!
//! ```ignore
//! use microthrottle::sampler::{ProcStat, UtilizationSampler};
//!
//! let mut sampler = UtilizationSampler::new(ProcStat::new("/proc/stat"));
//! assert_eq!(sampler.sample()?, 0.0); // seeds the reference point
//! // ... later
//! let utilization = sampler.sample()?;
//! ```

pub mod stat;
pub mod utilization;

pub use stat::{clock_ticks_per_sec, CpuStat, ProcStat, StatSource};
pub use utilization::{UtilizationSample, UtilizationSampler};
