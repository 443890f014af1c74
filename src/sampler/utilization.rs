//! Stateful utilization sampler
//!
//! Keeps the previous idle counter and timestamp so each call can report
//! utilization over the interval since the last call.

use tokio::time::Instant;

use super::stat::{clock_ticks_per_sec, CpuStat, StatSource};
use crate::error::Result;

/// Last observed idle counter and when it was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtilizationSample {
    pub idle_ticks: u64,
    pub timestamp: Instant,
}

/// Turns successive accounting reads into utilization fractions
///
/// Must not be shared: every call replaces the reference sample.
pub struct UtilizationSampler<S> {
    source: S,
    ticks_per_sec: u64,
    last: Option<UtilizationSample>,
}

impl<S: StatSource> UtilizationSampler<S> {
    /// Create a sampler using the kernel's clock tick rate
    pub fn new(source: S) -> Self {
        Self::with_clock_ticks(source, clock_ticks_per_sec())
    }

    /// Create a sampler with an explicit tick rate
    pub fn with_clock_ticks(source: S, ticks_per_sec: u64) -> Self {
        Self {
            source,
            ticks_per_sec: ticks_per_sec.max(1),
            last: None,
        }
    }

    /// Whether a reference sample exists (false until the first call)
    pub fn has_reference(&self) -> bool {
        self.last.is_some()
    }

    pub fn last_sample(&self) -> Option<&UtilizationSample> {
        self.last.as_ref()
    }

    /// Utilization since the previous call, in `[0, 1]`
    ///
    /// The first call only records the reference point and returns 0.
    pub fn sample(&mut self) -> Result<f64> {
        self.sample_at(Instant::now())
    }

    /// Same as [`sample`](Self::sample) with an explicit timestamp
    pub fn sample_at(&mut self, now: Instant) -> Result<f64> {
        let line = self.source.read_cpu_line()?;
        let stat = CpuStat::parse(&line)?;

        let current = UtilizationSample {
            idle_ticks: stat.idle,
            timestamp: now,
        };

        let Some(previous) = self.last.replace(current) else {
            return Ok(0.0);
        };

        let idle_secs =
            current.idle_ticks.saturating_sub(previous.idle_ticks) as f64 / self.ticks_per_sec as f64;
        let elapsed_secs = now.saturating_duration_since(previous.timestamp).as_secs_f64();

        if elapsed_secs > 0.0 {
            // Tick granularity can push idle_secs past elapsed_secs
            Ok((1.0 - idle_secs / elapsed_secs).clamp(0.0, 1.0))
        } else {
            Ok(0.0)
        }
    }
}
