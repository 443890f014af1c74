//! Quantum enforcement with SIGSTOP / SIGCONT
//!
//! One call to [`QuantumEnforcer::enforce`] consumes exactly one quantum of
//! wall-clock time:
//!
//! ```text
//!  SIGSTOP all          SIGCONT all
//!      │                    │
//!      ▼                    ▼
//!      ├──── suspend ───────┼──── run ────┤
//!      │  (1 - duty) * q    │  duty * q   │
//! ```
//!
//! The suspend phase always comes first, so a shutdown observed after
//! `enforce` returns never leaves a process stopped.
//!
//! A pid that exits between enumeration and signalling just fails its kill
//! (ESRCH). The pid may be recycled by an unrelated process before SIGCONT
//! is sent; that race is accepted.

use std::time::Duration;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::trace;

use crate::procs::ProcessSet;

/// Sends the freeze/thaw signals
pub trait Signaller {
    fn stop(&self, pid: Pid) -> nix::Result<()>;
    fn resume(&self, pid: Pid) -> nix::Result<()>;
}

/// Signals real processes with kill(2)
#[derive(Debug, Default, Clone, Copy)]
pub struct KillSignaller;

impl Signaller for KillSignaller {
    fn stop(&self, pid: Pid) -> nix::Result<()> {
        kill(pid, Signal::SIGSTOP)
    }

    fn resume(&self, pid: Pid) -> nix::Result<()> {
        kill(pid, Signal::SIGCONT)
    }
}

/// Split of one quantum into its two phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantumSchedule {
    pub run: Duration,
    pub suspend: Duration,
}

impl QuantumSchedule {
    /// `run = quantum * duty`, `suspend = quantum - run`
    ///
    /// `duty` is clamped into `[0, 1]`, so `run + suspend == quantum` holds
    /// for every input.
    pub fn new(quantum: Duration, duty_cycle: f64) -> Self {
        let duty = if duty_cycle.is_nan() {
            1.0
        } else {
            duty_cycle.clamp(0.0, 1.0)
        };
        let run_nanos = (quantum.as_nanos() as f64 * duty).round() as u128;
        let run = Duration::from_nanos(run_nanos.min(quantum.as_nanos()) as u64);
        Self {
            run,
            suspend: quantum - run,
        }
    }

    pub fn total(&self) -> Duration {
        self.run + self.suspend
    }
}

/// Outcome of one enforced quantum
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EnforceReport {
    pub stopped: usize,
    pub resumed: usize,
    pub failed: usize,
}

/// Runs the stop / sleep / continue / sleep sequence
pub struct QuantumEnforcer<K> {
    signaller: K,
    quantum: Duration,
}

impl<K: Signaller> QuantumEnforcer<K> {
    pub fn new(signaller: K, quantum: Duration) -> Self {
        Self { signaller, quantum }
    }

    pub fn signaller(&self) -> &K {
        &self.signaller
    }

    pub fn schedule(&self, duty_cycle: f64) -> QuantumSchedule {
        QuantumSchedule::new(self.quantum, duty_cycle)
    }

    /// Freeze `set` for the suspend phase, then let it run for the run phase
    pub async fn enforce(&self, duty_cycle: f64, set: &ProcessSet) -> EnforceReport {
        let schedule = self.schedule(duty_cycle);
        let mut report = EnforceReport::default();

        for pid in set.iter() {
            match self.signaller.stop(pid) {
                Ok(()) => report.stopped += 1,
                Err(errno) => {
                    trace!(pid = pid.as_raw(), %errno, "SIGSTOP failed");
                    report.failed += 1;
                }
            }
        }
        sleep(schedule.suspend).await;

        for pid in set.iter() {
            match self.signaller.resume(pid) {
                Ok(()) => report.resumed += 1,
                Err(errno) => {
                    trace!(pid = pid.as_raw(), %errno, "SIGCONT failed");
                    report.failed += 1;
                }
            }
        }
        sleep(schedule.run).await;

        report
    }
}

async fn sleep(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
