//! Closed-loop control of aggregate CPU utilization
//!
//! The [`Throttler`] owns every piece of per-run state: the sampler's
//! reference point, the current duty cycle, and the process set. One call to
//! [`Throttler::step`] is one iteration:
//!
//! ```text
//! ┌──────────┐    ┌────────────┐    ┌───────────┐    ┌──────────┐
//! │ sample() │ ─► │ update()   │ ─► │ enumerate │ ─► │ enforce  │
//! │ /proc/   │    │ duty cycle │    │ /proc/<n> │    │ STOP/CONT│
//! │  stat    │    │            │    │           │    │ 1 quantum│
//! └──────────┘    └────────────┘    └───────────┘    └──────────┘
//!       ▲                                                  │
//!       └──────────── shutdown not requested ◄─────────────┘
//! ```

use tracing::{debug, trace};

use crate::config::ThrottleConfig;
use crate::controller::DutyCycleController;
use crate::enforcer::{EnforceReport, KillSignaller, QuantumEnforcer, Signaller};
use crate::error::Result;
use crate::lifecycle::Shutdown;
use crate::metrics::{
    CPU_UTILIZATION, DUTY_CYCLE, ITERATIONS_TOTAL, MANAGED_PROCESSES, PROCESSES_TRUNCATED_TOTAL,
    SIGNAL_FAILURES_TOTAL,
};
use crate::procs::{enumerate, ProcFs, ProcessSet, ProcessSource};
use crate::sampler::{ProcStat, StatSource, UtilizationSampler};

/// Throttler wired to the live kernel interfaces
pub type ProcThrottler = Throttler<ProcStat, ProcFs, KillSignaller>;

/// What happened during one iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationReport {
    /// None for the seeding sample, which does not adjust the duty cycle
    pub utilization: Option<f64>,
    pub duty_cycle: f64,
    pub managed: usize,
    pub truncated: usize,
    pub signals: EnforceReport,
}

/// Controller context threaded through the loop
pub struct Throttler<S, P, K> {
    sampler: UtilizationSampler<S>,
    controller: DutyCycleController,
    processes: P,
    enforcer: QuantumEnforcer<K>,
    set: ProcessSet,
    duty_cycle: f64,
    iterations: u64,
}

impl ProcThrottler {
    /// Build a throttler over `config.proc_root`
    pub fn from_config(config: &ThrottleConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            config,
            UtilizationSampler::new(ProcStat::new(config.stat_path())),
            ProcFs::new(&config.proc_root),
            KillSignaller,
        ))
    }
}

impl<S, P, K> Throttler<S, P, K>
where
    S: StatSource,
    P: ProcessSource,
    K: Signaller,
{
    pub fn new(
        config: &ThrottleConfig,
        sampler: UtilizationSampler<S>,
        processes: P,
        signaller: K,
    ) -> Self {
        let controller = DutyCycleController::from_config(config);
        Self {
            sampler,
            duty_cycle: controller.initial_target(),
            controller,
            processes,
            enforcer: QuantumEnforcer::new(signaller, config.quantum),
            set: ProcessSet::with_capacity(config.process_capacity),
            iterations: 0,
        }
    }

    /// Duty cycle used for the most recent (or next) quantum
    pub fn duty_cycle(&self) -> f64 {
        self.duty_cycle
    }

    /// Completed iterations
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn enforcer(&self) -> &QuantumEnforcer<K> {
        &self.enforcer
    }

    /// Take a utilization reading and move the duty cycle toward the setpoint
    ///
    /// The seeding reading leaves the duty cycle untouched and returns None.
    pub fn update_duty_cycle(&mut self) -> Result<Option<f64>> {
        let seeded = self.sampler.has_reference();
        let utilization = self.sampler.sample()?;
        if !seeded {
            trace!("seeded utilization reference");
            return Ok(None);
        }

        self.duty_cycle = self.controller.update(utilization, self.duty_cycle);
        Ok(Some(utilization))
    }

    /// Run one full iteration, consuming one quantum of wall-clock time
    pub async fn step(&mut self) -> Result<IterationReport> {
        let utilization = self.update_duty_cycle()?;

        enumerate(&self.processes, &mut self.set)?;
        let signals = self.enforcer.enforce(self.duty_cycle, &self.set).await;

        self.iterations += 1;

        let report = IterationReport {
            utilization,
            duty_cycle: self.duty_cycle,
            managed: self.set.len(),
            truncated: self.set.truncated(),
            signals,
        };
        record(&report);

        debug!(
            iteration = self.iterations,
            utilization = report.utilization.unwrap_or(0.0),
            duty_cycle = report.duty_cycle,
            managed = report.managed,
            truncated = report.truncated,
            signal_failures = report.signals.failed,
            "quantum enforced"
        );

        Ok(report)
    }

    /// Iterate until shutdown is requested
    ///
    /// The flag is checked once per quantum, so an in-flight quantum always
    /// finishes (and resumes every stopped process) first.
    pub async fn run(&mut self, shutdown: &Shutdown) -> Result<u64> {
        while !shutdown.is_requested() {
            self.step().await?;
        }
        Ok(self.iterations)
    }
}

fn record(report: &IterationReport) {
    if let Some(utilization) = report.utilization {
        CPU_UTILIZATION.set(utilization);
    }
    DUTY_CYCLE.set(report.duty_cycle);
    MANAGED_PROCESSES.set(report.managed as i64);
    ITERATIONS_TOTAL.inc();
    PROCESSES_TRUNCATED_TOTAL.inc_by(report.truncated as u64);
    SIGNAL_FAILURES_TOTAL.inc_by(report.signals.failed as u64);
}
