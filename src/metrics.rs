//! Prometheus metrics for the control loop
//!
//! Registered in the default registry on first use. The daemon has no
//! network surface, so [`render`] is how the values get out (logged at
//! debug level on shutdown).

use lazy_static::lazy_static;
use prometheus::{
    register_gauge, register_int_counter, register_int_gauge, Encoder, Gauge, IntCounter,
    IntGauge, TextEncoder,
};

lazy_static! {
    /// Host utilization measured at the start of the last iteration (0.0 - 1.0)
    pub static ref CPU_UTILIZATION: Gauge = register_gauge!(
        "microthrottle_cpu_utilization",
        "Measured aggregate CPU utilization as a fraction of one CPU"
    ).expect("failed to register CPU_UTILIZATION metric");

    /// Duty cycle enforced in the last quantum (0.0 - 1.0)
    pub static ref DUTY_CYCLE: Gauge = register_gauge!(
        "microthrottle_duty_cycle",
        "Fraction of each quantum unprivileged processes may run"
    ).expect("failed to register DUTY_CYCLE metric");

    pub static ref MANAGED_PROCESSES: IntGauge = register_int_gauge!(
        "microthrottle_managed_processes",
        "Unprivileged processes signalled in the last quantum"
    ).expect("failed to register MANAGED_PROCESSES metric");

    pub static ref ITERATIONS_TOTAL: IntCounter = register_int_counter!(
        "microthrottle_iterations_total",
        "Quanta enforced since startup"
    ).expect("failed to register ITERATIONS_TOTAL metric");

    /// Qualifying processes left unmanaged because the set was full
    pub static ref PROCESSES_TRUNCATED_TOTAL: IntCounter = register_int_counter!(
        "microthrottle_processes_truncated_total",
        "Unprivileged processes skipped because the process set was full"
    ).expect("failed to register PROCESSES_TRUNCATED_TOTAL metric");

    /// kill() failures, usually processes that exited mid-quantum
    pub static ref SIGNAL_FAILURES_TOTAL: IntCounter = register_int_counter!(
        "microthrottle_signal_failures_total",
        "SIGSTOP/SIGCONT deliveries that failed"
    ).expect("failed to register SIGNAL_FAILURES_TOTAL metric");
}

/// Initialize metrics with default values.
///
/// Called during startup to ensure metrics exist in the registry.
pub fn init() {
    CPU_UTILIZATION.set(0.0);
    DUTY_CYCLE.set(0.0);
    MANAGED_PROCESSES.set(0);
    let _ = ITERATIONS_TOTAL.get();
    let _ = PROCESSES_TRUNCATED_TOTAL.get();
    let _ = SIGNAL_FAILURES_TOTAL.get();
}

/// Prometheus text exposition of every registered metric
pub fn render() -> String {
    let mut buffer = Vec::new();
    if TextEncoder::new()
        .encode(&prometheus::gather(), &mut buffer)
        .is_err()
    {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
