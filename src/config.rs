//! Throttler tunables
//!
//! All values are compiled in. There is no CLI, file, or environment surface
//! for them; `ThrottleConfig::default()` is what the daemon runs with.
//!
//! # Duty Cycle Explained
//!
//! Every quantum of wall-clock time is split in two phases:
//!
//! ```text
//! ├──────────── quantum (100ms) ────────────┤
//! ├──── suspend (SIGSTOP) ────┼── run ──────┤
//!         (1 - duty) * q         duty * q
//! ```
//!
//! The controller moves `duty` inside `[cpu_min, cpu_max]` so that the
//! measured host utilization settles at `setpoint`.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::error::{Result, ThrottleError};

/// Nominal CPU share of a t1.micro class instance
pub const T1_MICRO_SETPOINT: f64 = 0.30;

/// Lower bound for the duty cycle
pub const CPU_MIN: f64 = 0.01;

/// Upper bound for the duty cycle
pub const CPU_MAX: f64 = 1.00;

/// Length of one suspend + run window
pub const SCHED_QUANTUM: Duration = Duration::from_millis(100);

/// Maximum number of processes managed per quantum
pub const PROCESS_CAPACITY: usize = 1024;

/// Nice value the daemon gives itself at startup
pub const DAEMON_PRIORITY: i32 = -10;

/// Mount point of the process table
pub const PROC_ROOT: &str = "/proc";

/// Tunables for one throttler run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThrottleConfig {
    /// Target aggregate utilization (fraction of one CPU)
    pub setpoint: f64,
    /// Smallest duty cycle the controller may choose
    pub cpu_min: f64,
    /// Largest duty cycle the controller may choose
    pub cpu_max: f64,
    /// Wall-clock length of one suspend + run window
    pub quantum: Duration,
    /// Process set capacity; extra processes are left unmanaged for that quantum
    pub process_capacity: usize,
    /// Scheduling priority (nice value) for the daemon itself
    pub priority: i32,
    /// Where the process table and `stat` live
    pub proc_root: PathBuf,
}

impl ThrottleConfig {
    /// Preset modelling a t1.micro burstable instance
    pub fn t1_micro() -> Self {
        Self {
            setpoint: T1_MICRO_SETPOINT,
            cpu_min: CPU_MIN,
            cpu_max: CPU_MAX,
            quantum: SCHED_QUANTUM,
            process_capacity: PROCESS_CAPACITY,
            priority: DAEMON_PRIORITY,
            proc_root: PathBuf::from(PROC_ROOT),
        }
    }

    /// Path of the kernel-wide CPU accounting file
    pub fn stat_path(&self) -> PathBuf {
        self.proc_root.join("stat")
    }

    /// Reject combinations the control loop cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.setpoint > 0.0 && self.setpoint <= 1.0) {
            return Err(ThrottleError::InvalidConfig(format!(
                "setpoint {} outside (0, 1]",
                self.setpoint
            )));
        }
        if !(self.cpu_min > 0.0) || self.cpu_min > self.cpu_max || self.cpu_max > 1.0 {
            return Err(ThrottleError::InvalidConfig(format!(
                "duty cycle bounds [{}, {}] invalid",
                self.cpu_min, self.cpu_max
            )));
        }
        if self.quantum.is_zero() {
            return Err(ThrottleError::InvalidConfig("quantum is zero".to_string()));
        }
        if self.process_capacity == 0 {
            return Err(ThrottleError::InvalidConfig(
                "process capacity is zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self::t1_micro()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_t1_micro() {
        let config = ThrottleConfig::default();
        assert_eq!(config, ThrottleConfig::t1_micro());
        assert_eq!(config.setpoint, 0.30);
        assert_eq!(config.cpu_min, 0.01);
        assert_eq!(config.cpu_max, 1.00);
        assert_eq!(config.quantum, Duration::from_millis(100));
        assert_eq!(config.process_capacity, 1024);
        assert_eq!(config.priority, -10);
        assert_eq!(config.stat_path(), PathBuf::from("/proc/stat"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_bounds() {
        let mut config = ThrottleConfig::default();
        config.cpu_min = 0.5;
        config.cpu_max = 0.2;
        assert!(matches!(
            config.validate(),
            Err(ThrottleError::InvalidConfig(_))
        ));

        let mut config = ThrottleConfig::default();
        config.cpu_min = 0.0;
        assert!(config.validate().is_err());

        let mut config = ThrottleConfig::default();
        config.setpoint = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_quantum_and_capacity() {
        let mut config = ThrottleConfig::default();
        config.quantum = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = ThrottleConfig::default();
        config.process_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serializes_for_startup_log() {
        let json = serde_json::to_string(&ThrottleConfig::default()).unwrap();
        assert!(json.contains("\"setpoint\":0.3"));
        assert!(json.contains("\"process_capacity\":1024"));
    }
}
