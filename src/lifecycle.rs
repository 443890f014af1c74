//! Daemon startup checks and shutdown signalling
//!
//! # Startup Order
//!
//! ```text
//! check_privilege()      ← euid 0, CAP_KILL, CAP_SYS_NICE
//!        │
//! check_single_cpu()     ← exactly one online CPU
//!        │
//! raise_priority(-10)    ← never starved by the processes we freeze
//!        │
//! listen_for_shutdown()  ← SIGINT / SIGQUIT / SIGTERM → Shutdown::request()
//! ```
//!
//! Any failure before the loop starts is fatal.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use caps::{CapSet, Capability};
use nix::unistd::geteuid;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, info};

use crate::error::{Result, ThrottleError};

/// Capabilities root must still hold inside a restricted container
const REQUIRED_CAPS: [Capability; 2] = [Capability::CAP_KILL, Capability::CAP_SYS_NICE];

/// Cooperative shutdown flag shared with the signal listeners
///
/// Only the listeners write it; the control loop reads it once per quantum.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    requested: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Require root, plus the capabilities needed to signal and renice
pub fn check_privilege() -> Result<()> {
    let euid = geteuid();
    if !euid.is_root() {
        return Err(ThrottleError::NotPrivileged(format!(
            "effective uid is {}",
            euid
        )));
    }

    for cap in REQUIRED_CAPS {
        // Kernels without capability support report an error; euid 0 is enough there
        if let Ok(false) = caps::has_cap(None, CapSet::Effective, cap) {
            return Err(ThrottleError::NotPrivileged(format!("missing {}", cap)));
        }
    }

    Ok(())
}

/// Number of online logical CPUs (`sysconf(_SC_NPROCESSORS_ONLN)`)
pub fn online_cpus() -> i64 {
    // SAFETY: sysconf has no preconditions.
    unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) as i64 }
}

/// Refuse to run unless exactly one CPU is online
pub fn check_topology(online: i64) -> Result<()> {
    if online != 1 {
        return Err(ThrottleError::UnsupportedTopology { online });
    }
    Ok(())
}

pub fn check_single_cpu() -> Result<()> {
    check_topology(online_cpus())
}

/// Set this process's nice value
pub fn raise_priority(priority: i32) -> Result<()> {
    // SAFETY: setpriority only affects the calling process (who = 0).
    let ret = unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, priority) };
    if ret == -1 {
        return Err(ThrottleError::Priority(io::Error::last_os_error()));
    }
    debug!(priority, "scheduling priority raised");
    Ok(())
}

/// Map SIGINT, SIGQUIT and SIGTERM to [`Shutdown::request`]
///
/// Listeners are registered before this returns; the waiting happens in a
/// spawned task, so a tokio runtime must be running.
pub fn listen_for_shutdown(shutdown: Shutdown) -> Result<()> {
    let mut interrupt = signal(SignalKind::interrupt()).map_err(ThrottleError::SignalSetup)?;
    let mut quit = signal(SignalKind::quit()).map_err(ThrottleError::SignalSetup)?;
    let mut terminate = signal(SignalKind::terminate()).map_err(ThrottleError::SignalSetup)?;

    tokio::spawn(async move {
        let name = tokio::select! {
            _ = interrupt.recv() => "SIGINT",
            _ = quit.recv() => "SIGQUIT",
            _ = terminate.recv() => "SIGTERM",
        };
        info!(signal = name, "shutdown requested");
        shutdown.request();
    });

    Ok(())
}
