//! Error type for the throttler
//!
//! Every variant is fatal for the daemon. Per-process failures (a pid that
//! exited between listing and signalling) never become a `ThrottleError`;
//! they are skipped where they happen.

use std::io;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, ThrottleError>;

/// Fatal conditions that stop the daemon
#[derive(Debug)]
pub enum ThrottleError {
    /// Not running as root, or a required capability is missing
    NotPrivileged(String),
    /// More (or fewer) than one logical CPU is online
    UnsupportedTopology { online: i64 },
    /// The CPU accounting file could not be read
    StatUnavailable(io::Error),
    /// The CPU accounting line has no parsable idle counter
    MalformedStat(String),
    /// The process table directory could not be listed
    ProcTableUnavailable(io::Error),
    /// setpriority() failed
    Priority(io::Error),
    /// Shutdown signal listeners could not be installed
    SignalSetup(io::Error),
    /// Tunables are inconsistent
    InvalidConfig(String),
}

impl std::fmt::Display for ThrottleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThrottleError::NotPrivileged(msg) => write!(f, "must run as root: {}", msg),
            ThrottleError::UnsupportedTopology { online } => write!(
                f,
                "able to manage only one CPU, SMP not supported ({} online)",
                online
            ),
            ThrottleError::StatUnavailable(e) => write!(f, "cannot read CPU accounting: {}", e),
            ThrottleError::MalformedStat(line) => {
                write!(f, "malformed CPU accounting line: {:?}", line)
            }
            ThrottleError::ProcTableUnavailable(e) => {
                write!(f, "cannot list process table: {}", e)
            }
            ThrottleError::Priority(e) => write!(f, "cannot raise priority: {}", e),
            ThrottleError::SignalSetup(e) => write!(f, "cannot install signal handlers: {}", e),
            ThrottleError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ThrottleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ThrottleError::StatUnavailable(e)
            | ThrottleError::ProcTableUnavailable(e)
            | ThrottleError::Priority(e)
            | ThrottleError::SignalSetup(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_is_single_line() {
        let errors = [
            ThrottleError::NotPrivileged("euid 1000".to_string()),
            ThrottleError::UnsupportedTopology { online: 4 },
            ThrottleError::StatUnavailable(io::Error::from(io::ErrorKind::NotFound)),
            ThrottleError::MalformedStat("cpu 1 2\n".to_string()),
        ];
        for e in &errors {
            assert!(!e.to_string().contains('\n'), "{}", e);
        }
    }

    #[test]
    fn test_topology_message() {
        let e = ThrottleError::UnsupportedTopology { online: 2 };
        assert!(e.to_string().contains("SMP not supported"));
        assert!(e.source().is_none());
    }

    #[test]
    fn test_io_source_is_exposed() {
        let e = ThrottleError::StatUnavailable(io::Error::from(io::ErrorKind::NotFound));
        assert!(e.source().is_some());
    }
}
