//! Walking the process table

use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::PathBuf;

use nix::unistd::Pid;
use tracing::trace;

use super::set::ProcessSet;
use crate::error::{Result, ThrottleError};

/// Owner uid of the privileged account
const ROOT_UID: u32 = 0;

/// Read access to a process table
pub trait ProcessSource {
    /// Names of all entries in the table, numeric or not
    fn entry_names(&self) -> Result<Vec<String>>;

    /// Owner uid of a process, or None if it is gone
    fn owner_uid(&self, pid: Pid) -> Option<u32>;
}

/// The `/proc` pseudo-filesystem (or a directory laid out like it)
#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
}

impl ProcFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ProcessSource for ProcFs {
    fn entry_names(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(ThrottleError::ProcTableUnavailable)?;

        // Unreadable entries and non-UTF-8 names are never pids
        Ok(entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect())
    }

    fn owner_uid(&self, pid: Pid) -> Option<u32> {
        fs::metadata(self.root.join(pid.to_string()))
            .ok()
            .map(|meta| meta.uid())
    }
}

/// Parse a process table entry name as a pid
///
/// Only names made entirely of decimal digits qualify.
pub fn parse_pid(name: &str) -> Option<Pid> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match name.parse::<i32>() {
        Ok(raw) if raw > 0 => Some(Pid::from_raw(raw)),
        _ => None,
    }
}

/// Rebuild `set` with every unprivileged process in `source`
///
/// Entries that vanish before their owner can be looked up are skipped.
/// Once `set` is full, remaining qualifying pids are only counted.
pub fn enumerate<P: ProcessSource>(source: &P, set: &mut ProcessSet) -> Result<()> {
    set.clear();

    for name in source.entry_names()? {
        let Some(pid) = parse_pid(&name) else {
            continue;
        };

        match source.owner_uid(pid) {
            Some(uid) if uid > ROOT_UID => {
                set.push(pid);
            }
            Some(_) => {}
            None => trace!(pid = pid.as_raw(), "process exited during enumeration"),
        }
    }

    Ok(())
}
