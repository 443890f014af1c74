//! Bounded, ordered set of managed process ids

use nix::unistd::Pid;

/// Process ids to freeze during one quantum
///
/// Capacity policy: once full, further pids are dropped and counted in
/// `truncated`; the quantum proceeds with the pids already collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSet {
    pids: Vec<Pid>,
    capacity: usize,
    truncated: usize,
}

impl ProcessSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pids: Vec::with_capacity(capacity),
            capacity,
            truncated: 0,
        }
    }

    /// Append a pid; returns false (and counts it) when the set is full
    pub fn push(&mut self, pid: Pid) -> bool {
        if self.is_full() {
            self.truncated += 1;
            return false;
        }
        self.pids.push(pid);
        true
    }

    pub fn is_full(&self) -> bool {
        self.pids.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.pids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pids.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Qualifying pids left out because the set was full
    pub fn truncated(&self) -> usize {
        self.truncated
    }

    pub fn iter(&self) -> impl Iterator<Item = Pid> + '_ {
        self.pids.iter().copied()
    }

    pub fn as_slice(&self) -> &[Pid] {
        &self.pids
    }

    /// Empty the set for the next rebuild, keeping the allocation
    pub fn clear(&mut self) {
        self.pids.clear();
        self.truncated = 0;
    }
}
