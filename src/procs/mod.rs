//! Process table enumeration
//!
//! Every quantum the throttler rebuilds the set of processes it is allowed to
//! freeze: everything in `/proc` with a numeric name whose owner is not root.
//!
//! ```text
//! /proc/
//! ├── 1/          ← uid 0, skipped
//! ├── 812/        ← uid 1000, managed
//! ├── 813/        ← exited before stat(), skipped
//! ├── self -> 4242
//! └── stat        ← not numeric, skipped
//! ```
//!
//! Processes owned by root are never touched, which keeps this daemon,
//! init, and the rest of the system plumbing running.

pub mod set;
pub mod table;

pub use set::ProcessSet;
pub use table::{enumerate, parse_pid, ProcFs, ProcessSource};
