//! Parsing of the aggregate `cpu` line of `/proc/stat`

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use crate::error::{Result, ThrottleError};

/// Tick rate assumed when sysconf cannot report one (Linux USER_HZ)
const DEFAULT_CLK_TCK: u64 = 100;

/// Source of the kernel-wide CPU accounting line
pub trait StatSource {
    /// Return the first line of the accounting file
    fn read_cpu_line(&mut self) -> Result<String>;
}

/// Reads the accounting line from a `stat` file on disk
#[derive(Debug, Clone)]
pub struct ProcStat {
    path: PathBuf,
}

impl ProcStat {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StatSource for ProcStat {
    fn read_cpu_line(&mut self) -> Result<String> {
        let file = File::open(&self.path).map_err(ThrottleError::StatUnavailable)?;
        let mut line = String::new();
        let read = BufReader::new(file)
            .read_line(&mut line)
            .map_err(ThrottleError::StatUnavailable)?;
        if read == 0 {
            return Err(ThrottleError::StatUnavailable(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("{} is empty", self.path.display()),
            )));
        }
        Ok(line)
    }
}

/// Counters from the aggregate `cpu` line, in clock ticks
///
/// Only `idle` feeds the control law; the other counters are read but unused.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CpuStat {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuStat {
    /// Parse `cpu  user nice system idle [iowait irq softirq steal ...]`
    ///
    /// The idle field (5th token) must be present and numeric. Other fields
    /// read as 0 when absent or unparsable.
    pub fn parse(line: &str) -> Result<Self> {
        let malformed = || ThrottleError::MalformedStat(line.trim_end().to_string());

        let mut words = line.split_whitespace();
        match words.next() {
            Some(label) if label.starts_with("cpu") => {}
            _ => return Err(malformed()),
        }

        let fields: Vec<&str> = words.collect();
        let field = |i: usize| -> u64 {
            fields
                .get(i)
                .and_then(|word| word.parse().ok())
                .unwrap_or(0)
        };

        let idle = fields
            .get(3)
            .and_then(|word| word.parse::<u64>().ok())
            .ok_or_else(malformed)?;

        Ok(Self {
            user: field(0),
            nice: field(1),
            system: field(2),
            idle,
            iowait: field(4),
            irq: field(5),
            softirq: field(6),
            steal: field(7),
        })
    }
}

/// Kernel clock ticks per second (`sysconf(_SC_CLK_TCK)`)
pub fn clock_ticks_per_sec() -> u64 {
    // SAFETY: sysconf has no preconditions and only reads a constant.
    let ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
    if ticks > 0 {
        ticks as u64
    } else {
        DEFAULT_CLK_TCK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_line() {
        let stat = CpuStat::parse("cpu  4705 356 584 3699176 23060 0 277 0 0 0\n").unwrap();
        assert_eq!(stat.user, 4705);
        assert_eq!(stat.nice, 356);
        assert_eq!(stat.system, 584);
        assert_eq!(stat.idle, 3699176);
        assert_eq!(stat.iowait, 23060);
        assert_eq!(stat.softirq, 277);
    }

    #[test]
    fn test_parse_old_kernel_line() {
        // 2.4 kernels only report four counters
        let stat = CpuStat::parse("cpu 10 20 30 40").unwrap();
        assert_eq!(stat.idle, 40);
        assert_eq!(stat.iowait, 0);
    }

    #[test]
    fn test_parse_rejects_missing_idle() {
        assert!(matches!(
            CpuStat::parse("cpu 10 20 30\n"),
            Err(ThrottleError::MalformedStat(_))
        ));
        assert!(CpuStat::parse("cpu 10 20 30 idle").is_err());
        assert!(CpuStat::parse("intr 1 2 3 4 5").is_err());
        assert!(CpuStat::parse("").is_err());
    }

    #[test]
    fn test_proc_stat_missing_file() {
        let mut source = ProcStat::new("/nonexistent/microthrottle/stat");
        assert!(matches!(
            source.read_cpu_line(),
            Err(ThrottleError::StatUnavailable(_))
        ));
    }

    #[test]
    fn test_proc_stat_reads_first_line_only() {
        let path = std::env::temp_dir().join(format!("microthrottle-stat-{}", std::process::id()));
        std::fs::write(&path, "cpu  1 2 3 4 5\ncpu0 1 2 3 4 5\nintr 0\n").unwrap();

        let mut source = ProcStat::new(&path);
        let line = source.read_cpu_line().unwrap();
        assert_eq!(line, "cpu  1 2 3 4 5\n");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_clock_ticks_positive() {
        assert!(clock_ticks_per_sec() > 0);
    }
}
