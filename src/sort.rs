//! Orderings for process listings.
//!
//! A [`SortKey`] names the active ordering policy. Every key maps to a
//! descending predicate over [`Process`] records, so the most
//! resource-intensive processes come first.
use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::record::Process;

/// The ordering applied to process listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Descending by resident memory.
    #[default]
    ResidentMemory,
    /// Descending by accumulated CPU time.
    CpuTime,
}

impl SortKey {
    /// Looks up a key by its command-line name (`rss` or `cpu`).
    ///
    /// Unknown names map to the default key instead of failing.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "cpu" => SortKey::CpuTime,
            "rss" => SortKey::ResidentMemory,
            other => {
                log::debug!("unknown sort key `{other}`, using `rss`");
                SortKey::default()
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SortKey::ResidentMemory => "rss",
            SortKey::CpuTime => "cpu",
        }
    }

    /// Returns true if `a` sorts before `b`, i.e. `a` is the more
    /// resource-intensive of the two.
    pub fn less(self, a: &Process, b: &Process) -> bool {
        match self {
            SortKey::ResidentMemory => a.resident_memory > b.resident_memory,
            SortKey::CpuTime => cpu_rank(a) > cpu_rank(b),
        }
    }

    /// Total ordering derived from [`SortKey::less`]; records neither less
    /// nor greater than each other compare equal.
    pub fn ordering(self, a: &Process, b: &Process) -> Ordering {
        if self.less(a, b) {
            Ordering::Less
        } else if self.less(b, a) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    /// Sorts `processes` in place. Records with equal keys keep their
    /// relative order.
    pub fn sort(self, processes: &mut [Process]) {
        processes.sort_by(|a, b| self.ordering(a, b));
    }
}

/// CPU time with `NaN` mapped below every real value, so ranks compare as a
/// total order and unmeasured processes sink to the bottom.
fn cpu_rank(process: &Process) -> f64 {
    if process.cpu_time.is_nan() {
        f64::NEG_INFINITY
    } else {
        process.cpu_time
    }
}

impl FromStr for SortKey {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SortKey::from_name(s))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
