//! Pass statistics tracking

use serde::{Deserialize, Serialize};
use std::fmt;

/// Counters collected while running passes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassStats {
    /// Number of function bodies visited
    pub functions_visited: usize,
    /// Number of functions found to contain a loop
    pub functions_with_loops: usize,
    /// Number of call sites handed to an inlining decision
    pub call_sites_considered: usize,
    /// Number of call sites inlined
    pub call_sites_inlined: usize,
    /// Number of functions deleted after inlining
    pub functions_removed: usize,
    /// Time spent running passes (microseconds)
    pub run_time_us: u64,
}

impl PassStats {
    /// Create new statistics tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge stats from another instance
    pub fn merge(&mut self, other: &PassStats) {
        self.functions_visited += other.functions_visited;
        self.functions_with_loops += other.functions_with_loops;
        self.call_sites_considered += other.call_sites_considered;
        self.call_sites_inlined += other.call_sites_inlined;
        self.functions_removed += other.functions_removed;
        self.run_time_us += other.run_time_us;
    }
}

impl fmt::Display for PassStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pass Statistics:")?;
        writeln!(f, "  Functions visited: {}", self.functions_visited)?;
        writeln!(f, "  Functions with loops: {}", self.functions_with_loops)?;
        writeln!(f, "  Call sites considered: {}", self.call_sites_considered)?;
        writeln!(f, "  Call sites inlined: {}", self.call_sites_inlined)?;
        writeln!(f, "  Functions removed: {}", self.functions_removed)?;
        writeln!(f, "  Time: {:.3}ms", self.run_time_us as f64 / 1000.0)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod stats_tests;
