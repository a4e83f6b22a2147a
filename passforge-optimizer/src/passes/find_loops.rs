//! Report functions that contain a loop

use crate::analysis::ModuleLoopInfo;
use crate::diagnostics::{escape_name, Diagnostics};
use crate::passes::ModulePass;
use crate::stats::PassStats;
use passforge_core::{LoopQuery, Module, Result};
use tracing::debug;

/// Print the name of every defined function with at least one loop on the
/// err stream. Returns how many were printed.
pub fn report_functions_with_loops(
    module: &Module,
    loops: &impl LoopQuery,
    diag: &mut Diagnostics,
) -> Result<usize> {
    let mut count = 0;
    for function in module.defined_functions() {
        if loops.has_loops(&function.name) {
            diag.err(escape_name(&function.name))?;
            count += 1;
        }
    }
    Ok(count)
}

/// Find loops pass: prints a list of all functions with loops
pub struct FindLoopsPass {
    stats: PassStats,
}

impl FindLoopsPass {
    pub fn new() -> Self {
        Self {
            stats: PassStats::new(),
        }
    }
}

impl Default for FindLoopsPass {
    fn default() -> Self {
        Self::new()
    }
}

impl ModulePass for FindLoopsPass {
    fn name(&self) -> &str {
        "find-loops"
    }

    fn run(&mut self, module: &mut Module, diag: &mut Diagnostics) -> Result<bool> {
        let loops = ModuleLoopInfo::compute(module);
        let found = report_functions_with_loops(module, &loops, diag)?;
        debug!(found, "find-loops finished");

        self.stats = PassStats {
            functions_visited: module.defined_functions().count(),
            functions_with_loops: found,
            ..PassStats::default()
        };
        Ok(false)
    }

    fn stats(&self) -> PassStats {
        self.stats.clone()
    }
}
