//! Report every function name

use crate::diagnostics::{escape_name, Diagnostics};
use crate::passes::ModulePass;
use crate::stats::PassStats;
use passforge_core::{Module, Result};

/// Print the name of every defined function on the err stream, in module
/// order. Returns how many were printed.
pub fn report_function_names(module: &Module, diag: &mut Diagnostics) -> Result<usize> {
    let mut count = 0;
    for function in module.defined_functions() {
        diag.err(escape_name(&function.name))?;
        count += 1;
    }
    Ok(count)
}

/// Function names pass: prints a list of all functions
pub struct FunctionNamesPass {
    stats: PassStats,
}

impl FunctionNamesPass {
    pub fn new() -> Self {
        Self {
            stats: PassStats::new(),
        }
    }
}

impl Default for FunctionNamesPass {
    fn default() -> Self {
        Self::new()
    }
}

impl ModulePass for FunctionNamesPass {
    fn name(&self) -> &str {
        "function-names"
    }

    fn run(&mut self, module: &mut Module, diag: &mut Diagnostics) -> Result<bool> {
        let count = report_function_names(module, diag)?;
        self.stats = PassStats {
            functions_visited: count,
            ..PassStats::default()
        };
        Ok(false)
    }

    fn stats(&self) -> PassStats {
        self.stats.clone()
    }
}
