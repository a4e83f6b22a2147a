//! Individual module passes

pub mod find_loops;
pub mod function_line_number;
pub mod function_names;
pub mod scoped_inline;

use crate::diagnostics::Diagnostics;
use crate::stats::PassStats;
use passforge_core::{Module, Result};

/// Trait for module passes
pub trait ModulePass: Send + Sync {
    /// Registered name of the pass
    fn name(&self) -> &str;

    /// Run the pass, returning whether the module changed
    fn run(&mut self, module: &mut Module, diag: &mut Diagnostics) -> Result<bool>;

    /// Check if the pass is applicable
    fn is_applicable(&self, module: &Module) -> bool {
        !module.functions.is_empty()
    }

    /// Statistics collected by the last run
    fn stats(&self) -> PassStats {
        PassStats::default()
    }
}

#[cfg(test)]
#[path = "passes_tests.rs"]
mod passes_tests;
