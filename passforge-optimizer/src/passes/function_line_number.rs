//! Report where a named function is defined

use crate::diagnostics::Diagnostics;
use crate::passes::ModulePass;
use crate::stats::PassStats;
use passforge_core::{DebugInfoQuery, Error, Module, Result};
use tracing::debug;

/// Printed when the function exists but debug metadata does not describe it
pub const NO_DEBUG_INFO_MESSAGE: &str = "Code has no debugging information! Compile with -g.";

/// Print `directory/filename line` for the defined function named
/// `function_name` on the out stream, or [`NO_DEBUG_INFO_MESSAGE`] when no
/// subprogram describes it. Prints nothing when no such function exists.
/// Returns whether the function was found.
pub fn report_function_location(
    module: &Module,
    function_name: &str,
    debug_info: &impl DebugInfoQuery,
    diag: &mut Diagnostics,
) -> Result<bool> {
    let Some(function) = module
        .defined_functions()
        .find(|f| f.name == function_name)
    else {
        debug!(function = function_name, "no function with this name");
        return Ok(false);
    };

    match debug_info.function_location(&function.name) {
        Some(location) => diag.out(location)?,
        None => diag.out(NO_DEBUG_INFO_MESSAGE)?,
    }
    Ok(true)
}

/// Function line number pass: prints the line number and the path to the
/// source file where the configured function is defined
pub struct FunctionLineNumberPass {
    function_name: String,
    stats: PassStats,
}

impl FunctionLineNumberPass {
    /// Fails with [`Error::MissingOption`] when no function name is given
    pub fn new(function_name: Option<String>) -> Result<Self> {
        let function_name = function_name
            .filter(|name| !name.is_empty())
            .ok_or(Error::MissingOption("function-name"))?;
        Ok(Self {
            function_name,
            stats: PassStats::new(),
        })
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }
}

impl ModulePass for FunctionLineNumberPass {
    fn name(&self) -> &str {
        "function-line-number"
    }

    fn run(&mut self, module: &mut Module, diag: &mut Diagnostics) -> Result<bool> {
        let module: &Module = module;
        report_function_location(module, &self.function_name, module, diag)?;
        self.stats = PassStats {
            functions_visited: module.defined_functions().count(),
            ..PassStats::default()
        };
        Ok(false)
    }

    fn stats(&self) -> PassStats {
        self.stats.clone()
    }
}
