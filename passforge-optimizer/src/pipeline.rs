//! Pass pipeline management

use crate::diagnostics::Diagnostics;
use crate::passes::ModulePass;
use crate::registry::{PassOptions, PassRegistry};
use crate::stats::PassStats;
use passforge_core::{Module, Result};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Pipeline configuration: pass names in run order plus their options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub passes: Vec<String>,
    #[serde(flatten)]
    pub options: PassOptions,
}

/// Ordered list of module passes
pub struct PassPipeline {
    passes: Vec<Box<dyn ModulePass>>,
    stats: PassStats,
}

impl PassPipeline {
    /// Empty pipeline
    pub fn new() -> Self {
        Self {
            passes: Vec::new(),
            stats: PassStats::new(),
        }
    }

    /// Construct every configured pass up front, so a missing option fails
    /// before any pass runs
    pub fn from_config(config: &PipelineConfig, registry: &PassRegistry) -> Result<Self> {
        let mut pipeline = Self::new();
        for name in &config.passes {
            pipeline.add_pass(registry.create(name, &config.options)?);
        }
        Ok(pipeline)
    }

    /// Add a pass at the end
    pub fn add_pass(&mut self, pass: Box<dyn ModulePass>) {
        self.passes.push(pass);
    }

    /// Run each applicable pass once, in order. Returns whether any pass
    /// changed the module.
    pub fn run(&mut self, module: &mut Module, diag: &mut Diagnostics) -> Result<bool> {
        let start = Instant::now();
        self.stats = PassStats::new();
        let mut changed = false;

        for pass in &mut self.passes {
            if !pass.is_applicable(module) {
                debug!(pass = pass.name(), "pass not applicable; skipping");
                continue;
            }
            debug!(pass = pass.name(), "running pass");
            changed |= pass.run(module, diag)?;
            self.stats.merge(&pass.stats());
        }

        self.stats.run_time_us = start.elapsed().as_micros() as u64;
        info!(passes = self.passes.len(), changed, "pipeline finished");
        Ok(changed)
    }

    /// Statistics of the last run
    pub fn stats(&self) -> &PassStats {
        &self.stats
    }

    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }
}

impl Default for PassPipeline {
    fn default() -> Self {
        Self::new()
    }
}
