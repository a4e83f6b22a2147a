//! Inliner scoped to one caller
//!
//! Every viable direct call made from the configured function is inlined
//! regardless of cost. Calls made from any other function are left alone.

use crate::diagnostics::Diagnostics;
use crate::inliner::{
    DeadFunctionCleanup, InlineContext, InlineCost, InlinePolicy, Inliner, InlinerConfig,
};
use crate::passes::ModulePass;
use crate::stats::PassStats;
use passforge_core::ir::CallSite;
use passforge_core::{Error, InlineViability, Module, Result};
use tracing::{debug, info};

/// Option naming the function whose call sites are inlined
pub const TARGET_OPTION: &str = "inline-only-in-function";

/// Decision policy: `Always` for viable direct calls from the target, `Never`
/// for everything else
#[derive(Debug, Clone)]
pub struct ScopedInlinePolicy {
    target: String,
}

impl ScopedInlinePolicy {
    /// Fails with [`Error::MissingOption`] when the target is unset or empty
    pub fn new(target: Option<String>) -> Result<Self> {
        let target = target
            .filter(|name| !name.is_empty())
            .ok_or(Error::MissingOption(TARGET_OPTION))?;
        Ok(Self { target })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Classify one call site. Recomputed on every call.
    pub fn decide(
        &self,
        site: &CallSite,
        module: &Module,
        viability: &dyn InlineViability,
    ) -> InlineCost {
        if site.caller != self.target {
            return InlineCost::Never;
        }
        let Some(callee) = site.callee.as_deref().and_then(|name| module.function(name)) else {
            return InlineCost::Never;
        };
        if callee.is_declaration() || !viability.is_inline_viable(callee) {
            return InlineCost::Never;
        }
        InlineCost::Always
    }
}

impl InlinePolicy for ScopedInlinePolicy {
    fn inline_cost(
        &mut self,
        site: &CallSite,
        ctx: &InlineContext<'_>,
        diag: &mut Diagnostics,
    ) -> Result<InlineCost> {
        let cost = self.decide(site, ctx.module, ctx.viability);
        if cost.is_always() {
            if let Some(callee) = &site.callee {
                diag.err(format_args!("inlining '{}' into '{}'", callee, site.caller))?;
            }
        }
        Ok(cost)
    }
}

/// `all-inline`: the scoped inliner as a module pass
pub struct ScopedInlinePass {
    inliner: Inliner<ScopedInlinePolicy>,
    stats: PassStats,
}

impl ScopedInlinePass {
    pub fn new(target: Option<String>) -> Result<Self> {
        let policy = ScopedInlinePolicy::new(target)?;
        let config = InlinerConfig {
            cleanup: DeadFunctionCleanup::AlwaysInlinedOnly,
            ..InlinerConfig::default()
        };
        Ok(Self {
            inliner: Inliner::with_config(policy, config),
            stats: PassStats::new(),
        })
    }

    pub fn target(&self) -> &str {
        self.inliner.policy().target()
    }
}

impl ModulePass for ScopedInlinePass {
    fn name(&self) -> &str {
        "all-inline"
    }

    fn run(&mut self, module: &mut Module, diag: &mut Diagnostics) -> Result<bool> {
        if !module.contains(self.target()) {
            debug!(function = self.target(), "target function not in module");
        }

        let report = self.inliner.run(module, diag)?;
        info!(
            function = self.target(),
            inlined = report.inlined.len(),
            removed = report.removed.len(),
            "scoped inlining finished"
        );

        self.stats = PassStats {
            functions_visited: module.defined_functions().count(),
            call_sites_considered: report.call_sites_considered,
            call_sites_inlined: report.inlined.len(),
            functions_removed: report.removed.len(),
            ..PassStats::default()
        };
        Ok(report.changed())
    }

    fn stats(&self) -> PassStats {
        self.stats.clone()
    }
}
