//! Generic bottom-up inliner
//!
//! Walks the call graph callees-first, one strongly-connected component at a
//! time, asks an injected [`InlinePolicy`] for a verdict on every call site
//! and splices the callee body into the caller when the verdict allows it.
//! Call sites exposed by an inlined body are considered in turn. After the
//! walk, functions made dead by inlining are removed according to the
//! configured [`DeadFunctionCleanup`].

use crate::analysis::{CallGraph, InlineCostAnalysis};
use crate::diagnostics::Diagnostics;
use passforge_core::ir::{
    Block, BlockId, CallSite, Callee, Inst, Linkage, Module, Operand, Terminator, ValueId,
};
use passforge_core::{CallGraphQuery, Error, InlineViability, Result};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

/// Default cost threshold below which a graduated cost is inlined
pub const DEFAULT_INLINE_THRESHOLD: i32 = 225;

/// Verdict for one call site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineCost {
    /// Inline regardless of cost
    Always,
    /// Never inline
    Never,
    /// Inline when the cost is below the inliner's threshold
    Cost(i32),
}

impl InlineCost {
    pub fn is_always(&self) -> bool {
        matches!(self, InlineCost::Always)
    }

    pub fn is_never(&self) -> bool {
        matches!(self, InlineCost::Never)
    }

    /// Apply the threshold to this verdict
    pub fn should_inline(&self, threshold: i32) -> bool {
        match self {
            InlineCost::Always => true,
            InlineCost::Never => false,
            InlineCost::Cost(cost) => *cost < threshold,
        }
    }
}

/// What a policy can see when deciding on a call site
pub struct InlineContext<'a> {
    pub module: &'a Module,
    pub viability: &'a dyn InlineViability,
}

/// Injected decision capability
pub trait InlinePolicy: Send + Sync {
    /// Verdict for one call site. Called once per call site.
    fn inline_cost(
        &mut self,
        site: &CallSite,
        ctx: &InlineContext<'_>,
        diag: &mut Diagnostics,
    ) -> Result<InlineCost>;
}

impl<F> InlinePolicy for F
where
    F: FnMut(&CallSite, &InlineContext<'_>) -> InlineCost + Send + Sync,
{
    fn inline_cost(
        &mut self,
        site: &CallSite,
        ctx: &InlineContext<'_>,
        _diag: &mut Diagnostics,
    ) -> Result<InlineCost> {
        Ok(self(site, ctx))
    }
}

/// Which dead functions are deleted once all components are processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadFunctionCleanup {
    /// Keep every function
    Disabled,
    /// Delete only functions that were inlined through an `Always` verdict
    AlwaysInlinedOnly,
    /// Delete every unreferenced internal function
    All,
}

/// Inliner configuration
#[derive(Debug, Clone)]
pub struct InlinerConfig {
    /// Threshold applied to [`InlineCost::Cost`] verdicts
    pub threshold: i32,
    /// Dead-function cleanup mode applied at finalization
    pub cleanup: DeadFunctionCleanup,
}

impl Default for InlinerConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_INLINE_THRESHOLD,
            cleanup: DeadFunctionCleanup::AlwaysInlinedOnly,
        }
    }
}

/// Summary of one inliner run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineReport {
    /// Call sites handed to the policy
    pub call_sites_considered: usize,
    /// `(caller, callee)` for each inlined call site, in inlining order
    pub inlined: Vec<(String, String)>,
    /// Functions deleted at finalization
    pub removed: Vec<String>,
}

impl InlineReport {
    pub fn changed(&self) -> bool {
        !self.inlined.is_empty() || !self.removed.is_empty()
    }
}

/// Pending call site plus the inline history that produced it
struct PendingSite {
    site: CallSite,
    history: Option<usize>,
}

/// Generic inliner parameterized by its decision policy
pub struct Inliner<P: InlinePolicy> {
    policy: P,
    config: InlinerConfig,
}

impl<P: InlinePolicy> Inliner<P> {
    pub fn new(policy: P) -> Self {
        Self::with_config(policy, InlinerConfig::default())
    }

    pub fn with_config(policy: P, config: InlinerConfig) -> Self {
        Self { policy, config }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn config(&self) -> &InlinerConfig {
        &self.config
    }

    /// Run over every component bottom-up, then finalize
    pub fn run(&mut self, module: &mut Module, diag: &mut Diagnostics) -> Result<InlineReport> {
        let graph = CallGraph::build(module);
        let mut report = InlineReport::default();
        let mut always_inlined: FxHashSet<String> = FxHashSet::default();

        for scc in graph.bottom_up_sccs() {
            trace!(functions = ?scc, "visiting call graph component");
            self.run_on_scc(scc, &graph, module, diag, &mut report, &mut always_inlined)?;
        }

        report.removed = self.remove_dead_functions(module, &always_inlined);
        Ok(report)
    }

    fn run_on_scc(
        &mut self,
        scc: &[String],
        graph: &CallGraph,
        module: &mut Module,
        diag: &mut Diagnostics,
        report: &mut InlineReport,
        always_inlined: &mut FxHashSet<String>,
    ) -> Result<()> {
        // Viability facts do not change while inlining: no function is added
        // and attributes are untouched.
        let viability = InlineCostAnalysis::new(module);

        for caller in scc {
            // A caller's body only changes while its own component is
            // visited, so the graph's sites are still current here.
            // Popped last-first so splitting a block never invalidates a
            // site that is still pending.
            let mut pending: Vec<PendingSite> = graph
                .call_sites(caller)
                .iter()
                .cloned()
                .map(|site| PendingSite { site, history: None })
                .collect();
            let mut history: Vec<(String, Option<usize>)> = Vec::new();

            while let Some(PendingSite { site, history: site_history }) = pending.pop() {
                if let Some(callee) = &site.callee {
                    if history_includes(&history, site_history, callee) {
                        trace!(%site, "skipping call site already on the inline history");
                        continue;
                    }
                }

                report.call_sites_considered += 1;
                let cost = {
                    let ctx = InlineContext {
                        module: &*module,
                        viability: &viability,
                    };
                    self.policy.inline_cost(&site, &ctx, diag)?
                };
                if !cost.should_inline(self.config.threshold) {
                    continue;
                }
                let Some(callee) = site.callee.clone() else {
                    continue;
                };
                if module.function(&callee).map_or(true, |f| f.is_declaration()) {
                    trace!(%site, "policy accepted a call site without a body; skipping");
                    continue;
                }

                let exposed = inline_call_site(module, &site)?;
                debug!(caller = %site.caller, callee = %callee, "inlined call site");

                history.push((callee.clone(), site_history));
                let history_id = history.len() - 1;
                pending.extend(exposed.into_iter().map(|site| PendingSite {
                    site,
                    history: Some(history_id),
                }));

                if cost.is_always() {
                    always_inlined.insert(callee.clone());
                }
                report.inlined.push((site.caller.clone(), callee));
            }
        }

        Ok(())
    }

    /// Delete unreferenced internal functions allowed by the cleanup mode.
    ///
    /// Repeats until nothing changes, since deleting a function can drop the
    /// last reference to another candidate.
    fn remove_dead_functions(
        &self,
        module: &mut Module,
        always_inlined: &FxHashSet<String>,
    ) -> Vec<String> {
        let mut removed = Vec::new();
        if self.config.cleanup == DeadFunctionCleanup::Disabled {
            return removed;
        }

        loop {
            let graph = CallGraph::build(module);
            let dead: Vec<String> = module
                .functions
                .iter()
                .filter(|f| !f.is_declaration() && f.linkage == Linkage::Internal)
                .filter(|f| match self.config.cleanup {
                    DeadFunctionCleanup::AlwaysInlinedOnly => always_inlined.contains(&f.name),
                    _ => true,
                })
                .filter(|f| graph.use_count(&f.name) == 0)
                .map(|f| f.name.clone())
                .collect();

            if dead.is_empty() {
                break;
            }
            for name in dead {
                debug!(function = %name, "removing dead function");
                module.remove_function(&name);
                removed.push(name);
            }
        }

        removed
    }
}

fn history_includes(
    history: &[(String, Option<usize>)],
    mut id: Option<usize>,
    callee: &str,
) -> bool {
    while let Some(index) = id {
        let (name, parent) = &history[index];
        if name == callee {
            return true;
        }
        id = *parent;
    }
    false
}

/// Splice the callee body into the caller at `site`.
///
/// The caller block is split after the call: the head jumps into a renamed
/// copy of the callee, every callee return copies its value into the call's
/// destination and jumps to the tail. Returns the call sites of the copied
/// body.
pub fn inline_call_site(module: &mut Module, site: &CallSite) -> Result<Vec<CallSite>> {
    let callee_name = site
        .callee
        .as_deref()
        .ok_or_else(|| Error::InvalidModule(format!("cannot inline indirect call {}", site)))?;
    let callee = module
        .function(callee_name)
        .cloned()
        .ok_or_else(|| Error::UnknownFunction(callee_name.to_string()))?;
    let callee_entry = callee
        .entry()
        .map(|b| b.id)
        .ok_or_else(|| Error::InvalidModule(format!("{} has no body to inline", callee.name)))?;
    let caller = module
        .function_mut(&site.caller)
        .ok_or_else(|| Error::UnknownFunction(site.caller.clone()))?;

    let block_index = caller.block_index(site.block).ok_or_else(|| Error::UnknownBlock {
        function: site.caller.clone(),
        block: site.block,
    })?;

    let (value_base, _) =
        renumber_range(caller.next_value_id(), callee.next_value_id(), "register", site)?;
    // callee blocks plus the continuation, which takes the last id
    let (block_base, continuation) = renumber_range(
        caller.next_block_id(),
        callee.next_block_id() + 1,
        "block",
        site,
    )?;
    let continuation = BlockId(continuation);
    let map_value = |v: ValueId| ValueId(value_base + v.0);
    let map_block = |b: BlockId| BlockId(block_base + b.0);

    // Split the call block
    let block = &mut caller.blocks[block_index];
    let (dest, args) = match block.insts.get(site.index) {
        Some(Inst::Call {
            dest,
            callee: Callee::Direct(name),
            args,
        }) if name == callee_name => (*dest, args.clone()),
        _ => {
            return Err(Error::InvalidModule(format!(
                "no call to {} at {}",
                callee_name, site
            )))
        }
    };
    let tail_insts = block.insts.split_off(site.index + 1);
    block.insts.pop();
    for (param, arg) in callee.params.iter().zip(args) {
        block.insts.push(Inst::Copy {
            dest: map_value(*param),
            src: arg,
        });
    }
    let tail_terminator = std::mem::replace(
        &mut block.terminator,
        Terminator::Jump {
            target: map_block(callee_entry),
        },
    );

    let map_operand = |operand: &Operand| match operand {
        Operand::Value(v) => Operand::Value(map_value(*v)),
        other => other.clone(),
    };

    let mut cloned: Vec<Block> = Vec::with_capacity(callee.blocks.len() + 1);
    for callee_block in &callee.blocks {
        let mut insts: Vec<Inst> = callee_block
            .insts
            .iter()
            .map(|inst| remap_inst(inst, &map_value, &map_operand))
            .collect();
        let terminator = match &callee_block.terminator {
            Terminator::Return { value } => {
                if let (Some(dest), Some(value)) = (dest, value) {
                    insts.push(Inst::Copy {
                        dest,
                        src: map_operand(value),
                    });
                }
                Terminator::Jump {
                    target: continuation,
                }
            }
            Terminator::Jump { target } => Terminator::Jump {
                target: map_block(*target),
            },
            Terminator::Branch {
                cond,
                then_block,
                else_block,
            } => Terminator::Branch {
                cond: map_operand(cond),
                then_block: map_block(*then_block),
                else_block: map_block(*else_block),
            },
            Terminator::IndirectJump {
                target,
                destinations,
            } => Terminator::IndirectJump {
                target: map_operand(target),
                destinations: destinations.iter().map(|b| map_block(*b)).collect(),
            },
            Terminator::Unreachable => Terminator::Unreachable,
        };
        cloned.push(Block {
            id: map_block(callee_block.id),
            insts,
            terminator,
        });
    }
    let cloned_ids: FxHashSet<BlockId> = cloned.iter().map(|b| b.id).collect();
    cloned.push(Block {
        id: continuation,
        insts: tail_insts,
        terminator: tail_terminator,
    });

    let insert_at = block_index + 1;
    caller.blocks.splice(insert_at..insert_at, cloned);

    let exposed = caller
        .call_sites()
        .into_iter()
        .filter(|s| cloned_ids.contains(&s.block))
        .collect();
    Ok(exposed)
}

/// First and last id of `span` fresh ids starting at `base`, or an error
/// when they do not fit in `u32`
fn renumber_range(base: u64, span: u64, kind: &str, site: &CallSite) -> Result<(u32, u32)> {
    let exhausted = || Error::InvalidModule(format!("{} ids exhausted inlining {}", kind, site));
    let end = base + span;
    if end > u64::from(u32::MAX) + 1 {
        return Err(exhausted());
    }
    let first = u32::try_from(base).map_err(|_| exhausted())?;
    let last = u32::try_from(end.saturating_sub(1)).map_err(|_| exhausted())?;
    Ok((first, last))
}

fn remap_inst(
    inst: &Inst,
    map_value: &impl Fn(ValueId) -> ValueId,
    map_operand: &impl Fn(&Operand) -> Operand,
) -> Inst {
    match inst {
        Inst::Const { dest, value } => Inst::Const {
            dest: map_value(*dest),
            value: *value,
        },
        Inst::Binary { dest, op, lhs, rhs } => Inst::Binary {
            dest: map_value(*dest),
            op: *op,
            lhs: map_operand(lhs),
            rhs: map_operand(rhs),
        },
        Inst::Copy { dest, src } => Inst::Copy {
            dest: map_value(*dest),
            src: map_operand(src),
        },
        Inst::Call { dest, callee, args } => Inst::Call {
            dest: dest.map(map_value),
            callee: match callee {
                Callee::Direct(name) => Callee::Direct(name.clone()),
                Callee::Indirect(target) => Callee::Indirect(map_operand(target)),
            },
            args: args.iter().map(map_operand).collect(),
        },
    }
}

#[cfg(test)]
#[path = "inliner_tests.rs"]
mod tests;
