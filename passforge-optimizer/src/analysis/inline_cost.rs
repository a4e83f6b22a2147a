//! Structural inline viability

use passforge_core::ir::{Callee, Function, Module, Terminator};
use passforge_core::InlineViability;
use rustc_hash::FxHashSet;
use std::fmt;

/// Outcome of the viability check, with the disqualifying construct if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viability {
    Viable,
    /// Body is not available in this module
    Declaration,
    /// Uses a variable argument list
    Variadic,
    /// Contains a branch to a computed block address
    IndirectBranch,
    /// Calls itself directly
    Recursive,
    /// Calls a function that may return more than once
    ReturnsTwice(String),
}

impl fmt::Display for Viability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Viability::Viable => write!(f, "viable"),
            Viability::Declaration => write!(f, "no body available"),
            Viability::Variadic => write!(f, "variadic function"),
            Viability::IndirectBranch => write!(f, "contains an indirect branch"),
            Viability::Recursive => write!(f, "recursive function"),
            Viability::ReturnsTwice(callee) => write!(f, "calls returns_twice function {}", callee),
        }
    }
}

/// Inline viability over one module
///
/// Holds the module-level facts the per-body check needs (which functions
/// return twice), so the check itself only looks at the callee body.
#[derive(Debug, Clone, Default)]
pub struct InlineCostAnalysis {
    returns_twice: FxHashSet<String>,
}

impl InlineCostAnalysis {
    pub fn new(module: &Module) -> Self {
        let returns_twice = module
            .functions
            .iter()
            .filter(|f| f.attributes.returns_twice)
            .map(|f| f.name.clone())
            .collect();
        Self { returns_twice }
    }

    /// Classify a callee body
    pub fn viability(&self, callee: &Function) -> Viability {
        if callee.is_declaration() {
            return Viability::Declaration;
        }
        if callee.attributes.variadic {
            return Viability::Variadic;
        }

        for block in &callee.blocks {
            if matches!(block.terminator, Terminator::IndirectJump { .. }) {
                return Viability::IndirectBranch;
            }
            for inst in &block.insts {
                let Some(Callee::Direct(name)) = inst.callee() else {
                    continue;
                };
                if *name == callee.name {
                    return Viability::Recursive;
                }
                if self.returns_twice.contains(name) {
                    return Viability::ReturnsTwice(name.clone());
                }
            }
        }

        Viability::Viable
    }
}

impl InlineViability for InlineCostAnalysis {
    fn is_inline_viable(&self, callee: &Function) -> bool {
        self.viability(callee) == Viability::Viable
    }
}
