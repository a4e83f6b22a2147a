//! Query interfaces passes consume from their host
//!
//! Passes never build analyses themselves; they receive something that
//! answers these queries. `passforge-optimizer` provides the reference
//! implementations.

use crate::debug_info::SourceLocation;
use crate::ir::{CallSite, Function, Module};

/// Loop structure query
pub trait LoopQuery {
    /// Does the named function contain at least one loop?
    fn has_loops(&self, function: &str) -> bool;
}

/// Call graph query
pub trait CallGraphQuery {
    /// Strongly-connected components, callees before callers
    fn bottom_up_sccs(&self) -> &[Vec<String>];

    /// Call sites whose caller is the named function
    fn call_sites(&self, caller: &str) -> &[CallSite];

    /// Number of references to the named function: direct calls plus address-takes
    fn use_count(&self, function: &str) -> usize;
}

/// Structural inline viability query
pub trait InlineViability {
    /// Can this body be legally duplicated into a call site?
    fn is_inline_viable(&self, callee: &Function) -> bool;
}

/// Debug metadata query
pub trait DebugInfoQuery {
    /// Definition site of the named function, if debug metadata describes it
    fn function_location(&self, function: &str) -> Option<SourceLocation>;
}

impl DebugInfoQuery for Module {
    fn function_location(&self, function: &str) -> Option<SourceLocation> {
        self.debug_info.as_ref()?.function_location(function)
    }
}

impl<T: LoopQuery + ?Sized> LoopQuery for &T {
    fn has_loops(&self, function: &str) -> bool {
        (**self).has_loops(function)
    }
}

#[cfg(test)]
#[path = "traits_tests.rs"]
mod traits_tests;
