//! Program analysis infrastructure for passes

pub mod call_graph;
pub mod inline_cost;
pub mod loops;

pub use call_graph::CallGraph;
pub use inline_cost::{InlineCostAnalysis, Viability};
pub use loops::{Loop, LoopInfo, ModuleLoopInfo};

#[cfg(test)]
#[path = "analysis_tests.rs"]
mod analysis_tests;
