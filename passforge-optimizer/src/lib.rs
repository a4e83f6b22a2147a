//! Passforge analysis and transformation passes
//!
//! This crate provides the module passes (`find-loops`, `function-names`,
//! `function-line-number` and the scoped inliner `all-inline`), the analyses
//! they consume and the machinery to run them by name.

pub mod analysis;
pub mod diagnostics;
pub mod inliner;
pub mod passes;
pub mod pipeline;
pub mod registry;
pub mod stats;

pub use analysis::{CallGraph, InlineCostAnalysis, LoopInfo, ModuleLoopInfo, Viability};
pub use diagnostics::{escape_name, Diagnostics, Sink};
pub use inliner::{
    DeadFunctionCleanup, InlineContext, InlineCost, InlinePolicy, InlineReport, Inliner,
    InlinerConfig, DEFAULT_INLINE_THRESHOLD,
};
pub use passes::find_loops::FindLoopsPass;
pub use passes::function_line_number::FunctionLineNumberPass;
pub use passes::function_names::FunctionNamesPass;
pub use passes::scoped_inline::{ScopedInlinePass, ScopedInlinePolicy};
pub use passes::ModulePass;
pub use pipeline::{PassPipeline, PipelineConfig};
pub use registry::{PassOptions, PassRegistration, PassRegistry};
pub use stats::PassStats;
