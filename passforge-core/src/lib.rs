//! Core types and data structures for Passforge
//!
//! This crate provides the fundamental building blocks shared by the passes:
//! - IR representation (modules, functions, blocks, instructions)
//! - Debug metadata
//! - Query traits passes consume
//! - Error types

pub mod builder;
pub mod debug_info;
pub mod error;
pub mod ir;
pub mod printer;
pub mod traits;

pub use builder::{FunctionBuilder, ModuleBuilder};
pub use debug_info::{CompileUnit, DebugInfo, SourceLocation, Subprogram};
pub use error::{Error, Result};
pub use ir::{
    BinaryOp, Block, BlockId, CallSite, Callee, Function, FunctionAttributes, Inst, Linkage,
    Module, Operand, Terminator, ValueId,
};
pub use traits::{CallGraphQuery, DebugInfoQuery, InlineViability, LoopQuery};
