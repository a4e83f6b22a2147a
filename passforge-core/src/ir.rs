//! IR representation: modules, functions, basic blocks and instructions
//!
//! Registers are function-local mutable virtual registers rather than SSA
//! values, so a register may be assigned by more than one instruction.

use crate::debug_info::DebugInfo;
use crate::error::{Error, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Virtual register identifier, local to a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueId(pub u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Basic block identifier, local to a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// Instruction operand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// Read of a virtual register
    Value(ValueId),
    /// Integer constant
    Const(i64),
    /// Address of a function. Keeps the function referenced without calling it.
    Function(String),
}

impl Operand {
    /// Register read by this operand, if any
    pub fn value(&self) -> Option<ValueId> {
        match self {
            Operand::Value(id) => Some(*id),
            _ => None,
        }
    }

    /// Function whose address this operand takes, if any
    pub fn function(&self) -> Option<&str> {
        match self {
            Operand::Function(name) => Some(name),
            _ => None,
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Rem => "rem",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
            BinaryOp::Eq => "eq",
            BinaryOp::Ne => "ne",
            BinaryOp::Lt => "lt",
            BinaryOp::Le => "le",
            BinaryOp::Gt => "gt",
            BinaryOp::Ge => "ge",
        };
        f.write_str(name)
    }
}

/// Target of a call instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Callee {
    /// Statically known callee, by function name
    Direct(String),
    /// Call through a computed function address
    Indirect(Operand),
}

impl Callee {
    /// Name of the statically known callee. `None` for indirect calls.
    pub fn name(&self) -> Option<&str> {
        match self {
            Callee::Direct(name) => Some(name),
            Callee::Indirect(_) => None,
        }
    }
}

/// Non-terminator instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Inst {
    /// `dest = value`
    Const { dest: ValueId, value: i64 },
    /// `dest = lhs <op> rhs`
    Binary {
        dest: ValueId,
        #[serde(rename = "operator")]
        op: BinaryOp,
        lhs: Operand,
        rhs: Operand,
    },
    /// `dest = src`
    Copy { dest: ValueId, src: Operand },
    /// `dest = call callee(args)`
    Call {
        #[serde(default)]
        dest: Option<ValueId>,
        callee: Callee,
        #[serde(default)]
        args: Vec<Operand>,
    },
}

impl Inst {
    /// Register written by this instruction
    pub fn dest(&self) -> Option<ValueId> {
        match self {
            Inst::Const { dest, .. } | Inst::Binary { dest, .. } | Inst::Copy { dest, .. } => {
                Some(*dest)
            }
            Inst::Call { dest, .. } => *dest,
        }
    }

    /// Operands read by this instruction, including an indirect call target
    pub fn operands(&self) -> Vec<&Operand> {
        match self {
            Inst::Const { .. } => Vec::new(),
            Inst::Binary { lhs, rhs, .. } => vec![lhs, rhs],
            Inst::Copy { src, .. } => vec![src],
            Inst::Call { callee, args, .. } => {
                let mut operands: Vec<&Operand> = Vec::with_capacity(args.len() + 1);
                if let Callee::Indirect(target) = callee {
                    operands.push(target);
                }
                operands.extend(args.iter());
                operands
            }
        }
    }

    /// Returns the callee when this instruction is a call
    pub fn callee(&self) -> Option<&Callee> {
        match self {
            Inst::Call { callee, .. } => Some(callee),
            _ => None,
        }
    }

    /// Check if this instruction is a call
    pub fn is_call(&self) -> bool {
        matches!(self, Inst::Call { .. })
    }
}

/// Block terminator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Terminator {
    /// Return from the function
    Return {
        #[serde(default)]
        value: Option<Operand>,
    },
    /// Unconditional branch
    Jump { target: BlockId },
    /// Two-way conditional branch on a non-zero condition
    Branch {
        cond: Operand,
        then_block: BlockId,
        else_block: BlockId,
    },
    /// Branch to a computed block address. Cannot be duplicated by the inliner.
    IndirectJump {
        target: Operand,
        destinations: Vec<BlockId>,
    },
    /// Control never reaches the end of the block
    Unreachable,
}

impl Terminator {
    /// Successor blocks in branch order, without duplicates
    pub fn successors(&self) -> Vec<BlockId> {
        let mut successors = Vec::new();
        match self {
            Terminator::Return { .. } | Terminator::Unreachable => {}
            Terminator::Jump { target } => successors.push(*target),
            Terminator::Branch {
                then_block,
                else_block,
                ..
            } => {
                successors.push(*then_block);
                if else_block != then_block {
                    successors.push(*else_block);
                }
            }
            Terminator::IndirectJump { destinations, .. } => {
                for dest in destinations {
                    if !successors.contains(dest) {
                        successors.push(*dest);
                    }
                }
            }
        }
        successors
    }

    /// Operands read by this terminator
    pub fn operands(&self) -> Vec<&Operand> {
        match self {
            Terminator::Return { value } => value.iter().collect(),
            Terminator::Branch { cond, .. } => vec![cond],
            Terminator::IndirectJump { target, .. } => vec![target],
            Terminator::Jump { .. } | Terminator::Unreachable => Vec::new(),
        }
    }
}

/// Basic block: straight-line instructions ending in one terminator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(default)]
    pub insts: Vec<Inst>,
    pub terminator: Terminator,
}

impl Block {
    /// Create an empty block ending in `unreachable`
    pub fn new(id: BlockId) -> Self {
        Self {
            id,
            insts: Vec::new(),
            terminator: Terminator::Unreachable,
        }
    }
}

/// Symbol linkage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Linkage {
    /// Visible outside the module; never discarded
    #[default]
    External,
    /// Local to the module; may be discarded once nothing references it
    Internal,
}

/// Function attributes relevant to inlining
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionAttributes {
    /// Takes a variable argument list
    #[serde(default)]
    pub variadic: bool,
    /// May return more than once (setjmp-like)
    #[serde(default)]
    pub returns_twice: bool,
}

/// Call instruction position within a module
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallSite {
    /// Function containing the call
    pub caller: String,
    /// Statically known callee, `None` for indirect calls
    pub callee: Option<String>,
    /// Block holding the call instruction
    pub block: BlockId,
    /// Index of the call instruction within its block
    pub index: usize,
}

impl CallSite {
    /// Check if the call goes through a computed address
    pub fn is_indirect(&self) -> bool {
        self.callee.is_none()
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.callee {
            Some(callee) => write!(f, "{} -> {} ({}:{})", self.caller, callee, self.block, self.index),
            None => write!(f, "{} -> <indirect> ({}:{})", self.caller, self.block, self.index),
        }
    }
}

/// A function definition or declaration
///
/// # Invariants
/// - A function with no blocks is a declaration
/// - The first block is the entry block
/// - Block ids are unique within the function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ValueId>,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub linkage: Linkage,
    #[serde(default)]
    pub attributes: FunctionAttributes,
}

impl Function {
    /// Create a function with no body
    pub fn declaration(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            blocks: Vec::new(),
            linkage: Linkage::External,
            attributes: FunctionAttributes::default(),
        }
    }

    /// Check if the body is external to the module
    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Entry block, if the function has a body
    pub fn entry(&self) -> Option<&Block> {
        self.blocks.first()
    }

    /// Get a block by id
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Position of a block in `blocks`
    pub fn block_index(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    /// All call instructions, in block then instruction order
    pub fn call_sites(&self) -> Vec<CallSite> {
        let mut sites = Vec::new();
        for block in &self.blocks {
            for (index, inst) in block.insts.iter().enumerate() {
                if let Some(callee) = inst.callee() {
                    sites.push(CallSite {
                        caller: self.name.clone(),
                        callee: callee.name().map(str::to_string),
                        block: block.id,
                        index,
                    });
                }
            }
        }
        sites
    }

    /// Functions whose address is taken by an operand in this body
    pub fn address_taken_functions(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for block in &self.blocks {
            let operands = block
                .insts
                .iter()
                .flat_map(Inst::operands)
                .chain(block.terminator.operands());
            for operand in operands {
                if let Some(name) = operand.function() {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Predecessor lists for every block
    pub fn predecessors(&self) -> FxHashMap<BlockId, Vec<BlockId>> {
        let mut preds: FxHashMap<BlockId, Vec<BlockId>> = FxHashMap::default();
        for block in &self.blocks {
            preds.entry(block.id).or_default();
        }
        for block in &self.blocks {
            for succ in block.terminator.successors() {
                preds.entry(succ).or_default().push(block.id);
            }
        }
        preds
    }

    /// One past the highest register id used anywhere in the function.
    ///
    /// Widened to `u64` so a function using `u32::MAX` still has a successor.
    pub fn next_value_id(&self) -> u64 {
        let next = |v: &ValueId| u64::from(v.0) + 1;
        let mut max = self.params.iter().map(next).max().unwrap_or(0);
        for block in &self.blocks {
            for inst in &block.insts {
                if let Some(dest) = inst.dest() {
                    max = max.max(next(&dest));
                }
                for operand in inst.operands() {
                    if let Some(v) = operand.value() {
                        max = max.max(next(&v));
                    }
                }
            }
            for operand in block.terminator.operands() {
                if let Some(v) = operand.value() {
                    max = max.max(next(&v));
                }
            }
        }
        max
    }

    /// One past the highest block id in the function
    pub fn next_block_id(&self) -> u64 {
        self.blocks
            .iter()
            .map(|b| u64::from(b.id.0) + 1)
            .max()
            .unwrap_or(0)
    }

    /// Check structural well-formedness: unique block ids and branch targets that exist
    pub fn validate(&self) -> Result<()> {
        let mut seen = FxHashSet::default();
        for block in &self.blocks {
            if !seen.insert(block.id) {
                return Err(Error::InvalidModule(format!(
                    "block {} defined twice in function {}",
                    block.id, self.name
                )));
            }
        }
        for block in &self.blocks {
            for succ in block.terminator.successors() {
                if !seen.contains(&succ) {
                    return Err(Error::UnknownBlock {
                        function: self.name.clone(),
                        block: succ,
                    });
                }
            }
        }
        Ok(())
    }
}

/// A translation unit: functions plus optional debug metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    #[serde(default)]
    pub functions: Vec<Function>,
    #[serde(default)]
    pub debug_info: Option<DebugInfo>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
            debug_info: None,
        }
    }

    /// Add a function. Names are unique within a module.
    pub fn add_function(&mut self, function: Function) -> Result<()> {
        if self.contains(&function.name) {
            return Err(Error::DuplicateFunction(function.name));
        }
        self.functions.push(function);
        Ok(())
    }

    /// Check if a function with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.functions.iter().any(|f| f.name == name)
    }

    /// Get a function by name
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Get a mutable function by name
    pub fn function_mut(&mut self, name: &str) -> Option<&mut Function> {
        self.functions.iter_mut().find(|f| f.name == name)
    }

    /// Remove a function by name, returning it
    pub fn remove_function(&mut self, name: &str) -> Option<Function> {
        let index = self.functions.iter().position(|f| f.name == name)?;
        Some(self.functions.remove(index))
    }

    /// Functions that have a body in this module
    pub fn defined_functions(&self) -> impl Iterator<Item = &Function> + '_ {
        self.functions.iter().filter(|f| !f.is_declaration())
    }

    /// Every call instruction in the module
    pub fn call_sites(&self) -> Vec<CallSite> {
        self.functions.iter().flat_map(Function::call_sites).collect()
    }

    /// Validate every function and the uniqueness of function names
    pub fn validate(&self) -> Result<()> {
        let mut names = FxHashSet::default();
        for function in &self.functions {
            if !names.insert(function.name.as_str()) {
                return Err(Error::DuplicateFunction(function.name.clone()));
            }
            function.validate()?;
        }
        Ok(())
    }

    /// Parse and validate a module from JSON
    pub fn from_json(source: &str) -> Result<Self> {
        let module: Module = serde_json::from_str(source)?;
        module.validate()?;
        debug!(
            module = %module.name,
            functions = module.functions.len(),
            "loaded module"
        );
        Ok(module)
    }

    /// Serialize the module as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
#[path = "ir_tests.rs"]
mod tests;
