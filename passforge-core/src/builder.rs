//! Builders for constructing IR in code

use crate::debug_info::DebugInfo;
use crate::error::Result;
use crate::ir::{
    BinaryOp, Block, BlockId, Callee, Function, FunctionAttributes, Inst, Linkage, Module,
    Operand, Terminator, ValueId,
};

/// Incremental builder for a single function
///
/// Instructions are appended to the current block. The first instruction
/// emitted without an explicit block creates the entry block.
pub struct FunctionBuilder {
    function: Function,
    current: Option<BlockId>,
    next_value: u32,
    next_block: u32,
}

impl FunctionBuilder {
    /// Start a function with no parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_params(name, 0)
    }

    /// Start a function whose parameters are registers `%0..%count`
    pub fn with_params(name: impl Into<String>, count: u32) -> Self {
        let mut function = Function::declaration(name);
        function.params = (0..count).map(ValueId).collect();
        Self {
            function,
            current: None,
            next_value: count,
            next_block: 0,
        }
    }

    /// Parameter `index` as an operand
    pub fn param(&self, index: usize) -> Operand {
        Operand::Value(self.function.params[index])
    }

    pub fn linkage(mut self, linkage: Linkage) -> Self {
        self.function.linkage = linkage;
        self
    }

    /// Shorthand for `linkage(Linkage::Internal)`
    pub fn internal(self) -> Self {
        self.linkage(Linkage::Internal)
    }

    pub fn attributes(mut self, attributes: FunctionAttributes) -> Self {
        self.function.attributes = attributes;
        self
    }

    /// Append a new empty block. The first block created is the entry block.
    pub fn create_block(&mut self) -> BlockId {
        let id = BlockId(self.next_block);
        self.next_block += 1;
        self.function.blocks.push(Block::new(id));
        id
    }

    /// Make `block` the insertion point
    pub fn switch_to(&mut self, block: BlockId) {
        self.current = Some(block);
    }

    /// Allocate a fresh register without defining it
    pub fn fresh_value(&mut self) -> ValueId {
        let id = ValueId(self.next_value);
        self.next_value += 1;
        id
    }

    fn current_block(&mut self) -> &mut Block {
        let id = match self.current {
            Some(id) => id,
            None => {
                let id = self.create_block();
                self.current = Some(id);
                id
            }
        };
        let index = match self.function.block_index(id) {
            Some(index) => index,
            None => {
                self.function.blocks.push(Block::new(id));
                self.next_block = self.next_block.max(id.0.saturating_add(1));
                self.function.blocks.len() - 1
            }
        };
        &mut self.function.blocks[index]
    }

    fn push(&mut self, inst: Inst) {
        self.current_block().insts.push(inst);
    }

    fn terminate(&mut self, terminator: Terminator) {
        self.current_block().terminator = terminator;
    }

    pub fn constant(&mut self, value: i64) -> ValueId {
        let dest = self.fresh_value();
        self.push(Inst::Const { dest, value });
        dest
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: Operand, rhs: Operand) -> ValueId {
        let dest = self.fresh_value();
        self.push(Inst::Binary { dest, op, lhs, rhs });
        dest
    }

    /// Assign `src` to an existing register
    pub fn assign(&mut self, dest: ValueId, src: Operand) {
        self.push(Inst::Copy { dest, src });
    }

    /// Direct call whose result is kept
    pub fn call(&mut self, callee: &str, args: Vec<Operand>) -> ValueId {
        let dest = self.fresh_value();
        self.push(Inst::Call {
            dest: Some(dest),
            callee: Callee::Direct(callee.to_string()),
            args,
        });
        dest
    }

    /// Direct call whose result is discarded
    pub fn call_void(&mut self, callee: &str, args: Vec<Operand>) {
        self.push(Inst::Call {
            dest: None,
            callee: Callee::Direct(callee.to_string()),
            args,
        });
    }

    /// Call through a function address
    pub fn call_indirect(&mut self, target: Operand, args: Vec<Operand>) -> ValueId {
        let dest = self.fresh_value();
        self.push(Inst::Call {
            dest: Some(dest),
            callee: Callee::Indirect(target),
            args,
        });
        dest
    }

    pub fn ret(&mut self, value: Option<Operand>) {
        self.terminate(Terminator::Return { value });
    }

    pub fn jump(&mut self, target: BlockId) {
        self.terminate(Terminator::Jump { target });
    }

    pub fn branch(&mut self, cond: Operand, then_block: BlockId, else_block: BlockId) {
        self.terminate(Terminator::Branch {
            cond,
            then_block,
            else_block,
        });
    }

    pub fn indirect_jump(&mut self, target: Operand, destinations: Vec<BlockId>) {
        self.terminate(Terminator::IndirectJump {
            target,
            destinations,
        });
    }

    pub fn build(self) -> Function {
        self.function
    }
}

/// Builder for a module
pub struct ModuleBuilder {
    module: Module,
    functions: Vec<Function>,
}

impl ModuleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            module: Module::new(name),
            functions: Vec::new(),
        }
    }

    /// Add a defined or declared function
    pub fn function(mut self, function: Function) -> Self {
        self.functions.push(function);
        self
    }

    /// Add an external declaration
    pub fn declare(self, name: &str) -> Self {
        self.function(Function::declaration(name))
    }

    pub fn debug_info(mut self, debug_info: DebugInfo) -> Self {
        self.module.debug_info = Some(debug_info);
        self
    }

    /// Finish the module, rejecting duplicate names and dangling branch targets
    pub fn build(self) -> Result<Module> {
        let mut module = self.module;
        for function in self.functions {
            module.add_function(function)?;
        }
        module.validate()?;
        Ok(module)
    }
}
