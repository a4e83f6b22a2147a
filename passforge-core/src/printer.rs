//! Textual IR printer

use crate::ir::{Block, Callee, Function, Inst, Linkage, Module, Operand, Terminator};
use std::fmt;

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Value(id) => write!(f, "{}", id),
            Operand::Const(value) => write!(f, "{}", value),
            Operand::Function(name) => write!(f, "@{}", name),
        }
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Operand]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", arg)?;
    }
    Ok(())
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inst::Const { dest, value } => write!(f, "{} = const {}", dest, value),
            Inst::Binary { dest, op, lhs, rhs } => write!(f, "{} = {} {}, {}", dest, op, lhs, rhs),
            Inst::Copy { dest, src } => write!(f, "{} = copy {}", dest, src),
            Inst::Call { dest, callee, args } => {
                if let Some(dest) = dest {
                    write!(f, "{} = ", dest)?;
                }
                match callee {
                    Callee::Direct(name) => write!(f, "call @{}(", name)?,
                    Callee::Indirect(target) => write!(f, "call {}(", target)?,
                }
                write_args(f, args)?;
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminator::Return { value: Some(value) } => write!(f, "ret {}", value),
            Terminator::Return { value: None } => write!(f, "ret"),
            Terminator::Jump { target } => write!(f, "br {}", target),
            Terminator::Branch {
                cond,
                then_block,
                else_block,
            } => write!(f, "br {}, {}, {}", cond, then_block, else_block),
            Terminator::IndirectJump {
                target,
                destinations,
            } => {
                write!(f, "indirectbr {}, [", target)?;
                for (i, dest) in destinations.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", dest)?;
                }
                write!(f, "]")
            }
            Terminator::Unreachable => write!(f, "unreachable"),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.id)?;
        for inst in &self.insts {
            writeln!(f, "  {}", inst)?;
        }
        writeln!(f, "  {}", self.terminator)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = if self.is_declaration() { "declare" } else { "define" };
        write!(f, "{} ", keyword)?;
        if self.linkage == Linkage::Internal {
            write!(f, "internal ")?;
        }
        write!(f, "@{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        if self.attributes.variadic {
            if !self.params.is_empty() {
                write!(f, ", ")?;
            }
            write!(f, "...")?;
        }
        write!(f, ")")?;
        if self.attributes.returns_twice {
            write!(f, " returns_twice")?;
        }
        if self.is_declaration() {
            return writeln!(f);
        }
        writeln!(f, " {{")?;
        for block in &self.blocks {
            write!(f, "{}", block)?;
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; module {}", self.name)?;
        for function in &self.functions {
            writeln!(f)?;
            write!(f, "{}", function)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "printer_tests.rs"]
mod tests;
