use crate::bytecode::compile::CompileMode;
use crate::bytecode::op::{Opcode, to_source};
use serde::{Deserialize, Serialize};

/// A compiled PBrain script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    /// Instruction stream.
    pub opcodes: Vec<Opcode>,

    /// Source character offset of the first operator of each opcode.
    pub offsets: Vec<usize>,

    /// Partner index for every bracket and parenthesis, built from `opcodes`.
    pub jump_table: Vec<usize>,

    /// Number of `(` declarations in the script.
    pub function_count: usize,

    /// Number of operators in the source, before compression.
    pub operator_count: usize,

    pub mode: CompileMode,
}

impl Program {
    pub fn len(&self) -> usize {
        self.opcodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opcodes.is_empty()
    }

    /// Operator text of the opcodes in `[start, end)`.
    pub fn source_of(&self, start: usize, end: usize) -> String {
        to_source(&self.opcodes[start..end])
    }
}
