use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bytecode::ir::Program;
use crate::bytecode::jump_table::build_jump_table;
use crate::bytecode::op::Opcode;
use crate::error::{Error, Result};
use crate::frontend::lexer::Lexer;
use crate::frontend::syntax_error::SyntaxValidationResult;

/// Instruction granularity of a compiled program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompileMode {
    /// One opcode per source operator. Needed whenever breakpoints must
    /// address individual operators.
    #[default]
    Uncompressed,

    /// Runs of `>`, `<`, `+` or `-` are merged into a single counted opcode.
    Compressed,
}

pub struct Compiler {
    mode: CompileMode,
}

impl Compiler {
    pub fn new(mode: CompileMode) -> Self {
        Self { mode }
    }

    /// Compiles `source`, which must already have passed `validation`.
    pub fn compile(&self, source: &str, validation: &SyntaxValidationResult) -> Result<Program> {
        if !validation.is_success() {
            return Err(Error::Syntax(*validation));
        }

        let lexer = Lexer::new(source);
        let capacity = validation.operator_count;
        let mut opcodes: Vec<Opcode> = Vec::with_capacity(capacity);
        let mut offsets: Vec<usize> = Vec::with_capacity(capacity);

        for spanned in lexer.operators() {
            if self.mode == CompileMode::Compressed && spanned.operator.is_compressible() {
                if let Some(last) = opcodes.last_mut() {
                    if last.operator == spanned.operator && last.count < u16::MAX {
                        last.count += 1;
                        continue;
                    }
                }
            }
            opcodes.push(Opcode::new(spanned.operator));
            offsets.push(spanned.offset);
        }

        let (jump_table, function_count) = build_jump_table(&opcodes);

        debug!(
            mode = ?self.mode,
            operators = validation.operator_count,
            opcodes = opcodes.len(),
            functions = function_count,
            "compiled script"
        );

        Ok(Program {
            opcodes,
            offsets,
            jump_table,
            function_count,
            operator_count: validation.operator_count,
            mode: self.mode,
        })
    }
}

/// Compiles `source` with the given granularity.
pub fn compile(
    source: &str,
    validation: &SyntaxValidationResult,
    mode: CompileMode,
) -> Result<Program> {
    Compiler::new(mode).compile(source, validation)
}
