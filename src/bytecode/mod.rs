pub mod compile;
pub mod disasm;
pub mod ir;
pub mod jump_table;
pub mod op;

pub use compile::{CompileMode, Compiler};
pub use ir::Program;
pub use op::{Opcode, Operator};
