//! # PBrain
//!
//! A virtual machine for PBrain: the eight Brainf*ck operators plus
//! functions keyed by the value under the tape pointer.
//!
//! ```text
//! >  <   move the pointer        +  -   change the current cell
//! .  ,   write / read a char     [  ]   loop while the cell is not zero
//! (  )   define a function       :      call a function
//! ```
//!
//! Scripts can run straight to completion with [`run`], or inside a
//! [`Session`] that pauses at breakpoints and resumes with the same result an
//! uninterrupted run would give.
//!
//! ```
//! use pbrain::{ExitCode, MachineConfig, run};
//!
//! let result = run("(+++):>:", "", &MachineConfig::default())?;
//! assert_eq!(result.exit_code, ExitCode::Success);
//! assert_eq!(result.machine_state.cells()[..2], [3, 3]);
//! # Ok::<(), pbrain::Error>(())
//! ```

pub mod bytecode;
pub mod error;
pub mod frontend;
pub mod runtime;

pub use bytecode::{CompileMode, Opcode, Operator, Program};
pub use error::{Error, Result};
pub use frontend::{SyntaxError, SyntaxValidationResult, validate};
pub use runtime::{
    CancellationToken, ExitCode, FunctionDefinition, HaltingInfo, InterpreterResult,
    MachineConfig, MachineState, OverflowMode, RunOptions, Session, run, run_with_state,
};

/// Validates and compiles `source` into one opcode per operator.
pub fn parse(source: &str) -> Result<Vec<Opcode>> {
    parse_with(source, CompileMode::Uncompressed)
}

/// Validates and compiles `source` with the given granularity.
pub fn parse_with(source: &str, mode: CompileMode) -> Result<Vec<Opcode>> {
    let program = bytecode::compile::compile(source, &validate(source), mode)?;
    Ok(program.opcodes)
}

/// Creates a debug session over `source`.
///
/// `breakpoints` are character offsets into `source`.
pub fn create_session(
    source: &str,
    breakpoints: &[usize],
    stdin: &str,
    config: &MachineConfig,
) -> Result<Session> {
    Session::new(source, breakpoints, stdin, config)
}
