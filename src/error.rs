use thiserror::Error;

use crate::frontend::syntax_error::SyntaxValidationResult;

/// Crate result type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop a script from starting.
///
/// Faults raised while a script runs are not errors: they come back as the
/// `exit_code` of an [`InterpreterResult`](crate::runtime::result::InterpreterResult).
#[derive(Debug, Error)]
pub enum Error {
    #[error("syntax error: {0}")]
    Syntax(SyntaxValidationResult),

    #[error("memory size {0} outside [32, 1024]")]
    InvalidMemorySize(usize),

    #[error("breakpoint offset {offset} outside source of length {len}")]
    BreakpointOutOfRange { offset: usize, len: usize },

    #[error("invalid machine state snapshot: {0}")]
    Snapshot(#[from] postcard::Error),
}

impl Error {
    /// The validation result, if this is a syntax error.
    pub fn syntax(&self) -> Option<&SyntaxValidationResult> {
        match self {
            Error::Syntax(result) => Some(result),
            _ => None,
        }
    }
}
