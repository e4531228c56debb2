use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A structural error found while validating PBrain source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum SyntaxError {
    #[error("mismatched square bracket")]
    MismatchedSquareBracket,

    #[error("mismatched parenthesis")]
    MismatchedParenthesis,

    #[error("function declared inside another function")]
    NestedFunctionDeclaration,

    #[error("function declared inside a loop")]
    InvalidFunctionDeclaration,

    #[error("function body has no operators")]
    EmptyFunctionDeclaration,

    #[error("function declaration is never closed")]
    IncompleteFunctionDeclaration,

    #[error("loop is never closed")]
    IncompleteLoop,

    #[error("script contains no operators")]
    MissingOperators,
}

/// Outcome of [`validate`](crate::frontend::lexer::validate).
///
/// `error_offset` is a character offset into the source, or `-1` when the
/// error has no single location (`MissingOperators`) or there is no error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxValidationResult {
    pub error: Option<SyntaxError>,
    pub error_offset: isize,
    pub operator_count: usize,
}

impl SyntaxValidationResult {
    pub fn success(operator_count: usize) -> Self {
        Self {
            error: None,
            error_offset: -1,
            operator_count,
        }
    }

    pub fn failure(error: SyntaxError, error_offset: isize, operator_count: usize) -> Self {
        Self {
            error: Some(error),
            error_offset,
            operator_count,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl std::fmt::Display for SyntaxValidationResult {
    /// Formats as `offset: message` for CLI-friendly diagnostics.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.error {
            None => write!(f, "ok ({} operators)", self.operator_count),
            Some(error) if self.error_offset < 0 => write!(f, "{}", error),
            Some(error) => write!(f, "{}: {}", self.error_offset, error),
        }
    }
}
