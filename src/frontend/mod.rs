pub mod lexer;
pub mod syntax_error;
pub mod token_dumper;

pub use lexer::{Lexer, is_operator, validate};
pub use syntax_error::{SyntaxError, SyntaxValidationResult};
