use crate::bytecode::op::Operator;
use crate::frontend::syntax_error::{SyntaxError, SyntaxValidationResult};

/// An operator together with its character offset in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spanned {
    pub operator: Operator,
    pub offset: usize,
}

pub struct Lexer {
    source: Vec<char>,
}

/// Open function body while validating.
struct OpenFunction {
    start: usize,
    depth: usize,
    outermost_open: usize,
    operators: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
        }
    }

    /// Number of characters (not bytes) in the source.
    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Operators in source order, comments skipped.
    pub fn operators(&self) -> impl Iterator<Item = Spanned> + '_ {
        self.source
            .iter()
            .enumerate()
            .filter_map(|(offset, &c)| {
                Operator::from_char(c).map(|operator| Spanned { operator, offset })
            })
    }

    /// Single forward pass over the source checking the structural rules.
    pub fn validate(&self) -> SyntaxValidationResult {
        let mut count = 0;
        let mut root_depth = 0usize;
        let mut root_outermost_open = 0usize;
        let mut function: Option<OpenFunction> = None;

        for Spanned { operator, offset } in self.operators() {
            count += 1;
            let fail = |error| SyntaxValidationResult::failure(error, offset as isize, count);

            match operator {
                Operator::LoopStart => match function.as_mut() {
                    Some(f) => {
                        if f.depth == 0 {
                            f.outermost_open = offset;
                        }
                        f.depth += 1;
                    }
                    None => {
                        if root_depth == 0 {
                            root_outermost_open = offset;
                        }
                        root_depth += 1;
                    }
                },
                Operator::LoopEnd => match function.as_mut() {
                    Some(f) if f.depth == 0 => return fail(SyntaxError::MismatchedSquareBracket),
                    Some(f) => f.depth -= 1,
                    None if root_depth == 0 => return fail(SyntaxError::MismatchedSquareBracket),
                    None => root_depth -= 1,
                },
                Operator::FunctionStart => {
                    if function.is_some() {
                        return fail(SyntaxError::NestedFunctionDeclaration);
                    }
                    if root_depth > 0 {
                        return fail(SyntaxError::InvalidFunctionDeclaration);
                    }
                    function = Some(OpenFunction {
                        start: offset,
                        depth: 0,
                        outermost_open: 0,
                        operators: 0,
                    });
                    continue;
                }
                Operator::FunctionEnd => {
                    let Some(f) = function.take() else {
                        return fail(SyntaxError::MismatchedParenthesis);
                    };
                    if f.depth > 0 {
                        return SyntaxValidationResult::failure(
                            SyntaxError::MismatchedSquareBracket,
                            f.outermost_open as isize,
                            count,
                        );
                    }
                    if f.operators == 0 {
                        return fail(SyntaxError::EmptyFunctionDeclaration);
                    }
                    continue;
                }
                _ => {}
            }

            if let Some(f) = function.as_mut() {
                f.operators += 1;
            }
        }

        if let Some(f) = function {
            return SyntaxValidationResult::failure(
                SyntaxError::IncompleteFunctionDeclaration,
                f.start as isize,
                count,
            );
        }
        if root_depth > 0 {
            return SyntaxValidationResult::failure(
                SyntaxError::IncompleteLoop,
                root_outermost_open as isize,
                count,
            );
        }
        if count == 0 {
            return SyntaxValidationResult::failure(SyntaxError::MissingOperators, -1, 0);
        }

        SyntaxValidationResult::success(count)
    }
}

/// `true` for the eleven characters PBrain executes; everything else is a comment.
pub fn is_operator(c: char) -> bool {
    Operator::from_char(c).is_some()
}

/// Validates `source` without compiling it.
pub fn validate(source: &str) -> SyntaxValidationResult {
    Lexer::new(source).validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_of(source: &str) -> (Option<SyntaxError>, isize) {
        let result = validate(source);
        (result.error, result.error_offset)
    }

    #[test]
    fn test_valid_script_counts_operators() {
        let result = validate("+++[>+<-] comment .");
        assert!(result.is_success());
        assert_eq!(result.operator_count, 10);
    }

    #[test]
    fn test_comments_only_is_missing_operators() {
        let result = validate("hello world");
        assert_eq!(result.error, Some(SyntaxError::MissingOperators));
        assert_eq!(result.operator_count, 0);
    }

    #[test]
    fn test_is_operator() {
        assert!("<>+-.,[]():".chars().all(is_operator));
        assert!(!is_operator('a'));
        assert!(!is_operator(' '));
    }

    #[test]
    fn test_empty_source_is_missing_operators() {
        assert_eq!(error_of(""), (Some(SyntaxError::MissingOperators), -1));
    }

    #[test]
    fn test_unmatched_close_bracket() {
        assert_eq!(
            error_of("++]"),
            (Some(SyntaxError::MismatchedSquareBracket), 2)
        );
    }

    #[test]
    fn test_unclosed_loop_reports_outermost_opener() {
        assert_eq!(error_of("+[[-]"), (Some(SyntaxError::IncompleteLoop), 1));
        assert_eq!(error_of("[][+[[-]"), (Some(SyntaxError::IncompleteLoop), 2));
    }

    #[test]
    fn test_function_inside_loop() {
        assert_eq!(
            error_of("+[(+)]"),
            (Some(SyntaxError::InvalidFunctionDeclaration), 2)
        );
    }

    #[test]
    fn test_nested_function() {
        assert_eq!(
            error_of("(+(-))"),
            (Some(SyntaxError::NestedFunctionDeclaration), 2)
        );
    }

    #[test]
    fn test_empty_function() {
        assert_eq!(
            error_of("+( )"),
            (Some(SyntaxError::EmptyFunctionDeclaration), 3)
        );
    }

    #[test]
    fn test_incomplete_function() {
        assert_eq!(
            error_of("+(+++"),
            (Some(SyntaxError::IncompleteFunctionDeclaration), 1)
        );
    }

    #[test]
    fn test_stray_close_parenthesis() {
        assert_eq!(error_of("+)"), (Some(SyntaxError::MismatchedParenthesis), 1));
    }

    #[test]
    fn test_unbalanced_brackets_inside_function() {
        assert_eq!(
            error_of("(+[-)"),
            (Some(SyntaxError::MismatchedSquareBracket), 2)
        );
        assert_eq!(
            error_of("(+-])"),
            (Some(SyntaxError::MismatchedSquareBracket), 3)
        );
    }

    #[test]
    fn test_function_brackets_are_independent_of_root() {
        assert!(validate("([-])+[>:<-]").is_success());
    }

    #[test]
    fn test_offsets_are_character_based() {
        assert_eq!(
            error_of("ééé]"),
            (Some(SyntaxError::MismatchedSquareBracket), 3)
        );
    }

    #[test]
    fn test_operators_skip_comments() {
        let lexer = Lexer::new("a+ b-");
        let ops: Vec<_> = lexer.operators().collect();
        assert_eq!(
            ops,
            vec![
                Spanned {
                    operator: Operator::Plus,
                    offset: 1
                },
                Spanned {
                    operator: Operator::Minus,
                    offset: 4
                },
            ]
        );
    }
}
