use serde::{Deserialize, Serialize};

// =============================================================================
// OPERATOR - PBrain source operators
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// `>` move the pointer one cell forward.
    ForwardPtr,
    /// `<` move the pointer one cell back.
    BackwardPtr,
    /// `+` increment the current cell.
    Plus,
    /// `-` decrement the current cell.
    Minus,
    /// `.` append the current cell to stdout.
    PrintChar,
    /// `,` read one character from stdin into the current cell.
    ReadChar,
    /// `[` jump past the matching `]` if the current cell is zero.
    LoopStart,
    /// `]` jump back to the matching `[` if the current cell is not zero.
    LoopEnd,
    /// `(` define a function keyed by the current cell.
    FunctionStart,
    /// `)` close a function body.
    FunctionEnd,
    /// `:` call the function keyed by the current cell.
    FunctionCall,
}

impl Operator {
    pub fn from_char(c: char) -> Option<Operator> {
        Some(match c {
            '>' => Operator::ForwardPtr,
            '<' => Operator::BackwardPtr,
            '+' => Operator::Plus,
            '-' => Operator::Minus,
            '.' => Operator::PrintChar,
            ',' => Operator::ReadChar,
            '[' => Operator::LoopStart,
            ']' => Operator::LoopEnd,
            '(' => Operator::FunctionStart,
            ')' => Operator::FunctionEnd,
            ':' => Operator::FunctionCall,
            _ => return None,
        })
    }

    pub fn as_char(self) -> char {
        match self {
            Operator::ForwardPtr => '>',
            Operator::BackwardPtr => '<',
            Operator::Plus => '+',
            Operator::Minus => '-',
            Operator::PrintChar => '.',
            Operator::ReadChar => ',',
            Operator::LoopStart => '[',
            Operator::LoopEnd => ']',
            Operator::FunctionStart => '(',
            Operator::FunctionEnd => ')',
            Operator::FunctionCall => ':',
        }
    }

    /// Pointer moves and arithmetic can be merged into a single counted opcode.
    pub fn is_compressible(self) -> bool {
        matches!(
            self,
            Operator::ForwardPtr | Operator::BackwardPtr | Operator::Plus | Operator::Minus
        )
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// =============================================================================
// OPCODE - one compiled instruction
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opcode {
    pub operator: Operator,
    pub count: u16,
}

impl Opcode {
    pub fn new(operator: Operator) -> Self {
        Self { operator, count: 1 }
    }

    pub fn with_count(operator: Operator, count: u16) -> Self {
        debug_assert!(count == 1 || operator.is_compressible());
        Self { operator, count }
    }

    /// Writes the source text this opcode was compiled from.
    pub fn write_source(&self, out: &mut String) {
        let c = self.operator.as_char();
        for _ in 0..self.count {
            out.push(c);
        }
    }
}

/// Rebuilds the operator text of a slice of opcodes.
pub fn to_source(ops: &[Opcode]) -> String {
    let mut text = String::with_capacity(ops.len());
    for op in ops {
        op.write_source(&mut text);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_char_roundtrip() {
        for c in "><+-.,[]():".chars() {
            let op = Operator::from_char(c).expect("operator");
            assert_eq!(op.as_char(), c);
        }
    }

    #[test]
    fn test_comment_chars_are_not_operators() {
        assert_eq!(Operator::from_char('a'), None);
        assert_eq!(Operator::from_char(' '), None);
        assert_eq!(Operator::from_char('#'), None);
    }

    #[test]
    fn test_to_source_expands_counts() {
        let ops = vec![
            Opcode::with_count(Operator::Plus, 3),
            Opcode::new(Operator::LoopStart),
            Opcode::with_count(Operator::ForwardPtr, 2),
        ];
        assert_eq!(to_source(&ops), "+++[>>");
    }
}
