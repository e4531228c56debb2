use std::fmt::Write;

use crate::bytecode::op::Operator;
use crate::frontend::lexer::Spanned;

pub struct TokenDumper {
    pub color: bool,
    /// Print the `Operator` debug name next to the character.
    pub show_debug_repr: bool,
}

impl Default for TokenDumper {
    fn default() -> Self {
        Self {
            color: true,
            show_debug_repr: true,
        }
    }
}

impl TokenDumper {
    // ANSI colors
    const RESET: &'static str = "\x1b[0m";
    const GRN: &'static str = "\x1b[32m";
    const YEL: &'static str = "\x1b[33m";
    const CYN: &'static str = "\x1b[36m";
    const MAG: &'static str = "\x1b[35m";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.show_debug_repr = false;
        self
    }

    pub fn dump(&self, operators: &[Spanned]) {
        print!("{}", self.render(operators));
    }

    pub fn render(&self, operators: &[Spanned]) -> String {
        let mut out = String::new();
        for s in operators {
            self.write_one(&mut out, s);
        }
        out
    }

    fn write_one(&self, out: &mut String, s: &Spanned) {
        let kind = self.kind(s.operator);
        let colr = if self.color { self.color(s.operator) } else { "" };
        let reset = if self.color { Self::RESET } else { "" };

        let _ = if self.show_debug_repr {
            writeln!(
                out,
                "[{:04}] {}{:<8} {} {:?}{}",
                s.offset, colr, kind, s.operator, s.operator, reset
            )
        } else {
            writeln!(
                out,
                "[{:04}] {}{:<8} {}{}",
                s.offset, colr, kind, s.operator, reset
            )
        };
    }

    fn kind(&self, op: Operator) -> &'static str {
        use Operator::*;
        match op {
            ForwardPtr | BackwardPtr => "POINTER",
            Plus | Minus => "ARITH",
            PrintChar | ReadChar => "IO",
            LoopStart | LoopEnd => "LOOP",
            FunctionStart | FunctionEnd | FunctionCall => "FUNCTION",
        }
    }

    fn color(&self, op: Operator) -> &'static str {
        use Operator::*;
        match op {
            ForwardPtr | BackwardPtr => Self::CYN,
            Plus | Minus => Self::MAG,
            PrintChar | ReadChar => Self::GRN,
            LoopStart | LoopEnd | FunctionStart | FunctionEnd | FunctionCall => Self::YEL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;

    fn spanned(source: &str) -> Vec<Spanned> {
        Lexer::new(source).operators().collect()
    }

    #[test]
    fn test_plain_render() {
        let text = TokenDumper::new().no_color().pretty().render(&spanned("+ [:]"));
        assert_eq!(
            text,
            "[0000] ARITH    +\n[0002] LOOP     [\n[0003] FUNCTION :\n[0004] LOOP     ]\n"
        );
    }

    #[test]
    fn test_debug_render_names_operator() {
        let text = TokenDumper::new().no_color().render(&spanned(">"));
        assert!(text.contains("> ForwardPtr"));
    }

    #[test]
    fn test_color_render_resets() {
        let text = TokenDumper::new().render(&spanned("."));
        assert!(text.starts_with("[0000] \x1b[32m"));
        assert!(text.trim_end().ends_with("\x1b[0m"));
    }
}
