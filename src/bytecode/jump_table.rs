use crate::bytecode::op::{Opcode, Operator};

/// Builds the bidirectional partner table for `[`/`]` and `(`/`)`.
///
/// Returns the table (one slot per opcode, unused slots left at 0) and the
/// number of function declarations. The opcodes must already be validated.
///
/// Functions cannot nest, so a single stack serves whichever function body is
/// open; root loops use their own stack, sized for the worst case of a
/// script made only of brackets.
pub fn build_jump_table(ops: &[Opcode]) -> (Vec<usize>, usize) {
    let mut table = vec![0usize; ops.len()];
    let mut root_loops: Vec<usize> = Vec::with_capacity(ops.len() / 2 + 1);
    let mut function_loops: Vec<usize> = Vec::new();
    let mut function_start: Option<usize> = None;
    let mut function_count = 0;

    for (i, op) in ops.iter().enumerate() {
        match op.operator {
            Operator::LoopStart => match function_start {
                Some(_) => function_loops.push(i),
                None => root_loops.push(i),
            },
            Operator::LoopEnd => {
                let stack = match function_start {
                    Some(_) => &mut function_loops,
                    None => &mut root_loops,
                };
                if let Some(start) = stack.pop() {
                    table[start] = i;
                    table[i] = start;
                }
            }
            Operator::FunctionStart => {
                function_start = Some(i);
                function_loops.clear();
                function_count += 1;
            }
            Operator::FunctionEnd => {
                if let Some(start) = function_start.take() {
                    table[start] = i;
                    table[i] = start;
                }
            }
            _ => {}
        }
    }

    (table, function_count)
}
