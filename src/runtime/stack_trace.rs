use crate::bytecode::ir::Program;
use crate::bytecode::op::Operator;
use crate::runtime::stack_frame::CallStack;

/// Source fragments leading to the current halt, innermost first.
///
/// Each frame contributes the operators from its start up to its resume
/// point; the innermost frame also includes the operator it stopped on.
/// A frame's text is split after every loop opener still open at that
/// point, so each entry is one loop body (or the top of a frame).
pub fn build_stack_trace(program: &Program, stack: &CallStack) -> Vec<String> {
    let mut trace = Vec::new();

    for (n, frame) in stack.iter_innermost().enumerate() {
        let upper = if n == 0 { frame.offset + 1 } else { frame.offset };
        let upper = upper.min(frame.range.end).min(program.len());
        let start = frame.range.start.min(upper);

        let mut cuts: Vec<usize> = (start..upper)
            .filter(|&j| {
                program.opcodes[j].operator == Operator::LoopStart && program.jump_table[j] >= upper
            })
            .map(|j| j + 1)
            .collect();
        cuts.insert(0, start);
        cuts.push(upper);

        for window in cuts.windows(2).rev() {
            if window[0] < window[1] {
                trace.push(program.source_of(window[0], window[1]));
            }
        }
    }

    trace
}
