use std::time::Instant;

use tracing::{debug, trace};

use crate::bytecode::compile::{CompileMode, compile};
use crate::bytecode::ir::Program;
use crate::bytecode::op::Operator;
use crate::error::Result;
use crate::frontend::lexer::validate;
use crate::runtime::cancellation::Budget;
use crate::runtime::config::{MachineConfig, RunOptions};
use crate::runtime::exit_code::ExitCode;
use crate::runtime::function_table::{FunctionTable, Range};
use crate::runtime::io_buffer::{StdinBuffer, StdoutBuffer};
use crate::runtime::machine_state::MachineState;
use crate::runtime::result::InterpreterResult;
use crate::runtime::stack_frame::CallStack;

/// Everything a run mutates: tape, frames, function table and I/O.
///
/// The opcodes themselves stay outside so a session can keep one compiled
/// [`Program`] and resume the same `VmBc` against it after every pause.
#[derive(Debug, Clone)]
pub struct VmBc {
    pub(crate) state: MachineState,
    pub(crate) functions: FunctionTable,
    pub(crate) stack: CallStack,
    pub(crate) stdin: StdinBuffer,
    pub(crate) stdout: StdoutBuffer,
    pub(crate) operations: u64,
    options: RunOptions,
}

impl VmBc {
    pub fn new(program: &Program, state: MachineState, stdin: &str, options: RunOptions) -> Self {
        Self {
            state,
            functions: FunctionTable::new(),
            stack: CallStack::new(Range::new(0, program.len())),
            stdin: StdinBuffer::new(stdin),
            stdout: StdoutBuffer::new(options.stdout_limit),
            operations: 0,
            options,
        }
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn total_operations(&self) -> u64 {
        self.operations
    }

    /// Runs `program` from the saved frames until it halts.
    ///
    /// `breakpoints` must be aligned with `program.opcodes`. A breakpoint that
    /// fires is cleared, so calling again resumes past it. With
    /// `ignore_breakpoints` set every breakpoint is stepped over.
    pub fn execute(
        &mut self,
        program: &Program,
        mut breakpoints: Option<&mut [bool]>,
        ignore_breakpoints: bool,
    ) -> ExitCode {
        if self.stack.is_empty() {
            return ExitCode::Success;
        }

        let budget = Budget::start(&self.options.cancellation, self.options.time_budget);
        let ops = &program.opcodes;
        let jump_table = &program.jump_table;

        'frames: loop {
            let frame = *self.stack.current();
            let mut i = frame.offset;

            while i < frame.range.end {
                if let Some(bp) = breakpoints.as_deref_mut() {
                    if bp[i] && !ignore_breakpoints {
                        bp[i] = false;
                        return self.halt(i, ExitCode::BreakpointReached);
                    }
                }

                let op = ops[i];

                match op.operator {
                    Operator::ForwardPtr => {
                        if !self.state.try_move_next(op.count, &mut self.operations) {
                            return self.halt(i, ExitCode::UpperBoundExceeded);
                        }
                    }
                    Operator::BackwardPtr => {
                        if !self.state.try_move_back(op.count, &mut self.operations) {
                            return self.halt(i, ExitCode::LowerBoundExceeded);
                        }
                    }
                    Operator::Plus => {
                        if !self.state.try_increment(op.count, &mut self.operations) {
                            return self.halt(i, ExitCode::MaxValueExceeded);
                        }
                    }
                    Operator::Minus => {
                        if !self.state.try_decrement(op.count, &mut self.operations) {
                            return self.halt(i, ExitCode::NegativeValue);
                        }
                    }
                    Operator::PrintChar => {
                        if !self.stdout.try_write(self.state.current()) {
                            return self.halt(i, ExitCode::StdoutBufferLimitExceeded);
                        }
                        self.operations += 1;
                    }
                    Operator::ReadChar => {
                        let Some(c) = self.stdin.try_read() else {
                            return self.halt(i, ExitCode::StdinBufferExhausted);
                        };
                        if !self.state.try_input(c) {
                            return self.halt(i, ExitCode::MaxValueExceeded);
                        }
                        self.operations += 1;
                    }
                    Operator::LoopStart => {
                        let value = self.state.current();
                        if value == 0 {
                            self.operations += 1;
                            i = jump_table[i];
                        } else if is_reset_loop(program, i, breakpoints.as_deref()) {
                            // `[-]`: same count as iterating, `[` once plus `-` and `]` per unit
                            self.operations += value as u64 * 2 + 1;
                            self.state.reset_cell();
                            i += 2;
                        } else {
                            self.operations += 1;
                        }
                    }
                    Operator::LoopEnd => {
                        if self.state.current() > 0 {
                            // halt on the `]` itself so a resume takes the back-edge again
                            if budget.is_exhausted() {
                                return self.halt(i, ExitCode::ThresholdExceeded);
                            }
                            i = jump_table[i];
                        }
                        self.operations += 1;
                    }
                    Operator::FunctionStart => {
                        let key = self.state.current();
                        let end = jump_table[i];
                        if !self.functions.try_define(key, i, Range::new(i + 1, end)) {
                            return self.halt(i, ExitCode::DuplicateFunctionDefinition);
                        }
                        self.operations += 1;
                        i = end;
                    }
                    Operator::FunctionEnd => {}
                    Operator::FunctionCall => {
                        let key = self.state.current();
                        let Some(body) = self.functions.get(key) else {
                            return self.halt(i, ExitCode::UndefinedFunctionCalled);
                        };
                        if self.stack.is_full() {
                            return self.halt(i, ExitCode::StackLimitExceeded);
                        }
                        if budget.is_exhausted() {
                            return self.halt(i, ExitCode::ThresholdExceeded);
                        }
                        self.operations += 1;
                        self.stack.push(i + 1, body);
                        trace!(key, depth = self.stack.depth(), "enter function");
                        continue 'frames;
                    }
                }

                i += 1;
            }

            self.stack.pop();
            trace!(depth = self.stack.depth(), "frame exhausted");

            if self.stack.is_empty() {
                debug!(operations = self.operations, "script completed");
                return ExitCode::Success;
            }
        }
    }

    /// Saves `i` as the active frame's resume point and reports `code`.
    fn halt(&mut self, i: usize, code: ExitCode) -> ExitCode {
        self.stack.current_mut().offset = i;
        debug!(
            offset = i,
            depth = self.stack.depth(),
            operations = self.operations,
            exit_code = ?code,
            "execution halted"
        );
        code
    }
}

/// `true` if the loop opened at `i` is exactly `[-]` and neither body
/// opcode carries a breakpoint.
fn is_reset_loop(program: &Program, i: usize, breakpoints: Option<&[bool]>) -> bool {
    let ops = &program.opcodes;
    if program.jump_table[i] != i + 2 {
        return false;
    }
    let body = ops[i + 1];
    if body.operator != Operator::Minus || body.count != 1 {
        return false;
    }
    match breakpoints {
        Some(bp) => !bp[i + 1] && !bp[i + 2],
        None => true,
    }
}

/// Runs `source` to completion on a fresh tape.
pub fn run(source: &str, stdin: &str, config: &MachineConfig) -> Result<InterpreterResult> {
    let state = MachineState::new(config.memory_size, config.overflow_mode)?;
    run_on(source, stdin, state, config.options.clone())
}

/// Runs `source` to completion starting from a copy of `state`.
pub fn run_with_state(
    source: &str,
    stdin: &str,
    state: &MachineState,
    options: &RunOptions,
) -> Result<InterpreterResult> {
    run_on(source, stdin, state.clone(), options.clone())
}

fn run_on(
    source: &str,
    stdin: &str,
    state: MachineState,
    options: RunOptions,
) -> Result<InterpreterResult> {
    let program = compile(source, &validate(source), CompileMode::Compressed)?;
    let mut vm = VmBc::new(&program, state, stdin, options);

    let start = Instant::now();
    let exit_code = vm.execute(&program, None, true);
    let elapsed = start.elapsed();

    Ok(InterpreterResult::build(source, &program, &vm, exit_code, elapsed))
}
