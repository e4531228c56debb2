use std::time::{Duration, Instant};

use tracing::debug;

use crate::bytecode::compile::{CompileMode, compile};
use crate::bytecode::ir::Program;
use crate::error::{Error, Result};
use crate::frontend::lexer::validate;
use crate::runtime::config::MachineConfig;
use crate::runtime::exit_code::ExitCode;
use crate::runtime::machine_state::MachineState;
use crate::runtime::result::InterpreterResult;
use crate::runtime::vm_bc::VmBc;

/// A resumable, breakpoint-aware run of one script.
///
/// Tables, frames and tape are built once and kept across pauses, so the
/// final result after any number of breakpoint stops matches an
/// uninterrupted run.
#[derive(Debug, Clone)]
pub struct Session {
    source: String,
    program: Program,
    /// One slot per source operator.
    breakpoints: Vec<bool>,
    vm: VmBc,
    elapsed: Duration,
    exit_code: Option<ExitCode>,
}

impl Session {
    /// Compiles `source` and places breakpoints at the given character
    /// offsets. An offset on a comment breaks at the next operator.
    pub fn new(
        source: &str,
        breakpoints: &[usize],
        stdin: &str,
        config: &MachineConfig,
    ) -> Result<Self> {
        let program = compile(source, &validate(source), CompileMode::Uncompressed)?;
        let state = MachineState::new(config.memory_size, config.overflow_mode)?;

        let len = source.chars().count();
        let mut table = vec![false; program.len()];
        for &offset in breakpoints {
            if offset >= len {
                return Err(Error::BreakpointOutOfRange { offset, len });
            }
            let index = program.offsets.partition_point(|&o| o < offset);
            if index < table.len() {
                table[index] = true;
            }
        }

        debug!(
            operators = program.len(),
            breakpoints = table.iter().filter(|&&b| b).count(),
            "session created"
        );

        let vm = VmBc::new(&program, state, stdin, config.options.clone());

        Ok(Self {
            source: source.to_string(),
            program,
            breakpoints: table,
            vm,
            elapsed: Duration::ZERO,
            exit_code: None,
        })
    }

    /// Runs until the next breakpoint or the end of the script.
    pub fn continue_execution(&mut self) -> InterpreterResult {
        self.step(false)
    }

    /// Runs to the end, stepping over every remaining breakpoint.
    pub fn run_to_completion(&mut self) -> InterpreterResult {
        loop {
            let result = self.step(true);
            if !result.exit_code.is_breakpoint() {
                return result;
            }
        }
    }

    /// `true` once the script halted for any reason other than a breakpoint.
    pub fn is_completed(&self) -> bool {
        self.exit_code.is_some_and(|code| !code.is_breakpoint())
    }

    pub fn exit_code(&self) -> Option<ExitCode> {
        self.exit_code
    }

    pub fn current_state(&self) -> &MachineState {
        self.vm.state()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    fn step(&mut self, ignore_breakpoints: bool) -> InterpreterResult {
        if let Some(code) = self.exit_code.filter(|code| !code.is_breakpoint()) {
            return self.snapshot(code);
        }

        let start = Instant::now();
        let code = self
            .vm
            .execute(&self.program, Some(&mut self.breakpoints), ignore_breakpoints);
        self.elapsed += start.elapsed();
        self.exit_code = Some(code);

        self.snapshot(code)
    }

    fn snapshot(&self, code: ExitCode) -> InterpreterResult {
        InterpreterResult::build(&self.source, &self.program, &self.vm, code, self.elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::machine_state::OverflowMode;
    use crate::runtime::vm_bc::run;

    // ============================================================
    // Test Helpers
    // ============================================================

    fn session(source: &str, breakpoints: &[usize], stdin: &str) -> Session {
        Session::new(source, breakpoints, stdin, &MachineConfig::default()).expect("valid script")
    }

    /// Continue until the session completes, collecting every pause.
    fn drain(session: &mut Session) -> (Vec<InterpreterResult>, InterpreterResult) {
        let mut pauses = Vec::new();
        loop {
            let result = session.continue_execution();
            if !result.exit_code.is_breakpoint() {
                return (pauses, result);
            }
            pauses.push(result);
        }
    }

    const SCRIPTS: &[(&str, &str)] = &[
        ("+++++", ""),
        ("++++++++[>++++[>++>+++<<-]>+<<-]>>.>.", ""),
        ("+++++[>+++>-<<-]", ""),
        ("(+++):>:", ""),
        (",[.,]", "hello"),
        ("(++)>+(<::):", ""),
        ("+++[-]>++[-]<", ""),
        ("(:):", ""),
    ];

    // ============================================================
    // Determinism
    // ============================================================

    #[test]
    fn test_session_without_breakpoints_matches_run() {
        for &(source, stdin) in SCRIPTS {
            let expected = run(source, stdin, &MachineConfig::default()).unwrap();
            let actual = session(source, &[], stdin).run_to_completion();
            assert_eq!(actual.exit_code, expected.exit_code, "script: {}", source);
            assert_eq!(actual.stdout, expected.stdout, "script: {}", source);
            assert_eq!(
                actual.total_operations, expected.total_operations,
                "script: {}",
                source
            );
        }
    }

    #[test]
    fn test_breakpoints_do_not_change_results() {
        for &(source, stdin) in SCRIPTS {
            let expected = run(source, stdin, &MachineConfig::default()).unwrap();
            let len = source.chars().count();
            for stride in 1..=3 {
                let offsets: Vec<usize> = (0..len).step_by(stride).collect();
                let mut s = session(source, &offsets, stdin);
                let (_, actual) = drain(&mut s);
                assert_eq!(actual.exit_code, expected.exit_code, "script: {}", source);
                assert_eq!(actual.stdout, expected.stdout, "script: {}", source);
                assert_eq!(
                    actual.total_operations, expected.total_operations,
                    "script: {} stride {}",
                    source, stride
                );
                assert_eq!(
                    actual.machine_state.cells(),
                    expected.machine_state.cells(),
                    "script: {}",
                    source
                );
            }
        }
    }

    // ============================================================
    // Breakpoints
    // ============================================================

    #[test]
    fn test_breakpoint_pauses_before_operator() {
        let mut s = session("+++>++", &[3], "");
        let paused = s.continue_execution();
        assert_eq!(paused.exit_code, ExitCode::BreakpointReached);
        assert_eq!(paused.total_operations, 3);
        assert_eq!(paused.machine_state.pointer(), 0);
        let info = paused.halting_info.expect("halting info");
        assert_eq!(info.halting_operator, '>');
        assert_eq!(info.halting_offset, 3);
        assert_eq!(info.stack_trace, vec!["+++>"]);

        let done = s.continue_execution();
        assert_eq!(done.exit_code, ExitCode::Success);
        assert_eq!(done.machine_state.cells()[1], 2);
        assert!(s.is_completed());
    }

    #[test]
    fn test_breakpoint_is_one_shot_inside_loop() {
        let mut s = session("+++[>+<-]", &[4], "");
        let (pauses, done) = drain(&mut s);
        assert_eq!(pauses.len(), 1);
        assert_eq!(done.exit_code, ExitCode::Success);
        assert_eq!(done.machine_state.cells()[1], 3);
    }

    #[test]
    fn test_breakpoint_on_comment_moves_to_next_operator() {
        let mut s = session("+ x +", &[2], "");
        let paused = s.continue_execution();
        assert_eq!(paused.exit_code, ExitCode::BreakpointReached);
        assert_eq!(paused.halting_info.unwrap().halting_offset, 4);
    }

    #[test]
    fn test_breakpoint_in_function_body() {
        let mut s = session("(++):", &[2], "");
        let paused = s.continue_execution();
        assert_eq!(paused.exit_code, ExitCode::BreakpointReached);
        let info = paused.halting_info.unwrap();
        assert_eq!(info.stack_trace, vec!["++", "(++):"]);
        assert_eq!(s.continue_execution().machine_state.current(), 2);
    }

    #[test]
    fn test_breakpoint_disables_reset_fast_path() {
        let mut s = session("+++[-]", &[4], "");
        let paused = s.continue_execution();
        assert_eq!(paused.exit_code, ExitCode::BreakpointReached);
        assert_eq!(paused.machine_state.current(), 3);
        let done = s.run_to_completion();
        assert_eq!(done.machine_state.current(), 0);
        assert_eq!(done.total_operations, 3 + 3 * 2 + 1);
    }

    #[test]
    fn test_run_to_completion_skips_remaining_breakpoints() {
        let mut s = session("+>+>+", &[0, 2, 4], "");
        assert!(s.continue_execution().exit_code.is_breakpoint());
        let done = s.run_to_completion();
        assert_eq!(done.exit_code, ExitCode::Success);
        assert_eq!(done.total_operations, 5);
    }

    #[test]
    fn test_completed_session_returns_final_snapshot() {
        let mut s = session("+<", &[], "");
        let first = s.continue_execution();
        assert_eq!(first.exit_code, ExitCode::LowerBoundExceeded);
        let again = s.continue_execution();
        assert_eq!(again.exit_code, ExitCode::LowerBoundExceeded);
        assert_eq!(again.total_operations, first.total_operations);
    }

    #[test]
    fn test_breakpoint_out_of_range() {
        let err = Session::new("+", &[1], "", &MachineConfig::default()).unwrap_err();
        assert!(matches!(err, Error::BreakpointOutOfRange { offset: 1, len: 1 }));
    }

    #[test]
    fn test_session_syntax_error() {
        let err = Session::new("(", &[], "", &MachineConfig::default()).unwrap_err();
        assert!(err.syntax().is_some());
    }

    #[test]
    fn test_session_threshold() {
        let config = MachineConfig::new(64, OverflowMode::ByteWithOverflow)
            .with_time_budget(Duration::from_millis(20));
        let mut s = Session::new("+[]", &[], "", &config).unwrap();
        let result = s.run_to_completion();
        assert_eq!(result.exit_code, ExitCode::ThresholdExceeded);
        assert!(s.is_completed());
    }
}
