use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::bytecode::ir::Program;
use crate::runtime::exit_code::ExitCode;
use crate::runtime::machine_state::MachineState;
use crate::runtime::stack_trace::build_stack_trace;
use crate::runtime::vm_bc::VmBc;

/// A function declared during the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Cell value the function is keyed by.
    pub key: u16,
    /// Position in declaration order.
    pub index: usize,
    /// Source character offset of the defining `(`.
    pub offset: usize,
    /// Operators of the body, comments stripped.
    pub body: String,
}

/// Where and why execution stopped short of completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HaltingInfo {
    /// Source fragments, innermost first.
    pub stack_trace: Vec<String>,
    pub halting_operator: char,
    /// Source character offset of `halting_operator`.
    pub halting_offset: usize,
}

/// Snapshot returned by every run or session step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpreterResult {
    pub source_code: String,
    pub exit_code: ExitCode,
    pub halting_info: Option<HaltingInfo>,
    pub machine_state: MachineState,
    pub function_definitions: Vec<FunctionDefinition>,
    pub stdin: String,
    pub stdout: String,
    pub elapsed: Duration,
    pub total_operations: u64,
}

impl InterpreterResult {
    pub(crate) fn build(
        source: &str,
        program: &Program,
        vm: &VmBc,
        exit_code: ExitCode,
        elapsed: Duration,
    ) -> Self {
        let function_definitions = vm
            .functions
            .definitions()
            .iter()
            .enumerate()
            .map(|(index, &(key, declaration))| FunctionDefinition {
                key,
                index,
                offset: program.offsets[declaration],
                body: program.source_of(declaration + 1, program.jump_table[declaration]),
            })
            .collect();

        let halting_info = if exit_code.is_success() || vm.stack.is_empty() {
            None
        } else {
            let offset = vm.stack.current().offset;
            Some(HaltingInfo {
                stack_trace: build_stack_trace(program, &vm.stack),
                halting_operator: program.opcodes[offset].operator.as_char(),
                halting_offset: program.offsets[offset],
            })
        };

        InterpreterResult {
            source_code: source.to_string(),
            exit_code,
            halting_info,
            machine_state: vm.state.clone(),
            function_definitions,
            stdin: vm.stdin.text(),
            stdout: vm.stdout.as_str().to_string(),
            elapsed,
            total_operations: vm.operations,
        }
    }

    /// One-line status: exit code, operation count and elapsed time.
    pub fn summary(&self) -> String {
        format!(
            "{} ({} operations in {:.3}ms)",
            self.exit_code,
            self.total_operations,
            self.elapsed.as_secs_f64() * 1000.0
        )
    }
}

impl std::fmt::Display for InterpreterResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.summary())?;

        if let Some(info) = &self.halting_info {
            write!(
                f,
                "\n  halted on '{}' at offset {}",
                info.halting_operator, info.halting_offset
            )?;
            if !info.stack_trace.is_empty() {
                write!(f, "\n  stack trace:")?;
                for (i, frame) in info.stack_trace.iter().enumerate() {
                    write!(f, "\n    {}: {}", i, frame)?;
                }
            }
        }

        if !self.function_definitions.is_empty() {
            write!(f, "\n  functions:")?;
            for def in &self.function_definitions {
                write!(f, "\n    [{}] key {}: {}", def.index, def.key, def.body)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::config::MachineConfig;
    use crate::runtime::exit_code::ExitCode;
    use crate::runtime::vm_bc::run;

    #[test]
    fn test_stack_trace_ordering() {
        let result = run("+++++[>+++>-<<-]", "", &MachineConfig::default()).unwrap();
        assert_eq!(result.exit_code, ExitCode::NegativeValue);
        let info = result.halting_info.expect("halting info");
        assert_eq!(info.stack_trace, vec![">+++>-", "+++++["]);
        assert_eq!(info.halting_operator, '-');
        assert_eq!(info.halting_offset, 11);
    }

    #[test]
    fn test_trace_through_function_call() {
        let result = run("(+<):", "", &MachineConfig::default()).unwrap();
        assert_eq!(result.exit_code, ExitCode::LowerBoundExceeded);
        let info = result.halting_info.expect("halting info");
        assert_eq!(info.stack_trace, vec!["+<", "(+<):"]);
        assert_eq!(info.halting_operator, '<');
        assert_eq!(info.halting_offset, 2);
    }

    #[test]
    fn test_function_definitions_listed_in_order() {
        let result = run("+(-)>(++ comment +)", "", &MachineConfig::default()).unwrap();
        assert_eq!(result.exit_code, ExitCode::Success);
        let defs = &result.function_definitions;
        assert_eq!(defs.len(), 2);
        assert_eq!((defs[0].key, defs[0].index, defs[0].offset), (1, 0, 1));
        assert_eq!(defs[0].body, "-");
        assert_eq!((defs[1].key, defs[1].index, defs[1].offset), (0, 1, 5));
        assert_eq!(defs[1].body, "+++");
    }

    #[test]
    fn test_display_includes_trace() {
        let result = run("<", "", &MachineConfig::default()).unwrap();
        let text = result.to_string();
        assert!(text.contains("pointer moved before the start of the tape"));
        assert!(text.contains("0: <"));
    }
}
