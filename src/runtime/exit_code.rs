use serde::{Deserialize, Serialize};

/// How an engine invocation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitCode {
    /// The root frame ran to its end.
    Success,
    /// A breakpoint paused execution; the run can be resumed.
    BreakpointReached,
    UpperBoundExceeded,
    LowerBoundExceeded,
    MaxValueExceeded,
    NegativeValue,
    StdoutBufferLimitExceeded,
    StdinBufferExhausted,
    /// The execution budget ran out or the run was cancelled.
    ThresholdExceeded,
    DuplicateFunctionDefinition,
    UndefinedFunctionCalled,
    StackLimitExceeded,
}

impl ExitCode {
    pub fn is_success(self) -> bool {
        self == ExitCode::Success
    }

    pub fn is_breakpoint(self) -> bool {
        self == ExitCode::BreakpointReached
    }

    /// A fault raised by the script itself or by the execution budget.
    pub fn is_exception(self) -> bool {
        !self.is_success() && !self.is_breakpoint()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            ExitCode::Success => "success",
            ExitCode::BreakpointReached => "breakpoint reached",
            ExitCode::UpperBoundExceeded => "pointer moved past the end of the tape",
            ExitCode::LowerBoundExceeded => "pointer moved before the start of the tape",
            ExitCode::MaxValueExceeded => "cell value above the maximum",
            ExitCode::NegativeValue => "cell value below zero",
            ExitCode::StdoutBufferLimitExceeded => "stdout buffer full",
            ExitCode::StdinBufferExhausted => "stdin buffer exhausted",
            ExitCode::ThresholdExceeded => "execution threshold exceeded",
            ExitCode::DuplicateFunctionDefinition => "function already defined",
            ExitCode::UndefinedFunctionCalled => "undefined function called",
            ExitCode::StackLimitExceeded => "stack limit exceeded",
        };
        write!(f, "{}", text)
    }
}
