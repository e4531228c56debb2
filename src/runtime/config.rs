use std::time::Duration;

use crate::runtime::cancellation::CancellationToken;
use crate::runtime::io_buffer::DEFAULT_STDOUT_LIMIT;
use crate::runtime::machine_state::{DEFAULT_MEMORY_SIZE, OverflowMode};

/// Limits applied to a run, independent of the tape it starts from.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Maximum number of characters `.` may write.
    pub stdout_limit: usize,
    /// Wall-clock budget per engine invocation, polled at loop back-edges
    /// and function calls.
    pub time_budget: Option<Duration>,
    pub cancellation: CancellationToken,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            stdout_limit: DEFAULT_STDOUT_LIMIT,
            time_budget: None,
            cancellation: CancellationToken::new(),
        }
    }
}

/// Tape shape plus run limits.
#[derive(Debug, Clone)]
pub struct MachineConfig {
    pub memory_size: usize,
    pub overflow_mode: OverflowMode,
    pub options: RunOptions,
}

impl Default for MachineConfig {
    fn default() -> Self {
        MachineConfig {
            memory_size: DEFAULT_MEMORY_SIZE,
            overflow_mode: OverflowMode::default(),
            options: RunOptions::default(),
        }
    }
}

impl MachineConfig {
    pub fn new(memory_size: usize, overflow_mode: OverflowMode) -> Self {
        MachineConfig {
            memory_size,
            overflow_mode,
            options: RunOptions::default(),
        }
    }

    pub fn with_stdout_limit(mut self, limit: usize) -> Self {
        self.options.stdout_limit = limit;
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.options.time_budget = Some(budget);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.options.cancellation = token;
        self
    }
}
