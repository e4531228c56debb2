pub mod cancellation;
pub mod config;
pub mod exit_code;
pub mod function_table;
pub mod io_buffer;
pub mod machine_state;
pub mod result;
pub mod session;
pub mod stack_frame;
pub mod stack_trace;
pub mod vm_bc;

pub use cancellation::CancellationToken;
pub use config::{MachineConfig, RunOptions};
pub use exit_code::ExitCode;
pub use machine_state::{MachineState, OverflowMode};
pub use result::{FunctionDefinition, HaltingInfo, InterpreterResult};
pub use session::Session;
pub use vm_bc::{VmBc, run, run_with_state};
