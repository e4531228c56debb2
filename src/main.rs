use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fs, process};

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use pbrain::bytecode::compile::{CompileMode, compile};
use pbrain::bytecode::disasm::print_bc;
use pbrain::frontend::lexer::{Lexer, validate};
use pbrain::frontend::token_dumper::TokenDumper;
use pbrain::runtime::machine_state::DEFAULT_MEMORY_SIZE;
use pbrain::{InterpreterResult, MachineConfig, MachineState, OverflowMode, RunOptions, Session};

#[derive(Parser, Debug)]
#[command(name = "pbrain")]
#[command(about = "Run or debug a PBrain script")]
struct Args {
    /// Script to run
    file: PathBuf,

    /// Text fed to `,`
    #[arg(long, default_value = "")]
    stdin: String,

    /// Number of tape cells (32 to 1024)
    #[arg(long, default_value_t = DEFAULT_MEMORY_SIZE)]
    memory: usize,

    /// byte-wrap, byte-checked, ushort-wrap or ushort-checked
    #[arg(long, default_value = "byte-checked")]
    mode: OverflowMode,

    /// Stop with ThresholdExceeded after this many milliseconds
    #[arg(long = "budget-ms")]
    budget_ms: Option<u64>,

    /// Pause at this character offset (repeatable)
    #[arg(long = "break")]
    breakpoints: Vec<usize>,

    /// Show operators only
    #[arg(long)]
    tokens: bool,

    /// Disable colors in --tokens output
    #[arg(long)]
    no_color: bool,

    /// Print the compiled opcodes
    #[arg(long = "bc", alias = "bytecode")]
    bytecode: bool,

    /// Start from a tape written by --save-state
    #[arg(long)]
    load_state: Option<PathBuf>,

    /// Write the final tape to this file
    #[arg(long)]
    save_state: Option<PathBuf>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let args = Args::parse();

    let source = match fs::read_to_string(&args.file) {
        Ok(source) => source,
        Err(e) => {
            error!("failed to read '{}': {}", args.file.display(), e);
            process::exit(1);
        }
    };

    if args.tokens {
        dump_tokens(&source, args.no_color);
        return;
    }

    let validation = validate(&source);
    if !validation.is_success() {
        eprintln!("Syntax error: {}", validation);
        process::exit(1);
    }

    if args.bytecode {
        match compile(&source, &validation, CompileMode::Compressed) {
            Ok(program) => print_bc(&program),
            Err(e) => {
                eprintln!("Compile error: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    let mut options = RunOptions::default();
    options.time_budget = args.budget_ms.map(Duration::from_millis);

    let result = if args.breakpoints.is_empty() {
        run_program(&source, &args, options)
    } else {
        debug_program(&source, &args, options)
    };

    print_result(&result);

    if let Some(path) = &args.save_state {
        save_state(path, &result.machine_state);
    }

    if !result.exit_code.is_success() {
        process::exit(1);
    }
}

fn dump_tokens(source: &str, no_color: bool) {
    let operators: Vec<_> = Lexer::new(source).operators().collect();
    let mut dumper = TokenDumper::new().pretty();
    if no_color {
        dumper = dumper.no_color();
    }
    dumper.dump(&operators);
}

fn run_program(source: &str, args: &Args, options: RunOptions) -> InterpreterResult {
    let outcome = match &args.load_state {
        Some(path) => {
            if overrides_loaded_state(args) {
                warn!("--memory and --mode are ignored when --load-state is given");
            }
            let state = load_state(path);
            pbrain::run_with_state(source, &args.stdin, &state, &options)
        }
        None => {
            let mut config = MachineConfig::new(args.memory, args.mode);
            config.options = options;
            pbrain::run(source, &args.stdin, &config)
        }
    };

    match outcome {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// `true` if `--memory` or `--mode` was changed, which a loaded tape overrides.
fn overrides_loaded_state(args: &Args) -> bool {
    args.memory != DEFAULT_MEMORY_SIZE || args.mode != OverflowMode::default()
}

fn debug_program(source: &str, args: &Args, options: RunOptions) -> InterpreterResult {
    if args.load_state.is_some() {
        warn!("--load-state is ignored when breakpoints are set");
    }

    let mut config = MachineConfig::new(args.memory, args.mode);
    config.options = options;

    let mut session = match Session::new(source, &args.breakpoints, &args.stdin, &config) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    loop {
        let result = session.continue_execution();
        if !result.exit_code.is_breakpoint() {
            return result;
        }
        if let Some(info) = &result.halting_info {
            println!(
                "-- breakpoint at offset {} ('{}'), {} operations so far",
                info.halting_offset, info.halting_operator, result.total_operations
            );
            println!(
                "   pointer {} = {}",
                result.machine_state.pointer(),
                result.machine_state.current()
            );
        }
    }
}

fn print_result(result: &InterpreterResult) {
    if !result.stdout.is_empty() {
        println!("{}", result.stdout);
    }
    info!(
        exit_code = ?result.exit_code,
        operations = result.total_operations,
        "run finished"
    );
    eprintln!("{}", result);
}

fn load_state(path: &Path) -> MachineState {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("failed to read '{}': {}", path.display(), e);
            process::exit(1);
        }
    };
    match MachineState::from_bytes(&bytes) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn save_state(path: &Path, state: &MachineState) {
    let written = state
        .to_bytes()
        .map_err(|e| e.to_string())
        .and_then(|bytes| fs::write(path, bytes).map_err(|e| e.to_string()));
    if let Err(e) = written {
        error!("failed to write '{}': {}", path.display(), e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_do_not_override_loaded_state() {
        assert!(!overrides_loaded_state(&args(&["pbrain", "a.pb", "--load-state", "t.bin"])));
    }

    #[test]
    fn test_memory_or_mode_override_loaded_state() {
        assert!(overrides_loaded_state(&args(&["pbrain", "a.pb", "--memory", "64"])));
        assert!(overrides_loaded_state(&args(&["pbrain", "a.pb", "--mode", "ushort-wrap"])));
    }

    #[test]
    fn test_parse_breakpoints_and_budget() {
        let a = args(&["pbrain", "a.pb", "--break", "3", "--break", "7", "--budget-ms", "10"]);
        assert_eq!(a.breakpoints, vec![3, 7]);
        assert_eq!(a.budget_ms, Some(10));
        assert_eq!(a.mode, OverflowMode::ByteWithNoOverflow);
    }
}
