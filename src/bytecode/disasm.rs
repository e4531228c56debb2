use std::fmt::Write;

use crate::bytecode::ir::Program;
use crate::bytecode::op::{Opcode, Operator};

/// Print disassembly of a compiled program
pub fn print_bc(program: &Program) {
    print!("{}", disassemble(program));
}

/// Render a compiled program one opcode per line, marking jump targets.
pub fn disassemble(program: &Program) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "════════════════════════════════════════");
    let _ = writeln!(out, " main ({:?})", program.mode);
    let _ = writeln!(
        out,
        " {} opcodes, {} operators, {} functions",
        program.len(),
        program.operator_count,
        program.function_count
    );
    let _ = writeln!(out, "════════════════════════════════════════");

    let targets = collect_jump_targets(program);

    for (ip, op) in program.opcodes.iter().enumerate() {
        if targets.contains(&ip) {
            let _ = writeln!(out, "      ┌──────────────────────────────────");
        }

        let marker = if targets.contains(&ip) { "► " } else { "  " };
        let _ = write!(out, "{:04} {}", ip, marker);
        let _ = writeln!(out, "{}", format_op(op, program.jump_table[ip], program.offsets[ip]));
    }

    out
}

fn collect_jump_targets(program: &Program) -> Vec<usize> {
    let mut targets = Vec::new();

    for (ip, op) in program.opcodes.iter().enumerate() {
        if matches!(op.operator, Operator::LoopStart | Operator::LoopEnd) {
            let target = program.jump_table[ip];
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
    }

    targets
}

fn format_op(op: &Opcode, partner: usize, offset: usize) -> String {
    let text = match op.operator {
        Operator::ForwardPtr => format!("FWD         {}", op.count),
        Operator::BackwardPtr => format!("BACK        {}", op.count),
        Operator::Plus => format!("INC         {}", op.count),
        Operator::Minus => format!("DEC         {}", op.count),
        Operator::PrintChar => "PRINT".to_string(),
        Operator::ReadChar => "READ".to_string(),
        Operator::LoopStart => format!("JZ          -> {:04}", partner),
        Operator::LoopEnd => format!("JNZ         -> {:04}", partner),
        Operator::FunctionStart => format!("DEF         ..{:04}", partner),
        Operator::FunctionEnd => "END".to_string(),
        Operator::FunctionCall => "CALL".to_string(),
    };
    format!("{:<28}; @{}", text, offset)
}
