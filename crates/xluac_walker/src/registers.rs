//! Scans a function's reachable instructions for the highest register
//! number actually used, and repairs `maxstacksize` when it under-reports.

use xluac_format::instruction::Instruction;
use xluac_format::opcode::is_register_field_excluded;

const VARARG_SENTINEL: u32 = 250;

/// Returns the highest register referenced by any reachable instruction's
/// `A`, `B`, or `C` field (excluding fields the opcode uses for something
/// other than a register, and excluding the vararg sentinel `250`).
pub fn max_register(code: &[u32], reachable: &[bool]) -> u32 {
    let mut max_reg = 0u32;

    for (pc, &word) in code.iter().enumerate() {
        if !reachable.get(pc).copied().unwrap_or(true) {
            continue;
        }

        let instr = Instruction(word);
        let op = instr.opcode();

        let a = instr.a();
        if a < VARARG_SENTINEL && a > max_reg {
            max_reg = a;
        }

        if !is_register_field_excluded(op) {
            let b = instr.b();
            let c = instr.c();
            if b < VARARG_SENTINEL && b > max_reg {
                max_reg = b;
            }
            if c < VARARG_SENTINEL && c > max_reg {
                max_reg = c;
            }
        }
    }

    max_reg
}

/// Given the observed `max_reg` and the prototype's declared `current_max`,
/// decides whether `maxstacksize` needs patching, and to what value.
pub fn repaired_maxstack(max_reg: u32, current_max: u8) -> Option<u8> {
    let current_max = current_max as u32;
    if max_reg + 5 >= current_max || max_reg >= current_max {
        let patched = if max_reg >= 240 { 250 } else { (max_reg + 8).min(255) };
        Some(patched as u8)
    } else {
        None
    }
}
