//! Single forward pass that normalises opcodes and fixes up the two
//! instructions known to be tampered with: `LOADK`'s constant index and
//! `JMP`'s jump target.

use xluac_format::instruction::Instruction;
use xluac_format::opcode::{normalize_opcode, OP_JMP, OP_LOADK};

/// Repairs one function's decrypted code region in place.
///
/// `code` is a mutable view over the function's raw little-endian
/// instruction words. `num_consts` is the constant table size, required to
/// fix `LOADK`'s `Bx` modulo the table size.
pub fn repair_instructions(code: &mut [u32], num_consts: u32) {
    let count = code.len();

    for pc in 0..count {
        let raw = code[pc];
        let op = normalize_opcode((raw & 0x7F) as u8);
        let mut instr = Instruction(raw).with_opcode(op);

        if op == OP_LOADK && num_consts > 0 {
            let fixed_bx = instr.bx() % num_consts;
            instr = instr.with_bx(fixed_bx);
        } else if op == OP_JMP {
            instr = fix_jump(instr, pc, count);
        }

        code[pc] = instr.0;
    }
}

/// Wraps (not clamps) a `JMP` target into `[0, count)` by repeatedly adding
/// or subtracting `count` until it lands in range, then re-encodes `sBx` so
/// the jump still lands on the wrapped target. Instructions already in range
/// are left byte-for-byte untouched.
fn fix_jump(instr: Instruction, pc: usize, count: usize) -> Instruction {
    if count == 0 {
        return instr;
    }

    let count = count as i64;
    let target = pc as i64 + 1 + instr.sbx() as i64;

    if target >= 0 && target < count {
        return instr;
    }

    let mut wrapped = target;
    while wrapped < 0 {
        wrapped += count;
    }
    while wrapped >= count {
        wrapped -= count;
    }

    let new_sbx = (wrapped - (pc as i64 + 1)) as i32;
    instr.with_sbx(new_sbx)
}
