//! The fixed 84-entry Lua 5.4 opcode table, as consumed by this format.
//!
//! Opcode 54 (`CLOSE` in stock Lua 5.4) is repurposed by this container
//! format as an uninterpreted marker; it is kept in the table for
//! completeness but is never treated as a branch or a register user.

pub const MAX_OPCODE: u8 = 83;
pub const GAME_CUSTOM_OPCODE: u8 = 54;
pub const EXTRAARG_OPCODE: u8 = 82;

pub const OP_LOADK: u8 = 3;
pub const OP_LOADKX: u8 = 4;
pub const OP_SELF: u8 = 20;
pub const OP_CLOSURE: u8 = 80;
pub const OP_JMP: u8 = 57;
pub const OP_FORLOOP: u8 = 74;
pub const OP_FORPREP: u8 = 75;
pub const OP_TFORPREP: u8 = 76;
pub const OP_TFORLOOP: u8 = 78;
pub const OP_RETURN: u8 = 71;
pub const OP_RETURN0: u8 = 72;
pub const OP_RETURN1: u8 = 73;
pub const OP_LFALSESKIP: u8 = 6;
pub const OP_MMBIN: u8 = 46;
pub const OP_MMBINI: u8 = 47;
pub const OP_MMBINK: u8 = 48;
pub const OP_SETLIST: u8 = 79;
pub const OP_EXTRAARG: u8 = 83;

/// Opcodes whose `EQ..GEI, TEST, TESTSET` family has two fixed successors:
/// `pc+1` (no branch) and `pc+2` (skip next instruction).
pub const CONDITIONAL_TEST_OPCODES: [u8; 11] = [58, 59, 60, 61, 62, 63, 64, 65, 66, 67, 68];

/// Opcodes whose `B`/`C` operand fields are never plain registers (constant
/// index, jump offset, proto index, or otherwise not a stack slot), used by
/// the register/maxstack analyser to decide which fields to consider.
pub const BC_NOT_REGISTER_OPCODES: &[u8] = &[
    3, 4, // LOADK, LOADKX
    13, 17, 21, // GETI, SETI, ADDI
    22, 23, 24, 25, 26, 27, 28, 29, 30, 31, // ADDK..BXORK, GETTABUP, SETTABUP
    32, 33, // SHRI, SHLI
    57, // JMP
    60, 61, 62, 63, 64, 65, // EQK..GEI
    73, 74, 75, 76, 77, // RETURN1, FORLOOP, FORPREP, TFORPREP, TFORLOOP
    80, // CLOSURE
    83, // EXTRAARG
];

pub fn is_register_field_excluded(op: u8) -> bool {
    BC_NOT_REGISTER_OPCODES.contains(&op)
}
