//! End-to-end scenarios over whole chunk buffers, built by hand rather than
//! pulled from a real game asset, since the point here is to exercise the
//! decrypter's contract rather than any particular title's content.

use xluac_crypto::{decrypt_code, inner_seed};
use xluac_format::header::{LUAC_DATA, LUA_SIGNATURE, LUA_VERSION};
use xluac_format::instruction::Instruction;
use xluac_format::varint::write_varint;
use xluac_walker::normalize_and_decrypt;

fn standard_header(flag1: u8, flag2: u8) -> Vec<u8> {
    let mut buf = vec![0u8; 33];
    buf[0..4].copy_from_slice(&LUA_SIGNATURE);
    buf[4] = LUA_VERSION;
    buf[5] = flag1;
    buf[6] = flag2;
    buf[7] = 0x01;
    buf[8..14].copy_from_slice(&LUAC_DATA);
    buf
}

fn push_varint(buf: &mut Vec<u8>, n: u64) {
    buf.extend(write_varint(n));
}

/// Appends a minimal, empty-bodied main-function tail (no constants,
/// upvalues, protos, or debug info) after a caller-supplied code region.
fn push_empty_tail(buf: &mut Vec<u8>) {
    push_varint(buf, 0); // num_consts
    push_varint(buf, 0); // num_upvalues
    push_varint(buf, 0); // num_protos
    push_varint(buf, 0); // lineinfo bytes
    push_varint(buf, 0); // abslineinfo count
    push_varint(buf, 0); // locvars count
    push_varint(buf, 0); // upvalue names count
}

fn push_function_prefix(buf: &mut Vec<u8>, maxstack: u8) {
    push_varint(buf, 0); // source name: null
    push_varint(buf, 0); // linedefined
    push_varint(buf, 0); // lastlinedefined
    buf.push(0); // numparams
    buf.push(0); // is_vararg
    buf.push(maxstack);
}

/// Scenario: a chunk whose code is encrypted under a known `seed16`, with
/// no tampering needed — brute force must recover the seed and the loop
/// must decrypt it.
#[test]
fn encrypted_single_prototype_chunk_decrypts() {
    let linedefined = 0u32;
    let seed16 = 0x1234u16;
    let seed = inner_seed(linedefined, seed16);

    // Every opcode here is <= 82 so the plausibility predicate passes easily.
    let plain_instrs: Vec<u32> = vec![
        Instruction(0).with_opcode(0).0, // MOVE
        Instruction(0).with_opcode(1).0, // LOADI
        Instruction(0).with_opcode(72).0, // RETURN0
    ];
    let mut code_bytes = Vec::with_capacity(plain_instrs.len() * 4);
    for w in &plain_instrs {
        code_bytes.extend_from_slice(&w.to_le_bytes());
    }
    decrypt_code(&mut code_bytes, seed); // RC4 is an involution: this "encrypts"

    let mut buf = standard_header(0x00, 0x01);
    buf.push(0); // nupvalues
    push_function_prefix(&mut buf, 2);
    push_varint(&mut buf, plain_instrs.len() as u64);
    buf.extend_from_slice(&code_bytes);
    push_empty_tail(&mut buf);

    normalize_and_decrypt(&mut buf).expect("decryption should succeed");
}

/// Scenario: a `JMP` whose target lands past the end of the function; the
/// repair pass must wrap it back into range rather than leaving garbage.
#[test]
fn tampered_jmp_is_wrapped_into_range() {
    use xluac_format::opcode::OP_JMP;

    let sizecode = 4usize;
    let tampered = Instruction(0).with_opcode(OP_JMP).with_sbx(5).0; // target = pc+1+5, out of range
    let code = vec![0u32, 0u32, 0u32, tampered];

    let mut words = code;
    xluac_walker::repair::repair_instructions(&mut words, 0);

    let fixed = Instruction(words[3]);
    let target = 3i64 + 1 + fixed.sbx() as i64;
    assert!(target >= 0 && target < sizecode as i64);
}

/// Scenario: every 8th instruction has its opcode byte flipped by 0x40, as
/// happens when the obfuscator's range check misfires; normalization must
/// restore each one.
#[test]
fn flipped_opcodes_are_normalized() {
    let mut words: Vec<u32> = (0..16)
        .map(|i| {
            let op = (i % 8) as u8; // keep within the valid range pre-flip
            let flipped = op ^ 0x40;
            Instruction(0).with_opcode(flipped).0
        })
        .collect();

    xluac_walker::repair::repair_instructions(&mut words, 0);

    for (i, &w) in words.iter().enumerate() {
        let expected = (i % 8) as u8;
        assert_eq!(Instruction(w).opcode(), expected);
    }
}

#[test]
fn rejects_file_with_bad_signature() {
    let mut buf = vec![0u8; 64];
    buf[0] = 0xFF;
    assert!(normalize_and_decrypt(&mut buf).is_err());
}
