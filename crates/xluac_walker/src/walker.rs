//! Recursive descent over the prototype tree: the heart of the decrypter.

use crate::constants::{peek_constants, walk_constants};
use crate::cursor::Cursor;
use crate::error::CoreError;
use crate::reachability::mark_reachable;
use crate::registers::{max_register, repaired_maxstack};
use crate::repair::repair_instructions;
use crate::strings::consume_string;
use byteorder::{ByteOrder, LittleEndian};
use log::{debug, trace};
use xluac_crypto::seed::inner_seed;
use xluac_crypto::{bruteforce_and_decrypt, decrypt_code};

const MAX_DEPTH: u32 = 50;
const MAX_PROTO_COUNT: u64 = 10_000;
const MAX_PROTO_ADVANCE: usize = 10_000_000;

/// Caches the per-file `seed16` across every prototype in one file, the way
/// the reference decrypter's file-scoped static does, but scoped to a single
/// call instead of process-wide state.
#[derive(Default)]
pub struct SeedCache {
    seed16: Option<u16>,
}

impl SeedCache {
    pub fn new() -> Self {
        SeedCache { seed16: None }
    }

    /// Decrypts `code` (a function's raw instruction bytes) in place,
    /// discovering `seed16` via brute force on the first call and reusing it
    /// on every subsequent call in the same file.
    fn decrypt(&mut self, code: &mut [u8], linedefined: u32) -> Result<(), CoreError> {
        match self.seed16 {
            Some(seed16) => {
                let seed = inner_seed(linedefined, seed16);
                decrypt_code(code, seed);
                Ok(())
            }
            None => {
                let seed16 = bruteforce_and_decrypt(code, linedefined)
                    .map_err(|_| CoreError::BruteForceFailed)?;
                debug!("discovered file seed16={seed16:#06x}");
                self.seed16 = Some(seed16);
                Ok(())
            }
        }
    }
}

/// Recursively decrypts one prototype (and everything nested under it)
/// starting at the cursor's current position.
pub fn decrypt_function(
    cursor: &mut Cursor,
    encryption_flag: u8,
    depth: u32,
    seeds: &mut SeedCache,
) -> Result<(), CoreError> {
    if depth > MAX_DEPTH {
        return Err(CoreError::UnreasonableCount(format!(
            "prototype nesting exceeded depth {MAX_DEPTH}"
        )));
    }

    // 1. Source name.
    consume_string(cursor, encryption_flag)?;

    // 2. Header scalars.
    let linedefined = cursor.read_varint()? as u32;
    let _lastlinedefined = cursor.read_varint()?;
    let _numparams = cursor.read_u8()?;
    let _is_vararg = cursor.read_u8()?;
    let maxstack_offset = cursor.pos;
    let current_maxstack = cursor.read_u8()?;

    // 3. Code region.
    let sizecode = cursor.read_varint()? as u32;
    let code_offset = cursor.pos;
    let code_len = sizecode as usize * 4;

    if cursor.pos + code_len > cursor.buf.len() {
        return Err(CoreError::NoForwardProgress);
    }

    // 4. Peek ahead past the (possibly still encrypted) code region to learn
    //    `num_consts`, which the LOADK repair needs.
    let (num_consts, _) = peek_constants(cursor.buf, code_offset + code_len)?;

    // 5. Decrypt + repair + analyse, if this prototype is encrypted.
    if encryption_flag != 0 && sizecode > 0 {
        let code_bytes = &mut cursor.buf[code_offset..code_offset + code_len];
        seeds.decrypt(code_bytes, linedefined)?;

        let mut words = vec![0u32; sizecode as usize];
        LittleEndian::read_u32_into(code_bytes, &mut words);

        repair_instructions(&mut words, num_consts);
        let (reachable, info) = mark_reachable(&words);
        if info.has_holes {
            trace!("prototype at depth {depth} has unreachable holes in its code");
        }

        let max_reg = max_register(&words, &reachable);
        if let Some(fixed) = repaired_maxstack(max_reg, current_maxstack) {
            cursor.buf[maxstack_offset] = fixed;
        }

        LittleEndian::write_u32_into(&words, &mut cursor.buf[code_offset..code_offset + code_len]);
    }

    // 6. Advance past the code region (trimming is analysed but not applied).
    cursor.pos = code_offset + code_len;

    // 7. Constants.
    walk_constants(cursor, encryption_flag)?;

    // 8. Upvalue descriptors (instack, idx, kind — 3 bytes each, untouched).
    let num_upvalues = cursor.read_varint()?;
    cursor.skip(num_upvalues as usize * 3)?;

    // 9. Nested prototypes.
    let num_protos = cursor.read_varint()?;
    if num_protos > MAX_PROTO_COUNT {
        return Err(CoreError::UnreasonableCount(format!(
            "prototype count {num_protos} exceeds {MAX_PROTO_COUNT}"
        )));
    }
    for _ in 0..num_protos {
        let proto_start = cursor.pos;
        decrypt_function(cursor, encryption_flag, depth + 1, seeds)?;
        let consumed = cursor.pos - proto_start;
        if consumed == 0 {
            return Err(CoreError::NoForwardProgress);
        }
        if consumed > MAX_PROTO_ADVANCE {
            return Err(CoreError::NoForwardProgress);
        }
    }

    // 10. Debug info.
    decrypt_debug_info(cursor, encryption_flag)?;

    Ok(())
}

/// Lineinfo, abslineinfo, local variables, and upvalue names. Everything
/// here is read-only except local/upvalue name decryption, and nothing is
/// ever re-encoded: see the module docs on why that would misalign offsets.
fn decrypt_debug_info(cursor: &mut Cursor, encryption_flag: u8) -> Result<(), CoreError> {
    let lineinfo_bytes = cursor.read_varint()?;
    cursor.skip(lineinfo_bytes as usize)?;

    let sizeabslineinfo = cursor.read_varint()?;
    for _ in 0..sizeabslineinfo {
        let _pc = cursor.read_varint()?;
        let _line = cursor.read_varint()?;
    }

    let sizelocvars = cursor.read_varint()?;
    for _ in 0..sizelocvars {
        consume_string(cursor, encryption_flag)?;
        let _startpc = cursor.read_varint()?;
        let _endpc = cursor.read_varint()?;
    }

    let sizeupvalue_names = cursor.read_varint()?;
    for _ in 0..sizeupvalue_names {
        consume_string(cursor, encryption_flag)?;
    }

    Ok(())
}
