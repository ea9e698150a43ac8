//! Constant-table reading: both the byte-counting "peek" used to discover
//! `num_consts` before the code region has been touched, and the real walk
//! that decrypts string constants in place.

use crate::cursor::Cursor;
use crate::error::CoreError;
use crate::strings::{consume_string, skip_string_len};
use xluac_format::header::{
    TAG_BOOLEAN_FALSE, TAG_BOOLEAN_TRUE, TAG_LONG_STR, TAG_NIL, TAG_NUMBER_FLOAT, TAG_NUMBER_INT,
    TAG_SHORT_STR,
};
use xluac_format::varint::read_varint;

/// Reads the constant count at `offset` and walks past every constant
/// without touching the bytes, returning the count and the offset just
/// past the table. Used to discover `num_consts` while the code region
/// that precedes it is still encrypted.
pub fn peek_constants(buf: &[u8], offset: usize) -> Result<(u32, usize), CoreError> {
    let (num_consts, mut pos) = match read_varint(buf, offset) {
        Ok((v, len)) => (v as u32, offset + len),
        Err(_) => return Ok((0, offset)),
    };

    for _ in 0..num_consts {
        if pos >= buf.len() {
            break;
        }
        let tag = buf[pos];
        pos += 1;

        match tag {
            TAG_NUMBER_INT | TAG_NUMBER_FLOAT => pos += 8,
            TAG_SHORT_STR | TAG_LONG_STR => {
                let consumed = skip_string_len(buf, pos)?;
                pos += consumed;
            }
            TAG_NIL | TAG_BOOLEAN_FALSE | TAG_BOOLEAN_TRUE => {}
            _ => break,
        }
    }

    Ok((num_consts, pos))
}

/// Walks the constant table for real, decrypting string payloads in place.
pub fn walk_constants(cursor: &mut Cursor, encryption_flag: u8) -> Result<(), CoreError> {
    let num_consts = cursor.read_varint()? as u32;

    for _ in 0..num_consts {
        if cursor.remaining() == 0 {
            break;
        }
        let tag = cursor.read_u8()?;

        match tag {
            TAG_NUMBER_INT | TAG_NUMBER_FLOAT => {
                cursor.skip(8)?;
            }
            TAG_SHORT_STR | TAG_LONG_STR => {
                consume_string(cursor, encryption_flag)?;
            }
            TAG_NIL | TAG_BOOLEAN_FALSE | TAG_BOOLEAN_TRUE => {}
            other => return Err(CoreError::UnknownConstTag(other)),
        }
    }

    Ok(())
}
