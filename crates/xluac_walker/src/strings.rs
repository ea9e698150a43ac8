//! Length-prefixed string reading, with optional RC4 decryption in place.
//!
//! On the wire a string is a varint `L` followed by `L - 1` payload bytes
//! (`L == 0` denotes a null string, with no payload at all). `L` counts the
//! terminating NUL that Lua stores internally but which is never present in
//! the serialized payload.

use crate::cursor::Cursor;
use crate::error::CoreError;
use xluac_crypto::decrypt_string;

/// Reads a string at the cursor, decrypting its payload in place when
/// `encryption_flag` is set. Returns the byte length actually consumed
/// (varint + payload), not the string contents, since callers only need to
/// advance past it or inspect the patched bytes.
pub fn consume_string(cursor: &mut Cursor, encryption_flag: u8) -> Result<(), CoreError> {
    let len = cursor.read_varint()?;
    if len == 0 {
        return Ok(());
    }

    let payload_len = (len - 1) as usize;
    let payload = cursor.take_mut(payload_len)?;

    if encryption_flag != 0 && (payload_len as u32) % 254 != 0 {
        decrypt_string(payload, payload_len as u32);
    }

    Ok(())
}

/// Like [`consume_string`], but does not touch the bytes at all; used by the
/// peek-ahead pass, which only needs to skip past constants without
/// decrypting them (decryption happens once, during the real walk).
pub fn skip_string_len(buf: &[u8], offset: usize) -> Result<usize, CoreError> {
    let (len, varint_len) = xluac_format::varint::read_varint(buf, offset)?;
    if len == 0 {
        Ok(varint_len)
    } else {
        Ok(varint_len + (len - 1) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_string_consumes_only_the_varint() {
        let mut buf = xluac_format::varint::write_varint(0);
        let mut cursor = Cursor::new(&mut buf, 0);
        consume_string(&mut cursor, 1).unwrap();
        assert_eq!(cursor.pos, 1);
    }

    #[test]
    fn nonempty_string_is_decrypted_when_flag_set() {
        let payload = b"hi".to_vec(); // on-disk len = 3 (2 bytes + implicit NUL)
        let mut buf = xluac_format::varint::write_varint(3);
        buf.extend_from_slice(&payload);
        let original_payload = buf[1..].to_vec();

        let mut cursor = Cursor::new(&mut buf, 0);
        consume_string(&mut cursor, 1).unwrap();

        assert_ne!(&buf[1..], &original_payload[..]);
    }

    #[test]
    fn skip_string_len_matches_varint_plus_payload() {
        let mut buf = xluac_format::varint::write_varint(5);
        buf.extend_from_slice(&[0u8; 4]);
        let len = skip_string_len(&buf, 0).unwrap();
        assert_eq!(len, buf.len());
    }
}
