//! Chunk-level normalisation: header variant detection, RSA-block and
//! flag-byte stripping, and driving the prototype walk over the main chunk.

use crate::cursor::Cursor;
use crate::error::CoreError;
use crate::walker::{decrypt_function, SeedCache};
use log::{debug, info};
use xluac_format::header::{read_header, FLAG1_CUSTOM, RSA_BLOCK_SIZE};

/// Decrypts and normalises a chunk buffer in place, leaving it as a
/// standard Lua 5.4 dump (modulo the RSA-block/flag-byte strip, which
/// changes the buffer's length). A single `seed16` brute force runs against
/// the outermost prototype; every nested prototype reuses it.
pub fn normalize_and_decrypt(buf: &mut Vec<u8>) -> Result<(), CoreError> {
    let header = read_header(buf)?;
    info!(
        "chunk header: flag1={:#04x} encryption_flag={:#04x} variant={:?}",
        header.flag1, header.encryption_flag, header.variant
    );

    let header_size = header.variant.header_size();
    let mut pos = header_size;

    // The single nupvalues byte for the implicit top-level upvalue list,
    // read here (and only here) before the main prototype body begins.
    let _nupvalues = *buf.get(pos).ok_or(CoreError::NoForwardProgress)?;
    pos += 1;

    let mut seeds = SeedCache::new();
    {
        let mut cursor = Cursor::new(buf.as_mut_slice(), pos);
        decrypt_function(&mut cursor, header.encryption_flag, 0, &mut seeds)?;
    }

    if header.encryption_flag != 0 {
        buf[6] = 0;
    }

    // Always attempted, regardless of encryption: a file that was already
    // decrypted upstream can still carry the custom header shape.
    normalize_custom_header(buf);

    Ok(())
}

/// Mirrors the reference normaliser: if byte `[5]` still reads as the custom
/// format marker, removes the two bytes at offsets `[6]` and `[7]` (the
/// `flag1`/`flag2` slots), zeroes the byte that slides into their place, and
/// — if a 128-byte block follows the 31-byte standard header — removes it
/// too. No-op on a buffer that's already in standard form.
fn normalize_custom_header(buf: &mut Vec<u8>) {
    if buf.len() < 40 || buf[5] != FLAG1_CUSTOM {
        return;
    }

    buf.drain(6..8);
    buf[5] = 0x00;

    let rsa_start = 31;
    if buf.len() > rsa_start + RSA_BLOCK_SIZE {
        buf.drain(rsa_start..rsa_start + RSA_BLOCK_SIZE);
    }

    debug!("normalised chunk header, new length {}", buf.len());
}
