//! RC4 keystream generator shared by the string and code variants.
//!
//! Both variants use an 8-byte key buffer, cycled with `key[i & 7]` during
//! key scheduling, and differ only in how that buffer is populated and in
//! where the generated keystream is applied.

/// A freshly scheduled RC4 state. Call [`Rc4::apply`] to XOR a keystream of
/// the matching length into a buffer, optionally skipping a prefix.
pub struct Rc4 {
    s: [u8; 256],
    i: u8,
    j: u8,
}

impl Rc4 {
    /// Key-scheduling algorithm over an 8-byte key.
    pub fn new(key: &[u8; 8]) -> Self {
        let mut s = [0u8; 256];
        for (idx, slot) in s.iter_mut().enumerate() {
            *slot = idx as u8;
        }

        let mut j: u8 = 0;
        for i in 0..256usize {
            j = j.wrapping_add(s[i]).wrapping_add(key[i & 7]);
            s.swap(i, j as usize);
        }

        Rc4 { s, i: 0, j: 0 }
    }

    fn next_byte(&mut self) -> u8 {
        self.i = self.i.wrapping_add(1);
        self.j = self.j.wrapping_add(self.s[self.i as usize]);
        self.s.swap(self.i as usize, self.j as usize);
        let t = self.s[self.i as usize].wrapping_add(self.s[self.j as usize]);
        self.s[t as usize]
    }

    /// Advances the keystream by `count` bytes without applying them,
    /// matching the code-RC4 variant's "skip the first 4 bytes" rule.
    pub fn skip(&mut self, count: usize) {
        for _ in 0..count {
            self.next_byte();
        }
    }

    /// XORs a keystream of `buf.len()` bytes into `buf` in place.
    pub fn apply(&mut self, buf: &mut [u8]) {
        for byte in buf.iter_mut() {
            *byte ^= self.next_byte();
        }
    }
}

/// Builds the 8-byte key for string decryption: all zero except the last two
/// bytes, derived from the string's payload length (the on-disk varint minus
/// one, i.e. excluding the implicit trailing NUL Lua never serializes).
pub fn string_key(payload_len: u32) -> [u8; 8] {
    let mut key = [0u8; 8];
    let lo = (payload_len % 254) as u8;
    key[6] = lo;
    key[7] = lo.wrapping_add(1);
    key
}

/// Builds the 8-byte key for code decryption from the per-function inner
/// seed.
pub fn code_key(seed: u16) -> [u8; 8] {
    let mut key = [0u8; 8];
    key[6] = (seed & 0xFF) as u8;
    key[7] = ((seed >> 8) & 0xFF) as u8;
    key
}

/// Decrypts (or encrypts; RC4 is an involution) a string payload in place.
/// `payload_len` is the payload's own length, not the on-disk varint (which
/// is one larger). Strings whose payload length is a multiple of 254 are
/// stored in clear and must be left untouched by the caller; this function
/// assumes that check already happened.
pub fn decrypt_string(payload: &mut [u8], payload_len: u32) {
    let mut rc4 = Rc4::new(&string_key(payload_len));
    rc4.apply(payload);
}

/// Decrypts a function's code region in place. The first instruction (4
/// bytes) is left untouched by construction: the keystream is advanced past
/// it but never applied there.
pub fn decrypt_code(code: &mut [u8], seed: u16) {
    if code.len() <= 4 {
        return;
    }
    let mut rc4 = Rc4::new(&code_key(seed));
    rc4.skip(4);
    rc4.apply(&mut code[4..]);
}
