//! RC4 variants and the per-file seed oracle.

pub mod rc4;
pub mod seed;

pub use rc4::{code_key, decrypt_code, decrypt_string, string_key, Rc4};
pub use seed::{bruteforce_and_decrypt, bruteforce_seed16, inner_seed, SeedError};
