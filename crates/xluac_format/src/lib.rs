//! Binary layout of the Lua 5.4 chunk container this tool operates on:
//! varints, instruction bit-fields, the opcode table, and the chunk header.
//!
//! This crate only knows about *shape*. Decryption and repair live in
//! [`xluac_crypto`](../xluac_crypto) and [`xluac_walker`](../xluac_walker).

pub mod header;
pub mod instruction;
pub mod opcode;
pub mod varint;

pub use header::{ChunkHeader, HeaderError, HeaderVariant};
pub use instruction::Instruction;
pub use varint::{read_varint, write_varint, VarintError};
