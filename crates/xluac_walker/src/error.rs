//! Error kinds surfaced by the walker and chunk driver.

use thiserror::Error;
use xluac_format::header::HeaderError;
use xluac_format::varint::VarintError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("malformed chunk header: {0}")]
    MalformedHeader(#[from] HeaderError),

    #[error("varint read past end of buffer")]
    VarintExhausted,

    #[error("brute-force seed search failed for the outermost prototype")]
    BruteForceFailed,

    #[error("unreasonable count encountered: {0}")]
    UnreasonableCount(String),

    #[error("prototype walk made no forward progress, or advanced implausibly far")]
    NoForwardProgress,

    #[error("unknown constant tag {0:#04x}")]
    UnknownConstTag(u8),

    #[error("the external Lua loader rejected the normalised chunk: {0}")]
    LoaderRejected(String),
}

impl From<VarintError> for CoreError {
    fn from(_: VarintError) -> Self {
        CoreError::VarintExhausted
    }
}
