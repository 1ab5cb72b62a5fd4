//! Error kinds shared across the envelope engine.

use thiserror::Error;

/// Everything that can go wrong building, parsing, or verifying a container.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLV walk ran past end of buffer at offset {offset}")]
    Truncated { offset: usize },

    #[error("expected tag {expected:#04x} at offset {offset}, found {found:#04x}")]
    BadTag {
        offset: usize,
        expected: u8,
        found: u8,
    },

    #[error("unknown tag {tag:#04x} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },

    #[error("unsupported algorithm identifier {value}")]
    UnsupportedAlgorithm { value: u32 },

    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    #[error("missing mandatory field: {0}")]
    MissingField(&'static str),

    #[error("certificate could not be decoded: {0}")]
    InvalidCertificate(String),

    #[error("signature verification failed")]
    InvalidSignature,

    #[error("decrypted plaintext hash does not match ENCRYPTION_HASH")]
    HashMismatch,

    #[error("value of {len} bytes exceeds the 16-bit TLV length limit")]
    LengthOverflow { len: usize },
}

pub type Result<T> = std::result::Result<T, EnvelopeError>;
