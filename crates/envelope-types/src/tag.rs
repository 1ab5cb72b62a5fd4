//! Tag numbering for the envelope grammar.
//!
//! The schema is the single source of truth for tag bytes — nothing outside
//! this module should hard-code a tag value.

/// Tags that appear in an envelope header (VERSION..SIGNER_VERSION).
pub mod header {
    pub const VERSION: u8 = 1;
    pub const HEADER_LENGTH: u8 = 2;
    pub const SIGNER_INFO: u8 = 3;
    pub const SIGNER_NAME: u8 = 4;
    pub const SERIAL_NUMBER: u8 = 5;
    pub const ISSUER_NAME: u8 = 6;
    pub const SIGNATURE_INFO: u8 = 7;
    pub const HASH_ALGORITHM: u8 = 8;
    pub const SIGNATURE_ALGORITHM_INFO: u8 = 9;
    pub const SIGNATURE_ALGORITHM: u8 = 10;
    pub const SIGNATURE_MODULUS: u8 = 11;
    pub const SIGNATURE: u8 = 12;
    pub const PADDING: u8 = 13;
    pub const FILENAME: u8 = 14;
    pub const TIMESTAMP: u8 = 15;
    pub const ENCRYPTION_INFO: u8 = 16;
    pub const ENCRYPTION_IV_INFO: u8 = 17;
    pub const ENCRYPTION_UNKNOWN1: u8 = 18;
    pub const ENCRYPTION_IV: u8 = 19;
    pub const ENCRYPTION_PADDING: u8 = 20;
    pub const ENCRYPTION_KEY_INFO: u8 = 21;
    pub const ENCRYPTION_UNKNOWN2: u8 = 22;
    pub const ENCRYPTION_KEY_SIZE: u8 = 23;
    pub const ENCRYPTION_KEY_ALGORITHM: u8 = 24;
    pub const ENCRYPTION_KEY: u8 = 25;
    pub const ENCRYPTION_HASH_ALGORITHM: u8 = 26;
    pub const ENCRYPTION_HASH: u8 = 27;
    pub const SIGNER_VERSION: u8 = 28;

    /// Container tags whose bodies are walked transparently (nested TLVs
    /// appear as peers in the flat iteration) rather than opaque blobs.
    pub const CONTAINER_TAGS: &[u8] = &[
        SIGNER_INFO,
        SIGNATURE_INFO,
        SIGNATURE_ALGORITHM_INFO,
        ENCRYPTION_INFO,
        ENCRYPTION_IV_INFO,
        ENCRYPTION_KEY_INFO,
    ];

    pub fn is_container(tag: u8) -> bool {
        CONTAINER_TAGS.contains(&tag)
    }
}

/// Tags used inside a trust-list `CertificateRecord`. This is a distinct
/// namespace from [`header`] — e.g. `RECORD_LENGTH` reuses byte value 1 but
/// means something entirely different from `VERSION`.
pub mod record {
    pub const RECORD_LENGTH: u8 = 1;
    pub const SUBJECT_NAME: u8 = 3;
    pub const ROLE: u8 = 4;
    pub const ISSUER_NAME: u8 = 5;
    pub const SERIAL_NUMBER: u8 = 6;
    pub const PUBLIC_KEY: u8 = 7;
    pub const SIGNATURE: u8 = 8;
    pub const CERTIFICATE: u8 = 9;
    /// Recognized on parse, never emitted by this engine.
    pub const IP_ADDRESS: u8 = 10;
    pub const CERTIFICATE_HASH: u8 = 11;
    pub const CERTIFICATE_HASH_ALGORITHM: u8 = 12;
}

/// The one tag whose length is never framed — a bare `0x0D` filler byte.
pub const PADDING: u8 = header::PADDING;
