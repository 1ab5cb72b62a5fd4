//! Algorithm identifiers carried in the envelope header.

use crate::error::EnvelopeError;

/// `HASH_ALGORITHM` (tag 8) value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HashAlgorithm {
    Sha1 = 1,
    Sha256 = 2,
    Sha512 = 3,
}

impl TryFrom<u8> for HashAlgorithm {
    type Error = EnvelopeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Sha1),
            2 => Ok(Self::Sha256),
            3 => Ok(Self::Sha512),
            other => Err(EnvelopeError::UnsupportedAlgorithm {
                value: other as u32,
            }),
        }
    }
}

impl HashAlgorithm {
    pub fn tag_value(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
        }
    }

    /// Digest length in bytes.
    pub fn digest_len(self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }

    /// SHA-256 (tag value 2) is recognized on parse but this engine never
    /// produces it (spec.md §6) — the signing keys in use always declare
    /// SHA-1 or SHA-512. Profile builders call this before assembling a
    /// header so the restriction lives in one place.
    pub fn assert_producible(self) -> Result<(), EnvelopeError> {
        match self {
            Self::Sha1 | Self::Sha512 => Ok(()),
            Self::Sha256 => Err(EnvelopeError::UnsupportedAlgorithm { value: self as u32 }),
        }
    }
}

/// `SIGNATURE_MODULUS` (tag 11) encodes the signature byte length as an
/// index into a fixed table rather than the length itself.
const MODULUS_TABLE: [usize; 4] = [64, 128, 256, 512];

pub fn modulus_index_to_len(index: u8) -> Result<usize, EnvelopeError> {
    MODULUS_TABLE
        .get(index as usize)
        .copied()
        .ok_or(EnvelopeError::UnsupportedAlgorithm {
            value: index as u32,
        })
}

/// The inverse mapping. Only 2048-bit (256-byte signature) and 4096-bit
/// (512-byte signature) RSA keys produce a representable index; 1024-bit and
/// 3072-bit keys are refused at build time (spec open question, §9).
pub fn signature_len_to_modulus_index(len: usize) -> Result<u8, EnvelopeError> {
    match len {
        256 | 512 => MODULUS_TABLE
            .iter()
            .position(|&l| l == len)
            .map(|i| i as u8)
            .ok_or(EnvelopeError::UnsupportedAlgorithm { value: len as u32 }),
        _ => Err(EnvelopeError::UnsupportedAlgorithm { value: len as u32 }),
    }
}

/// `SIGNATURE_ALGORITHM` (tag 10) — a single supported value.
pub const SIGNATURE_ALGORITHM_RSA_PKCS1: u8 = 0;

/// `KEY_ALGORITHM` (tag 24) inside `ENCRYPTION_KEY_INFO` — a single
/// supported value (RSA key wrap).
pub const KEY_ALGORITHM_RSA: u8 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_parses_but_is_not_producible() {
        let algo = HashAlgorithm::try_from(2).unwrap();
        assert_eq!(algo, HashAlgorithm::Sha256);
        assert!(algo.assert_producible().is_err());
    }

    #[test]
    fn sha1_and_sha512_are_producible() {
        assert!(HashAlgorithm::Sha1.assert_producible().is_ok());
        assert!(HashAlgorithm::Sha512.assert_producible().is_ok());
    }

    #[test]
    fn modulus_index_round_trips_supported_lengths() {
        for len in [256usize, 512] {
            let index = signature_len_to_modulus_index(len).unwrap();
            assert_eq!(modulus_index_to_len(index).unwrap(), len);
        }
    }

    #[test]
    fn modulus_index_rejects_unsupported_length() {
        assert!(signature_len_to_modulus_index(192).is_err());
    }

    #[test]
    fn modulus_index_rejects_1024_and_3072_bit_keys() {
        assert!(signature_len_to_modulus_index(64).is_err());
        assert!(signature_len_to_modulus_index(128).is_err());
    }
}
