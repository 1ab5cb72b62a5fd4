//! Hash functions and certificate fingerprinting.

use envelope_types::HashAlgorithm;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

/// Hash `data` with the envelope's signature hash algorithm.
pub fn compute_hash(algorithm: HashAlgorithm, data: &[u8]) -> Vec<u8> {
    match algorithm {
        HashAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
        HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
    }
}

/// Algorithms used for certificate fingerprinting. Distinct from
/// [`HashAlgorithm`] because the ENC pointer file's `<certHash>` (spec.md
/// §4.4.3 step 9) is always MD5, independent of the envelope's own
/// signature hash choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerprintAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

pub fn fingerprint(cert_der: &[u8], algorithm: FingerprintAlgorithm) -> Vec<u8> {
    match algorithm {
        FingerprintAlgorithm::Md5 => md5::Md5::digest(cert_der).to_vec(),
        FingerprintAlgorithm::Sha1 => Sha1::digest(cert_der).to_vec(),
        FingerprintAlgorithm::Sha256 => Sha256::digest(cert_der).to_vec(),
        FingerprintAlgorithm::Sha512 => Sha512::digest(cert_der).to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_is_20_bytes() {
        assert_eq!(compute_hash(HashAlgorithm::Sha1, b"hello").len(), 20);
    }

    #[test]
    fn sha512_is_64_bytes() {
        assert_eq!(compute_hash(HashAlgorithm::Sha512, b"hello").len(), 64);
    }

    #[test]
    fn md5_fingerprint_is_16_bytes() {
        assert_eq!(fingerprint(b"certificate-der", FingerprintAlgorithm::Md5).len(), 16);
    }
}
