//! AES-128-CBC for the ENC profile's configuration payload.
//!
//! The engine applies its own `0x0D`-byte padding (spec.md §9) before
//! calling [`aes_cbc_encrypt`], so the cipher itself is configured with
//! [`NoPadding`] rather than a library padding scheme.

use aes::Aes128;
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use envelope_types::{EnvelopeError, Result};

type Encryptor = cbc::Encryptor<Aes128>;
type Decryptor = cbc::Decryptor<Aes128>;

/// Encrypt already block-aligned plaintext. `key` and `iv` are each exactly
/// 16 bytes (AES-128, IV width equals the block size).
pub fn aes_cbc_encrypt(key: &[u8; 16], iv: &[u8; 16], data: &[u8]) -> Result<Vec<u8>> {
    if data.len() % 16 != 0 {
        return Err(EnvelopeError::UnsupportedAlgorithm {
            value: data.len() as u32,
        });
    }
    let encryptor = Encryptor::new(key.into(), iv.into());
    Ok(encryptor.encrypt_padded_vec_mut::<NoPadding>(data))
}

/// Decrypt a block-aligned ciphertext. Callers strip the explicit
/// `ENCRYPTION_PADDING` count themselves afterward (spec.md §9: never scan
/// for the `0x0D` byte value).
pub fn aes_cbc_decrypt(key: &[u8; 16], iv: &[u8; 16], data: &[u8]) -> Result<Vec<u8>> {
    if data.len() % 16 != 0 || data.is_empty() {
        return Err(EnvelopeError::UnsupportedAlgorithm {
            value: data.len() as u32,
        });
    }
    let decryptor = Decryptor::new(key.into(), iv.into());
    decryptor
        .decrypt_padded_vec_mut::<NoPadding>(data)
        .map_err(|_| EnvelopeError::HashMismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_block_aligned_data() {
        let key = [0x42u8; 16];
        let iv = [0x24u8; 16];
        let plain = b"0123456789ABCDEF0123456789ABCDEF";
        let cipher = aes_cbc_encrypt(&key, &iv, plain).unwrap();
        let back = aes_cbc_decrypt(&key, &iv, &cipher).unwrap();
        assert_eq!(back, plain);
    }

    #[test]
    fn rejects_unaligned_input() {
        let key = [0u8; 16];
        let iv = [0u8; 16];
        assert!(aes_cbc_encrypt(&key, &iv, b"short").is_err());
    }
}
