//! RSA / EC key material and the PKCS#1 v1.5 signing and key-wrap
//! operations the envelope binder and the ENC profile build on.

use der::Encode;
use envelope_types::{EnvelopeError, HashAlgorithm, Result};
use pkcs1::EncodeRsaPublicKey;
use pkcs8::DecodePublicKey;
use rand_core::{CryptoRng, RngCore};
use rsa::{Pkcs1v15Encrypt, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use x509_cert::Certificate;

use crate::cert::{public_key_algorithm, PublicKeyAlgorithm};
use crate::hash::compute_hash;

/// A private key as loaded from PEM. Only the RSA variant is ever asked to
/// sign an envelope; the EC variant exists so a trust-list record's own
/// (unused here) private half can still be parsed without erroring.
pub enum PrivateKeyMaterial {
    Rsa(RsaPrivateKey),
    Ec(p256::SecretKey),
}

impl PrivateKeyMaterial {
    pub fn rsa(&self) -> Result<&RsaPrivateKey> {
        match self {
            Self::Rsa(key) => Ok(key),
            Self::Ec(_) => Err(EnvelopeError::UnsupportedKeyType(
                "envelope signing requires an RSA private key".to_string(),
            )),
        }
    }
}

/// A public key as carried by a certificate, tagged by type (spec.md §9:
/// "model as a tagged union `KeyMaterial { Rsa(DER), Ec(Point) }`").
pub enum KeyMaterial {
    Rsa(RsaPublicKey),
    Ec(p256::EncodedPoint),
}

/// Extract the public key from a certificate's `SubjectPublicKeyInfo`.
pub fn public_key(cert: &Certificate) -> Result<KeyMaterial> {
    match public_key_algorithm(cert)? {
        PublicKeyAlgorithm::Rsa => {
            let spki_der = cert
                .tbs_certificate
                .subject_public_key_info
                .to_der()
                .map_err(|e| EnvelopeError::InvalidCertificate(e.to_string()))?;
            let key = RsaPublicKey::from_public_key_der(&spki_der)
                .map_err(|e| EnvelopeError::InvalidCertificate(e.to_string()))?;
            Ok(KeyMaterial::Rsa(key))
        }
        PublicKeyAlgorithm::Ec => {
            let bits = &cert.tbs_certificate.subject_public_key_info.subject_public_key;
            let raw = bits
                .as_bytes()
                .ok_or_else(|| EnvelopeError::InvalidCertificate("unaligned EC point bits".into()))?;
            let point = p256::EncodedPoint::from_bytes(raw)
                .map_err(|e| EnvelopeError::InvalidCertificate(e.to_string()))?;
            Ok(KeyMaterial::Ec(point))
        }
    }
}

/// Encode a public key the way a trust-list `PUBLIC_KEY` record field
/// expects: RSA as a PKCS#1 `RSAPublicKey` DER structure, EC as a bare
/// X9.62 uncompressed point (spec.md §4.4.2 step 4).
pub fn encode_public_key(key: &KeyMaterial) -> Result<Vec<u8>> {
    match key {
        KeyMaterial::Rsa(pk) => pk
            .to_pkcs1_der()
            .map(|doc| doc.as_bytes().to_vec())
            .map_err(|e| EnvelopeError::InvalidCertificate(e.to_string())),
        KeyMaterial::Ec(point) => Ok(point.as_bytes().to_vec()),
    }
}

/// RSA modulus size in bits, used to pick `SIGNATURE_MODULUS`.
pub fn rsa_modulus_bits(key: &RsaPrivateKey) -> usize {
    use rsa::traits::PublicKeyParts;
    key.size() * 8
}

fn pkcs1v15_padding(hash: HashAlgorithm) -> Pkcs1v15Sign {
    match hash {
        HashAlgorithm::Sha1 => Pkcs1v15Sign::new::<sha1::Sha1>(),
        HashAlgorithm::Sha256 => Pkcs1v15Sign::new::<sha2::Sha256>(),
        HashAlgorithm::Sha512 => Pkcs1v15Sign::new::<sha2::Sha512>(),
    }
}

/// `sign(buffer_without_signature, private_key, hash) -> signature_bytes`
/// (spec.md §4.3).
pub fn rsa_sign_pkcs1v15(key: &RsaPrivateKey, data: &[u8], hash: HashAlgorithm) -> Result<Vec<u8>> {
    let digest = compute_hash(hash, data);
    key.sign(pkcs1v15_padding(hash), &digest)
        .map_err(|_| EnvelopeError::InvalidSignature)
}

/// `verify(buffer_without_signature, signature_bytes, public_key, hash)`
/// (spec.md §4.3).
pub fn rsa_verify_pkcs1v15(
    key: &RsaPublicKey,
    data: &[u8],
    signature: &[u8],
    hash: HashAlgorithm,
) -> Result<()> {
    let digest = compute_hash(hash, data);
    key.verify(pkcs1v15_padding(hash), &digest, signature)
        .map_err(|_| EnvelopeError::InvalidSignature)
}

/// RSA PKCS#1 v1.5 key-wrap: encrypt the AES key under the recipient
/// device certificate's public key (spec.md §4.4.3 step 6). Takes the
/// caller's CSPRNG so tests can substitute a deterministic generator
/// (spec.md §9).
pub fn rsa_wrap_key<R: RngCore + CryptoRng>(
    rng: &mut R,
    recipient: &RsaPublicKey,
    aes_key: &[u8],
) -> Result<Vec<u8>> {
    recipient
        .encrypt(rng, Pkcs1v15Encrypt, aes_key)
        .map_err(|e| EnvelopeError::InvalidCertificate(e.to_string()))
}

/// Unwrap a PKCS#1 v1.5-wrapped AES key with the recipient's private key
/// (spec.md §4.4.3 decrypt step 2).
pub fn rsa_unwrap_key(recipient_key: &RsaPrivateKey, wrapped: &[u8]) -> Result<Vec<u8>> {
    recipient_key
        .decrypt(Pkcs1v15Encrypt, wrapped)
        .map_err(|_| EnvelopeError::InvalidSignature)
}
