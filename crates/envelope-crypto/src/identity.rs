//! Convenience bundles tying a certificate to the key material the
//! envelope engine needs from it, so `envelope-core` never has to reach
//! for `rsa`/`x509-cert` types directly.

use envelope_types::{EnvelopeError, Result};
use rsa::{RsaPrivateKey, RsaPublicKey};
use x509_cert::Certificate;

use crate::cert::{
    certificate_der, issuer_rfc4514, load_cert_and_key_from_pem, serial_number, subject_rfc4514,
};
use crate::keys::{public_key, rsa_modulus_bits, KeyMaterial, PrivateKeyMaterial};

/// The signing authority identity used to build and sign SGN / trust-list
/// / ENC envelopes. Always RSA — spec.md §4.4.2 notes that envelope
/// verification only ever requires an RSA signing-authority key.
pub struct SignerIdentity {
    pub certificate: Certificate,
    private_key: RsaPrivateKey,
}

impl SignerIdentity {
    /// Build a signer identity from already-loaded parts.
    pub fn from_parts(certificate: Certificate, private_key: RsaPrivateKey) -> Self {
        Self {
            certificate,
            private_key,
        }
    }

    /// Load a signer identity from a PEM bundle containing both the
    /// certificate and its RSA private key.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let (certificate, key) = load_cert_and_key_from_pem(pem)?;
        let private_key = match key {
            Some(PrivateKeyMaterial::Rsa(key)) => key,
            Some(PrivateKeyMaterial::Ec(_)) => {
                return Err(EnvelopeError::UnsupportedKeyType(
                    "envelope signing requires an RSA private key, found EC".to_string(),
                ))
            }
            None => {
                return Err(EnvelopeError::MissingField("private key"));
            }
        };
        Ok(Self {
            certificate,
            private_key,
        })
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    pub fn subject(&self) -> String {
        subject_rfc4514(&self.certificate)
    }

    pub fn issuer(&self) -> String {
        issuer_rfc4514(&self.certificate)
    }

    pub fn serial(&self) -> Vec<u8> {
        serial_number(&self.certificate)
    }

    /// Signature byte length this identity's modulus produces — the value
    /// `SIGNATURE_MODULUS` is derived from (spec.md §4.2).
    pub fn signature_len(&self) -> usize {
        rsa_modulus_bits(&self.private_key) / 8
    }

    pub fn certificate_der(&self) -> Result<Vec<u8>> {
        certificate_der(&self.certificate)
    }

    /// The signer's own certificate, reused as a recipient identity — the
    /// shape spec.md §8 scenario 2 calls "its signing certificate as TFTP
    /// cert" when verifying a just-built envelope.
    pub fn as_recipient(&self) -> RecipientIdentity {
        RecipientIdentity::from_parts(self.certificate.clone(), Some(self.private_key.clone()))
    }
}

/// The recipient device identity used by the ENC profile: its certificate
/// wraps the AES key on build, its private key unwraps it on decrypt.
pub struct RecipientIdentity {
    pub certificate: Certificate,
    private_key: Option<RsaPrivateKey>,
}

impl RecipientIdentity {
    /// Build a recipient identity from already-loaded parts.
    pub fn from_parts(certificate: Certificate, private_key: Option<RsaPrivateKey>) -> Self {
        Self {
            certificate,
            private_key,
        }
    }

    pub fn from_pem(pem: &str) -> Result<Self> {
        let (certificate, key) = load_cert_and_key_from_pem(pem)?;
        let private_key = match key {
            Some(PrivateKeyMaterial::Rsa(key)) => Some(key),
            Some(PrivateKeyMaterial::Ec(_)) => {
                return Err(EnvelopeError::UnsupportedKeyType(
                    "ENC key-wrap requires an RSA recipient key, found EC".to_string(),
                ))
            }
            None => None,
        };
        Ok(Self {
            certificate,
            private_key,
        })
    }

    pub fn public_key(&self) -> Result<RsaPublicKey> {
        match public_key(&self.certificate)? {
            KeyMaterial::Rsa(key) => Ok(key),
            KeyMaterial::Ec(_) => Err(EnvelopeError::UnsupportedKeyType(
                "ENC recipient certificate must carry an RSA public key".to_string(),
            )),
        }
    }

    pub fn private_key(&self) -> Result<&RsaPrivateKey> {
        self.private_key
            .as_ref()
            .ok_or(EnvelopeError::MissingField("recipient private key"))
    }

    pub fn certificate_der(&self) -> Result<Vec<u8>> {
        certificate_der(&self.certificate)
    }
}
