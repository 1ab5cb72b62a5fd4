//! PEM loading and X.509 field extraction.
//!
//! A PEM file handed to the builder may carry a certificate, a private key,
//! or both concatenated (the common "cert + key bundle" layout); callers ask
//! for whichever parts they need.

use der::{DecodePem, Encode};
use envelope_types::{EnvelopeError, Result};
use pkcs1::DecodeRsaPrivateKey;
use pkcs8::DecodePrivateKey;
use x509_cert::Certificate;

use crate::keys::PrivateKeyMaterial;

const OID_RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";
const OID_EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";

/// Load the first certificate found in a PEM blob.
pub fn load_cert_from_pem(pem: &str) -> Result<Certificate> {
    Certificate::from_pem(pem.as_bytes())
        .map_err(|e| EnvelopeError::InvalidCertificate(e.to_string()))
}

/// Decode a certificate from its full X.509 DER encoding — used to turn a
/// trust-list record's embedded `CERTIFICATE` field back into a certificate
/// whose public key can verify the envelope signature.
pub fn certificate_from_der(der_bytes: &[u8]) -> Result<Certificate> {
    use der::Decode;
    Certificate::from_der(der_bytes).map_err(|e| EnvelopeError::InvalidCertificate(e.to_string()))
}

/// Load a private key from a PEM blob, accepting PKCS#8 ("PRIVATE KEY"),
/// RSA PKCS#1 ("RSA PRIVATE KEY"), or SEC1 EC ("EC PRIVATE KEY") framing.
pub fn load_private_key_from_pem(pem: &str) -> Result<PrivateKeyMaterial> {
    if let Ok(key) = rsa::RsaPrivateKey::from_pkcs8_pem(pem) {
        return Ok(PrivateKeyMaterial::Rsa(key));
    }
    if let Ok(key) = rsa::RsaPrivateKey::from_pkcs1_pem(pem) {
        return Ok(PrivateKeyMaterial::Rsa(key));
    }
    if let Ok(key) = p256::SecretKey::from_pkcs8_pem(pem) {
        return Ok(PrivateKeyMaterial::Ec(key));
    }
    if let Ok(key) = p256::SecretKey::from_sec1_pem(pem) {
        return Ok(PrivateKeyMaterial::Ec(key));
    }
    Err(EnvelopeError::UnsupportedKeyType(
        "expected PKCS#8, PKCS#1, or SEC1 EC private key PEM".to_string(),
    ))
}

/// Load both halves of a cert+key bundle PEM. The key half is optional —
/// a trust-list record's own certificate never carries a private key.
pub fn load_cert_and_key_from_pem(pem: &str) -> Result<(Certificate, Option<PrivateKeyMaterial>)> {
    let cert = load_cert_from_pem(pem)?;
    let key = load_private_key_from_pem(pem).ok();
    Ok((cert, key))
}

/// RFC 4514 string of the certificate's subject distinguished name.
///
/// The dominant join convention in the source ecosystem is `","` between
/// RDNs (spec.md §9 open question) — this is also what `x509-cert`'s `Name`
/// `Display` impl produces, so no custom joiner is needed.
pub fn subject_rfc4514(cert: &Certificate) -> String {
    cert.tbs_certificate.subject.to_string()
}

/// RFC 4514 string of the certificate's issuer distinguished name.
pub fn issuer_rfc4514(cert: &Certificate) -> String {
    cert.tbs_certificate.issuer.to_string()
}

/// Minimum-width unsigned big-endian serial number bytes, exactly as DER
/// encodes the `INTEGER` (a single leading `0x00` only when the MSB of the
/// value would otherwise read as negative).
pub fn serial_number(cert: &Certificate) -> Vec<u8> {
    cert.tbs_certificate.serial_number.as_bytes().to_vec()
}

/// The certificate's own signature bytes, copied verbatim (`SIGNATURE`,
/// record tag 8).
pub fn certificate_signature(cert: &Certificate) -> Vec<u8> {
    cert.signature.as_bytes().unwrap_or_default().to_vec()
}

/// Full DER encoding of the certificate (`CERTIFICATE`, record tag 9).
pub fn certificate_der(cert: &Certificate) -> Result<Vec<u8>> {
    cert.to_der()
        .map_err(|e| EnvelopeError::InvalidCertificate(e.to_string()))
}

/// The public-key algorithm a certificate carries, read from its
/// `SubjectPublicKeyInfo` algorithm identifier OID.
pub fn public_key_algorithm(cert: &Certificate) -> Result<PublicKeyAlgorithm> {
    let oid = cert
        .tbs_certificate
        .subject_public_key_info
        .algorithm
        .oid
        .to_string();
    match oid.as_str() {
        OID_RSA_ENCRYPTION => Ok(PublicKeyAlgorithm::Rsa),
        OID_EC_PUBLIC_KEY => Ok(PublicKeyAlgorithm::Ec),
        other => Err(EnvelopeError::UnsupportedKeyType(format!(
            "unrecognized public key algorithm OID {other}"
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicKeyAlgorithm {
    Rsa,
    Ec,
}
