//! Self-signed certificate generation for this crate's own tests only.
//!
//! This is not the cert-generation utility spec.md §1 excludes from scope —
//! that utility is a CLI front end for operators. This helper exists purely
//! to hand the test suite something to sign with, built the same way the
//! rest of this codebase builds fixed-shape structured binary data: small
//! tag-at-a-time encoders, one per ASN.1 shape actually needed here.

use der::Decode;
use envelope_crypto::{RecipientIdentity, SignerIdentity};
use pkcs1::EncodeRsaPublicKey;
use rand_core::SeedableRng;
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

/// A deterministic CSPRNG substitute for tests (spec.md §9: "tests should be
/// able to inject a deterministic generator via dependency injection").
pub fn deterministic_rng(seed: u64) -> rand_chacha::ChaCha20Rng {
    rand_chacha::ChaCha20Rng::seed_from_u64(seed)
}

fn der_len(len: usize) -> Vec<u8> {
    if len < 0x80 {
        vec![len as u8]
    } else {
        let bytes = (len as u64).to_be_bytes();
        let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
        let trimmed = &bytes[first_nonzero..];
        let mut out = vec![0x80 | trimmed.len() as u8];
        out.extend_from_slice(trimmed);
        out
    }
}

fn der_tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    out.extend(der_len(content.len()));
    out.extend_from_slice(content);
    out
}

fn der_sequence(content: &[u8]) -> Vec<u8> {
    der_tlv(0x30, content)
}

fn der_set(content: &[u8]) -> Vec<u8> {
    der_tlv(0x31, content)
}

fn der_oid(content: &[u8]) -> Vec<u8> {
    der_tlv(0x06, content)
}

fn der_utf8_string(s: &str) -> Vec<u8> {
    der_tlv(0x0C, s.as_bytes())
}

fn der_utc_time(s: &str) -> Vec<u8> {
    der_tlv(0x17, s.as_bytes())
}

fn der_null() -> Vec<u8> {
    vec![0x05, 0x00]
}

fn der_bit_string(content: &[u8]) -> Vec<u8> {
    let mut inner = vec![0u8];
    inner.extend_from_slice(content);
    der_tlv(0x03, &inner)
}

/// Minimum-width unsigned big-endian INTEGER, per DER's own rule — the same
/// rule spec.md §6 states for `SERIAL_NUMBER`.
fn der_integer_unsigned(bytes: &[u8]) -> Vec<u8> {
    let mut trimmed = bytes;
    while trimmed.len() > 1 && trimmed[0] == 0 {
        trimmed = &trimmed[1..];
    }
    let mut content = Vec::new();
    if trimmed.is_empty() {
        content.push(0);
    } else {
        if trimmed[0] & 0x80 != 0 {
            content.push(0);
        }
        content.extend_from_slice(trimmed);
    }
    der_tlv(0x02, &content)
}

const OID_COMMON_NAME: [u8; 3] = [0x55, 0x04, 0x03];
const OID_RSA_ENCRYPTION: [u8; 9] = [0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x01];
const OID_SHA256_WITH_RSA: [u8; 9] = [0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x0B];

fn der_name(common_name: &str) -> Vec<u8> {
    let atv = der_sequence(&[der_oid(&OID_COMMON_NAME), der_utf8_string(common_name)].concat());
    der_sequence(&der_set(&atv))
}

fn der_algorithm_identifier(oid: &[u8]) -> Vec<u8> {
    der_sequence(&[der_oid(oid), der_null()].concat())
}

fn common_name_of(rfc4514_ish: &str) -> &str {
    rfc4514_ish.strip_prefix("CN=").unwrap_or(rfc4514_ish)
}

/// Build an RSA-2048 self-signed certificate wired up as a [`SignerIdentity`].
/// `subject`/`issuer` are passed as `"CN=..."` strings for symmetry with
/// [`envelope_crypto::subject_rfc4514`]'s output shape; only the CN is
/// encoded since that is all the test suite ever reads back.
pub fn self_signed_rsa_identity<R: rand_core::CryptoRng + rand_core::RngCore>(
    rng: &mut R,
    subject: &str,
    issuer: &str,
    serial: &[u8],
) -> SignerIdentity {
    let private_key = RsaPrivateKey::new(rng, 2048).expect("RSA key generation");
    let public_key = RsaPublicKey::from(&private_key);
    let public_key_der = public_key
        .to_pkcs1_der()
        .expect("RSA public key DER")
        .as_bytes()
        .to_vec();

    let subject_public_key_info = der_sequence(
        &[
            der_algorithm_identifier(&OID_RSA_ENCRYPTION),
            der_bit_string(&public_key_der),
        ]
        .concat(),
    );

    let validity = der_sequence(
        &[
            der_utc_time("250101000000Z"),
            der_utc_time("350101000000Z"),
        ]
        .concat(),
    );

    let tbs_certificate = der_sequence(
        &[
            der_integer_unsigned(serial),
            der_algorithm_identifier(&OID_SHA256_WITH_RSA),
            der_name(common_name_of(issuer)),
            validity,
            der_name(common_name_of(subject)),
            subject_public_key_info,
        ]
        .concat(),
    );

    let tbs_digest = Sha256::digest(&tbs_certificate);
    let signature = private_key
        .sign(Pkcs1v15Sign::new::<Sha256>(), &tbs_digest)
        .expect("self-signature");

    let certificate_der = der_sequence(
        &[
            tbs_certificate,
            der_algorithm_identifier(&OID_SHA256_WITH_RSA),
            der_bit_string(&signature),
        ]
        .concat(),
    );

    let certificate = x509_cert::Certificate::from_der(&certificate_der)
        .expect("hand-built self-signed certificate decodes as a valid Certificate");

    SignerIdentity::from_parts(certificate, private_key)
}

/// Same as [`self_signed_rsa_identity`] but returned as a bare
/// [`RecipientIdentity`] — the shape the ENC profile's recipient device
/// takes in tests.
pub fn self_signed_recipient<R: rand_core::CryptoRng + rand_core::RngCore>(
    rng: &mut R,
    subject: &str,
    issuer: &str,
    serial: &[u8],
) -> RecipientIdentity {
    self_signed_rsa_identity(rng, subject, issuer, serial).as_recipient()
}
