//! Opaque profile (spec.md §4.4.1): an SGN envelope is a header wrapped
//! around raw payload bytes. Strip needs no keys at all — the payload
//! begins at `header_length` and runs to end of file.

use envelope_crypto::{RecipientIdentity, SignerIdentity};
use envelope_types::{EnvelopeError, HashAlgorithm, Result};

use crate::binder::{extract, sign, splice_in, verify};
use crate::schema::{assemble_header, walk_header, HeaderSpec};

/// Build an SGN file: header + raw payload, signed.
pub fn build(
    payload: &[u8],
    signer: &SignerIdentity,
    hash: HashAlgorithm,
    filename: &str,
    timestamp: u32,
) -> Result<Vec<u8>> {
    let spec = HeaderSpec {
        version: (1, 0),
        signer_name: &signer.subject(),
        issuer_name: &signer.issuer(),
        serial_number: &signer.serial(),
        hash_algorithm: hash,
        signature_len: signer.signature_len(),
        filename,
        timestamp,
        signer_version: None,
        encryption: None,
    };
    let assembled = assemble_header(&spec)?;
    let mut without_signature = assembled.bytes;
    without_signature.extend_from_slice(payload);

    let signature = sign(&without_signature, signer, hash)?;
    let file = splice_in(&without_signature, &signature, assembled.signature_insert_offset)?;
    tracing::debug!(payload_len = payload.len(), "built SGN envelope");
    Ok(file)
}

/// Recover the payload bytes. Does not touch keys or the signature —
/// spec.md §4.4.1: "this path does not need keys or signature verification."
pub fn strip(file_bytes: &[u8]) -> Result<Vec<u8>> {
    let view = walk_header(file_bytes).map_err(|(_, e)| e)?;
    if view.header_length > file_bytes.len() {
        return Err(EnvelopeError::Truncated {
            offset: view.header_length,
        });
    }
    Ok(file_bytes[view.header_length..].to_vec())
}

/// Verify the envelope's signature against the recipient's certificate.
pub fn verify_signature(file_bytes: &[u8], recipient: &RecipientIdentity) -> Result<()> {
    let view = walk_header(file_bytes).map_err(|(_, e)| e)?;
    let hash = view.hash_algorithm.ok_or(EnvelopeError::MissingField("HASH_ALGORITHM"))?;
    let span = view
        .signature_span
        .ok_or(EnvelopeError::MissingField("SIGNATURE"))?;
    let (without_signature, signature_bytes) = extract(file_bytes, span)?;
    verify(&without_signature, &signature_bytes, recipient, hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{deterministic_rng, self_signed_rsa_identity};

    #[test]
    fn build_then_strip_recovers_payload() {
        let mut rng = deterministic_rng(1);
        let signer = self_signed_rsa_identity(&mut rng, "CN=tftp", "CN=sast", &[0x42]);
        let file = build(b"hello", &signer, HashAlgorithm::Sha1, "hello.sgn", 1_700_000_000).unwrap();
        assert_eq!(&file[0..5], &[0x01, 0x00, 0x02, 0x01, 0x00]);
        let stripped = strip(&file).unwrap();
        assert_eq!(stripped, b"hello");
    }

    #[test]
    fn tampered_payload_fails_verification() {
        let mut rng = deterministic_rng(2);
        let signer = self_signed_rsa_identity(&mut rng, "CN=tftp", "CN=sast", &[0x7]);
        let recipient = signer.as_recipient();
        let mut file = build(b"hello", &signer, HashAlgorithm::Sha1, "hello.sgn", 1_700_000_000).unwrap();
        verify_signature(&file, &recipient).unwrap();

        let last = file.len() - 1;
        file[last] ^= 0xFF;
        assert!(matches!(
            verify_signature(&file, &recipient),
            Err(EnvelopeError::InvalidSignature)
        ));
    }
}
