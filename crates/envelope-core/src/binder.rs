//! The signature binder (spec.md §4.3): `sign(buf \ signature_span) ==
//! signature`. Build assembles a header with a reserved hole at the
//! signature's position, signs everything except that hole, then splices
//! the signature in. Verify runs the inverse.

use envelope_crypto::{rsa_sign_pkcs1v15, rsa_verify_pkcs1v15, RecipientIdentity, SignerIdentity};
use envelope_types::tag::header::SIGNATURE;
use envelope_types::{EnvelopeError, HashAlgorithm, Result};

use crate::tlv::encode;

/// Sign the buffer exactly as it stands — callers must pass a buffer with
/// the signature's framed bytes absent.
pub fn sign(
    buffer_without_signature: &[u8],
    signer: &SignerIdentity,
    hash: HashAlgorithm,
) -> Result<Vec<u8>> {
    rsa_sign_pkcs1v15(signer.private_key(), buffer_without_signature, hash)
}

/// Insert the framed `SIGNATURE` element into the hole recorded by
/// `assemble_header`. The result is the byte image written to disk.
pub fn splice_in(
    buffer_without_signature: &[u8],
    signature_bytes: &[u8],
    insert_offset: usize,
) -> Result<Vec<u8>> {
    let framed = encode(SIGNATURE, signature_bytes)?;
    let mut out = Vec::with_capacity(buffer_without_signature.len() + framed.len());
    out.extend_from_slice(&buffer_without_signature[..insert_offset]);
    out.extend_from_slice(&framed);
    out.extend_from_slice(&buffer_without_signature[insert_offset..]);
    tracing::debug!(insert_offset, signature_len = signature_bytes.len(), "spliced signature");
    Ok(out)
}

/// The inverse of [`splice_in`]: split the file into the pre-signature
/// image used for verification and the signature bytes themselves. Must
/// reconstruct the byte-identical buffer that was originally signed.
pub fn extract(file_bytes: &[u8], signature_span: std::ops::Range<usize>) -> Result<(Vec<u8>, Vec<u8>)> {
    if signature_span.end > file_bytes.len() || signature_span.start > signature_span.end {
        return Err(EnvelopeError::Truncated {
            offset: signature_span.end,
        });
    }
    let signature_bytes = file_bytes[signature_span.clone()].to_vec();
    // The element's tag+length framing (3 bytes) immediately precedes its value.
    let frame_start = signature_span.start - 3;
    let mut buffer_without_signature = Vec::with_capacity(file_bytes.len() - (signature_span.len() + 3));
    buffer_without_signature.extend_from_slice(&file_bytes[..frame_start]);
    buffer_without_signature.extend_from_slice(&file_bytes[signature_span.end..]);
    Ok((buffer_without_signature, signature_bytes))
}

/// Verify a signature against the pre-signature image.
pub fn verify(
    buffer_without_signature: &[u8],
    signature_bytes: &[u8],
    recipient: &RecipientIdentity,
    hash: HashAlgorithm,
) -> Result<()> {
    let public_key = recipient.public_key()?;
    rsa_verify_pkcs1v15(&public_key, buffer_without_signature, signature_bytes, hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splice_then_extract_round_trips() {
        let buf = vec![1u8, 2, 3, 4, 5];
        let sig = vec![0xAAu8; 8];
        let spliced = splice_in(&buf, &sig, 2).unwrap();
        // tag(1) + len(2) + 8 bytes of signature = 11 bytes inserted at offset 2.
        let signature_span = (2 + 3)..(2 + 3 + 8);
        let (recovered, recovered_sig) = extract(&spliced, signature_span).unwrap();
        assert_eq!(recovered, buf);
        assert_eq!(recovered_sig, sig);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: splicing a signature in and extracting it back out always
        /// recovers the exact pre-signature buffer and signature bytes.
        #[test]
        fn splice_extract_round_trip(
            prefix in prop::collection::vec(any::<u8>(), 0..50),
            suffix in prop::collection::vec(any::<u8>(), 0..50),
            sig in prop::collection::vec(any::<u8>(), 1..300),
        ) {
            let mut buf = prefix.clone();
            buf.extend(&suffix);
            let insert_offset = prefix.len();
            let spliced = splice_in(&buf, &sig, insert_offset).unwrap();
            let signature_span = (insert_offset + 3)..(insert_offset + 3 + sig.len());
            let (recovered, recovered_sig) = extract(&spliced, signature_span).unwrap();
            prop_assert_eq!(recovered, buf);
            prop_assert_eq!(recovered_sig, sig);
        }
    }
}
