//! Encrypted profile (spec.md §4.4.3): an ENC envelope's payload is
//! AES-128-CBC ciphertext, with the AES key wrapped for a recipient device
//! and a companion signed "pointer" envelope describing it.

use rand_core::{CryptoRng, RngCore};

use envelope_crypto::{
    aes_cbc_decrypt, aes_cbc_encrypt, certificate_der, compute_hash, fingerprint, rsa_unwrap_key,
    rsa_wrap_key, FingerprintAlgorithm, RecipientIdentity, SignerIdentity,
};
use envelope_types::algo::KEY_ALGORITHM_RSA;
use envelope_types::{EnvelopeError, HashAlgorithm, Result};

use crate::binder::{extract, sign, splice_in, verify};
use crate::profiles::opaque;
use crate::schema::{assemble_header, walk_header, EncryptionSpec, HeaderSpec};
use crate::xml::build_pointer_xml;

/// The two files an ENC build produces: the AES-encrypted container and
/// its companion pointer envelope (spec.md §4.4.3 step 9). Writing them to
/// disk and deleting the plaintext input is the driver's job, not this
/// engine's (spec.md §1 non-goals: "generic file I/O").
pub struct EncBuildOutput {
    pub ciphertext_file: Vec<u8>,
    pub pointer_file: Vec<u8>,
}

/// Build an ENC envelope plus its pointer file from a `<device>` XML
/// plaintext document.
#[allow(clippy::too_many_arguments)]
pub fn build<R: RngCore + CryptoRng>(
    rng: &mut R,
    plaintext_xml: &str,
    signer: &SignerIdentity,
    recipient: &RecipientIdentity,
    hash: HashAlgorithm,
    ciphertext_filename: &str,
    pointer_filename: &str,
    timestamp: u32,
) -> Result<EncBuildOutput> {
    let plaintext = plaintext_xml.as_bytes();
    let plaintext_hash = compute_hash(hash, plaintext);

    let mut iv = [0u8; 16];
    rng.fill_bytes(&mut iv);
    let mut key = [0u8; 16];
    rng.fill_bytes(&mut key);

    let pad_count = 16 - (plaintext.len() % 16);
    let mut padded = plaintext.to_vec();
    padded.extend(std::iter::repeat(0x0Du8).take(pad_count));

    let ciphertext = aes_cbc_encrypt(&key, &iv, &padded)?;
    let wrapped_key = rsa_wrap_key(rng, &recipient.public_key()?, &key)?;

    let encryption = EncryptionSpec {
        iv: &iv,
        padding_count: pad_count as u16,
        key_size_bits: 128,
        key_algorithm: KEY_ALGORITHM_RSA,
        wrapped_key: &wrapped_key,
        hash_algorithm: hash,
        hash: &plaintext_hash,
    };
    let header_spec = HeaderSpec {
        version: (1, 0),
        signer_name: &signer.subject(),
        issuer_name: &signer.issuer(),
        serial_number: &signer.serial(),
        hash_algorithm: hash,
        signature_len: signer.signature_len(),
        filename: ciphertext_filename,
        timestamp,
        signer_version: None,
        encryption: Some(encryption),
    };
    let assembled = assemble_header(&header_spec)?;
    let mut without_signature = assembled.bytes;
    without_signature.extend_from_slice(&ciphertext);
    let signature = sign(&without_signature, signer, hash)?;
    let ciphertext_file = splice_in(&without_signature, &signature, assembled.signature_insert_offset)?;

    let cert_der = certificate_der(&recipient.certificate)?;
    let cert_hash_hex = hex::encode(fingerprint(&cert_der, FingerprintAlgorithm::Md5));
    let pointer_xml = build_pointer_xml(plaintext_xml, &cert_hash_hex);
    let pointer_file = opaque::build(
        pointer_xml.as_bytes(),
        signer,
        hash,
        pointer_filename,
        timestamp,
    )?;

    tracing::debug!(
        plaintext_len = plaintext.len(),
        pad_count,
        "built ENC envelope and pointer file"
    );

    Ok(EncBuildOutput {
        ciphertext_file,
        pointer_file,
    })
}

/// Recover the plaintext from an ENC envelope.
pub fn decrypt(ciphertext_file: &[u8], recipient: &RecipientIdentity) -> Result<Vec<u8>> {
    let view = walk_header(ciphertext_file).map_err(|(_, e)| e)?;
    let enc = view
        .encryption
        .as_ref()
        .ok_or(EnvelopeError::MissingField("ENCRYPTION_INFO"))?;
    let enc_hash_algorithm = view
        .encryption_hash_algorithm
        .ok_or(EnvelopeError::MissingField("ENCRYPTION_HASH_ALGORITHM"))?;

    let iv: [u8; 16] = ciphertext_file[enc.iv.clone()]
        .try_into()
        .map_err(|_| EnvelopeError::MissingField("ENCRYPTION_IV"))?;
    let wrapped_key = &ciphertext_file[enc.key.clone()];
    let aes_key_bytes = rsa_unwrap_key(recipient.private_key()?, wrapped_key)?;
    let aes_key: [u8; 16] = aes_key_bytes
        .as_slice()
        .try_into()
        .map_err(|_| EnvelopeError::UnsupportedAlgorithm { value: aes_key_bytes.len() as u32 })?;

    let ciphertext = &ciphertext_file[view.header_length..];
    let padded = aes_cbc_decrypt(&aes_key, &iv, ciphertext)?;

    let padding_count = enc.padding_count as usize;
    if padding_count == 0 || padding_count > padded.len() {
        return Err(EnvelopeError::UnsupportedAlgorithm {
            value: enc.padding_count as u32,
        });
    }
    let plaintext = padded[..padded.len() - padding_count].to_vec();

    let expected_hash = &ciphertext_file[view.encryption_hash.clone()];
    let actual_hash = compute_hash(enc_hash_algorithm, &plaintext);
    if actual_hash != expected_hash {
        return Err(EnvelopeError::HashMismatch);
    }

    Ok(plaintext)
}

/// Verify the ENC envelope's own signature (independent of decryption).
pub fn verify_signature(ciphertext_file: &[u8], recipient: &RecipientIdentity) -> Result<()> {
    let view = walk_header(ciphertext_file).map_err(|(_, e)| e)?;
    let hash = view.hash_algorithm.ok_or(EnvelopeError::MissingField("HASH_ALGORITHM"))?;
    let span = view.signature_span.ok_or(EnvelopeError::MissingField("SIGNATURE"))?;
    let (without_signature, signature_bytes) = extract(ciphertext_file, span)?;
    verify(&without_signature, &signature_bytes, recipient, hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{deterministic_rng, self_signed_rsa_identity};

    #[test]
    fn build_then_decrypt_round_trips() {
        let mut signer_rng = deterministic_rng(30);
        let signer = self_signed_rsa_identity(&mut signer_rng, "CN=tftp", "CN=sast", &[0x5]);
        let mut device_rng = deterministic_rng(31);
        let device = self_signed_rsa_identity(&mut device_rng, "CN=device", "CN=sast", &[0x6]);
        let recipient = device.as_recipient();

        let xml = "<device><loadInformation>X</loadInformation></device>";
        let mut rng = deterministic_rng(32);
        let output = build(
            &mut rng,
            xml,
            &signer,
            &recipient,
            HashAlgorithm::Sha1,
            "base.enc.sgn",
            "base.sgn",
            1_700_000_000,
        )
        .unwrap();

        let recovered = decrypt(&output.ciphertext_file, &recipient).unwrap();
        assert_eq!(recovered, xml.as_bytes());

        let pointer_payload = opaque::strip(&output.pointer_file).unwrap();
        let pointer_xml = String::from_utf8(pointer_payload).unwrap();
        assert!(pointer_xml.contains("<fullConfig>false</fullConfig>"));
        assert!(pointer_xml.contains("<loadInformation>X</loadInformation>"));
        assert!(pointer_xml.contains("<encrConfig>true</encrConfig>"));
    }

    #[test]
    fn tampered_ciphertext_fails_with_hash_mismatch() {
        let mut signer_rng = deterministic_rng(40);
        let signer = self_signed_rsa_identity(&mut signer_rng, "CN=tftp", "CN=sast", &[0x5]);
        let mut device_rng = deterministic_rng(41);
        let device = self_signed_rsa_identity(&mut device_rng, "CN=device", "CN=sast", &[0x6]);
        let recipient = device.as_recipient();

        let xml = "<device><loadInformation>X</loadInformation></device>";
        let mut rng = deterministic_rng(42);
        let output = build(
            &mut rng,
            xml,
            &signer,
            &recipient,
            HashAlgorithm::Sha1,
            "base.enc.sgn",
            "base.sgn",
            1_700_000_000,
        )
        .unwrap();

        let view = walk_header(&output.ciphertext_file).unwrap();
        let mut tampered = output.ciphertext_file.clone();
        let last = tampered.len() - 1;
        assert!(view.header_length < tampered.len());
        tampered[last] ^= 0xFF;

        assert!(matches!(
            decrypt(&tampered, &recipient),
            Err(EnvelopeError::HashMismatch)
        ));
    }
}
