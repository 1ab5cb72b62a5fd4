//! End-to-end scenarios, one per spec.md §8 narrative.

use envelope_core::profiles::{encrypted, opaque, records};
use envelope_core::profiles::records::RecordInput;
use envelope_core::test_support::{deterministic_rng, self_signed_rsa_identity};
use envelope_types::{EnvelopeError, HashAlgorithm, Role};
use pretty_assertions::assert_eq;

/// Scenario 1 + 2: SGN build+strip, then verify with the signing
/// certificate reused as the TFTP cert, then a tampered-payload verify.
#[test]
fn sgn_build_strip_and_verify() {
    let mut rng = deterministic_rng(100);
    let signer = self_signed_rsa_identity(&mut rng, "CN=tftp", "CN=sast", &[0x01]);
    let recipient = signer.as_recipient();

    let file = opaque::build(b"hello", &signer, HashAlgorithm::Sha1, "hello.sgn", 1_700_000_000).unwrap();
    assert_eq!(&file[0..5], &[0x01, 0x00, 0x02, 0x01, 0x00]);

    let stripped = opaque::strip(&file).unwrap();
    assert_eq!(stripped, b"hello");

    opaque::verify_signature(&file, &recipient).expect("freshly built envelope verifies");

    let mut tampered = file.clone();
    let last = tampered.len() - 1;
    tampered[last] ^= 0xFF;
    assert!(matches!(
        opaque::verify_signature(&tampered, &recipient),
        Err(EnvelopeError::InvalidSignature)
    ));
}

/// Scenario 3 + 4: trust-list build+parse with SAST and CCM records, then
/// a tampered SUBJECT_NAME byte.
#[test]
fn trust_list_build_parse_and_tamper() {
    let mut sast_rng = deterministic_rng(101);
    let sast = self_signed_rsa_identity(&mut sast_rng, "CN=sast", "CN=sast", &[0x42]);
    let mut ccm_rng = deterministic_rng(102);
    let ccm = self_signed_rsa_identity(&mut ccm_rng, "CN=ccm", "CN=sast", &[0x43]);

    let inputs = vec![
        RecordInput {
            certificate: &sast.certificate,
            role: Role::SigningAuthority,
        },
        RecordInput {
            certificate: &ccm.certificate,
            role: Role::CallManager,
        },
    ];

    let file = records::build(
        &inputs,
        &sast,
        HashAlgorithm::Sha512,
        Some((1, 1)),
        "trust.tlv",
        1_700_000_000,
    )
    .unwrap();

    let (view, parsed) = records::parse(&file).unwrap();
    assert_eq!(view.signer_version, Some((1, 1)));
    assert_eq!(view.hash_algorithm, Some(HashAlgorithm::Sha512));
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0].role, Role::SigningAuthority);
    assert_eq!(parsed[0].role.short_name(), "SAST");
    assert_eq!(parsed[1].role, Role::CallManager);
    assert_eq!(parsed[1].role.short_name(), "CCM");
    records::verify_signature(&file).expect("valid trust list verifies");

    let mut tampered = file.clone();
    let subject_span = parsed[0].subject_name.clone();
    tampered[subject_span.start] ^= 0xFF;
    // Tampering still parses structurally (the byte count didn't change)...
    let (_, parsed_after) = records::parse(&tampered).unwrap();
    assert_eq!(parsed_after[0].role, Role::SigningAuthority);
    // ...but the signature no longer matches.
    assert!(matches!(
        records::verify_signature(&tampered),
        Err(EnvelopeError::InvalidSignature)
    ));
}

/// Scenario 5 + 6: ENC build+decrypt with preserved pointer fields, then a
/// ciphertext tamper that must surface as `HashMismatch`.
#[test]
fn enc_build_decrypt_and_hash_tamper() {
    let mut signer_rng = deterministic_rng(103);
    let signer = self_signed_rsa_identity(&mut signer_rng, "CN=tftp", "CN=sast", &[0x09]);
    let mut device_rng = deterministic_rng(104);
    let device = self_signed_rsa_identity(&mut device_rng, "CN=device", "CN=sast", &[0x0A]);
    let recipient = device.as_recipient();

    let xml = "<device><loadInformation>X</loadInformation></device>";
    assert_eq!(xml.len(), 48);

    let mut rng = deterministic_rng(105);
    let output = encrypted::build(
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

    let pointer_payload = opaque::strip(&output.pointer_file).unwrap();
    let pointer_xml = String::from_utf8(pointer_payload).unwrap();
    assert!(pointer_xml.contains("<fullConfig>false</fullConfig>"));
    assert!(pointer_xml.contains("<loadInformation>X</loadInformation>"));
    assert!(pointer_xml.contains("<encrConfig>true</encrConfig>"));
    assert!(pointer_xml.contains("<certHash>"));

    let recovered = encrypted::decrypt(&output.ciphertext_file, &recipient).unwrap();
    assert_eq!(recovered, xml.as_bytes());

    let mut tampered = output.ciphertext_file.clone();
    let last = tampered.len() - 1;
    tampered[last] ^= 0xFF;
    assert!(matches!(
        encrypted::decrypt(&tampered, &recipient),
        Err(EnvelopeError::HashMismatch)
    ));
}

/// Idempotent-strip invariant (spec.md §8): a header-only SGN envelope
/// strips to a zero-byte payload.
#[test]
fn strip_of_empty_payload_is_zero_bytes() {
    let mut rng = deterministic_rng(106);
    let signer = self_signed_rsa_identity(&mut rng, "CN=tftp", "CN=sast", &[0x01]);
    let file = opaque::build(b"", &signer, HashAlgorithm::Sha1, "empty.sgn", 1_700_000_000).unwrap();
    assert_eq!(opaque::strip(&file).unwrap(), Vec::<u8>::new());
}

/// header_length invariant (spec.md §8): always a multiple of 4 and never
/// larger than the file itself.
#[test]
fn header_length_invariant_holds_across_profiles() {
    let mut rng = deterministic_rng(107);
    let signer = self_signed_rsa_identity(&mut rng, "CN=tftp", "CN=sast", &[0x01]);
    let file = opaque::build(b"payload", &signer, HashAlgorithm::Sha512, "x.sgn", 1_700_000_000).unwrap();
    let view = envelope_core::walk_header(&file).unwrap();
    assert_eq!(view.header_length % 4, 0);
    assert!(view.header_length <= file.len());
}
