//! Record profile (spec.md §4.4.2): a trust-list envelope's payload is a
//! concatenation of length-delimited `CertificateRecord`s, each a flat run
//! of record-namespace TLVs opened by `RECORD_LENGTH`.

use std::ops::Range;

use envelope_crypto::{
    certificate_der, certificate_from_der, certificate_signature, encode_public_key, issuer_rfc4514,
    public_key, serial_number, subject_rfc4514, KeyMaterial, RecipientIdentity, SignerIdentity,
};
use envelope_types::tag::record::*;
use envelope_types::{EnvelopeError, HashAlgorithm, Result, Role};

use crate::binder::{extract, sign, splice_in, verify};
use crate::schema::{assemble_header, walk_header, HeaderSpec};
use crate::tlv::{decode_next, encode};

/// One certificate to include in a trust list being built.
pub struct RecordInput<'a> {
    pub certificate: &'a envelope_crypto::x509_cert::Certificate,
    pub role: Role,
}

/// Build a single record: `RECORD_LENGTH` framing followed by a flat run of
/// record-namespace TLVs (spec.md §4.4.2 build steps 1-7).
fn build_record(input: &RecordInput) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let length_value_offset = buf.len() + 3;
    buf.extend(encode(RECORD_LENGTH, &[0, 0])?);

    let mut subject = subject_rfc4514(input.certificate).into_bytes();
    subject.push(0);
    buf.extend(encode(SUBJECT_NAME, &subject)?);

    let mut issuer = issuer_rfc4514(input.certificate).into_bytes();
    issuer.push(0);
    buf.extend(encode(ISSUER_NAME, &issuer)?);

    buf.extend(encode(SERIAL_NUMBER, &serial_number(input.certificate))?);
    buf.extend(encode(ROLE, &input.role.code().to_be_bytes())?);

    let key = public_key(input.certificate)?;
    buf.extend(encode(PUBLIC_KEY, &encode_public_key(&key)?)?);
    buf.extend(encode(SIGNATURE, &certificate_signature(input.certificate))?);
    buf.extend(encode(CERTIFICATE, &certificate_der(input.certificate)?)?);

    let record_len = buf.len();
    if record_len > 0xFFFF {
        return Err(EnvelopeError::LengthOverflow { len: record_len });
    }
    let len_bytes = (record_len as u16).to_be_bytes();
    buf[length_value_offset] = len_bytes[0];
    buf[length_value_offset + 1] = len_bytes[1];
    Ok(buf)
}

/// Build the full trust-list envelope: header plus the concatenated record
/// payload, signed.
pub fn build(
    records: &[RecordInput],
    signer: &SignerIdentity,
    hash: HashAlgorithm,
    signer_version: Option<(u8, u8)>,
    filename: &str,
    timestamp: u32,
) -> Result<Vec<u8>> {
    if !records.iter().any(|r| r.role == Role::SigningAuthority) {
        return Err(EnvelopeError::MissingField("signing-authority record"));
    }

    let spec = HeaderSpec {
        version: (1, 0),
        signer_name: &signer.subject(),
        issuer_name: &signer.issuer(),
        serial_number: &signer.serial(),
        hash_algorithm: hash,
        signature_len: signer.signature_len(),
        filename,
        timestamp,
        signer_version,
        encryption: None,
    };
    let assembled = assemble_header(&spec)?;
    let mut without_signature = assembled.bytes;
    for record in records {
        without_signature.extend(build_record(record)?);
    }

    let signature = sign(&without_signature, signer, hash)?;
    let file = splice_in(&without_signature, &signature, assembled.signature_insert_offset)?;
    tracing::debug!(record_count = records.len(), "built trust-list envelope");
    Ok(file)
}

/// A parsed `CertificateRecord`, as byte ranges into the envelope buffer.
#[derive(Debug, Clone)]
pub struct ParsedRecord {
    pub subject_name: Range<usize>,
    pub issuer_name: Range<usize>,
    pub serial_number: Range<usize>,
    pub role: Role,
    pub public_key: Range<usize>,
    pub signature: Range<usize>,
    pub certificate: Range<usize>,
}

/// Parse every record in the payload slice (`buf[header_length..]`).
pub fn parse_records(buf: &[u8]) -> Result<Vec<ParsedRecord>> {
    let mut records = Vec::new();
    let mut offset = 0usize;

    while offset < buf.len() {
        let header = decode_next(buf, offset)?;
        if header.tag != RECORD_LENGTH || header.length != 2 {
            return Err(EnvelopeError::BadTag {
                offset,
                expected: RECORD_LENGTH,
                found: header.tag,
            });
        }
        let record_len =
            u16::from_be_bytes([buf[header.value_offset], buf[header.value_offset + 1]]) as usize;
        let record_start = offset;
        let record_end = record_start + record_len;
        if record_end > buf.len() {
            return Err(EnvelopeError::Truncated { offset: record_end });
        }

        let mut subject_name = 0..0;
        let mut issuer_name = 0..0;
        let mut serial = 0..0;
        let mut role = None;
        let mut public_key_range = 0..0;
        let mut signature_range = 0..0;
        let mut certificate_range = 0..0;

        let mut cursor = header.next_offset;
        while cursor < record_end {
            let d = decode_next(buf, cursor)?;
            match d.tag {
                SUBJECT_NAME => subject_name = d.value_offset..d.next_offset,
                ISSUER_NAME => issuer_name = d.value_offset..d.next_offset,
                SERIAL_NUMBER => serial = d.value_offset..d.next_offset,
                ROLE => {
                    if d.length != 2 {
                        return Err(EnvelopeError::MissingField("ROLE"));
                    }
                    let code = u16::from_be_bytes([buf[d.value_offset], buf[d.value_offset + 1]]);
                    role = Some(Role::try_from(code)?);
                }
                PUBLIC_KEY => public_key_range = d.value_offset..d.next_offset,
                SIGNATURE => signature_range = d.value_offset..d.next_offset,
                CERTIFICATE => certificate_range = d.value_offset..d.next_offset,
                // Recognized but never emitted (spec.md §3).
                IP_ADDRESS | CERTIFICATE_HASH | CERTIFICATE_HASH_ALGORITHM => {}
                other => {
                    return Err(EnvelopeError::UnknownTag { tag: other, offset: cursor });
                }
            }
            cursor = d.next_offset;
        }

        records.push(ParsedRecord {
            subject_name,
            issuer_name,
            serial_number: serial,
            role: role.ok_or(EnvelopeError::MissingField("ROLE"))?,
            public_key: public_key_range,
            signature: signature_range,
            certificate: certificate_range,
        });

        offset = record_end;
    }

    Ok(records)
}

/// Parse a trust-list file into its header view and records.
pub fn parse(file_bytes: &[u8]) -> Result<(crate::schema::HeaderView, Vec<ParsedRecord>)> {
    let view = walk_header(file_bytes).map_err(|(_, e)| e)?;
    let records = parse_records(&file_bytes[view.header_length..])?;
    Ok((view, records))
}

/// Verify the envelope signature using the signing-authority record whose
/// serial matches the header's signer serial (spec.md §4.4.2, §8
/// "trust-list signing-serial lemma").
pub fn verify_signature(file_bytes: &[u8]) -> Result<()> {
    let (view, records) = parse(file_bytes)?;
    let hash = view.hash_algorithm.ok_or(EnvelopeError::MissingField("HASH_ALGORITHM"))?;
    let span = view.signature_span.ok_or(EnvelopeError::MissingField("SIGNATURE"))?;

    let signer_serial = &file_bytes[view.serial_number.clone()];
    let authority = records
        .iter()
        .find(|r| r.role == Role::SigningAuthority && &file_bytes[r.serial_number.clone()] == signer_serial)
        .ok_or(EnvelopeError::MissingField("signing-authority record"))?;

    let certificate = certificate_from_der(&file_bytes[authority.certificate.clone()])?;
    match public_key(&certificate)? {
        KeyMaterial::Rsa(_) => {}
        KeyMaterial::Ec(_) => {
            return Err(EnvelopeError::UnsupportedKeyType(
                "signing-authority record must carry an RSA public key".to_string(),
            ))
        }
    }
    let recipient = RecipientIdentity::from_parts(certificate, None);
    // RecipientIdentity::public_key() requires an RSA key; we already
    // checked above, so this cannot fail on key type.
    let public_key = recipient.public_key()?;

    let (without_signature, signature_bytes) = extract(file_bytes, span)?;
    verify_with_public_key(&without_signature, &signature_bytes, &public_key, hash)
}

fn verify_with_public_key(
    data: &[u8],
    signature: &[u8],
    public_key: &envelope_crypto::rsa::RsaPublicKey,
    hash: HashAlgorithm,
) -> Result<()> {
    envelope_crypto::rsa_verify_pkcs1v15(public_key, data, signature, hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{deterministic_rng, self_signed_rsa_identity};

    #[test]
    fn build_then_parse_recovers_roles() {
        let mut rng = deterministic_rng(10);
        let sast = self_signed_rsa_identity(&mut rng, "CN=sast", "CN=sast", &[0x42]);
        let mut rng2 = deterministic_rng(11);
        let ccm = self_signed_rsa_identity(&mut rng2, "CN=ccm", "CN=sast", &[0x43]);

        let records = vec![
            RecordInput {
                certificate: &sast.certificate,
                role: Role::SigningAuthority,
            },
            RecordInput {
                certificate: &ccm.certificate,
                role: Role::CallManager,
            },
        ];

        let file = build(
            &records,
            &sast,
            HashAlgorithm::Sha512,
            Some((1, 1)),
            "trust.tlv",
            1_700_000_000,
        )
        .unwrap();

        let (view, parsed) = parse(&file).unwrap();
        assert_eq!(view.signer_version, Some((1, 1)));
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].role, Role::SigningAuthority);
        assert_eq!(parsed[1].role, Role::CallManager);
        verify_signature(&file).unwrap();
    }

    #[test]
    fn tampered_subject_keeps_parsing_but_fails_verify() {
        let mut rng = deterministic_rng(20);
        let sast = self_signed_rsa_identity(&mut rng, "CN=sast", "CN=sast", &[0x42]);
        let records = vec![RecordInput {
            certificate: &sast.certificate,
            role: Role::SigningAuthority,
        }];
        let mut file = build(
            &records,
            &sast,
            HashAlgorithm::Sha1,
            None,
            "trust.tlv",
            1_700_000_000,
        )
        .unwrap();

        let (_, parsed) = parse(&file).unwrap();
        let subject_range = parsed[0].subject_name.clone();
        file[subject_range.start] ^= 0xFF;

        let (_, parsed_after) = parse(&file).unwrap();
        assert_eq!(parsed_after[0].role, Role::SigningAuthority);
        assert!(matches!(
            verify_signature(&file),
            Err(EnvelopeError::InvalidSignature)
        ));
    }
}
