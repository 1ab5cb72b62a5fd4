//! The envelope schema (spec.md §4.2): which tags appear in a header, in
//! what order, which nest, which are mandatory. This module is the single
//! source of truth for tag numbering — nothing outside it hard-codes a tag
//! byte.
//!
//! `walk_header` descends into container tags without a stack: a
//! container's nested elements exactly fill its declared length, so
//! continuing the flat byte-offset iteration into the container's value
//! range and back out again requires no explicit push/pop.

use std::ops::Range;

use envelope_types::tag::header::*;
use envelope_types::{EnvelopeError, HashAlgorithm, Result};

use crate::tlv::{decode_next, encode};

/// Byte ranges recorded while walking `EncryptionInfo`.
#[derive(Debug, Clone)]
pub struct EncryptionView {
    pub iv: Range<usize>,
    pub padding_count: u16,
    pub key_size_bits: u16,
    pub key_algorithm: u8,
    pub key: Range<usize>,
}

impl EncryptionView {
    fn empty() -> Self {
        EncryptionView {
            iv: 0..0,
            padding_count: 0,
            key_size_bits: 0,
            key_algorithm: 0,
            key: 0..0,
        }
    }
}

/// Everything the walker extracts from a header, as byte ranges into the
/// original buffer. Returned even on error (spec.md §7: "the parser prints
/// what it has decoded so far before raising").
#[derive(Debug, Clone)]
pub struct HeaderView {
    pub version: (u8, u8),
    pub header_length: usize,
    pub signer_name: Range<usize>,
    pub issuer_name: Range<usize>,
    pub serial_number: Range<usize>,
    pub hash_algorithm: Option<HashAlgorithm>,
    pub signature_span: Option<Range<usize>>,
    pub filename: Range<usize>,
    pub timestamp: Option<u32>,
    pub signer_version: Option<(u8, u8)>,
    pub encryption: Option<EncryptionView>,
    pub encryption_hash_algorithm: Option<HashAlgorithm>,
    pub encryption_hash: Range<usize>,
}

impl HeaderView {
    fn empty() -> Self {
        HeaderView {
            version: (0, 0),
            header_length: 0,
            signer_name: 0..0,
            issuer_name: 0..0,
            serial_number: 0..0,
            hash_algorithm: None,
            signature_span: None,
            filename: 0..0,
            timestamp: None,
            signer_version: None,
            encryption: None,
            encryption_hash_algorithm: None,
            encryption_hash: 0..0,
        }
    }
}

/// Walk a header. On structural failure the partial view accumulated so
/// far is returned alongside the error.
pub fn walk_header(buf: &[u8]) -> std::result::Result<HeaderView, (HeaderView, EnvelopeError)> {
    let mut view = HeaderView::empty();

    let d = decode_next(buf, 0).map_err(|e| (view.clone(), e))?;
    if d.tag != VERSION || d.length != 2 {
        let e = EnvelopeError::BadTag {
            offset: 0,
            expected: VERSION,
            found: d.tag,
        };
        return Err((view, e));
    }
    view.version = (buf[d.value_offset], buf[d.value_offset + 1]);
    let mut offset = d.next_offset;

    let d = decode_next(buf, offset).map_err(|e| (view.clone(), e))?;
    if d.tag != HEADER_LENGTH || d.length != 2 {
        let e = EnvelopeError::BadTag {
            offset,
            expected: HEADER_LENGTH,
            found: d.tag,
        };
        return Err((view, e));
    }
    view.header_length = u16::from_be_bytes([buf[d.value_offset], buf[d.value_offset + 1]]) as usize;
    offset = d.next_offset;
    let header_length = view.header_length;

    while offset < header_length {
        let d = decode_next(buf, offset).map_err(|e| (view.clone(), e))?;
        match d.tag {
            _ if is_container(d.tag) => {
                offset = d.value_offset;
            }
            SIGNER_NAME => {
                view.signer_name = d.value_offset..d.next_offset;
                offset = d.next_offset;
            }
            ISSUER_NAME => {
                view.issuer_name = d.value_offset..d.next_offset;
                offset = d.next_offset;
            }
            SERIAL_NUMBER => {
                view.serial_number = d.value_offset..d.next_offset;
                offset = d.next_offset;
            }
            HASH_ALGORITHM => {
                if d.length != 1 {
                    return Err((view, EnvelopeError::MissingField("HASH_ALGORITHM")));
                }
                view.hash_algorithm =
                    Some(HashAlgorithm::try_from(buf[d.value_offset]).map_err(|e| (view.clone(), e))?);
                offset = d.next_offset;
            }
            // Read and ignored on parse (spec.md §4.2).
            SIGNATURE_ALGORITHM | SIGNATURE_MODULUS => {
                offset = d.next_offset;
            }
            SIGNATURE => {
                view.signature_span = Some(d.value_offset..d.next_offset);
                offset = d.next_offset;
            }
            FILENAME => {
                view.filename = d.value_offset..d.next_offset;
                offset = d.next_offset;
            }
            TIMESTAMP => {
                if d.length != 4 {
                    return Err((view, EnvelopeError::MissingField("TIMESTAMP")));
                }
                let bytes: [u8; 4] = buf[d.value_offset..d.next_offset]
                    .try_into()
                    .expect("length already checked to be exactly 4");
                view.timestamp = Some(u32::from_be_bytes(bytes));
                offset = d.next_offset;
            }
            SIGNER_VERSION => {
                if d.length != 2 {
                    return Err((view, EnvelopeError::MissingField("SIGNER_VERSION")));
                }
                view.signer_version = Some((buf[d.value_offset], buf[d.value_offset + 1]));
                offset = d.next_offset;
            }
            ENCRYPTION_UNKNOWN1 | ENCRYPTION_UNKNOWN2 => {
                offset = d.next_offset;
            }
            ENCRYPTION_IV => {
                view.encryption.get_or_insert_with(EncryptionView::empty).iv =
                    d.value_offset..d.next_offset;
                offset = d.next_offset;
            }
            ENCRYPTION_PADDING => {
                if d.length != 2 {
                    return Err((view, EnvelopeError::MissingField("ENCRYPTION_PADDING")));
                }
                view.encryption
                    .get_or_insert_with(EncryptionView::empty)
                    .padding_count = u16::from_be_bytes([buf[d.value_offset], buf[d.value_offset + 1]]);
                offset = d.next_offset;
            }
            ENCRYPTION_KEY_SIZE => {
                if d.length != 2 {
                    return Err((view, EnvelopeError::MissingField("ENCRYPTION_KEY_SIZE")));
                }
                view.encryption
                    .get_or_insert_with(EncryptionView::empty)
                    .key_size_bits = u16::from_be_bytes([buf[d.value_offset], buf[d.value_offset + 1]]);
                offset = d.next_offset;
            }
            ENCRYPTION_KEY_ALGORITHM => {
                if d.length != 1 {
                    return Err((view, EnvelopeError::MissingField("ENCRYPTION_KEY_ALGORITHM")));
                }
                view.encryption
                    .get_or_insert_with(EncryptionView::empty)
                    .key_algorithm = buf[d.value_offset];
                offset = d.next_offset;
            }
            ENCRYPTION_KEY => {
                view.encryption.get_or_insert_with(EncryptionView::empty).key =
                    d.value_offset..d.next_offset;
                offset = d.next_offset;
            }
            ENCRYPTION_HASH_ALGORITHM => {
                if d.length != 1 {
                    return Err((view, EnvelopeError::MissingField("ENCRYPTION_HASH_ALGORITHM")));
                }
                view.encryption_hash_algorithm =
                    Some(HashAlgorithm::try_from(buf[d.value_offset]).map_err(|e| (view.clone(), e))?);
                offset = d.next_offset;
            }
            ENCRYPTION_HASH => {
                view.encryption_hash = d.value_offset..d.next_offset;
                offset = d.next_offset;
            }
            PADDING => {
                offset = d.next_offset;
            }
            other => {
                return Err((view, EnvelopeError::UnknownTag { tag: other, offset }));
            }
        }
    }

    Ok(view)
}

/// Encryption-specific fields needed by [`assemble_header`] for an ENC
/// envelope. `None` for SGN and trust-list envelopes.
pub struct EncryptionSpec<'a> {
    pub iv: &'a [u8; 16],
    pub padding_count: u16,
    pub key_size_bits: u16,
    pub key_algorithm: u8,
    pub wrapped_key: &'a [u8],
    pub hash_algorithm: HashAlgorithm,
    pub hash: &'a [u8],
}

/// Everything needed to assemble a header, independent of the payload
/// profile that follows it.
pub struct HeaderSpec<'a> {
    pub version: (u8, u8),
    pub signer_name: &'a str,
    pub issuer_name: &'a str,
    pub serial_number: &'a [u8],
    pub hash_algorithm: HashAlgorithm,
    pub signature_len: usize,
    pub filename: &'a str,
    pub timestamp: u32,
    pub signer_version: Option<(u8, u8)>,
    pub encryption: Option<EncryptionSpec<'a>>,
}

pub struct AssembledHeader {
    pub bytes: Vec<u8>,
    pub signature_insert_offset: usize,
    pub header_length: usize,
}

/// Assemble a header with every element except `SIGNATURE`, recording the
/// offset at which it belongs (spec.md §4.2, §9 "reserved-position
/// signing").
pub fn assemble_header(spec: &HeaderSpec) -> Result<AssembledHeader> {
    spec.hash_algorithm.assert_producible()?;
    if let Some(enc) = &spec.encryption {
        enc.hash_algorithm.assert_producible()?;
    }
    let modulus_index = envelope_types::algo::signature_len_to_modulus_index(spec.signature_len)?;

    let mut buf = Vec::new();
    buf.extend(encode(VERSION, &[spec.version.0, spec.version.1])?);

    let header_length_value_offset = buf.len() + 3;
    buf.extend(encode(HEADER_LENGTH, &[0, 0])?);

    let mut signer_name = spec.signer_name.as_bytes().to_vec();
    signer_name.push(0);
    let mut issuer_name = spec.issuer_name.as_bytes().to_vec();
    issuer_name.push(0);

    let mut signer_info = Vec::new();
    signer_info.extend(encode(SIGNER_NAME, &signer_name)?);
    signer_info.extend(encode(ISSUER_NAME, &issuer_name)?);
    signer_info.extend(encode(SERIAL_NUMBER, spec.serial_number)?);
    buf.extend(encode(SIGNER_INFO, &signer_info)?);

    let mut sig_algo_info = Vec::new();
    sig_algo_info.extend(encode(
        SIGNATURE_ALGORITHM,
        &[envelope_types::algo::SIGNATURE_ALGORITHM_RSA_PKCS1],
    )?);
    sig_algo_info.extend(encode(SIGNATURE_MODULUS, &[modulus_index])?);

    let mut signature_info = Vec::new();
    signature_info.extend(encode(HASH_ALGORITHM, &[spec.hash_algorithm.tag_value()])?);
    signature_info.extend(encode(SIGNATURE_ALGORITHM_INFO, &sig_algo_info)?);
    buf.extend(encode(SIGNATURE_INFO, &signature_info)?);

    // This is where SIGNATURE would appear; the binder splices it in later.
    let signature_insert_offset = buf.len();

    let mut filename = spec.filename.as_bytes().to_vec();
    filename.push(0);
    buf.extend(encode(FILENAME, &filename)?);
    buf.extend(encode(TIMESTAMP, &spec.timestamp.to_be_bytes())?);

    if let Some(version) = spec.signer_version {
        buf.extend(encode(SIGNER_VERSION, &[version.0, version.1])?);
    }

    if let Some(enc) = &spec.encryption {
        let mut iv_info = Vec::new();
        iv_info.extend(encode(ENCRYPTION_UNKNOWN1, &[0])?);
        iv_info.extend(encode(ENCRYPTION_IV, enc.iv)?);
        iv_info.extend(encode(ENCRYPTION_PADDING, &enc.padding_count.to_be_bytes())?);

        let mut key_info = Vec::new();
        key_info.extend(encode(ENCRYPTION_UNKNOWN2, &[0])?);
        key_info.extend(encode(ENCRYPTION_KEY_SIZE, &enc.key_size_bits.to_be_bytes())?);
        key_info.extend(encode(ENCRYPTION_KEY_ALGORITHM, &[enc.key_algorithm])?);
        key_info.extend(encode(ENCRYPTION_KEY, enc.wrapped_key)?);

        let mut encryption_info = Vec::new();
        encryption_info.extend(encode(ENCRYPTION_IV_INFO, &iv_info)?);
        encryption_info.extend(encode(ENCRYPTION_KEY_INFO, &key_info)?);
        buf.extend(encode(ENCRYPTION_INFO, &encryption_info)?);

        buf.extend(encode(ENCRYPTION_HASH_ALGORITHM, &[enc.hash_algorithm.tag_value()])?);
        buf.extend(encode(ENCRYPTION_HASH, enc.hash)?);
    }

    while (buf.len() + 3 + spec.signature_len) % 4 != 0 {
        buf.push(PADDING);
    }

    let header_length = buf.len() + 3 + spec.signature_len;
    if header_length > 0xFFFF {
        return Err(EnvelopeError::LengthOverflow { len: header_length });
    }
    let hl_bytes = (header_length as u16).to_be_bytes();
    buf[header_length_value_offset] = hl_bytes[0];
    buf[header_length_value_offset + 1] = hl_bytes[1];

    tracing::debug!(
        header_length,
        signature_insert_offset,
        "assembled envelope header"
    );

    Ok(AssembledHeader {
        bytes: buf,
        signature_insert_offset,
        header_length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> HeaderSpec<'static> {
        HeaderSpec {
            version: (1, 0),
            signer_name: "CN=tftp",
            issuer_name: "CN=sast",
            serial_number: &[0x42],
            hash_algorithm: HashAlgorithm::Sha1,
            signature_len: 256,
            filename: "hello.sgn",
            timestamp: 1_700_000_000,
            signer_version: None,
            encryption: None,
        }
    }

    #[test]
    fn header_length_is_multiple_of_four() {
        let assembled = assemble_header(&spec()).unwrap();
        assert_eq!(assembled.header_length % 4, 0);
        assert!(assembled.header_length >= assembled.bytes.len());
    }

    #[test]
    fn rejects_sha256_header() {
        let mut s = spec();
        s.hash_algorithm = HashAlgorithm::Sha256;
        assert!(matches!(
            assemble_header(&s),
            Err(EnvelopeError::UnsupportedAlgorithm { .. })
        ));
    }

    #[test]
    fn walk_recovers_assembled_fields() {
        let assembled = assemble_header(&spec()).unwrap();
        // Splice a dummy signature in so the buffer looks like a real file.
        let mut file = assembled.bytes.clone();
        let sig = vec![0u8; 256];
        let mut framed = vec![SIGNATURE, 1, 0];
        framed.extend(&sig);
        file.splice(
            assembled.signature_insert_offset..assembled.signature_insert_offset,
            framed,
        );

        let view = walk_header(&file).unwrap();
        assert_eq!(view.version, (1, 0));
        assert_eq!(view.header_length, assembled.header_length);
        assert_eq!(&file[view.serial_number.clone()], &[0x42]);
        assert_eq!(view.hash_algorithm, Some(HashAlgorithm::Sha1));
        assert!(view.signature_span.is_some());
        assert_eq!(&file[view.filename.clone()], b"hello.sgn\0");
    }

    #[test]
    fn unknown_tag_yields_partial_view() {
        let assembled = assemble_header(&spec()).unwrap();
        let mut file = assembled.bytes.clone();
        let sig = vec![0u8; 256];
        let mut framed = vec![SIGNATURE, 1, 0];
        framed.extend(&sig);
        file.splice(
            assembled.signature_insert_offset..assembled.signature_insert_offset,
            framed,
        );
        // Corrupt the FILENAME tag into an unrecognized one.
        let filename_tag_offset = file
            .windows(1)
            .position(|w| w == [FILENAME])
            .expect("filename tag present");
        file[filename_tag_offset] = 99;

        let err = walk_header(&file).unwrap_err();
        assert!(matches!(err.1, EnvelopeError::UnknownTag { tag: 99, .. }));
        // Partial view already captured the signer name before failing.
        assert_eq!(&file[err.0.serial_number.clone()], &[0x42]);
    }
}
