//! The TLV codec (spec.md §4.1): encode/decode one tag-length-value
//! element at a time. `PADDING` (tag 13) is the one structural exception —
//! it carries no length field, just a bare filler byte.

use envelope_types::tag::PADDING;
use envelope_types::{EnvelopeError, Result};

/// Encode a single element. For `tag == PADDING` the `value` argument is
/// ignored and a bare `0x0D` byte is emitted.
pub fn encode(tag: u8, value: &[u8]) -> Result<Vec<u8>> {
    if tag == PADDING {
        return Ok(vec![PADDING]);
    }
    if value.len() > 0xFFFF {
        return Err(EnvelopeError::LengthOverflow { len: value.len() });
    }
    let mut out = Vec::with_capacity(3 + value.len());
    out.push(tag);
    out.extend_from_slice(&(value.len() as u16).to_be_bytes());
    out.extend_from_slice(value);
    Ok(out)
}

/// The result of decoding one element: its tag, declared length, and the
/// byte offsets bracketing its value and the next element.
#[derive(Debug, Clone, Copy)]
pub struct Decoded {
    pub tag: u8,
    pub length: usize,
    pub value_offset: usize,
    pub next_offset: usize,
}

/// Decode the element starting at `offset`. Returns `Truncated` if the
/// buffer ends before the declared length is satisfied.
pub fn decode_next(buf: &[u8], offset: usize) -> Result<Decoded> {
    if offset >= buf.len() {
        return Err(EnvelopeError::Truncated { offset });
    }
    let tag = buf[offset];
    if tag == PADDING {
        return Ok(Decoded {
            tag,
            length: 0,
            value_offset: offset + 1,
            next_offset: offset + 1,
        });
    }
    if offset + 3 > buf.len() {
        return Err(EnvelopeError::Truncated { offset });
    }
    let length = u16::from_be_bytes([buf[offset + 1], buf[offset + 2]]) as usize;
    let value_offset = offset + 3;
    let next_offset = value_offset + length;
    if next_offset > buf.len() {
        return Err(EnvelopeError::Truncated { offset });
    }
    Ok(Decoded {
        tag,
        length,
        value_offset,
        next_offset,
    })
}
