//! The TLV envelope engine: codec, schema, signature binder, and the three
//! payload profiles (opaque/SGN, record list/trust list, encrypted/ENC)
//! layered on top of them.
//!
//! This crate has no file I/O and no CLI surface — it transforms bytes and
//! keys into bytes. A thin driver is expected to read/write files, parse
//! arguments, and map `Result` onto an exit code.

pub mod binder;
pub mod profiles;
pub mod schema;
pub mod tlv;
pub mod xml;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use binder::{extract, sign, splice_in, verify};
pub use profiles::{encrypted, opaque, records};
pub use schema::{assemble_header, walk_header, AssembledHeader, EncryptionSpec, EncryptionView, HeaderSpec, HeaderView};
pub use tlv::{decode_next, encode, Decoded};
