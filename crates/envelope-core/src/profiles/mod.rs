//! The three payload profiles layered on the envelope core (spec.md §4.4):
//! opaque (SGN), record list (trust list), and encrypted (ENC).

pub mod encrypted;
pub mod opaque;
pub mod records;
