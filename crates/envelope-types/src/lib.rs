//! Wire vocabulary shared by the envelope engine: tag numbering, algorithm
//! identifiers, certificate roles, and the error taxonomy. Kept dependency-
//! light so that both `envelope-crypto` and `envelope-core` can agree on one
//! vocabulary without a dependency cycle.

pub mod algo;
pub mod error;
pub mod role;
pub mod tag;

pub use algo::HashAlgorithm;
pub use error::{EnvelopeError, Result};
pub use role::Role;
