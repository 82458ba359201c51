//! Holds utilites for working with cryptographic digests, and disambiguating digests via marker
//! traits.
//!
//! We want to wrap hashes in marked newtypes in order to prevent type-confusion between TXIDs,
//! sighashes, and other digests with the same length.

/// Marked hashes
pub mod marked;

/// Tooling for bitcoin-style double-sha2
pub mod hash256;

/// Tooling for bitcoin-style `ripemd160(sha2(x))`
pub mod hash160;

pub use hash160::*;
pub use hash256::*;
pub use marked::*;

pub use sha2::{Digest, Sha256};
