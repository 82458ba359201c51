//! Holds generic transaction traits shared by bitcoin-family chains.

/// Transaction traits
pub mod tx;

pub use tx::*;
