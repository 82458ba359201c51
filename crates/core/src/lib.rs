//! # UTXO Core
//!
//! `utxo-core` contains chain-agnostic utilities and traits used by the `utxo-bitcoins` crate.
//!
//! ## Crate Layout
//!
//! ### Hashes
//!
//! The hashes module provides `Write`-based hashers for bitcoin's double-sha2 (`Hash256`) and
//! `ripemd160(sha2(x))` (`Hash160`), and the `MarkedDigest` traits used to newtype digests for
//! a specific purpose. E.g. a TXID and a sighash are both 32-byte double-sha2 outputs, but
//! should never be confused.
//!
//! ### ByteFormat trait
//!
//! The `ByteFormat` trait is a simple serialization API using `std::io::{Read, Write}`.
//! Implementers define the binary serialization format of the type. Transaction types must
//! implement `ByteFormat`, as the provided `txid` and `sighash` logic write through it.
//!
//! `ByteFormat` has an associated `Error` type. Most basic types can simply use the provided
//! `SerError`. More complex types will want a custom error type that is easily instantiated
//! from a `SerError` or an `std::io::Error`.
//!
//! ### Enc
//!
//! Base58Check and bech32 witness-program codecs, the `EncodingError` type, and the
//! `AddressEncoder` trait implemented per chain family.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]

#[macro_use]
pub mod macros;

pub mod enc;
pub mod hashes;
pub mod ser;
pub mod types;
