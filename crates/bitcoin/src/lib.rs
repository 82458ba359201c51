//! # UTXO Bitcoins
//!
//! Unspent output tracking, coin selection and two-phase transaction construction for
//! Bitcoin-family chains.
//!
//! A spend runs in two calls against a `TransactionBuilder`:
//!
//! 1. `build_for_sign` selects coins from the `UnspentOutputStore`, plans the transaction and
//!    returns one sighash digest per input.
//! 2. `build_for_send` accepts one external signature per digest, builds the unlocking data, and
//!    returns the consensus-serialized transaction.
//!
//! Private keys never enter this crate.
//!
//! ```
//! use utxo_bitcoins::prelude::*;
//!
//! let store = UnspentOutputStore::default();
//! let source = "bitcoincash:qrpgfcqrnqvp33vsex0clktvae2pqjfxnyxq0ml0zc";
//! store.update(
//!     source,
//!     vec![UnspentOutput::from_explorer(
//!         650_000,
//!         "54d64ab1d97b15af31f5a926db433a855ececdd1ed25f5c18376fecb648aa32c",
//!         1,
//!         99_647_214,
//!     )
//!     .unwrap()],
//! );
//!
//! let mut builder = TransactionBuilder::new(&BITCOIN_CASH, &store, BuilderConfig::default());
//! let request = SendRequest::new(
//!     source,
//!     "bitcoincash:qqcf5rrwlgx609ndt3pdck5j3a467rj8aucwvn9uvv",
//!     99_347_502,
//!     FeePolicy::Exact(299_712),
//! );
//! let hashes = builder.build_for_sign(&request).unwrap();
//! assert_eq!(hashes.len(), 1);
//! assert_eq!(builder.state(), BuildState::HashesEmitted);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]

#[macro_use]
extern crate utxo_core;

pub mod builder;
pub mod config;
pub mod enc;
pub mod error;
pub mod hashes;
pub mod nets;
pub mod prelude;
pub mod select;
pub mod store;
pub mod types;

pub use builder::*;
pub use config::*;
pub use enc::*;
pub use error::*;
pub use hashes::*;
pub use nets::*;
pub use types::*;
