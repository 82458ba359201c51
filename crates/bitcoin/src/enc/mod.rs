//! Address encoding. Base58Check and bech32 live in `utxo_core::enc`. This module adds
//! CashAddr and the `LockingScriptBuilder`, which maps every address format of a network onto
//! locking scripts.

pub mod cashaddr;
pub mod encoder;

pub use encoder::LockingScriptBuilder;
pub use utxo_core::enc::{AddressEncoder, EncodingError, EncodingResult};
