//! Re-exports of the types needed to run a spend end to end.

pub use crate::{
    builder::{
        signing::{compress_public_key, der_signature, SignatureInfo},
        BuildState, BuilderVariant, SendRequest, TransactionBuilder,
    },
    config::{BuilderConfig, Ordering, SequencePolicy},
    enc::encoder::LockingScriptBuilder,
    error::{BuildError, ErrorKind, SignatureError},
    hashes::{SighashDigest, TXID},
    nets::*,
    select::{CoinSelector, FeePolicy, SelectionError},
    store::UnspentOutputStore,
    types::{LockingScript, Outpoint, ScriptType, Spendable, UnspentOutput},
};

pub use utxo_core::{enc::AddressEncoder, ser::ByteFormat};
