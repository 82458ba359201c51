//! Errors returned by the transaction builder, and the coarse kinds callers branch on.

use thiserror::Error;
use utxo_core::enc::EncodingError;

use crate::{
    config::SequencePolicy,
    select::SelectionError,
    types::{script::ScriptType, tx::TxError},
};

/// A mismatch between the emitted sighashes and the signatures returned for them.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum SignatureError {
    /// One signature is required per input
    #[error("Expected {expected} signatures, got {got}")]
    Count {
        /// The number of inputs
        expected: usize,
        /// The number of signatures supplied
        got: usize,
    },

    /// The signature claims to sign a different digest than the one emitted for its input
    #[error("Signature {index} does not sign the digest emitted for its input")]
    HashMismatch {
        /// The input index
        index: usize,
    },

    /// The public key cannot unlock the input's script
    #[error("Public key {index} does not match the script of its input")]
    PublicKeyMismatch {
        /// The input index
        index: usize,
    },

    /// The signature is not a 64-byte r||s pair, or the public key is not valid SEC1
    #[error("Malformed signature or public key")]
    Malformed,
}

/// The kind of a `BuildError`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// Checksum failure, unrecognized prefix, malformed length
    AddressFormat,
    /// No implementation exists for the decoded or requested script type
    UnsupportedScriptType,
    /// The known outputs cannot pay for the request
    InsufficientFunds,
    /// Signatures do not correspond to the emitted digests
    SignatureMismatch,
    /// An internal invariant was violated before serialization
    SerializationInvariant,
}

/// Errors returned by the `TransactionBuilder`.
#[derive(Debug, Error)]
pub enum BuildError {
    /// An address could not be decoded for the builder's network
    #[error("Invalid address {address:?}: {source}")]
    InvalidAddress {
        /// The address as given
        address: String,
        /// The decoder error
        #[source]
        source: EncodingError,
    },

    /// The source address locks funds with a script this builder cannot unlock
    #[error("Cannot spend {script_type:?} outputs of {address:?}")]
    UnsupportedScriptType {
        /// The source address
        address: String,
        /// Its script type
        script_type: ScriptType,
    },

    /// A script-hash source address has no registered redeem script, or it is not a 1-of-n
    /// multisig script
    #[error("No spendable redeem script registered for {address:?}")]
    MissingRedeemScript {
        /// The source address
        address: String,
    },

    /// Coin selection failed
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Signatures do not match the emitted digests
    #[error(transparent)]
    SignatureMismatch(#[from] SignatureError),

    /// A `Replaceable` sequence policy holds a value that does not signal replaceability
    #[error("Sequence policy {0:?} is above the replaceable maximum 0xfffffffd")]
    InvalidSequence(SequencePolicy),

    /// `build_for_send` was called without a matching `build_for_sign`
    #[error("No digests were emitted for this request. Call build_for_sign first")]
    NotPrepared,

    /// The plan violates an internal invariant
    #[error("Serialization invariant violated: {0}")]
    SerializationInvariant(String),

    /// Bubbled up from the native transaction types
    #[error(transparent)]
    Tx(#[from] TxError),

    /// Bubbled up from the `bitcoin` library encoder
    #[error("Library encoder error: {0}")]
    Library(String),
}

impl BuildError {
    pub(crate) fn invalid_address(address: &str, source: EncodingError) -> Self {
        BuildError::InvalidAddress {
            address: address.to_owned(),
            source,
        }
    }

    /// The kind of error, for callers that branch on recoverability.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuildError::InvalidAddress {
                source: EncodingError::UnknownScriptType,
                ..
            } => ErrorKind::UnsupportedScriptType,
            BuildError::InvalidAddress { .. } => ErrorKind::AddressFormat,
            BuildError::UnsupportedScriptType { .. } | BuildError::MissingRedeemScript { .. } => {
                ErrorKind::UnsupportedScriptType
            }
            BuildError::Selection(SelectionError::AmountOverflow) => {
                ErrorKind::SerializationInvariant
            }
            BuildError::Selection(_) => ErrorKind::InsufficientFunds,
            BuildError::SignatureMismatch(_) | BuildError::NotPrepared => {
                ErrorKind::SignatureMismatch
            }
            BuildError::InvalidSequence(_)
            | BuildError::SerializationInvariant(_)
            | BuildError::Tx(_)
            | BuildError::Library(_) => ErrorKind::SerializationInvariant,
        }
    }
}

/// Type alias for results with a `BuildError`
pub type BuildResult<T> = Result<T, BuildError>;
