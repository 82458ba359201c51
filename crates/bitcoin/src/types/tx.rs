//! Bitcoin transaction errors, sighash flags and the `BitcoinTx` wrapper.

use std::io::Error as IOError;
use thiserror::Error;

use utxo_core::{ser::{ByteFormat, SerError}, types::tx::Transaction};

use crate::{
    hashes::TXID,
    types::{legacy::LegacyTx, witness::WitnessTx},
};

/// An Error type for transaction objects
#[derive(Debug, Error)]
pub enum TxError {
    /// Serialization-related errors
    #[error(transparent)]
    SerError(#[from] SerError),

    /// IOError bubbled up from a `Write` passed to a `ByteFormat::write_to` implementation.
    #[error(transparent)]
    IOError(#[from] IOError),

    /// The sighash flag is not valid for the requested digest algorithm. FORKID flags require
    /// the BIP143-style preimage.
    #[error("Sighash flag {0:#04x} is not supported by this digest algorithm")]
    UnsupportedSighash(u8),

    /// The sighash arguments name an input the transaction does not have.
    #[error("Input index {index} out of range. Transaction has {inputs} inputs")]
    InputOutOfRange {
        /// The requested index
        index: usize,
        /// The number of inputs
        inputs: usize,
    },

    /// Got an unknown flag where we expected a witness flag. May indicate a non-witness
    /// transaction.
    #[error("Witness flag not as expected. Got {0:?}. Expected [0, 1].")]
    BadWitnessFlag([u8; 2]),
}

/// Type alias for result with TxError
pub type TxResult<T> = Result<T, TxError>;

/// All sighash modes produced by this crate. Every input commits to every input and every
/// output.
#[repr(u8)]
#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Sighash {
    /// Sign ALL inputs and ALL outputs
    All = 0x01,
    /// Sign ALL inputs and ALL outputs, with the replay-protecting FORKID bit set. The digest
    /// is always computed with the BIP143 algorithm.
    AllForkId = 0x41,
}

impl Sighash {
    /// The flag byte appended to a DER signature
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// The 4-byte flag committed to in the sighash preimage
    pub fn to_u32(self) -> u32 {
        self as u32
    }
}

/// Wrapper enum for returning values that may be EITHER a Witness OR a Legacy tx and the type is
/// not known in advance.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Eq, PartialEq)]
pub enum BitcoinTx {
    /// Witness
    Witness(WitnessTx),
    /// Legacy
    Legacy(LegacyTx),
}

impl From<WitnessTx> for BitcoinTx {
    fn from(w: WitnessTx) -> Self {
        BitcoinTx::Witness(w)
    }
}

impl From<LegacyTx> for BitcoinTx {
    fn from(w: LegacyTx) -> Self {
        BitcoinTx::Legacy(w)
    }
}

impl BitcoinTx {
    /// Deserialize raw bytes. Type information comes from the segwit marker `0001` immediately
    /// following the version bytes.
    pub fn from_bytes(bytes: &[u8]) -> TxResult<BitcoinTx> {
        let mut reader = bytes;
        if bytes.get(4..6) == Some(&[0u8, 1u8][..]) {
            Ok(WitnessTx::read_from(&mut reader, 0)?.into())
        } else {
            Ok(LegacyTx::read_from(&mut reader, 0)?.into())
        }
    }

    /// Deserialize a hex string. See `from_bytes`.
    pub fn deserialize_hex(s: &str) -> TxResult<BitcoinTx> {
        let bytes = hex::decode(s).map_err(SerError::from)?;
        Self::from_bytes(&bytes)
    }

    /// Serialize the transaction to a byte vector.
    pub fn to_bytes(&self) -> TxResult<Vec<u8>> {
        let mut v = Vec::with_capacity(self.serialized_length());
        match self {
            BitcoinTx::Witness(tx) => tx.write_to(&mut v)?,
            BitcoinTx::Legacy(tx) => tx.write_to(&mut v)?,
        };
        Ok(v)
    }

    /// The length of the serialized transaction.
    pub fn serialized_length(&self) -> usize {
        match self {
            BitcoinTx::Witness(tx) => tx.serialized_length(),
            BitcoinTx::Legacy(tx) => tx.serialized_length(),
        }
    }

    /// Return the TXID of the transaction
    pub fn txid(&self) -> TxResult<TXID> {
        match self {
            BitcoinTx::Witness(tx) => tx.txid(),
            BitcoinTx::Legacy(tx) => tx.txid(),
        }
    }

    /// Return a reference to the underlying tx as a legacy TX.
    pub fn as_legacy(&self) -> &LegacyTx {
        match self {
            BitcoinTx::Witness(tx) => tx.as_legacy(),
            BitcoinTx::Legacy(tx) => tx,
        }
    }

    /// True if the wrapped tx is a witness transaction. False otherwise
    pub fn is_witness(&self) -> bool {
        matches!(self, BitcoinTx::Witness(_))
    }
}
