//! Bitcoin Outpoint, TxIn, and Vin types.

use std::io::{Read, Write};

use utxo_core::ser::{ByteFormat, SerError, SerResult};

use crate::{hashes::TXID, types::script::ScriptSig};

/// An Outpoint. This is a unique identifier for a UTXO, and is composed of a transaction ID (in
/// Bitcoin-style LE format), and the index of the output being spent within that transactions
/// output vector (vout).
///
/// `Outpoint::null()` and `Outpoint::default()` return the null Outpoint, which references a txid
/// of all 0, and a index 0xffff_ffff. This null outpoint is used in every coinbase transaction.
#[derive(
    serde::Serialize, serde::Deserialize, Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord,
)]
pub struct Outpoint {
    /// The txid that created the UTXO being pointed to.
    pub txid: TXID,
    /// The index of that UTXO in the transaction's output vector.
    pub idx: u32,
}

impl Outpoint {
    /// Returns a new Outpoint from a digest and index
    pub fn new(txid: TXID, idx: u32) -> Self {
        Self { txid, idx }
    }

    /// Returns the `default`, or `null` Outpoint. This is used in the coinbase input.
    pub fn null() -> Self {
        Outpoint {
            txid: TXID::default(),
            idx: 0xffff_ffff,
        }
    }

    /// Return the BE txid as hex, suitable for block explorers
    pub fn txid_be_hex(&self) -> String {
        self.txid.to_be_hex()
    }

    /// Instantiate an outpoint from the block explorer (big-endian) txid hex and an index
    pub fn from_explorer_format(txid_be: &str, idx: u32) -> SerResult<Self> {
        Ok(Self {
            txid: TXID::from_be_hex(txid_be)?,
            idx,
        })
    }

    /// The ordering key used by BIP69 and the coin selector: display-order txid, then index.
    pub fn display_order_key(&self) -> ([u8; 32], u32) {
        (self.txid.reversed().0, self.idx)
    }
}

impl Default for Outpoint {
    fn default() -> Self {
        Outpoint::null()
    }
}

impl ByteFormat for Outpoint {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        36
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: Read,
    {
        Ok(Outpoint {
            txid: TXID::read_from(reader, 0)?,
            idx: Self::read_u32_le(reader)?,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = self.txid.write_to(writer)?;
        len += Self::write_u32_le(writer, self.idx)?;
        Ok(len)
    }
}

/// A TxIn. This data structure contains an outpoint referencing an existing UTXO, a
/// `script_sig`, which will contain spend authorization information (when spending a Legacy
/// prevout), and a sequence number which may encode relative locktime semantics and BIP125
/// replaceability.
///
/// The `script_sig` is always empty (a null prefixed vector), for native Witness prevouts.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Eq, PartialEq, Default)]
pub struct TxIn {
    /// The Outpoint identifying the UTXO being spent.
    pub outpoint: Outpoint,
    /// For Legacy transactions, the authorization information necessary to spend the UTXO.
    pub script_sig: ScriptSig,
    /// The nSequence field
    pub sequence: u32,
}

impl TxIn {
    /// Instantiate a new TxIn
    pub fn new<T>(outpoint: Outpoint, script_sig: T, sequence: u32) -> Self
    where
        T: Into<ScriptSig>,
    {
        TxIn {
            outpoint,
            script_sig: script_sig.into(),
            sequence,
        }
    }

    /// Copy the input, stripping the script_sig information.
    pub fn unsigned(&self) -> TxIn {
        Self::new(self.outpoint, vec![], self.sequence)
    }
}

impl ByteFormat for TxIn {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        let mut len = self.outpoint.serialized_length();
        len += self.script_sig.serialized_length();
        len += 4; // sequence
        len
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: Read,
    {
        Ok(TxIn {
            outpoint: Outpoint::read_from(reader, 0)?,
            script_sig: ScriptSig::read_from(reader, 0)?,
            sequence: Self::read_u32_le(reader)?,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = self.outpoint.write_to(writer)?;
        len += self.script_sig.write_to(writer)?;
        len += Self::write_u32_le(writer, self.sequence)?;
        Ok(len)
    }
}

/// Vin is a type alias for `Vec<TxIn>`. A transaction's Vin is the Vector of
/// INputs, with a length prefix.
pub type Vin = Vec<TxIn>;
