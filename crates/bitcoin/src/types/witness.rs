//! Witness transactions, BIP143 sighash, and BIP144 serialization.
//!
//! The BIP143 digest is also the digest Bitcoin Cash signs under `SIGHASH_FORKID`. The only
//! difference is the flag committed to at the end of the preimage.

use std::io::{Read, Write};

use utxo_core::{
    hashes::{Hash256Digest, Hash256Writer, MarkedDigestWriter},
    ser::{self, ByteFormat},
    types::tx::Transaction,
};

use crate::{
    hashes::{TXID, WTXID},
    types::{
        legacy::{LegacySighashArgs, LegacyTx},
        script::{Script, Witness},
        tx::{Sighash, TxError, TxResult},
        txin::TxIn,
        txout::TxOut,
    },
};

/// Arguments required to serialize the transaction to create the BIP143 (witness) sighash
/// digest. Used in `witness_sighash` to abstract the sighash serialization logic from the hash
/// used.
///
/// For BIP143 sighash documentation, see here:
///
/// - https://github.com/bitcoin/bips/blob/master/bip-0143.mediawiki
///
/// # Note
///
/// After signing the digest, you MUST append the sighash indicator byte to the resulting
/// signature.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WitnessSighashArgs {
    /// The index of the input we'd like to sign
    pub index: usize,
    /// The sighash mode to use.
    pub sighash_flag: Sighash,
    /// The script code of the prevout. The derived P2PKH script for P2WPKH, the witness script
    /// for P2WSH, and the legacy script code for FORKID inputs.
    pub prevout_script: Script,
    /// The value of the prevout.
    pub prevout_value: u64,
}

/// A witness transaction. Any transaction that contains 1 or more witnesses.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Eq, PartialEq, Default)]
pub struct WitnessTx {
    pub(crate) legacy_tx: LegacyTx,
    pub(crate) witnesses: Vec<Witness>,
}

impl WitnessTx {
    /// Create a new WitnessTx. Since witnesses correspond to inputs, the witness vector is
    /// trimmed or padded with empty witnesses to the number of inputs.
    pub fn with_witnesses<I, O, W>(
        version: u32,
        vin: I,
        vout: O,
        witnesses: W,
        locktime: u32,
    ) -> TxResult<Self>
    where
        I: Into<Vec<TxIn>>,
        O: Into<Vec<TxOut>>,
        W: Into<Vec<Witness>>,
    {
        let vin = vin.into();
        let mut witnesses = witnesses.into();
        witnesses.resize(vin.len(), Witness::default());
        Ok(Self {
            legacy_tx: LegacyTx::new(version, vin, vout, locktime)?,
            witnesses,
        })
    }

    /// Consumes a `LegacyTx` and instantiates a new `WitnessTx` with empty witnesses
    pub fn from_legacy(legacy_tx: LegacyTx) -> Self {
        let witnesses = vec![Witness::default(); legacy_tx.inputs().len()];
        Self {
            legacy_tx,
            witnesses,
        }
    }

    /// Return a reference to the underlying legacy transaction
    pub fn as_legacy(&self) -> &LegacyTx {
        &self.legacy_tx
    }

    /// Return a reference to the witness vector
    pub fn witnesses(&self) -> &[Witness] {
        &self.witnesses
    }

    /// Set the witness of the input at `index`.
    pub fn set_witness(&mut self, index: usize, witness: Witness) -> TxResult<()> {
        let inputs = self.witnesses.len();
        let slot = self
            .witnesses
            .get_mut(index)
            .ok_or(TxError::InputOutOfRange { index, inputs })?;
        *slot = witness;
        Ok(())
    }

    /// Calculates the witness txid of the transaction.
    pub fn wtxid(&self) -> TxResult<WTXID> {
        let mut w = Hash256Writer::default();
        self.write_to(&mut w)?;
        Ok(w.finish_marked())
    }

    /// Calculates the legacy sighash of a non-witness input of this transaction.
    pub fn legacy_sighash(&self, args: &LegacySighashArgs) -> TxResult<Hash256Digest> {
        self.legacy_tx.sighash(args)
    }

    /// `hash_prevouts` per BIP143, for ALL.
    fn hash_prevouts(&self) -> TxResult<Hash256Digest> {
        let mut w = Hash256Writer::default();
        for input in self.legacy_tx.vin.iter() {
            input.outpoint.write_to(&mut w)?;
        }
        Ok(w.finish())
    }

    /// `hash_sequence` per BIP143, for ALL.
    fn hash_sequence(&self) -> TxResult<Hash256Digest> {
        let mut w = Hash256Writer::default();
        for input in self.legacy_tx.vin.iter() {
            Self::write_u32_le(&mut w, input.sequence)?;
        }
        Ok(w.finish())
    }

    /// `hash_outputs` per BIP143, for ALL.
    fn hash_outputs(&self) -> TxResult<Hash256Digest> {
        let mut w = Hash256Writer::default();
        for output in self.legacy_tx.vout.iter() {
            output.write_to(&mut w)?;
        }
        Ok(w.finish())
    }
}

impl Transaction for WitnessTx {
    type TxError = TxError;
    type Digest = Hash256Digest;
    type TxIn = TxIn;
    type TxOut = TxOut;
    type SighashArgs = WitnessSighashArgs;
    type TXID = TXID;
    type HashWriter = Hash256Writer;

    fn new<I, O>(version: u32, vin: I, vout: O, locktime: u32) -> TxResult<Self>
    where
        I: Into<Vec<Self::TxIn>>,
        O: Into<Vec<Self::TxOut>>,
    {
        Ok(Self::from_legacy(LegacyTx::new(version, vin, vout, locktime)?))
    }

    fn inputs(&self) -> &[Self::TxIn] {
        &self.legacy_tx.vin
    }

    fn outputs(&self) -> &[Self::TxOut] {
        &self.legacy_tx.vout
    }

    fn version(&self) -> u32 {
        self.legacy_tx.version
    }

    fn locktime(&self) -> u32 {
        self.legacy_tx.locktime
    }

    // The txid commits to the legacy serialization only
    fn txid(&self) -> TxResult<TXID> {
        self.legacy_tx.txid()
    }

    fn write_sighash_preimage<W: Write>(
        &self,
        writer: &mut W,
        args: &WitnessSighashArgs,
    ) -> TxResult<()> {
        let input = self
            .legacy_tx
            .vin
            .get(args.index)
            .ok_or(TxError::InputOutOfRange {
                index: args.index,
                inputs: self.legacy_tx.vin.len(),
            })?;

        Self::write_u32_le(writer, self.legacy_tx.version)?;
        writer.write_all(&self.hash_prevouts()?)?;
        writer.write_all(&self.hash_sequence()?)?;
        input.outpoint.write_to(writer)?;
        args.prevout_script.write_to(writer)?;
        Self::write_u64_le(writer, args.prevout_value)?;
        Self::write_u32_le(writer, input.sequence)?;
        writer.write_all(&self.hash_outputs()?)?;
        Self::write_u32_le(writer, self.legacy_tx.locktime)?;
        Self::write_u32_le(writer, args.sighash_flag.to_u32())?;
        Ok(())
    }
}

impl ByteFormat for WitnessTx {
    type Error = TxError;

    fn serialized_length(&self) -> usize {
        let mut len = 4; // version
        len += 2; // Segwit Flag
        len += ser::prefix_byte_len(self.legacy_tx.vin.len() as u64) as usize;
        len += self.legacy_tx.vin.serialized_length();
        len += ser::prefix_byte_len(self.legacy_tx.vout.len() as u64) as usize;
        len += self.legacy_tx.vout.serialized_length();
        for witness in self.witnesses.iter() {
            len += ser::prefix_byte_len(witness.len() as u64) as usize;
            len += witness.serialized_length();
        }
        len += 4; // locktime
        len
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> TxResult<Self>
    where
        R: Read,
    {
        let version = Self::read_u32_le(reader)?;
        let mut flag = [0u8; 2];
        reader.read_exact(&mut flag)?;
        if flag != [0u8, 1u8] {
            return Err(TxError::BadWitnessFlag(flag));
        };
        let vin: Vec<TxIn> = Self::read_prefix_vec(reader)?;
        let vout = Self::read_prefix_vec(reader)?;
        let mut witnesses = Vec::with_capacity(vin.len());
        for _ in vin.iter() {
            witnesses.push(Self::read_prefix_vec(reader)?);
        }
        let locktime = Self::read_u32_le(reader)?;

        Ok(Self {
            legacy_tx: LegacyTx {
                version,
                vin,
                vout,
                locktime,
            },
            witnesses,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> TxResult<usize>
    where
        W: Write,
    {
        let mut len = Self::write_u32_le(writer, self.legacy_tx.version)?;
        writer.write_all(&[0u8, 1u8])?;
        len += 2;
        len += Self::write_prefix_vec(writer, &self.legacy_tx.vin)?;
        len += Self::write_prefix_vec(writer, &self.legacy_tx.vout)?;
        for wit in self.witnesses.iter() {
            len += Self::write_prefix_vec(writer, wit)?;
        }
        len += Self::write_u32_le(writer, self.legacy_tx.locktime)?;
        Ok(len)
    }
}
