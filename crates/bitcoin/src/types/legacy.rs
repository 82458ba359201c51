//! Legacy (pre-segwit) transactions and the original sighash algorithm.

use std::io::{Read, Write};

use utxo_core::{
    hashes::{Hash256Digest, Hash256Writer},
    ser::{self, ByteFormat},
    types::tx::Transaction,
};

use crate::{
    hashes::TXID,
    types::{
        script::{Script, ScriptSig},
        tx::{Sighash, TxError, TxResult},
        txin::{TxIn, Vin},
        txout::{TxOut, Vout},
    },
};

/// Arguments required to serialize the transaction to create the legacy sighash digest.
///
/// Only `SIGHASH_ALL` is produced here. It commits to ALL inputs, and ALL outputs, so no further
/// modification of the transaction is allowed without invalidating the signature.
///
/// For Legacy sighash documentation, see here:
///
/// - https://en.bitcoin.it/wiki/OP_CHECKSIG#Hashtype_SIGHASH_ALL_.28default.29
///
/// # Note
///
/// After signing the digest, you MUST append the sighash indicator byte to the resulting
/// signature.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LegacySighashArgs {
    /// The index of the input we'd like to sign
    pub index: usize,
    /// The sighash mode to use.
    pub sighash_flag: Sighash,
    /// The script code of the prevout. The script pubkey for P2PKH, the redeem script for P2SH.
    pub prevout_script: Script,
}

/// A Legacy (non-witness) Transaction.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Eq, PartialEq, Default)]
pub struct LegacyTx {
    /// The version number. Usually 1 or 2.
    pub(crate) version: u32,
    /// The vector of inputs
    pub(crate) vin: Vin,
    /// The vector of outputs
    pub(crate) vout: Vout,
    /// The nLocktime field.
    pub(crate) locktime: u32,
}

impl LegacyTx {
    /// Copy the transaction, setting the script code at `index` and emptying every other
    /// script_sig.
    ///
    /// OP_CODESEPARATOR functionality is NOT provided here.
    fn legacy_sighash_prep(&self, index: usize, prevout_script: &Script) -> Self {
        let mut copy_tx = self.clone();
        for (i, input) in copy_tx.vin.iter_mut().enumerate() {
            input.script_sig = if i == index {
                ScriptSig::from(prevout_script.items())
            } else {
                ScriptSig::null()
            };
        }
        copy_tx
    }

    /// Set the script_sig of the input at `index`.
    pub fn set_script_sig(&mut self, index: usize, script_sig: ScriptSig) -> TxResult<()> {
        let inputs = self.vin.len();
        let input = self
            .vin
            .get_mut(index)
            .ok_or(TxError::InputOutOfRange { index, inputs })?;
        input.script_sig = script_sig;
        Ok(())
    }
}

impl Transaction for LegacyTx {
    type TxError = TxError;
    type Digest = Hash256Digest;
    type TxIn = TxIn;
    type TxOut = TxOut;
    type SighashArgs = LegacySighashArgs;
    type TXID = TXID;
    type HashWriter = Hash256Writer;

    fn new<I, O>(version: u32, vin: I, vout: O, locktime: u32) -> TxResult<Self>
    where
        I: Into<Vec<Self::TxIn>>,
        O: Into<Vec<Self::TxOut>>,
    {
        Ok(Self {
            version,
            vin: vin.into(),
            vout: vout.into(),
            locktime,
        })
    }

    fn inputs(&self) -> &[Self::TxIn] {
        &self.vin
    }

    fn outputs(&self) -> &[Self::TxOut] {
        &self.vout
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn locktime(&self) -> u32 {
        self.locktime
    }

    fn write_sighash_preimage<W: Write>(
        &self,
        writer: &mut W,
        args: &LegacySighashArgs,
    ) -> TxResult<()> {
        if args.sighash_flag != Sighash::All {
            return Err(TxError::UnsupportedSighash(args.sighash_flag.to_u8()));
        }
        if args.index >= self.vin.len() {
            return Err(TxError::InputOutOfRange {
                index: args.index,
                inputs: self.vin.len(),
            });
        }

        let copy_tx: Self = self.legacy_sighash_prep(args.index, &args.prevout_script);
        copy_tx.write_to(writer)?;
        Self::write_u32_le(writer, args.sighash_flag.to_u32())?;
        Ok(())
    }
}

impl ByteFormat for LegacyTx {
    type Error = TxError;

    fn serialized_length(&self) -> usize {
        let mut len = 4; // version
        len += ser::prefix_byte_len(self.vin.len() as u64) as usize;
        len += self.vin.serialized_length();
        len += ser::prefix_byte_len(self.vout.len() as u64) as usize;
        len += self.vout.serialized_length();
        len += 4; // locktime
        len
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> TxResult<Self>
    where
        R: Read,
    {
        let version = Self::read_u32_le(reader)?;
        let vin = Self::read_prefix_vec(reader)?;
        let vout = Self::read_prefix_vec(reader)?;
        let locktime = Self::read_u32_le(reader)?;
        Ok(Self {
            version,
            vin,
            vout,
            locktime,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> TxResult<usize>
    where
        W: Write,
    {
        let mut len = Self::write_u32_le(writer, self.version)?;
        len += Self::write_prefix_vec(writer, &self.vin)?;
        len += Self::write_prefix_vec(writer, &self.vout)?;
        len += Self::write_u32_le(writer, self.locktime)?;
        Ok(len)
    }
}
