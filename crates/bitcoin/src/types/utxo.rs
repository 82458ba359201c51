//! The unspent output record kept by the store and consumed by the coin selector.

use serde::{Deserialize, Serialize};
use utxo_core::ser::SerResult;

use crate::types::{script::ScriptPubkey, txin::Outpoint};

/// An output the wallet may spend, as reported by a block explorer or node.
///
/// Identity is the outpoint. Two records with the same outpoint describe the same coin.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq, Hash)]
pub struct UnspentOutput {
    /// The height of the block confirming the output. 0 when unconfirmed.
    pub block_height: u64,
    /// The output's outpoint
    pub outpoint: Outpoint,
    /// The output value in smallest units
    pub amount: u64,
    /// The output's script pubkey, if the explorer reported it
    #[serde(default)]
    pub script: Option<ScriptPubkey>,
}

impl UnspentOutput {
    /// Instantiate a new unspent output with no known script.
    pub fn new(block_height: u64, outpoint: Outpoint, amount: u64) -> Self {
        Self {
            block_height,
            outpoint,
            amount,
            script: None,
        }
    }

    /// Instantiate from an explorer record. `txid_hex` is in display (big-endian) order.
    pub fn from_explorer(
        block_height: u64,
        txid_hex: &str,
        index: u32,
        amount: u64,
    ) -> SerResult<Self> {
        Ok(Self::new(
            block_height,
            Outpoint::from_explorer_format(txid_hex, index)?,
            amount,
        ))
    }

    /// Attach the output's script pubkey.
    pub fn with_script(mut self, script: ScriptPubkey) -> Self {
        self.script = Some(script);
        self
    }

    /// True if the output has no confirming block.
    pub fn is_unconfirmed(&self) -> bool {
        self.block_height == 0
    }
}
