//! Deterministic greedy coin selection with a virtual-size fee model.
//!
//! Candidates are consumed oldest-first. After each input the selector checks whether the
//! accumulated value pays the target and fee with a change output, and then without one.
//! Change at or below the dust threshold is never created. It is left to the fee instead.

use thiserror::Error;
use tracing::debug;
use utxo_core::ser::prefix_byte_len;

use crate::types::utxo::UnspentOutput;

/// Errors returned by the coin selector
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum SelectionError {
    /// The requested amount is 0
    #[error("Cannot send a zero amount")]
    ZeroAmount,

    /// The requested amount could not be spent by its recipient
    #[error("Amount {amount} is below the dust threshold {threshold}")]
    DustAmount {
        /// The requested amount
        amount: u64,
        /// The configured dust threshold
        threshold: u64,
    },

    /// The candidates cannot pay the amount plus fee
    #[error("Insufficient funds. Available {available}, required {required}")]
    InsufficientFunds {
        /// The sum of all candidates
        available: u64,
        /// The amount plus the fee for spending every candidate
        required: u64,
    },

    /// An amount or fee computation overflowed
    #[error("Amount overflow")]
    AmountOverflow,
}

/// How the fee of a transaction is determined.
#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Debug, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FeePolicy {
    /// A fixed fee in smallest units
    Exact(u64),
    /// A fee rate in smallest units per virtual byte
    Rate(u64),
}

impl FeePolicy {
    /// The fee for a transaction of `vsize` virtual bytes
    pub fn fee_for(&self, vsize: usize) -> Result<u64, SelectionError> {
        match self {
            FeePolicy::Exact(fee) => Ok(*fee),
            FeePolicy::Rate(rate) => rate
                .checked_mul(vsize as u64)
                .ok_or(SelectionError::AmountOverflow),
        }
    }
}

/// Length of a placeholder signature: 71-byte low-R DER plus the sighash byte.
pub const PLACEHOLDER_SIGNATURE_LEN: usize = 72;

/// Length of a compressed public key.
pub const PLACEHOLDER_PUBLIC_KEY_LEN: usize = 33;

/// The serialized cost of one input, split into non-witness and witness bytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InputCost {
    /// Outpoint, script_sig and sequence bytes
    pub base: usize,
    /// Witness stack bytes, including the item count. 0 for non-witness inputs.
    pub witness: usize,
}

fn push_len(len: usize) -> usize {
    match len {
        0..=0x4b => 1 + len,
        0x4c..=0xff => 2 + len,
        _ => 3 + len,
    }
}

fn var_len(len: usize) -> usize {
    prefix_byte_len(len as u64) as usize + len
}

impl InputCost {
    fn legacy(script_sig_len: usize) -> Self {
        Self {
            base: 36 + var_len(script_sig_len) + 4,
            witness: 0,
        }
    }

    fn witness(items: &[usize]) -> Self {
        Self {
            base: 36 + 1 + 4,
            witness: prefix_byte_len(items.len() as u64) as usize
                + items.iter().map(|len| var_len(*len)).sum::<usize>(),
        }
    }

    /// `<sig> <pubkey>`
    pub fn p2pkh() -> Self {
        Self::legacy(push_len(PLACEHOLDER_SIGNATURE_LEN) + push_len(PLACEHOLDER_PUBLIC_KEY_LEN))
    }

    /// `OP_0 <sig> <redeem script>`
    pub fn p2sh_multisig(redeem_script_len: usize) -> Self {
        Self::legacy(1 + push_len(PLACEHOLDER_SIGNATURE_LEN) + push_len(redeem_script_len))
    }

    /// Witness `[sig, pubkey]`
    pub fn p2wpkh() -> Self {
        Self::witness(&[PLACEHOLDER_SIGNATURE_LEN, PLACEHOLDER_PUBLIC_KEY_LEN])
    }

    /// Witness `[<>, sig, witness script]`
    pub fn p2wsh_multisig(witness_script_len: usize) -> Self {
        Self::witness(&[0, PLACEHOLDER_SIGNATURE_LEN, witness_script_len])
    }
}

/// Estimates the virtual size of a transaction spending `n` inputs of one kind to a payment
/// output and an optional change output.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SizeEstimate {
    /// The cost of each input
    pub input: InputCost,
    /// Serialized length of the payment output
    pub payment_output: usize,
    /// Serialized length of the change output
    pub change_output: usize,
}

impl SizeEstimate {
    /// Instantiate an estimate from an input cost and the output script lengths.
    pub fn new(input: InputCost, payment_script_len: usize, change_script_len: usize) -> Self {
        Self {
            input,
            payment_output: 8 + var_len(payment_script_len),
            change_output: 8 + var_len(change_script_len),
        }
    }

    /// Non-witness bytes of the transaction
    pub fn base_size(&self, inputs: usize, with_change: bool) -> usize {
        let outputs = if with_change { 2 } else { 1 };
        let mut len = 4 + prefix_byte_len(inputs as u64) as usize + inputs * self.input.base;
        len += prefix_byte_len(outputs) as usize + self.payment_output;
        if with_change {
            len += self.change_output;
        }
        len + 4
    }

    /// Witness bytes of the transaction, including the marker and flag
    pub fn witness_size(&self, inputs: usize) -> usize {
        if self.input.witness == 0 {
            0
        } else {
            2 + inputs * self.input.witness
        }
    }

    /// ceil((4 * base + witness) / 4)
    pub fn vsize(&self, inputs: usize, with_change: bool) -> usize {
        let weight = 4 * self.base_size(inputs, with_change) + self.witness_size(inputs);
        (weight + 3) / 4
    }
}

/// The outcome of a successful selection.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Selection {
    /// The chosen outputs, in spending order
    pub inputs: Vec<UnspentOutput>,
    /// The fee paid
    pub fee: u64,
    /// The change amount, if a change output is needed
    pub change: Option<u64>,
}

impl Selection {
    /// The sum of the chosen outputs
    pub fn total_in(&self) -> u64 {
        self.inputs.iter().map(|u| u.amount).sum()
    }
}

/// Greedy, deterministic coin selector.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CoinSelector {
    /// Outputs at or below this value are never created
    pub dust_threshold: u64,
}

impl Default for CoinSelector {
    fn default() -> Self {
        Self {
            dust_threshold: crate::config::DEFAULT_DUST_THRESHOLD,
        }
    }
}

impl CoinSelector {
    /// Instantiate a selector with a dust threshold
    pub fn new(dust_threshold: u64) -> Self {
        Self { dust_threshold }
    }

    /// Sort candidates into spending order: confirmed before unconfirmed, then by ascending
    /// height, display-order txid, and output index.
    pub fn order(candidates: &mut [UnspentOutput]) {
        candidates.sort_by_key(|u| {
            (
                u.is_unconfirmed(),
                u.block_height,
                u.outpoint.display_order_key(),
            )
        });
    }

    /// Select inputs paying `target` plus the fee.
    pub fn select(
        &self,
        candidates: &[UnspentOutput],
        target: u64,
        fee: FeePolicy,
        size: &SizeEstimate,
    ) -> Result<Selection, SelectionError> {
        if target == 0 {
            return Err(SelectionError::ZeroAmount);
        }
        if target < self.dust_threshold {
            return Err(SelectionError::DustAmount {
                amount: target,
                threshold: self.dust_threshold,
            });
        }

        let mut ordered = candidates.to_vec();
        Self::order(&mut ordered);

        let mut total: u64 = 0;
        for (i, candidate) in ordered.iter().enumerate() {
            total = total
                .checked_add(candidate.amount)
                .ok_or(SelectionError::AmountOverflow)?;
            let count = i + 1;

            let fee_with_change = fee.fee_for(size.vsize(count, true))?;
            let required = target
                .checked_add(fee_with_change)
                .ok_or(SelectionError::AmountOverflow)?;
            if total > required && total - required > self.dust_threshold {
                let selection = Selection {
                    inputs: ordered[..count].to_vec(),
                    fee: fee_with_change,
                    change: Some(total - required),
                };
                debug!(inputs = count, fee = selection.fee, change = total - required, "selected coins");
                return Ok(selection);
            }

            let fee_without_change = fee.fee_for(size.vsize(count, false))?;
            let required = target
                .checked_add(fee_without_change)
                .ok_or(SelectionError::AmountOverflow)?;
            if total >= required {
                // sub-dust leftover goes to the fee
                let selection = Selection {
                    inputs: ordered[..count].to_vec(),
                    fee: total - target,
                    change: None,
                };
                debug!(inputs = count, fee = selection.fee, "selected coins without change");
                return Ok(selection);
            }
        }

        let fee_all = fee.fee_for(size.vsize(ordered.len().max(1), false))?;
        Err(SelectionError::InsufficientFunds {
            available: total,
            required: target.saturating_add(fee_all),
        })
    }
}
