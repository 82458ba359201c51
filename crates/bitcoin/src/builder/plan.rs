//! The owned description of a transaction between selection and serialization.
//!
//! A plan holds copies of everything it spends and pays, so later store updates cannot change
//! a transaction whose digests were already handed to a signer.

use crate::{
    error::{BuildError, BuildResult},
    types::{
        script::{LockingScript, Script, ScriptPubkey, ScriptType},
        tx::Sighash,
        txin::Outpoint,
        txout::TxOut,
    },
};

/// The digest algorithm an input is signed with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DigestAlgorithm {
    /// The original algorithm, over a modified copy of the transaction
    Legacy,
    /// BIP143, for witness v0 inputs
    Bip143,
    /// The BIP143 preimage with the FORKID flag committed, for every input on FORKID networks
    ForkId,
}

/// One input of a plan.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlannedInput {
    /// The output being spent
    pub outpoint: Outpoint,
    /// Its value
    pub value: u64,
    /// The input's nSequence
    pub sequence: u32,
}

/// The unlocking data for one input, as a list of data pushes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InputStack {
    /// Pushed in order into the script_sig. An empty item is `OP_0`.
    ScriptSig(Vec<Vec<u8>>),
    /// Witness stack items. The script_sig stays empty.
    Witness(Vec<Vec<u8>>),
}

impl InputStack {
    /// True if this input carries witness data
    pub fn is_witness(&self) -> bool {
        matches!(self, InputStack::Witness(_))
    }
}

/// A fully selected transaction awaiting signatures. Every input spends `source`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SpendPlan {
    /// The transaction version
    pub version: u32,
    /// The nLocktime field
    pub lock_time: u32,
    /// The sighash flag of every input
    pub sighash: Sighash,
    /// The locking script of every input
    pub source: LockingScript,
    /// Inputs, in transaction order
    pub inputs: Vec<PlannedInput>,
    /// Outputs, in transaction order
    pub outputs: Vec<TxOut>,
    /// The fee paid
    pub fee: u64,
}

impl SpendPlan {
    /// The digest algorithm for the plan's inputs. Decided by the network's sighash flag first,
    /// then the source script type.
    pub fn digest_algorithm(&self) -> DigestAlgorithm {
        if self.sighash == Sighash::AllForkId {
            DigestAlgorithm::ForkId
        } else if self.source.script_type.is_witness() {
            DigestAlgorithm::Bip143
        } else {
            DigestAlgorithm::Legacy
        }
    }

    /// The script code committed to by every input's digest.
    pub fn script_code(&self) -> BuildResult<Script> {
        match self.source.script_type {
            ScriptType::PKH => Ok(Script::from(&self.source.script_pubkey)),
            ScriptType::WPKH => {
                let hash = self.source.hash().ok_or_else(|| {
                    BuildError::SerializationInvariant("witness program missing".to_owned())
                })?;
                Ok(Script::from(&ScriptPubkey::p2pkh(hash)))
            }
            ScriptType::SH | ScriptType::WSH => self
                .source
                .redeem_script()
                .cloned()
                .ok_or_else(|| BuildError::SerializationInvariant("redeem script missing".to_owned())),
            script_type => Err(BuildError::SerializationInvariant(format!(
                "no script code for {:?}",
                script_type
            ))),
        }
    }

    /// The sum of the input values
    pub fn total_in(&self) -> Option<u64> {
        self.inputs
            .iter()
            .try_fold(0u64, |acc, input| acc.checked_add(input.value))
    }

    /// The sum of the output values
    pub fn total_out(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, output| acc.checked_add(output.value))
    }

    /// The outpoints this plan spends
    pub fn spent_outpoints(&self) -> Vec<Outpoint> {
        self.inputs.iter().map(|input| input.outpoint).collect()
    }

    /// Sort inputs by display-order txid then index, and outputs by value then script bytes.
    pub fn sort_bip69(&mut self) {
        self.inputs
            .sort_by_key(|input| input.outpoint.display_order_key());
        self.outputs.sort_by(|a, b| {
            a.value
                .cmp(&b.value)
                .then_with(|| a.script_pubkey.items().cmp(b.script_pubkey.items()))
        });
    }

    /// Check that the plan spends something, pays something, and conserves value.
    pub fn check_invariants(&self) -> BuildResult<()> {
        if self.inputs.is_empty() {
            return Err(BuildError::SerializationInvariant("no inputs".to_owned()));
        }
        if self.outputs.is_empty() {
            return Err(BuildError::SerializationInvariant("no outputs".to_owned()));
        }
        let total_in = self
            .total_in()
            .ok_or_else(|| BuildError::SerializationInvariant("input sum overflows".to_owned()))?;
        let total_out = self
            .total_out()
            .and_then(|out| out.checked_add(self.fee))
            .ok_or_else(|| BuildError::SerializationInvariant("output sum overflows".to_owned()))?;
        if total_in != total_out {
            return Err(BuildError::SerializationInvariant(format!(
                "inputs {} do not equal outputs plus fee {}",
                total_in, total_out
            )));
        }
        Ok(())
    }

    /// Build the unlocking data for an input from its DER signature with the sighash byte
    /// appended, and the public key in the form the script commits to.
    pub fn input_stack(&self, signature: Vec<u8>, public_key: Vec<u8>) -> BuildResult<InputStack> {
        let redeem = || {
            self.source
                .redeem_script()
                .map(|script| script.items().to_vec())
                .ok_or_else(|| BuildError::SerializationInvariant("redeem script missing".to_owned()))
        };
        match self.source.script_type {
            ScriptType::PKH => Ok(InputStack::ScriptSig(vec![signature, public_key])),
            ScriptType::SH => Ok(InputStack::ScriptSig(vec![vec![], signature, redeem()?])),
            ScriptType::WPKH => Ok(InputStack::Witness(vec![signature, public_key])),
            ScriptType::WSH => Ok(InputStack::Witness(vec![vec![], signature, redeem()?])),
            script_type => Err(BuildError::SerializationInvariant(format!(
                "cannot unlock {:?}",
                script_type
            ))),
        }
    }
}
