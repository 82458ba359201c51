//! The transaction encoder built on this crate's own `ByteFormat` types.

use utxo_core::{ser::ByteFormat, types::tx::Transaction};

use crate::{
    builder::{
        plan::{DigestAlgorithm, InputStack, SpendPlan},
        TransactionEncoder,
    },
    error::BuildResult,
    hashes::SighashDigest,
    types::{
        legacy::{LegacySighashArgs, LegacyTx},
        script::{push_data, ScriptSig, Witness, WitnessStackItem},
        txin::TxIn,
        witness::{WitnessSighashArgs, WitnessTx},
    },
};

/// Encodes plans with `LegacyTx` and `WitnessTx`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NativeEncoder;

impl NativeEncoder {
    fn unsigned_tx(plan: &SpendPlan) -> BuildResult<WitnessTx> {
        let vin: Vec<TxIn> = plan
            .inputs
            .iter()
            .map(|input| TxIn::new(input.outpoint, ScriptSig::null(), input.sequence))
            .collect();
        Ok(WitnessTx::new(
            plan.version,
            vin,
            plan.outputs.clone(),
            plan.lock_time,
        )?)
    }
}

impl TransactionEncoder for NativeEncoder {
    fn sighashes(&self, plan: &SpendPlan) -> BuildResult<Vec<SighashDigest>> {
        let tx = Self::unsigned_tx(plan)?;
        let script_code = plan.script_code()?;
        let algorithm = plan.digest_algorithm();

        plan.inputs
            .iter()
            .enumerate()
            .map(|(index, input)| {
                let digest = match algorithm {
                    DigestAlgorithm::Legacy => tx.legacy_sighash(&LegacySighashArgs {
                        index,
                        sighash_flag: plan.sighash,
                        prevout_script: script_code.clone(),
                    })?,
                    DigestAlgorithm::Bip143 | DigestAlgorithm::ForkId => {
                        tx.sighash(&WitnessSighashArgs {
                            index,
                            sighash_flag: plan.sighash,
                            prevout_script: script_code.clone(),
                            prevout_value: input.value,
                        })?
                    }
                };
                Ok(SighashDigest::from(digest))
            })
            .collect()
    }

    fn encode(&self, plan: &SpendPlan, stacks: &[InputStack]) -> BuildResult<Vec<u8>> {
        let mut vin = Vec::with_capacity(plan.inputs.len());
        let mut witnesses = Vec::with_capacity(plan.inputs.len());
        for (input, stack) in plan.inputs.iter().zip(stacks.iter()) {
            let (script_sig, witness): (ScriptSig, Witness) = match stack {
                InputStack::ScriptSig(pushes) => {
                    let mut script = vec![];
                    pushes.iter().for_each(|item| push_data(&mut script, item));
                    (script.into(), Witness::default())
                }
                InputStack::Witness(items) => (
                    ScriptSig::null(),
                    items.iter().map(|item| WitnessStackItem::from(item.as_slice())).collect(),
                ),
            };
            vin.push(TxIn::new(input.outpoint, script_sig, input.sequence));
            witnesses.push(witness);
        }

        let mut bytes = vec![];
        if stacks.iter().any(InputStack::is_witness) {
            WitnessTx::with_witnesses(
                plan.version,
                vin,
                plan.outputs.clone(),
                witnesses,
                plan.lock_time,
            )?
            .write_to(&mut bytes)?;
        } else {
            LegacyTx::new(plan.version, vin, plan.outputs.clone(), plan.lock_time)?
                .write_to(&mut bytes)?;
        }
        Ok(bytes)
    }
}
