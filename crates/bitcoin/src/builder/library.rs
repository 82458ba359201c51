//! The transaction encoder built on the `bitcoin` crate.
//!
//! Legacy and BIP143 digests come from `SighashCache`. The library has no FORKID support, so
//! that digest is composed from its consensus encodings.

use bitcoin::{
    absolute::LockTime,
    consensus::encode::serialize,
    hashes::{sha256d, Hash},
    script::{Builder, PushBytesBuf},
    sighash::{EcdsaSighashType, SighashCache},
    transaction::Version,
    Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness,
};

use crate::{
    builder::{
        plan::{DigestAlgorithm, InputStack, SpendPlan},
        TransactionEncoder,
    },
    error::{BuildError, BuildResult},
    hashes::SighashDigest,
    types::script::ScriptType,
};

fn library_error<E: std::fmt::Display>(e: E) -> BuildError {
    BuildError::Library(e.to_string())
}

/// Encodes plans with `bitcoin::Transaction`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LibraryEncoder;

impl LibraryEncoder {
    fn unsigned_tx(plan: &SpendPlan) -> Transaction {
        Transaction {
            version: Version(plan.version as i32),
            lock_time: LockTime::from_consensus(plan.lock_time),
            input: plan
                .inputs
                .iter()
                .map(|input| TxIn {
                    previous_output: OutPoint {
                        txid: Txid::from_byte_array(input.outpoint.txid.0),
                        vout: input.outpoint.idx,
                    },
                    script_sig: ScriptBuf::new(),
                    sequence: Sequence(input.sequence),
                    witness: Witness::new(),
                })
                .collect(),
            output: plan
                .outputs
                .iter()
                .map(|output| TxOut {
                    value: Amount::from_sat(output.value),
                    script_pubkey: ScriptBuf::from_bytes(output.script_pubkey.items().to_vec()),
                })
                .collect(),
        }
    }

    /// The BIP143 preimage with `ALL|FORKID` committed, double-SHA256'd.
    fn forkid_signature_hash(
        tx: &Transaction,
        index: usize,
        script_code: &ScriptBuf,
        value: u64,
        flag: u32,
    ) -> BuildResult<[u8; 32]> {
        let input = tx.input.get(index).ok_or_else(|| {
            BuildError::SerializationInvariant(format!("no input at index {}", index))
        })?;

        let mut prevouts = vec![];
        let mut sequences = vec![];
        for txin in tx.input.iter() {
            prevouts.extend(serialize(&txin.previous_output));
            sequences.extend(serialize(&txin.sequence));
        }
        let outputs: Vec<u8> = tx.output.iter().flat_map(serialize).collect();

        let mut preimage = serialize(&tx.version);
        preimage.extend(sha256d::Hash::hash(&prevouts).to_byte_array());
        preimage.extend(sha256d::Hash::hash(&sequences).to_byte_array());
        preimage.extend(serialize(&input.previous_output));
        preimage.extend(serialize(script_code));
        preimage.extend(value.to_le_bytes());
        preimage.extend(serialize(&input.sequence));
        preimage.extend(sha256d::Hash::hash(&outputs).to_byte_array());
        preimage.extend(serialize(&tx.lock_time));
        preimage.extend(flag.to_le_bytes());
        Ok(sha256d::Hash::hash(&preimage).to_byte_array())
    }

    fn script_sig(pushes: &[Vec<u8>]) -> BuildResult<ScriptBuf> {
        let mut builder = Builder::new();
        for item in pushes {
            let data = PushBytesBuf::try_from(item.clone()).map_err(library_error)?;
            builder = builder.push_slice(data);
        }
        Ok(builder.into_script())
    }
}

impl TransactionEncoder for LibraryEncoder {
    fn sighashes(&self, plan: &SpendPlan) -> BuildResult<Vec<SighashDigest>> {
        let tx = Self::unsigned_tx(plan);
        let script_code = ScriptBuf::from_bytes(plan.script_code()?.into_inner());
        let algorithm = plan.digest_algorithm();
        let mut cache = SighashCache::new(&tx);

        let mut digests = Vec::with_capacity(plan.inputs.len());
        for (index, input) in plan.inputs.iter().enumerate() {
            let value = Amount::from_sat(input.value);
            let digest = match (algorithm, plan.source.script_type) {
                (DigestAlgorithm::ForkId, _) => Self::forkid_signature_hash(
                    &tx,
                    index,
                    &script_code,
                    input.value,
                    plan.sighash.to_u32(),
                )?,
                (DigestAlgorithm::Legacy, _) => cache
                    .legacy_signature_hash(index, &script_code, plan.sighash.to_u32())
                    .map_err(library_error)?
                    .to_byte_array(),
                (DigestAlgorithm::Bip143, ScriptType::WPKH) => {
                    let script_pubkey =
                        ScriptBuf::from_bytes(plan.source.script_pubkey.items().to_vec());
                    cache
                        .p2wpkh_signature_hash(index, &script_pubkey, value, EcdsaSighashType::All)
                        .map_err(library_error)?
                        .to_byte_array()
                }
                (DigestAlgorithm::Bip143, _) => cache
                    .p2wsh_signature_hash(index, &script_code, value, EcdsaSighashType::All)
                    .map_err(library_error)?
                    .to_byte_array(),
            };
            digests.push(SighashDigest::from(digest));
        }
        Ok(digests)
    }

    fn encode(&self, plan: &SpendPlan, stacks: &[InputStack]) -> BuildResult<Vec<u8>> {
        let mut tx = Self::unsigned_tx(plan);
        for (txin, stack) in tx.input.iter_mut().zip(stacks.iter()) {
            match stack {
                InputStack::ScriptSig(pushes) => txin.script_sig = Self::script_sig(pushes)?,
                InputStack::Witness(items) => txin.witness = Witness::from_slice(items.as_slice()),
            }
        }
        Ok(serialize(&tx))
    }
}
