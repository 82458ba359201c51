//! Two-phase transaction construction.
//!
//! `build_for_sign` selects coins and emits one digest per input. The caller has them signed
//! externally, then passes the signatures to `build_for_send`, which assembles the unlocking
//! data and returns the serialized transaction. The plan built in the first phase is carried
//! to the second. It is never re-derived from the store.

pub mod library;
pub mod native;
pub mod plan;
pub mod signing;

pub use library::LibraryEncoder;
pub use native::NativeEncoder;
pub use plan::{DigestAlgorithm, InputStack, PlannedInput, SpendPlan};
pub use signing::SignatureInfo;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::{
    config::{BuilderConfig, Ordering, SequencePolicy},
    enc::encoder::LockingScriptBuilder,
    error::{BuildError, BuildResult, SignatureError},
    hashes::SighashDigest,
    nets::NetworkParams,
    select::{CoinSelector, FeePolicy, InputCost, SizeEstimate},
    store::UnspentOutputStore,
    types::{
        script::{LockingScript, ScriptType},
        tx::BitcoinTx,
        txin::Outpoint,
        txout::TxOut,
    },
};

/// Produces digests and serializations for a `SpendPlan`.
///
/// Implementations must agree byte for byte.
pub trait TransactionEncoder {
    /// One digest per input, in input order
    fn sighashes(&self, plan: &SpendPlan) -> BuildResult<Vec<SighashDigest>>;

    /// Serialize the plan with one unlocking stack per input
    fn encode(&self, plan: &SpendPlan, stacks: &[InputStack]) -> BuildResult<Vec<u8>>;
}

/// Selects the `TransactionEncoder` a builder uses.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BuilderVariant {
    /// `NativeEncoder`
    Native,
    /// `LibraryEncoder`
    Library,
}

impl Default for BuilderVariant {
    fn default() -> Self {
        BuilderVariant::Native
    }
}

impl TransactionEncoder for BuilderVariant {
    fn sighashes(&self, plan: &SpendPlan) -> BuildResult<Vec<SighashDigest>> {
        match self {
            BuilderVariant::Native => NativeEncoder.sighashes(plan),
            BuilderVariant::Library => LibraryEncoder.sighashes(plan),
        }
    }

    fn encode(&self, plan: &SpendPlan, stacks: &[InputStack]) -> BuildResult<Vec<u8>> {
        match self {
            BuilderVariant::Native => NativeEncoder.encode(plan, stacks),
            BuilderVariant::Library => LibraryEncoder.encode(plan, stacks),
        }
    }
}

/// Where a builder is in the two-phase protocol.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BuildState {
    /// Nothing planned
    Empty,
    /// Coins selected, digests not yet computed
    Selected,
    /// Digests handed out, awaiting signatures
    HashesEmitted,
    /// Signatures accepted
    Signed,
    /// The transaction was serialized
    Serialized,
}

/// A payment from one address.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct SendRequest {
    /// The address whose outputs are spent
    pub source: String,
    /// The address paid
    pub destination: String,
    /// The amount paid
    pub amount: u64,
    /// How the fee is determined
    pub fee: FeePolicy,
    /// Overrides the configured change address
    #[serde(default)]
    pub change: Option<String>,
    /// Overrides the configured sequence policy
    #[serde(default)]
    pub sequence: Option<SequencePolicy>,
    /// Overrides the configured ordering
    #[serde(default)]
    pub ordering: Option<Ordering>,
}

impl SendRequest {
    /// Instantiate a request using the builder's configured defaults.
    pub fn new(source: &str, destination: &str, amount: u64, fee: FeePolicy) -> Self {
        Self {
            source: source.to_owned(),
            destination: destination.to_owned(),
            amount,
            fee,
            change: None,
            sequence: None,
            ordering: None,
        }
    }

    /// Send change to `address`
    pub fn with_change(mut self, address: &str) -> Self {
        self.change = Some(address.to_owned());
        self
    }

    /// Use `sequence` for every input
    pub fn with_sequence(mut self, sequence: SequencePolicy) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Use `ordering` for inputs and outputs
    pub fn with_ordering(mut self, ordering: Ordering) -> Self {
        self.ordering = Some(ordering);
        self
    }
}

#[derive(Clone, Debug)]
struct Prepared {
    request: SendRequest,
    plan: SpendPlan,
    hashes: Vec<SighashDigest>,
}

/// Builds transactions spending outputs from an `UnspentOutputStore`.
///
/// One builder runs one spend at a time. Calling `build_for_sign` again discards the previous
/// plan.
#[derive(Debug)]
pub struct TransactionBuilder<'a> {
    params: NetworkParams,
    scripts: LockingScriptBuilder,
    store: &'a UnspentOutputStore,
    config: BuilderConfig,
    wallet_scripts: Vec<LockingScript>,
    state: BuildState,
    prepared: Option<Prepared>,
}

impl<'a> TransactionBuilder<'a> {
    /// Instantiate a builder for a network.
    pub fn new(params: &NetworkParams, store: &'a UnspentOutputStore, config: BuilderConfig) -> Self {
        Self {
            params: *params,
            scripts: LockingScriptBuilder::new(params),
            store,
            config,
            wallet_scripts: vec![],
            state: BuildState::Empty,
            prepared: None,
        }
    }

    /// Register a locking script with its redeem script, so its address can be spent from.
    pub fn with_wallet_script(mut self, script: LockingScript) -> Self {
        self.wallet_scripts.push(script);
        self
    }

    /// The current protocol state
    pub fn state(&self) -> BuildState {
        self.state
    }

    /// The builder's configuration
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// The current plan, once digests have been emitted
    pub fn plan(&self) -> Option<&SpendPlan> {
        self.prepared.as_ref().map(|p| &p.plan)
    }

    /// The outpoints the current plan spends. Remove these from the store after broadcast.
    pub fn spent_outpoints(&self) -> Vec<Outpoint> {
        self.plan().map(SpendPlan::spent_outpoints).unwrap_or_default()
    }

    fn transition(&mut self, to: BuildState) {
        trace!(from = ?self.state, to = ?to, "builder state transition");
        self.state = to;
    }

    fn decode(&self, address: &str) -> BuildResult<LockingScript> {
        self.scripts
            .decode(address)
            .map(|(_, locking)| locking)
            .map_err(|e| BuildError::invalid_address(address, e))
    }

    /// Decode the source address and attach what is needed to spend from it.
    fn resolve_source(&self, address: &str) -> BuildResult<LockingScript> {
        let decoded = self.decode(address)?;
        match decoded.script_type {
            ScriptType::PKH | ScriptType::WPKH => Ok(decoded),
            ScriptType::SH | ScriptType::WSH => self
                .wallet_scripts
                .iter()
                .find(|known| {
                    known.script_pubkey == decoded.script_pubkey
                        && known
                            .redeem_script()
                            .and_then(|script| script.multisig())
                            .map_or(false, |(m, _)| m == 1)
                })
                .cloned()
                .ok_or_else(|| BuildError::MissingRedeemScript {
                    address: address.to_owned(),
                }),
            script_type => Err(BuildError::UnsupportedScriptType {
                address: address.to_owned(),
                script_type,
            }),
        }
    }

    fn input_cost(source: &LockingScript) -> BuildResult<InputCost> {
        let redeem_len = || source.redeem_script().map(|s| s.len()).unwrap_or_default();
        match source.script_type {
            ScriptType::PKH => Ok(InputCost::p2pkh()),
            ScriptType::SH => Ok(InputCost::p2sh_multisig(redeem_len())),
            ScriptType::WPKH => Ok(InputCost::p2wpkh()),
            ScriptType::WSH => Ok(InputCost::p2wsh_multisig(redeem_len())),
            script_type => Err(BuildError::SerializationInvariant(format!(
                "no input cost for {:?}",
                script_type
            ))),
        }
    }

    /// Select coins for the request, plan the transaction, and return the digest each input's
    /// signature must commit to.
    pub fn build_for_sign(&mut self, request: &SendRequest) -> BuildResult<Vec<SighashDigest>> {
        self.prepared = None;
        self.transition(BuildState::Empty);

        let policy = request.sequence.unwrap_or(self.config.sequence);
        let sequence = policy.sequence().ok_or(BuildError::InvalidSequence(policy))?;
        let source = self.resolve_source(&request.source)?;
        let destination = self.decode(&request.destination)?;
        let change = match request.change.as_ref().or(self.config.change_address.as_ref()) {
            Some(address) => self.decode(address)?,
            None => source.clone(),
        };

        let candidates: Vec<_> = self
            .store
            .outputs(&request.source)
            .into_iter()
            .filter(|utxo| match &utxo.script {
                Some(script) if *script != source.script_pubkey => {
                    warn!(
                        address = %request.source,
                        outpoint = %utxo.outpoint.txid_be_hex(),
                        idx = utxo.outpoint.idx,
                        "skipping output locked by a different script"
                    );
                    false
                }
                _ => true,
            })
            .collect();

        let estimate = SizeEstimate::new(
            Self::input_cost(&source)?,
            destination.script_pubkey.len(),
            change.script_pubkey.len(),
        );
        let selection = CoinSelector::new(self.config.dust_threshold).select(
            &candidates,
            request.amount,
            request.fee,
            &estimate,
        )?;
        self.transition(BuildState::Selected);

        let mut outputs = vec![TxOut::new(request.amount, destination.script_pubkey)];
        if let Some(value) = selection.change {
            outputs.push(TxOut::new(value, change.script_pubkey));
        }
        let mut plan = SpendPlan {
            version: self.config.version.unwrap_or(self.params.default_tx_version),
            lock_time: self.config.lock_time,
            sighash: self.params.sighash,
            source,
            inputs: selection
                .inputs
                .iter()
                .map(|utxo| PlannedInput {
                    outpoint: utxo.outpoint,
                    value: utxo.amount,
                    sequence,
                })
                .collect(),
            outputs,
            fee: selection.fee,
        };
        if request.ordering.unwrap_or(self.config.ordering) == Ordering::Bip69 {
            plan.sort_bip69();
        }
        plan.check_invariants()?;

        let hashes = self.config.variant.sighashes(&plan)?;
        debug!(
            network = self.params.name,
            inputs = plan.inputs.len(),
            outputs = plan.outputs.len(),
            fee = plan.fee,
            "emitted sighashes"
        );

        self.prepared = Some(Prepared {
            request: request.clone(),
            plan,
            hashes: hashes.clone(),
        });
        self.transition(BuildState::HashesEmitted);
        Ok(hashes)
    }

    /// Attach one signature per emitted digest and serialize the transaction.
    ///
    /// `request` must equal the request passed to the preceding `build_for_sign`.
    pub fn build_for_send(
        &mut self,
        request: &SendRequest,
        signatures: &[SignatureInfo],
    ) -> BuildResult<Vec<u8>> {
        let prepared = match &self.prepared {
            Some(prepared) if prepared.request == *request => prepared,
            _ => return Err(BuildError::NotPrepared),
        };
        let plan = &prepared.plan;

        if signatures.len() != prepared.hashes.len() {
            return Err(SignatureError::Count {
                expected: prepared.hashes.len(),
                got: signatures.len(),
            }
            .into());
        }

        let mut stacks = Vec::with_capacity(signatures.len());
        for (index, (info, hash)) in signatures.iter().zip(prepared.hashes.iter()).enumerate() {
            if !info.hash.is_empty() && info.hash.as_slice() != hash.as_ref() {
                return Err(SignatureError::HashMismatch { index }.into());
            }
            let public_key = signing::matching_public_key(&plan.source, &info.public_key, index)?;
            let mut signature = signing::der_signature(&info.signature)?;
            signature.push(plan.sighash.to_u8());
            stacks.push(plan.input_stack(signature, public_key)?);
        }

        let bytes = self.config.variant.encode(plan, &stacks)?;
        self.transition(BuildState::Signed);

        let txid = BitcoinTx::from_bytes(&bytes)?.txid()?;
        debug!(txid = %txid.to_be_hex(), size = bytes.len(), "serialized transaction");
        self.transition(BuildState::Serialized);
        Ok(bytes)
    }
}
