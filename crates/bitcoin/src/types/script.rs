//! Script, ScriptSig, ScriptPubkey and Witness types, plus the `LockingScript` an address
//! decodes to.
//!
//! Scripts are treated as opaque byte vectors. The only interpretation performed here is
//! recognizing standard output templates and 1-of-n `CHECKMULTISIG` redeem scripts.
//!
//! Scripts can be freely converted between eachother using `From` and `Into`. This merely
//! rewraps the underlying `Vec<u8>` in the new type.

wrap_prefixed_byte_vector!(
    /// A Script is a marked Vec<u8> used as the script code in sighash arguments, and as a
    /// redeem or witness script.
    ///
    /// `Script::null()` and `Script::default()` return the empty byte vector with a 0
    /// prefix, which represents numerical 0, boolean `false`, or null bytestring.
    Script
);
wrap_prefixed_byte_vector!(
    /// A ScriptSig is a marked Vec<u8> for use in the script_sig.
    ///
    /// `ScriptSig::null()` and `ScriptSig::default()` return the empty byte vector with a 0
    /// prefix, which represents numerical 0, boolean `false`, or null bytestring.
    ScriptSig
);
wrap_prefixed_byte_vector!(
    /// A WitnessStackItem is a marked `Vec<u8>` intended for use in witnesses. Each
    /// Witness is a prefixed vector of `WitnessStackItem`. The Transactions `witnesses` is a
    /// non-prefixed `Vec<Witness>.`
    ///
    /// `WitnessStackItem::null()` and `WitnessStackItem::default()` return the empty byte vector
    /// with a 0 prefix, which represents numerical 0, or null bytestring.
    WitnessStackItem
);
wrap_prefixed_byte_vector!(
    /// A ScriptPubkey is a marked Vec<u8> locking a TxOut.
    ///
    /// `ScriptPubkey::null()` and `ScriptPubkey::default()` return the empty byte vector with a 0
    /// prefix, which represents numerical 0, boolean `false`, or null bytestring.
    ScriptPubkey
);

impl_script_conversion!(Script, ScriptPubkey);
impl_script_conversion!(Script, ScriptSig);
impl_script_conversion!(Script, WitnessStackItem);
impl_script_conversion!(ScriptPubkey, ScriptSig);
impl_script_conversion!(ScriptPubkey, WitnessStackItem);
impl_script_conversion!(ScriptSig, WitnessStackItem);

/// A Witness is a prefixed vector of `WitnessStackItem`s. This witness corresponds to a single
/// input.
///
/// # Note
///
/// The transaction's witness is composed of many of these `Witness`es in an UNPREFIXED vector.
pub type Witness = Vec<WitnessStackItem>;

/// A TxWitness is the UNPREFIXED vector of witnesses
pub type TxWitness = Vec<Witness>;

const OP_0: u8 = 0x00;
const OP_PUSHDATA1: u8 = 0x4c;
const OP_PUSHDATA2: u8 = 0x4d;
const OP_1: u8 = 0x51;
const OP_16: u8 = 0x60;
const OP_RETURN: u8 = 0x6a;
const OP_DUP: u8 = 0x76;
const OP_EQUAL: u8 = 0x87;
const OP_EQUALVERIFY: u8 = 0x88;
const OP_HASH160: u8 = 0xa9;
const OP_CHECKSIG: u8 = 0xac;
const OP_CHECKMULTISIG: u8 = 0xae;

/// Append a minimal data push of `data` to `script`. The empty push is `OP_0`.
pub fn push_data(script: &mut Vec<u8>, data: &[u8]) {
    match data.len() {
        0 => script.push(OP_0),
        len if len < OP_PUSHDATA1 as usize => script.push(len as u8),
        len if len <= 0xff => script.extend([OP_PUSHDATA1, len as u8]),
        len => {
            script.push(OP_PUSHDATA2);
            script.extend((len as u16).to_le_bytes());
        }
    }
    script.extend_from_slice(data);
}

/// Standard script types, and a non-standard type for all other scripts.
#[derive(serde::Serialize, serde::Deserialize, Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ScriptType {
    /// Pay to Pubkeyhash.
    PKH,
    /// Pay to Scripthash.
    SH,
    /// Pay to Witness Pubkeyhash.
    WPKH,
    /// Pay to Witness Scripthash.
    WSH,
    /// Pay to Taproot. Supported as a payment destination only.
    TR,
    /// OP_RETURN
    #[allow(non_camel_case_types)]
    OP_RETURN,
    /// Nonstandard or unknown `Script` type. May be a newer witness version.
    NonStandard,
}

impl ScriptType {
    /// True for native witness program types.
    pub fn is_witness(&self) -> bool {
        matches!(self, ScriptType::WPKH | ScriptType::WSH | ScriptType::TR)
    }
}

impl ScriptPubkey {
    /// Instantiate a P2PKH script pubkey committing to a 20-byte key hash.
    pub fn p2pkh(hash: &[u8]) -> Self {
        let mut v = vec![OP_DUP, OP_HASH160];
        push_data(&mut v, hash);
        v.extend([OP_EQUALVERIFY, OP_CHECKSIG]);
        v.into()
    }

    /// Instantiate a P2SH script pubkey committing to a 20-byte script hash.
    pub fn p2sh(hash: &[u8]) -> Self {
        let mut v = vec![OP_HASH160];
        push_data(&mut v, hash);
        v.push(OP_EQUAL);
        v.into()
    }

    /// Instantiate a witness program output of version `version`.
    pub fn witness_program(version: u8, program: &[u8]) -> Self {
        let mut v = vec![if version == 0 { OP_0 } else { OP_1 + version - 1 }];
        push_data(&mut v, program);
        v.into()
    }

    /// Instantiate a P2WPKH script pubkey committing to a 20-byte key hash.
    pub fn p2wpkh(hash: &[u8]) -> Self {
        Self::witness_program(0, hash)
    }

    /// Instantiate a P2WSH script pubkey committing to a 32-byte script hash.
    pub fn p2wsh(hash: &[u8]) -> Self {
        Self::witness_program(0, hash)
    }

    /// Instantiate a P2TR script pubkey committing to a 32-byte output key.
    pub fn p2tr(key: &[u8]) -> Self {
        Self::witness_program(1, key)
    }

    /// Extract the op return payload. None if not an op return. Does not extract OP_RETURN blobs
    /// larger than 75 bytes.
    pub fn extract_op_return_data(&self) -> Option<Vec<u8>> {
        if self.len() < 2 {
            return None;
        }

        if self[0] == OP_RETURN && self[1] <= 75 && self[1] as usize == (self.len() - 2) {
            return Some(self.0[2..].to_vec());
        }
        None
    }

    /// Inspect the `Script` to determine its type.
    pub fn standard_type(&self) -> ScriptType {
        if self.extract_op_return_data().is_some() {
            return ScriptType::OP_RETURN;
        }

        let items = &self.0;
        match items.len() {
            0x19 if items[0..3] == [OP_DUP, OP_HASH160, 0x14]
                && items[0x17..] == [OP_EQUALVERIFY, OP_CHECKSIG] =>
            {
                ScriptType::PKH
            }
            0x17 if items[0..2] == [OP_HASH160, 0x14] && items[0x16] == OP_EQUAL => ScriptType::SH,
            0x16 if items[0..2] == [OP_0, 0x14] => ScriptType::WPKH,
            0x22 if items[0..2] == [OP_0, 0x20] => ScriptType::WSH,
            0x22 if items[0..2] == [OP_1, 0x20] => ScriptType::TR,
            _ => ScriptType::NonStandard,
        }
    }

    /// The hash or witness program a standard script commits to. None for OP_RETURN and
    /// non-standard scripts.
    pub fn payload(&self) -> Option<&[u8]> {
        match self.standard_type() {
            ScriptType::PKH => Some(&self.0[3..23]),
            ScriptType::SH => Some(&self.0[2..22]),
            ScriptType::WPKH | ScriptType::WSH | ScriptType::TR => Some(&self.0[2..]),
            _ => None,
        }
    }
}

impl Script {
    /// Parse a bare `OP_m <key>... OP_n OP_CHECKMULTISIG` script. Returns the threshold and
    /// the keys, or None if the script does not match that template.
    pub fn multisig(&self) -> Option<(u8, Vec<&[u8]>)> {
        let items = &self.0;
        let (first, rest) = items.split_first()?;
        let (last, rest) = rest.split_last()?;
        let (n_op, mut keys_section) = rest.split_last()?;
        if *last != OP_CHECKMULTISIG
            || !(OP_1..=OP_16).contains(first)
            || !(OP_1..=OP_16).contains(n_op)
        {
            return None;
        }

        let mut keys = vec![];
        while let Some((len, tail)) = keys_section.split_first() {
            let len = *len as usize;
            if (len != 33 && len != 65) || tail.len() < len {
                return None;
            }
            keys.push(&tail[..len]);
            keys_section = &tail[len..];
        }

        let m = first - OP_1 + 1;
        let n = n_op - OP_1 + 1;
        if keys.len() != n as usize || m > n {
            return None;
        }
        Some((m, keys))
    }
}

/// What, beyond a signature, is needed to spend a locking script.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Spendable {
    /// Nothing is known. The case for every decoded address.
    None,
    /// The SEC1 public key whose hash the script commits to
    PublicKey(Vec<u8>),
    /// The redeem script (P2SH) or witness script (P2WSH) the script commits to
    RedeemScript(Script),
}

impl Default for Spendable {
    fn default() -> Self {
        Spendable::None
    }
}

/// A script pubkey, its recognized type, and the spending material known for it.
///
/// `script_type` always equals `script_pubkey.standard_type()`.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Eq, PartialEq, Hash)]
pub struct LockingScript {
    /// The output script
    pub script_pubkey: ScriptPubkey,
    /// The standard type of `script_pubkey`
    pub script_type: ScriptType,
    /// Known spending material
    pub spendable: Spendable,
}

impl LockingScript {
    /// Wrap a script pubkey, recording its standard type.
    pub fn new(script_pubkey: ScriptPubkey, spendable: Spendable) -> Self {
        Self {
            script_type: script_pubkey.standard_type(),
            script_pubkey,
            spendable,
        }
    }

    /// The hash or witness program the script commits to.
    pub fn hash(&self) -> Option<&[u8]> {
        self.script_pubkey.payload()
    }

    /// The redeem or witness script, if known.
    pub fn redeem_script(&self) -> Option<&Script> {
        match &self.spendable {
            Spendable::RedeemScript(script) => Some(script),
            _ => None,
        }
    }
}

impl From<ScriptPubkey> for LockingScript {
    fn from(script_pubkey: ScriptPubkey) -> Self {
        Self::new(script_pubkey, Spendable::None)
    }
}
