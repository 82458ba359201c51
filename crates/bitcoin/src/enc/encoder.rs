//! Converts between address strings and `LockingScript`s for a single network.
//!
//! ```
//! use utxo_bitcoins::{enc::encoder::LockingScriptBuilder, nets::BITCOIN, types::ScriptType};
//!
//! let builder = LockingScriptBuilder::new(&BITCOIN);
//! let (version, locking) = builder
//!     .decode("bc1qxzdqcmh6pknevm2ugtw94y50dwhsu3l0p5tg63")
//!     .unwrap();
//! assert_eq!(version, 0);
//! assert_eq!(locking.script_type, ScriptType::WPKH);
//! ```

use sha2::{Digest, Sha256};
use utxo_core::{
    enc::{
        decode_base58, decode_bech32, encode_base58, encode_bech32, AddressEncoder,
        EncodingError, EncodingResult,
    },
    hashes::hash160,
};

use crate::{
    builder::signing::compress_public_key,
    enc::cashaddr::{self, P2PKH_TYPE, P2SH_TYPE},
    nets::NetworkParams,
    types::script::{LockingScript, Script, ScriptPubkey, ScriptType, Spendable},
};

/// Builds and parses locking scripts for the addresses of one network.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LockingScriptBuilder {
    params: NetworkParams,
}

impl LockingScriptBuilder {
    /// Instantiate a builder for a network
    pub fn new(params: &NetworkParams) -> Self {
        Self { params: *params }
    }

    /// The network this builder encodes for
    pub fn params(&self) -> &NetworkParams {
        &self.params
    }

    /// Decode an address into its version and locking script.
    ///
    /// The version is the Base58Check version byte, the witness version, or the CashAddr
    /// version byte, depending on the address format.
    pub fn decode(&self, address: &str) -> EncodingResult<(u8, LockingScript)> {
        if let Some(prefix) = self.params.cashaddr_prefix() {
            if cashaddr::looks_like_cashaddr(address) {
                match self.decode_cashaddr(prefix, address) {
                    Ok(decoded) => return Ok(decoded),
                    // A prefix-less string may still be Base58Check
                    Err(e) if address.contains(':') => return Err(e),
                    Err(e) => return self.decode_base58(address).map_err(|_| e),
                }
            }
        }

        if let Some(hrp) = self.params.segwit_hrp() {
            let lowered = address.to_ascii_lowercase();
            if lowered.starts_with(hrp) && lowered[hrp.len()..].starts_with('1') {
                return self.decode_witness(hrp, address);
            }
        }

        self.decode_base58(address)
    }

    fn decode_cashaddr(&self, prefix: &str, address: &str) -> EncodingResult<(u8, LockingScript)> {
        let (version, hash) = cashaddr::decode_cashaddr(prefix, address)?;
        let script_pubkey = match version >> 3 {
            P2PKH_TYPE if hash.len() == 20 => ScriptPubkey::p2pkh(&hash),
            P2SH_TYPE if hash.len() == 20 => ScriptPubkey::p2sh(&hash),
            _ => return Err(EncodingError::UnknownScriptType),
        };
        Ok((version, script_pubkey.into()))
    }

    fn decode_witness(&self, hrp: &str, address: &str) -> EncodingResult<(u8, LockingScript)> {
        let (version, program) = decode_bech32(hrp, address)?;
        let script_pubkey = match (version, program.len()) {
            (0, 20) => ScriptPubkey::p2wpkh(&program),
            (0, 32) => ScriptPubkey::p2wsh(&program),
            (1, 32) => ScriptPubkey::p2tr(&program),
            _ => return Err(EncodingError::UnknownScriptType),
        };
        Ok((version, script_pubkey.into()))
    }

    fn decode_base58(&self, address: &str) -> EncodingResult<(u8, LockingScript)> {
        let (version, payload) = decode_base58(address)?;
        if payload.len() != 20 {
            return Err(EncodingError::InvalidSizeError);
        }
        let script_pubkey = if version == self.params.pkh_version {
            ScriptPubkey::p2pkh(&payload)
        } else if version == self.params.sh_version {
            ScriptPubkey::p2sh(&payload)
        } else {
            return Err(EncodingError::WrongVersion(version));
        };
        Ok((version, script_pubkey.into()))
    }

    /// Encode a hash of the given script type. Returns the address and its locking script.
    ///
    /// PKH and SH take 20-byte hashes, and render as CashAddr on CashAddr networks. WPKH takes
    /// a 20-byte hash, WSH and TR take 32 bytes, and all three need a bech32 HRP.
    pub fn encode(
        &self,
        hash: &[u8],
        script_type: ScriptType,
        spendable: Spendable,
    ) -> EncodingResult<(String, LockingScript)> {
        let expected_len = match script_type {
            ScriptType::PKH | ScriptType::SH | ScriptType::WPKH => 20,
            ScriptType::WSH | ScriptType::TR => 32,
            _ => return Err(EncodingError::UnknownScriptType),
        };
        if hash.len() != expected_len {
            return Err(EncodingError::InvalidSizeError);
        }

        let script_pubkey = match script_type {
            ScriptType::PKH => ScriptPubkey::p2pkh(hash),
            ScriptType::SH => ScriptPubkey::p2sh(hash),
            ScriptType::WPKH => ScriptPubkey::p2wpkh(hash),
            ScriptType::WSH => ScriptPubkey::p2wsh(hash),
            _ => ScriptPubkey::p2tr(hash),
        };
        let address = self.render(hash, script_type)?;
        Ok((address, LockingScript::new(script_pubkey, spendable)))
    }

    /// Encode a SEC1 public key. The key is hashed with HASH160. WPKH compresses an
    /// uncompressed key first.
    pub fn encode_public_key(
        &self,
        public_key: &[u8],
        script_type: ScriptType,
    ) -> EncodingResult<(String, LockingScript)> {
        let key = match script_type {
            ScriptType::PKH => public_key.to_vec(),
            ScriptType::WPKH => {
                compress_public_key(public_key).map_err(|_| EncodingError::InvalidSizeError)?
            }
            _ => return Err(EncodingError::UnknownScriptType),
        };
        self.encode(&hash160(&key), script_type, Spendable::PublicKey(key))
    }

    /// Encode a redeem script (SH, hashed with HASH160) or witness script (WSH, hashed with
    /// SHA256).
    pub fn encode_redeem_script(
        &self,
        script: &Script,
        script_type: ScriptType,
    ) -> EncodingResult<(String, LockingScript)> {
        let spendable = Spendable::RedeemScript(script.clone());
        match script_type {
            ScriptType::SH => self.encode(&hash160(script.as_ref()), script_type, spendable),
            ScriptType::WSH => {
                self.encode(&Sha256::digest(script.as_ref()), script_type, spendable)
            }
            _ => Err(EncodingError::UnknownScriptType),
        }
    }

    /// Render a PKH or SH script pubkey as a Base58Check address, even on CashAddr networks.
    pub fn legacy_address(&self, script_pubkey: &ScriptPubkey) -> EncodingResult<String> {
        match (script_pubkey.standard_type(), script_pubkey.payload()) {
            (ScriptType::PKH, Some(hash)) => Ok(encode_base58(self.params.pkh_version, hash)),
            (ScriptType::SH, Some(hash)) => Ok(encode_base58(self.params.sh_version, hash)),
            _ => Err(EncodingError::UnknownScriptType),
        }
    }

    fn render(&self, hash: &[u8], script_type: ScriptType) -> EncodingResult<String> {
        match script_type {
            ScriptType::PKH | ScriptType::SH => {
                let (type_code, version) = if script_type == ScriptType::PKH {
                    (P2PKH_TYPE, self.params.pkh_version)
                } else {
                    (P2SH_TYPE, self.params.sh_version)
                };
                match self.params.cashaddr_prefix() {
                    Some(prefix) => cashaddr::encode_cashaddr(
                        prefix,
                        cashaddr::version_byte(type_code, hash.len())?,
                        hash,
                    ),
                    None => Ok(encode_base58(version, hash)),
                }
            }
            ScriptType::WPKH | ScriptType::WSH | ScriptType::TR => {
                let hrp = self.params.segwit_hrp().ok_or(EncodingError::MissingHrp)?;
                let version = if script_type == ScriptType::TR { 1 } else { 0 };
                encode_bech32(hrp, version, hash)
            }
            _ => Err(EncodingError::UnknownScriptType),
        }
    }
}

impl AddressEncoder for LockingScriptBuilder {
    type Address = String;
    type Error = EncodingError;
    type RecipientIdentifier = ScriptPubkey;

    fn encode_address(&self, s: &ScriptPubkey) -> EncodingResult<String> {
        let hash = s.payload().ok_or(EncodingError::UnknownScriptType)?;
        self.render(hash, s.standard_type())
    }

    fn decode_address(&self, addr: &str) -> EncodingResult<ScriptPubkey> {
        self.decode(addr).map(|(_, locking)| locking.script_pubkey)
    }
}
