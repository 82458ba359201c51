//! The contract with the external signer: what comes back for each emitted digest, and the
//! conversions needed before a signature can be placed in a script.

use k256::{ecdsa::Signature, elliptic_curve::sec1::ToEncodedPoint, PublicKey};
use serde::{Deserialize, Serialize};
use utxo_core::hashes::hash160;

use crate::{
    error::SignatureError,
    types::script::{LockingScript, ScriptType},
};

/// A signature over one emitted digest, and the key that produced it.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct SignatureInfo {
    /// 64-byte compact `r || s`
    pub signature: Vec<u8>,
    /// SEC1 public key, compressed or uncompressed
    pub public_key: Vec<u8>,
    /// The digest that was signed. Empty to match by position only.
    pub hash: Vec<u8>,
}

impl SignatureInfo {
    /// Instantiate a signature matched to its digest
    pub fn new(signature: Vec<u8>, public_key: Vec<u8>, hash: Vec<u8>) -> Self {
        Self {
            signature,
            public_key,
            hash,
        }
    }

    /// Instantiate a signature matched to its input by position only
    pub fn positional(signature: Vec<u8>, public_key: Vec<u8>) -> Self {
        Self::new(signature, public_key, vec![])
    }
}

/// Convert a compact `r || s` signature to strict DER, normalizing S to the low half of the
/// curve order.
pub fn der_signature(compact: &[u8]) -> Result<Vec<u8>, SignatureError> {
    let signature = Signature::from_slice(compact).map_err(|_| SignatureError::Malformed)?;
    let signature = signature.normalize_s().unwrap_or(signature);
    Ok(signature.to_der().as_bytes().to_vec())
}

/// Compress a SEC1 public key. Compressed keys are validated and returned unchanged.
pub fn compress_public_key(public_key: &[u8]) -> Result<Vec<u8>, SignatureError> {
    let key = PublicKey::from_sec1_bytes(public_key).map_err(|_| SignatureError::Malformed)?;
    Ok(key.to_encoded_point(true).as_bytes().to_vec())
}

/// Check that `public_key` can unlock the input at `index`, and return the key in the form the
/// script commits to.
///
/// Hash-committed keys are tried as given, then compressed. Multisig keys must appear in the
/// redeem script.
pub(crate) fn matching_public_key(
    locking: &LockingScript,
    public_key: &[u8],
    index: usize,
) -> Result<Vec<u8>, SignatureError> {
    let candidates = |key: &[u8]| -> Result<[Vec<u8>; 2], SignatureError> {
        Ok([key.to_vec(), compress_public_key(key)?])
    };

    match locking.script_type {
        ScriptType::PKH | ScriptType::WPKH => {
            let expected = locking
                .hash()
                .ok_or(SignatureError::PublicKeyMismatch { index })?;
            candidates(public_key)?
                .into_iter()
                .find(|key| hash160(key)[..] == *expected)
                .ok_or(SignatureError::PublicKeyMismatch { index })
        }
        ScriptType::SH | ScriptType::WSH => {
            let keys = locking
                .redeem_script()
                .and_then(|script| script.multisig())
                .map(|(_, keys)| keys)
                .ok_or(SignatureError::PublicKeyMismatch { index })?;
            candidates(public_key)?
                .into_iter()
                .find(|key| keys.contains(&key.as_slice()))
                .ok_or(SignatureError::PublicKeyMismatch { index })
        }
        _ => Err(SignatureError::PublicKeyMismatch { index }),
    }
}
