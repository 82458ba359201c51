//! Contains simplified access to `bech32` and `base58check` encoder/decoder for bitcoin-family
//! addresses. Also defines common encoder errors and the `AddressEncoder` trait.

use bech32::{
    decode as b32_decode, encode as b32_encode, u5, Error as BechError, FromBase32, ToBase32,
    Variant,
};
use thiserror::Error;

/// Errors that can be returned by an `AddressEncoder`.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// Returned when a script or address type is unknown. May be non-standard or newer than lib
    /// version.
    #[error("Non-standard LockingScript type")]
    UnknownScriptType,

    /// Bech32 HRP or CashAddr prefix does not match the current network.
    #[error("Prefix does not match. Got {got:?} expected {expected:?}. Hint: Is this address for another network?")]
    WrongHRP {
        /// The actual HRP.
        got: String,
        /// The expected HRP.
        expected: String,
    },

    /// Base58Check version byte matches neither the PKH nor the SH version of the network.
    #[error("Unknown base58 version byte {0:#04x}. Hint: Is this address for another network?")]
    WrongVersion(u8),

    /// Invalid Segwit Version
    #[error("SegwitVersionError: {0}")]
    SegwitVersionError(u8),

    /// Witness v0 must use bech32, later versions must use bech32m
    #[error("Witness version {0} encoded with the wrong bech32 checksum variant")]
    WrongVariant(u8),

    /// Bubbled up error from bech32 library
    #[error("BechError: {0}")]
    BechError(#[from] BechError),

    /// Bubbled up error from base58 library
    #[error("Base58Error: {0}")]
    Base58Error(#[from] bs58::decode::Error),

    /// Checksum failure in a non-bech32 checksummed encoding (e.g. CashAddr)
    #[error("Invalid checksum")]
    InvalidChecksum,

    /// Character outside the encoding's alphabet
    #[error("Invalid character {0:?}")]
    InvalidCharacter(char),

    /// Mixed upper and lower case
    #[error("Mixed-case address")]
    MixedCase,

    /// Incorrect address or payload size
    #[error("InvalidSizeError")]
    InvalidSizeError,

    /// A witness address was requested on a network without a bech32 prefix
    #[error("Network has no witness address prefix")]
    MissingHrp,
}

/// A simple result type alias
pub type EncodingResult<T> = Result<T, EncodingError>;

/// An `AddressEncoder` converts between addresses and the identifiers that appear in transaction
/// outputs. Implementations hold the network parameters they encode for.
pub trait AddressEncoder {
    /// A type representing the encoded address
    type Address;

    /// An error type that will be returned in case of encoding errors
    type Error;

    /// A type representing the in-protocol recipient. This is usually different from the
    /// Address type.
    type RecipientIdentifier;

    /// Encode a script as an address.
    fn encode_address(&self, s: &Self::RecipientIdentifier) -> Result<Self::Address, Self::Error>;

    /// Decode a script from an address string.
    fn decode_address(&self, addr: &str) -> Result<Self::RecipientIdentifier, Self::Error>;
}

/// Encode a payload with a version byte to Base58Check.
pub fn encode_base58(version: u8, payload: &[u8]) -> String {
    bs58::encode(payload).with_check_version(version).into_string()
}

/// Decode a Base58Check string, verifying its checksum. Returns the version byte and payload.
pub fn decode_base58(s: &str) -> EncodingResult<(u8, Vec<u8>)> {
    let data = bs58::decode(s).with_check(None).into_vec()?;
    match data.split_first() {
        Some((version, payload)) => Ok((*version, payload.to_vec())),
        None => Err(EncodingError::InvalidSizeError),
    }
}

/// Check the BIP141 length rules for a witness program of a given version.
fn check_witness_program(version: u8, program: &[u8]) -> EncodingResult<()> {
    if version > 16 {
        return Err(EncodingError::SegwitVersionError(version));
    }
    if program.len() < 2 || program.len() > 40 {
        return Err(EncodingError::InvalidSizeError);
    }
    if version == 0 && program.len() != 20 && program.len() != 32 {
        return Err(EncodingError::InvalidSizeError);
    }
    Ok(())
}

/// Encode a witness program to bech32 (v0) or bech32m (v1+).
pub fn encode_bech32(hrp: &str, version: u8, program: &[u8]) -> EncodingResult<String> {
    check_witness_program(version, program)?;
    let variant = if version == 0 {
        Variant::Bech32
    } else {
        Variant::Bech32m
    };
    let mut v = vec![u5::try_from_u8(version)?];
    v.extend(program.to_base32());
    Ok(b32_encode(hrp, v, variant)?)
}

/// Decode a witness program from a bech32 string. Caller specifies an expected HRP. If a
/// different HRP is found, returns `WrongHRP`. Returns the witness version and program.
pub fn decode_bech32(expected_hrp: &str, s: &str) -> EncodingResult<(u8, Vec<u8>)> {
    let (hrp, data, variant) = b32_decode(s)?;
    if hrp != expected_hrp {
        return Err(EncodingError::WrongHRP {
            got: hrp,
            expected: expected_hrp.to_owned(),
        });
    }

    let (v, p) = match data.split_first() {
        Some(split) => split,
        None => return Err(BechError::InvalidLength.into()),
    };
    let version = v.to_u8();
    let expected_variant = if version == 0 {
        Variant::Bech32
    } else {
        Variant::Bech32m
    };
    if variant != expected_variant {
        return Err(EncodingError::WrongVariant(version));
    }

    let program = Vec::<u8>::from_base32(p)?;
    check_witness_program(version, &program)?;
    Ok((version, program))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_should_encode_and_decode_bech32() {
        let hrp = "bc";
        let addrs = [
            "bc1q233q49ve8ysdsztqh9ue57m6227627j8ztscl9",
            "bc1qaqm8wh8sr6gfx49mdpz3w70z48xdh0pzlf5kgr",
            "bc1qjl8uwezzlech723lpnyuza0h2cdkvxvh54v3dn",
            "bc1qvyyvsdcd0t9863stt7u9rf37wx443lzasg0usy",
            "bc1qza7dfgl2q83cf68fqkkdd754qx546h4u9vd9tg",
            "bc1qwqdg6squsna38e46795at95yu9atm8azzmyvckulcc7kytlcckxswvvzej",
            "bc1qc2zwqqucrqvvtyxfn78ajm8w2sgyjf5edc40am",
        ];
        for addr in addrs.iter() {
            let (version, program) = decode_bech32(hrp, addr).unwrap();
            assert_eq!(version, 0);
            let reencoded = encode_bech32(hrp, version, &program).unwrap();
            assert_eq!(*addr, reencoded);
        }
    }

    #[test]
    fn it_encodes_bech32m_for_taproot() {
        let addr = "bc1p0xlxvlhemja6c4dqv22uapctqupfhlxm9h8z3k2e72q4k9hcz7vqzk5jj0";
        let (version, program) = decode_bech32("bc", addr).unwrap();
        assert_eq!(version, 1);
        assert_eq!(program.len(), 32);
        assert_eq!(encode_bech32("bc", version, &program).unwrap(), addr);
    }

    #[test]
    fn it_rejects_wrong_hrp() {
        match decode_bech32("tb", "bc1qc2zwqqucrqvvtyxfn78ajm8w2sgyjf5edc40am") {
            Err(EncodingError::WrongHRP { got, expected }) => {
                assert_eq!(got, "bc");
                assert_eq!(expected, "tb");
            }
            other => panic!("expected WrongHRP, got {:?}", other),
        }
    }

    #[test]
    fn it_rejects_corrupted_bech32() {
        let res = decode_bech32("bc", "bc1qc2zwqqucrqvvtyxfn78ajm8w2sgyjf5edc40an");
        assert!(matches!(res, Err(EncodingError::BechError(_))));
    }

    #[test]
    fn it_roundtrips_base58check() {
        let payload = hex::decode("c284e003981818c590c99f8fd96cee5410492699").unwrap();
        let cases = [
            (0x00, "1JjXGY5KEcbT35uAo6P9A7DebBn4DXnjdQ"),
            (0x6f, "myFUZbAJ3e2hpCNnWfMWz2RyTBNm7vdnSQ"),
            (0x30, "LcxUXkP9KGqWHtbKyENSS8HQoQ9LK8DQLX"),
            (0x1e, "DNscoo1xY2Vja65mXgNhhsPFUKWMa7NLEb"),
            (0x4c, "XtRN6njDCKp3C2VkeyhN1duSRXMkHPGLgH"),
            (0x3c, "RT1iM3xbqSQ276GNGGNGFdYrMTEeq4hXRH"),
        ];
        for (version, addr) in cases.iter() {
            assert_eq!(encode_base58(*version, &payload), *addr);
            let (v, p) = decode_base58(addr).unwrap();
            assert_eq!(v, *version);
            assert_eq!(p, payload);
        }
    }

    #[test]
    fn it_rejects_corrupted_base58_checksums() {
        let res = decode_base58("1JjXGY5KEcbT35uAo6P9A7DebBn4DXnjdR");
        assert!(matches!(res, Err(EncodingError::Base58Error(_))));
    }
}
