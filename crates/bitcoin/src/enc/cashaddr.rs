//! CashAddr encoding for Bitcoin Cash addresses.
//!
//! A CashAddr is `prefix:payload`. The payload is base32 over a version byte followed by the
//! hash, then an 8-character BCH checksum computed over the prefix and payload. The prefix may
//! be omitted when the network is known.
//!
//! The version byte packs the address type in bits 3..=6 and the hash size code in bits 0..=2.

use bech32::{u5, FromBase32, ToBase32};
use utxo_core::enc::{EncodingError, EncodingResult};

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

const GENERATORS: [u64; 5] = [
    0x98_f2bc_8e61,
    0x79_b76d_99e2,
    0xf3_3e5f_b3c4,
    0xae_2eab_e2a8,
    0x1e_4f43_e470,
];

const CHECKSUM_LEN: usize = 8;

/// CashAddr type code for pay-to-pubkey-hash
pub const P2PKH_TYPE: u8 = 0;

/// CashAddr type code for pay-to-script-hash
pub const P2SH_TYPE: u8 = 1;

/// Hash sizes in bytes, indexed by size code.
const HASH_SIZES: [usize; 8] = [20, 24, 28, 32, 40, 48, 56, 64];

fn polymod(values: impl Iterator<Item = u8>) -> u64 {
    let mut c: u64 = 1;
    for d in values {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x07_ffff_ffff) << 5) ^ u64::from(d);
        for (i, g) in GENERATORS.iter().enumerate() {
            if c0 & (1 << i) != 0 {
                c ^= g;
            }
        }
    }
    c ^ 1
}

fn prefix_values(prefix: &str) -> impl Iterator<Item = u8> + '_ {
    prefix.bytes().map(|b| b & 0x1f).chain(std::iter::once(0))
}

/// Build the version byte for a type code and hash length.
pub fn version_byte(type_code: u8, hash_len: usize) -> EncodingResult<u8> {
    let size_code = HASH_SIZES
        .iter()
        .position(|size| *size == hash_len)
        .ok_or(EncodingError::InvalidSizeError)?;
    if type_code > 0x0f {
        return Err(EncodingError::UnknownScriptType);
    }
    Ok(type_code << 3 | size_code as u8)
}

/// Encode a hash as a prefixed CashAddr. `version` is the full version byte.
pub fn encode_cashaddr(prefix: &str, version: u8, hash: &[u8]) -> EncodingResult<String> {
    let mut data = Vec::with_capacity(hash.len() + 1);
    data.push(version);
    data.extend_from_slice(hash);
    let payload: Vec<u8> = data.to_base32().iter().map(|v| v.to_u8()).collect();

    let checksum = polymod(
        prefix_values(prefix)
            .chain(payload.iter().copied())
            .chain(std::iter::repeat(0).take(CHECKSUM_LEN)),
    );

    let mut s = String::with_capacity(prefix.len() + 1 + payload.len() + CHECKSUM_LEN);
    s.push_str(prefix);
    s.push(':');
    for v in payload.iter() {
        s.push(CHARSET[*v as usize] as char);
    }
    for i in 0..CHECKSUM_LEN {
        let v = (checksum >> (5 * (CHECKSUM_LEN - 1 - i))) & 0x1f;
        s.push(CHARSET[v as usize] as char);
    }
    Ok(s)
}

/// True if `addr` may be a CashAddr for `prefix`: either it carries a prefix, or every
/// character is in the CashAddr alphabet.
pub fn looks_like_cashaddr(addr: &str) -> bool {
    addr.contains(':')
        || addr
            .bytes()
            .all(|b| CHARSET.contains(&b.to_ascii_lowercase()))
}

/// Decode a CashAddr, with or without its prefix. Returns the version byte and hash.
pub fn decode_cashaddr(expected_prefix: &str, addr: &str) -> EncodingResult<(u8, Vec<u8>)> {
    let has_lower = addr.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = addr.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(EncodingError::MixedCase);
    }
    let addr = addr.to_ascii_lowercase();

    let payload_str = match addr.rsplit_once(':') {
        Some((prefix, payload)) => {
            if prefix != expected_prefix {
                return Err(EncodingError::WrongHRP {
                    got: prefix.to_owned(),
                    expected: expected_prefix.to_owned(),
                });
            }
            payload
        }
        None => addr.as_str(),
    };

    let values = payload_str
        .chars()
        .map(|c| {
            CHARSET
                .iter()
                .position(|v| *v as char == c)
                .map(|p| p as u8)
                .ok_or(EncodingError::InvalidCharacter(c))
        })
        .collect::<EncodingResult<Vec<u8>>>()?;

    if values.len() <= CHECKSUM_LEN {
        return Err(EncodingError::InvalidSizeError);
    }
    if polymod(prefix_values(expected_prefix).chain(values.iter().copied())) != 0 {
        return Err(EncodingError::InvalidChecksum);
    }

    let data = values[..values.len() - CHECKSUM_LEN]
        .iter()
        .map(|v| u5::try_from_u8(*v))
        .collect::<Result<Vec<u5>, _>>()?;
    let bytes = Vec::<u8>::from_base32(&data)?;

    let (version, hash) = bytes
        .split_first()
        .ok_or(EncodingError::InvalidSizeError)?;
    if version & 0x80 != 0 {
        return Err(EncodingError::WrongVersion(*version));
    }
    if HASH_SIZES[(version & 0x07) as usize] != hash.len() {
        return Err(EncodingError::InvalidSizeError);
    }
    Ok((*version, hash.to_vec()))
}

#[cfg(test)]
mod test {
    use super::*;

    static KEY_HASH: &str = "c284e003981818c590c99f8fd96cee5410492699";

    #[test]
    fn it_encodes_cashaddrs() {
        let cases = [
            (
                "bitcoincash",
                P2PKH_TYPE,
                KEY_HASH,
                "bitcoincash:qrpgfcqrnqvp33vsex0clktvae2pqjfxnyxq0ml0zc",
            ),
            (
                "bchtest",
                P2PKH_TYPE,
                KEY_HASH,
                "bchtest:qrpgfcqrnqvp33vsex0clktvae2pqjfxnyzjtuac9y",
            ),
            (
                "bitcoincash",
                P2PKH_TYPE,
                "309a0c6efa0da7966d5c42dc5a928f6baf0e47ef",
                "bitcoincash:qqcf5rrwlgx609ndt3pdck5j3a467rj8aucwvn9uvv",
            ),
            (
                "bitcoincash",
                P2SH_TYPE,
                "309a0c6efa0da7966d5c42dc5a928f6baf0e47ef",
                "bitcoincash:pqcf5rrwlgx609ndt3pdck5j3a467rj8au0t3uzlh3",
            ),
        ];
        for (prefix, type_code, hash, addr) in cases.iter() {
            let hash = hex::decode(hash).unwrap();
            let version = version_byte(*type_code, hash.len()).unwrap();
            assert_eq!(encode_cashaddr(prefix, version, &hash).unwrap(), *addr);

            let (v, h) = decode_cashaddr(prefix, addr).unwrap();
            assert_eq!(v, version);
            assert_eq!(h, hash);
        }
    }

    #[test]
    fn it_decodes_without_prefix_and_in_uppercase() {
        let hash = hex::decode(KEY_HASH).unwrap();
        let cases = [
            "qrpgfcqrnqvp33vsex0clktvae2pqjfxnyxq0ml0zc",
            "BITCOINCASH:QRPGFCQRNQVP33VSEX0CLKTVAE2PQJFXNYXQ0ML0ZC",
        ];
        for addr in cases.iter() {
            assert!(looks_like_cashaddr(addr));
            assert_eq!(decode_cashaddr("bitcoincash", addr).unwrap(), (0, hash.clone()));
        }
    }

    #[test]
    fn it_rejects_malformed_cashaddrs() {
        let cases = [
            "bitcoincash:qrpgfcqrnqvp33vsex0clktvae2pqjfxnyxq0ml0zd",
            "bitcoincash:Qrpgfcqrnqvp33vsex0clktvae2pqjfxnyxq0ml0zc",
            "bchtest:qrpgfcqrnqvp33vsex0clktvae2pqjfxnyxq0ml0zc",
            "bitcoincash:qrpgfcqrnqvp33vsex0clktvae2pqjfxnyxq0ml0zb",
            "bitcoincash:qrpgfcqrnq",
            "bitcoincash:qrpgfcqr",
        ];
        let res: Vec<_> = cases
            .iter()
            .map(|addr| decode_cashaddr("bitcoincash", addr))
            .collect();
        assert!(matches!(res[0], Err(EncodingError::InvalidChecksum)));
        assert!(matches!(res[1], Err(EncodingError::MixedCase)));
        assert!(matches!(res[2], Err(EncodingError::WrongHRP { .. })));
        assert!(matches!(res[3], Err(EncodingError::InvalidCharacter('b'))));
        assert!(matches!(res[4], Err(EncodingError::InvalidChecksum)));
        assert!(matches!(res[5], Err(EncodingError::InvalidSizeError)));
    }

    #[test]
    fn it_rejects_unknown_hash_sizes() {
        assert!(matches!(
            version_byte(P2PKH_TYPE, 21),
            Err(EncodingError::InvalidSizeError)
        ));
        assert_eq!(version_byte(P2SH_TYPE, 32).unwrap(), 0x0b);
    }

    #[test]
    fn it_does_not_mistake_base58_for_cashaddr() {
        assert!(!looks_like_cashaddr("1JjXGY5KEcbT35uAo6P9A7DebBn4DXnjdQ"));
    }
}
