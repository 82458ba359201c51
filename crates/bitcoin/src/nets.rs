//! Network parameters for the supported Bitcoin-family chains.
//!
//! A network is a plain value. Encoders, the selector and the builder read these parameters and
//! never branch on which chain they are serving.
//!
//! ```
//! use utxo_bitcoins::nets::{NetworkParams, BITCOIN_CASH, LITECOIN};
//!
//! assert_eq!(LITECOIN.segwit_hrp(), Some("ltc"));
//! assert!(BITCOIN_CASH.uses_forkid());
//! assert_eq!(NetworkParams::by_name("dogecoin").unwrap().pkh_version, 0x1e);
//! ```

use crate::types::tx::Sighash;

/// The human-readable part used by a network's checksummed base32 addresses.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HumanReadablePrefix {
    /// A BIP173/BIP350 bech32 HRP, e.g. "bc"
    Segwit(&'static str),
    /// A CashAddr prefix, e.g. "bitcoincash"
    CashAddr(&'static str),
}

/// Encoding and signing parameters for a Bitcoin-family network.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NetworkParams {
    /// Lowercase network name
    pub name: &'static str,
    /// Base58Check version byte for P2PKH addresses
    pub pkh_version: u8,
    /// Base58Check version byte for P2SH addresses
    pub sh_version: u8,
    /// Bech32 or CashAddr prefix, if the network has one
    pub prefix: Option<HumanReadablePrefix>,
    /// The sighash flag every input is signed with
    pub sighash: Sighash,
    /// Transaction version used when the builder config does not set one
    pub default_tx_version: u32,
}

impl NetworkParams {
    /// The bech32 HRP, on networks with native witness addresses.
    pub fn segwit_hrp(&self) -> Option<&'static str> {
        match self.prefix {
            Some(HumanReadablePrefix::Segwit(hrp)) => Some(hrp),
            _ => None,
        }
    }

    /// The CashAddr prefix, on networks using CashAddr.
    pub fn cashaddr_prefix(&self) -> Option<&'static str> {
        match self.prefix {
            Some(HumanReadablePrefix::CashAddr(prefix)) => Some(prefix),
            _ => None,
        }
    }

    /// True if every input is signed with the BIP143-style FORKID digest.
    pub fn uses_forkid(&self) -> bool {
        self.sighash == Sighash::AllForkId
    }

    /// Look up a supported network by name.
    pub fn by_name(name: &str) -> Option<&'static NetworkParams> {
        ALL_NETWORKS.iter().copied().find(|n| n.name == name)
    }
}

/// Bitcoin mainnet
pub const BITCOIN: NetworkParams = NetworkParams {
    name: "bitcoin",
    pkh_version: 0x00,
    sh_version: 0x05,
    prefix: Some(HumanReadablePrefix::Segwit("bc")),
    sighash: Sighash::All,
    default_tx_version: 1,
};

/// Bitcoin testnet
pub const BITCOIN_TESTNET: NetworkParams = NetworkParams {
    name: "bitcoin-testnet",
    pkh_version: 0x6f,
    sh_version: 0xc4,
    prefix: Some(HumanReadablePrefix::Segwit("tb")),
    sighash: Sighash::All,
    default_tx_version: 1,
};

/// Bitcoin signet
pub const BITCOIN_SIGNET: NetworkParams = NetworkParams {
    name: "bitcoin-signet",
    pkh_version: 0x7d,
    sh_version: 0x57,
    prefix: Some(HumanReadablePrefix::Segwit("sb")),
    sighash: Sighash::All,
    default_tx_version: 1,
};

/// Litecoin mainnet
pub const LITECOIN: NetworkParams = NetworkParams {
    name: "litecoin",
    pkh_version: 0x30,
    sh_version: 0x32,
    prefix: Some(HumanReadablePrefix::Segwit("ltc")),
    sighash: Sighash::All,
    default_tx_version: 1,
};

/// Dogecoin mainnet
pub const DOGECOIN: NetworkParams = NetworkParams {
    name: "dogecoin",
    pkh_version: 0x1e,
    sh_version: 0x16,
    prefix: None,
    sighash: Sighash::All,
    default_tx_version: 1,
};

/// Dash mainnet
pub const DASH: NetworkParams = NetworkParams {
    name: "dash",
    pkh_version: 0x4c,
    sh_version: 0x10,
    prefix: None,
    sighash: Sighash::All,
    default_tx_version: 1,
};

/// Ravencoin mainnet
pub const RAVENCOIN: NetworkParams = NetworkParams {
    name: "ravencoin",
    pkh_version: 0x3c,
    sh_version: 0x7a,
    prefix: None,
    sighash: Sighash::All,
    default_tx_version: 1,
};

/// Bitcoin Cash mainnet
pub const BITCOIN_CASH: NetworkParams = NetworkParams {
    name: "bitcoincash",
    pkh_version: 0x00,
    sh_version: 0x05,
    prefix: Some(HumanReadablePrefix::CashAddr("bitcoincash")),
    sighash: Sighash::AllForkId,
    default_tx_version: 2,
};

/// Bitcoin Cash testnet
pub const BITCOIN_CASH_TESTNET: NetworkParams = NetworkParams {
    name: "bitcoincash-testnet",
    pkh_version: 0x6f,
    sh_version: 0xc4,
    prefix: Some(HumanReadablePrefix::CashAddr("bchtest")),
    sighash: Sighash::AllForkId,
    default_tx_version: 2,
};

/// Every supported network
pub const ALL_NETWORKS: [&NetworkParams; 9] = [
    &BITCOIN,
    &BITCOIN_TESTNET,
    &BITCOIN_SIGNET,
    &LITECOIN,
    &DOGECOIN,
    &DASH,
    &RAVENCOIN,
    &BITCOIN_CASH,
    &BITCOIN_CASH_TESTNET,
];
