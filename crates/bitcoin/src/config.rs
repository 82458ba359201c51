//! Builder configuration. Every field has a default, so a host may load a partial document.

use serde::{Deserialize, Serialize};

use crate::builder::BuilderVariant;

/// Outputs at or below this many smallest units are never created.
pub const DEFAULT_DUST_THRESHOLD: u64 = 546;

/// The sequence number of a final input.
pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

/// The largest sequence number that signals BIP125 replaceability.
pub const SEQUENCE_MAX_REPLACEABLE: u32 = 0xffff_fffd;

/// The sequence number applied to every input of a transaction.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SequencePolicy {
    /// `0xffffffff`
    Final,
    /// A BIP125-signaling sequence number, at most `0xfffffffd`
    Replaceable(u32),
}

impl Default for SequencePolicy {
    fn default() -> Self {
        SequencePolicy::Final
    }
}

impl SequencePolicy {
    /// The conventional opt-in RBF sequence, `0xfffffffd`.
    pub fn rbf() -> Self {
        SequencePolicy::Replaceable(SEQUENCE_MAX_REPLACEABLE)
    }

    /// A replaceable policy, or None if `sequence` would not signal replaceability.
    pub fn replaceable(sequence: u32) -> Option<Self> {
        if sequence <= SEQUENCE_MAX_REPLACEABLE {
            Some(SequencePolicy::Replaceable(sequence))
        } else {
            None
        }
    }

    /// The sequence number to write, or None if a `Replaceable` value is above `0xfffffffd`.
    pub fn sequence(&self) -> Option<u32> {
        match self {
            SequencePolicy::Final => Some(SEQUENCE_FINAL),
            SequencePolicy::Replaceable(n) if *n <= SEQUENCE_MAX_REPLACEABLE => Some(*n),
            SequencePolicy::Replaceable(_) => None,
        }
    }
}

/// The order of inputs and outputs in a built transaction.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Ordering {
    /// Inputs in selection order. The payment output first, change second.
    Selection,
    /// BIP69 lexicographic ordering
    Bip69,
}

impl Default for Ordering {
    fn default() -> Self {
        Ordering::Selection
    }
}

/// Transaction builder configuration.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
#[serde(default)]
pub struct BuilderConfig {
    /// The transaction version. None uses the network default.
    pub version: Option<u32>,
    /// The nLocktime field
    pub lock_time: u32,
    /// Change at or below this is added to the fee. Payments below it are rejected.
    pub dust_threshold: u64,
    /// Default sequence policy
    pub sequence: SequencePolicy,
    /// Default input and output ordering
    pub ordering: Ordering,
    /// Default change address. None sends change back to the source address.
    pub change_address: Option<String>,
    /// Which transaction encoder to use
    pub variant: BuilderVariant,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            version: None,
            lock_time: 0,
            dust_threshold: DEFAULT_DUST_THRESHOLD,
            sequence: SequencePolicy::default(),
            ordering: Ordering::default(),
            change_address: None,
            variant: BuilderVariant::default(),
        }
    }
}

impl BuilderConfig {
    /// Set the builder variant
    pub fn with_variant(mut self, variant: BuilderVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Set the transaction version
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    /// Set the default sequence policy
    pub fn with_sequence(mut self, sequence: SequencePolicy) -> Self {
        self.sequence = sequence;
        self
    }

    /// Set the default ordering
    pub fn with_ordering(mut self, ordering: Ordering) -> Self {
        self.ordering = ordering;
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_produces_sequence_numbers() {
        let cases = [
            (SequencePolicy::Final, Some(0xffff_ffff)),
            (SequencePolicy::rbf(), Some(0xffff_fffd)),
            (SequencePolicy::Replaceable(0xffff_fffa), Some(0xffff_fffa)),
            (SequencePolicy::Replaceable(0xffff_fffe), None),
            (SequencePolicy::Replaceable(0xffff_ffff), None),
        ];
        for (policy, expected) in cases.iter() {
            assert_eq!(policy.sequence(), *expected);
        }
        assert_eq!(SequencePolicy::replaceable(0xffff_fffe), None);
        assert_eq!(
            SequencePolicy::replaceable(0),
            Some(SequencePolicy::Replaceable(0))
        );
    }

    #[test]
    fn it_has_conservative_defaults() {
        let config = BuilderConfig::default();
        assert_eq!(config.version, None);
        assert_eq!(config.lock_time, 0);
        assert_eq!(config.dust_threshold, 546);
        assert_eq!(config.sequence, SequencePolicy::Final);
        assert_eq!(config.ordering, Ordering::Selection);
        assert_eq!(config.variant, BuilderVariant::Native);
    }
}
