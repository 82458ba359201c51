//! Abstract transaction traits.

use std::io::Write;

use crate::{
    hashes::{MarkedDigest, MarkedDigestWriter},
    ser::{ByteFormat, SerError},
};

/// A `Transaction` is a collection of inputs and outputs, with a version and a lock time. It
/// can produce its own id, and the sighash digests its inputs commit to.
///
/// The sighash is produced by writing a chain-specific preimage into the associated
/// `HashWriter`. Implementors need only describe the preimage.
pub trait Transaction: ByteFormat + Sized {
    /// An associated error type, used in sighash and serialization operations
    type TxError: From<SerError>
        + From<std::io::Error>
        + From<<Self as ByteFormat>::Error>
        + std::error::Error;

    /// The digest type produced by the `HashWriter`
    type Digest;

    /// The input type
    type TxIn;

    /// The output type
    type TxOut;

    /// The arguments required to produce one sighash
    type SighashArgs;

    /// A marked digest type identifying the transaction
    type TXID: MarkedDigest<Digest = Self::Digest>;

    /// A hasher that produces `Digest`s from the serialized transaction
    type HashWriter: MarkedDigestWriter<Self::Digest>;

    /// Instantiate a new transaction from its parts
    fn new<I, O>(version: u32, vin: I, vout: O, locktime: u32) -> Result<Self, Self::TxError>
    where
        I: Into<Vec<Self::TxIn>>,
        O: Into<Vec<Self::TxOut>>;

    /// Return a reference to the inputs
    fn inputs(&self) -> &[Self::TxIn];

    /// Return a reference to the outputs
    fn outputs(&self) -> &[Self::TxOut];

    /// Return the version
    fn version(&self) -> u32;

    /// Return the lock time
    fn locktime(&self) -> u32;

    /// Calculate the id of the transaction
    fn txid(&self) -> Result<Self::TXID, Self::TxError> {
        let mut w = Self::HashWriter::default();
        self.write_to(&mut w)?;
        Ok(w.finish_marked())
    }

    /// Write the sighash preimage described by `args` to `writer`
    fn write_sighash_preimage<W: Write>(
        &self,
        writer: &mut W,
        args: &Self::SighashArgs,
    ) -> Result<(), Self::TxError>;

    /// Calculate the sighash digest described by `args`
    fn sighash(&self, args: &Self::SighashArgs) -> Result<Self::Digest, Self::TxError> {
        let mut w = Self::HashWriter::default();
        self.write_sighash_preimage(&mut w, args)?;
        Ok(w.finish())
    }
}
