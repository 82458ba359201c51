use sha2::{Digest, Sha256};
use std::io::{Result as IOResult, Write};

use crate::hashes::marked::MarkedDigestWriter;

/// A bitcoin-style double-sha256 output. Internal byte order.
pub type Hash256Digest = [u8; 32];

/// A struct that exposes a Bitcoin-style Hash256 `Write` interface by wrapping an internal SHA2
/// instance.
///
/// ```
/// use std::io::Write;
/// use utxo_core::hashes::{Hash256Writer, MarkedDigestWriter};
///
/// let mut w = Hash256Writer::default();
/// w.write_all(&[0u8; 32]).unwrap();
/// let digest = w.finish();
/// assert_eq!(digest.len(), 32);
/// ```
#[derive(Default)]
pub struct Hash256Writer {
    internal: Sha256,
}

impl Write for Hash256Writer {
    fn write(&mut self, buf: &[u8]) -> IOResult<usize> {
        self.internal.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> IOResult<()> {
        Ok(())
    }
}

impl MarkedDigestWriter<Hash256Digest> for Hash256Writer {
    fn finish(self) -> Hash256Digest {
        let first = self.internal.finalize();
        Sha256::digest(first).into()
    }
}

/// Double-sha256 a byte slice in one shot.
pub fn hash256(data: &[u8]) -> Hash256Digest {
    Sha256::digest(Sha256::digest(data)).into()
}
