use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use std::io::{Result as IOResult, Write};

use crate::hashes::marked::MarkedDigestWriter;

/// A bitcoin-style `ripemd160(sha256(x))` output.
pub type Hash160Digest = [u8; 20];

/// A `Write` interface producing bitcoin's HASH160 of everything written to it.
#[derive(Default)]
pub struct Hash160Writer {
    internal: Sha256,
}

impl Write for Hash160Writer {
    fn write(&mut self, buf: &[u8]) -> IOResult<usize> {
        self.internal.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> IOResult<()> {
        Ok(())
    }
}

impl MarkedDigestWriter<Hash160Digest> for Hash160Writer {
    fn finish(self) -> Hash160Digest {
        let first = self.internal.finalize();
        Ripemd160::digest(first).into()
    }
}

/// HASH160 a byte slice in one shot. Used for pubkey hashes and script hashes.
pub fn hash160(data: &[u8]) -> Hash160Digest {
    Ripemd160::digest(Sha256::digest(data)).into()
}
