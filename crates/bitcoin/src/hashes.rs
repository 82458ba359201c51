//! `MarkedDigest` types used by Bitcoin-family transactions. All of these are double-sha256
//! outputs. Marking them keeps a txid from ever being signed, or a sighash from ever being spent.

mark_hash256!(
    /// A marked Hash256Digest representing transaction IDs
    TXID
);

mark_hash256!(
    /// A marked Hash256Digest representing witness transaction IDs
    WTXID
);

mark_hash256!(
    /// A marked Hash256Digest representing the digest an input's signature commits to
    SighashDigest
);
