/// A `MarkedDigest` is a newtype wrapping a digest, with a marker for its intended purpose.
pub trait MarkedDigest: Copy + Default {
    /// The underlying digest type
    type Digest;

    /// Wrap a digest in the marker
    fn new(hash: Self::Digest) -> Self;

    /// Return a copy of the underlying digest
    fn internal(&self) -> Self::Digest;
}

/// A `MarkedDigestWriter` is a `Write` that produces a digest once all data has been written.
pub trait MarkedDigestWriter<T>: Default + std::io::Write {
    /// Consume the writer, producing the digest
    fn finish(self) -> T;

    /// Consume the writer, producing the digest wrapped in a marker
    fn finish_marked<M: MarkedDigest<Digest = T>>(self) -> M {
        M::new(self.finish())
    }
}
