//! Useful macros for implementing new chains

#[macro_export]
/// Implement `serde::Serialize` and `serde::Deserialize` by passing through to the hex
macro_rules! impl_hex_serde {
    ($item:ty) => {
        impl serde::Serialize for $item {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                let s = $crate::ser::ByteFormat::serialize_hex(self)
                    .map_err(|e| <S::Error as serde::ser::Error>::custom(e.to_string()))?;
                serializer.serialize_str(&s)
            }
        }

        impl<'de> serde::Deserialize<'de> for $item {
            fn deserialize<D>(deserializer: D) -> Result<$item, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s: String = serde::Deserialize::deserialize(deserializer)?;
                <$item as $crate::ser::ByteFormat>::deserialize_hex(&s)
                    .map_err(|e| serde::de::Error::custom(e.to_string()))
            }
        }
    };
}

#[macro_export]
/// Wrap a prefixed vector of bytes (`u8`) in a newtype, and implement convenience functions for
/// it.
macro_rules! wrap_prefixed_byte_vector {
    (
        $(#[$outer:meta])*
        $wrapper_name:ident
    ) => {
        $(#[$outer])*
        #[derive(Clone, Debug, Eq, PartialEq, Default, Hash, PartialOrd, Ord)]
        pub struct $wrapper_name(Vec<u8>);

        impl $crate::ser::ByteFormat for $wrapper_name {
            type Error = $crate::ser::SerError;

            fn serialized_length(&self) -> usize {
                self.len() + self.len_prefix() as usize
            }

            fn read_from<R>(reader: &mut R, _limit: usize) -> Result<Self, Self::Error>
            where
                R: std::io::Read
            {
                let items: Vec<u8> = Self::read_prefix_vec(reader)?;
                Ok(Self(items))
            }

            fn write_to<W>(&self, writer: &mut W) -> Result<usize, Self::Error>
            where
                W: std::io::Write
            {
                Self::write_prefix_vec(writer, &self.0)
            }
        }

        $crate::impl_hex_serde!($wrapper_name);

        impl std::convert::AsRef<[u8]> for $wrapper_name {
            fn as_ref(&self) -> &[u8] {
                &self.0[..]
            }
        }

        impl $wrapper_name {
            /// Instantate a new wrapped vector
            pub fn new(v: Vec<u8>) -> Self {
                Self(v)
            }

            /// Construct an empty wrapped vector instance.
            pub fn null() -> Self {
                Self(vec![])
            }

            /// Return a reference to the underlying bytes
            pub fn items(&self) -> &[u8] {
                &self.0
            }

            /// Consume the wrapper, returning the underlying bytes
            pub fn into_inner(self) -> Vec<u8> {
                self.0
            }

            /// Return the length of the item vector.
            pub fn len(&self) -> usize {
                self.0.len()
            }

            /// Return true if the length of the item vector is 0.
            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            /// Determine the byte-length of the vector length prefix
            pub fn len_prefix(&self) -> u8 {
                $crate::ser::prefix_byte_len(self.len() as u64)
            }
        }

        impl From<&[u8]> for $wrapper_name {
            fn from(v: &[u8]) -> Self {
                Self(v.to_vec())
            }
        }

        impl From<Vec<u8>> for $wrapper_name {
            fn from(v: Vec<u8>) -> Self {
                Self(v)
            }
        }

        impl std::ops::Index<usize> for $wrapper_name {
            type Output = u8;

            fn index(&self, index: usize) -> &Self::Output {
                &self.0[index]
            }
        }

        impl std::ops::Index<std::ops::Range<usize>> for $wrapper_name {
            type Output = [u8];

            fn index(&self, range: std::ops::Range<usize>) -> &[u8] {
                &self.0[range]
            }
        }

        impl std::iter::Extend<u8> for $wrapper_name {
            fn extend<I: std::iter::IntoIterator<Item=u8>>(&mut self, iter: I) {
                self.0.extend(iter)
            }
        }
    }
}

#[macro_export]
/// Implement conversion between script types by passing via `as_ref().into()`
macro_rules! impl_script_conversion {
    ($t1:ty, $t2:ty) => {
        impl From<&$t2> for $t1 {
            fn from(t: &$t2) -> $t1 {
                t.as_ref().into()
            }
        }
        impl From<&$t1> for $t2 {
            fn from(t: &$t1) -> $t2 {
                t.as_ref().into()
            }
        }
    };
}

#[macro_export]
/// Make a new marked 32-byte double-sha256 digest. Bitcoin-family chains display these
/// byte-reversed, so the wrapper carries BE hex helpers.
macro_rules! mark_hash256 {
    (
        $(#[$outer:meta])*
        $hash_name:ident
    ) => {
        $(#[$outer])*
        #[derive(
            serde::Serialize, serde::Deserialize, Copy, Clone, Default, Debug, Hash, Eq,
            PartialEq, PartialOrd, Ord,
        )]
        pub struct $hash_name(pub $crate::hashes::Hash256Digest);

        impl $hash_name {
            /// Deserialize from BE (display order) hex. The hex must decode to exactly 32 bytes.
            pub fn from_be_hex(be: &str) -> $crate::ser::SerResult<Self> {
                let bytes = hex::decode(be)?;
                let mut digest = $crate::hashes::Hash256Digest::default();
                if bytes.len() != digest.len() {
                    return Err($crate::ser::SerError::InvalidLength {
                        expected: digest.len(),
                        got: bytes.len(),
                    });
                }
                digest.copy_from_slice(&bytes);
                Ok(Self(digest).reversed())
            }

            /// Convert to BE (display order) hex
            pub fn to_be_hex(&self) -> String {
                hex::encode(self.reversed().0)
            }

            /// Return a copy with the byte order reversed
            pub fn reversed(&self) -> Self {
                let mut digest = self.0;
                digest.reverse();
                Self(digest)
            }
        }

        impl From<$crate::hashes::Hash256Digest> for $hash_name {
            fn from(bytes: $crate::hashes::Hash256Digest) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $hash_name {
            fn as_ref(&self) -> &[u8] {
                &self.0[..]
            }
        }

        impl $crate::ser::ByteFormat for $hash_name {
            type Error = $crate::ser::SerError;

            fn serialized_length(&self) -> usize {
                32
            }

            fn read_from<R>(reader: &mut R, _limit: usize) -> $crate::ser::SerResult<Self>
            where
                R: std::io::Read,
            {
                let mut buf = $crate::hashes::Hash256Digest::default();
                reader.read_exact(&mut buf)?;
                Ok(Self(buf))
            }

            fn write_to<W>(&self, writer: &mut W) -> $crate::ser::SerResult<usize>
            where
                W: std::io::Write
            {
                writer.write_all(&self.0)?;
                Ok(32)
            }
        }

        impl $crate::hashes::MarkedDigest for $hash_name {
            type Digest = $crate::hashes::Hash256Digest;

            fn new(hash: Self::Digest) -> Self {
                Self(hash)
            }

            fn internal(&self) -> Self::Digest {
                self.0
            }
        }
    }
}
