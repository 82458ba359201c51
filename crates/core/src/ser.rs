//! A simple trait for binary (de)serialization using std `Read` and `Write` traits.

use std::io::{Cursor, Error as IOError, Read, Write};

use hex::FromHexError;
use thiserror::Error;

/// Errors related to serialization of types.
#[derive(Debug, Error)]
pub enum SerError {
    /// Compact ints must use the shortest available encoding.
    #[error("Non-minimal compact int. Prefix {prefix:#04x} used for {value}")]
    NonMinimalCompactInt {
        /// The prefix byte that was read
        prefix: u8,
        /// The decoded value
        value: u64,
    },

    /// A length prefix claimed more items than the reader could provide.
    #[error("Prefixed vector too long. Got length {0}")]
    PrefixTooLong(u64),

    /// A fixed-size item was decoded from the wrong number of bytes.
    #[error("Expected {expected} bytes. Got {got}")]
    InvalidLength {
        /// The size of the item
        expected: usize,
        /// The number of bytes supplied
        got: usize,
    },

    /// IOError bubbled up from a `Write` passed to a `ByteFormat::write_to` implementation.
    #[error(transparent)]
    IOError(#[from] IOError),

    /// `deserialize_hex` encountered an error on its input.
    #[error(transparent)]
    FromHexError(#[from] FromHexError),
}

/// Type alias for serialization errors
pub type SerResult<T> = Result<T, SerError>;

/// Calculates the minimum prefix length for a compact int given the number to encode
pub fn prefix_byte_len(number: u64) -> u8 {
    match number {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

/// Determine the prefix byte that signals a compact int of a given length
pub fn first_byte_from_len(number: u8) -> Option<u8> {
    match number {
        3 => Some(0xfd),
        5 => Some(0xfe),
        9 => Some(0xff),
        _ => None,
    }
}

/// Largest item count `read_prefix_vec` will preallocate for.
const PREALLOC_LIMIT: usize = 1024;

/// Largest length prefix accepted by `read_prefix_vec`. Bigger than any consensus-valid tx.
const MAX_PREFIX: u64 = 4_000_000;

/// Read a bitcoin-style compact int from a reader. Non-minimal encodings are rejected.
pub fn read_compact_int<R>(reader: &mut R) -> SerResult<u64>
where
    R: Read,
{
    let mut prefix = [0u8; 1];
    reader.read_exact(&mut prefix)?;
    let (value, min) = match prefix[0] {
        0xfd => {
            let mut buf = [0u8; 2];
            reader.read_exact(&mut buf)?;
            (u16::from_le_bytes(buf) as u64, 0xfd)
        }
        0xfe => {
            let mut buf = [0u8; 4];
            reader.read_exact(&mut buf)?;
            (u32::from_le_bytes(buf) as u64, 0x1_0000)
        }
        0xff => {
            let mut buf = [0u8; 8];
            reader.read_exact(&mut buf)?;
            (u64::from_le_bytes(buf), 0x1_0000_0000)
        }
        n => return Ok(n as u64),
    };
    if value < min {
        return Err(SerError::NonMinimalCompactInt {
            prefix: prefix[0],
            value,
        });
    }
    Ok(value)
}

/// Write a bitcoin-style compact int using its minimal encoding. Returns the bytes written.
pub fn write_compact_int<W>(writer: &mut W, number: u64) -> SerResult<usize>
where
    W: Write,
{
    let prefix_len = prefix_byte_len(number);
    match first_byte_from_len(prefix_len) {
        None => writer.write_all(&[number as u8])?,
        Some(prefix) => {
            writer.write_all(&[prefix])?;
            writer.write_all(&number.to_le_bytes()[..prefix_len as usize - 1])?;
        }
    }
    Ok(prefix_len as usize)
}

/// A simple trait for deserializing from `std::io::Read` and serializing to `std::io::Write`.
///
/// `ByteFormat` is used extensively in sighash calculation, txid calculation, and transaction
/// serialization and deserialization.
pub trait ByteFormat {
    /// An associated error type
    type Error: From<SerError> + From<IOError> + std::error::Error;

    /// Returns the byte-length of the serialized data structure.
    fn serialized_length(&self) -> usize;

    /// Deserializes an instance of `Self` from a `std::io::Read`. The `limit` argument is used
    /// only when deserializing collections, and specifies the number of instances of the
    /// underlying type to read.
    fn read_from<R>(reader: &mut R, limit: usize) -> Result<Self, Self::Error>
    where
        R: Read,
        Self: std::marker::Sized;

    /// Serializes `self` to a `std::io::Write`. Following `Write` trait conventions, its `Ok`
    /// type is the number of bytes written.
    fn write_to<W>(&self, writer: &mut W) -> Result<usize, Self::Error>
    where
        W: Write;

    /// Convenience function for reading a LE u32
    fn read_u32_le<R>(reader: &mut R) -> Result<u32, Self::Error>
    where
        R: Read,
    {
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Convenience function for reading a LE u64
    fn read_u64_le<R>(reader: &mut R) -> Result<u64, Self::Error>
    where
        R: Read,
    {
        let mut buf = [0u8; 8];
        reader.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Convenience function for writing a LE u32
    fn write_u32_le<W>(writer: &mut W, number: u32) -> Result<usize, Self::Error>
    where
        W: Write,
    {
        writer.write_all(&number.to_le_bytes())?;
        Ok(4)
    }

    /// Convenience function for writing a LE u64
    fn write_u64_le<W>(writer: &mut W, number: u64) -> Result<usize, Self::Error>
    where
        W: Write,
    {
        writer.write_all(&number.to_le_bytes())?;
        Ok(8)
    }

    /// Read a bitcoin-style compact int. Rejects non-minimal encodings.
    fn read_compact_int<R>(reader: &mut R) -> Result<u64, Self::Error>
    where
        R: Read,
    {
        Ok(read_compact_int(reader)?)
    }

    /// Write a bitcoin-style compact int using the minimal encoding.
    fn write_compact_int<W>(writer: &mut W, number: u64) -> Result<usize, Self::Error>
    where
        W: Write,
    {
        Ok(write_compact_int(writer, number)?)
    }

    /// Read a compact-int prefixed vector of `ByteFormat` items.
    fn read_prefix_vec<R, E, I>(reader: &mut R) -> Result<Vec<I>, E>
    where
        R: Read,
        E: From<SerError> + From<IOError> + std::error::Error,
        I: ByteFormat<Error = E>,
    {
        let items = read_compact_int(reader)?;
        if items > MAX_PREFIX {
            return Err(SerError::PrefixTooLong(items).into());
        }
        let mut ret = Vec::with_capacity(std::cmp::min(items as usize, PREALLOC_LIMIT));
        for _ in 0..items {
            ret.push(I::read_from(reader, 0)?);
        }
        Ok(ret)
    }

    /// Write a compact-int prefixed vector of `ByteFormat` items.
    fn write_prefix_vec<W, E, I>(writer: &mut W, items: &[I]) -> Result<usize, E>
    where
        W: Write,
        E: From<SerError> + From<IOError> + std::error::Error,
        I: ByteFormat<Error = E>,
    {
        let mut written = write_compact_int(writer, items.len() as u64)?;
        for item in items.iter() {
            written += item.write_to(writer)?;
        }
        Ok(written)
    }

    /// Decodes a hex string to a `Vec<u8>`, deserializes an instance of `Self` from that vector.
    fn deserialize_hex(s: &str) -> Result<Self, Self::Error>
    where
        Self: std::marker::Sized,
    {
        let v: Vec<u8> = hex::decode(s).map_err(SerError::from)?;
        let mut cursor = Cursor::new(v);
        Self::read_from(&mut cursor, 0)
    }

    /// Serializes `self` to a vector, returns the hex-encoded vector
    fn serialize_hex(&self) -> Result<String, Self::Error> {
        let mut v: Vec<u8> = vec![];
        self.write_to(&mut v)?;
        Ok(hex::encode(v))
    }
}

impl ByteFormat for u8 {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        1
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: Read,
    {
        let mut buf = [0u8; 1];
        reader.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        writer.write_all(&[*self])?;
        Ok(1)
    }
}

impl<A> ByteFormat for Vec<A>
where
    A: ByteFormat,
{
    type Error = A::Error;

    fn serialized_length(&self) -> usize {
        self.iter().map(|v| v.serialized_length()).sum()
    }

    fn read_from<R>(reader: &mut R, limit: usize) -> Result<Self, Self::Error>
    where
        R: Read,
    {
        let mut v = vec![];
        for _ in 0..limit {
            v.push(A::read_from(reader, 0)?);
        }
        Ok(v)
    }

    fn write_to<W>(&self, writer: &mut W) -> Result<usize, Self::Error>
    where
        W: Write,
    {
        let mut written = 0;
        for item in self.iter() {
            written += item.write_to(writer)?;
        }
        Ok(written)
    }
}
