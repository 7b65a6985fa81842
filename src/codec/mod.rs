//! Canonical binary encoding for protocol values.
//!
//! Every value has exactly one valid byte representation. Readers work on a
//! [`ByteStream`] cursor and only advance it once a whole value has been
//! decoded successfully, so a malformed value never leaves the cursor halfway
//! through it.

mod bytes;
mod optional;
mod varint;

pub use bytes::VarBytes;
pub use optional::{OptionalValue, RawByte};
pub use varint::{VARINT_MAX, VarInt, read_varint, write_varint, write_varint_into};

use crate::Error;

/// A borrowed byte sequence with a monotonically advancing read cursor.
#[derive(Clone, Copy, Debug)]
pub struct ByteStream<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteStream<'a> {
    /// Creates a stream positioned at the first byte of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Reads the next byte and advances the cursor.
    pub fn next_byte(&mut self) -> Result<u8, Error> {
        let byte = *self
            .data
            .get(self.offset)
            .ok_or_else(|| Error::MalformedEncoding("Unexpected end of data".to_string()))?;
        self.offset += 1;
        Ok(byte)
    }

    /// Reads exactly `len` bytes and advances the cursor past them.
    ///
    /// The cursor does not move when fewer than `len` bytes remain.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if self.remaining() < len {
            return Err(Error::MalformedEncoding(format!(
                "Expected {len} bytes, {} remaining",
                self.remaining()
            )));
        }

        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    /// Number of unread bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Position of the cursor from the start of the data.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns `true` once every byte has been read.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}

/// A value with a canonical wire encoding.
pub trait Encode {
    /// Appends the encoding of `self` to `buffer`.
    fn encode_into(&self, buffer: &mut Vec<u8>) -> Result<(), Error>;

    /// Encodes `self` into a fresh byte vector.
    fn encode(&self) -> Result<Vec<u8>, Error> {
        let mut buffer = Vec::new();
        self.encode_into(&mut buffer)?;
        Ok(buffer)
    }
}

/// A value that can be read back from its canonical wire encoding.
pub trait Decode: Sized {
    /// Decodes one value from the stream.
    ///
    /// On error the stream must be left where it was before the call.
    fn decode(stream: &mut ByteStream<'_>) -> Result<Self, Error>;
}

/// Decodes a value that must span all of `bytes`.
pub fn decode_exact<T: Decode>(bytes: &[u8]) -> Result<T, Error> {
    let mut stream = ByteStream::new(bytes);
    let value = T::decode(&mut stream)?;

    if !stream.is_empty() {
        return Err(Error::MalformedEncoding(format!(
            "{} trailing bytes",
            stream.remaining()
        )));
    }

    Ok(value)
}

/// Opaque bytes are written as-is, without a length prefix.
///
/// There is no matching [`Decode`] impl: the reader has to know the length from
/// context, so fields that travel alone should use [`VarBytes`] instead.
impl Encode for [u8] {
    fn encode_into(&self, buffer: &mut Vec<u8>) -> Result<(), Error> {
        buffer.extend_from_slice(self);
        Ok(())
    }
}

impl Encode for Vec<u8> {
    fn encode_into(&self, buffer: &mut Vec<u8>) -> Result<(), Error> {
        self.as_slice().encode_into(buffer)
    }
}
