use super::{ByteStream, Decode, Encode};
use crate::Error;

/// A presence-tagged value: one presence byte (`0` or `1`) followed, only when
/// present, by the encoding of the inner value.
///
/// The inner value must have a byte encoding, which the [`Encode`] bound
/// enforces at compile time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct OptionalValue<T>(Option<T>);

impl<T> OptionalValue<T> {
    /// A present value.
    pub fn present(value: T) -> Self {
        Self(Some(value))
    }

    /// An absent value.
    pub fn absent() -> Self {
        Self(None)
    }

    /// Whether a value is present.
    #[inline]
    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    /// The inner value, if present.
    #[inline]
    pub fn value(&self) -> Option<&T> {
        self.0.as_ref()
    }

    /// Consumes the wrapper and returns the inner value.
    pub fn into_inner(self) -> Option<T> {
        self.0
    }
}

impl<T> OptionalValue<T> {
    /// Decodes an optional value, reading the inner value with `decode_inner`.
    ///
    /// Each field type supplies its own length-aware decoder. The stream is
    /// only advanced if both the presence byte and the inner value decode.
    pub fn decode_with<'a, F>(stream: &mut ByteStream<'a>, decode_inner: F) -> Result<Self, Error>
    where
        F: FnOnce(&mut ByteStream<'a>) -> Result<T, Error>,
    {
        let mut cursor = *stream;

        let present = cursor.next_byte().map_err(|_| {
            Error::MalformedEncoding("Insufficient data for optional present byte".to_string())
        })?;

        let value = match present {
            0 => None,
            1 => Some(decode_inner(&mut cursor)?),
            other => {
                return Err(Error::MalformedEncoding(format!(
                    "Invalid present byte for optional: {other}"
                )));
            }
        };

        *stream = cursor;
        Ok(Self(value))
    }
}

impl<T> From<Option<T>> for OptionalValue<T> {
    fn from(value: Option<T>) -> Self {
        Self(value)
    }
}

impl<T> From<OptionalValue<T>> for Option<T> {
    fn from(value: OptionalValue<T>) -> Self {
        value.0
    }
}

impl<T: Encode> Encode for OptionalValue<T> {
    fn encode_into(&self, buffer: &mut Vec<u8>) -> Result<(), Error> {
        match &self.0 {
            Some(value) => {
                buffer.push(1);
                value.encode_into(buffer)
            }
            None => {
                buffer.push(0);
                Ok(())
            }
        }
    }
}

impl<T: Decode> Decode for OptionalValue<T> {
    fn decode(stream: &mut ByteStream<'_>) -> Result<Self, Error> {
        Self::decode_with(stream, T::decode)
    }
}

/// A single opaque byte.
///
/// Mirrors fields whose inner encoding is exactly one byte, such as the
/// legacy optional layout that always read one byte after the presence flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RawByte(pub u8);

impl Encode for RawByte {
    fn encode_into(&self, buffer: &mut Vec<u8>) -> Result<(), Error> {
        buffer.push(self.0);
        Ok(())
    }
}

impl Decode for RawByte {
    fn decode(stream: &mut ByteStream<'_>) -> Result<Self, Error> {
        stream
            .next_byte()
            .map(Self)
            .map_err(|_| {
                Error::MalformedEncoding("Insufficient data for optional value".to_string())
            })
    }
}
