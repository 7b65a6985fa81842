use super::{ByteStream, Decode, Encode};
use crate::Error;

/// Largest value a varint can carry (30 data bits).
pub const VARINT_MAX: u32 = (1 << 30) - 1;

/// Smallest value each length class may carry, indexed by the two-bit prefix.
const MIN_VALUE: [u32; 3] = [0, 1 << 6, 1 << 14];

/// Reads a variable-length integer.
///
/// The two high bits of the first byte select the length class: `00` one byte,
/// `01` two bytes, `10` four bytes. `11` is reserved. The remaining bytes
/// continue the value big-endian. Only the shortest encoding of a value is
/// accepted.
pub fn read_varint(stream: &mut ByteStream<'_>) -> Result<u32, Error> {
    let mut cursor = *stream;

    let first = cursor
        .next_byte()
        .map_err(|_| Error::MalformedEncoding("Insufficient data for varint".to_string()))?;
    let prefix = (first >> 6) as usize;

    let len = match prefix {
        0 => 1,
        1 => 2,
        2 => 4,
        _ => {
            return Err(Error::MalformedEncoding(
                "Invalid varint prefix '11'".to_string(),
            ));
        }
    };

    let continuation = cursor.take(len - 1).map_err(|_| {
        Error::MalformedEncoding("Insufficient data for varint length".to_string())
    })?;

    let value = continuation
        .iter()
        .fold(u32::from(first & 0x3F), |value, byte| {
            (value << 8) | u32::from(*byte)
        });

    if value < MIN_VALUE[prefix] {
        return Err(Error::MalformedEncoding(
            "Varint does not use minimal encoding".to_string(),
        ));
    }

    *stream = cursor;
    Ok(value)
}

/// Encodes `value` with the shortest length class that fits.
pub fn write_varint(value: u64) -> Result<Vec<u8>, Error> {
    let mut buffer = Vec::with_capacity(4);
    write_varint_into(value, &mut buffer)?;
    Ok(buffer)
}

/// Appends the shortest encoding of `value` to `buffer`.
pub fn write_varint_into(value: u64, buffer: &mut Vec<u8>) -> Result<(), Error> {
    if value > u64::from(VARINT_MAX) {
        return Err(Error::Range(value));
    }

    let value = value as u32;
    if value < MIN_VALUE[1] {
        buffer.push(value as u8);
    } else if value < MIN_VALUE[2] {
        buffer.extend_from_slice(&((value as u16) | 0x4000).to_be_bytes());
    } else {
        buffer.extend_from_slice(&(value | 0x8000_0000).to_be_bytes());
    }

    Ok(())
}

/// A variable-length integer in `[0, VARINT_MAX]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarInt(u32);

impl VarInt {
    /// Creates a varint, failing if `value` exceeds [`VARINT_MAX`].
    pub fn new(value: u64) -> Result<Self, Error> {
        if value > u64::from(VARINT_MAX) {
            return Err(Error::Range(value));
        }
        Ok(Self(value as u32))
    }

    /// The integer value.
    #[inline]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Number of bytes the canonical encoding occupies.
    pub fn encoded_len(&self) -> usize {
        match self.0 {
            v if v < MIN_VALUE[1] => 1,
            v if v < MIN_VALUE[2] => 2,
            _ => 4,
        }
    }
}

impl From<u8> for VarInt {
    fn from(value: u8) -> Self {
        Self(u32::from(value))
    }
}

impl From<u16> for VarInt {
    fn from(value: u16) -> Self {
        Self(u32::from(value))
    }
}

impl TryFrom<u64> for VarInt {
    type Error = Error;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<usize> for VarInt {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value as u64)
    }
}

impl Encode for VarInt {
    fn encode_into(&self, buffer: &mut Vec<u8>) -> Result<(), Error> {
        write_varint_into(u64::from(self.0), buffer)
    }
}

impl Decode for VarInt {
    fn decode(stream: &mut ByteStream<'_>) -> Result<Self, Error> {
        read_varint(stream).map(Self)
    }
}
