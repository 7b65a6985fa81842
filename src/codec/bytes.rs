use super::{ByteStream, Decode, Encode, read_varint, write_varint_into};
use crate::Error;

/// A byte vector prefixed with its varint-encoded length.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct VarBytes(Vec<u8>);

impl VarBytes {
    /// Wraps `bytes` without copying.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The wrapped bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the wrapper and returns the bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for VarBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for VarBytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for VarBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Writes `bytes` with a varint length prefix.
pub(crate) fn encode_var_bytes(bytes: &[u8], buffer: &mut Vec<u8>) -> Result<(), Error> {
    write_varint_into(bytes.len() as u64, buffer)?;
    buffer.extend_from_slice(bytes);
    Ok(())
}

/// Reads a varint length prefix and that many bytes.
pub(crate) fn decode_var_bytes<'a>(stream: &mut ByteStream<'a>) -> Result<&'a [u8], Error> {
    let mut cursor = *stream;
    let len = read_varint(&mut cursor)? as usize;
    let bytes = cursor.take(len)?;

    *stream = cursor;
    Ok(bytes)
}

impl Encode for VarBytes {
    fn encode_into(&self, buffer: &mut Vec<u8>) -> Result<(), Error> {
        encode_var_bytes(&self.0, buffer)
    }
}

impl Decode for VarBytes {
    fn decode(stream: &mut ByteStream<'_>) -> Result<Self, Error> {
        decode_var_bytes(stream).map(|bytes| Self(bytes.to_vec()))
    }
}

/// Strings travel as length-prefixed UTF-8.
impl Encode for String {
    fn encode_into(&self, buffer: &mut Vec<u8>) -> Result<(), Error> {
        encode_var_bytes(self.as_bytes(), buffer)
    }
}

impl Decode for String {
    fn decode(stream: &mut ByteStream<'_>) -> Result<Self, Error> {
        let mut cursor = *stream;
        let bytes = decode_var_bytes(&mut cursor)?;
        let value = std::str::from_utf8(bytes)
            .map_err(|err| Error::MalformedEncoding(format!("Invalid UTF-8: {err}")))?
            .to_string();

        *stream = cursor;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_exact;

    #[test]
    fn test_length_prefix_uses_varint() {
        let short = VarBytes::from(vec![0xAB; 3]).encode().unwrap();
        assert_eq!(short[..1], [0x03]);
        assert_eq!(short.len(), 4);

        let long = VarBytes::from(vec![0xAB; 100]).encode().unwrap();
        assert_eq!(long[..2], [0x40, 0x64]);
        assert_eq!(long.len(), 102);
    }

    #[test]
    fn test_truncated_payload_leaves_cursor() {
        let data = [0x05, 1, 2];
        let mut stream = ByteStream::new(&data);

        assert!(matches!(
            VarBytes::decode(&mut stream),
            Err(Error::MalformedEncoding(_))
        ));
        assert_eq!(stream.offset(), 0);
    }

    #[test]
    fn test_string_roundtrip_and_invalid_utf8() {
        let encoded = "Alice".to_string().encode().unwrap();
        assert_eq!(decode_exact::<String>(&encoded).unwrap(), "Alice");

        assert!(matches!(
            decode_exact::<String>(&[0x02, 0xC3, 0x28]),
            Err(Error::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_empty_bytes() {
        let encoded = VarBytes::default().encode().unwrap();
        assert_eq!(encoded, vec![0x00]);
        assert!(decode_exact::<VarBytes>(&encoded).unwrap().as_slice().is_empty());
    }
}
