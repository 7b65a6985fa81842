use crate::Error;
use crate::codec::{ByteStream, Decode, Encode, OptionalValue, VarBytes, VarInt, decode_exact};

/// A sealed group message as recorded in the message log.
///
/// Wire format:
/// `VarInt(epoch) || VarBytes(sender) || VarBytes(ciphertext) || VarBytes(encapsulated_key)
/// || Optional<VarBytes>(signature)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    epoch: u64,
    sender: String,
    ciphertext: Vec<u8>,
    encapsulated_key: Vec<u8>,
    signature: Option<Vec<u8>>,
}

impl Envelope {
    /// Assembles an envelope, e.g. from fields carried by another framing.
    pub fn new(
        epoch: u64,
        sender: impl Into<String>,
        ciphertext: Vec<u8>,
        encapsulated_key: Vec<u8>,
        signature: Option<Vec<u8>>,
    ) -> Self {
        Self {
            epoch,
            sender: sender.into(),
            ciphertext,
            encapsulated_key,
            signature,
        }
    }

    /// Epoch whose key the message was sealed to.
    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Sender label. Only authenticated if the registry's verifier says so.
    #[inline]
    pub fn sender(&self) -> &str {
        &self.sender
    }

    #[inline]
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    #[inline]
    pub fn encapsulated_key(&self) -> &[u8] {
        &self.encapsulated_key
    }

    #[inline]
    pub fn signature(&self) -> Option<&[u8]> {
        self.signature.as_deref()
    }

    /// Serializes the envelope to its wire format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        self.encode()
    }

    /// Parses an envelope that spans all of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        decode_exact(bytes)
    }
}

impl Encode for Envelope {
    fn encode_into(&self, buffer: &mut Vec<u8>) -> Result<(), Error> {
        VarInt::new(self.epoch)?.encode_into(buffer)?;
        self.sender.encode_into(buffer)?;
        VarBytes::from(self.ciphertext.as_slice()).encode_into(buffer)?;
        VarBytes::from(self.encapsulated_key.as_slice()).encode_into(buffer)?;
        OptionalValue::from(self.signature.as_deref().map(VarBytes::from)).encode_into(buffer)
    }
}

impl Decode for Envelope {
    fn decode(stream: &mut ByteStream<'_>) -> Result<Self, Error> {
        let mut cursor = *stream;

        let epoch = VarInt::decode(&mut cursor)?;
        let sender = String::decode(&mut cursor)?;
        let ciphertext = VarBytes::decode(&mut cursor)?;
        let encapsulated_key = VarBytes::decode(&mut cursor)?;
        let signature = OptionalValue::<VarBytes>::decode(&mut cursor)?;

        *stream = cursor;
        Ok(Self {
            epoch: u64::from(epoch.value()),
            sender,
            ciphertext: ciphertext.into_vec(),
            encapsulated_key: encapsulated_key.into_vec(),
            signature: signature.into_inner().map(VarBytes::into_vec),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_wire_layout() {
        let envelope = Envelope::new(2, "Al", vec![0xC1, 0xC2], vec![0xE1], None);
        assert_eq!(
            envelope.to_bytes().unwrap(),
            vec![0x02, 0x02, b'A', b'l', 0x02, 0xC1, 0xC2, 0x01, 0xE1, 0x00]
        );

        let signed = Envelope::new(0, "", vec![], vec![], Some(vec![0x5A]));
        assert_eq!(
            signed.to_bytes().unwrap(),
            vec![0x00, 0x00, 0x00, 0x00, 0x01, 0x01, 0x5A]
        );
    }

    #[test]
    fn test_epoch_out_of_varint_range() {
        let envelope = Envelope::new(1 << 30, "A", vec![], vec![], None);
        assert_eq!(envelope.to_bytes(), Err(Error::Range(1 << 30)));
    }

    #[test]
    fn test_truncated_envelope_leaves_cursor() {
        let bytes = Envelope::new(70, "Alice", vec![1; 40], vec![2; 32], Some(vec![3; 64]))
            .to_bytes()
            .unwrap();

        for len in 0..bytes.len() {
            let mut stream = ByteStream::new(&bytes[..len]);
            assert!(Envelope::decode(&mut stream).is_err());
            assert_eq!(stream.offset(), 0);
        }
    }

    proptest! {
        #[test]
        fn envelope_roundtrip(
            epoch in 0u64..(1 << 30),
            sender in "[a-zA-Z0-9]{0,24}",
            ciphertext in proptest::collection::vec(any::<u8>(), 0..256),
            enc in proptest::collection::vec(any::<u8>(), 0..64),
            signature in proptest::option::of(proptest::collection::vec(any::<u8>(), 0..80)),
        ) {
            let envelope = Envelope::new(epoch, sender, ciphertext, enc, signature);
            let decoded = Envelope::from_bytes(&envelope.to_bytes().unwrap()).unwrap();
            prop_assert_eq!(decoded, envelope);
        }

        #[test]
        fn arbitrary_bytes_never_panic(data in proptest::collection::vec(any::<u8>(), 0..128)) {
            let _ = Envelope::from_bytes(&data);
        }
    }
}
