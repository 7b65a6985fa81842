#[macro_use]
extern crate afl;
use cohort::Envelope;
use cohort::codec::{ByteStream, Decode, OptionalValue, VarInt};

fn main() {
    fuzz!(|data: &[u8]| {
        if let Ok(envelope) = Envelope::from_bytes(data) {
            // Canonical encoding: a parsed envelope re-encodes to the same bytes.
            assert_eq!(envelope.to_bytes().ok().as_deref(), Some(data));
        }

        let mut stream = ByteStream::new(data);
        while !stream.is_empty() {
            let offset = stream.offset();
            if OptionalValue::<VarInt>::decode(&mut stream).is_err() {
                assert_eq!(stream.offset(), offset);
                break;
            }
        }
    });
}
