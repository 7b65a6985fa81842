mod x25519;

pub(crate) use x25519::{X25519_KEY_SIZE, X25519PublicKey, X25519Secret};
