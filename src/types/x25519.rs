use crate::Error;
use rand::TryRngCore;
use rand::rngs::OsRng;
use x25519_dalek::{PublicKey, SharedSecret, StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop};

pub(crate) const X25519_KEY_SIZE: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct X25519PublicKey(PublicKey);

impl X25519PublicKey {
    pub(crate) fn as_bytes(&self) -> &[u8; X25519_KEY_SIZE] {
        self.0.as_bytes()
    }

    /// Parses a serialized public key, rejecting anything that is not exactly 32 bytes.
    pub(crate) fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        let bytes: [u8; X25519_KEY_SIZE] = bytes.try_into().map_err(|_| {
            Error::Crypto(format!("Invalid X25519 public key length: {}", bytes.len()))
        })?;
        Ok(Self(PublicKey::from(bytes)))
    }
}

impl From<[u8; X25519_KEY_SIZE]> for X25519PublicKey {
    fn from(bytes: [u8; X25519_KEY_SIZE]) -> Self {
        Self(PublicKey::from(bytes))
    }
}

impl AsRef<PublicKey> for X25519PublicKey {
    fn as_ref(&self) -> &PublicKey {
        &self.0
    }
}

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub(crate) struct X25519Secret(StaticSecret);

impl X25519Secret {
    /// Generates a secret from 32 bytes of OS randomness.
    pub(crate) fn generate() -> Result<Self, Error> {
        let mut seed = Box::new([0u8; X25519_KEY_SIZE]);
        OsRng
            .try_fill_bytes(seed.as_mut_slice())
            .map_err(|_| Error::Random)?;
        let secret = Self(StaticSecret::from(*seed));
        seed.zeroize();

        Ok(secret)
    }

    pub(crate) fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        let mut bytes: [u8; X25519_KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::Crypto("Invalid X25519 private key length".to_string()))?;
        let secret = Self(StaticSecret::from(bytes));
        bytes.zeroize();

        Ok(secret)
    }

    /// Diffie-Hellman with `public_key`. Fails on a non-contributory (all-zero) result,
    /// which is what a small-order peer point produces.
    pub(crate) fn dh(&self, public_key: &X25519PublicKey) -> Result<SharedSecret, Error> {
        let shared = self.0.diffie_hellman(public_key.as_ref());
        if !shared.was_contributory() {
            return Err(Error::Crypto("Non-contributory Diffie-Hellman output".to_string()));
        }

        Ok(shared)
    }

    pub(crate) fn public_key(&self) -> X25519PublicKey {
        X25519PublicKey(PublicKey::from(&self.0))
    }

    pub(crate) fn to_bytes(&self) -> [u8; X25519_KEY_SIZE] {
        self.0.to_bytes()
    }
}
