//! Hybrid public-key encryption.
//!
//! [`HybridEncryption`] is the seam between the group layer and the asymmetric
//! primitive. [`Hpke`] implements it with RFC 9180 base mode, single-shot:
//! DHKEM(X25519, HKDF-SHA256), HKDF-SHA256 and a choice of AEAD.

mod aead;
mod kem;
mod keys;

pub use aead::{AEAD_TAG_SIZE, Aead};
pub use keys::{HpkePrivateKey, HpkePublicKey, KeyPair};

use crate::Error;
use crate::types::{X25519PublicKey, X25519Secret};
use aead::{AEAD_KEY_SIZE, AEAD_NONCE_SIZE};
use kem::{KEM_ID, KemSharedSecret, labeled_expand, labeled_extract};
use zeroize::{Zeroize, ZeroizeOnDrop};

const KDF_ID: u16 = 0x0001;
const MODE_BASE: u8 = 0x00;

/// Output of a seal operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sealed {
    /// Authenticated ciphertext, tag included.
    pub ciphertext: Vec<u8>,
    /// KEM output the recipient needs to recover the symmetric key.
    pub encapsulated_key: Vec<u8>,
}

/// One-shot hybrid encryption: key encapsulation, key derivation and an
/// authenticated cipher.
pub trait HybridEncryption: Send + Sync {
    /// Generates fresh, uniformly random key material.
    fn generate_key_pair(&self) -> Result<KeyPair, Error>;

    /// Encapsulates a fresh key to `public_key` and encrypts `plaintext` under it.
    ///
    /// Every call uses new randomness, so sealing the same input twice gives
    /// different outputs.
    fn seal(
        &self,
        public_key: &HpkePublicKey,
        info: &[u8],
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<Sealed, Error>;

    /// Recovers the plaintext sealed to the public half of `private_key`.
    ///
    /// Any failure is reported as [`Error::Decryption`], with no way to tell a
    /// wrong key from a corrupted ciphertext.
    fn open(
        &self,
        private_key: &HpkePrivateKey,
        encapsulated_key: &[u8],
        info: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, Error>;
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct MessageKey {
    key: [u8; AEAD_KEY_SIZE],
    nonce: [u8; AEAD_NONCE_SIZE],
}

/// RFC 9180 HPKE in base mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hpke {
    aead: Aead,
}

impl Hpke {
    /// Creates an HPKE instance for the given AEAD.
    pub fn new(aead: Aead) -> Self {
        Self { aead }
    }

    /// The AEAD this instance seals with.
    pub fn aead(&self) -> Aead {
        self.aead
    }

    /// `"HPKE" || I2OSP(kem_id, 2) || I2OSP(kdf_id, 2) || I2OSP(aead_id, 2)`
    fn suite_id(&self) -> [u8; 10] {
        let mut suite_id = [0u8; 10];
        suite_id[0..4].copy_from_slice(b"HPKE");
        suite_id[4..6].copy_from_slice(&KEM_ID.to_be_bytes());
        suite_id[6..8].copy_from_slice(&KDF_ID.to_be_bytes());
        suite_id[8..10].copy_from_slice(&self.aead.id().to_be_bytes());
        suite_id
    }

    /// Base-mode key schedule. The psk and psk id are empty, and only the
    /// first message of a context is ever sealed, so the nonce is the base nonce.
    fn key_schedule(
        &self,
        shared_secret: &KemSharedSecret,
        info: &[u8],
    ) -> Result<MessageKey, Error> {
        let suite_id = self.suite_id();

        let (psk_id_hash, _) = labeled_extract(&suite_id, b"", b"psk_id_hash", b"");
        let (info_hash, _) = labeled_extract(&suite_id, b"", b"info_hash", info);

        let mut context = [0u8; 1 + 32 + 32];
        context[0] = MODE_BASE;
        context[1..33].copy_from_slice(&psk_id_hash);
        context[33..65].copy_from_slice(&info_hash);

        let (mut secret, hkdf) = labeled_extract(&suite_id, &shared_secret.0, b"secret", b"");
        secret.zeroize();

        let mut message_key = MessageKey {
            key: [0u8; AEAD_KEY_SIZE],
            nonce: [0u8; AEAD_NONCE_SIZE],
        };
        labeled_expand(&hkdf, &suite_id, b"key", &context, &mut message_key.key)?;
        labeled_expand(&hkdf, &suite_id, b"base_nonce", &context, &mut message_key.nonce)?;

        Ok(message_key)
    }

    fn try_open(
        &self,
        private_key: &HpkePrivateKey,
        encapsulated_key: &[u8],
        info: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let recipient = X25519Secret::from_slice(private_key.expose_secret())?;
        let shared_secret = kem::decap(encapsulated_key, &recipient)?;
        let message_key = self.key_schedule(&shared_secret, info)?;

        self.aead
            .open(&message_key.key, &message_key.nonce, aad, ciphertext)
    }
}

impl HybridEncryption for Hpke {
    fn generate_key_pair(&self) -> Result<KeyPair, Error> {
        let secret = X25519Secret::generate()?;
        let public_key = HpkePublicKey::new(secret.public_key().as_bytes().to_vec());

        let mut secret_bytes = secret.to_bytes();
        let private_key = HpkePrivateKey::new(secret_bytes.to_vec());
        secret_bytes.zeroize();

        Ok(KeyPair::new(public_key, private_key))
    }

    fn seal(
        &self,
        public_key: &HpkePublicKey,
        info: &[u8],
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<Sealed, Error> {
        let recipient = X25519PublicKey::from_slice(public_key.as_bytes())?;
        let (shared_secret, enc) = kem::encap(&recipient)?;
        let message_key = self.key_schedule(&shared_secret, info)?;

        let ciphertext = self
            .aead
            .seal(&message_key.key, &message_key.nonce, aad, plaintext)?;

        Ok(Sealed {
            ciphertext,
            encapsulated_key: enc.to_vec(),
        })
    }

    fn open(
        &self,
        private_key: &HpkePrivateKey,
        encapsulated_key: &[u8],
        info: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, Error> {
        self.try_open(private_key, encapsulated_key, info, aad, ciphertext)
            .map_err(|_| Error::Decryption)
    }
}
