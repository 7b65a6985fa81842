use crate::Error;
use aes_gcm_siv::Aes256GcmSiv;
use chacha20poly1305::ChaCha20Poly1305;
use chacha20poly1305::aead::{Aead as _, KeyInit, Payload};

/// Key size shared by both supported ciphers (256 bits).
pub(super) const AEAD_KEY_SIZE: usize = 32;

/// Nonce size shared by both supported ciphers (96 bits).
pub(super) const AEAD_NONCE_SIZE: usize = 12;

/// Authentication tag appended to every ciphertext.
pub const AEAD_TAG_SIZE: usize = 16;

/// Authenticated cipher used to protect message payloads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Aead {
    /// ChaCha20-Poly1305, HPKE AEAD id `0x0003`.
    #[default]
    ChaCha20Poly1305,
    /// AES-256-GCM-SIV. Not registered for HPKE, so it is carried under the
    /// private-use id `0xFF01` and only interoperates with this crate.
    Aes256GcmSiv,
}

impl Aead {
    /// Two-byte identifier that goes into the HPKE suite id.
    pub fn id(&self) -> u16 {
        match self {
            Aead::ChaCha20Poly1305 => 0x0003,
            Aead::Aes256GcmSiv => 0xFF01,
        }
    }

    pub(super) fn seal(
        &self,
        key: &[u8; AEAD_KEY_SIZE],
        nonce: &[u8; AEAD_NONCE_SIZE],
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let payload = Payload {
            msg: plaintext,
            aad,
        };

        let sealed = match self {
            Aead::ChaCha20Poly1305 => {
                ChaCha20Poly1305::new(chacha20poly1305::Key::from_slice(key))
                    .encrypt(chacha20poly1305::Nonce::from_slice(nonce), payload)
            }
            Aead::Aes256GcmSiv => {
                Aes256GcmSiv::new(aes_gcm_siv::Key::<Aes256GcmSiv>::from_slice(key))
                    .encrypt(aes_gcm_siv::Nonce::from_slice(nonce), payload)
            }
        };

        sealed.map_err(|_| Error::Crypto("Message encryption failed".to_string()))
    }

    pub(super) fn open(
        &self,
        key: &[u8; AEAD_KEY_SIZE],
        nonce: &[u8; AEAD_NONCE_SIZE],
        aad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let payload = Payload {
            msg: ciphertext,
            aad,
        };

        let opened = match self {
            Aead::ChaCha20Poly1305 => {
                ChaCha20Poly1305::new(chacha20poly1305::Key::from_slice(key))
                    .decrypt(chacha20poly1305::Nonce::from_slice(nonce), payload)
            }
            Aead::Aes256GcmSiv => {
                Aes256GcmSiv::new(aes_gcm_siv::Key::<Aes256GcmSiv>::from_slice(key))
                    .decrypt(aes_gcm_siv::Nonce::from_slice(nonce), payload)
            }
        };

        opened.map_err(|_| Error::Decryption)
    }
}
