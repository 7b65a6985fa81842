use base64::Engine;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A serialized KEM public key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct HpkePublicKey(Vec<u8>);

impl HpkePublicKey {
    /// Wraps a serialized public key.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The serialized key.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Base64 of the SHA-256 of the key, short enough to compare by eye or log.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(&self.0);
        base64::engine::general_purpose::STANDARD.encode(digest)
    }
}

impl From<Vec<u8>> for HpkePublicKey {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Debug for HpkePublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HpkePublicKey({})", self.fingerprint())
    }
}

/// A serialized KEM private key. Zeroized on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct HpkePrivateKey(Vec<u8>);

impl HpkePrivateKey {
    /// Wraps a serialized private key, taking ownership of the buffer.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The raw key bytes. Only transport implementations should need this.
    #[inline]
    pub fn expose_secret(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for HpkePrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HpkePrivateKey([REDACTED])")
    }
}

/// A KEM key pair generated for a single epoch.
#[derive(Clone, Debug)]
pub struct KeyPair {
    public_key: HpkePublicKey,
    private_key: HpkePrivateKey,
}

impl KeyPair {
    /// Pairs a public key with its private half.
    pub fn new(public_key: HpkePublicKey, private_key: HpkePrivateKey) -> Self {
        Self {
            public_key,
            private_key,
        }
    }

    /// The public half.
    #[inline]
    pub fn public_key(&self) -> &HpkePublicKey {
        &self.public_key
    }

    /// The private half.
    #[inline]
    pub fn private_key(&self) -> &HpkePrivateKey {
        &self.private_key
    }
}

impl Zeroize for KeyPair {
    fn zeroize(&mut self) {
        self.private_key.zeroize();
    }
}
