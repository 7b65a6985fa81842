//! DHKEM(X25519, HKDF-SHA256) and the labeled HKDF helpers it shares with
//! the key schedule.

use crate::Error;
use crate::types::{X25519_KEY_SIZE, X25519PublicKey, X25519Secret};
use hkdf::{Hkdf, HkdfExtract};
use sha2::Sha256;
use x25519_dalek::SharedSecret;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub(super) const KEM_ID: u16 = 0x0020;

const HPKE_VERSION: &[u8] = b"HPKE-v1";

/// `"KEM" || I2OSP(kem_id, 2)`
const KEM_SUITE_ID: [u8; 5] = [b'K', b'E', b'M', (KEM_ID >> 8) as u8, KEM_ID as u8];

/// Output of the KEM, the input keying material of the key schedule.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(super) struct KemSharedSecret(pub(super) [u8; 32]);

/// `LabeledExtract(salt, label, ikm)`. Returns the PRK and an HKDF instance keyed with it.
pub(super) fn labeled_extract(
    suite_id: &[u8],
    salt: &[u8],
    label: &[u8],
    ikm: &[u8],
) -> ([u8; 32], Hkdf<Sha256>) {
    let mut extract = HkdfExtract::<Sha256>::new(Some(salt));
    extract.input_ikm(HPKE_VERSION);
    extract.input_ikm(suite_id);
    extract.input_ikm(label);
    extract.input_ikm(ikm);

    let (prk, hkdf) = extract.finalize();
    (prk.into(), hkdf)
}

/// `LabeledExpand(prk, label, info, L)` where `L` is `okm.len()`.
pub(super) fn labeled_expand(
    hkdf: &Hkdf<Sha256>,
    suite_id: &[u8],
    label: &[u8],
    info: &[u8],
    okm: &mut [u8],
) -> Result<(), Error> {
    let len = u16::try_from(okm.len())
        .map_err(|_| Error::Crypto("HKDF output too long".to_string()))?
        .to_be_bytes();

    hkdf.expand_multi_info(&[&len, HPKE_VERSION, suite_id, label, info], okm)
        .map_err(|_| Error::Crypto("HKDF expansion failed".to_string()))
}

fn extract_and_expand(mut dh: SharedSecret, kem_context: &[u8]) -> Result<KemSharedSecret, Error> {
    let (mut eae_prk, hkdf) = labeled_extract(&KEM_SUITE_ID, b"", b"eae_prk", dh.as_bytes());
    eae_prk.zeroize();
    dh.zeroize();

    let mut shared_secret = KemSharedSecret([0u8; 32]);
    labeled_expand(
        &hkdf,
        &KEM_SUITE_ID,
        b"shared_secret",
        kem_context,
        &mut shared_secret.0,
    )?;

    Ok(shared_secret)
}

fn kem_context(enc: &[u8; X25519_KEY_SIZE], recipient: &X25519PublicKey) -> [u8; 64] {
    let mut context = [0u8; 64];
    context[..32].copy_from_slice(enc);
    context[32..].copy_from_slice(recipient.as_bytes());
    context
}

/// Encapsulates a fresh shared secret to `recipient`. Returns the secret and `enc`.
pub(super) fn encap(
    recipient: &X25519PublicKey,
) -> Result<(KemSharedSecret, [u8; X25519_KEY_SIZE]), Error> {
    let ephemeral = X25519Secret::generate()?;
    encap_with(&ephemeral, recipient)
}

fn encap_with(
    ephemeral: &X25519Secret,
    recipient: &X25519PublicKey,
) -> Result<(KemSharedSecret, [u8; X25519_KEY_SIZE]), Error> {
    let dh = ephemeral.dh(recipient)?;
    let enc = *ephemeral.public_key().as_bytes();
    let shared_secret = extract_and_expand(dh, &kem_context(&enc, recipient))?;

    Ok((shared_secret, enc))
}

/// Recovers the shared secret from `enc` with the recipient's private key.
pub(super) fn decap(enc: &[u8], recipient: &X25519Secret) -> Result<KemSharedSecret, Error> {
    let ephemeral_public = X25519PublicKey::from_slice(enc)?;
    let dh = recipient.dh(&ephemeral_public)?;

    extract_and_expand(
        dh,
        &kem_context(ephemeral_public.as_bytes(), &recipient.public_key()),
    )
}
