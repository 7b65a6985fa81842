use crate::Error;
use crate::codec::{Encode, VarBytes};
use ed25519_dalek::{Signature, VerifyingKey};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::RwLock;

const SENDER_SIGNATURE_LABEL: &[u8] = b"cohort sender signature v1";

/// Everything a verifier gets to see about a message and the sender it claims.
#[derive(Clone, Copy, Debug)]
pub struct SenderClaim<'a> {
    /// Group the message is sent to.
    pub group_id: &'a str,
    /// Epoch the message is sealed in.
    pub epoch: u64,
    /// Sender label supplied by the caller.
    pub sender: &'a str,
    /// Message plaintext.
    pub plaintext: &'a [u8],
    /// Signature supplied alongside the message, if any.
    pub signature: Option<&'a [u8]>,
}

/// Decides whether a claimed sender may be recorded on a message.
pub trait SenderVerifier: Send + Sync {
    /// Accepts or rejects the claim.
    fn verify(&self, claim: &SenderClaim<'_>) -> Result<(), Error>;

    /// Whether received envelopes should be checked again after decryption.
    fn requires_signature(&self) -> bool {
        false
    }
}

/// Records whatever sender label the caller supplies.
///
/// This is the default and it authenticates nothing: any caller can send under
/// any member's name. Configure [`Ed25519SenderVerifier`] when the label has to
/// mean something.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAnySender;

impl SenderVerifier for AcceptAnySender {
    fn verify(&self, _claim: &SenderClaim<'_>) -> Result<(), Error> {
        Ok(())
    }
}

/// Bytes a sender signs to vouch for a message.
///
/// `label || VarBytes(group_id) || epoch (u64, big-endian) || VarBytes(sender)
/// || SHA-256(plaintext)`
pub fn sender_signing_payload(
    group_id: &str,
    epoch: u64,
    sender: &str,
    plaintext: &[u8],
) -> Result<Vec<u8>, Error> {
    let mut payload =
        Vec::with_capacity(SENDER_SIGNATURE_LABEL.len() + group_id.len() + sender.len() + 48);
    payload.extend_from_slice(SENDER_SIGNATURE_LABEL);
    VarBytes::from(group_id.as_bytes()).encode_into(&mut payload)?;
    payload.extend_from_slice(&epoch.to_be_bytes());
    VarBytes::from(sender.as_bytes()).encode_into(&mut payload)?;
    payload.extend_from_slice(&Sha256::digest(plaintext));

    Ok(payload)
}

/// Requires every message to carry an Ed25519 signature from the claimed
/// sender's registered key.
#[derive(Debug, Default)]
pub struct Ed25519SenderVerifier {
    keys: RwLock<HashMap<String, VerifyingKey>>,
}

impl Ed25519SenderVerifier {
    /// Creates a verifier with no registered senders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the verification key of `member`.
    pub fn register(&self, member: impl Into<String>, key: VerifyingKey) -> Result<(), Error> {
        self.keys
            .write()
            .map_err(|_| Error::Session)?
            .insert(member.into(), key);
        Ok(())
    }

    /// Forgets the key of `member`.
    pub fn unregister(&self, member: &str) -> Result<Option<VerifyingKey>, Error> {
        Ok(self.keys.write().map_err(|_| Error::Session)?.remove(member))
    }
}

impl SenderVerifier for Ed25519SenderVerifier {
    fn verify(&self, claim: &SenderClaim<'_>) -> Result<(), Error> {
        let rejected = || Error::UnauthenticatedSender(claim.sender.to_string());

        let key = self
            .keys
            .read()
            .map_err(|_| Error::Session)?
            .get(claim.sender)
            .copied()
            .ok_or_else(rejected)?;

        let signature = claim
            .signature
            .ok_or_else(rejected)
            .and_then(|bytes| Signature::from_slice(bytes).map_err(|_| rejected()))?;

        let payload =
            sender_signing_payload(claim.group_id, claim.epoch, claim.sender, claim.plaintext)?;

        key.verify_strict(&payload, &signature).map_err(|_| rejected())
    }

    fn requires_signature(&self) -> bool {
        true
    }
}
