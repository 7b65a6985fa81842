//! Group session management and epoch rekeying.
//!
//! Every membership change advances the group's epoch and replaces its key
//! pair wholesale. Messages are sealed to the current epoch's public key, and
//! only the current private key is kept, so ciphertext from an earlier epoch
//! can no longer be opened through the registry. This is a single key per
//! epoch, not a tree-based ratchet: a lost epoch cannot be recovered from a
//! later one.

mod config;
mod envelope;
mod epoch;
mod sender;
mod session;

pub use config::{DuplicateMemberPolicy, GroupConfig};
pub use envelope::Envelope;
pub use epoch::{EpochChange, GroupSnapshot, MembershipChange};
pub use sender::{
    AcceptAnySender, Ed25519SenderVerifier, SenderClaim, SenderVerifier, sender_signing_payload,
};

use crate::codec::{Encode, VarBytes};
use crate::{Error, Hpke, HybridEncryption};
use session::GroupSession;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use tracing::{debug, info, warn};

/// Builds the HPKE `info` for messages of `group_id` at `epoch`.
fn message_info(label: &[u8], group_id: &str, epoch: u64) -> Result<Vec<u8>, Error> {
    let mut info = Vec::with_capacity(label.len() + group_id.len() + 12);
    info.extend_from_slice(label);
    VarBytes::from(group_id.as_bytes()).encode_into(&mut info)?;
    info.extend_from_slice(&epoch.to_be_bytes());
    Ok(info)
}

fn lock(session: &Mutex<GroupSession>) -> Result<MutexGuard<'_, GroupSession>, Error> {
    session.lock().map_err(|_| Error::Session)
}

/// Registry of group sessions, keyed by group identifier.
///
/// The registry is owned by the caller; independent registries share nothing.
/// Operations on the same group are serialized on that group's lock, while
/// different groups proceed in parallel.
pub struct GroupRegistry<T: HybridEncryption = Hpke> {
    transport: T,
    verifier: Box<dyn SenderVerifier>,
    config: GroupConfig,
    groups: RwLock<HashMap<String, Arc<Mutex<GroupSession>>>>,
}

impl GroupRegistry<Hpke> {
    /// Creates a registry that seals with HPKE.
    ///
    /// If no configuration is provided, default values are used.
    pub fn new(config: Option<GroupConfig>) -> Self {
        let config = config.unwrap_or_default();
        Self::with_transport(Hpke::new(config.aead), config)
    }
}

impl Default for GroupRegistry<Hpke> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<T: HybridEncryption> GroupRegistry<T> {
    /// Creates a registry on top of a custom transport.
    ///
    /// `config.aead` is not consulted; the transport decides how to seal.
    pub fn with_transport(transport: T, config: GroupConfig) -> Self {
        Self {
            transport,
            verifier: Box::new(AcceptAnySender),
            config,
            groups: RwLock::new(HashMap::new()),
        }
    }

    /// Replaces the sender verifier. The default accepts any sender label.
    pub fn with_sender_verifier(mut self, verifier: impl SenderVerifier + 'static) -> Self {
        self.verifier = Box::new(verifier);
        self
    }

    /// Returns the configuration for this registry.
    pub fn config(&self) -> &GroupConfig {
        &self.config
    }

    fn session(&self, group_id: &str) -> Result<Arc<Mutex<GroupSession>>, Error> {
        self.groups
            .read()
            .map_err(|_| Error::Session)?
            .get(group_id)
            .cloned()
            .ok_or_else(|| Error::UnknownGroup(group_id.to_string()))
    }

    fn check_new_member(&self, members: &[String], member: &str) -> Result<(), Error> {
        if self.config.duplicate_members == DuplicateMemberPolicy::Reject
            && members.iter().any(|existing| existing == member)
        {
            return Err(Error::DuplicateMember(member.to_string()));
        }

        if members.len() >= self.config.max_members {
            return Err(Error::GroupFull(self.config.max_members));
        }

        Ok(())
    }

    /// Creates a group at epoch 0 with fresh key material.
    pub fn create_group<I, M>(
        &self,
        group_id: impl Into<String>,
        members: I,
    ) -> Result<GroupSnapshot, Error>
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        let group_id = group_id.into();

        if self.contains(&group_id)? {
            return Err(Error::DuplicateGroup(group_id));
        }

        let mut initial = Vec::new();
        for member in members {
            let member = member.into();
            self.check_new_member(&initial, &member)?;
            initial.push(member);
        }
        if initial.is_empty() {
            return Err(Error::EmptyGroup);
        }

        let key_pair = self.transport.generate_key_pair()?;
        let session = GroupSession::new(group_id.clone(), initial, key_pair);
        let snapshot = session.snapshot();

        match self.groups.write().map_err(|_| Error::Session)?.entry(group_id) {
            Entry::Occupied(entry) => return Err(Error::DuplicateGroup(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(Mutex::new(session)));
            }
        }

        info!(
            group_id = %snapshot.group_id,
            members = snapshot.members.len(),
            "Group created"
        );
        Ok(snapshot)
    }

    /// Tears a group down. Its key material is zeroized once no operation
    /// still holds the session.
    pub fn delete_group(&self, group_id: &str) -> Result<(), Error> {
        self.groups
            .write()
            .map_err(|_| Error::Session)?
            .remove(group_id)
            .ok_or_else(|| Error::UnknownGroup(group_id.to_string()))?;

        info!(group_id, "Group deleted");
        Ok(())
    }

    /// Adds a member and rekeys the group.
    pub fn add_member(
        &self,
        group_id: &str,
        member: impl Into<String>,
    ) -> Result<EpochChange, Error> {
        let member = member.into();
        let session = self.session(group_id)?;
        let mut session = lock(&session)?;

        self.check_new_member(session.members(), &member)?;

        let mut members = session.members().to_vec();
        members.push(member.clone());

        self.advance_epoch(
            &mut session,
            group_id,
            members,
            MembershipChange::MemberAdded(member),
        )
    }

    /// Removes a member and rekeys the group.
    ///
    /// Every occurrence of the identifier is removed. Fails without touching
    /// the group if that would leave it empty.
    pub fn remove_member(&self, group_id: &str, member: &str) -> Result<EpochChange, Error> {
        let session = self.session(group_id)?;
        let mut session = lock(&session)?;

        if !session.members().iter().any(|existing| existing == member) {
            return Err(Error::UnknownMember(member.to_string()));
        }

        let members: Vec<String> = session
            .members()
            .iter()
            .filter(|existing| existing.as_str() != member)
            .cloned()
            .collect();
        if members.is_empty() {
            return Err(Error::LastMember);
        }

        self.advance_epoch(
            &mut session,
            group_id,
            members,
            MembershipChange::MemberRemoved(member.to_string()),
        )
    }

    /// Generates the next epoch's key pair, then commits it with the new
    /// membership. A failed key generation leaves the session untouched.
    fn advance_epoch(
        &self,
        session: &mut GroupSession,
        group_id: &str,
        members: Vec<String>,
        trigger: MembershipChange,
    ) -> Result<EpochChange, Error> {
        let key_pair = self.transport.generate_key_pair()?;
        let public_key = key_pair.public_key().clone();
        let previous_epoch = session.advance_epoch(members, key_pair);

        let change = EpochChange {
            group_id: group_id.to_string(),
            previous_epoch,
            epoch: session.epoch(),
            trigger,
            members: session.members().to_vec(),
            public_key,
        };

        info!(
            group_id,
            epoch = change.epoch,
            trigger = %change.trigger,
            key = %change.public_key.fingerprint(),
            "Epoch advanced"
        );
        Ok(change)
    }

    /// Seals `plaintext` to the group's current epoch and appends the envelope
    /// to the message log.
    ///
    /// The sender label is recorded as given. With the default
    /// [`AcceptAnySender`] verifier it is not authenticated in any way; a
    /// verifier that requires signatures rejects this call, use
    /// [`send_signed_message`](Self::send_signed_message) instead.
    pub fn send_message(
        &self,
        group_id: &str,
        sender: &str,
        plaintext: &[u8],
    ) -> Result<Envelope, Error> {
        self.send(group_id, sender, plaintext, None)
    }

    /// Like [`send_message`](Self::send_message), with a signature over
    /// [`sender_signing_payload`] that the verifier checks and the envelope keeps.
    pub fn send_signed_message(
        &self,
        group_id: &str,
        sender: &str,
        plaintext: &[u8],
        signature: &[u8],
    ) -> Result<Envelope, Error> {
        self.send(group_id, sender, plaintext, Some(signature))
    }

    fn send(
        &self,
        group_id: &str,
        sender: &str,
        plaintext: &[u8],
        signature: Option<&[u8]>,
    ) -> Result<Envelope, Error> {
        let session = self.session(group_id)?;
        let mut session = lock(&session)?;
        let epoch = session.epoch();

        let claim = SenderClaim {
            group_id,
            epoch,
            sender,
            plaintext,
            signature,
        };
        self.verifier.verify(&claim).inspect_err(|err| {
            warn!(group_id, epoch, sender, %err, "Sender rejected");
        })?;

        let info = message_info(&self.config.info_label, group_id, epoch)?;
        let sealed = self
            .transport
            .seal(session.key_pair().public_key(), &info, &[], plaintext)?;

        let envelope = Envelope::new(
            epoch,
            sender,
            sealed.ciphertext,
            sealed.encapsulated_key,
            signature.map(<[u8]>::to_vec),
        );
        session.append(envelope.clone());

        debug!(
            group_id,
            epoch,
            sender,
            ciphertext_len = envelope.ciphertext().len(),
            "Message sent"
        );
        Ok(envelope)
    }

    /// Opens a message with the group's current private key.
    ///
    /// Ciphertext sealed in an earlier epoch fails with [`Error::Decryption`]:
    /// the key it was sealed to is gone.
    ///
    /// No sender is attached to a bare ciphertext, so nothing is verified here
    /// even when the configured verifier requires signatures. Use
    /// [`receive_envelope`](Self::receive_envelope) to have the sender checked.
    pub fn receive_message(
        &self,
        group_id: &str,
        ciphertext: &[u8],
        encapsulated_key: Option<&[u8]>,
    ) -> Result<Vec<u8>, Error> {
        let (_, plaintext) = self.open(group_id, ciphertext, encapsulated_key)?;
        Ok(plaintext)
    }

    /// Opens under the current epoch and returns that epoch with the plaintext.
    fn open(
        &self,
        group_id: &str,
        ciphertext: &[u8],
        encapsulated_key: Option<&[u8]>,
    ) -> Result<(u64, Vec<u8>), Error> {
        let session = self.session(group_id)?;
        let encapsulated_key = encapsulated_key
            .filter(|key| !key.is_empty())
            .ok_or(Error::MissingEncapsulation)?;

        let session = lock(&session)?;
        let epoch = session.epoch();
        let info = message_info(&self.config.info_label, group_id, epoch)?;

        let plaintext = self
            .transport
            .open(
                session.key_pair().private_key(),
                encapsulated_key,
                &info,
                &[],
                ciphertext,
            )
            .inspect_err(|_| warn!(group_id, epoch, "Message could not be opened"))?;

        debug!(
            group_id,
            epoch,
            plaintext_len = plaintext.len(),
            "Message received"
        );
        Ok((epoch, plaintext))
    }

    /// Opens an envelope.
    ///
    /// The envelope must name the epoch it opened under, otherwise it fails
    /// with [`Error::Decryption`]. When the verifier requires signatures, the
    /// sender and signature are checked against the recovered plaintext and
    /// that epoch.
    pub fn receive_envelope(&self, group_id: &str, envelope: &Envelope) -> Result<Vec<u8>, Error> {
        let (epoch, plaintext) = self.open(
            group_id,
            envelope.ciphertext(),
            Some(envelope.encapsulated_key()),
        )?;

        if envelope.epoch() != epoch {
            warn!(
                group_id,
                epoch,
                claimed_epoch = envelope.epoch(),
                "Envelope epoch does not match"
            );
            return Err(Error::Decryption);
        }

        if self.verifier.requires_signature() {
            let claim = SenderClaim {
                group_id,
                epoch,
                sender: envelope.sender(),
                plaintext: &plaintext,
                signature: envelope.signature(),
            };
            self.verifier.verify(&claim).inspect_err(|err| {
                warn!(group_id, sender = envelope.sender(), %err, "Envelope sender rejected");
            })?;
        }

        Ok(plaintext)
    }

    /// Current epoch of a group.
    pub fn epoch(&self, group_id: &str) -> Result<u64, Error> {
        let session = self.session(group_id)?;
        let epoch = lock(&session)?.epoch();
        Ok(epoch)
    }

    /// Members of a group, in join order.
    pub fn members(&self, group_id: &str) -> Result<Vec<String>, Error> {
        let session = self.session(group_id)?;
        let members = lock(&session)?.members().to_vec();
        Ok(members)
    }

    /// Copy of a group's message log.
    pub fn message_log(&self, group_id: &str) -> Result<Vec<Envelope>, Error> {
        let session = self.session(group_id)?;
        let log = lock(&session)?.message_log().to_vec();
        Ok(log)
    }

    /// Public view of a group's state.
    pub fn snapshot(&self, group_id: &str) -> Result<GroupSnapshot, Error> {
        let session = self.session(group_id)?;
        let snapshot = lock(&session)?.snapshot();
        Ok(snapshot)
    }

    /// Identifiers of all registered groups, sorted.
    pub fn group_ids(&self) -> Result<Vec<String>, Error> {
        let mut ids: Vec<String> = self
            .groups
            .read()
            .map_err(|_| Error::Session)?
            .keys()
            .cloned()
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Whether a group is registered under `group_id`.
    pub fn contains(&self, group_id: &str) -> Result<bool, Error> {
        Ok(self
            .groups
            .read()
            .map_err(|_| Error::Session)?
            .contains_key(group_id))
    }

    /// Number of registered groups.
    pub fn len(&self) -> Result<usize, Error> {
        Ok(self.groups.read().map_err(|_| Error::Session)?.len())
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }
}
