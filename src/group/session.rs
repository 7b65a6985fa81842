use crate::group::epoch::GroupSnapshot;
use crate::{Envelope, KeyPair};

/// Per-group state: membership, epoch counter, current key material and the
/// append-only message log.
///
/// Only the current epoch's key pair is held. Replacing it drops the previous
/// private key, which zeroizes it.
pub(crate) struct GroupSession {
    group_id: String,
    epoch: u64,
    members: Vec<String>,
    key_pair: KeyPair,
    message_log: Vec<Envelope>,
}

impl GroupSession {
    pub(crate) fn new(group_id: String, members: Vec<String>, key_pair: KeyPair) -> Self {
        Self {
            group_id,
            epoch: 0,
            members,
            key_pair,
            message_log: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    #[inline]
    pub(crate) fn members(&self) -> &[String] {
        &self.members
    }

    #[inline]
    pub(crate) fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    #[inline]
    pub(crate) fn message_log(&self) -> &[Envelope] {
        &self.message_log
    }

    /// Commits a membership change together with the key pair generated for the
    /// next epoch. Returns the epoch that was left.
    pub(crate) fn advance_epoch(&mut self, members: Vec<String>, key_pair: KeyPair) -> u64 {
        let previous = self.epoch;
        self.members = members;
        self.key_pair = key_pair;
        self.epoch += 1;
        previous
    }

    pub(crate) fn append(&mut self, envelope: Envelope) {
        self.message_log.push(envelope);
    }

    pub(crate) fn snapshot(&self) -> GroupSnapshot {
        GroupSnapshot {
            group_id: self.group_id.clone(),
            epoch: self.epoch,
            members: self.members.clone(),
            public_key: self.key_pair.public_key().clone(),
            message_count: self.message_log.len(),
        }
    }
}
