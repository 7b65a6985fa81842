use crate::Aead;

/// What to do when a member that is already in the group is added again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicateMemberPolicy {
    /// Fail with [`Error::DuplicateMember`](crate::Error::DuplicateMember).
    #[default]
    Reject,
    /// Append the identifier again. Removal then drops every occurrence.
    Allow,
}

/// Settings shared by every group in a [`GroupRegistry`](crate::GroupRegistry).
#[derive(Clone, Debug)]
pub struct GroupConfig {
    /// Cipher used to seal message payloads.
    pub aead: Aead,
    /// Handling of repeated member identifiers.
    pub duplicate_members: DuplicateMemberPolicy,
    /// Upper bound on the number of members in one group.
    pub max_members: usize,
    /// Prefix of the HPKE `info` that binds each message to its group and epoch.
    pub info_label: Vec<u8>,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            aead: Aead::ChaCha20Poly1305,
            duplicate_members: DuplicateMemberPolicy::Reject,
            max_members: 1024,
            info_label: b"cohort group message v1".to_vec(),
        }
    }
}
