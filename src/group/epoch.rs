use crate::HpkePublicKey;

/// Membership change that caused an epoch advance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MembershipChange {
    /// A member joined. Contains the member's identifier.
    MemberAdded(String),
    /// A member left. Contains the member's identifier.
    MemberRemoved(String),
}

impl std::fmt::Display for MembershipChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MembershipChange::MemberAdded(id) => write!(f, "MemberAdded({id})"),
            MembershipChange::MemberRemoved(id) => write!(f, "MemberRemoved({id})"),
        }
    }
}

/// Notification returned after a membership change rekeyed a group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EpochChange {
    /// Group that was rekeyed.
    pub group_id: String,
    /// Epoch before the change.
    pub previous_epoch: u64,
    /// Epoch after the change; always `previous_epoch + 1`.
    pub epoch: u64,
    /// What triggered the change.
    pub trigger: MembershipChange,
    /// Members after the change.
    pub members: Vec<String>,
    /// Public key of the new epoch.
    pub public_key: HpkePublicKey,
}

/// Read-only view of a group's state. Carries no private key material.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupSnapshot {
    pub group_id: String,
    pub epoch: u64,
    pub members: Vec<String>,
    pub public_key: HpkePublicKey,
    pub message_count: usize,
}
