/// Errors that can occur during group session, transport and codec operations.
#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
pub enum Error {
    /// No group is registered under the given identifier.
    #[error("Group '{0}' does not exist")]
    UnknownGroup(String),

    /// A group with the given identifier is already registered.
    #[error("Group '{0}' already exists")]
    DuplicateGroup(String),

    /// A group cannot be created without members.
    #[error("A group needs at least one member")]
    EmptyGroup,

    /// The member is already part of the group.
    #[error("Member '{0}' is already in the group")]
    DuplicateMember(String),

    /// The member is not part of the group.
    #[error("Member '{0}' is not in the group")]
    UnknownMember(String),

    /// Removing the member would leave the group empty.
    #[error("Cannot remove the last member of the group")]
    LastMember,

    /// The group already holds the configured maximum number of members.
    #[error("Group is full ({0} members)")]
    GroupFull(usize),

    /// A message was received without its encapsulated key.
    #[error("Encapsulation key is missing")]
    MissingEncapsulation,

    /// Opening a sealed message failed.
    ///
    /// Deliberately carries no detail: a wrong key, a corrupted ciphertext and a
    /// malformed encapsulation are indistinguishable to the caller.
    #[error("Decryption failed")]
    Decryption,

    /// The configured sender verifier rejected the claimed sender.
    #[error("Sender '{0}' could not be authenticated")]
    UnauthenticatedSender(String),

    /// Input bytes do not follow the canonical wire encoding.
    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),

    /// The value cannot be represented as a variable-length integer.
    #[error("Value {0} is out of range for varint encoding")]
    Range(u64),

    /// A cryptographic operation failed.
    #[error("Cryptographic operation failed: {0}")]
    Crypto(String),

    /// Random number generation failed.
    #[error("Random number generation failed")]
    Random,

    /// Session state is unusable (a lock was poisoned by a panicking holder).
    #[error("Session state error")]
    Session,
}
