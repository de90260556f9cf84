//! The main error enum for the project lives here, and documents the various
//! conditions that can arise while interacting with the system.

use thiserror::Error;

/// This is our error enum. It contains an entry for any part of the system in
/// which an expectation is not met or a problem occurs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A byte slice had the wrong length for the type it's being read into.
    #[error("bad length")]
    BadLength,

    /// Tried to create backup keys on a node that already has them. Backup
    /// keys can only be declared once.
    #[error("backup keys already exist for this node")]
    BackupKeysExist,

    /// Asked for a number of backup keys outside of the allowed range.
    #[error("backup key count {0} is outside the allowed range")]
    BackupKeysCount(usize),

    /// The node has no backup keys but an operation needs them.
    #[error("this node has no backup keys")]
    BackupKeysMissing,

    /// A backup key index that doesn't point at a usable backup key. Index 0
    /// is the controlling key that declared the backup chain, so it is never
    /// usable for rotation.
    #[error("backup key index {0} is invalid")]
    BackupKeyIndex(u32),

    /// The key provider doesn't hold the private half of a backup key.
    #[error("backup key not found in the key provider")]
    BackupKeyNotFound,

    /// Tried to extend a chain with a key that doesn't control its leaf.
    #[error("the inviter does not control the chain's leaf key")]
    ChainInviterNotLeaf,

    /// A chain must always have at least its root block.
    #[error("a chain must contain at least one block")]
    ChainEmpty,

    /// Bad key.
    #[error("key is invalid")]
    CryptoBadKey,

    /// A key is missing from a crypto operation
    #[error("crypto key missing")]
    CryptoKeyMissing,

    /// A signature failed to verify.
    #[error("the given signature/public key/data combo does not verify")]
    CryptoSignatureVerificationFailed,

    /// An error while engaging in deserialization.
    #[error("deserialization error: {0}")]
    Deserialize(String),

    /// An error while engaging in deserialization.
    #[error("deserialization error")]
    DeserializeBase64(#[from] base64::DecodeError),

    /// A node's invitee chains were verified but one of them is signed
    /// incorrectly.
    #[error("node integrity: wrong signature")]
    IntegritySignature,

    /// A node's backup key chain failed verification.
    #[error("node integrity: invalid backup key chain")]
    IntegrityBackupKeys,

    /// A node's invitee chains don't all end at the same identity key.
    #[error("node integrity: wrong public key")]
    IntegrityWrongKey,

    /// The node needs a controlling key for this operation but none was given.
    #[error("a controlling key is required because the node already belongs to chains")]
    NodeControllingKeyMissing,

    /// The given controlling key isn't the node's current identity key.
    #[error("the controlling key does not match the node's identity key")]
    NodeControllingKeyMismatch,

    /// The node doesn't belong to any chain yet.
    #[error("the node has no invitee chains")]
    NodeEmpty,

    /// An error while engaging in binary serialization.
    #[error("serialization error: {0}")]
    Serialize(String),

    /// An error while engaging in yaml serialization.
    #[error("yaml serialization error: {0}")]
    SerializeYaml(String),
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Self::SerializeYaml(err.to_string())
    }
}

/// Wraps `std::result::Result` around our `Error` enum
pub type Result<T> = std::result::Result<T, Error>;
