use crate::util::ser::{self, BinaryVec};

/// A cryptographic hash. By defining this as an enum, we allow expansion of
/// hash algorithms in the future.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Hash {
    /// Blake3 256bit hash
    Blake3([u8; 32]),
}

impl Hash {
    /// Create a new blake3 hash from a message
    pub fn new_blake3(message: &[u8]) -> Self {
        Self::Blake3(*blake3::hash(message).as_bytes())
    }

    /// Return the byte slice representing this hash.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Blake3(bytes) => &bytes[..],
        }
    }
}

impl From<Hash> for BinaryVec {
    fn from(hash: Hash) -> Self {
        BinaryVec::from(hash.as_bytes())
    }
}

impl std::fmt::Display for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", ser::base64_encode(self.as_bytes()))
    }
}
