//! Compact summaries of where a node sits relative to some root.

use crate::{
    error::Result,
    hop::Distance,
    util::ser::{self, BinaryVec},
};
use rasn::{AsnType, Decode, Encode};
use serde_derive::{Deserialize, Serialize};

/// A node's position relative to a root identity, small enough to hand out
/// instead of the full chains. Someone else can compute a web-of-trust
/// estimate from it with [`Node::wot_from_digest`][crate::node::Node::wot_from_digest].
#[derive(Debug, Clone, PartialEq, Eq, AsnType, Encode, Decode, Serialize, Deserialize, getset::Getters)]
#[getset(get = "pub")]
pub struct Digest {
    /// Public key of the node the digest describes.
    #[rasn(tag(explicit(0)))]
    idk: BinaryVec,
    /// Public key of the reference identity.
    #[rasn(tag(explicit(1)))]
    root_idk: BinaryVec,
    /// Hops from the reference identity to the node.
    #[rasn(tag(explicit(2)))]
    hops: Distance,
}

impl Digest {
    /// Create a digest.
    pub fn new(idk: BinaryVec, root_idk: BinaryVec, hops: Distance) -> Self {
        Self { idk, root_idk, hops }
    }

    /// Serialize to the binary format.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        ser::serialize(self)
    }

    /// Deserialize from the binary format.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ser::deserialize(bytes)
    }
}
