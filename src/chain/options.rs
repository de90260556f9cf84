//! Per-block link options.

use rasn::{AsnType, Decode, Encode};
use serde_derive::{Deserialize, Serialize};

/// The options carried (and signed) in every block. Once a block is signed
/// its options can't change without breaking the signature.
///
/// Build these with the chained `with_*` methods:
///
/// ```
/// use ic_core::chain::Options;
/// let opts = Options::default().with_position(1).with_resolver("tcp://10.0.0.1:4000");
/// assert_eq!(*opts.position(), 1);
/// assert!(*opts.resolver());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, AsnType, Encode, Decode, Serialize, Deserialize, getset::Getters, getset::Setters)]
#[getset(get = "pub", set = "pub(crate)")]
pub struct Options {
    /// Free-form position of the invitee. Also carries the pin code in
    /// challenge blocks.
    #[rasn(tag(explicit(0)))]
    position: i64,
    /// This block transfers control of an identity to a new key rather than
    /// inviting someone new.
    #[rasn(tag(explicit(1)))]
    rotation: bool,
    /// The invitee allows its chain to be used for routing.
    #[rasn(tag(explicit(2)))]
    allow_routing: bool,
    /// The `endpoint` is a resolver service others can use.
    #[rasn(tag(explicit(3)))]
    resolver: bool,
    /// A reachable service address for the invitee (may be empty).
    #[rasn(tag(explicit(4)))]
    endpoint: String,
    /// Non-zero when this block is signed by the backup key at this index in
    /// the signer's backup key chain instead of by the previous block's key.
    #[rasn(tag(explicit(5)))]
    backup_key_index: u32,
}

impl Options {
    /// Set the position.
    pub fn with_position(mut self, position: i64) -> Self {
        self.position = position;
        self
    }

    /// Mark as a rotation block.
    pub fn with_rotation(mut self) -> Self {
        self.rotation = true;
        self
    }

    /// Allow (or disallow) routing.
    pub fn with_allow_routing(mut self, allow: bool) -> Self {
        self.allow_routing = allow;
        self
    }

    /// Publish an endpoint without advertising it as a resolver.
    pub fn with_endpoint<T: Into<String>>(mut self, endpoint: T) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Publish an endpoint and advertise it as a resolver.
    pub fn with_resolver<T: Into<String>>(mut self, endpoint: T) -> Self {
        self.resolver = true;
        self.endpoint = endpoint.into();
        self
    }

    /// Mark the block as signed by the backup key at `index`.
    pub fn with_backup_key_index(mut self, index: u32) -> Self {
        self.backup_key_index = index;
        self
    }

    /// Whether the block was signed by a backup key.
    pub fn is_backup_signed(&self) -> bool {
        self.backup_key_index != 0
    }
}
