//! The signing capability the chains are built on.
//!
//! The chain and node code never touches private keys directly. Anything that
//! can sign bytes and hand out its public key and id can act as an inviter:
//! an in-memory [`SignKeypair`][crate::crypto::base::SignKeypair], a hardware
//! enclave, a remote signer. All of it goes through [`Signer`].

use crate::{
    error::Result,
    util::{equal_bytes, ser::BinaryVec},
};
use rasn::{AsnType, Decode, Encode};
use serde_derive::{Deserialize, Serialize};

/// The public half of a key: its id and public key, bound together so they
/// can be transported as one. Never includes anything private.
#[derive(Debug, Clone, Default, PartialEq, Eq, AsnType, Encode, Decode, Serialize, Deserialize, getset::Getters, getset::Setters)]
#[getset(get = "pub", set = "pub(crate)")]
pub struct Info {
    /// The key's id
    #[rasn(tag(explicit(0)))]
    id: BinaryVec,
    /// The key's public key
    #[rasn(tag(explicit(1)))]
    public_key: BinaryVec,
}

impl Info {
    /// Create a new key info
    pub fn new(id: BinaryVec, public_key: BinaryVec) -> Self {
        Self { id, public_key }
    }
}

/// Something that controls a private key and can sign with it.
pub trait Signer {
    /// Sign a value with our secret signing key, returning a detached
    /// signature.
    fn sign(&self, data: &[u8]) -> Result<BinaryVec>;

    /// Our public key.
    fn public_key(&self) -> BinaryVec;

    /// Our key id.
    fn id(&self) -> BinaryVec;

    /// Our id and public key bundled together.
    fn info(&self) -> Info {
        Info::new(self.id(), self.public_key())
    }

    /// Whether `public_key` is ours.
    fn controls(&self, public_key: &[u8]) -> bool {
        equal_bytes(&self.public_key(), public_key)
    }
}
