//! Identities tie a [`Node`] to the signing key currently controlling it.
//!
//! Everything here can be done with a `Node` and a key passed around side by
//! side. An `Identity` just keeps the two together so the key that signs is
//! always the key the chains say it should be.

use crate::{
    chain::{Block, Options},
    crypto::{
        keychain::KeyProvider,
        sign::{Info, Signer},
    },
    error::{Error, Result},
    node::{Node, WebOfTrust},
    util::ser::BinaryVec,
};
use rand::{CryptoRng, RngCore};

/// A node and its controlling key.
#[derive(Debug, Clone, getset::Getters)]
#[getset(get = "pub")]
pub struct Identity<K> {
    /// Our chains and backup keys.
    node: Node,
    /// The key that controls `node`.
    key: K,
}

impl<K: Signer + Clone> Identity<K> {
    /// Create an identity that starts its own chain.
    pub fn new_root(key: K, options: Options) -> Self {
        Self {
            node: Node::new_root(key.info(), options),
            key,
        }
    }

    /// Create an identity that waits to be invited.
    pub fn new(key: K) -> Self {
        Self { node: Node::new(), key }
    }

    /// Bind an existing node (for instance one loaded from storage) to its
    /// key.
    pub fn from_parts(node: Node, key: K) -> Self {
        Self { node, key }
    }

    /// Break this identity back into its node and key.
    pub fn into_parts(self) -> (Node, K) {
        (self.node, self.key)
    }

    /// Our key's public info.
    pub fn info(&self) -> Info {
        self.key.info()
    }

    /// Invite `invitee` into our chains.
    pub fn invite<T: Signer + Clone>(&self, invitee: Identity<T>, options: Options) -> Result<Identity<T>> {
        let node = self.node.invite(&self.key, &invitee.node, &invitee.key.info(), options)?;
        Ok(Identity { node, key: invitee.key })
    }

    /// Invite `invitee` through a one-time key minted by `keys`, so our own
    /// key never signs the invitee's block.
    pub fn invite_with_rotate_key<T, P>(&self, invitee: Identity<T>, keys: &mut P, options: Options) -> Result<Identity<T>>
    where
        T: Signer + Clone,
        P: KeyProvider,
    {
        let rotating_key = keys.generate()?;
        let node = self
            .node
            .invite_with_rotate_key(&self.key, &rotating_key, &invitee.node, &invitee.key.info(), options)?;
        Ok(Identity { node, key: invitee.key })
    }

    /// Move this identity to `new_key`.
    pub fn rotate_key(&self, new_key: K) -> Result<Self> {
        let node = self.node.rotate_key(&self.key, &new_key.info())?;
        Ok(Self { node, key: new_key })
    }

    /// Declare `count` backup keys, rooted at our current key.
    pub fn create_backup_keys<P: KeyProvider>(&self, count: usize, keys: &mut P) -> Result<Self> {
        let node = self.node.create_backup_keys(count, Some(&self.key), keys)?;
        Ok(Self {
            node,
            key: self.key.clone(),
        })
    }

    /// Hand this identity over to the backup key at `index`.
    pub fn rotate_to_backup_key<P: KeyProvider<Key = K>>(&self, index: u32, keys: &P) -> Result<Self> {
        let (node, key) = self.node.rotate_to_backup_key(index, keys)?;
        Ok(Self { node, key })
    }

    /// How we relate to `other`.
    pub fn web_of_trust<T>(&self, other: &Identity<T>) -> WebOfTrust {
        self.node.web_of_trust_info(&other.node)
    }

    /// Challenge whoever claims to be the owner of our first chain's leaf.
    /// `sign_fn` carries the challenge to them and brings the answer back.
    pub fn challenge<R, F>(&self, rng: &mut R, pin_code: i64, sign_fn: F) -> Result<bool>
    where
        R: RngCore + CryptoRng,
        F: FnOnce(&[u8]) -> Result<BinaryVec>,
    {
        let chain = self.node.invitee_chains().first().ok_or(Error::NodeEmpty)?;
        Ok(chain.challenge(rng, pin_code, sign_fn))
    }

    /// Answer someone's challenge with our key.
    pub fn answer_challenge(&self, challenge: &[u8], pin_code: i64) -> Result<BinaryVec> {
        Block::answer_challenge(challenge, pin_code, &self.key)
    }

    /// See [`Node::resolver`].
    pub fn resolver(&self) -> Option<&str> {
        self.node.resolver()
    }

    /// See [`Node::endpoint`].
    pub fn endpoint(&self, public_key: &[u8]) -> Option<&str> {
        self.node.endpoint(public_key)
    }
}
