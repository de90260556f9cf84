//! Key provisioning.
//!
//! Backup keys are minted in bulk and then sit unused until the day they're
//! needed, at which point the node only knows their public [`Info`]. A
//! [`KeyProvider`] is the thing that can mint keys and later hand back the
//! signing half of a key given its public info.

use crate::{
    crypto::{
        base::{rng_chacha20, SignKeypair},
        sign::{Info, Signer},
    },
    error::Result,
    util::{equal_bytes, ser::BinaryVec},
};
use rand::{CryptoRng, RngCore};
use std::collections::HashMap;

/// Mints signing keys and finds them again later.
pub trait KeyProvider {
    /// The kind of signing key this provider hands out.
    type Key: Signer + Clone;

    /// Create and remember a brand new key.
    fn generate(&mut self) -> Result<Self::Key>;

    /// Find the key matching the given public info, if we have it.
    fn find(&self, info: &Info) -> Option<Self::Key>;
}

/// An in-memory [`KeyProvider`] holding ed25519 keypairs, indexed by key id.
pub struct Keychain<R = rand_chacha::ChaCha20Rng> {
    rng: R,
    keys: HashMap<BinaryVec, SignKeypair>,
}

impl Keychain {
    /// Create an empty keychain backed by an OS-seeded ChaCha20 RNG.
    pub fn new() -> Self {
        Self::with_rng(rng_chacha20())
    }
}

impl Default for Keychain {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore + CryptoRng> Keychain<R> {
    /// Create an empty keychain that mints keys with the given RNG.
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            keys: HashMap::new(),
        }
    }

    /// Remember an existing keypair.
    pub fn insert(&mut self, keypair: SignKeypair) {
        self.keys.insert(keypair.id(), keypair);
    }

    /// How many keys we're holding.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether we're holding any keys at all.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<R: RngCore + CryptoRng> KeyProvider for Keychain<R> {
    type Key = SignKeypair;

    fn generate(&mut self) -> Result<Self::Key> {
        let keypair = SignKeypair::new_ed25519(&mut self.rng);
        self.insert(keypair.clone());
        Ok(keypair)
    }

    fn find(&self, info: &Info) -> Option<Self::Key> {
        self.keys
            .get(info.id())
            .filter(|k| equal_bytes(&k.public_key(), info.public_key()))
            .cloned()
    }
}
