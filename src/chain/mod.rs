//! Invitation chains.
//!
//! A chain is an append-only list of [`Block`]s starting at a root. Every
//! block after the root is signed by the key of the block before it (or, when
//! its options say so, by one of the signer's backup keys) and links to the
//! previous block by hash. The last block is the chain's *leaf*: the identity
//! the chain belongs to.
//!
//! Comparing two chains with the same root tells us how far apart their
//! owners are in the invitation tree: see [`Chain::hops`].

mod block;
mod options;
mod pair;

pub use block::Block;
pub use options::Options;
pub use pair::Pair;

use crate::{
    crypto::{
        base::verify,
        sign::{Info, Signer},
    },
    error::{Error, Result},
    hop::Distance,
    util::{
        equal_bytes,
        ser::{self, BinaryVec},
    },
};
use rand::{CryptoRng, RngCore};
use rasn::{AsnType, Decode, Encode};
use serde_derive::{Deserialize, Serialize};
use tracing::debug;

/// A non-empty, append-only list of blocks from a root to a leaf.
#[derive(Debug, Clone, PartialEq, Eq, AsnType, Encode, Decode, Serialize, Deserialize, getset::Getters, getset::MutGetters)]
#[getset(get = "pub", get_mut = "pub(crate)")]
pub struct Chain {
    #[rasn(tag(explicit(0)))]
    blocks: Vec<Block>,
}

impl Chain {
    /// Start a new chain with a single root block.
    pub fn new(root: Info, options: Options) -> Self {
        Self {
            blocks: vec![Block::new_root(root, options)],
        }
    }

    fn non_empty(self) -> Result<Self> {
        if self.blocks.is_empty() {
            Err(Error::ChainEmpty)?;
        }
        Ok(self)
    }

    /// Serialize to the binary (DER) format.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        ser::serialize(self)
    }

    /// Deserialize from the binary format.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ser::deserialize::<Self>(bytes)?.non_empty()
    }

    /// Serialize to the human-readable format.
    pub fn serialize_text(&self) -> Result<String> {
        ser::serialize_text(self)
    }

    /// Deserialize from the human-readable format.
    pub fn deserialize_text(slice: &[u8]) -> Result<Self> {
        ser::deserialize_text::<Self>(slice)?.non_empty()
    }

    /// Number of blocks, root included. Never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// The root block.
    pub fn first_block(&self) -> &Block {
        &self.blocks[0]
    }

    /// The leaf block.
    pub fn last_block(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
    }

    /// The leaf's inviter, if the chain is longer than its root.
    pub fn second_last_block(&self) -> Option<&Block> {
        let idx = self.blocks.len().checked_sub(2)?;
        self.blocks.get(idx)
    }

    /// Who this chain belongs to.
    pub fn leaf(&self) -> &Info {
        self.last_block().invitee()
    }

    /// The public key of whoever this chain belongs to.
    pub fn leaf_public_key(&self) -> &BinaryVec {
        self.last_block().public_key()
    }

    /// Extend the chain with a block inviting `invitee`, signed by `inviter`.
    ///
    /// The inviter must control the leaf key, unless `options` marks the
    /// block as signed by a backup key.
    pub fn invite<S: Signer + ?Sized>(&self, inviter: &S, invitee: Info, options: Options) -> Result<Chain> {
        if !options.is_backup_signed() && !inviter.controls(self.leaf_public_key()) {
            Err(Error::ChainInviterNotLeaf)?;
        }
        let hash_to_prev = BinaryVec::from(self.last_block().hash()?);
        let block = Block::new_unsigned(hash_to_prev, invitee, options).sign(inviter)?;
        let mut chain = self.clone();
        chain.blocks.push(block);
        Ok(chain)
    }

    /// Verify every link of the chain. Backup-signed blocks fail here because
    /// there's no way to look up backup keys: use
    /// [`verify_sign_with`][Chain::verify_sign_with] for those.
    pub fn verify_sign(&self) -> bool {
        self.verify_sign_with(|_| None)
    }

    /// Verify every link of the chain, using `get_backup_key` to find the
    /// public key for blocks signed by a backup key.
    ///
    /// Each block must link to the hash of the one before it and carry a valid
    /// signature from the previous block's key. Stops at the first failure.
    pub fn verify_sign_with<F>(&self, get_backup_key: F) -> bool
    where
        F: Fn(u32) -> Option<BinaryVec>,
    {
        for (idx, pair) in self.blocks.windows(2).enumerate() {
            let (prev, block) = (&pair[0], &pair[1]);
            let linked = match prev.hash() {
                Ok(hash) => equal_bytes(hash.as_bytes(), block.hash_to_prev()),
                Err(_) => false,
            };
            if !linked {
                debug!(block = idx + 1, "chain link hash mismatch");
                return false;
            }
            let valid = if block.options().is_backup_signed() {
                match get_backup_key(*block.options().backup_key_index()) {
                    Some(key) => block.verify_sign(&key),
                    None => false,
                }
            } else {
                block.verify_sign(prev.public_key())
            };
            if !valid {
                debug!(block = idx + 1, "chain block signature invalid");
                return false;
            }
        }
        true
    }

    /// Verify a chain that only ever moves control of one identity between
    /// keys (a backup key chain): every block must be a rotation block and
    /// every link must verify.
    pub fn verify_id_chain(&self) -> bool {
        self.blocks.iter().all(|b| *b.options().rotation()) && self.verify_sign()
    }

    /// Whether the two chains start at the same root block.
    pub fn same_root(c1: &Chain, c2: &Chain) -> bool {
        c1.first_block() == c2.first_block()
    }

    /// Whether both leaves were invited by the same block.
    pub fn same_inviter(c1: &Chain, c2: &Chain) -> bool {
        match (c1.second_last_block(), c2.second_last_block()) {
            (Some(b1), Some(b2)) => b1 == b2,
            _ => false,
        }
    }

    /// Find how far down from the root the two chains agree.
    ///
    /// Returns the index of the last shared block and whether one chain is a
    /// prefix of the other (`true` when the shorter chain is fully shared).
    /// Chains with different roots are not connected.
    pub fn common_inviter_level(c1: &Chain, c2: &Chain) -> (Distance, bool) {
        if !Self::same_root(c1, c2) {
            return (Distance::not_connected(), false);
        }
        let shorter = c1.len().min(c2.len());
        let mut level = 0;
        for i in 1..shorter {
            if c1.blocks[i] != c2.blocks[i] {
                return (Distance::from(i - 1), false);
            }
            level = i;
        }
        (Distance::from(level), true)
    }

    /// Whether `c1`'s leaf directly invited `c2`'s leaf.
    pub fn is_inviter_for(c1: &Chain, c2: &Chain) -> bool {
        c2.second_last_block().map_or(false, |inviter| inviter == c1.last_block())
    }

    /// Whether either leaf directly invited the other.
    pub fn one_hop(c1: &Chain, c2: &Chain) -> bool {
        Self::is_inviter_for(c1, c2) || Self::is_inviter_for(c2, c1)
    }

    /// The number of invitation hops between the two leaves, along with the
    /// common inviter level.
    ///
    /// A direct invitation is one hop. Otherwise the route goes up from one
    /// leaf to the closest shared block and back down to the other.
    pub fn hops(c1: &Chain, c2: &Chain) -> (Distance, Distance) {
        let (common, _) = Self::common_inviter_level(c1, c2);
        if !common.is_connected() {
            return (Distance::not_connected(), Distance::not_connected());
        }
        if Self::one_hop(c1, c2) {
            return (Distance::new(1), common);
        }
        let up = c1.len() as i64 - 1 - common.value();
        let down = c2.len() as i64 - 1 - common.value();
        (Distance::new(up + down), common)
    }

    /// Find the first block inviting `public_key` and its level in the chain.
    pub fn find(&self, public_key: &[u8]) -> Option<(&Block, Distance)> {
        self.blocks
            .iter()
            .enumerate()
            .find(|(_, b)| equal_bytes(b.public_key(), public_key))
            .map(|(idx, b)| (b, Distance::from(idx)))
    }

    /// The level of `public_key` in the chain.
    pub fn find_level(&self, public_key: &[u8]) -> Distance {
        self.find(public_key).map(|(_, lvl)| lvl).unwrap_or_default()
    }

    /// The endpoint of the first block advertising itself as a resolver.
    pub fn resolver(&self) -> Option<&str> {
        self.blocks
            .iter()
            .find(|b| *b.options().resolver())
            .map(|b| b.options().endpoint().as_str())
    }

    /// Prove that whoever is behind `sign_fn` controls our leaf key.
    ///
    /// `sign_fn` is handed a freshly randomized challenge block, and must
    /// return a signature over that block with its position set to
    /// `pin_code` (see [`Block::answer_challenge`]). Any failure along the
    /// way, including an error from `sign_fn`, is a failed challenge.
    pub fn challenge<R, F>(&self, rng: &mut R, pin_code: i64, sign_fn: F) -> bool
    where
        R: RngCore + CryptoRng,
        F: FnOnce(&[u8]) -> Result<BinaryVec>,
    {
        let (challenge, answer) = Block::new_verify_block(rng, pin_code);
        let (challenge_bytes, answer_bytes) = match (challenge.bytes(), answer.bytes()) {
            (Ok(c), Ok(a)) => (c, a),
            _ => return false,
        };
        match sign_fn(&challenge_bytes) {
            Ok(sig) => verify(self.leaf_public_key(), &sig, &answer_bytes).is_ok(),
            Err(e) => {
                debug!(error = %e, "challenge signer failed");
                false
            }
        }
    }
}
