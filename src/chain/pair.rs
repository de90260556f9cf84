//! Two chains sharing a root, viewed from one side.

use crate::{chain::Chain, hop::Distance, util::ser::BinaryVec};

/// A pair of chains with the same root: `chain1` belongs to "us" and `chain2`
/// to whoever we're comparing against.
#[derive(Debug, Clone, Copy)]
pub struct Pair<'a> {
    chain1: &'a Chain,
    chain2: &'a Chain,
}

impl<'a> Pair<'a> {
    /// Pair up two chains.
    pub fn new(chain1: &'a Chain, chain2: &'a Chain) -> Self {
        Self { chain1, chain2 }
    }

    /// Our chain.
    pub fn chain1(&self) -> &'a Chain {
        self.chain1
    }

    /// Their chain.
    pub fn chain2(&self) -> &'a Chain {
        self.chain2
    }

    /// See [`Chain::hops`].
    pub fn hops(&self) -> (Distance, Distance) {
        Chain::hops(self.chain1, self.chain2)
    }

    /// See [`Chain::one_hop`].
    pub fn one_hop(&self) -> bool {
        Chain::one_hop(self.chain1, self.chain2)
    }

    /// See [`Chain::same_root`].
    pub fn same_root(&self) -> bool {
        Chain::same_root(self.chain1, self.chain2)
    }

    /// See [`Chain::common_inviter_level`].
    pub fn common_inviter_level(&self) -> (Distance, bool) {
        Chain::common_inviter_level(self.chain1, self.chain2)
    }

    /// The public key of the block at `level` in our chain, which (for a level
    /// returned by [`common_inviter_level`][Pair::common_inviter_level]) is the
    /// closest inviter both chains share.
    pub fn common_inviter_key(&self, level: Distance) -> Option<&'a BinaryVec> {
        if !level.is_connected() {
            return None;
        }
        let idx = usize::try_from(level.value()).ok()?;
        self.chain1.blocks().get(idx).map(|b| b.public_key())
    }
}
