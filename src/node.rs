//! Nodes: everything one identity knows about its own place in the world.
//!
//! An identity can be invited into many chains, each with its own root. A
//! [`Node`] collects all of them, along with the (optional) chain of backup
//! keys that can take over the identity if its key is ever lost. Web-of-trust
//! queries compare two nodes chain by chain and keep the best answer.

use crate::{
    chain::{Block, Chain, Options, Pair},
    crypto::{
        keychain::KeyProvider,
        sign::{Info, Signer},
    },
    digest::Digest,
    error::{Error, Result},
    hop::Distance,
    util::{
        equal_bytes,
        ser::{self, BinaryVec},
    },
};
use rasn::{AsnType, Decode, Encode};
use serde_derive::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The fewest backup keys a node can declare, counting the controlling key
/// at the root of the backup chain.
pub const BACKUP_KEYS_MIN: usize = 2;
/// The most backup keys a node can declare.
pub const BACKUP_KEYS_MAX: usize = 12;

/// How two nodes relate to each other.
///
/// The default value is "no common chain": not connected, no common inviter.
#[derive(Debug, Clone, Default, PartialEq, Eq, getset::Getters)]
#[getset(get = "pub")]
pub struct WebOfTrust {
    /// Shortest invitation distance between the two identities.
    hops: Distance,
    /// Whether one identity sits directly on the other's chain (ie, is an
    /// ancestor of it) in the pair that produced `hops`.
    same_chain: bool,
    /// Lowest common inviter level over the shared chains.
    common_inviter_level: Distance,
    /// Public key of the common inviter at that level.
    common_inviter_public_key: BinaryVec,
}

/// All the chains an identity belongs to, plus its backup keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, AsnType, Encode, Decode, Serialize, Deserialize, getset::Getters, getset::MutGetters)]
#[getset(get = "pub", get_mut = "pub(crate)")]
pub struct Node {
    /// One chain per root this identity has been invited under, in the order
    /// they were joined.
    #[rasn(tag(explicit(0)))]
    invitee_chains: Vec<Chain>,
    /// A chain of keys that can take control of this identity. Created once.
    #[rasn(tag(explicit(1)))]
    backup_keys: Option<Chain>,
}

impl Node {
    /// Create a node that starts its own chain, rooted at `identity`.
    pub fn new_root(identity: Info, options: Options) -> Self {
        Self {
            invitee_chains: vec![Chain::new(identity, options)],
            backup_keys: None,
        }
    }

    /// Create a joining node: no chains yet, waiting for an invitation.
    pub fn new() -> Self {
        Self::default()
    }

    fn validate(self) -> Result<Self> {
        if self.invitee_chains.iter().chain(self.backup_keys.iter()).any(|c| c.blocks().is_empty()) {
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
        ser::deserialize::<Self>(bytes)?.validate()
    }

    /// Serialize to the human-readable format.
    pub fn serialize_text(&self) -> Result<String> {
        ser::serialize_text(self)
    }

    /// Deserialize from the human-readable format.
    pub fn deserialize_text(slice: &[u8]) -> Result<Self> {
        ser::deserialize_text::<Self>(slice)?.validate()
    }

    /// How many chains we belong to.
    pub fn len(&self) -> usize {
        self.invitee_chains.len()
    }

    /// Whether we belong to no chains at all.
    pub fn is_empty(&self) -> bool {
        self.invitee_chains.is_empty()
    }

    /// Our identity key (the leaf of our first chain).
    pub fn idk(&self) -> Option<&Info> {
        self.invitee_chains.first().map(|c| c.leaf())
    }

    /// Whether we have a chain sharing `chain`'s root.
    fn shares_root(&self, chain: &Chain) -> bool {
        self.invitee_chains.iter().any(|c| Chain::same_root(c, chain))
    }

    /// A node made only to receive a rotation: one chain holding one root
    /// block marked as a rotation.
    fn is_rotation_stub(&self) -> bool {
        match self.invitee_chains.as_slice() {
            [chain] => chain.len() == 1 && *chain.first_block().options().rotation(),
            _ => false,
        }
    }

    /// Invite `invitee_node` (whose identity is `invitee`) into every chain we
    /// belong to that it doesn't already, returning the invitee's new node.
    ///
    /// `inviter` must control our identity key. We are not modified.
    pub fn invite<S: Signer + ?Sized>(&self, inviter: &S, invitee_node: &Node, invitee: &Info, options: Options) -> Result<Node> {
        self.invite_into(invitee_node, |chain| chain.invite(inviter, invitee.clone(), options.clone()))
    }

    /// Like [`invite`][Node::invite], but routes each invitation through a
    /// one-time `rotating_key` so our identity key doesn't directly sign the
    /// invitee's block: `inviter -> rotating_key -> invitee`.
    pub fn invite_with_rotate_key<S, T>(
        &self,
        inviter: &S,
        rotating_key: &T,
        invitee_node: &Node,
        invitee: &Info,
        options: Options,
    ) -> Result<Node>
    where
        S: Signer + ?Sized,
        T: Signer + ?Sized,
    {
        let rotating_info = rotating_key.info();
        self.invite_into(invitee_node, |chain| {
            chain
                .invite(inviter, rotating_info.clone(), options.clone())?
                .invite(rotating_key, invitee.clone(), options.clone())
        })
    }

    fn invite_into<F>(&self, invitee_node: &Node, extend: F) -> Result<Node>
    where
        F: Fn(&Chain) -> Result<Chain>,
    {
        let mut invitee_chains = Vec::with_capacity(self.len() + invitee_node.len());
        if !invitee_node.is_rotation_stub() {
            invitee_chains.extend(invitee_node.invitee_chains.iter().cloned());
        }
        for chain in &self.invitee_chains {
            if invitee_node.shares_root(chain) {
                debug!(root = %chain.first_block().public_key(), "invitee already belongs to chain, skipping");
                continue;
            }
            invitee_chains.push(extend(chain)?);
        }
        debug!(chains = invitee_chains.len(), "node invited");
        Ok(Node {
            invitee_chains,
            backup_keys: invitee_node.backup_keys.clone(),
        })
    }

    /// Pair each of our chains with a chain of `other`'s sharing the same
    /// root. Our chain is always `chain1`.
    pub fn common_chains<'a>(&'a self, other: &'a Node) -> Vec<Pair<'a>> {
        self.invitee_chains
            .iter()
            .filter_map(|ours| {
                other
                    .invitee_chains
                    .iter()
                    .find(|theirs| Chain::same_root(ours, theirs))
                    .map(|theirs| Pair::new(ours, theirs))
            })
            .collect()
    }

    /// Our first chain that shares a root with one of `other`'s.
    pub fn common_chain(&self, other: &Node) -> Option<&Chain> {
        self.invitee_chains.iter().find(|c| other.shares_root(c))
    }

    /// How we relate to `other`, taking the best answer over every chain we
    /// have in common.
    ///
    /// The shortest hop count and the lowest common inviter level are picked
    /// independently, so with several common roots they can come from
    /// different chains. `same_chain` follows the hops winner while the
    /// common inviter key follows the level winner.
    pub fn web_of_trust_info(&self, other: &Node) -> WebOfTrust {
        let mut wot = WebOfTrust::default();
        for pair in self.common_chains(other) {
            let (hops, level) = pair.hops();
            if wot.hops.pick_shorter(hops) {
                wot.same_chain = pair.common_inviter_level().1;
            }
            if wot.common_inviter_level.pick_shorter(level) {
                wot.common_inviter_public_key = pair.common_inviter_key(level).cloned().unwrap_or_default();
            }
        }
        wot
    }

    /// Our shortest distance (and the level it's found at) to `root_idk` over
    /// all of our chains.
    fn hops_to(&self, root_idk: &[u8]) -> (Distance, Distance) {
        let mut hops = Distance::not_connected();
        let mut level = Distance::not_connected();
        for chain in &self.invitee_chains {
            if let Some((_, lvl)) = chain.find(root_idk) {
                let candidate = Distance::new(chain.len() as i64 - 1 - lvl.value());
                if hops.pick_shorter(candidate) {
                    level = lvl;
                }
            }
        }
        (hops, level)
    }

    /// Summarize our distance to `root_idk` for someone who doesn't have our
    /// chains. `None` if `root_idk` isn't on any of them.
    pub fn digest(&self, root_idk: &[u8]) -> Option<Digest> {
        let idk = self.idk()?;
        let (hops, _) = self.hops_to(root_idk);
        if !hops.is_connected() {
            return None;
        }
        Some(Digest::new(idk.public_key().clone(), BinaryVec::from(root_idk), hops))
    }

    /// Estimate our web of trust with whoever produced `digest`, by joining
    /// our own distance to the digest's root with theirs.
    pub fn wot_from_digest(&self, digest: &Digest) -> Option<WebOfTrust> {
        let (hops, level) = self.hops_to(digest.root_idk());
        if !hops.is_connected() {
            return None;
        }
        Some(WebOfTrust {
            hops: hops + *digest.hops(),
            same_chain: true,
            common_inviter_level: level,
            common_inviter_public_key: digest.root_idk().clone(),
        })
    }

    /// Whether we directly invited `other` in any common chain.
    pub fn is_inviter_for(&self, other: &Node) -> bool {
        self.common_chains(other)
            .iter()
            .any(|pair| Chain::is_inviter_for(pair.chain1(), pair.chain2()))
    }

    /// Whether either of us directly invited the other in any common chain.
    pub fn one_hop(&self, other: &Node) -> bool {
        self.common_chains(other).iter().any(|pair| pair.one_hop())
    }

    /// Whether we are a root: either our only chain is our own root block,
    /// or the root of our first chain is the key another root invited into
    /// our second one.
    pub fn is_root(&self) -> bool {
        match self.invitee_chains.as_slice() {
            [] => false,
            [chain] => chain.len() == 1,
            [first, second, ..] => equal_bytes(first.first_block().public_key(), second.last_block().public_key()),
        }
    }

    /// Find the first block (over all chains) inviting `public_key`.
    pub fn find(&self, public_key: &[u8]) -> Option<&Block> {
        self.invitee_chains.iter().find_map(|c| c.find(public_key).map(|(block, _)| block))
    }

    /// The first resolver endpoint published on any of our chains.
    pub fn resolver(&self) -> Option<&str> {
        self.invitee_chains.iter().find_map(|c| c.resolver())
    }

    /// The endpoint published by `public_key`'s invitation, if any.
    pub fn endpoint(&self, public_key: &[u8]) -> Option<&str> {
        self.find(public_key)
            .map(|b| b.options().endpoint().as_str())
            .filter(|e| !e.is_empty())
    }

    /// The public key of the backup key at `index`.
    pub fn get_backup_public_key(&self, index: u32) -> Option<BinaryVec> {
        let backup_keys = self.backup_keys.as_ref()?;
        let idx = usize::try_from(index).ok()?;
        backup_keys.blocks().get(idx).map(|b| b.public_key().clone())
    }

    /// Declare `count` backup keys, minted by `keys`.
    ///
    /// The backup chain is rooted at the key controlling this node, which
    /// means a node already in chains must pass in its identity key. A
    /// joining node with no key given gets a freshly minted root.
    pub fn create_backup_keys<K: KeyProvider>(
        &self,
        count: usize,
        controlling_key: Option<&dyn Signer>,
        keys: &mut K,
    ) -> Result<Node> {
        if self.backup_keys.is_some() {
            Err(Error::BackupKeysExist)?;
        }
        if !(BACKUP_KEYS_MIN..=BACKUP_KEYS_MAX).contains(&count) {
            Err(Error::BackupKeysCount(count))?;
        }
        let minted;
        let controller: &dyn Signer = match (self.idk(), controlling_key) {
            (Some(_), None) => return Err(Error::NodeControllingKeyMissing),
            (Some(idk), Some(key)) => {
                if !key.controls(idk.public_key()) {
                    Err(Error::NodeControllingKeyMismatch)?;
                }
                key
            }
            (None, Some(key)) => key,
            (None, None) => {
                minted = keys.generate()?;
                &minted
            }
        };

        let options = Options::default().with_rotation();
        let first = keys.generate()?;
        let mut chain = Chain::new(controller.info(), options.clone()).invite(controller, first.info(), options.clone())?;
        let mut inviter = first;
        for _ in 2..count {
            let next = keys.generate()?;
            chain = chain.invite(&inviter, next.info(), options.clone())?;
            inviter = next;
        }
        debug!(count = chain.len(), "backup keys created");
        Ok(Node {
            invitee_chains: self.invitee_chains.clone(),
            backup_keys: Some(chain),
        })
    }

    /// Hand control of this identity to the backup key at `index`.
    ///
    /// Every chain gets one more block re-inviting our identity, signed by
    /// the backup key instead of our (possibly lost) identity key. Returns the
    /// new node and the backup key that now controls it.
    pub fn rotate_to_backup_key<K: KeyProvider>(&self, index: u32, keys: &K) -> Result<(Node, K::Key)> {
        let backup_keys = self.backup_keys.as_ref().ok_or(Error::BackupKeysMissing)?;
        if index == 0 {
            Err(Error::BackupKeyIndex(index))?;
        }
        let backup_info = usize::try_from(index)
            .ok()
            .and_then(|idx| backup_keys.blocks().get(idx))
            .ok_or(Error::BackupKeyIndex(index))?
            .invitee()
            .clone();
        let backup_key = keys.find(&backup_info).ok_or(Error::BackupKeyNotFound)?;
        let idk = self.idk().ok_or(Error::NodeEmpty)?.clone();

        let options = Options::default().with_rotation().with_backup_key_index(index);
        let stub = Node::new_root(backup_info, options.clone());
        let mut rotated = self.invite(&backup_key, &stub, &idk, options)?;
        rotated.backup_keys = self.backup_keys.clone();
        debug!(index, chains = rotated.len(), "rotated to backup key");
        Ok((rotated, backup_key))
    }

    /// Move our identity to a new key: `current` (our identity key) invites
    /// `new_key` into every chain as a rotation.
    pub fn rotate_key<S: Signer + ?Sized>(&self, current: &S, new_key: &Info) -> Result<Node> {
        if self.is_empty() {
            Err(Error::NodeEmpty)?;
        }
        let options = Options::default().with_position(0).with_rotation();
        let stub = Node::new_root(new_key.clone(), options.clone());
        let mut rotated = self.invite(current, &stub, new_key, options)?;
        rotated.backup_keys = self.backup_keys.clone();
        debug!(chains = rotated.len(), "rotated key");
        Ok(rotated)
    }

    /// Check that all our chains end at the same identity key and verify,
    /// and that our backup key chain (if any) is a valid rotation chain.
    pub fn check_integrity(&self) -> Result<()> {
        if let Some(first) = self.invitee_chains.first() {
            let idk = first.leaf_public_key();
            for (idx, chain) in self.invitee_chains.iter().enumerate() {
                if !equal_bytes(chain.leaf_public_key(), idk) {
                    warn!(chain = idx, "node integrity: chain ends at the wrong key");
                    Err(Error::IntegrityWrongKey)?;
                }
                if !chain.verify_sign_with(|index| self.get_backup_public_key(index)) {
                    warn!(chain = idx, "node integrity: chain signature invalid");
                    Err(Error::IntegritySignature)?;
                }
            }
        }
        if let Some(backup_keys) = self.backup_keys.as_ref() {
            if !backup_keys.verify_id_chain() {
                warn!("node integrity: backup key chain invalid");
                Err(Error::IntegrityBackupKeys)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        crypto::base::SignKeypair,
        util::test::{keychain, keypair},
    };

    fn root(key: &SignKeypair) -> Node {
        Node::new_root(key.info(), Options::default())
    }

    /// `inviter_node` (controlled by `inviter`) invites `invitee` into all of
    /// its chains.
    fn invite(inviter: &SignKeypair, inviter_node: &Node, invitee: &SignKeypair, invitee_node: &Node) -> Node {
        inviter_node
            .invite(inviter, invitee_node, &invitee.info(), Options::default().with_position(1))
            .unwrap()
    }

    fn chain_lens(node: &Node) -> Vec<usize> {
        node.invitee_chains().iter().map(|c| c.len()).collect()
    }

    #[test]
    fn node_new() {
        let r = keypair();
        let node = root(&r);
        assert_eq!(node.len(), 1);
        assert_eq!(node.idk(), Some(&r.info()));
        assert!(node.backup_keys().is_none());
        node.check_integrity().unwrap();

        let joining = Node::new();
        assert!(joining.is_empty());
        assert_eq!(joining.idk(), None);
        joining.check_integrity().unwrap();
    }

    #[test]
    fn node_invite() {
        let (r, alice, bob) = (keypair(), keypair(), keypair());
        let r_node = root(&r);
        let alice_node = invite(&r, &r_node, &alice, &Node::new());
        assert_eq!(chain_lens(&alice_node), vec![2]);
        assert_eq!(alice_node.idk(), Some(&alice.info()));
        alice_node.check_integrity().unwrap();
        // the inviter is untouched
        assert_eq!(chain_lens(&r_node), vec![1]);

        let bob_node = invite(&alice, &alice_node, &bob, &Node::new());
        assert_eq!(chain_lens(&bob_node), vec![3]);
        bob_node.check_integrity().unwrap();

        // no double membership in the same chain
        let again = invite(&r, &r_node, &alice, &alice_node);
        assert_eq!(again, alice_node);

        // only the leaf's key can invite
        let res = alice_node.invite(&r, &Node::new(), &bob.info(), Options::default());
        assert_eq!(res.err(), Some(Error::ChainInviterNotLeaf));
    }

    #[test]
    fn node_invite_keeps_existing_chains() {
        let (a, b, carol) = (keypair(), keypair(), keypair());
        let (a_node, b_node) = (root(&a), root(&b));
        let carol_node = invite(&a, &a_node, &carol, &Node::new());
        let carol_node = invite(&b, &b_node, &carol, &carol_node);
        assert_eq!(chain_lens(&carol_node), vec![2, 2]);
        assert!(Chain::same_root(&carol_node.invitee_chains()[0], &a_node.invitee_chains()[0]));
        assert!(Chain::same_root(&carol_node.invitee_chains()[1], &b_node.invitee_chains()[0]));
        carol_node.check_integrity().unwrap();
    }

    #[test]
    fn node_invite_with_rotate_key() {
        let (r, rotating, alice) = (keypair(), keypair(), keypair());
        let r_node = root(&r);
        let alice_node = r_node
            .invite_with_rotate_key(&r, &rotating, &Node::new(), &alice.info(), Options::default())
            .unwrap();
        assert_eq!(chain_lens(&alice_node), vec![3]);
        let chain = &alice_node.invitee_chains()[0];
        assert_eq!(chain.blocks()[1].invitee(), &rotating.info());
        assert_eq!(chain.leaf(), &alice.info());
        assert!(chain.verify_sign());
        alice_node.check_integrity().unwrap();
        // the root is two hops away now
        assert_eq!(*r_node.web_of_trust_info(&alice_node).hops(), Distance::new(2));
    }

    #[test]
    fn node_web_of_trust_direct() {
        let (dave, eve) = (keypair(), keypair());
        let dave_node = root(&dave);
        let eve_node = invite(&dave, &dave_node, &eve, &Node::new());

        let wot = dave_node.web_of_trust_info(&eve_node);
        assert_eq!(*wot.hops(), Distance::new(1));
        assert_eq!(*wot.common_inviter_level(), Distance::new(0));
        assert_eq!(wot.common_inviter_public_key(), &dave.public_key());
        assert!(*wot.same_chain());

        assert!(dave_node.is_inviter_for(&eve_node));
        assert!(!eve_node.is_inviter_for(&dave_node));
        assert!(dave_node.one_hop(&eve_node));
        assert!(eve_node.one_hop(&dave_node));
        assert_eq!(dave_node.common_chains(&eve_node).len(), 1);
        assert_eq!(dave_node.common_chain(&eve_node), Some(&dave_node.invitee_chains()[0]));
    }

    #[test]
    fn node_web_of_trust_not_connected() {
        let (a, b) = (keypair(), keypair());
        let (a_node, b_node) = (root(&a), root(&b));
        assert!(a_node.common_chains(&b_node).is_empty());
        assert!(a_node.common_chain(&b_node).is_none());
        let wot = a_node.web_of_trust_info(&b_node);
        assert_eq!(wot, WebOfTrust::default());
        assert!(!wot.hops().is_connected());
        assert!(!wot.common_inviter_level().is_connected());
        assert!(!a_node.one_hop(&b_node));
    }

    #[test]
    fn node_web_of_trust_siblings() {
        let (r, alice, bob) = (keypair(), keypair(), keypair());
        let r_node = root(&r);
        let alice_node = invite(&r, &r_node, &alice, &Node::new());
        let bob_node = invite(&r, &r_node, &bob, &Node::new());
        let wot = alice_node.web_of_trust_info(&bob_node);
        assert_eq!(*wot.hops(), Distance::new(2));
        assert_eq!(*wot.common_inviter_level(), Distance::new(0));
        assert_eq!(wot.common_inviter_public_key(), &r.public_key());
        assert!(!*wot.same_chain());
        assert!(!alice_node.one_hop(&bob_node));
    }

    #[test]
    fn node_web_of_trust_picks_hops_and_level_independently() {
        let (r1, p, r2, q, x, y) = (keypair(), keypair(), keypair(), keypair(), keypair(), keypair());
        let (r1_node, r2_node) = (root(&r1), root(&r2));
        let p_node = invite(&r1, &r1_node, &p, &Node::new());
        let q_node = invite(&r2, &r2_node, &q, &Node::new());

        // r1 -> p -> x, r2 -> x
        let x_node = invite(&p, &p_node, &x, &Node::new());
        let x_node = invite(&r2, &r2_node, &x, &x_node);
        // r1 -> p -> y, r2 -> q -> y
        let y_node = invite(&p, &p_node, &y, &Node::new());
        let y_node = invite(&q, &q_node, &y, &y_node);
        assert_eq!(chain_lens(&x_node), vec![3, 2]);
        assert_eq!(chain_lens(&y_node), vec![3, 3]);

        let pairs = x_node.common_chains(&y_node);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].hops(), (Distance::new(2), Distance::new(1)));
        assert_eq!(pairs[1].hops(), (Distance::new(3), Distance::new(0)));

        // hops come from the r1 chain, the common inviter from the r2 chain
        let wot = x_node.web_of_trust_info(&y_node);
        assert_eq!(*wot.hops(), Distance::new(2));
        assert!(!*wot.same_chain());
        assert_eq!(*wot.common_inviter_level(), Distance::new(0));
        assert_eq!(wot.common_inviter_public_key(), &r2.public_key());
    }

    #[test]
    fn node_digest() {
        let (r, alice, bob, carol) = (keypair(), keypair(), keypair(), keypair());
        let r_node = root(&r);
        let alice_node = invite(&r, &r_node, &alice, &Node::new());
        let bob_node = invite(&alice, &alice_node, &bob, &Node::new());
        let carol_node = invite(&r, &r_node, &carol, &Node::new());

        let digest = bob_node.digest(&r.public_key()).unwrap();
        assert_eq!(digest.idk(), &bob.public_key());
        assert_eq!(digest.root_idk(), &r.public_key());
        assert_eq!(*digest.hops(), Distance::new(2));
        assert_eq!(*bob_node.digest(&alice.public_key()).unwrap().hops(), Distance::new(1));
        assert!(bob_node.digest(&keypair().public_key()).is_none());
        assert!(Node::new().digest(&r.public_key()).is_none());

        let wot = carol_node.wot_from_digest(&digest).unwrap();
        assert_eq!(*wot.hops(), Distance::new(3));
        assert!(*wot.same_chain());
        assert_eq!(*wot.common_inviter_level(), Distance::new(0));
        assert_eq!(wot.common_inviter_public_key(), &r.public_key());
        assert_eq!(wot.hops(), carol_node.web_of_trust_info(&bob_node).hops());

        let unknown = Digest::new(bob.public_key(), keypair().public_key(), Distance::new(1));
        assert!(carol_node.wot_from_digest(&unknown).is_none());
    }

    #[test]
    fn node_is_root() {
        let (r, s, alice) = (keypair(), keypair(), keypair());
        let (r_node, s_node) = (root(&r), root(&s));
        assert!(r_node.is_root());
        assert!(!Node::new().is_root());
        let alice_node = invite(&r, &r_node, &alice, &Node::new());
        assert!(!alice_node.is_root());

        // a root invited by another root
        let r_node2 = invite(&s, &s_node, &r, &r_node);
        assert_eq!(chain_lens(&r_node2), vec![1, 2]);
        assert!(r_node2.is_root());
        // a regular node invited by a second root
        let alice_node2 = invite(&s, &s_node, &alice, &alice_node);
        assert!(!alice_node2.is_root());
    }

    #[test]
    fn node_find_endpoint_resolver() {
        let (r, alice, bob) = (keypair(), keypair(), keypair());
        let r_node = root(&r);
        let alice_node = r_node
            .invite(&r, &Node::new(), &alice.info(), Options::default().with_resolver("tcp://alice:3000"))
            .unwrap();
        let bob_node = alice_node
            .invite(&alice, &Node::new(), &bob.info(), Options::default().with_endpoint("tcp://bob:3000"))
            .unwrap();
        assert_eq!(bob_node.find(&alice.public_key()).map(|b| b.invitee()), Some(&alice.info()));
        assert!(bob_node.find(&keypair().public_key()).is_none());
        assert_eq!(bob_node.endpoint(&alice.public_key()), Some("tcp://alice:3000"));
        assert_eq!(bob_node.endpoint(&bob.public_key()), Some("tcp://bob:3000"));
        assert_eq!(bob_node.endpoint(&r.public_key()), None);
        assert_eq!(bob_node.resolver(), Some("tcp://alice:3000"));
        assert_eq!(r_node.resolver(), None);
    }

    #[test]
    fn node_create_backup_keys() {
        let (r, other) = (keypair(), keypair());
        let mut keys = keychain();
        let node = root(&r);

        assert_eq!(node.create_backup_keys(1, Some(&r), &mut keys).err(), Some(Error::BackupKeysCount(1)));
        assert_eq!(node.create_backup_keys(13, Some(&r), &mut keys).err(), Some(Error::BackupKeysCount(13)));
        assert_eq!(node.create_backup_keys(3, None, &mut keys).err(), Some(Error::NodeControllingKeyMissing));
        assert_eq!(node.create_backup_keys(3, Some(&other), &mut keys).err(), Some(Error::NodeControllingKeyMismatch));

        let node2 = node.create_backup_keys(3, Some(&r), &mut keys).unwrap();
        let backup = node2.backup_keys().as_ref().unwrap();
        assert_eq!(backup.len(), 3);
        assert_eq!(backup.first_block().invitee(), &r.info());
        assert!(backup.verify_id_chain());
        assert_eq!(keys.len(), 2);
        assert_eq!(node2.invitee_chains(), node.invitee_chains());
        assert_eq!(node2.get_backup_public_key(0), Some(r.public_key()));
        assert!(node2.get_backup_public_key(2).is_some());
        assert!(node2.get_backup_public_key(3).is_none());
        node2.check_integrity().unwrap();

        assert_eq!(node2.create_backup_keys(3, Some(&r), &mut keys).err(), Some(Error::BackupKeysExist));

        let max = node.create_backup_keys(BACKUP_KEYS_MAX, Some(&r), &mut keychain()).unwrap();
        assert_eq!(max.backup_keys().as_ref().unwrap().len(), BACKUP_KEYS_MAX);
        let min = node.create_backup_keys(BACKUP_KEYS_MIN, Some(&r), &mut keychain()).unwrap();
        assert_eq!(min.backup_keys().as_ref().unwrap().len(), BACKUP_KEYS_MIN);
    }

    #[test]
    fn node_create_backup_keys_joining() {
        let mut keys = keychain();
        let node = Node::new().create_backup_keys(4, None, &mut keys).unwrap();
        let backup = node.backup_keys().as_ref().unwrap();
        assert_eq!(backup.len(), 4);
        // a fresh root was minted along with the backups
        assert_eq!(keys.len(), 4);
        assert!(keys.find(backup.first_block().invitee()).is_some());
        node.check_integrity().unwrap();
    }

    #[test]
    fn node_rotate_to_backup_key() {
        let (a, b, carol, eve) = (keypair(), keypair(), keypair(), keypair());
        let (a_node, b_node) = (root(&a), root(&b));
        let carol_node = invite(&b, &b_node, &carol, &Node::new());
        let eve_node = invite(&a, &a_node, &eve, &Node::new());
        let eve_node = invite(&carol, &carol_node, &eve, &eve_node);
        assert_eq!(chain_lens(&eve_node), vec![2, 3]);

        let mut keys = keychain();
        assert_eq!(eve_node.rotate_to_backup_key(1, &keys).err(), Some(Error::BackupKeysMissing));
        let eve_node = eve_node.create_backup_keys(3, Some(&eve), &mut keys).unwrap();
        assert_eq!(eve_node.rotate_to_backup_key(0, &keys).err(), Some(Error::BackupKeyIndex(0)));
        assert_eq!(eve_node.rotate_to_backup_key(3, &keys).err(), Some(Error::BackupKeyIndex(3)));
        assert_eq!(eve_node.rotate_to_backup_key(1, &keychain()).err(), Some(Error::BackupKeyNotFound));

        let (rotated, backup_key) = eve_node.rotate_to_backup_key(1, &keys).unwrap();
        assert_eq!(chain_lens(&rotated), vec![3, 4]);
        assert_eq!(rotated.backup_keys().as_ref().unwrap().len(), 3);
        assert_eq!(rotated.backup_keys(), eve_node.backup_keys());
        assert_eq!(Some(backup_key.public_key()), rotated.get_backup_public_key(1));
        assert_eq!(rotated.idk(), Some(&eve.info()));
        for chain in rotated.invitee_chains() {
            let opts = chain.last_block().options();
            assert!(*opts.rotation());
            assert_eq!(*opts.backup_key_index(), 1);
            // plain verification can't see backup keys
            assert!(!chain.verify_sign());
        }
        rotated.check_integrity().unwrap();

        // without the backup chain the rotation can't be verified
        let mut stripped = rotated.clone();
        *stripped.backup_keys_mut() = None;
        assert_eq!(stripped.check_integrity(), Err(Error::IntegritySignature));
    }

    #[test]
    fn node_rotate_key() {
        let (r, alice, alice2, bob) = (keypair(), keypair(), keypair(), keypair());
        let r_node = root(&r);
        let alice_node = invite(&r, &r_node, &alice, &Node::new())
            .create_backup_keys(2, Some(&alice), &mut keychain())
            .unwrap();

        assert_eq!(Node::new().rotate_key(&alice, &alice2.info()).err(), Some(Error::NodeEmpty));
        assert_eq!(alice_node.rotate_key(&bob, &alice2.info()).err(), Some(Error::ChainInviterNotLeaf));

        let rotated = alice_node.rotate_key(&alice, &alice2.info()).unwrap();
        assert_eq!(chain_lens(&rotated), vec![3]);
        assert_eq!(rotated.idk(), Some(&alice2.info()));
        assert!(*rotated.invitee_chains()[0].last_block().options().rotation());
        assert_eq!(rotated.backup_keys(), alice_node.backup_keys());
        rotated.check_integrity().unwrap();

        // the new key invites, the old one can't
        let bob_node = invite(&alice2, &rotated, &bob, &Node::new());
        assert_eq!(chain_lens(&bob_node), vec![4]);
        bob_node.check_integrity().unwrap();
        let res = rotated.invite(&alice, &Node::new(), &bob.info(), Options::default());
        assert_eq!(res.err(), Some(Error::ChainInviterNotLeaf));
    }

    #[test]
    fn node_check_integrity_signature() {
        let (r, frank, grace) = (keypair(), keypair(), keypair());
        let r_node = root(&r);
        let frank_node = invite(&r, &r_node, &frank, &Node::new());
        let grace_node = invite(&frank, &frank_node, &grace, &Node::new());
        grace_node.check_integrity().unwrap();

        let mut corrupt = grace_node.clone();
        let block = &mut corrupt.invitee_chains_mut()[0].blocks_mut()[0];
        let mut pubkey = block.public_key().to_vec();
        pubkey[3] ^= 0x10;
        block.invitee_mut().set_public_key(BinaryVec::from(pubkey));
        assert_eq!(corrupt.check_integrity(), Err(Error::IntegritySignature));
    }

    #[test]
    fn node_check_integrity_wrong_key() {
        let (a, b, carol, dave) = (keypair(), keypair(), keypair(), keypair());
        let (a_node, b_node) = (root(&a), root(&b));
        let carol_node = invite(&a, &a_node, &carol, &Node::new());
        let dave_node = invite(&b, &b_node, &dave, &Node::new());

        let mut mixed = carol_node.clone();
        mixed.invitee_chains_mut().push(dave_node.invitee_chains()[0].clone());
        assert_eq!(mixed.check_integrity(), Err(Error::IntegrityWrongKey));
    }

    #[test]
    fn node_check_integrity_backup_keys() {
        let r = keypair();
        let node = root(&r).create_backup_keys(3, Some(&r), &mut keychain()).unwrap();
        node.check_integrity().unwrap();

        let mut not_rotation = node.clone();
        not_rotation.backup_keys_mut().as_mut().unwrap().blocks_mut()[0]
            .options_mut()
            .set_rotation(false);
        assert_eq!(not_rotation.check_integrity(), Err(Error::IntegrityBackupKeys));

        let mut bad_sig = node.clone();
        *bad_sig.backup_keys_mut().as_mut().unwrap().blocks_mut()[2].inviter_signature_mut() = BinaryVec::from(vec![1u8; 64]);
        assert_eq!(bad_sig.check_integrity(), Err(Error::IntegrityBackupKeys));
    }

    #[test]
    fn node_serialize() {
        let (r, alice) = (keypair(), keypair());
        let r_node = root(&r);
        let alice_node = invite(&r, &r_node, &alice, &Node::new())
            .create_backup_keys(3, Some(&alice), &mut keychain())
            .unwrap();

        let bytes = alice_node.bytes().unwrap();
        let alice_node2 = Node::from_bytes(&bytes).unwrap();
        assert_eq!(alice_node, alice_node2);
        alice_node2.check_integrity().unwrap();

        let text = alice_node.serialize_text().unwrap();
        let alice_node3 = Node::deserialize_text(text.as_bytes()).unwrap();
        assert_eq!(alice_node, alice_node3);

        let empty = Node::from_bytes(&Node::new().bytes().unwrap()).unwrap();
        assert_eq!(empty, Node::new());
        assert!(Node::from_bytes(&[0xde, 0xad]).is_err());
    }
}
