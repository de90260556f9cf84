//! Invitation chains: signed, append-only lineages of trust.
//!
//! Every identity in the system is a public key. An identity gets into the
//! system by being *invited*: whoever controls the end of an existing chain
//! signs a block naming the newcomer, and the newcomer now owns a copy of
//! that chain with themselves at the end. Nobody keeps a directory. Two
//! identities that meet can compare their chains and work out how far apart
//! they are in the invitation tree without asking anyone else.
//!
//! The pieces, from the bottom up:
//!
//! - [`chain::Block`] is one signed invitation, and [`chain::Chain`] is the
//! list of them from a root to a leaf. Chains know how to verify themselves
//! and how to compare against each other (common root, common inviter, hop
//! distance).
//! - [`node::Node`] holds every chain one identity belongs to, computes the
//! [web of trust][node::WebOfTrust] against another node, and handles key
//! rotation, including recovery through a chain of pre-declared backup keys.
//! - [`identity::Identity`] keeps a node together with the key that controls
//! it.
//!
//! Signing goes through the [`crypto::sign::Signer`] trait, so keys can live
//! wherever the caller likes. [`crypto::base::SignKeypair`] is the in-memory
//! ed25519 implementation.

pub mod error;
pub mod util;
pub mod crypto;
pub mod hop;
pub mod chain;
pub mod digest;
pub mod node;
pub mod identity;
