//! The crypto module contains the cryptographic primitives the invitation
//! chains need: key generation, signing and verification, and hashing.

pub mod base;
pub mod keychain;
pub mod sign;
