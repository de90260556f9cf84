//! A single signed link in an invitation chain.

use crate::{
    chain::Options,
    crypto::{
        base::{random_bytes, verify, Hash},
        sign::{Info, Signer},
    },
    error::Result,
    util::{
        ser::{self, BinaryVec},
        sign::Signable,
    },
};
use rand::{CryptoRng, RngCore};
use rasn::{AsnType, Decode, Encode};
use serde_derive::{Deserialize, Serialize};

/// One invitation: the inviter (whoever controls the previous block's key)
/// vouches for `invitee` by signing this block.
///
/// A root block has an empty `hash_to_prev` and an empty signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, AsnType, Encode, Decode, Serialize, Deserialize, getset::Getters, getset::MutGetters)]
#[getset(get = "pub", get_mut = "pub(crate)")]
pub struct Block {
    /// Hash of the previous block's serialized bytes.
    #[rasn(tag(explicit(0)))]
    hash_to_prev: BinaryVec,
    /// Who is being invited.
    #[rasn(tag(explicit(1)))]
    invitee: Info,
    /// Signed options for this link.
    #[rasn(tag(explicit(2)))]
    options: Options,
    /// The inviter's signature over the other three fields.
    #[rasn(tag(explicit(3)))]
    inviter_signature: BinaryVec,
}

/// The portion of a block covered by the inviter's signature.
#[derive(Debug, AsnType, Encode)]
pub struct BlockSignable {
    #[rasn(tag(explicit(0)))]
    hash_to_prev: BinaryVec,
    #[rasn(tag(explicit(1)))]
    invitee: Info,
    #[rasn(tag(explicit(2)))]
    options: Options,
}

impl Signable for Block {
    type Item = BlockSignable;
    fn signable(&self) -> Self::Item {
        BlockSignable {
            hash_to_prev: self.hash_to_prev.clone(),
            invitee: self.invitee.clone(),
            options: self.options.clone(),
        }
    }
}

impl Block {
    /// Create a root (self-signed in spirit, unsigned in fact) block.
    pub(crate) fn new_root(invitee: Info, options: Options) -> Self {
        Self::new_unsigned(BinaryVec::new(), invitee, options)
    }

    pub(crate) fn new_unsigned(hash_to_prev: BinaryVec, invitee: Info, options: Options) -> Self {
        Self {
            hash_to_prev,
            invitee,
            options,
            inviter_signature: BinaryVec::new(),
        }
    }

    /// Sign the block, consuming it and returning the signed version.
    pub(crate) fn sign<S: Signer + ?Sized>(mut self, signer: &S) -> Result<Self> {
        let bytes = self.exclude_signature_bytes()?;
        self.inviter_signature = signer.sign(&bytes)?;
        Ok(self)
    }

    /// Whether this is a root block.
    pub fn is_root(&self) -> bool {
        self.hash_to_prev.is_empty()
    }

    /// The invitee's public key.
    pub fn public_key(&self) -> &BinaryVec {
        self.invitee.public_key()
    }

    /// Serialize the full block (signature included).
    pub fn bytes(&self) -> Result<Vec<u8>> {
        ser::serialize(self)
    }

    /// Deserialize a block.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ser::deserialize(bytes)
    }

    /// The bytes an inviter signs: everything but the signature itself.
    pub fn exclude_signature_bytes(&self) -> Result<Vec<u8>> {
        self.signable_bytes()
    }

    /// The hash the next block in the chain links to.
    pub fn hash(&self) -> Result<Hash> {
        Ok(Hash::new_blake3(&self.bytes()?))
    }

    /// Check the inviter's signature against the given public key.
    pub fn verify_sign(&self, inviters_public_key: &[u8]) -> bool {
        match self.exclude_signature_bytes() {
            Ok(bytes) => verify(inviters_public_key, &self.inviter_signature, &bytes).is_ok(),
            Err(_) => false,
        }
    }

    /// Create a throwaway challenge block with random contents, along with
    /// the block a legitimate answer must sign: the same block with its
    /// position set to `pin_code`.
    pub fn new_verify_block<R: RngCore + CryptoRng>(rng: &mut R, pin_code: i64) -> (Block, Block) {
        let challenge = Self::new_unsigned(
            random_bytes(rng, 32).into(),
            Info::new(random_bytes(rng, 32).into(), random_bytes(rng, 32).into()),
            Options::default(),
        );
        let mut answer = challenge.clone();
        answer.options.set_position(pin_code);
        (challenge, answer)
    }

    /// Answer a challenge created by [`new_verify_block`][Block::new_verify_block]:
    /// write the pin code into the challenge and sign the result.
    pub fn answer_challenge<S: Signer + ?Sized>(challenge: &[u8], pin_code: i64, signer: &S) -> Result<BinaryVec> {
        let mut block = Self::from_bytes(challenge)?;
        block.options.set_position(pin_code);
        signer.sign(&block.bytes()?)
    }
}
