use crate::{
    crypto::{
        base::Hash,
        sign::Signer,
    },
    error::{Error, Result},
    util::ser::BinaryVec,
};
use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Holds the secret seed of a signing key and wipes it on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
struct SecretSeed([u8; 32]);

/// An asymmetric (ed25519) signing keypair.
///
/// The key's id is the blake3 hash of its public key, so an id can always be
/// recomputed from the public half.
#[derive(Clone)]
pub struct SignKeypair {
    public: BinaryVec,
    id: BinaryVec,
    secret: SecretSeed,
}

impl SignKeypair {
    /// Create a new ed25519 keypair
    pub fn new_ed25519<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut randbuf = [0u8; 32];
        rng.fill_bytes(&mut randbuf);
        let keypair = Self::new_ed25519_from_bytes(randbuf);
        randbuf.zeroize();
        keypair
    }

    /// Create a new ed25519 keypair from a cryptographic seed
    pub fn new_ed25519_from_bytes(secret_bytes: [u8; 32]) -> Self {
        let secret = ed25519_consensus::SigningKey::from(secret_bytes);
        let public = secret.verification_key().to_bytes();
        Self {
            public: BinaryVec::from(public),
            id: key_id(&public),
            secret: SecretSeed(secret_bytes),
        }
    }
}

impl Signer for SignKeypair {
    fn sign(&self, data: &[u8]) -> Result<BinaryVec> {
        let seckey = ed25519_consensus::SigningKey::from(self.secret.0);
        let sig = seckey.sign(data);
        Ok(BinaryVec::from(sig.to_bytes()))
    }

    fn public_key(&self) -> BinaryVec {
        self.public.clone()
    }

    fn id(&self) -> BinaryVec {
        self.id.clone()
    }
}

impl PartialEq for SignKeypair {
    fn eq(&self, other: &Self) -> bool {
        self.public == other.public
    }
}

impl std::fmt::Debug for SignKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignKeypair")
            .field("public", &format!("{}", self.public))
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Derive a key id from an ed25519 public key.
pub fn key_id(public_key: &[u8]) -> BinaryVec {
    Hash::new_blake3(public_key).into()
}

/// Verify a detached signature given the public key of the signer.
///
/// Keys or signatures with the wrong shape are verification failures, not
/// panics: these bytes usually come from someone else.
pub fn verify(public_key: &[u8], signature: &[u8], data: &[u8]) -> Result<()> {
    let pubkey_arr = <[u8; 32]>::try_from(public_key).map_err(|_| Error::CryptoBadKey)?;
    let pubkey = ed25519_consensus::VerificationKey::try_from(pubkey_arr).map_err(|_| Error::CryptoBadKey)?;
    let sig_arr = <[u8; 64]>::try_from(signature).map_err(|_| Error::CryptoSignatureVerificationFailed)?;
    let sig = ed25519_consensus::Signature::from(sig_arr);
    pubkey.verify(&sig, data).map_err(|_| Error::CryptoSignatureVerificationFailed)
}
