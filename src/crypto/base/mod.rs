//! The crypto base wraps the algorithms the invitation chain relies on:
//! signing (ed25519) and hashing (blake3).
//!
//! Each algorithm sits behind a small descriptive type, so the rest of the
//! crate asks for "a signing keypair" or "a hash" and never touches the
//! underlying crates.

use rand::{rngs::OsRng, RngCore, SeedableRng};

mod hash;
mod sign_key;

pub use hash::*;
pub use sign_key::*;

/// A ChaCha20 CSRNG seeded from the OS. This is the default source of
/// randomness for keys and challenge blocks when the caller has no RNG of its
/// own to pass in: anything here taking `&mut rng` accepts any
/// [`RngCore`] + [`CryptoRng`][rand::CryptoRng].
pub fn rng_chacha20() -> rand_chacha::ChaCha20Rng {
    let mut seed_bytes = [0u8; 32];
    OsRng.fill_bytes(&mut seed_bytes);
    rand_chacha::ChaCha20Rng::from_seed(seed_bytes)
}

/// Fill a new vector with `len` random bytes.
pub fn random_bytes<R: RngCore>(rng: &mut R, len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rng.fill_bytes(&mut bytes);
    bytes
}
