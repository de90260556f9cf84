//! Utilities. OBVIOUSLY.

pub mod ser;
pub(crate) mod sign;

use subtle::ConstantTimeEq;

/// Compare two byte slices in constant time (relative to their length).
///
/// Used anywhere we compare keys or signatures that came from someone else.
pub fn equal_bytes(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}
