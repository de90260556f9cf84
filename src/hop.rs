//! Distances between identities, measured in invitation hops.

use rasn::{AsnType, Decode, Encode};
use serde_derive::{Deserialize, Serialize};
use std::ops::Add;

/// The raw value of [`Distance::not_connected`].
pub const NOT_CONNECTED: i64 = -1;

/// A number of hops (or a level from a chain's root). The special
/// [`not_connected`][Distance::not_connected] value means there is no route at
/// all, which is a perfectly valid answer and not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, AsnType, Encode, Decode, Serialize, Deserialize)]
#[rasn(delegate)]
#[serde(transparent)]
pub struct Distance(i64);

impl Distance {
    /// Create a new distance.
    pub fn new(val: i64) -> Self {
        Self(val)
    }

    /// The "no route" sentinel.
    pub fn not_connected() -> Self {
        Self(NOT_CONNECTED)
    }

    /// Whether there is a route at all.
    pub fn is_connected(&self) -> bool {
        self.0 != NOT_CONNECTED
    }

    /// The raw value.
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Replace ourselves with `rhs` if we're not connected or `rhs` is strictly
    /// shorter, returning whether we swapped. Ties keep the current value, so
    /// when reducing over a list the first minimum wins.
    pub fn pick_shorter(&mut self, rhs: Distance) -> bool {
        let swap = !self.is_connected() || rhs < *self;
        if swap {
            *self = rhs;
        }
        swap
    }
}

impl Default for Distance {
    fn default() -> Self {
        Self::not_connected()
    }
}

impl From<usize> for Distance {
    fn from(val: usize) -> Self {
        Self(val as i64)
    }
}

impl Add for Distance {
    type Output = Distance;

    fn add(self, rhs: Distance) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl std::fmt::Display for Distance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_connected() {
            write!(f, "Distance:{}", self.0)
        } else {
            write!(f, "NotConnected")
        }
    }
}
