//! Fingerprints for checking that two runs produced the same coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;
use xxhash_rust::xxh3::Xxh3;

/// XXH3-128 digest of a sequence of `f64` bit patterns.
///
/// Equal fingerprints mean bit-identical input, so `0.0` and `-0.0` differ.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(u128);

impl ContentHash {
    /// Hashes `values` in order.
    pub fn from_f64s(values: impl IntoIterator<Item = f64>) -> Self {
        let mut hasher = Xxh3::new();
        for v in values {
            hasher.update(&v.to_bits().to_le_bytes());
        }
        Self(hasher.digest128())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:08x}..)", self.0 >> 96)
    }
}
