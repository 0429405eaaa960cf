//! Growable bit vector addressing validators by their index in a set.

use bitvec::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Validator bitmap: bit `i` lives in byte `i / 8` at position `i % 8`.
#[derive(Clone, Debug, Default, Eq)]
pub struct Bitmap(BitVec<u8, Lsb0>);

impl Bitmap {
    /// Empty bitmap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bitmap from raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(BitVec::from_vec(bytes))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_raw_slice()
    }

    /// Set bit `index`, growing as needed.
    pub fn set(&mut self, index: usize) {
        if index >= self.0.len() {
            self.0.resize(index + 1, false);
        }
        self.0.set(index, true);
    }

    /// Whether bit `index` is set.
    pub fn is_set(&self, index: usize) -> bool {
        self.0.get(index).map(|b| *b).unwrap_or(false)
    }

    /// Number of addressable bits.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if no bit is set.
    pub fn is_empty(&self) -> bool {
        self.0.not_any()
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.0.count_ones()
    }

    /// Indices of set bits in ascending order.
    pub fn iter_set(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter_ones()
    }
}

impl PartialEq for Bitmap {
    fn eq(&self, other: &Self) -> bool {
        self.iter_set().eq(other.iter_set())
    }
}

impl FromIterator<usize> for Bitmap {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut bitmap = Self::new();
        for index in iter {
            bitmap.set(index);
        }
        bitmap
    }
}

impl Serialize for Bitmap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (self.0.len(), self.0.as_raw_slice()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Bitmap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (len, bytes): (usize, Vec<u8>) = Deserialize::deserialize(deserializer)?;
        let mut bits = BitVec::<u8, Lsb0>::from_vec(bytes);
        bits.truncate(len);
        Ok(Self(bits))
    }
}
