//! Domain-specific identifier types.

use crate::Hash;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identity of any ledger participant.
///
/// Airlines, passengers, oracles, the ledger owner and the application layer
/// are all principals; their role comes from ledger state, never from the id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal([u8; 20]);

impl Principal {
    /// Size of a principal in bytes.
    pub const BYTES: usize = 20;

    /// Create a principal from raw bytes.
    pub const fn from_raw(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derive a principal from a human-readable label.
    ///
    /// Used for fixtures and simulated identities.
    pub fn from_label(label: &str) -> Self {
        Self::truncate(Hash::from_parts(&[b"principal:", label.as_bytes()]))
    }

    /// Derive a principal from a numeric seed.
    pub fn from_seed(seed: u64) -> Self {
        Self::truncate(Hash::from_parts(&[b"principal-seed:", &seed.to_le_bytes()]))
    }

    fn truncate(hash: Hash) -> Self {
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash.as_bytes()[..20]);
        Self(bytes)
    }

    /// Get the bytes as a slice.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Abbreviated form for log lines: `0x69e1..39a2`.
    pub fn short(&self) -> String {
        let hex = hex::encode(self.0);
        format!("0x{}..{}", &hex[..4], &hex[36..])
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({})", self.short())
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// One of the ten index shards oracles are partitioned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct OracleIndex(u8);

impl OracleIndex {
    /// Number of index shards.
    pub const COUNT: u8 = 10;

    /// Create an index, returning `None` when it is out of range.
    pub fn new(index: u8) -> Option<Self> {
        (index < Self::COUNT).then_some(Self(index))
    }

    /// Reduce a hash into an index.
    pub fn from_hash(hash: &Hash) -> Self {
        Self((hash.as_u64() % Self::COUNT as u64) as u8)
    }

    /// Iterate over every index in ascending order.
    pub fn all() -> impl Iterator<Item = OracleIndex> {
        (0..Self::COUNT).map(OracleIndex)
    }

    /// Get the raw value.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for OracleIndex {
    type Error = InvalidOracleIndex;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidOracleIndex(value))
    }
}

impl From<OracleIndex> for u8 {
    fn from(index: OracleIndex) -> Self {
        index.0
    }
}

impl fmt::Display for OracleIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returned when converting an out-of-range value into an [`OracleIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("oracle index {0} is outside 0..10")]
pub struct InvalidOracleIndex(pub u8);

/// Ledger block height. Every applied transaction produces one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockHeight(pub u64);

impl BlockHeight {
    /// Genesis block height.
    pub const GENESIS: Self = BlockHeight(0);

    /// Get the next block height.
    pub fn next(self) -> Self {
        BlockHeight(self.0 + 1)
    }
}

impl fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block({})", self.0)
    }
}
