//! Deterministic entropy derived from the ledger's own history.

use surety_core::EntropySource;
use surety_types::{Hash, Principal};

/// A hash chain advanced once per applied block.
///
/// Draws mix the chain head, the caller and a per-block nonce, so two draws
/// in one block differ and replaying the same blocks reproduces every draw.
#[derive(Debug, Clone)]
pub struct ChainEntropy {
    head: Hash,
    nonce: u64,
}

impl ChainEntropy {
    /// Start a chain from `seed`.
    pub fn new(seed: &[u8]) -> Self {
        Self {
            head: Hash::from_parts(&[b"surety-entropy:", seed]),
            nonce: 0,
        }
    }

    /// Current chain head.
    pub fn head(&self) -> Hash {
        self.head
    }
}

impl EntropySource for ChainEntropy {
    fn draw(&mut self, caller: &Principal) -> Hash {
        let value = Hash::from_parts(&[
            self.head.as_bytes(),
            caller.as_bytes(),
            &self.nonce.to_le_bytes(),
        ]);
        self.nonce += 1;
        value
    }

    fn advance(&mut self, block: &[u8]) {
        self.head = Hash::from_parts(&[self.head.as_bytes(), block]);
        self.nonce = 0;
    }
}
