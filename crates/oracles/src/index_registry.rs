//! Oracle index shard assignments.
//!
//! Each oracle is assigned three of the ten index shards when it registers.
//! A status request is only serviced by the oracles holding its index, which
//! bounds how many oracles must respond to any one request.

use std::collections::HashMap;
use surety_core::{EntropySource, LedgerError};
use surety_types::{Amount, OracleIndex, Principal};
use tracing::info;

/// Number of indices assigned to each oracle.
pub const INDICES_PER_ORACLE: usize = 3;

/// Maps oracle identities to their permanent index assignments.
#[derive(Debug)]
pub struct OracleIndexRegistry {
    fee: Amount,
    oracles: HashMap<Principal, [OracleIndex; INDICES_PER_ORACLE]>,
}

impl OracleIndexRegistry {
    /// Create an empty registry requiring `fee` to register.
    pub fn new(fee: Amount) -> Self {
        Self {
            fee,
            oracles: HashMap::new(),
        }
    }

    /// Check whether `caller` may register with `value`, without drawing.
    pub fn check_registration(&self, caller: &Principal, value: Amount) -> Result<(), LedgerError> {
        if value < self.fee {
            return Err(LedgerError::InsufficientFunds {
                required: self.fee,
                provided: value,
            });
        }
        if self.oracles.contains_key(caller) {
            return Err(LedgerError::AlreadyRegistered);
        }
        Ok(())
    }

    /// Register `caller` and derive its indices from `entropy`.
    ///
    /// Each index is an independent draw, so an oracle may hold the same
    /// index more than once.
    pub fn register_oracle(
        &mut self,
        caller: Principal,
        value: Amount,
        entropy: &mut dyn EntropySource,
    ) -> Result<[OracleIndex; INDICES_PER_ORACLE], LedgerError> {
        self.check_registration(&caller, value)?;

        let indexes: [OracleIndex; INDICES_PER_ORACLE] =
            std::array::from_fn(|_| OracleIndex::from_hash(&entropy.draw(&caller)));
        self.oracles.insert(caller, indexes);

        info!(
            oracle = %caller.short(),
            indexes = ?indexes.map(OracleIndex::get),
            "Oracle registered"
        );
        Ok(indexes)
    }

    /// The indices held by `caller`.
    pub fn indexes_of(
        &self,
        caller: &Principal,
    ) -> Result<[OracleIndex; INDICES_PER_ORACLE], LedgerError> {
        self.oracles
            .get(caller)
            .copied()
            .ok_or(LedgerError::NotRegistered)
    }

    pub fn is_registered(&self, caller: &Principal) -> bool {
        self.oracles.contains_key(caller)
    }

    /// Whether `caller` holds `index`. Unregistered callers hold nothing.
    pub fn is_assigned(&self, caller: &Principal, index: OracleIndex) -> bool {
        self.oracles
            .get(caller)
            .is_some_and(|indexes| indexes.contains(&index))
    }

    pub fn fee(&self) -> Amount {
        self.fee
    }

    pub fn len(&self) -> usize {
        self.oracles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oracles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surety_types::Hash;
    use tracing_test::traced_test;

    /// Counter-based entropy so assignments are predictable in tests.
    struct CountingEntropy(u64);

    impl EntropySource for CountingEntropy {
        fn draw(&mut self, caller: &Principal) -> Hash {
            self.0 += 1;
            Hash::from_parts(&[caller.as_bytes(), &self.0.to_le_bytes()])
        }

        fn advance(&mut self, _block: &[u8]) {}
    }

    #[traced_test]
    #[test]
    fn test_register_assigns_three_indexes() {
        let mut registry = OracleIndexRegistry::new(Amount::ether(1));
        let mut entropy = CountingEntropy(0);
        let oracle = Principal::from_label("oracle");

        let indexes = registry
            .register_oracle(oracle, Amount::ether(1), &mut entropy)
            .unwrap();
        assert_eq!(registry.indexes_of(&oracle), Ok(indexes));
        for index in indexes {
            assert!(registry.is_assigned(&oracle, index));
        }
    }

    #[traced_test]
    #[test]
    fn test_register_rejects_low_fee_and_repeat() {
        let mut registry = OracleIndexRegistry::new(Amount::ether(1));
        let mut entropy = CountingEntropy(0);
        let oracle = Principal::from_label("oracle");

        assert!(matches!(
            registry.register_oracle(oracle, Amount::milli_ether(999), &mut entropy),
            Err(LedgerError::InsufficientFunds { .. })
        ));
        assert!(!registry.is_registered(&oracle));

        registry
            .register_oracle(oracle, Amount::ether(1), &mut entropy)
            .unwrap();
        assert_eq!(
            registry.register_oracle(oracle, Amount::ether(1), &mut entropy),
            Err(LedgerError::AlreadyRegistered)
        );
    }

    #[test]
    fn test_unregistered_has_no_indexes() {
        let registry = OracleIndexRegistry::new(Amount::ether(1));
        let stranger = Principal::from_label("stranger");

        assert_eq!(registry.indexes_of(&stranger), Err(LedgerError::NotRegistered));
        assert!(OracleIndex::all().all(|index| !registry.is_assigned(&stranger, index)));
    }

    #[traced_test]
    #[test]
    fn test_many_oracles_cover_every_index() {
        let mut registry = OracleIndexRegistry::new(Amount::ether(1));
        let mut entropy = CountingEntropy(0);

        let mut counts = [0usize; OracleIndex::COUNT as usize];
        for seed in 0..60 {
            let indexes = registry
                .register_oracle(Principal::from_seed(seed), Amount::ether(1), &mut entropy)
                .unwrap();
            for index in indexes {
                counts[index.get() as usize] += 1;
            }
        }
        assert_eq!(registry.len(), 60);
        assert!(counts.iter().all(|&c| c > 0), "counts: {counts:?}");
    }
}
