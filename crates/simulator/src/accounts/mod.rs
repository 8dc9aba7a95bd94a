//! Oracle identities controlled by the simulator.
//!
//! Provides an `OraclePool` that registers oracle accounts with the ledger,
//! records the indices each was assigned and answers which oracles hold a
//! given index.

use crate::{IndexCoverage, SimulatorConfig, SimulatorError};
use std::collections::BTreeMap;
use surety_core::{Call, Transaction};
use surety_ledger::SharedLedger;
use surety_types::{OracleIndex, Principal};
use tracing::{debug, info};

/// A registered oracle and the indices it holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleAccount {
    pub id: Principal,
    pub indexes: [OracleIndex; 3],
}

impl OracleAccount {
    /// Identity of simulated oracle `n`.
    pub fn identity(n: u64) -> Principal {
        Principal::from_label(&format!("sim-oracle-{n}"))
    }
}

/// Oracles grouped by the indices they hold.
#[derive(Clone, Debug, Default)]
pub struct OraclePool {
    accounts: Vec<OracleAccount>,
    /// index -> distinct oracles holding it.
    by_index: BTreeMap<OracleIndex, Vec<Principal>>,
}

impl OraclePool {
    /// Build a pool from known assignments.
    pub fn from_accounts(accounts: Vec<OracleAccount>) -> Self {
        let mut by_index: BTreeMap<OracleIndex, Vec<Principal>> = BTreeMap::new();
        for account in &accounts {
            for index in account.indexes {
                let holders = by_index.entry(index).or_default();
                if !holders.contains(&account.id) {
                    holders.push(account.id);
                }
            }
        }
        Self { accounts, by_index }
    }

    /// Fund and register `config.oracle_count` oracles, skipping any already
    /// registered, then read back their indices.
    pub fn bootstrap(ledger: &SharedLedger, config: &SimulatorConfig) -> Result<Self, SimulatorError> {
        info!(oracles = config.oracle_count, "Registering oracles");

        let fee = ledger.read(|l| l.config().oracles.oracle_fee);
        let mut accounts = Vec::with_capacity(config.oracle_count as usize);

        for n in 0..config.oracle_count {
            let id = OracleAccount::identity(n);
            if ledger.read(|l| l.is_oracle_registered(&id)) {
                debug!(oracle = %id.short(), "Oracle already registered");
            } else {
                ledger.write(|l| l.fund_wallet(id, config.oracle_funding))?;
                ledger.submit(Transaction::with_value(id, fee, Call::RegisterOracle))?;
            }
            let indexes = ledger.read(|l| l.my_indexes(&id))?;
            accounts.push(OracleAccount { id, indexes });
        }

        let pool = Self::from_accounts(accounts);
        info!(
            oracles = pool.len(),
            coverage = ?pool.counts(),
            "Oracle pool ready"
        );
        Ok(pool)
    }

    /// Distinct oracles holding `index`.
    pub fn oracles_for(&self, index: OracleIndex) -> &[Principal] {
        self.by_index.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Holder count for every index.
    pub fn counts(&self) -> Vec<usize> {
        OracleIndex::all()
            .map(|index| self.oracles_for(index).len())
            .collect()
    }

    /// Indices with fewer than `need` holders.
    pub fn under_covered(&self, need: usize) -> Vec<IndexCoverage> {
        OracleIndex::all()
            .map(|index| IndexCoverage {
                index,
                have: self.oracles_for(index).len(),
                need,
            })
            .filter(|c| c.have < c.need)
            .collect()
    }

    /// Fail with every under-covered index if any index has fewer than
    /// `need` holders.
    pub fn check_coverage(&self, need: usize) -> Result<(), SimulatorError> {
        let missing = self.under_covered(need);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SimulatorError::UnderCoveredIndices(missing))
        }
    }

    pub fn accounts(&self) -> &[OracleAccount] {
        &self.accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(i: u8) -> OracleIndex {
        OracleIndex::new(i).unwrap()
    }

    fn account(n: u64, indexes: [u8; 3]) -> OracleAccount {
        OracleAccount {
            id: OracleAccount::identity(n),
            indexes: indexes.map(idx),
        }
    }

    #[test]
    fn test_duplicate_index_counts_once() {
        let pool = OraclePool::from_accounts(vec![account(0, [1, 1, 2]), account(1, [1, 3, 4])]);

        assert_eq!(
            pool.oracles_for(idx(1)),
            &[OracleAccount::identity(0), OracleAccount::identity(1)]
        );
        assert_eq!(pool.oracles_for(idx(2)), &[OracleAccount::identity(0)]);
        assert!(pool.oracles_for(idx(9)).is_empty());
    }

    #[test]
    fn test_coverage_lists_every_short_index() {
        let pool = OraclePool::from_accounts(vec![
            account(0, [0, 1, 2]),
            account(1, [0, 1, 3]),
            account(2, [0, 4, 5]),
        ]);

        let missing = pool.under_covered(2);
        let short: Vec<u8> = missing.iter().map(|c| c.index.get()).collect();
        assert_eq!(short, vec![2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(missing[0].have, 1);
        assert_eq!(missing[0].need, 2);

        match pool.check_coverage(2) {
            Err(SimulatorError::UnderCoveredIndices(list)) => assert_eq!(list.len(), 8),
            other => panic!("expected under-coverage, got {other:?}"),
        }
    }

    #[test]
    fn test_triple_holder_covers_index_once() {
        let pool = OraclePool::from_accounts(vec![account(0, [6, 6, 6])]);

        let missing = pool.under_covered(3);
        let six = missing.iter().find(|c| c.index == idx(6)).unwrap();
        assert_eq!(six.have, 1);
        assert!(pool.check_coverage(3).is_err());
    }

    #[test]
    fn test_full_coverage_passes() {
        let accounts = (0..10u64)
            .map(|n| {
                let i = n as u8;
                account(n, [i, (i + 1) % 10, (i + 2) % 10])
            })
            .collect();
        let pool = OraclePool::from_accounts(accounts);

        assert!(pool.check_coverage(3).is_ok());
        assert!(pool.check_coverage(4).is_err());
    }
}
