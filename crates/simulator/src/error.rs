//! Simulator errors.

use std::fmt;
use surety_core::LedgerError;
use surety_types::OracleIndex;
use thiserror::Error;

/// How many oracles hold an index against how many are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexCoverage {
    pub index: OracleIndex,
    pub have: usize,
    pub need: usize,
}

impl fmt::Display for IndexCoverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}/{}", self.index, self.have, self.need)
    }
}

/// Errors that stop a simulation.
#[derive(Debug, Error)]
pub enum SimulatorError {
    /// One or more indices cannot reach quorum with the registered oracles.
    #[error("under-covered oracle indices (index : have/need): {}", format_coverage(.0))]
    UnderCoveredIndices(Vec<IndexCoverage>),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("ledger rejected setup transaction: {0}")]
    Ledger(#[from] LedgerError),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to render configuration: {0}")]
    ConfigRender(#[from] toml::ser::Error),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to create latency histogram: {0}")]
    Metrics(#[from] hdrhistogram::CreationError),
}

fn format_coverage(coverage: &[IndexCoverage]) -> String {
    coverage
        .iter()
        .map(IndexCoverage::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_under_covered_lists_every_index() {
        let err = SimulatorError::UnderCoveredIndices(vec![
            IndexCoverage {
                index: OracleIndex::new(2).unwrap(),
                have: 1,
                need: 3,
            },
            IndexCoverage {
                index: OracleIndex::new(7).unwrap(),
                have: 0,
                need: 3,
            },
        ]);

        assert_eq!(
            err.to_string(),
            "under-covered oracle indices (index : have/need): 2 : 1/3, 7 : 0/3"
        );
    }
}
