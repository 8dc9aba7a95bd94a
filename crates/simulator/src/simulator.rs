//! The oracle response simulator.

use crate::{
    dispatch, plan_responses, DispatchReport, EventCursor, OraclePool, SimulatorConfig,
    SimulatorError, StatusDistribution,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use surety_ledger::SharedLedger;
use surety_types::LedgerEvent;
use tracing::{debug, info};

/// Plays every simulated oracle against one ledger.
///
/// Watches the event log for status requests and answers each still-open
/// request with every oracle holding its index.
pub struct OracleSimulator {
    ledger: SharedLedger,
    pool: OraclePool,
    distribution: StatusDistribution,
    min_responses: usize,
    rng: ChaCha8Rng,
    cursor: EventCursor,
}

impl OracleSimulator {
    /// Register the oracle pool and check that every index can reach quorum.
    ///
    /// Fails before any request is served if an index is under-covered.
    pub fn start(ledger: SharedLedger, config: &SimulatorConfig) -> Result<Self, SimulatorError> {
        config.validate()?;
        let pool = OraclePool::bootstrap(&ledger, config)?;
        pool.check_coverage(config.min_oracles_per_index as usize)?;

        let min_responses = ledger.read(|l| l.config().oracles.min_responses) as usize;
        info!(
            oracles = pool.len(),
            min_responses,
            seed = config.seed,
            "Oracle simulator started"
        );

        Ok(Self {
            ledger,
            pool,
            distribution: StatusDistribution::new(config.payout_bias),
            min_responses,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            cursor: EventCursor::new(),
        })
    }

    /// Answer every request opened since the last call.
    pub async fn process_pending(&mut self) -> Result<Vec<DispatchReport>, SimulatorError> {
        let mut reports = Vec::new();

        for logged in self.cursor.poll(&self.ledger) {
            let LedgerEvent::OracleRequest { index, flight } = logged.event else {
                continue;
            };
            if !self
                .ledger
                .read(|l| l.is_oracle_request_open_for_index(&flight, index))
            {
                debug!(flight = %flight, index = index.get(), "Request no longer open");
                continue;
            }

            let plan = plan_responses(
                flight,
                index,
                self.pool.oracles_for(index),
                self.min_responses,
                &self.distribution,
                &mut self.rng,
            );
            debug!(
                flight = %plan.flight,
                index = index.get(),
                consensus = ?plan.consensus,
                responders = plan.responses.len(),
                "Planned responses"
            );
            reports.push(dispatch(&self.ledger, plan).await?);
        }
        Ok(reports)
    }

    pub fn pool(&self) -> &OraclePool {
        &self.pool
    }

    pub fn cursor(&self) -> EventCursor {
        self.cursor
    }
}
