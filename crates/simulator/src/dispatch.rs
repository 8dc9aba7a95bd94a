//! Concurrent submission of planned oracle responses.

use crate::{ResponsePlan, SimulatorError};
use hdrhistogram::Histogram;
use std::time::Instant;
use surety_core::{Call, LedgerError, Transaction};
use surety_ledger::SharedLedger;
use surety_types::{FlightKey, LedgerEvent, OracleIndex, StatusCode};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Outcome of submitting one plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchReport {
    pub flight: FlightKey,
    pub index: OracleIndex,
    pub planned: usize,
    pub accepted: usize,
    /// Rejected because quorum had already been reached.
    pub request_closed: usize,
    /// Rejected because the oracle does not hold the index.
    pub not_assigned: usize,
    pub other_rejections: usize,
    /// Code the ledger finalized during this dispatch, if any.
    pub finalized: Option<StatusCode>,
    pub p50_latency_micros: u64,
    pub max_latency_micros: u64,
}

impl DispatchReport {
    fn new(plan: &ResponsePlan) -> Self {
        Self {
            flight: plan.flight.clone(),
            index: plan.index,
            planned: plan.responses.len(),
            accepted: 0,
            request_closed: 0,
            not_assigned: 0,
            other_rejections: 0,
            finalized: None,
            p50_latency_micros: 0,
            max_latency_micros: 0,
        }
    }

    /// Total rejected submissions.
    pub fn rejected(&self) -> usize {
        self.request_closed + self.not_assigned + self.other_rejections
    }
}

/// Submit every response in `plan` concurrently, one task per oracle.
///
/// Rejections are counted and logged, never retried, and never stop the
/// remaining submissions.
pub async fn dispatch(ledger: &SharedLedger, plan: ResponsePlan) -> Result<DispatchReport, SimulatorError> {
    let mut report = DispatchReport::new(&plan);
    let mut latency = Histogram::<u64>::new(3)?;
    let mut tasks = JoinSet::new();

    for (oracle, status) in plan.responses.iter().copied() {
        let ledger = ledger.clone();
        let tx = Transaction::new(
            oracle,
            Call::SubmitOracleResponse {
                index: plan.index,
                flight: plan.flight.clone(),
                status,
            },
        );
        tasks.spawn(async move {
            let started = Instant::now();
            let result = ledger.submit(tx);
            (oracle, status, result, started.elapsed())
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (oracle, status, result, elapsed) = match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Response task failed");
                report.other_rejections += 1;
                continue;
            }
        };
        latency.saturating_record(u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX));

        match result {
            Ok(receipt) => {
                report.accepted += 1;
                for event in receipt.events {
                    if let LedgerEvent::FlightStatusInfo { status, .. } = event {
                        report.finalized = Some(status);
                    }
                }
            }
            Err(LedgerError::RequestClosed) => {
                report.request_closed += 1;
                debug!(oracle = %oracle.short(), status = ?status, "Response after request closed");
            }
            Err(LedgerError::NotAssignedToIndex { index }) => {
                report.not_assigned += 1;
                warn!(oracle = %oracle.short(), index = index.get(), "Oracle not assigned to index");
            }
            Err(err) => {
                report.other_rejections += 1;
                warn!(oracle = %oracle.short(), error = %err, "Response rejected");
            }
        }
    }

    report.p50_latency_micros = latency.value_at_quantile(0.5);
    report.max_latency_micros = latency.max();

    info!(
        flight = %report.flight,
        index = report.index.get(),
        accepted = report.accepted,
        rejected = report.rejected(),
        finalized = ?report.finalized,
        "Responses dispatched"
    );
    Ok(report)
}
