//! Response plans for individual requests.

use crate::workload::StatusDistribution;
use rand::seq::SliceRandom;
use rand::Rng;
use surety_types::{FlightKey, OracleIndex, Principal, StatusCode};

/// Which oracle reports which status for one request, in submission order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponsePlan {
    pub flight: FlightKey,
    pub index: OracleIndex,
    /// The code seeded into the first `min_responses` slots.
    pub consensus: StatusCode,
    pub responses: Vec<(Principal, StatusCode)>,
}

impl ResponsePlan {
    /// Number of planned answers carrying `status`.
    pub fn count_of(&self, status: StatusCode) -> usize {
        self.responses.iter().filter(|(_, s)| *s == status).count()
    }
}

/// Plan responses from `oracles` to the request for `flight` on `index`.
///
/// The consensus code fills the first `min_responses` code slots and the
/// rest are independent draws. Oracle order and code slots are shuffled
/// separately, so which oracles carry the consensus is random.
pub fn plan_responses(
    flight: FlightKey,
    index: OracleIndex,
    oracles: &[Principal],
    min_responses: usize,
    distribution: &StatusDistribution,
    rng: &mut impl Rng,
) -> ResponsePlan {
    let consensus = distribution.sample_consensus(rng);

    let mut codes: Vec<StatusCode> = (0..oracles.len())
        .map(|slot| {
            if slot < min_responses {
                consensus
            } else {
                distribution.sample(rng)
            }
        })
        .collect();

    let mut order = oracles.to_vec();
    order.shuffle(rng);
    codes.shuffle(rng);

    ResponsePlan {
        flight,
        index,
        consensus,
        responses: order.into_iter().zip(codes).collect(),
    }
}
