//! Oracle response generation.
//!
//! Decides which status each oracle reports for a request. One code is
//! chosen as the consensus and guaranteed enough answers to reach quorum;
//! every other answer is drawn independently.

mod responses;

pub use responses::{plan_responses, ResponsePlan};

use rand::seq::SliceRandom;
use rand::Rng;
use surety_types::StatusCode;

/// Weighted status draw: the payout code with probability `payout_bias`,
/// otherwise any code uniformly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatusDistribution {
    payout_bias: f64,
}

impl StatusDistribution {
    pub fn new(payout_bias: f64) -> Self {
        Self {
            payout_bias: payout_bias.clamp(0.0, 1.0),
        }
    }

    /// Draw any status, `Unknown` included.
    pub fn sample(&self, rng: &mut impl Rng) -> StatusCode {
        if rng.gen_bool(self.payout_bias) {
            return StatusCode::LateAirline;
        }
        *StatusCode::ALL
            .choose(rng)
            .unwrap_or(&StatusCode::LateAirline)
    }

    /// Draw a status that can be finalized, redrawing on `Unknown`.
    pub fn sample_consensus(&self, rng: &mut impl Rng) -> StatusCode {
        loop {
            let status = self.sample(rng);
            if status != StatusCode::Unknown {
                return status;
            }
        }
    }
}
