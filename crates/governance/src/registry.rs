//! Authoritative record of airlines and their governance state.

use crate::config::GovernanceConfig;
use crate::voting::{quorum, CandidateVotes};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use surety_core::LedgerError;
use surety_types::{Amount, LedgerEvent, Principal};
use tracing::{debug, info};

/// Where an airline stands in the federation.
///
/// An airline with no entry is unregistered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AirlineState {
    /// Nominated, collecting votes.
    Candidate,
    /// Admitted, fee not yet paid.
    Registered,
    /// Admitted and fee paid: may vote and sell insurance.
    Participating,
}

/// An airline known to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airline {
    pub id: Principal,
    pub name: String,
    pub state: AirlineState,
}

impl Airline {
    /// Registered or participating.
    pub fn is_registered(&self) -> bool {
        matches!(
            self.state,
            AirlineState::Registered | AirlineState::Participating
        )
    }

    pub fn fee_paid(&self) -> bool {
        self.state == AirlineState::Participating
    }
}

/// Airline registry with quorum-gated admission.
///
/// Below `pre_consensus_airlines` registered airlines, any participating
/// airline admits a candidate on its own. From then on a candidate needs
/// votes from `consensus_percent` of the registered airlines.
#[derive(Debug)]
pub struct AirlineRegistry {
    config: GovernanceConfig,
    /// Every airline ever nominated, in nomination order.
    airlines: IndexMap<Principal, Airline>,
    votes: CandidateVotes,
    /// Airlines in `Registered` or `Participating`.
    registered_count: usize,
}

impl AirlineRegistry {
    /// Create an empty registry.
    pub fn new(config: GovernanceConfig) -> Self {
        Self {
            config,
            airlines: IndexMap::new(),
            votes: CandidateVotes::new(),
            registered_count: 0,
        }
    }

    /// Create a registry whose first airline is registered at deployment.
    ///
    /// The genesis airline still has to pay its fee before it can vote.
    pub fn with_genesis_airline(
        config: GovernanceConfig,
        airline: Principal,
        name: impl Into<String>,
    ) -> Self {
        let mut registry = Self::new(config);
        registry.airlines.insert(
            airline,
            Airline {
                id: airline,
                name: name.into(),
                state: AirlineState::Registered,
            },
        );
        registry.registered_count = 1;
        registry
    }

    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Mutations
    // ═══════════════════════════════════════════════════════════════════════════

    /// Nominate `candidate` or add `caller`'s vote to it.
    ///
    /// Returns the `AirlineRegistered` event when the candidate is admitted
    /// by this call, and nothing when the vote falls short of quorum.
    pub fn register_airline(
        &mut self,
        candidate: Principal,
        name: &str,
        caller: Principal,
    ) -> Result<Vec<LedgerEvent>, LedgerError> {
        if !self.is_participating_airline(&caller) {
            return Err(LedgerError::Unauthorized(
                "Caller is not a participating airline.",
            ));
        }
        if self.is_registered_airline(&candidate) {
            return Err(LedgerError::AlreadyRegistered);
        }

        if self.registered_count < self.config.pre_consensus_airlines {
            self.airlines.insert(
                candidate,
                Airline {
                    id: candidate,
                    name: name.to_string(),
                    state: AirlineState::Registered,
                },
            );
            self.registered_count += 1;
            self.votes.clear(&candidate);

            info!(
                airline = %candidate.short(),
                name,
                registered = self.registered_count,
                "Airline registered before consensus threshold"
            );
            return Ok(vec![LedgerEvent::AirlineRegistered {
                airline: candidate,
                name: name.to_string(),
            }]);
        }

        let required = quorum(self.config.consensus_percent, self.registered_count);
        let votes = self.votes.cast(candidate, caller)?;
        let entry = self.airlines.entry(candidate).or_insert_with(|| Airline {
            id: candidate,
            name: name.to_string(),
            state: AirlineState::Candidate,
        });

        if votes < required {
            debug!(
                candidate = %candidate.short(),
                voter = %caller.short(),
                votes,
                required,
                "Candidate vote recorded"
            );
            return Ok(vec![]);
        }

        entry.state = AirlineState::Registered;
        let name = entry.name.clone();
        self.registered_count += 1;
        self.votes.clear(&candidate);

        info!(
            airline = %candidate.short(),
            name = %name,
            votes,
            required,
            "Candidate reached quorum"
        );
        Ok(vec![LedgerEvent::AirlineRegistered {
            airline: candidate,
            name,
        }])
    }

    /// Accept `caller`'s participation fee out of `value`.
    ///
    /// Returns the excess to refund. The caller's net cost is exactly the fee.
    pub fn pay_airline_fee(
        &mut self,
        caller: Principal,
        value: Amount,
    ) -> Result<Amount, LedgerError> {
        let fee = self.config.airline_fee;
        let airline = match self.airlines.get_mut(&caller) {
            Some(airline) => airline,
            None => {
                return Err(LedgerError::Unauthorized(
                    "Caller is not a registered airline.",
                ))
            }
        };

        match airline.state {
            AirlineState::Candidate => {
                return Err(LedgerError::Unauthorized(
                    "Caller is not a registered airline.",
                ))
            }
            AirlineState::Participating => return Err(LedgerError::AlreadyParticipating),
            AirlineState::Registered => {}
        }

        let refund = value
            .checked_sub(fee)
            .ok_or(LedgerError::InsufficientFunds {
                required: fee,
                provided: value,
            })?;

        airline.state = AirlineState::Participating;
        info!(airline = %caller.short(), %fee, %refund, "Airline fee paid");
        Ok(refund)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn airline(&self, id: &Principal) -> Option<&Airline> {
        self.airlines.get(id)
    }

    pub fn is_registered_airline(&self, id: &Principal) -> bool {
        self.airline(id).is_some_and(Airline::is_registered)
    }

    pub fn is_participating_airline(&self, id: &Principal) -> bool {
        self.airline(id).is_some_and(Airline::fee_paid)
    }

    pub fn is_candidate_airline(&self, id: &Principal) -> bool {
        self.airline(id)
            .is_some_and(|a| a.state == AirlineState::Candidate)
    }

    pub fn candidate_votes(&self, candidate: &Principal) -> usize {
        self.votes.votes(candidate)
    }

    pub fn is_voter_of(&self, candidate: &Principal, voter: &Principal) -> bool {
        self.votes.is_voter_of(candidate, voter)
    }

    /// Name of a registered airline. Candidates have no registered name.
    pub fn registered_airline_name(&self, id: &Principal) -> Option<&str> {
        self.airline(id)
            .filter(|a| a.is_registered())
            .map(|a| a.name.as_str())
    }

    pub fn registered_airline_count(&self) -> usize {
        self.registered_count
    }

    /// Votes a candidate needs at the current registered count.
    pub fn current_quorum(&self) -> usize {
        quorum(self.config.consensus_percent, self.registered_count)
    }
}
