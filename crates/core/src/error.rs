//! Error types for ledger calls.

use surety_types::{Amount, OracleIndex};
use thiserror::Error;

/// Why a ledger call was rejected.
///
/// A rejected call never changes state. The display string is the reason
/// surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The caller lacks the role or state the call requires.
    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    /// The owner has paused the ledger.
    #[error("Contract is currently not operational.")]
    NotOperational,

    /// The subject is already registered.
    #[error("Already registered.")]
    AlreadyRegistered,

    /// The airline has already paid its participation fee.
    #[error("Airline is already participating.")]
    AlreadyParticipating,

    /// The passenger already holds a policy on the flight.
    #[error("Passenger is already insured for the given flight.")]
    AlreadyInsured,

    /// The voter already voted for the candidate.
    #[error("The caller has already voted to register the candidate.")]
    DuplicateVote,

    /// The value sent does not cover the required fee.
    #[error("Insufficient funds: required {required}, provided {provided}.")]
    InsufficientFunds { required: Amount, provided: Amount },

    /// The caller's wallet cannot cover the value sent plus gas.
    #[error("Caller balance cannot cover the transaction.")]
    InsufficientBalance,

    /// The premium exceeds the per-policy ceiling.
    #[error("Insurance amount {provided} exceeds the cap of {cap}.")]
    AmountExceedsCap { cap: Amount, provided: Amount },

    /// The oracle is not assigned to the request's index.
    #[error("Index {index} does not match oracle request.")]
    NotAssignedToIndex { index: OracleIndex },

    /// No open request exists for the flight on that index.
    #[error("Flight or timestamp do not match an open oracle request.")]
    RequestClosed,

    /// The oracle already answered this request.
    #[error("Oracle has already responded to this request.")]
    DuplicateResponse,

    /// The caller is not a registered oracle.
    #[error("Not registered as an oracle.")]
    NotRegistered,

    /// The caller has no credit to withdraw.
    #[error("No credit available to withdraw.")]
    NoCredit,

    /// The flight's airline has not paid its participation fee.
    #[error("Airline is not participating.")]
    AirlineNotParticipating,

    /// The flight has never been insured.
    #[error("Flight is not known to the ledger.")]
    UnknownFlight,

    /// The flight's status has already reached consensus.
    #[error("Flight status has already been finalized.")]
    StatusAlreadyFinalized,

    /// The ledger's own funds cannot cover a payout.
    #[error("Escrow funds cannot cover the payout.")]
    EscrowUnderfunded,

    /// Amount arithmetic overflowed.
    #[error("Amount overflow.")]
    AmountOverflow,
}
