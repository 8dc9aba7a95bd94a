//! Transactions submitted to the ledger and the receipts they produce.

use serde::{Deserialize, Serialize};
use surety_types::{Amount, FlightKey, LedgerEvent, OracleIndex, Principal, StatusCode};

/// A call delivered by the transaction layer: who sent it, how much value
/// came with it, and what it asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub caller: Principal,
    /// Value transferred from the caller's wallet along with the call.
    pub value: Amount,
    pub call: Call,
}

impl Transaction {
    /// A call that carries no value.
    pub fn new(caller: Principal, call: Call) -> Self {
        Self {
            caller,
            value: Amount::ZERO,
            call,
        }
    }

    /// A call that transfers `value` to the ledger.
    pub fn with_value(caller: Principal, value: Amount, call: Call) -> Self {
        Self {
            caller,
            value,
            call,
        }
    }
}

/// Every mutation the ledger accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Call {
    // ═══════════════════════════════════════════════════════════════════════
    // Governance
    // ═══════════════════════════════════════════════════════════════════════
    /// Nominate or vote for `candidate`.
    RegisterAirline { candidate: Principal, name: String },

    /// Pay the participation fee (sent as the transaction value).
    PayAirlineFee,

    // ═══════════════════════════════════════════════════════════════════════
    // Oracles
    // ═══════════════════════════════════════════════════════════════════════
    /// Stake the registration fee and receive three index shards.
    RegisterOracle,

    /// Ask oracles for a flight's status.
    FetchFlightStatus { flight: FlightKey },

    /// Report a status for an open request on `index`.
    SubmitOracleResponse {
        index: OracleIndex,
        flight: FlightKey,
        status: StatusCode,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Escrow
    // ═══════════════════════════════════════════════════════════════════════
    /// Insure the caller on `flight`; the premium is the transaction value.
    PurchaseInsurance { flight: FlightKey },

    /// Withdraw the caller's entire credit balance.
    WithdrawCredit,

    // ═══════════════════════════════════════════════════════════════════════
    // Owner administration
    // ═══════════════════════════════════════════════════════════════════════
    /// Allow `layer` to mutate ledger state.
    AuthorizeCaller { layer: Principal },

    /// Revoke a previous authorization.
    DeauthorizeCaller { layer: Principal },

    /// Pause or resume every non-owner mutation.
    SetOperational { operational: bool },
}

impl Call {
    /// Get a human-readable name for this call.
    pub fn type_name(&self) -> &'static str {
        match self {
            Call::RegisterAirline { .. } => "RegisterAirline",
            Call::PayAirlineFee => "PayAirlineFee",
            Call::RegisterOracle => "RegisterOracle",
            Call::FetchFlightStatus { .. } => "FetchFlightStatus",
            Call::SubmitOracleResponse { .. } => "SubmitOracleResponse",
            Call::PurchaseInsurance { .. } => "PurchaseInsurance",
            Call::WithdrawCredit => "WithdrawCredit",
            Call::AuthorizeCaller { .. } => "AuthorizeCaller",
            Call::DeauthorizeCaller { .. } => "DeauthorizeCaller",
            Call::SetOperational { .. } => "SetOperational",
        }
    }

    /// Check if this call is reserved for the ledger owner.
    pub fn is_owner_only(&self) -> bool {
        matches!(
            self,
            Call::AuthorizeCaller { .. } | Call::DeauthorizeCaller { .. } | Call::SetOperational { .. }
        )
    }
}

/// Result of a successfully applied transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Events emitted, in emission order.
    pub events: Vec<LedgerEvent>,
    /// Value returned to the caller out of what was sent.
    pub refund: Amount,
    /// Amount paid out of the ledger to the caller (credit withdrawals).
    pub payout: Amount,
    /// Flat transaction cost charged to the caller.
    pub gas_cost: Amount,
}
