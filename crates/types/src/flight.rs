//! Flights and their status codes.

use crate::Principal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one departure of one flight: `(airline, flight code, timestamp)`.
///
/// Every oracle request, policy and finalized status is keyed by this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlightKey {
    /// Operating airline.
    pub airline: Principal,
    /// Flight code, e.g. `"123"`.
    pub flight: String,
    /// Scheduled departure, unix seconds.
    pub timestamp: u64,
}

impl FlightKey {
    pub fn new(airline: Principal, flight: impl Into<String>, timestamp: u64) -> Self {
        Self {
            airline,
            flight: flight.into(),
            timestamp,
        }
    }
}

impl fmt::Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}@{}", self.airline.short(), self.flight, self.timestamp)
    }
}

/// Real-world status of a flight as reported by oracles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum StatusCode {
    Unknown,
    OnTime,
    /// Delay attributable to the airline. The only code that pays out.
    LateAirline,
    LateWeather,
    LateTechnical,
    LateOther,
}

impl StatusCode {
    /// Every status code, in numeric order.
    pub const ALL: [StatusCode; 6] = [
        StatusCode::Unknown,
        StatusCode::OnTime,
        StatusCode::LateAirline,
        StatusCode::LateWeather,
        StatusCode::LateTechnical,
        StatusCode::LateOther,
    ];

    /// Numeric wire value (0, 10, .., 50).
    pub fn code(self) -> u8 {
        match self {
            StatusCode::Unknown => 0,
            StatusCode::OnTime => 10,
            StatusCode::LateAirline => 20,
            StatusCode::LateWeather => 30,
            StatusCode::LateTechnical => 40,
            StatusCode::LateOther => 50,
        }
    }

    /// Whether a flight finalized with this code credits its policies.
    pub fn is_payout(self) -> bool {
        matches!(self, StatusCode::LateAirline)
    }
}

impl TryFrom<u8> for StatusCode {
    type Error = InvalidStatusCode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        StatusCode::ALL
            .into_iter()
            .find(|status| status.code() == value)
            .ok_or(InvalidStatusCode(value))
    }
}

impl From<StatusCode> for u8 {
    fn from(status: StatusCode) -> Self {
        status.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Returned when a numeric value is not one of the six status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{0} is not a valid flight status code")]
pub struct InvalidStatusCode(pub u8);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_conversion() {
        for status in StatusCode::ALL {
            assert_eq!(StatusCode::try_from(status.code()), Ok(status));
        }
        assert_eq!(StatusCode::try_from(25), Err(InvalidStatusCode(25)));
    }

    #[test]
    fn test_only_airline_fault_pays() {
        let payouts: Vec<_> = StatusCode::ALL.into_iter().filter(|s| s.is_payout()).collect();
        assert_eq!(payouts, vec![StatusCode::LateAirline]);
    }

    #[test]
    fn test_flight_key_display() {
        let airline = Principal::from_raw([0x11; 20]);
        let key = FlightKey::new(airline, "123", 1_700_000_000);
        assert_eq!(key.to_string(), "0x1111..1111#123@1700000000");
    }
}
