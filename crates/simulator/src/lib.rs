//! Flight Surety Oracle Simulator
//!
//! An off-ledger stand-in for a fleet of oracles, plus a scenario runner
//! that drives a ledger from genesis to settled credit.
//!
//! # Architecture
//!
//! - **Oracle Accounts**: Funded oracle identities registered with the ledger
//! - **Response Planning**: Seeded consensus plus weighted independent draws
//! - **Dispatch**: One task per oracle; rejections counted, never retried
//! - **Configuration**: TOML-loadable settings for the simulator and ledger
//!
//! # Example
//!
//! ```ignore
//! use surety_simulator::{run_scenario, SimulatorConfig};
//!
//! let config = SimulatorConfig::default().with_seed(7);
//! let report = run_scenario(config).await?;
//! report.print();
//! ```

pub mod accounts;
pub mod config;
pub mod cursor;
pub mod dispatch;
pub mod error;
pub mod scenario;
pub mod simulator;
pub mod workload;

pub use accounts::{OracleAccount, OraclePool};
pub use config::{ScenarioConfig, SimulatorConfig, MIN_PAYOUT_BIAS};
pub use cursor::EventCursor;
pub use dispatch::{dispatch, DispatchReport};
pub use error::{IndexCoverage, SimulatorError};
pub use scenario::{genesis_ledger, run_scenario, FlightOutcome, SettlementReport};
pub use simulator::OracleSimulator;
pub use workload::{plan_responses, ResponsePlan, StatusDistribution};
