//! The client keeper routes IBC client messages, verifications and queries to the light
//! client module of each client type.
//!
//! Every client lives in its own prefixed store `clients/{client_id}/` of the keeper's
//! [`cosmwasm_std::Storage`]. Keeper-level state is limited to the next client sequence and
//! the [`Params`](config::Params).
#![deny(
    clippy::nursery,
    clippy::pedantic,
    warnings,
    missing_docs,
    unused_crate_dependencies
)]

// tracing-subscriber is only used by the integration tests
#[cfg(test)]
use tracing_subscriber as _;

pub mod config;
pub mod error;
pub mod genesis;
pub mod keeper;
pub mod localhost;
pub mod module;
pub mod msg;
pub mod query;
pub mod router;
pub mod tendermint;

pub use config::{ClientParams, ConnectionParams, KeeperConfig, Params};
pub use error::ClientError;
pub use genesis::GenesisState;
pub use keeper::Keeper;
pub use localhost::{LocalhostModule, LOCALHOST_CLIENT_ID};
pub use module::LightClientModule;
pub use router::ClientRouter;
pub use tendermint::TendermintModule;
