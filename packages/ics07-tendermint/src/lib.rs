//! The ICS-07 Tendermint light client.
//!
//! Every operation takes the client's isolated store and, where time or height matter, the
//! host [`cosmwasm_std::Env`]. Status is derived on demand from the stored states:
//! - a client with a non-zero frozen height is [`Status::Frozen`](ibc_eureka_host_types::Status),
//! - a client whose latest consensus state left the trusting period is `Expired`,
//! - any other client is `Active`.
#![deny(
    clippy::nursery,
    clippy::pedantic,
    warnings,
    missing_docs,
    unused_crate_dependencies
)]

// serde_json is only used by the integration tests
#[cfg(test)]
use serde_json as _;
// the self dev-dependency only enables the test-utils feature for integration tests
#[cfg(test)]
use ibc_eureka_ics07_tendermint as _;

pub mod client;
pub mod client_message;
pub mod client_state;
pub mod consensus_state;
pub mod error;
pub mod header;
pub mod membership;
pub mod misbehaviour;
pub mod recovery;
pub mod trust_threshold;
pub mod update;
pub mod upgrade;
pub mod verify;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use client_message::ClientMessage;
pub use client_state::{ClientState, FROZEN_HEIGHT};
pub use consensus_state::{ConsensusState, SENTINEL_ROOT};
pub use error::TendermintClientError;
pub use header::Header;
pub use membership::{DelayPeriod, PacketKey};
pub use misbehaviour::{Misbehaviour, MisbehaviourKind};
pub use trust_threshold::TrustThreshold;

/// The client type of Tendermint clients.
pub const TENDERMINT_CLIENT_TYPE: &str = "07-tendermint";
