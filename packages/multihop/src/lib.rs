//! Multi-hop IBC proofs.
//!
//! A multi-hop proof lets a destination chain verify a key committed on a source chain that
//! it is not directly connected to. Each intermediate chain contributes proofs of the client
//! and consensus state it stores for its predecessor and of its connection to that
//! predecessor, all committed under the root the next chain trusts.
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
use ibc_eureka_multihop as _;

pub mod endpoint;
pub mod error;
pub mod proof;
pub mod verify;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use endpoint::{ChanPath, Endpoint, Path};
pub use error::{MultihopError, ProofKind};
pub use proof::{MultihopProof, MultihopProofs};
pub use verify::{block_delay, verify_multihop_proof};
