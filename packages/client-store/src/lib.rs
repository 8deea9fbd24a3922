//! The store of a single light client: its client state, the consensus states it tracks
//! and the metadata recorded when each consensus state was processed.
//!
//! All functions operate on the client's isolated [`cosmwasm_std::Storage`], or on any
//! [`ReadonlyStorage`] when they only read. Keys follow the host layout:
//!
//! - `clientState`
//! - `consensusStates/{height}`
//! - `consensusStates/{height}/processedTime` (nanoseconds, big-endian `u64`)
//! - `consensusStates/{height}/processedHeight` (`"{revision}-{height}"`)
//! - `iterateConsensusStates/{16-byte big-endian height}` pointing at the consensus state key
#![deny(
    clippy::nursery,
    clippy::pedantic,
    warnings,
    missing_docs,
    unused_crate_dependencies
)]

pub mod error;
pub mod genesis;
pub mod prefixed;
pub mod state;

pub use error::StoreError;
pub use genesis::{export_metadata, import_metadata, GenesisMetadata};
pub use prefixed::{client_store_prefix, PrefixedStorage, ReadonlyPrefixedStorage, ReadonlyStorage};
pub use state::*;
