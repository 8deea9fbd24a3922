//! This module defines [`StoreError`].

use ibc_eureka_host_types::{CodecError, Height};

/// Errors returned by the client store.
#[derive(thiserror::Error, Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum StoreError {
    /// No client state is stored
    #[error("client state not found")]
    ClientStateNotFound,

    /// No consensus state is stored at the height
    #[error("consensus state not found at height {0}")]
    ConsensusStateNotFound(Height),

    /// The stored client state does not decode to the expected type
    #[error("invalid client state: {0}")]
    InvalidClientState(#[source] CodecError),

    /// The stored consensus state does not decode to the expected type
    #[error("invalid consensus state at height {height}: {source}")]
    InvalidConsensus {
        /// Height of the consensus state
        height: Height,
        /// Decoding failure
        #[source]
        source: CodecError,
    },

    /// A metadata entry is malformed
    #[error("invalid metadata under key {0}")]
    InvalidMetadata(String),

    /// A value could not be encoded
    #[error("failed to encode value: {0}")]
    Encode(#[source] CodecError),
}
