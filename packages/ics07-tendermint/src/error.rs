//! This module defines [`TendermintClientError`].

use ibc_eureka_client_store::StoreError;
use ibc_eureka_commitment::CommitmentError;
use ibc_eureka_host_types::{CodecError, Height, Status};

/// Errors returned by the Tendermint light client.
#[derive(thiserror::Error, Debug)]
#[allow(missing_docs, clippy::module_name_repetitions)]
pub enum TendermintClientError {
    /// The client state failed validation
    #[error("invalid client state: {0}")]
    InvalidClient(String),

    /// No client state is stored
    #[error("client state not found")]
    ClientNotFound,

    /// The client is frozen
    #[error("client is frozen")]
    ClientFrozen,

    /// No consensus state is tracked at the height
    #[error("consensus state not found at height {0}")]
    ConsensusStateNotFound(Height),

    /// A consensus state failed validation or does not decode
    #[error("invalid consensus state: {0}")]
    InvalidConsensus(String),

    /// The header failed structural or cryptographic checks
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The header height does not sit above its trusted height
    #[error("header height {header} must be greater than trusted height {trusted}")]
    InvalidHeaderHeight { header: Height, trusted: Height },

    /// The header conflicts with the consensus states already stored
    #[error("header at height {0} conflicts with stored consensus states")]
    ConflictingHeader(Height),

    /// The two headers do not constitute misbehaviour
    #[error("invalid misbehaviour: {0}")]
    InvalidMisbehaviour(String),

    /// The trusted consensus state is outside the trusting period
    #[error("trusted consensus state at {trusted_timestamp}ns expired at {expired_at}ns (now {now}ns)")]
    TrustingPeriodExpired {
        trusted_timestamp: u64,
        expired_at: u64,
        now: u64,
    },

    /// A commit does not carry enough valid signatures
    #[error("insufficient voting power: signed {signed} of {total}, need more than {numerator}/{denominator}")]
    InsufficientVotingPower {
        signed: u64,
        total: u64,
        numerator: u64,
        denominator: u64,
    },

    /// The substitute client does not match the subject client
    #[error("invalid substitute client: {0}")]
    InvalidSubstitute(String),

    /// Recovery was attempted on a client that does not need it
    #[error("cannot recover client with status {0}")]
    UpdateClientFailed(Status),

    /// The upgraded client or its proofs are invalid
    #[error("invalid upgrade client: {0}")]
    InvalidUpgradeClient(String),

    /// No processed time is recorded for the consensus state
    #[error("processed time not found for height {0}")]
    ProcessedTimeNotFound(Height),

    /// No processed height is recorded for the consensus state
    #[error("processed height not found for height {0}")]
    ProcessedHeightNotFound(Height),

    /// The delay period has not elapsed
    #[error("delay period not passed: {0}")]
    DelayPeriodNotPassed(String),

    /// A Merkle proof failed to verify
    #[error("invalid proof: {0}")]
    InvalidProof(#[from] CommitmentError),

    /// A message or value could not be encoded or decoded
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Any other client store failure
    #[error("client store error: {0}")]
    Store(#[source] StoreError),
}

impl From<StoreError> for TendermintClientError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ClientStateNotFound => Self::ClientNotFound,
            StoreError::ConsensusStateNotFound(height) => Self::ConsensusStateNotFound(height),
            StoreError::InvalidConsensus { height, source } => {
                Self::InvalidConsensus(format!("at height {height}: {source}"))
            }
            StoreError::InvalidClientState(source) => Self::InvalidClient(source.to_string()),
            other => Self::Store(other),
        }
    }
}
