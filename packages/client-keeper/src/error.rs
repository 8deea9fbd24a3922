//! This module defines [`ClientError`].

use ibc_eureka_client_store::StoreError;
use ibc_eureka_commitment::CommitmentError;
use ibc_eureka_host_types::{CodecError, HostError, Status};
use ibc_eureka_ics07_tendermint::TendermintClientError;

/// Errors returned by the client keeper and its light client modules.
#[derive(thiserror::Error, Debug)]
#[allow(missing_docs, clippy::module_name_repetitions)]
pub enum ClientError {
    #[error("client {0} not found")]
    ClientNotFound(String),

    #[error("client {client_id} is not active, status: {status}")]
    ClientNotActive { client_id: String, status: Status },

    #[error("client {0} is frozen")]
    ClientFrozen(String),

    #[error("client type {0} is not in the allowed clients")]
    ClientTypeNotAllowed(String),

    #[error("no light client module registered for client type {0}")]
    RouteNotFound(String),

    #[error("a light client module is already registered for client type {0}")]
    RouteExists(String),

    #[error("no light client module accepts client states of type {0}")]
    UnknownClientState(String),

    #[error("stored client sequence is malformed: 0x{0}")]
    InvalidClientSequence(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("invalid genesis: {0}")]
    InvalidGenesis(String),

    #[error("invalid client message: {0}")]
    InvalidClientMessage(String),

    #[error("invalid recovery: {0}")]
    InvalidRecovery(String),

    #[error("invalid substitute: {0}")]
    InvalidSubstitute(String),

    #[error("invalid upgrade client: {0}")]
    InvalidUpgradeClient(String),

    #[error("invalid upgrade plan: {0}")]
    InvalidUpgradePlan(String),

    #[error("invalid proof: {0}")]
    InvalidProof(String),

    #[error("invalid merkle path {path}: {reason}")]
    InvalidMerklePath { path: String, reason: String },

    #[error("no value stored under {0}")]
    ValueNotFound(String),

    #[error("value under {path} is 0x{actual}, expected 0x{expected}")]
    ValueMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("value 0x{value} stored under {path}, expected none")]
    UnexpectedValue { path: String, value: String },

    #[error("{client_type} clients do not support {operation}")]
    UnsupportedOperation {
        client_type: &'static str,
        operation: &'static str,
    },

    #[error("tendermint client error: {0}")]
    Tendermint(#[from] TendermintClientError),

    #[error("client store error: {0}")]
    Store(#[from] StoreError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("invalid identifier: {0}")]
    Host(#[from] HostError),

    #[error("commitment error: {0}")]
    Commitment(#[from] CommitmentError),

    #[error("failed to (de)serialize json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to decode Any: {0}")]
    Decode(#[from] prost::DecodeError),
}
