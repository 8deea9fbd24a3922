//! This module defines [`MultihopError`].

use std::fmt;

use ibc_eureka_commitment::CommitmentError;
use ibc_eureka_host_types::{CodecError, Height};

/// The role of a proof inside a multi-hop bundle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProofKind {
    /// Proof of the key on the source chain
    Key,
    /// Proof of a consensus state stored on an intermediate chain
    Consensus,
    /// Proof of a connection end stored on an intermediate chain
    Connection,
    /// Proof of a client state stored on an intermediate chain
    Client,
}

impl fmt::Display for ProofKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key => f.write_str("key"),
            Self::Consensus => f.write_str("consensus state"),
            Self::Connection => f.write_str("connection"),
            Self::Client => f.write_str("client state"),
        }
    }
}

/// Errors returned while generating or verifying multi-hop proofs.
#[derive(thiserror::Error, Debug)]
#[allow(missing_docs, clippy::module_name_repetitions)]
pub enum MultihopError {
    /// One of the proof lists is empty
    #[error("the number of consensus ({consensus}), connection ({connection}) and client ({client}) proofs must be > 0")]
    EmptyProofs {
        consensus: usize,
        connection: usize,
        client: usize,
    },

    /// The proof lists have different lengths
    #[error("the number of consensus ({consensus}), connection ({connection}) and client ({client}) proofs must be equal")]
    ProofCountMismatch {
        consensus: usize,
        connection: usize,
        client: usize,
    },

    /// The connection proofs do not cover every connection hop but the first
    #[error("expected {expected} connection proofs for {hops} connection hops, got {actual}")]
    ConnectionHopsMismatch {
        hops: usize,
        expected: usize,
        actual: usize,
    },

    /// A connection proof is for another connection than the hop names
    #[error("connection proof for hop {hop} is for {actual}, expected {expected}")]
    UnexpectedConnectionHop {
        hop: usize,
        expected: String,
        actual: String,
    },

    /// A connection on the path has not completed its handshake
    #[error("connection {connection_id} at hop {hop} is not open")]
    ConnectionNotOpen { hop: usize, connection_id: String },

    /// An intermediate client has been frozen by misbehaviour
    #[error("client {client_id} at hop {hop} is frozen")]
    ClientFrozen { hop: usize, client_id: String },

    /// The client and consensus proofs of a hop are for different clients
    #[error("consensus proof at hop {hop} is for client {consensus}, client proof for {client}")]
    ClientIdMismatch {
        hop: usize,
        consensus: String,
        client: String,
    },

    /// A key does not name a client store
    #[error("{kind} proof at hop {hop} has no client id in its key {key}")]
    MalformedKey {
        kind: ProofKind,
        hop: usize,
        key: String,
    },

    /// A proof is committed under another path than the hop's connection end implies
    #[error("{kind} proof at hop {hop} is committed under {actual}, expected {expected}")]
    UnexpectedStatePath {
        kind: ProofKind,
        hop: usize,
        expected: String,
        actual: String,
    },

    /// A connection end records another prefix for its counterparty than the counterparty's
    /// proofs are committed under
    #[error("connection at hop {hop} records counterparty prefix {actual}, expected {expected}")]
    UnexpectedCounterpartyPrefix {
        hop: usize,
        expected: String,
        actual: String,
    },

    /// A proof carries an empty prefixed key
    #[error("{kind} proof at hop {hop} has an empty prefixed key")]
    EmptyPrefixedKey { kind: ProofKind, hop: usize },

    /// A proof value does not decode
    #[error("failed to decode {kind} value at hop {hop}: {source}")]
    Decode {
        kind: ProofKind,
        hop: usize,
        #[source]
        source: CodecError,
    },

    /// A proof does not verify against the root trusted at its hop
    #[error("failed to verify {kind} proof at hop {hop}: {source}")]
    InvalidProof {
        kind: ProofKind,
        hop: usize,
        #[source]
        source: CommitmentError,
    },

    /// The key proof does not verify against the source consensus state
    #[error("failed to verify key proof: {0}")]
    InvalidKeyProof(#[source] CommitmentError),

    /// A channel path needs at least two single-hop paths
    #[error("multi-hop channel path expects at least 2 single-hop paths, got {0}")]
    PathTooShort(usize),

    /// The key or value of a membership proof is empty
    #[error("key and value must be non-empty")]
    EmptyKeyOrValue,

    /// An endpoint has no state under the path
    #[error("no state found on chain {chain_id} under {path}")]
    StateNotFound { chain_id: String, path: String },

    /// An endpoint cannot prove the key at the height
    #[error("chain {chain_id} cannot prove {key} at height {height}")]
    ProofUnavailable {
        chain_id: String,
        key: String,
        height: Height,
    },

    /// A value read from an endpoint does not encode or decode
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// A path or proof read from an endpoint is malformed or does not verify
    #[error("commitment error: {0}")]
    Commitment(#[from] CommitmentError),
}
