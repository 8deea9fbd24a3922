//! This module defines the multi-hop proof bundle.

use ibc_eureka_commitment::{MerklePath, MerkleProof};
use serde::{Deserialize, Serialize};

use crate::error::{MultihopError, ProofKind};

/// A proof of one value together with the value and the full path it is committed under.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MultihopProof {
    /// Protobuf encoded [`MerkleProof`]
    #[serde(with = "ibc_eureka_utils::serde::hex_bytes")]
    pub proof: Vec<u8>,
    /// The proven value, empty for a proof of absence
    #[serde(with = "ibc_eureka_utils::serde::hex_bytes")]
    pub value: Vec<u8>,
    /// The store prefix followed by the key
    pub prefixed_key: MerklePath,
}

impl MultihopProof {
    pub(crate) fn merkle_proof(
        &self,
        kind: ProofKind,
        hop: usize,
    ) -> Result<MerkleProof, MultihopError> {
        MerkleProof::decode(&self.proof).map_err(|source| MultihopError::InvalidProof {
            kind,
            hop,
            source,
        })
    }

    /// The innermost key segment as a string.
    pub(crate) fn last_key(&self, kind: ProofKind, hop: usize) -> Result<String, MultihopError> {
        self.prefixed_key
            .last_key()
            .map(|key| String::from_utf8_lossy(key).into_owned())
            .ok_or(MultihopError::EmptyPrefixedKey { kind, hop })
    }

    /// The store prefix segments the key is committed under.
    pub(crate) fn store_prefix(&self) -> &[Vec<u8>] {
        let key_path = &self.prefixed_key.key_path;
        &key_path[..key_path.len().saturating_sub(1)]
    }

    /// The client id of a key under `clients/{client_id}/`.
    pub(crate) fn client_id(&self, kind: ProofKind, hop: usize) -> Result<String, MultihopError> {
        let key = self.last_key(kind, hop)?;
        let client_id = key
            .split('/')
            .nth(1)
            .filter(|client_id| !client_id.is_empty())
            .map(str::to_string);
        client_id.ok_or(MultihopError::MalformedKey { kind, hop, key })
    }
}

/// The proofs a destination chain needs to verify a key on a source chain several hops
/// away.
///
/// Entry `i` of every list is committed on the `i`-th intermediate chain counting from the
/// source, so the last entries are the ones the destination verifies first.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MultihopProofs {
    /// Proof of the key on the source chain
    pub key_proof: MultihopProof,
    /// Consensus states of each chain's predecessor
    pub consensus_proofs: Vec<MultihopProof>,
    /// Connection ends of each chain toward its predecessor
    pub connection_proofs: Vec<MultihopProof>,
    /// Client states each chain runs for its predecessor
    pub client_proofs: Vec<MultihopProof>,
}

impl MultihopProofs {
    /// The number of intermediate chains the proofs walk through.
    #[must_use]
    pub fn hops(&self) -> usize {
        self.consensus_proofs.len()
    }
}
