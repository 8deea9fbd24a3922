//! This module defines the Tendermint [`ConsensusState`].

use ibc_eureka_commitment::MerkleRoot;
use ibc_eureka_host_types::TypedState;
use ibc_eureka_utils::ensure;
use serde::{Deserialize, Serialize};

use crate::{error::TendermintClientError, header::Header};

/// The root of a consensus state installed by a client upgrade. Such a state can only serve
/// as a trusted state for header verification; it commits to no application state.
pub const SENTINEL_ROOT: &[u8] = b"sentinel_root";

/// The state of the tracked chain at one height.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::module_name_repetitions)]
pub struct ConsensusState {
    /// Block time in nanoseconds since the Unix epoch
    pub timestamp: u64,
    /// Application state root
    pub root: MerkleRoot,
    /// Hash of the validator set expected to sign the next block
    #[serde(with = "ibc_eureka_utils::serde::hex_bytes")]
    pub next_validators_hash: Vec<u8>,
}

impl ConsensusState {
    /// Checks the consensus state for emptiness.
    /// # Errors
    /// Returns [`TendermintClientError::InvalidConsensus`] describing the first violation.
    pub fn validate(&self) -> Result<(), TendermintClientError> {
        ensure!(
            !self.root.is_empty(),
            TendermintClientError::InvalidConsensus("root cannot be empty".to_string())
        );
        ensure!(
            self.next_validators_hash.len() == 32,
            TendermintClientError::InvalidConsensus(format!(
                "next validators hash must be 32 bytes, got {}",
                self.next_validators_hash.len()
            ))
        );
        ensure!(
            self.timestamp != 0,
            TendermintClientError::InvalidConsensus("timestamp cannot be zero".to_string())
        );
        Ok(())
    }

    /// Returns true if the state was installed by an upgrade.
    #[must_use]
    pub fn has_sentinel_root(&self) -> bool {
        self.root.hash == SENTINEL_ROOT
    }
}

impl From<&Header> for ConsensusState {
    fn from(header: &Header) -> Self {
        let block = &header.signed_header.header;
        Self {
            timestamp: header.timestamp(),
            root: MerkleRoot::new(block.app_hash.as_bytes().to_vec()),
            next_validators_hash: block.next_validators_hash.as_bytes().to_vec(),
        }
    }
}

impl TypedState for ConsensusState {
    const TYPE_URL: &'static str = "/ibc.lightclients.tendermint.v1.ConsensusState";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consensus_state_validation() {
        let mut cs = ConsensusState {
            timestamp: 1,
            root: MerkleRoot::new(b"root".to_vec()),
            next_validators_hash: vec![0; 32],
        };
        cs.validate().unwrap();

        cs.next_validators_hash = vec![0; 20];
        assert!(matches!(
            cs.validate(),
            Err(TendermintClientError::InvalidConsensus(_))
        ));

        cs.next_validators_hash = vec![0; 32];
        cs.root = MerkleRoot::new(vec![]);
        assert!(cs.validate().is_err());

        cs.root = MerkleRoot::new(SENTINEL_ROOT.to_vec());
        assert!(cs.has_sentinel_root());
        cs.timestamp = 0;
        assert!(cs.validate().is_err());
    }
}
