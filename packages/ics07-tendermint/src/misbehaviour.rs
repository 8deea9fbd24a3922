//! Misbehaviour evidence: two valid headers that cannot both be canonical.

use cosmwasm_std::Env;
use ibc_eureka_client_store::{self as store, ReadonlyStorage};
use ibc_eureka_host_types::TypedState;
use ibc_eureka_utils::ensure;
use serde::{Deserialize, Serialize};

use crate::{
    client_state::ClientState, consensus_state::ConsensusState, error::TendermintClientError,
    header::Header, verify::verify_misbehaviour_header,
};

/// Two conflicting headers of the same chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Misbehaviour {
    /// Client the evidence is submitted to
    pub client_id: String,
    /// The header at the greater or equal height
    pub header1: Header,
    /// The other header
    pub header2: Header,
}

/// The kind of a misbehaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MisbehaviourKind {
    /// Two different blocks at the same height
    Fork,
    /// A later block with a time not after an earlier block
    TimeViolation,
}

impl Misbehaviour {
    /// Checks the identifiers and the ordering of the two headers.
    /// # Errors
    /// Returns [`TendermintClientError::InvalidMisbehaviour`] on the first violation.
    pub fn validate_basic(&self, chain_id: &str) -> Result<(), TendermintClientError> {
        ensure!(
            !self.client_id.trim().is_empty(),
            TendermintClientError::InvalidMisbehaviour("client id cannot be blank".to_string())
        );
        for header in [&self.header1, &self.header2] {
            ensure!(
                header.signed_header.header.chain_id.as_str() == chain_id,
                TendermintClientError::InvalidMisbehaviour(format!(
                    "header chain id {} does not match client chain id {chain_id}",
                    header.signed_header.header.chain_id
                ))
            );
        }
        ensure!(
            self.header1.height() >= self.header2.height(),
            TendermintClientError::InvalidMisbehaviour(format!(
                "header1 height {} must not be below header2 height {}",
                self.header1.height(),
                self.header2.height()
            ))
        );
        Ok(())
    }

    /// Classifies the evidence. Returns `None` if the headers do not conflict.
    #[must_use]
    pub fn kind(&self) -> Option<MisbehaviourKind> {
        let (h1, h2) = (&self.header1, &self.header2);
        if h1.height() == h2.height() {
            (h1.block_hash() != h2.block_hash()).then_some(MisbehaviourKind::Fork)
        } else if h1.height() > h2.height() && h1.timestamp() <= h2.timestamp() {
            Some(MisbehaviourKind::TimeViolation)
        } else {
            None
        }
    }
}

impl TypedState for Misbehaviour {
    const TYPE_URL: &'static str = "/ibc.lightclients.tendermint.v1.Misbehaviour";
}

/// Verifies that `misbehaviour` is well formed and conflicting, and that both of its headers
/// carry valid commits from their trusted consensus states.
/// # Errors
/// Returns an error if the evidence does not prove misbehaviour.
pub fn verify_misbehaviour(
    storage: &(impl ReadonlyStorage + ?Sized),
    env: &Env,
    client_state: &ClientState,
    misbehaviour: &Misbehaviour,
) -> Result<(), TendermintClientError> {
    misbehaviour.validate_basic(&client_state.chain_id)?;
    let kind = misbehaviour.kind().ok_or_else(|| {
        TendermintClientError::InvalidMisbehaviour(
            "headers neither fork nor violate monotonic time".to_string(),
        )
    })?;

    let now = env.block.time.nanos();
    for header in [&misbehaviour.header1, &misbehaviour.header2] {
        let trusted =
            store::get_consensus_state::<ConsensusState>(storage, header.trusted_height)?;
        verify_misbehaviour_header(client_state, &trusted, header, now).map_err(|e| {
            TendermintClientError::InvalidMisbehaviour(format!(
                "header at {} failed verification: {e}",
                header.height()
            ))
        })?;
    }

    tracing::debug!(client_id = %misbehaviour.client_id, kind = ?kind, "verified misbehaviour");
    Ok(())
}
