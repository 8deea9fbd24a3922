//! This module defines the Tendermint [`ClientState`].

use std::time::Duration;

use ibc_eureka_commitment::ProofSpecs;
use ibc_eureka_host_types::{identifiers::parse_chain_id_revision, Height, TypedState};
use ibc_eureka_utils::ensure;
use serde::{Deserialize, Serialize};

use crate::{error::TendermintClientError, trust_threshold::TrustThreshold};

/// The height a misbehaving client is frozen at.
pub const FROZEN_HEIGHT: Height = Height::new(0, 1);

/// The state of a Tendermint light client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[allow(clippy::module_name_repetitions)]
pub struct ClientState {
    /// Chain id of the tracked chain
    pub chain_id: String,
    /// Voting power overlap required to skip validator sets
    pub trust_level: TrustThreshold,
    /// How long a consensus state can be used to verify new headers
    pub trusting_period: Duration,
    /// Unbonding period of the tracked chain
    pub unbonding_period: Duration,
    /// Tolerated drift between the header time and the host time
    pub max_clock_drift: Duration,
    /// Non-zero once the client is frozen
    pub frozen_height: Height,
    /// Greatest height with a stored consensus state
    pub latest_height: Height,
    /// Proof specs of the tracked chain's commitment trees
    pub proof_specs: ProofSpecs,
    /// Key path under which the tracked chain commits its upgraded client
    pub upgrade_path: Vec<String>,
}

impl ClientState {
    /// Checks the configuration of the client.
    /// # Errors
    /// Returns [`TendermintClientError::InvalidClient`] describing the first violation.
    pub fn validate(&self) -> Result<(), TendermintClientError> {
        let invalid = |reason: &str| TendermintClientError::InvalidClient(reason.to_string());

        ensure!(
            !self.chain_id.trim().is_empty(),
            invalid("chain id cannot be blank")
        );
        ensure!(
            self.trust_level.is_valid(),
            TendermintClientError::InvalidClient(format!(
                "trust level {} must be within [1/3, 1]",
                self.trust_level
            ))
        );
        ensure!(
            !self.trusting_period.is_zero(),
            invalid("trusting period must be positive")
        );
        ensure!(
            !self.unbonding_period.is_zero(),
            invalid("unbonding period must be positive")
        );
        ensure!(
            !self.max_clock_drift.is_zero(),
            invalid("max clock drift must be positive")
        );
        ensure!(
            self.trusting_period < self.unbonding_period,
            TendermintClientError::InvalidClient(format!(
                "trusting period {:?} must be less than unbonding period {:?}",
                self.trusting_period, self.unbonding_period
            ))
        );
        ensure!(
            self.latest_height.revision_height != 0,
            invalid("latest height cannot be zero")
        );
        ensure!(
            self.latest_height.revision_number == parse_chain_id_revision(&self.chain_id),
            TendermintClientError::InvalidClient(format!(
                "latest height revision {} does not match chain id {}",
                self.latest_height.revision_number, self.chain_id
            ))
        );
        ensure!(
            !self.proof_specs.is_empty(),
            invalid("proof specs cannot be empty")
        );
        self.proof_specs
            .validate()
            .map_err(|e| TendermintClientError::InvalidClient(e.to_string()))?;
        ensure!(
            self.upgrade_path.iter().all(|key| !key.trim().is_empty()),
            invalid("upgrade path keys cannot be blank")
        );
        Ok(())
    }

    /// Returns true once the client has been frozen by misbehaviour.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        !self.frozen_height.is_zero()
    }

    /// Returns the timestamp, in nanoseconds, after which a consensus state taken at
    /// `timestamp` can no longer be trusted.
    #[must_use]
    pub fn trusting_period_end(&self, timestamp: u64) -> u64 {
        timestamp.saturating_add(duration_nanos(self.trusting_period))
    }

    /// Returns a copy holding only the fields chosen by the tracked chain. This is the form
    /// the chain commits to when it plans an upgrade.
    #[must_use]
    pub fn zero_custom_fields(&self) -> Self {
        Self {
            chain_id: self.chain_id.clone(),
            trust_level: TrustThreshold::ZERO,
            trusting_period: Duration::ZERO,
            unbonding_period: self.unbonding_period,
            max_clock_drift: Duration::ZERO,
            frozen_height: Height::zero(),
            latest_height: self.latest_height,
            proof_specs: self.proof_specs.clone(),
            upgrade_path: self.upgrade_path.clone(),
        }
    }
}

impl TypedState for ClientState {
    const TYPE_URL: &'static str = "/ibc.lightclients.tendermint.v1.ClientState";
}

/// A duration in nanoseconds, saturating at `u64::MAX`.
#[must_use]
pub fn duration_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
