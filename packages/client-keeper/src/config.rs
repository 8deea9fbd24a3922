//! Keeper parameters and configuration.

use std::collections::HashSet;

use ibc_eureka_commitment::ProofSpecs;
use ibc_eureka_utils::ensure;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// The allow-list entry that allows every client type.
pub const ALLOW_ALL_CLIENTS: &str = "*";

/// Default expected time per block: 30 seconds.
pub const DEFAULT_TIME_PER_BLOCK: u64 = 30_000_000_000;

/// Client parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientParams {
    /// Client types that may be created and used. [`ALLOW_ALL_CLIENTS`] allows every type.
    pub allowed_clients: Vec<String>,
}

impl Default for ClientParams {
    fn default() -> Self {
        Self {
            allowed_clients: vec![ALLOW_ALL_CLIENTS.to_string()],
        }
    }
}

impl ClientParams {
    /// Returns true if clients of `client_type` may be created and used.
    #[must_use]
    pub fn is_allowed(&self, client_type: &str) -> bool {
        !client_type.trim().is_empty()
            && self
                .allowed_clients
                .iter()
                .any(|allowed| allowed == ALLOW_ALL_CLIENTS || allowed == client_type)
    }

    /// Checks that the allow-list has no blank or duplicate entries.
    /// # Errors
    /// Returns [`ClientError::InvalidParams`] on the first violation.
    pub fn validate(&self) -> Result<(), ClientError> {
        let mut seen = HashSet::new();
        for (i, client_type) in self.allowed_clients.iter().enumerate() {
            ensure!(
                !client_type.trim().is_empty(),
                ClientError::InvalidParams(format!("allowed client {i} cannot be blank"))
            );
            ensure!(
                seen.insert(client_type.as_str()),
                ClientError::InvalidParams(format!("allowed client {client_type} is duplicated"))
            );
        }
        Ok(())
    }
}

/// Connection parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Expected time per block in nanoseconds, used to turn time delays into block delays
    pub max_expected_time_per_block: u64,
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            max_expected_time_per_block: DEFAULT_TIME_PER_BLOCK,
        }
    }
}

impl ConnectionParams {
    /// The number of blocks expected to pass during `delay_time_period`.
    #[must_use]
    pub const fn block_delay(&self, delay_time_period: u64) -> u64 {
        ibc_eureka_multihop::block_delay(delay_time_period, self.max_expected_time_per_block)
    }

    /// Checks that the expected time per block is set.
    /// # Errors
    /// Returns [`ClientError::InvalidParams`] if it is zero.
    pub fn validate(&self) -> Result<(), ClientError> {
        ensure!(
            self.max_expected_time_per_block != 0,
            ClientError::InvalidParams("max expected time per block cannot be zero".to_string())
        );
        Ok(())
    }
}

/// All keeper parameters, persisted under the `params` key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Client parameters
    #[serde(default)]
    pub client: ClientParams,
    /// Connection parameters
    #[serde(default)]
    pub connection: ConnectionParams,
}

impl Params {
    /// Validates every parameter.
    /// # Errors
    /// Returns [`ClientError::InvalidParams`] on the first violation.
    pub fn validate(&self) -> Result<(), ClientError> {
        self.client.validate()?;
        self.connection.validate()
    }
}

/// The configuration a keeper is started from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[allow(clippy::module_name_repetitions)]
pub struct KeeperConfig {
    /// Initial parameters
    #[serde(default)]
    pub params: Params,
    /// Proof specs given to Tendermint clients created without any
    #[serde(default)]
    pub proof_specs: ProofSpecs,
}

impl KeeperConfig {
    /// Parses and validates a JSON configuration.
    /// # Errors
    /// Returns an error if the JSON is malformed or the parameters are invalid.
    pub fn from_json(json: &str) -> Result<Self, ClientError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the parameters and proof specs.
    /// # Errors
    /// Returns an error if either is invalid.
    pub fn validate(&self) -> Result<(), ClientError> {
        self.params.validate()?;
        ensure!(
            !self.proof_specs.is_empty(),
            ClientError::InvalidParams("default proof specs cannot be empty".to_string())
        );
        Ok(self.proof_specs.validate()?)
    }
}
