//! Export and import of every client store.

use std::collections::HashSet;

use cosmwasm_std::Storage;
use ibc_eureka_client_store::{
    import_metadata, GenesisMetadata, PrefixedStorage, ReadonlyPrefixedStorage,
};
use ibc_eureka_host_types::{
    identifiers::parse_client_identifier,
    path::{client_state_path, consensus_state_key},
};
use ibc_eureka_utils::ensure;
use prost::Message;

use crate::{
    config::Params,
    error::ClientError,
    keeper::{get_params, next_client_sequence, set_next_client_sequence, set_params, Keeper},
    query::{ConsensusStateWithHeight, IdentifiedClientState},
};

/// The consensus states of one client.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConsensusStates {
    /// Client identifier
    pub client_id: String,
    /// Consensus states, ascending by height
    pub consensus_states: Vec<ConsensusStateWithHeight>,
}

/// The consensus metadata of one client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentifiedGenesisMetadata {
    /// Client identifier
    pub client_id: String,
    /// Raw metadata entries of the client store
    pub metadata: Vec<GenesisMetadata>,
}

/// The state of every client of the keeper.
#[derive(Clone, Debug, Default, PartialEq)]
#[allow(clippy::module_name_repetitions)]
pub struct GenesisState {
    /// Client states
    pub clients: Vec<IdentifiedClientState>,
    /// Consensus states per client
    pub clients_consensus: Vec<ClientConsensusStates>,
    /// Consensus metadata per client
    pub clients_metadata: Vec<IdentifiedGenesisMetadata>,
    /// Keeper parameters
    pub params: Params,
    /// Sequence of the next created client
    pub next_client_sequence: u64,
}

impl GenesisState {
    /// Checks the identifiers and parameters and that every consensus state and metadata
    /// entry belongs to a known client.
    /// # Errors
    /// Returns an error describing the first violation.
    pub fn validate(&self) -> Result<(), ClientError> {
        self.params.validate()?;

        let mut client_ids = HashSet::new();
        for client in &self.clients {
            let (client_type, sequence) = parse_client_identifier(&client.client_id)?;
            ensure!(
                client_ids.insert(client.client_id.as_str()),
                ClientError::InvalidGenesis(format!("duplicate client {}", client.client_id))
            );
            ensure!(
                self.params.client.is_allowed(client_type),
                ClientError::ClientTypeNotAllowed(client_type.to_string())
            );
            ensure!(
                sequence < self.next_client_sequence,
                ClientError::InvalidGenesis(format!(
                    "next client sequence {} must be greater than the sequence of {}",
                    self.next_client_sequence, client.client_id
                ))
            );
        }

        let unknown = |client_id: &str| ClientError::InvalidGenesis(format!("unknown client {client_id}"));
        for entry in &self.clients_consensus {
            ensure!(
                client_ids.contains(entry.client_id.as_str()),
                unknown(&entry.client_id)
            );
            ensure!(
                entry.consensus_states.iter().all(|cs| !cs.height.is_zero()),
                ClientError::InvalidGenesis(format!(
                    "client {} has a consensus state at height zero",
                    entry.client_id
                ))
            );
        }
        for entry in &self.clients_metadata {
            ensure!(
                client_ids.contains(entry.client_id.as_str()),
                unknown(&entry.client_id)
            );
        }
        Ok(())
    }
}

impl Keeper {
    /// Exports every stored client with its consensus states and metadata.
    /// # Errors
    /// Returns an error if a client store cannot be read.
    pub fn export_genesis(&self, storage: &dyn Storage) -> Result<GenesisState, ClientError> {
        let clients = self.all_client_states(storage)?;

        let mut clients_consensus = vec![];
        let mut clients_metadata = vec![];
        for client in &clients {
            let client_id = client.client_id.clone();
            let consensus_states = self.consensus_states(storage, &client_id)?;
            if !consensus_states.is_empty() {
                clients_consensus.push(ClientConsensusStates {
                    client_id: client_id.clone(),
                    consensus_states,
                });
            }

            let metadata = self
                .router()
                .route(&client_id)?
                .export_metadata(&ReadonlyPrefixedStorage::for_client(storage, &client_id))?;
            if !metadata.is_empty() {
                clients_metadata.push(IdentifiedGenesisMetadata {
                    client_id,
                    metadata,
                });
            }
        }

        Ok(GenesisState {
            clients,
            clients_consensus,
            clients_metadata,
            params: get_params(storage)?,
            next_client_sequence: next_client_sequence(storage)?,
        })
    }

    /// Recreates the client stores of `genesis` verbatim.
    /// # Errors
    /// Returns an error if the genesis state is invalid or names an unroutable client type.
    pub fn init_genesis(&self, storage: &mut dyn Storage, genesis: &GenesisState) -> Result<(), ClientError> {
        genesis.validate()?;
        set_params(storage, &genesis.params)?;

        for client in &genesis.clients {
            self.router().route(&client.client_id)?;
            storage.set(
                client_state_path(&client.client_id).as_bytes(),
                &client.client_state.encode_to_vec(),
            );
        }
        for entry in &genesis.clients_consensus {
            let mut client_store = PrefixedStorage::for_client(storage, &entry.client_id);
            for consensus in &entry.consensus_states {
                client_store.set(
                    consensus_state_key(consensus.height).as_bytes(),
                    &consensus.consensus_state.encode_to_vec(),
                );
            }
        }
        for entry in &genesis.clients_metadata {
            import_metadata(
                &mut PrefixedStorage::for_client(storage, &entry.client_id),
                &entry.metadata,
            );
        }
        set_next_client_sequence(storage, genesis.next_client_sequence);

        tracing::info!(
            clients = genesis.clients.len(),
            next_client_sequence = genesis.next_client_sequence,
            "client genesis initialized"
        );
        Ok(())
    }
}
