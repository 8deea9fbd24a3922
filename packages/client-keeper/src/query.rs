//! Read-only queries over the clients of the keeper.

use cosmwasm_std::{Env, Order, Storage};
use ibc_eureka_client_store::{ReadonlyPrefixedStorage, ReadonlyStorage};
use ibc_eureka_host_types::{
    path::{upgraded_client_path, KEY_CLIENT_STATE, KEY_CLIENT_STORE_PREFIX},
    Height, Status,
};
use ibc_proto::google::protobuf::Any;
use prost::Message;

use crate::{
    error::ClientError,
    keeper::{client_status, Keeper},
};

/// A client state together with its client identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct IdentifiedClientState {
    /// Client identifier
    pub client_id: String,
    /// Client state
    pub client_state: Any,
}

/// A consensus state together with its height.
#[derive(Clone, Debug, PartialEq)]
pub struct ConsensusStateWithHeight {
    /// Height of the consensus state
    pub height: Height,
    /// Consensus state
    pub consensus_state: Any,
}

impl Keeper {
    /// The client state of `client_id`.
    /// # Errors
    /// Returns an error if the client does not exist.
    pub fn client_state(&self, storage: &dyn Storage, client_id: &str) -> Result<Any, ClientError> {
        self.client_module(storage, client_id)?
            .client_state(&ReadonlyPrefixedStorage::for_client(storage, client_id))
    }

    /// The consensus state of `client_id` at `height`.
    /// # Errors
    /// Returns an error if the client does not exist or has no consensus state at the height.
    pub fn consensus_state(
        &self,
        storage: &dyn Storage,
        client_id: &str,
        height: Height,
    ) -> Result<Any, ClientError> {
        self.client_module(storage, client_id)?
            .consensus_state(&ReadonlyPrefixedStorage::for_client(storage, client_id), height)
    }

    /// The heights of every consensus state of `client_id`, ascending.
    /// # Errors
    /// Returns an error if the client does not exist.
    pub fn consensus_state_heights(
        &self,
        storage: &dyn Storage,
        client_id: &str,
    ) -> Result<Vec<Height>, ClientError> {
        self.client_module(storage, client_id)?
            .consensus_heights(&ReadonlyPrefixedStorage::for_client(storage, client_id))
    }

    /// Every consensus state of `client_id`, ascending by height.
    /// # Errors
    /// Returns an error if the client does not exist or a consensus state does not decode.
    pub fn consensus_states(
        &self,
        storage: &dyn Storage,
        client_id: &str,
    ) -> Result<Vec<ConsensusStateWithHeight>, ClientError> {
        let module = self.client_module(storage, client_id)?;
        let client_store = ReadonlyPrefixedStorage::for_client(storage, client_id);
        module
            .consensus_heights(&client_store)?
            .into_iter()
            .map(|height| {
                Ok(ConsensusStateWithHeight {
                    height,
                    consensus_state: module.consensus_state(&client_store, height)?,
                })
            })
            .collect()
    }

    /// The status of `client_id` at the host time.
    /// # Errors
    /// Returns an error if the client does not exist.
    pub fn client_status(
        &self,
        storage: &dyn Storage,
        env: &Env,
        client_id: &str,
    ) -> Result<Status, ClientError> {
        let module = self.client_module(storage, client_id)?;
        client_status(storage, env, client_id, module)
    }

    /// The latest height of `client_id`.
    /// # Errors
    /// Returns an error if the client does not exist.
    pub fn latest_height(
        &self,
        storage: &dyn Storage,
        env: &Env,
        client_id: &str,
    ) -> Result<Height, ClientError> {
        self.client_module(storage, client_id)?
            .latest_height(&ReadonlyPrefixedStorage::for_client(storage, client_id), env)
    }

    /// The timestamp, in nanoseconds, of the consensus state of `client_id` at `height`.
    /// # Errors
    /// Returns an error if the client does not exist or has no consensus state at the height.
    pub fn timestamp_at_height(
        &self,
        storage: &dyn Storage,
        env: &Env,
        client_id: &str,
        height: Height,
    ) -> Result<u64, ClientError> {
        self.client_module(storage, client_id)?.timestamp_at_height(
            &ReadonlyPrefixedStorage::for_client(storage, client_id),
            env,
            height,
        )
    }

    /// The client state of every stored client, ordered by client identifier.
    /// # Errors
    /// Returns an error if a stored client state is not an `Any`.
    #[allow(clippy::unused_self)]
    pub fn all_client_states(
        &self,
        storage: &dyn Storage,
    ) -> Result<Vec<IdentifiedClientState>, ClientError> {
        let suffix = format!("/{KEY_CLIENT_STATE}");
        let clients = ReadonlyPrefixedStorage::new(storage, format!("{KEY_CLIENT_STORE_PREFIX}/"));
        ReadonlyStorage::range(&clients, None, None, Order::Ascending)
            .filter_map(|(key, value)| {
                let key = String::from_utf8(key).ok()?;
                let client_id = key.strip_suffix(&suffix)?;
                (!client_id.contains('/')).then(|| (client_id.to_string(), value))
            })
            .map(|(client_id, value)| {
                Ok(IdentifiedClientState {
                    client_id,
                    client_state: Any::decode(value.as_slice())?,
                })
            })
            .collect()
    }
}

/// The upgraded client scheduled for the plan at `plan_height`, if any.
/// # Errors
/// Returns an error if the stored value is not an `Any`.
pub fn upgraded_client_state(
    storage: &dyn Storage,
    plan_height: u64,
) -> Result<Option<Any>, ClientError> {
    storage
        .get(upgraded_client_path(plan_height).as_bytes())
        .map(|bytes| Any::decode(bytes.as_slice()))
        .transpose()
        .map_err(Into::into)
}
