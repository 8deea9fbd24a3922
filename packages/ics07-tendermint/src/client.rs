//! Client creation and queries.

use cosmwasm_std::{Env, Storage};
use ibc_eureka_client_store::{self as store, GenesisMetadata, ReadonlyStorage};
use ibc_eureka_host_types::{Height, Status};

use crate::{
    client_state::ClientState, consensus_state::ConsensusState, error::TendermintClientError,
};

/// Validates and stores the initial client and consensus state.
/// # Errors
/// Returns an error if either state is invalid.
pub fn initialize(
    storage: &mut dyn Storage,
    env: &Env,
    client_state: &ClientState,
    consensus_state: &ConsensusState,
) -> Result<(), TendermintClientError> {
    client_state.validate()?;
    consensus_state.validate()?;

    let height = client_state.latest_height;
    store::set_client_state(storage, client_state)?;
    store::set_consensus_state(storage, height, consensus_state)?;
    store::set_consensus_metadata(storage, env, height);
    Ok(())
}

/// The status of the client at the host time.
/// # Errors
/// Returns an error if the latest consensus state does not decode.
pub fn status(
    storage: &(impl ReadonlyStorage + ?Sized),
    env: &Env,
    client_state: &ClientState,
) -> Result<Status, TendermintClientError> {
    if client_state.is_frozen() {
        return Ok(Status::Frozen);
    }

    let latest = match store::get_consensus_state::<ConsensusState>(
        storage,
        client_state.latest_height,
    ) {
        Ok(consensus_state) => consensus_state,
        Err(store::StoreError::ConsensusStateNotFound(_)) => return Ok(Status::Expired),
        Err(err) => return Err(err.into()),
    };

    if client_state.trusting_period_end(latest.timestamp) <= env.block.time.nanos() {
        return Ok(Status::Expired);
    }
    Ok(Status::Active)
}

/// The latest height of the stored client state.
/// # Errors
/// Returns an error if no client state is stored.
pub fn latest_height(
    storage: &(impl ReadonlyStorage + ?Sized),
) -> Result<Height, TendermintClientError> {
    Ok(store::get_client_state::<ClientState>(storage)?.latest_height)
}

/// The timestamp, in nanoseconds, of the consensus state at `height`.
/// # Errors
/// Returns [`TendermintClientError::ConsensusStateNotFound`] if no state is stored there.
pub fn timestamp_at_height(
    storage: &(impl ReadonlyStorage + ?Sized),
    height: Height,
) -> Result<u64, TendermintClientError> {
    Ok(store::get_consensus_state::<ConsensusState>(storage, height)?.timestamp)
}

/// The consensus metadata entries of the store.
/// # Errors
/// Returns an error if the index is malformed.
pub fn export_metadata(
    storage: &(impl ReadonlyStorage + ?Sized),
) -> Result<Vec<GenesisMetadata>, TendermintClientError> {
    Ok(store::export_metadata(storage)?)
}
