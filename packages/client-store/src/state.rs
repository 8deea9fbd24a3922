//! Client state, consensus states and the consensus metadata index.

use cosmwasm_std::{Env, Order, Storage};
use ibc_eureka_host_types::{
    identifiers::parse_chain_id_revision,
    path::{consensus_state_key, KEY_CLIENT_STATE},
    Height, TypedState,
};

use crate::{error::StoreError, prefixed::ReadonlyStorage};

/// The store key of the sorted consensus state index.
pub const ITERATE_CONSENSUS_STATES_KEY: &str = "iterateConsensusStates";
/// The suffix of the processed time key of a consensus state.
pub const PROCESSED_TIME_KEY: &str = "processedTime";
/// The suffix of the processed height key of a consensus state.
pub const PROCESSED_HEIGHT_KEY: &str = "processedHeight";

/// The key of the processed time of the consensus state at `height`.
#[must_use]
pub fn processed_time_key(height: Height) -> String {
    format!("{}/{PROCESSED_TIME_KEY}", consensus_state_key(height))
}

/// The key of the processed height of the consensus state at `height`.
#[must_use]
pub fn processed_height_key(height: Height) -> String {
    format!("{}/{PROCESSED_HEIGHT_KEY}", consensus_state_key(height))
}

fn iteration_prefix() -> Vec<u8> {
    format!("{ITERATE_CONSENSUS_STATES_KEY}/").into_bytes()
}

/// The exclusive upper bound of every key starting with `prefix`.
pub(crate) fn prefix_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}

/// The index key of the consensus state at `height`.
#[must_use]
pub fn iteration_key(height: Height) -> Vec<u8> {
    let mut key = iteration_prefix();
    key.extend_from_slice(&height.to_be_bytes());
    key
}

fn height_from_iteration_key(key: &[u8]) -> Result<Height, StoreError> {
    let bytes: [u8; 16] = key
        .get(iteration_prefix().len()..)
        .and_then(|suffix| suffix.try_into().ok())
        .ok_or_else(|| StoreError::InvalidMetadata(String::from_utf8_lossy(key).into_owned()))?;
    Ok(Height::from_be_bytes(bytes))
}

/// Get the client state.
/// # Errors
/// Returns an error if the client state is not found or does not decode.
pub fn get_client_state<C: TypedState>(
    storage: &(impl ReadonlyStorage + ?Sized),
) -> Result<C, StoreError> {
    let bytes = storage
        .get(KEY_CLIENT_STATE.as_bytes())
        .ok_or(StoreError::ClientStateNotFound)?;
    C::decode_from_slice(&bytes).map_err(StoreError::InvalidClientState)
}

/// Store the client state.
/// # Errors
/// Returns an error if the client state cannot be encoded.
pub fn set_client_state<C: TypedState>(
    storage: &mut dyn Storage,
    client_state: &C,
) -> Result<(), StoreError> {
    let bytes = client_state.encode_to_vec().map_err(StoreError::Encode)?;
    storage.set(KEY_CLIENT_STATE.as_bytes(), &bytes);
    Ok(())
}

/// Get the consensus state at `height`.
/// # Errors
/// Returns an error if no consensus state is stored at `height` or it does not decode.
pub fn get_consensus_state<C: TypedState>(
    storage: &(impl ReadonlyStorage + ?Sized),
    height: Height,
) -> Result<C, StoreError> {
    let bytes = storage
        .get(consensus_state_key(height).as_bytes())
        .ok_or(StoreError::ConsensusStateNotFound(height))?;
    C::decode_from_slice(&bytes).map_err(|source| StoreError::InvalidConsensus { height, source })
}

/// Returns true if a consensus state is stored at `height`.
#[must_use]
pub fn has_consensus_state(storage: &(impl ReadonlyStorage + ?Sized), height: Height) -> bool {
    storage.get(consensus_state_key(height).as_bytes()).is_some()
}

/// Store the consensus state at `height`. Metadata is recorded separately.
/// # Errors
/// Returns an error if the consensus state cannot be encoded.
pub fn set_consensus_state<C: TypedState>(
    storage: &mut dyn Storage,
    height: Height,
    consensus_state: &C,
) -> Result<(), StoreError> {
    let bytes = consensus_state.encode_to_vec().map_err(StoreError::Encode)?;
    storage.set(consensus_state_key(height).as_bytes(), &bytes);
    Ok(())
}

/// Get the host time in nanoseconds at which the consensus state at `height` was stored.
/// # Errors
/// Returns an error if the stored value is not a big-endian `u64`.
pub fn get_processed_time(
    storage: &(impl ReadonlyStorage + ?Sized),
    height: Height,
) -> Result<Option<u64>, StoreError> {
    let key = processed_time_key(height);
    storage
        .get(key.as_bytes())
        .map(|bytes| {
            <[u8; 8]>::try_from(bytes.as_slice())
                .map(u64::from_be_bytes)
                .map_err(|_| StoreError::InvalidMetadata(key.clone()))
        })
        .transpose()
}

/// Record the processed time of the consensus state at `height`.
pub fn set_processed_time(storage: &mut dyn Storage, height: Height, time: u64) {
    storage.set(processed_time_key(height).as_bytes(), &time.to_be_bytes());
}

/// Get the host height at which the consensus state at `height` was stored.
/// # Errors
/// Returns an error if the stored value is not a height string.
pub fn get_processed_height(
    storage: &(impl ReadonlyStorage + ?Sized),
    height: Height,
) -> Result<Option<Height>, StoreError> {
    let key = processed_height_key(height);
    storage
        .get(key.as_bytes())
        .map(|bytes| {
            std::str::from_utf8(&bytes)
                .ok()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| StoreError::InvalidMetadata(key.clone()))
        })
        .transpose()
}

/// Record the processed height of the consensus state at `height`.
pub fn set_processed_height(storage: &mut dyn Storage, height: Height, processed_height: Height) {
    storage.set(
        processed_height_key(height).as_bytes(),
        processed_height.to_string().as_bytes(),
    );
}

/// Index the consensus state at `height`.
pub fn set_iteration_key(storage: &mut dyn Storage, height: Height) {
    storage.set(
        &iteration_key(height),
        consensus_state_key(height).as_bytes(),
    );
}

/// Get the consensus state key indexed for `height`.
#[must_use]
pub fn get_iteration_key(
    storage: &(impl ReadonlyStorage + ?Sized),
    height: Height,
) -> Option<Vec<u8>> {
    storage.get(&iteration_key(height))
}

/// The host height of the environment: the block height qualified by the revision parsed
/// from the host chain id.
#[must_use]
pub fn self_height(env: &Env) -> Height {
    Height::new(parse_chain_id_revision(&env.block.chain_id), env.block.height)
}

/// Record processed time, processed height and the index entry of the consensus state at
/// `height` from the host environment.
pub fn set_consensus_metadata(storage: &mut dyn Storage, env: &Env, height: Height) {
    set_consensus_metadata_with_values(
        storage,
        height,
        env.block.time.nanos(),
        self_height(env),
    );
}

/// Record the given processed time and height and the index entry of the consensus state at
/// `height`.
pub fn set_consensus_metadata_with_values(
    storage: &mut dyn Storage,
    height: Height,
    processed_time: u64,
    processed_height: Height,
) {
    set_processed_time(storage, height, processed_time);
    set_processed_height(storage, height, processed_height);
    set_iteration_key(storage, height);
}

/// Remove the consensus state at `height` together with its metadata.
pub fn delete_consensus_state_and_metadata(storage: &mut dyn Storage, height: Height) {
    storage.remove(consensus_state_key(height).as_bytes());
    storage.remove(processed_time_key(height).as_bytes());
    storage.remove(processed_height_key(height).as_bytes());
    storage.remove(&iteration_key(height));
}

fn decode_indexed<C: TypedState>(
    storage: &(impl ReadonlyStorage + ?Sized),
    height: Height,
    consensus_key: &[u8],
) -> Result<C, StoreError> {
    let bytes = storage
        .get(consensus_key)
        .ok_or(StoreError::ConsensusStateNotFound(height))?;
    C::decode_from_slice(&bytes).map_err(|source| StoreError::InvalidConsensus { height, source })
}

/// Get the consensus state with the greatest height strictly below `height`.
/// # Errors
/// Returns an error if the indexed consensus state is missing or does not decode.
pub fn get_previous_consensus_state<C: TypedState>(
    storage: &(impl ReadonlyStorage + ?Sized),
    height: Height,
) -> Result<Option<(Height, C)>, StoreError> {
    let start = iteration_prefix();
    let end = iteration_key(height);
    let Some((key, consensus_key)) = storage
        .range(Some(&start), Some(&end), Order::Descending)
        .next()
    else {
        return Ok(None);
    };

    let prev = height_from_iteration_key(&key)?;
    Ok(Some((prev, decode_indexed(storage, prev, &consensus_key)?)))
}

/// Get the consensus state with the smallest height strictly above `height`.
/// # Errors
/// Returns an error if the indexed consensus state is missing or does not decode.
pub fn get_next_consensus_state<C: TypedState>(
    storage: &(impl ReadonlyStorage + ?Sized),
    height: Height,
) -> Result<Option<(Height, C)>, StoreError> {
    let mut start = iteration_key(height);
    start.push(0);
    let end = prefix_end(&iteration_prefix());
    let Some((key, consensus_key)) = storage
        .range(Some(&start), end.as_deref(), Order::Ascending)
        .next()
    else {
        return Ok(None);
    };

    let next = height_from_iteration_key(&key)?;
    Ok(Some((next, decode_indexed(storage, next, &consensus_key)?)))
}

/// Visit the indexed consensus state heights in ascending order until `stop` returns true.
/// # Errors
/// Returns an error if an index key is malformed.
pub fn iterate_consensus_states_ascending(
    storage: &(impl ReadonlyStorage + ?Sized),
    mut stop: impl FnMut(Height) -> bool,
) -> Result<(), StoreError> {
    let start = iteration_prefix();
    let end = prefix_end(&start);
    for (key, _) in storage.range(Some(&start), end.as_deref(), Order::Ascending) {
        if stop(height_from_iteration_key(&key)?) {
            break;
        }
    }
    Ok(())
}

/// All indexed consensus state heights, ascending.
/// # Errors
/// Returns an error if an index key is malformed.
pub fn consensus_heights(
    storage: &(impl ReadonlyStorage + ?Sized),
) -> Result<Vec<Height>, StoreError> {
    let mut heights = vec![];
    iterate_consensus_states_ascending(storage, |height| {
        heights.push(height);
        false
    })?;
    Ok(heights)
}

/// The oldest indexed consensus state.
/// # Errors
/// Returns an error if the indexed consensus state is missing or does not decode.
pub fn get_oldest_consensus_state<C: TypedState>(
    storage: &(impl ReadonlyStorage + ?Sized),
) -> Result<Option<(Height, C)>, StoreError> {
    let mut oldest = None;
    iterate_consensus_states_ascending(storage, |height| {
        oldest = Some(height);
        true
    })?;
    oldest
        .map(|height| Ok((height, get_consensus_state(storage, height)?)))
        .transpose()
}

/// Inspect the oldest consensus state only and delete it with its metadata when
/// `is_expired` holds. Returns the pruned height.
/// # Errors
/// Returns an error if the oldest consensus state cannot be read.
pub fn prune_oldest_consensus_state<C: TypedState>(
    storage: &mut dyn Storage,
    is_expired: impl FnOnce(&C) -> bool,
) -> Result<Option<Height>, StoreError> {
    let Some((height, consensus_state)) = get_oldest_consensus_state::<C>(storage)? else {
        return Ok(None);
    };
    if !is_expired(&consensus_state) {
        return Ok(None);
    }

    delete_consensus_state_and_metadata(storage, height);
    tracing::debug!(height = %height, "pruned expired consensus state");
    Ok(Some(height))
}
