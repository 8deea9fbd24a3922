//! Client message verification and the resulting state transitions.

use cosmwasm_std::{Env, Storage};
use ibc_eureka_client_store::{self as store, ReadonlyStorage};
use ibc_eureka_host_types::Height;

use crate::{
    client_message::ClientMessage,
    client_state::{duration_nanos, ClientState, FROZEN_HEIGHT},
    consensus_state::ConsensusState,
    error::TendermintClientError,
    header::Header,
    misbehaviour::verify_misbehaviour,
    verify::verify_header,
};

/// Verifies a header or a misbehaviour against the client store.
/// # Errors
/// Returns an error if the message does not verify.
pub fn verify_client_message(
    storage: &(impl ReadonlyStorage + ?Sized),
    env: &Env,
    client_state: &ClientState,
    message: &ClientMessage,
) -> Result<(), TendermintClientError> {
    match message {
        ClientMessage::Header(header) => verify_header(storage, env, client_state, header),
        ClientMessage::Misbehaviour(misbehaviour) => {
            verify_misbehaviour(storage, env, client_state, misbehaviour)
        }
    }
}

/// Returns true if the message proves misbehaviour. Headers never do: a header that
/// conflicts with the stored consensus states fails verification instead.
#[must_use]
pub fn check_for_misbehaviour(message: &ClientMessage) -> bool {
    match message {
        ClientMessage::Header(_) => false,
        ClientMessage::Misbehaviour(misbehaviour) => misbehaviour.kind().is_some(),
    }
}

/// Stores the consensus state of a verified header and advances the latest height.
/// Returns the heights of the consensus states updated by the header.
///
/// At most one expired consensus state is pruned first.
/// # Errors
/// Returns an error if the store cannot be read or written.
pub fn update_state(
    storage: &mut dyn Storage,
    env: &Env,
    client_state: &mut ClientState,
    header: &Header,
) -> Result<Vec<Height>, TendermintClientError> {
    let height = header.height();
    if store::has_consensus_state(storage, height) {
        return Ok(vec![height]);
    }

    prune_expired(storage, client_state, header.timestamp())?;

    store::set_consensus_state(storage, height, &ConsensusState::from(header))?;
    store::set_consensus_metadata(storage, env, height);

    if height > client_state.latest_height {
        client_state.latest_height = height;
    }
    store::set_client_state(storage, client_state)?;

    Ok(vec![height])
}

// The reference time is the newest consensus state timestamp known to the client,
// including the one about to be inserted.
fn prune_expired(
    storage: &mut dyn Storage,
    client_state: &ClientState,
    header_timestamp: u64,
) -> Result<Option<Height>, TendermintClientError> {
    let latest_timestamp = store::get_consensus_state::<ConsensusState>(
        storage,
        client_state.latest_height,
    )
    .map_or(0, |cs| cs.timestamp);
    let newest = latest_timestamp.max(header_timestamp);
    let unbonding = duration_nanos(client_state.unbonding_period);

    Ok(store::prune_oldest_consensus_state::<ConsensusState>(
        storage,
        |cs| newest.saturating_sub(cs.timestamp) > unbonding,
    )?)
}

/// Freezes the client.
/// # Errors
/// Returns an error if the client state cannot be stored.
pub fn update_state_on_misbehaviour(
    storage: &mut dyn Storage,
    client_state: &mut ClientState,
) -> Result<(), TendermintClientError> {
    client_state.frozen_height = FROZEN_HEIGHT;
    store::set_client_state(storage, client_state)?;
    Ok(())
}
