//! Recovery of a frozen or expired client from a substitute client.

use cosmwasm_std::{Env, Storage};
use ibc_eureka_client_store::{self as store, ReadonlyStorage};
use ibc_eureka_host_types::{Height, Status};
use ibc_eureka_utils::ensure;

use crate::{
    client::status, client_state::ClientState, consensus_state::ConsensusState,
    error::TendermintClientError,
};

// Clears the fields a substitute may differ in.
fn normalized(client_state: &ClientState) -> ClientState {
    ClientState {
        chain_id: String::new(),
        frozen_height: Height::zero(),
        latest_height: Height::zero(),
        ..client_state.clone()
    }
}

/// Replaces the state of the `subject` client with the latest state of the `substitute`.
/// Returns the recovered client state.
///
/// The subject must be frozen or expired, and the two clients must agree on everything but
/// their chain id, latest height and frozen height.
/// # Errors
/// Returns an error if the subject is active, the clients do not match or the substitute's
/// latest consensus state is missing.
pub fn check_substitute_and_update_state(
    subject_storage: &mut dyn Storage,
    substitute_storage: &(impl ReadonlyStorage + ?Sized),
    env: &Env,
    subject: &ClientState,
    substitute: &ClientState,
) -> Result<ClientState, TendermintClientError> {
    let subject_status = status(subject_storage, env, subject)?;
    ensure!(
        matches!(subject_status, Status::Frozen | Status::Expired),
        TendermintClientError::UpdateClientFailed(subject_status)
    );
    ensure!(
        normalized(subject) == normalized(substitute),
        TendermintClientError::InvalidSubstitute(
            "substitute client parameters do not match the subject client".to_string()
        )
    );

    let height = substitute.latest_height;
    let consensus_state = store::get_consensus_state::<ConsensusState>(substitute_storage, height)?;
    let processed_time = store::get_processed_time(substitute_storage, height)?
        .ok_or(TendermintClientError::ProcessedTimeNotFound(height))?;
    let processed_height = store::get_processed_height(substitute_storage, height)?
        .ok_or(TendermintClientError::ProcessedHeightNotFound(height))?;

    store::set_consensus_state(subject_storage, height, &consensus_state)?;
    store::set_consensus_metadata_with_values(
        subject_storage,
        height,
        processed_time,
        processed_height,
    );

    let recovered = ClientState {
        chain_id: substitute.chain_id.clone(),
        frozen_height: Height::zero(),
        latest_height: height,
        ..subject.clone()
    };
    store::set_client_state(subject_storage, &recovered)?;
    Ok(recovered)
}
