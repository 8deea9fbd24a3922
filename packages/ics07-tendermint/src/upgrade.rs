//! Client upgrades committed by the tracked chain.

use std::time::Duration;

use cosmwasm_std::{Env, Storage};
use ibc_eureka_client_store as store;
use ibc_eureka_commitment::{MerklePath, MerkleProof, MerkleRoot};
use ibc_eureka_host_types::{
    path::{KEY_UPGRADED_CLIENT, KEY_UPGRADED_CONS_STATE},
    Height, TypedState,
};
use ibc_eureka_utils::ensure;

use crate::{
    client_state::{duration_nanos, ClientState},
    consensus_state::{ConsensusState, SENTINEL_ROOT},
    error::TendermintClientError,
};

/// The path the tracked chain commits `leaf` under for the upgrade planned at
/// `revision_height`: the upgrade path with its last key replaced by
/// `{last}/{revision_height}/{leaf}`.
/// # Errors
/// Returns an error if the upgrade path is empty.
pub fn upgrade_merkle_path(
    upgrade_path: &[String],
    revision_height: u64,
    leaf: &str,
) -> Result<MerklePath, TendermintClientError> {
    let (last, rest) = upgrade_path.split_last().ok_or_else(|| {
        TendermintClientError::InvalidUpgradeClient("upgrade path is empty".to_string())
    })?;
    let mut keys = rest.to_vec();
    keys.push(format!("{last}/{revision_height}/{leaf}"));
    Ok(MerklePath::new(keys))
}

// The trusting period keeps its ratio to the unbonding period when the latter shrinks.
fn scaled_trusting_period(current: &ClientState, upgraded: &ClientState) -> Duration {
    if upgraded.unbonding_period >= current.unbonding_period {
        return current.trusting_period;
    }
    let scaled = current.trusting_period.as_nanos() * upgraded.unbonding_period.as_nanos()
        / current.unbonding_period.as_nanos();
    Duration::from_nanos(u64::try_from(scaled).unwrap_or(u64::MAX))
}

/// Verifies the upgraded client and consensus state committed by the tracked chain and
/// replaces the client with the upgraded one. Returns the new latest height.
///
/// The upgraded client keeps the client-chosen fields of the current client. Its first
/// consensus state carries [`SENTINEL_ROOT`] and can only be used to verify headers.
/// # Errors
/// Returns an error if the upgrade is not newer than the client or a proof does not verify.
pub fn verify_upgrade_and_update_state(
    storage: &mut dyn Storage,
    env: &Env,
    client_state: &ClientState,
    upgraded_client: &ClientState,
    upgraded_consensus_state: &ConsensusState,
    proof_upgrade_client: &[u8],
    proof_upgrade_consensus_state: &[u8],
) -> Result<Height, TendermintClientError> {
    ensure!(
        !client_state.upgrade_path.is_empty(),
        TendermintClientError::InvalidUpgradeClient(
            "client does not define an upgrade path".to_string()
        )
    );
    ensure!(
        upgraded_client.latest_height > client_state.latest_height,
        TendermintClientError::InvalidUpgradeClient(format!(
            "upgraded client height {} must be greater than current client height {}",
            upgraded_client.latest_height, client_state.latest_height
        ))
    );

    let last_height = client_state.latest_height;
    let consensus_state = store::get_consensus_state::<ConsensusState>(storage, last_height)?;

    let client_path = upgrade_merkle_path(
        &client_state.upgrade_path,
        last_height.revision_height,
        KEY_UPGRADED_CLIENT,
    )?;
    let committed_client = upgraded_client.zero_custom_fields().encode_to_vec()?;
    MerkleProof::decode(proof_upgrade_client)?
        .verify_membership(
            &client_state.proof_specs,
            &consensus_state.root,
            &client_path,
            &committed_client,
        )
        .map_err(|e| {
            TendermintClientError::InvalidUpgradeClient(format!(
                "upgraded client proof failed: {e}"
            ))
        })?;

    let consensus_path = upgrade_merkle_path(
        &client_state.upgrade_path,
        last_height.revision_height,
        KEY_UPGRADED_CONS_STATE,
    )?;
    MerkleProof::decode(proof_upgrade_consensus_state)?
        .verify_membership(
            &client_state.proof_specs,
            &consensus_state.root,
            &consensus_path,
            &upgraded_consensus_state.encode_to_vec()?,
        )
        .map_err(|e| {
            TendermintClientError::InvalidUpgradeClient(format!(
                "upgraded consensus state proof failed: {e}"
            ))
        })?;

    let new_client_state = ClientState {
        chain_id: upgraded_client.chain_id.clone(),
        trust_level: client_state.trust_level,
        trusting_period: scaled_trusting_period(client_state, upgraded_client),
        unbonding_period: upgraded_client.unbonding_period,
        max_clock_drift: client_state.max_clock_drift,
        frozen_height: Height::zero(),
        latest_height: upgraded_client.latest_height,
        proof_specs: upgraded_client.proof_specs.clone(),
        upgrade_path: upgraded_client.upgrade_path.clone(),
    };
    new_client_state.validate()?;

    let new_consensus_state = ConsensusState {
        timestamp: upgraded_consensus_state.timestamp,
        root: MerkleRoot::new(SENTINEL_ROOT),
        next_validators_hash: upgraded_consensus_state.next_validators_hash.clone(),
    };
    new_consensus_state.validate()?;

    let height = new_client_state.latest_height;
    store::set_client_state(storage, &new_client_state)?;
    store::set_consensus_state(storage, height, &new_consensus_state)?;
    store::set_consensus_metadata(storage, env, height);

    tracing::debug!(
        height = %height,
        trusting_period_ns = duration_nanos(new_client_state.trusting_period),
        "applied client upgrade"
    );
    Ok(height)
}
