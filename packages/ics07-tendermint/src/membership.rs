//! Membership and non-membership verification against stored consensus states.

use cosmwasm_std::Env;
use ibc_eureka_client_store::{self as store, ReadonlyStorage};
use ibc_eureka_commitment::{apply_prefix, MerklePath, MerklePrefix, MerkleProof};
use ibc_eureka_host_types::{
    channel::ChannelEnd,
    connection::ConnectionEnd,
    path::{
        channel_path, client_state_path, connection_path, consensus_state_path,
        next_sequence_recv_path, packet_acknowledgement_path, packet_commitment_path,
        packet_receipt_path,
    },
    Height, TypedState,
};
use ibc_eureka_utils::ensure;

use crate::{
    client_state::ClientState, consensus_state::ConsensusState, error::TendermintClientError,
};

/// The time and block delay a proven value must have been committed for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DelayPeriod {
    /// Delay in nanoseconds
    pub time: u64,
    /// Delay in blocks
    pub blocks: u64,
}

impl DelayPeriod {
    /// No delay.
    pub const NONE: Self = Self { time: 0, blocks: 0 };

    /// Creates a new delay period.
    #[must_use]
    pub const fn new(time: u64, blocks: u64) -> Self {
        Self { time, blocks }
    }
}

/// Checks that the consensus state at `height` was stored at least `delay` ago, in both host
/// time and host blocks. A zero component skips its check.
/// # Errors
/// Returns an error if the processed time or height is missing or the delay has not passed.
pub fn verify_delay_period_passed(
    storage: &(impl ReadonlyStorage + ?Sized),
    env: &Env,
    height: Height,
    delay: DelayPeriod,
) -> Result<(), TendermintClientError> {
    if delay.time != 0 {
        let processed_time = store::get_processed_time(storage, height)?
            .ok_or(TendermintClientError::ProcessedTimeNotFound(height))?;
        let now = env.block.time.nanos();
        let valid_after = processed_time.saturating_add(delay.time);
        ensure!(
            now >= valid_after,
            TendermintClientError::DelayPeriodNotPassed(format!(
                "current time {now} is before {valid_after}"
            ))
        );
    }

    if delay.blocks != 0 {
        let processed_height = store::get_processed_height(storage, height)?
            .ok_or(TendermintClientError::ProcessedHeightNotFound(height))?;
        let current = store::self_height(env);
        let valid_after = Height::new(
            processed_height.revision_number,
            processed_height.revision_height.saturating_add(delay.blocks),
        );
        ensure!(
            current >= valid_after,
            TendermintClientError::DelayPeriodNotPassed(format!(
                "current height {current} is before {valid_after}"
            ))
        );
    }

    Ok(())
}

fn load_proof_context(
    storage: &(impl ReadonlyStorage + ?Sized),
    env: &Env,
    client_state: &ClientState,
    height: Height,
    delay: DelayPeriod,
    proof: &[u8],
) -> Result<(MerkleProof, ConsensusState), TendermintClientError> {
    ensure!(!client_state.is_frozen(), TendermintClientError::ClientFrozen);
    ensure!(
        client_state.latest_height >= height,
        TendermintClientError::ConsensusStateNotFound(height)
    );
    verify_delay_period_passed(storage, env, height, delay)?;

    let proof = MerkleProof::decode(proof)?;
    let consensus_state = store::get_consensus_state::<ConsensusState>(storage, height)?;
    Ok((proof, consensus_state))
}

/// Verifies that `value` is committed under `path` in the consensus state at `height`.
/// # Errors
/// Returns an error if the client is frozen, the consensus state is not tracked, the delay
/// has not passed or the proof does not verify.
#[allow(clippy::too_many_arguments)]
pub fn verify_membership(
    storage: &(impl ReadonlyStorage + ?Sized),
    env: &Env,
    client_state: &ClientState,
    height: Height,
    delay: DelayPeriod,
    proof: &[u8],
    path: &MerklePath,
    value: &[u8],
) -> Result<(), TendermintClientError> {
    let (proof, consensus_state) =
        load_proof_context(storage, env, client_state, height, delay, proof)?;
    proof.verify_membership(&client_state.proof_specs, &consensus_state.root, path, value)?;
    Ok(())
}

/// Verifies that nothing is committed under `path` in the consensus state at `height`.
/// # Errors
/// Returns an error if the client is frozen, the consensus state is not tracked, the delay
/// has not passed or the proof does not verify.
pub fn verify_non_membership(
    storage: &(impl ReadonlyStorage + ?Sized),
    env: &Env,
    client_state: &ClientState,
    height: Height,
    delay: DelayPeriod,
    proof: &[u8],
    path: &MerklePath,
) -> Result<(), TendermintClientError> {
    let (proof, consensus_state) =
        load_proof_context(storage, env, client_state, height, delay, proof)?;
    proof.verify_non_membership(&client_state.proof_specs, &consensus_state.root, path)?;
    Ok(())
}

/// Verifies the client state a counterparty stores for one of its clients.
/// # Errors
/// Returns an error if the proof does not verify.
#[allow(clippy::too_many_arguments)]
pub fn verify_client_state<C: TypedState>(
    storage: &(impl ReadonlyStorage + ?Sized),
    env: &Env,
    client_state: &ClientState,
    height: Height,
    prefix: &MerklePrefix,
    proof: &[u8],
    counterparty_client_id: &str,
    counterparty_client_state: &C,
) -> Result<(), TendermintClientError> {
    let path = apply_prefix(prefix, [client_state_path(counterparty_client_id)])?;
    let value = counterparty_client_state.encode_to_vec()?;
    verify_membership(storage, env, client_state, height, DelayPeriod::NONE, proof, &path, &value)
}

/// Verifies a consensus state a counterparty stores for one of its clients.
/// # Errors
/// Returns an error if the proof does not verify.
#[allow(clippy::too_many_arguments)]
pub fn verify_client_consensus_state<C: TypedState>(
    storage: &(impl ReadonlyStorage + ?Sized),
    env: &Env,
    client_state: &ClientState,
    height: Height,
    prefix: &MerklePrefix,
    proof: &[u8],
    counterparty_client_id: &str,
    consensus_height: Height,
    consensus_state: &C,
) -> Result<(), TendermintClientError> {
    let path = apply_prefix(
        prefix,
        [consensus_state_path(counterparty_client_id, consensus_height)],
    )?;
    let value = consensus_state.encode_to_vec()?;
    verify_membership(storage, env, client_state, height, DelayPeriod::NONE, proof, &path, &value)
}

/// Verifies a connection end stored by the counterparty.
/// # Errors
/// Returns an error if the proof does not verify.
#[allow(clippy::too_many_arguments)]
pub fn verify_connection_state(
    storage: &(impl ReadonlyStorage + ?Sized),
    env: &Env,
    client_state: &ClientState,
    height: Height,
    prefix: &MerklePrefix,
    proof: &[u8],
    connection_id: &str,
    connection_end: &ConnectionEnd,
) -> Result<(), TendermintClientError> {
    let path = apply_prefix(prefix, [connection_path(connection_id)])?;
    let value = connection_end.encode_to_vec()?;
    verify_membership(storage, env, client_state, height, DelayPeriod::NONE, proof, &path, &value)
}

/// Verifies a channel end stored by the counterparty.
/// # Errors
/// Returns an error if the proof does not verify.
#[allow(clippy::too_many_arguments)]
pub fn verify_channel_state(
    storage: &(impl ReadonlyStorage + ?Sized),
    env: &Env,
    client_state: &ClientState,
    height: Height,
    prefix: &MerklePrefix,
    proof: &[u8],
    port_id: &str,
    channel_id: &str,
    channel_end: &ChannelEnd,
) -> Result<(), TendermintClientError> {
    let path = apply_prefix(prefix, [channel_path(port_id, channel_id)])?;
    let value = channel_end.encode_to_vec()?;
    verify_membership(storage, env, client_state, height, DelayPeriod::NONE, proof, &path, &value)
}

/// Identifies a packet by its source port, channel and sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PacketKey<'a> {
    /// Port id
    pub port_id: &'a str,
    /// Channel id
    pub channel_id: &'a str,
    /// Sequence
    pub sequence: u64,
}

/// Verifies a packet commitment stored by the counterparty.
/// # Errors
/// Returns an error if the delay has not passed or the proof does not verify.
#[allow(clippy::too_many_arguments)]
pub fn verify_packet_commitment(
    storage: &(impl ReadonlyStorage + ?Sized),
    env: &Env,
    client_state: &ClientState,
    height: Height,
    delay: DelayPeriod,
    prefix: &MerklePrefix,
    proof: &[u8],
    packet: PacketKey<'_>,
    commitment: &[u8],
) -> Result<(), TendermintClientError> {
    let path = apply_prefix(
        prefix,
        [packet_commitment_path(
            packet.port_id,
            packet.channel_id,
            packet.sequence,
        )],
    )?;
    verify_membership(storage, env, client_state, height, delay, proof, &path, commitment)
}

/// Verifies a packet acknowledgement commitment stored by the counterparty.
/// # Errors
/// Returns an error if the delay has not passed or the proof does not verify.
#[allow(clippy::too_many_arguments)]
pub fn verify_packet_acknowledgement(
    storage: &(impl ReadonlyStorage + ?Sized),
    env: &Env,
    client_state: &ClientState,
    height: Height,
    delay: DelayPeriod,
    prefix: &MerklePrefix,
    proof: &[u8],
    packet: PacketKey<'_>,
    acknowledgement: &[u8],
) -> Result<(), TendermintClientError> {
    let path = apply_prefix(
        prefix,
        [packet_acknowledgement_path(
            packet.port_id,
            packet.channel_id,
            packet.sequence,
        )],
    )?;
    verify_membership(storage, env, client_state, height, delay, proof, &path, acknowledgement)
}

/// Verifies that the counterparty has not received a packet.
/// # Errors
/// Returns an error if the delay has not passed or the proof does not verify.
#[allow(clippy::too_many_arguments)]
pub fn verify_packet_receipt_absence(
    storage: &(impl ReadonlyStorage + ?Sized),
    env: &Env,
    client_state: &ClientState,
    height: Height,
    delay: DelayPeriod,
    prefix: &MerklePrefix,
    proof: &[u8],
    packet: PacketKey<'_>,
) -> Result<(), TendermintClientError> {
    let path = apply_prefix(
        prefix,
        [packet_receipt_path(
            packet.port_id,
            packet.channel_id,
            packet.sequence,
        )],
    )?;
    verify_non_membership(storage, env, client_state, height, delay, proof, &path)
}

/// Verifies the next receive sequence of an ordered channel on the counterparty. The value is
/// the big-endian sequence.
/// # Errors
/// Returns an error if the delay has not passed or the proof does not verify.
#[allow(clippy::too_many_arguments)]
pub fn verify_next_sequence_recv(
    storage: &(impl ReadonlyStorage + ?Sized),
    env: &Env,
    client_state: &ClientState,
    height: Height,
    delay: DelayPeriod,
    prefix: &MerklePrefix,
    proof: &[u8],
    port_id: &str,
    channel_id: &str,
    next_sequence_recv: u64,
) -> Result<(), TendermintClientError> {
    let path = apply_prefix(prefix, [next_sequence_recv_path(port_id, channel_id)])?;
    verify_membership(
        storage,
        env,
        client_state,
        height,
        delay,
        proof,
        &path,
        &next_sequence_recv.to_be_bytes(),
    )
}
