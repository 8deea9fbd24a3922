//! Verification of multi-hop proofs on the destination chain.

use ibc_eureka_commitment::{apply_prefix, MerklePath, MerklePrefix, ProofSpecs};
use ibc_eureka_host_types::{
    connection::ConnectionEnd,
    path::{client_state_path, consensus_state_path},
    Height, TypedState,
};
use ibc_eureka_ics07_tendermint::{ClientState, ConsensusState};
use ibc_eureka_utils::ensure;

use crate::{
    error::{MultihopError, ProofKind},
    proof::{MultihopProof, MultihopProofs},
};

/// The number of blocks a packet must wait for a time delay to pass, given the maximum
/// expected time per block. Returns 0 when the expected time per block is unset.
#[must_use]
pub const fn block_delay(time_delay: u64, expected_time_per_block: u64) -> u64 {
    if expected_time_per_block == 0 {
        return 0;
    }
    time_delay.div_ceil(expected_time_per_block)
}

/// Verifies that `key` holds `value` on the source chain, or holds nothing when `value` is
/// `None`.
///
/// `consensus_state` is the state the destination's client stores for the last
/// intermediate chain. `connection_hops` starts with the connection on the source, which
/// the caller has already checked, followed by the connection each intermediate chain keeps
/// toward its predecessor. `prefix` is the store prefix of the source chain.
/// # Errors
/// Returns an error naming the hop and the proof kind of the first check that fails.
#[allow(clippy::module_name_repetitions)]
pub fn verify_multihop_proof(
    specs: &ProofSpecs,
    consensus_state: &ConsensusState,
    connection_hops: &[String],
    proofs: &MultihopProofs,
    prefix: &MerklePrefix,
    key: &str,
    value: Option<&[u8]>,
) -> Result<(), MultihopError> {
    let (consensus, connection, client) = (
        proofs.consensus_proofs.len(),
        proofs.connection_proofs.len(),
        proofs.client_proofs.len(),
    );
    ensure!(
        consensus > 0 && connection > 0 && client > 0,
        MultihopError::EmptyProofs {
            consensus,
            connection,
            client
        }
    );
    ensure!(
        consensus == connection && consensus == client,
        MultihopError::ProofCountMismatch {
            consensus,
            connection,
            client
        }
    );

    let connections = verify_connection_states(&proofs.connection_proofs, connection_hops)?;
    verify_client_states(&proofs.client_proofs, &proofs.consensus_proofs)?;
    verify_state_paths(proofs, &connections, prefix)?;

    let source = verify_intermediate_state_proofs(specs, consensus_state, proofs)?;

    let path = apply_prefix(prefix, [key])?;
    let key_proof = proofs.key_proof.merkle_proof(ProofKind::Key, 0)?;
    match value {
        Some(value) => key_proof.verify_membership(specs, &source.root, &path, value),
        None => key_proof.verify_non_membership(specs, &source.root, &path),
    }
    .map_err(MultihopError::InvalidKeyProof)
}

/// Checks that the connection proofs name the remaining connection hops in order and that
/// every connection is open. Returns the decoded connection ends.
fn verify_connection_states(
    connection_proofs: &[MultihopProof],
    connection_hops: &[String],
) -> Result<Vec<ConnectionEnd>, MultihopError> {
    ensure!(
        connection_proofs.len() + 1 == connection_hops.len(),
        MultihopError::ConnectionHopsMismatch {
            hops: connection_hops.len(),
            expected: connection_hops.len().saturating_sub(1),
            actual: connection_proofs.len(),
        }
    );

    connection_proofs
        .iter()
        .zip(&connection_hops[1..])
        .enumerate()
        .map(|(hop, (proof, expected))| {
            let last_key = proof.last_key(ProofKind::Connection, hop)?;
            let actual = last_key.rsplit('/').next().unwrap_or_default();
            ensure!(
                actual == expected,
                MultihopError::UnexpectedConnectionHop {
                    hop,
                    expected: expected.clone(),
                    actual: actual.to_string(),
                }
            );

            let connection = ConnectionEnd::decode_from_slice(&proof.value).map_err(|source| {
                MultihopError::Decode {
                    kind: ProofKind::Connection,
                    hop,
                    source,
                }
            })?;
            ensure!(
                connection.is_open(),
                MultihopError::ConnectionNotOpen {
                    hop,
                    connection_id: actual.to_string(),
                }
            );
            Ok(connection)
        })
        .collect()
}

/// Checks that each client proof is for the client of the paired consensus proof and that no
/// intermediate client is frozen.
fn verify_client_states(
    client_proofs: &[MultihopProof],
    consensus_proofs: &[MultihopProof],
) -> Result<(), MultihopError> {
    for (hop, (client_proof, consensus_proof)) in
        client_proofs.iter().zip(consensus_proofs).enumerate()
    {
        let client = client_proof.client_id(ProofKind::Client, hop)?;
        let consensus = consensus_proof.client_id(ProofKind::Consensus, hop)?;
        ensure!(
            client == consensus,
            MultihopError::ClientIdMismatch {
                hop,
                consensus,
                client,
            }
        );

        let client_state = ClientState::decode_from_slice(&client_proof.value).map_err(|source| {
            MultihopError::Decode {
                kind: ProofKind::Client,
                hop,
                source,
            }
        })?;
        ensure!(
            !client_state.is_frozen(),
            MultihopError::ClientFrozen {
                hop,
                client_id: client,
            }
        );
    }
    Ok(())
}

/// Checks that the client and consensus proofs of each hop are for the client the hop's
/// connection end runs, committed in the store of the connection proof, and that each
/// connection end records the store of its predecessor as the counterparty prefix.
fn verify_state_paths(
    proofs: &MultihopProofs,
    connections: &[ConnectionEnd],
    source_prefix: &MerklePrefix,
) -> Result<(), MultihopError> {
    let mut counterparty_store = vec![source_prefix.key_prefix.clone()];
    for (hop, connection) in connections.iter().enumerate() {
        let store = proofs.connection_proofs[hop].store_prefix();
        let recorded = [connection.counterparty.prefix.key_prefix.clone()];
        ensure!(
            recorded[..] == counterparty_store[..],
            MultihopError::UnexpectedCounterpartyPrefix {
                hop,
                expected: MerklePath::new(counterparty_store).to_string(),
                actual: MerklePath::new(recorded).to_string(),
            }
        );

        let consensus_proof = &proofs.consensus_proofs[hop];
        let last_key = consensus_proof.last_key(ProofKind::Consensus, hop)?;
        let height = last_key
            .rsplit('/')
            .next()
            .and_then(|height| height.parse::<Height>().ok())
            .ok_or_else(|| MultihopError::MalformedKey {
                kind: ProofKind::Consensus,
                hop,
                key: last_key.clone(),
            })?;
        check_state_path(
            consensus_proof,
            store,
            consensus_state_path(&connection.client_id, height),
            ProofKind::Consensus,
            hop,
        )?;
        check_state_path(
            &proofs.client_proofs[hop],
            store,
            client_state_path(&connection.client_id),
            ProofKind::Client,
            hop,
        )?;

        counterparty_store = store.to_vec();
    }
    Ok(())
}

fn check_state_path(
    proof: &MultihopProof,
    store: &[Vec<u8>],
    path: String,
    kind: ProofKind,
    hop: usize,
) -> Result<(), MultihopError> {
    let expected = MerklePath::new(store.iter().cloned().chain([path.into_bytes()]));
    ensure!(
        proof.prefixed_key == expected,
        MultihopError::UnexpectedStatePath {
            kind,
            hop,
            expected: expected.to_string(),
            actual: proof.prefixed_key.to_string(),
        }
    );
    Ok(())
}

/// Walks from the destination toward the source, proving each intermediate consensus state,
/// connection and client state under the root trusted one hop closer to the destination.
/// Returns the consensus state of the source chain.
fn verify_intermediate_state_proofs(
    specs: &ProofSpecs,
    consensus_state: &ConsensusState,
    proofs: &MultihopProofs,
) -> Result<ConsensusState, MultihopError> {
    let mut trusted = consensus_state.clone();
    for (hop, ((consensus_proof, connection_proof), client_proof)) in proofs
        .consensus_proofs
        .iter()
        .zip(&proofs.connection_proofs)
        .zip(&proofs.client_proofs)
        .enumerate()
        .rev()
    {
        let next = ConsensusState::decode_from_slice(&consensus_proof.value).map_err(|source| {
            MultihopError::Decode {
                kind: ProofKind::Consensus,
                hop,
                source,
            }
        })?;

        verify_hop(specs, &trusted, consensus_proof, ProofKind::Consensus, hop)?;
        verify_hop(specs, &trusted, connection_proof, ProofKind::Connection, hop)?;
        verify_hop(specs, &trusted, client_proof, ProofKind::Client, hop)?;

        trusted = next;
    }
    Ok(trusted)
}

fn verify_hop(
    specs: &ProofSpecs,
    trusted: &ConsensusState,
    proof: &MultihopProof,
    kind: ProofKind,
    hop: usize,
) -> Result<(), MultihopError> {
    proof
        .merkle_proof(kind, hop)?
        .verify_membership(specs, &trusted.root, &proof.prefixed_key, &proof.value)
        .map_err(|source| MultihopError::InvalidProof { kind, hop, source })
}
