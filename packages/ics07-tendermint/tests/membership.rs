//! Integration tests for proof verification against tracked consensus states.

mod helpers;

use cosmwasm_std::Storage;
use helpers::{trusted_height, Fixture};
use ibc_eureka_client_store as store;
use ibc_eureka_commitment::{test_utils::MultiStore, MerkleRoot};
use ibc_eureka_host_types::{
    connection::{ConnectionEnd, Counterparty, State, Version},
    path::{
        client_state_path, connection_path, next_sequence_recv_path, packet_commitment_path,
    },
    Height, TypedState,
};
use ibc_eureka_ics07_tendermint::{
    membership::{
        verify_client_state, verify_connection_state, verify_delay_period_passed,
        verify_next_sequence_recv, verify_packet_commitment, verify_packet_receipt_absence,
    },
    ClientState, DelayPeriod, PacketKey, TendermintClientError,
};

const PORT: &str = "transfer";
const CHANNEL: &str = "channel-0";

fn connection_end() -> ConnectionEnd {
    ConnectionEnd {
        client_id: "07-tendermint-7".to_string(),
        versions: vec![Version::default()],
        state: State::Open,
        counterparty: Counterparty {
            client_id: "07-tendermint-0".to_string(),
            connection_id: Some("connection-3".to_string()),
            prefix: ibc_eureka_commitment::MerklePrefix::new("ibc"),
        },
        delay_period: 0,
    }
}

fn counterparty_store() -> MultiStore {
    let mut store = MultiStore::new("ibc");
    store.set(
        &connection_path("connection-0"),
        connection_end().encode_to_vec().unwrap(),
    );
    store.set(&packet_commitment_path(PORT, CHANNEL, 1), [7u8; 32]);
    store.set(&next_sequence_recv_path(PORT, CHANNEL), 5u64.to_be_bytes());
    store
}

fn fixture(counterparty: &MultiStore) -> Fixture {
    Fixture::with_root(counterparty.root())
}

fn packet(sequence: u64) -> PacketKey<'static> {
    PacketKey {
        port_id: PORT,
        channel_id: CHANNEL,
        sequence,
    }
}

#[test]
fn connection_state_at_tracked_and_untracked_heights() {
    let counterparty = counterparty_store();
    let fixture = fixture(&counterparty);
    let proof = counterparty
        .membership_proof(&connection_path("connection-0"))
        .unwrap()
        .encode_to_vec();

    verify_connection_state(
        &fixture.storage,
        &fixture.env,
        &fixture.client_state,
        trusted_height(),
        &counterparty.prefix(),
        &proof,
        "connection-0",
        &connection_end(),
    )
    .unwrap();

    let mut other = connection_end();
    other.state = State::TryOpen;
    assert!(matches!(
        verify_connection_state(
            &fixture.storage,
            &fixture.env,
            &fixture.client_state,
            trusted_height(),
            &counterparty.prefix(),
            &proof,
            "connection-0",
            &other,
        ),
        Err(TendermintClientError::InvalidProof(_))
    ));

    let untracked = trusted_height().increment();
    assert!(matches!(
        verify_connection_state(
            &fixture.storage,
            &fixture.env,
            &fixture.client_state,
            untracked,
            &counterparty.prefix(),
            &proof,
            "connection-0",
            &connection_end(),
        ),
        Err(TendermintClientError::ConsensusStateNotFound(h)) if h == untracked
    ));
}

#[test]
fn packet_commitment_waits_for_the_delay_period() {
    let counterparty = counterparty_store();
    let mut fixture = fixture(&counterparty);
    let proof = counterparty
        .membership_proof(&packet_commitment_path(PORT, CHANNEL, 1))
        .unwrap()
        .encode_to_vec();
    let delay = DelayPeriod::new(60_000_000_000, 2);

    let verify = |fixture: &Fixture| {
        verify_packet_commitment(
            &fixture.storage,
            &fixture.env,
            &fixture.client_state,
            trusted_height(),
            delay,
            &counterparty.prefix(),
            &proof,
            packet(1),
            &[7u8; 32],
        )
    };

    assert!(matches!(
        verify(&fixture),
        Err(TendermintClientError::DelayPeriodNotPassed(_))
    ));

    fixture.env.block.time = fixture.env.block.time.plus_seconds(60);
    assert!(matches!(
        verify(&fixture),
        Err(TendermintClientError::DelayPeriodNotPassed(_))
    ));

    fixture.env.block.height += 2;
    verify(&fixture).unwrap();
}

#[test]
fn zero_delay_skips_the_metadata_lookup() {
    let counterparty = counterparty_store();
    let mut fixture = fixture(&counterparty);
    let height = trusted_height();
    fixture.storage.remove(store::processed_time_key(height).as_bytes());

    verify_delay_period_passed(&fixture.storage, &fixture.env, height, DelayPeriod::NONE).unwrap();
    assert!(matches!(
        verify_delay_period_passed(&fixture.storage, &fixture.env, height, DelayPeriod::new(1, 0)),
        Err(TendermintClientError::ProcessedTimeNotFound(h)) if h == height
    ));
    verify_delay_period_passed(&fixture.storage, &fixture.env, height, DelayPeriod::new(0, 1))
        .unwrap_err();
}

#[test]
fn receipt_absence_and_next_sequence() {
    let counterparty = counterparty_store();
    let fixture = fixture(&counterparty);
    let receipt_key = ibc_eureka_host_types::path::packet_receipt_path(PORT, CHANNEL, 1);
    let absence = counterparty
        .non_membership_proof(&receipt_key)
        .unwrap()
        .encode_to_vec();

    verify_packet_receipt_absence(
        &fixture.storage,
        &fixture.env,
        &fixture.client_state,
        trusted_height(),
        DelayPeriod::NONE,
        &counterparty.prefix(),
        &absence,
        packet(1),
    )
    .unwrap();

    let next_sequence = counterparty
        .membership_proof(&next_sequence_recv_path(PORT, CHANNEL))
        .unwrap()
        .encode_to_vec();
    verify_next_sequence_recv(
        &fixture.storage,
        &fixture.env,
        &fixture.client_state,
        trusted_height(),
        DelayPeriod::NONE,
        &counterparty.prefix(),
        &next_sequence,
        PORT,
        CHANNEL,
        5,
    )
    .unwrap();
    assert!(verify_next_sequence_recv(
        &fixture.storage,
        &fixture.env,
        &fixture.client_state,
        trusted_height(),
        DelayPeriod::NONE,
        &counterparty.prefix(),
        &next_sequence,
        PORT,
        CHANNEL,
        6,
    )
    .is_err());
}

#[test]
fn counterparty_client_state() {
    let mut counterparty = MultiStore::new("ibc");
    let tracked = ibc_eureka_ics07_tendermint::test_utils::client_state("osmosis-2", 50);
    counterparty.set(
        &client_state_path("07-tendermint-0"),
        tracked.encode_to_vec().unwrap(),
    );
    let fixture = fixture(&counterparty);
    let proof = counterparty
        .membership_proof(&client_state_path("07-tendermint-0"))
        .unwrap()
        .encode_to_vec();

    verify_client_state::<ClientState>(
        &fixture.storage,
        &fixture.env,
        &fixture.client_state,
        trusted_height(),
        &counterparty.prefix(),
        &proof,
        "07-tendermint-0",
        &tracked,
    )
    .unwrap();
}

#[test]
fn malformed_proof_bytes() {
    let counterparty = counterparty_store();
    let fixture = fixture(&counterparty);

    assert!(matches!(
        verify_connection_state(
            &fixture.storage,
            &fixture.env,
            &fixture.client_state,
            trusted_height(),
            &counterparty.prefix(),
            &[0xff, 0xff],
            "connection-0",
            &connection_end(),
        ),
        Err(TendermintClientError::InvalidProof(_))
    ));
}

#[test]
fn proofs_never_verify_against_the_wrong_root() {
    let counterparty = counterparty_store();
    let fixture = Fixture::with_root(MerkleRoot::new(b"other-root".to_vec()));
    let proof = counterparty
        .membership_proof(&connection_path("connection-0"))
        .unwrap()
        .encode_to_vec();

    assert!(verify_connection_state(
        &fixture.storage,
        &fixture.env,
        &fixture.client_state,
        Height::new(1, 10),
        &counterparty.prefix(),
        &proof,
        "connection-0",
        &connection_end(),
    )
    .is_err());
}
