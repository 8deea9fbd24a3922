//! Integration tests for misbehaviour detection and freezing.

mod helpers;

use helpers::{trusted_height, Fixture, CHAIN_ID};
use ibc_eureka_client_store as store;
use ibc_eureka_commitment::MerklePath;
use ibc_eureka_host_types::{Height, Status};
use ibc_eureka_ics07_tendermint::{
    client,
    membership::verify_membership,
    update::{check_for_misbehaviour, update_state_on_misbehaviour, verify_client_message},
    ClientMessage, ClientState, DelayPeriod, Header, Misbehaviour, MisbehaviourKind,
    TendermintClientError, FROZEN_HEIGHT,
};
use rstest::rstest;

fn misbehaviour(header1: Header, header2: Header) -> ClientMessage {
    Misbehaviour {
        client_id: "07-tendermint-0".to_string(),
        header1,
        header2,
    }
    .into()
}

fn verify(fixture: &Fixture, message: &ClientMessage) -> Result<(), TendermintClientError> {
    verify_client_message(&fixture.storage, &fixture.env, &fixture.client_state, message)
}

#[test]
fn fork_freezes_the_client() {
    let mut fixture = Fixture::new();
    let header1 = fixture.header(12, 10).app_hash(b"a".to_vec()).build();
    let header2 = fixture.header(12, 10).app_hash(b"b".to_vec()).build();
    let message = misbehaviour(header1, header2);

    verify(&fixture, &message).unwrap();
    assert!(check_for_misbehaviour(&message));
    update_state_on_misbehaviour(&mut fixture.storage, &mut fixture.client_state).unwrap();

    let stored = store::get_client_state::<ClientState>(&fixture.storage).unwrap();
    assert_eq!(stored.frozen_height, FROZEN_HEIGHT);
    assert_eq!(
        client::status(&fixture.storage, &fixture.env, &stored).unwrap(),
        Status::Frozen
    );

    let err = verify_membership(
        &fixture.storage,
        &fixture.env,
        &stored,
        trusted_height(),
        DelayPeriod::NONE,
        &[],
        &MerklePath::new(["ibc", "key"]),
        b"value",
    )
    .unwrap_err();
    assert!(matches!(err, TendermintClientError::ClientFrozen));
}

#[test]
fn identical_headers_are_not_misbehaviour() {
    let fixture = Fixture::new();
    let header = fixture.header(12, 10).build();
    let message = misbehaviour(header.clone(), header);

    assert!(!check_for_misbehaviour(&message));
    assert!(matches!(
        verify(&fixture, &message),
        Err(TendermintClientError::InvalidMisbehaviour(_))
    ));
}

#[test]
fn time_violation() {
    let fixture = Fixture::new();
    let header1 = fixture.header(13, 10).build();
    let header2 = fixture.header(12, 20).build();
    let ClientMessage::Misbehaviour(evidence) = misbehaviour(header1.clone(), header2.clone())
    else {
        unreachable!()
    };
    assert_eq!(evidence.kind(), Some(MisbehaviourKind::TimeViolation));

    verify(&fixture, &misbehaviour(header1, header2)).unwrap();
}

/// Evidence headers are not held to the update time bounds: a header dated an hour past the
/// host time, or at the trusted time, still proves a time violation.
#[rstest]
#[case::beyond_clock_drift(10, 3650)]
#[case::at_trusted_time(0, 0)]
fn time_violation_outside_the_update_time_bounds_freezes_the_client(
    #[case] header1_seconds: u64,
    #[case] header2_seconds: u64,
) {
    let mut fixture = Fixture::new();
    let header1 = fixture.header(13, header1_seconds).build();
    let header2 = fixture.header(12, header2_seconds).build();
    assert!(matches!(
        verify(&fixture, &ClientMessage::from(header2.clone())),
        Err(TendermintClientError::InvalidHeader(_))
    ));

    let message = misbehaviour(header1, header2);
    verify(&fixture, &message).unwrap();
    assert!(check_for_misbehaviour(&message));
    update_state_on_misbehaviour(&mut fixture.storage, &mut fixture.client_state).unwrap();

    assert_eq!(
        client::status(&fixture.storage, &fixture.env, &fixture.client_state).unwrap(),
        Status::Frozen
    );
}

#[test]
fn later_header_with_later_time_is_not_misbehaviour() {
    let fixture = Fixture::new();
    let message = misbehaviour(
        fixture.header(13, 20).build(),
        fixture.header(12, 10).build(),
    );

    assert!(!check_for_misbehaviour(&message));
    assert!(matches!(
        verify(&fixture, &message),
        Err(TendermintClientError::InvalidMisbehaviour(_))
    ));
}

#[test]
fn headers_must_be_ordered_by_height() {
    let fixture = Fixture::new();
    let message = misbehaviour(
        fixture.header(12, 20).build(),
        fixture.header(13, 10).build(),
    );

    assert!(matches!(
        verify(&fixture, &message),
        Err(TendermintClientError::InvalidMisbehaviour(_))
    ));
}

#[test]
fn both_headers_need_a_valid_commit() {
    let fixture = Fixture::new();
    let header1 = fixture.header(12, 10).app_hash(b"a".to_vec()).build();
    let header2 = fixture
        .header(12, 10)
        .app_hash(b"b".to_vec())
        .signers(vec![0])
        .build();

    assert!(matches!(
        verify(&fixture, &misbehaviour(header1, header2)),
        Err(TendermintClientError::InvalidMisbehaviour(_))
    ));
}

#[test]
fn misbehaviour_needs_the_trusted_consensus_states() {
    let fixture = Fixture::new();
    let header1 = fixture.header(12, 10).app_hash(b"a".to_vec()).build();
    let header2 = fixture
        .header(12, 10)
        .app_hash(b"b".to_vec())
        .trusted(Height::new(1, 11), fixture.validators.validator_set())
        .build();

    assert!(matches!(
        verify(&fixture, &misbehaviour(header1, header2)),
        Err(TendermintClientError::ConsensusStateNotFound(h)) if h == Height::new(1, 11)
    ));
}

#[test]
fn misbehaviour_for_another_chain() {
    let fixture = Fixture::new();
    let mut header1 = fixture.header(12, 10).app_hash(b"a".to_vec()).build();
    header1.signed_header.header.chain_id = format!("{CHAIN_ID}0").try_into().unwrap();
    let header2 = fixture.header(12, 10).app_hash(b"b".to_vec()).build();

    assert!(matches!(
        verify(&fixture, &misbehaviour(header1, header2)),
        Err(TendermintClientError::InvalidMisbehaviour(_))
    ));
}
