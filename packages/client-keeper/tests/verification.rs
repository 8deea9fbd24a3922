//! Membership verification through Tendermint and localhost clients.

mod helpers;

use cosmwasm_std::Storage;
use helpers::{trusted_height, Setup};
use ibc_eureka_client_keeper::{
    keeper::set_params,
    localhost::SENTINEL_PROOF,
    msg::{MsgUpdateClient, VerifyMembershipMsg, VerifyNonMembershipMsg},
    ClientError, Params, LOCALHOST_CLIENT_ID,
};
use ibc_eureka_commitment::{apply_prefix, test_utils::MultiStore, MerklePath};
use ibc_eureka_host_types::{path::packet_commitment_path, Height, Status};
use ibc_eureka_ics07_tendermint::{test_utils::SECOND, TendermintClientError};
use ibc_proto::google::protobuf::Any;
use rstest::rstest;

const COMMITMENT: [u8; 32] = [7; 32];

fn commitment_path() -> String {
    packet_commitment_path("transfer", "channel-0", 1)
}

fn counterparty() -> MultiStore {
    let mut store = MultiStore::new("ibc");
    store.set(&commitment_path(), COMMITMENT);
    store
}

fn full_path(store: &MultiStore, path: &str) -> MerklePath {
    apply_prefix(&store.prefix(), [path]).unwrap()
}

fn membership(store: &MultiStore, height: Height) -> VerifyMembershipMsg {
    VerifyMembershipMsg {
        height,
        delay_time_period: 0,
        delay_block_period: 0,
        proof: store
            .membership_proof(&commitment_path())
            .unwrap()
            .encode_to_vec(),
        merkle_path: full_path(store, &commitment_path()),
        value: COMMITMENT.to_vec(),
    }
}

fn non_membership(store: &MultiStore, path: &str) -> VerifyNonMembershipMsg {
    VerifyNonMembershipMsg {
        height: trusted_height(),
        delay_time_period: 0,
        delay_block_period: 0,
        proof: store.non_membership_proof(path).unwrap().encode_to_vec(),
        merkle_path: full_path(store, path),
    }
}

#[test]
fn tendermint_membership_and_non_membership() {
    let store = counterparty();
    let mut setup = Setup::new();
    let client_id = setup.create_client(store.root());

    setup
        .keeper
        .verify_membership(
            &setup.storage,
            &setup.env,
            &client_id,
            &membership(&store, trusted_height()),
        )
        .unwrap();

    let absent = packet_commitment_path("transfer", "channel-0", 2);
    setup
        .keeper
        .verify_non_membership(
            &setup.storage,
            &setup.env,
            &client_id,
            &non_membership(&store, &absent),
        )
        .unwrap();
}

#[test]
fn tendermint_membership_rejects_a_wrong_value() {
    let store = counterparty();
    let mut setup = Setup::new();
    let client_id = setup.create_client(store.root());
    let mut msg = membership(&store, trusted_height());
    msg.value = vec![8; 32];

    assert!(matches!(
        setup
            .keeper
            .verify_membership(&setup.storage, &setup.env, &client_id, &msg),
        Err(ClientError::Tendermint(TendermintClientError::InvalidProof(_)))
    ));
}

#[test]
fn tendermint_membership_needs_a_tracked_height() {
    let store = counterparty();
    let mut setup = Setup::new();
    let client_id = setup.create_client(store.root());

    assert!(matches!(
        setup.keeper.verify_membership(
            &setup.storage,
            &setup.env,
            &client_id,
            &membership(&store, Height::new(1, 11)),
        ),
        Err(ClientError::Tendermint(
            TendermintClientError::ConsensusStateNotFound(height)
        )) if height == Height::new(1, 11)
    ));
}

#[test]
fn tendermint_membership_waits_for_the_delay_period() {
    let store = counterparty();
    let mut setup = Setup::new();
    let client_id = setup.create_client(store.root());
    let mut msg = membership(&store, trusted_height());
    msg.delay_time_period = 10 * SECOND;
    msg.delay_block_period = 2;

    assert!(matches!(
        setup
            .keeper
            .verify_membership(&setup.storage, &setup.env, &client_id, &msg),
        Err(ClientError::Tendermint(
            TendermintClientError::DelayPeriodNotPassed(_)
        ))
    ));

    setup.env.block.time = setup.env.block.time.plus_seconds(10);
    assert!(matches!(
        setup
            .keeper
            .verify_membership(&setup.storage, &setup.env, &client_id, &msg),
        Err(ClientError::Tendermint(
            TendermintClientError::DelayPeriodNotPassed(_)
        ))
    ));

    setup.env.block.height += 2;
    setup
        .keeper
        .verify_membership(&setup.storage, &setup.env, &client_id, &msg)
        .unwrap();
}

#[test]
fn frozen_clients_cannot_verify() {
    let store = counterparty();
    let mut setup = Setup::new();
    let client_id = setup.create_client(store.root());
    setup.freeze(&client_id);

    assert!(matches!(
        setup.keeper.verify_membership(
            &setup.storage,
            &setup.env,
            &client_id,
            &membership(&store, trusted_height()),
        ),
        Err(ClientError::ClientFrozen(id)) if id == client_id
    ));
}

#[test]
fn expired_clients_cannot_verify() {
    let store = counterparty();
    let mut setup = Setup::new();
    let client_id = setup.create_client(store.root());
    setup.env.block.time = setup.env.block.time.plus_seconds(60);

    assert!(matches!(
        setup.keeper.verify_membership(
            &setup.storage,
            &setup.env,
            &client_id,
            &membership(&store, trusted_height()),
        ),
        Err(ClientError::ClientNotActive { status: Status::Expired, .. })
    ));
}

fn host_path(key: &str) -> MerklePath {
    MerklePath::new(["ibc", key])
}

fn localhost_membership(key: &str, value: &[u8]) -> VerifyMembershipMsg {
    VerifyMembershipMsg {
        height: Height::zero(),
        delay_time_period: 0,
        delay_block_period: 0,
        proof: SENTINEL_PROOF.to_vec(),
        merkle_path: host_path(key),
        value: value.to_vec(),
    }
}

#[test]
fn localhost_reads_the_host_store() {
    let mut setup = Setup::new();
    setup
        .storage
        .set(commitment_path().as_bytes(), &COMMITMENT);

    setup
        .keeper
        .verify_membership(
            &setup.storage,
            &setup.env,
            LOCALHOST_CLIENT_ID,
            &localhost_membership(&commitment_path(), &COMMITMENT),
        )
        .unwrap();

    let absent = VerifyNonMembershipMsg {
        height: Height::zero(),
        delay_time_period: 0,
        delay_block_period: 0,
        proof: SENTINEL_PROOF.to_vec(),
        merkle_path: host_path("receipts/ports/transfer/channels/channel-0/sequences/1"),
    };
    setup
        .keeper
        .verify_non_membership(&setup.storage, &setup.env, LOCALHOST_CLIENT_ID, &absent)
        .unwrap();

    let present = VerifyNonMembershipMsg {
        merkle_path: host_path(&commitment_path()),
        ..absent
    };
    assert!(matches!(
        setup
            .keeper
            .verify_non_membership(&setup.storage, &setup.env, LOCALHOST_CLIENT_ID, &present),
        Err(ClientError::UnexpectedValue { .. })
    ));
}

#[rstest]
#[case::missing("missing", &COMMITMENT)]
#[case::mismatch("stored", &[1, 2, 3])]
fn localhost_membership_needs_the_stored_value(#[case] key: &str, #[case] value: &[u8]) {
    let mut setup = Setup::new();
    setup.storage.set(b"stored", &COMMITMENT);

    let err = setup
        .keeper
        .verify_membership(
            &setup.storage,
            &setup.env,
            LOCALHOST_CLIENT_ID,
            &localhost_membership(key, value),
        )
        .unwrap_err();
    assert!(
        matches!(
            err,
            ClientError::ValueNotFound(_) | ClientError::ValueMismatch { .. }
        ),
        "unexpected error: {err}"
    );
}

#[test]
fn localhost_requires_the_sentinel_proof() {
    let setup = Setup::new();
    let mut msg = localhost_membership("stored", &COMMITMENT);
    msg.proof = vec![0x02];

    assert!(matches!(
        setup
            .keeper
            .verify_membership(&setup.storage, &setup.env, LOCALHOST_CLIENT_ID, &msg),
        Err(ClientError::InvalidProof(_))
    ));

    msg.proof = SENTINEL_PROOF.to_vec();
    msg.merkle_path = MerklePath::new(["ibc", "stored", "extra"]);
    assert!(matches!(
        setup
            .keeper
            .verify_membership(&setup.storage, &setup.env, LOCALHOST_CLIENT_ID, &msg),
        Err(ClientError::InvalidMerklePath { .. })
    ));
}

#[test]
fn localhost_is_unauthorized_unless_allowed() {
    let mut setup = Setup::new();
    let mut params = Params::default();
    params.client.allowed_clients = vec!["07-tendermint".to_string()];
    set_params(&mut setup.storage, &params).unwrap();

    assert_eq!(
        setup
            .keeper
            .client_status(&setup.storage, &setup.env, LOCALHOST_CLIENT_ID)
            .unwrap(),
        Status::Unauthorized
    );
    assert!(matches!(
        setup.keeper.verify_membership(
            &setup.storage,
            &setup.env,
            LOCALHOST_CLIENT_ID,
            &localhost_membership("stored", &COMMITMENT),
        ),
        Err(ClientError::ClientNotActive { status: Status::Unauthorized, .. })
    ));
}

#[test]
fn localhost_tracks_the_host_chain() {
    let mut setup = Setup::new();

    assert_eq!(
        setup
            .keeper
            .latest_height(&setup.storage, &setup.env, LOCALHOST_CLIENT_ID)
            .unwrap()
            .revision_height,
        setup.env.block.height
    );
    assert_eq!(
        setup
            .keeper
            .timestamp_at_height(&setup.storage, &setup.env, LOCALHOST_CLIENT_ID, Height::zero())
            .unwrap(),
        setup.env.block.time.nanos()
    );

    let msg = MsgUpdateClient {
        client_id: LOCALHOST_CLIENT_ID.to_string(),
        client_message: Any::default(),
    };
    assert!(matches!(
        setup.keeper.update_client(&mut setup.storage, &setup.env, &msg),
        Err(ClientError::UnsupportedOperation { .. })
    ));
}
