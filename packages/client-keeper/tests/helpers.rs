//! Shared fixtures for the keeper integration tests.
#![allow(dead_code)]

use cosmwasm_std::{
    testing::{mock_env, MockStorage},
    Env,
};
use ibc_eureka_client_keeper::{
    msg::{MsgCreateClient, MsgUpdateClient},
    ClientRouter, Keeper,
};
use ibc_eureka_commitment::{MerkleRoot, ProofSpecs};
use ibc_eureka_host_types::{Height, TypedState};
use ibc_eureka_ics07_tendermint::{
    test_utils::{self, HeaderBuilder, TestValidators, SECOND},
    ClientMessage, ClientState, Header, Misbehaviour,
};

pub const CHAIN_ID: &str = "gaia-1";
pub const TRUSTED_HEIGHT: u64 = 10;

/// A keeper with the default modules over an empty store.
pub struct Setup {
    pub storage: MockStorage,
    pub env: Env,
    pub keeper: Keeper,
    pub validators: TestValidators,
}

impl Setup {
    pub fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        Self {
            storage: MockStorage::new(),
            env: mock_env(),
            keeper: Keeper::new(ClientRouter::with_defaults(ProofSpecs::default())),
            validators: TestValidators::new(1, &[10, 10, 10]),
        }
    }

    /// Host time minus `seconds`.
    pub fn seconds_ago(&self, seconds: u64) -> u64 {
        self.env.block.time.nanos() - seconds * SECOND
    }

    /// Creates a client of `chain_id` at `height` whose consensus state is 50 seconds old.
    pub fn create_client_at(&mut self, chain_id: &str, height: u64, root: MerkleRoot) -> String {
        let client_state = test_utils::client_state(chain_id, height);
        self.create_client_from(&client_state, root, 50)
    }

    /// Creates a [`CHAIN_ID`] client at [`TRUSTED_HEIGHT`] whose consensus state commits to
    /// `root`.
    pub fn create_client(&mut self, root: MerkleRoot) -> String {
        self.create_client_at(CHAIN_ID, TRUSTED_HEIGHT, root)
    }

    pub fn create_client_from(
        &mut self,
        client_state: &ClientState,
        root: MerkleRoot,
        age_seconds: u64,
    ) -> String {
        let consensus_state =
            test_utils::consensus_state(self.seconds_ago(age_seconds), root, &self.validators);
        let msg = MsgCreateClient {
            client_state: client_state.to_any().unwrap(),
            consensus_state: consensus_state.to_any().unwrap(),
        };
        self.keeper
            .create_client(&mut self.storage, &self.env, &msg)
            .unwrap()
    }

    /// A [`CHAIN_ID`] header at `height`, verified from [`TRUSTED_HEIGHT`], 40 seconds old.
    pub fn header(&self, height: u64) -> HeaderBuilder {
        HeaderBuilder::new(CHAIN_ID, height, self.seconds_ago(40), &self.validators)
            .trusted(trusted_height(), self.validators.validator_set())
    }

    pub fn update_client(
        &mut self,
        client_id: &str,
        message: ClientMessage,
    ) -> Result<Vec<Height>, ibc_eureka_client_keeper::ClientError> {
        let msg = MsgUpdateClient {
            client_id: client_id.to_string(),
            client_message: message.to_any().unwrap(),
        };
        self.keeper.update_client(&mut self.storage, &self.env, &msg)
    }

    /// Freezes `client_id` with a fork at height 12.
    pub fn freeze(&mut self, client_id: &str) {
        let header1 = self.header(12).app_hash(b"a".to_vec()).build();
        let header2 = self.header(12).app_hash(b"b".to_vec()).build();
        let heights = self
            .update_client(client_id, misbehaviour(client_id, header1, header2))
            .unwrap();
        assert!(heights.is_empty());
    }
}

pub fn misbehaviour(client_id: &str, header1: Header, header2: Header) -> ClientMessage {
    Misbehaviour {
        client_id: client_id.to_string(),
        header1,
        header2,
    }
    .into()
}

pub const fn trusted_height() -> Height {
    Height::new(1, TRUSTED_HEIGHT)
}
