//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use cosmwasm_std::{
    testing::{mock_env, MockStorage},
    Env,
};
use ibc_eureka_commitment::MerkleRoot;
use ibc_eureka_host_types::Height;
use ibc_eureka_ics07_tendermint::{
    client,
    test_utils::{self, HeaderBuilder, TestValidators, SECOND},
    ClientState, ConsensusState,
};

pub const CHAIN_ID: &str = "gaia-1";
pub const TRUSTED_HEIGHT: u64 = 10;

/// A client at [`TRUSTED_HEIGHT`] whose consensus state is 50 seconds old.
pub struct Fixture {
    pub storage: MockStorage,
    pub env: Env,
    pub validators: TestValidators,
    pub client_state: ClientState,
    pub trusted_timestamp: u64,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_root(MerkleRoot::new(b"root".to_vec()))
    }

    pub fn with_root(root: MerkleRoot) -> Self {
        let env = mock_env();
        let validators = TestValidators::new(1, &[10, 10, 10]);
        let client_state = test_utils::client_state(CHAIN_ID, TRUSTED_HEIGHT);
        let trusted_timestamp = now(&env) - 50 * SECOND;
        let consensus_state = test_utils::consensus_state(trusted_timestamp, root, &validators);

        let mut storage = MockStorage::new();
        client::initialize(&mut storage, &env, &client_state, &consensus_state).unwrap();

        Self {
            storage,
            env,
            validators,
            client_state,
            trusted_timestamp,
        }
    }

    /// A header at `height`, `seconds_after_trusted` seconds after the trusted state,
    /// verified from the trusted height.
    pub fn header(&self, height: u64, seconds_after_trusted: u64) -> HeaderBuilder {
        HeaderBuilder::new(
            CHAIN_ID,
            height,
            self.trusted_timestamp + seconds_after_trusted * SECOND,
            &self.validators,
        )
        .trusted(trusted_height(), self.validators.validator_set())
    }

    pub fn consensus_state(&self, height: u64) -> ConsensusState {
        ibc_eureka_client_store::get_consensus_state(&self.storage, Height::new(1, height))
            .unwrap()
    }
}

pub fn now(env: &Env) -> u64 {
    env.block.time.nanos()
}

pub const fn trusted_height() -> Height {
    Height::new(1, TRUSTED_HEIGHT)
}
