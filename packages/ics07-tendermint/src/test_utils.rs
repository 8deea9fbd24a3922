//! Deterministic validators and signed headers for tests, generated with `tendermint-testgen`.
#![allow(clippy::missing_panics_doc)]

use std::time::Duration;

use ibc_eureka_commitment::{MerkleRoot, ProofSpecs};
use ibc_eureka_host_types::{identifiers::parse_chain_id_revision, Height};
use tendermint::{account, block::CommitSig, validator::Set as ValidatorSet, AppHash};
use tendermint_testgen::{Generator, Header as TestgenHeader, LightBlock, Validator};

use crate::{
    client_state::ClientState, consensus_state::ConsensusState, header::Header,
    trust_threshold::TrustThreshold, verify::tendermint_time,
};

/// One second in nanoseconds.
pub const SECOND: u64 = 1_000_000_000;

/// Validators whose keys are derived from a seed.
#[derive(Clone, Debug)]
pub struct TestValidators {
    validators: Vec<Validator>,
}

impl TestValidators {
    /// Creates one validator per entry of `powers`. Validator `i` is the testgen validator
    /// with id `seed + i`.
    #[must_use]
    pub fn new(seed: u8, powers: &[u64]) -> Self {
        let validators = powers
            .iter()
            .zip(usize::from(seed)..)
            .map(|(&power, id)| Validator::new(&id.to_string()).voting_power(power))
            .collect();
        Self { validators }
    }

    /// The public validator set.
    #[must_use]
    pub fn validator_set(&self) -> ValidatorSet {
        ValidatorSet::without_proposer(
            self.validators
                .iter()
                .map(|v| v.generate().expect("valid test validator"))
                .collect(),
        )
    }

    fn address(&self, index: usize) -> Option<account::Id> {
        self.validators
            .get(index)
            .map(|v| v.generate().expect("valid test validator").address)
    }
}

/// Builds signed update headers.
#[derive(Clone, Debug)]
pub struct HeaderBuilder {
    chain_id: String,
    height: u64,
    time: u64,
    app_hash: Vec<u8>,
    validators: TestValidators,
    next_validators: TestValidators,
    trusted_height: Height,
    trusted_validators: ValidatorSet,
    signers: Option<Vec<usize>>,
}

impl HeaderBuilder {
    /// A header signed by all of `validators`, keeping the same set for the next block and
    /// trusting it at the previous height.
    #[must_use]
    pub fn new(chain_id: &str, height: u64, time: u64, validators: &TestValidators) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            height,
            time,
            app_hash: format!("app-hash-{height}").into_bytes(),
            validators: validators.clone(),
            next_validators: validators.clone(),
            trusted_height: Height::new(
                parse_chain_id_revision(chain_id),
                height.saturating_sub(1),
            ),
            trusted_validators: validators.validator_set(),
            signers: None,
        }
    }

    /// Sets the application state root.
    #[must_use]
    pub fn app_hash(mut self, app_hash: impl Into<Vec<u8>>) -> Self {
        self.app_hash = app_hash.into();
        self
    }

    /// Sets the trusted height and the validator set trusted at it.
    #[must_use]
    pub fn trusted(mut self, height: Height, validators: ValidatorSet) -> Self {
        self.trusted_height = height;
        self.trusted_validators = validators;
        self
    }

    /// Sets the validators committed for the next block.
    #[must_use]
    pub fn next_validators(mut self, validators: &TestValidators) -> Self {
        self.next_validators = validators.clone();
        self
    }

    /// Restricts the signers to the validators at `signers`. The others are recorded as
    /// absent in the commit.
    #[must_use]
    pub fn signers(mut self, signers: Vec<usize>) -> Self {
        self.signers = Some(signers);
        self
    }

    /// Signs and returns the header.
    #[must_use]
    pub fn build(&self) -> Header {
        let header = TestgenHeader::new(&self.validators.validators)
            .next_validators(&self.next_validators.validators)
            .chain_id(&self.chain_id)
            .height(self.height)
            .time(tendermint_time(self.time).expect("valid header time"))
            .app_hash(AppHash::try_from(self.app_hash.clone()).expect("valid app hash"));
        let light_block = LightBlock::new_default_with_header(header)
            .generate()
            .expect("valid light block");

        let mut signed_header = light_block.signed_header;
        if let Some(signers) = &self.signers {
            let signing: Vec<account::Id> = signers
                .iter()
                .filter_map(|&i| self.validators.address(i))
                .collect();
            for sig in &mut signed_header.commit.signatures {
                if let CommitSig::BlockIdFlagCommit {
                    validator_address, ..
                } = sig
                {
                    if !signing.contains(validator_address) {
                        *sig = CommitSig::BlockIdFlagAbsent;
                    }
                }
            }
        }

        Header {
            signed_header,
            validator_set: light_block.validators,
            trusted_height: self.trusted_height,
            trusted_validators: self.trusted_validators.clone(),
        }
    }
}

/// A client state tracking `chain_id`, trusting for 100s with a 200s unbonding period and a
/// 10s clock drift, using the proof specs of the test multistore.
#[must_use]
pub fn client_state(chain_id: &str, latest_height: u64) -> ClientState {
    ClientState {
        chain_id: chain_id.to_string(),
        trust_level: TrustThreshold::ONE_THIRD,
        trusting_period: Duration::from_secs(100),
        unbonding_period: Duration::from_secs(200),
        max_clock_drift: Duration::from_secs(10),
        frozen_height: Height::zero(),
        latest_height: Height::new(parse_chain_id_revision(chain_id), latest_height),
        proof_specs: test_proof_specs(),
        upgrade_path: vec!["upgrade".to_string(), "upgradedIBCState".to_string()],
    }
}

/// Proof specs matching [`ibc_eureka_commitment::test_utils::MultiStore`].
#[must_use]
pub fn test_proof_specs() -> ProofSpecs {
    ibc_eureka_commitment::test_utils::MultiStore::specs()
}

/// A consensus state trusting `validators` for the next block.
#[must_use]
pub fn consensus_state(
    timestamp: u64,
    root: MerkleRoot,
    validators: &TestValidators,
) -> ConsensusState {
    ConsensusState {
        timestamp,
        root,
        next_validators_hash: validators.validator_set().hash().as_bytes().to_vec(),
    }
}
