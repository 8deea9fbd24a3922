//! A line of mock chains for multi-hop tests.
//!
//! Chain `i` of a [`MockNetwork`] runs a client `07-tendermint-{j}` and a connection
//! `connection-{j}` for each neighbour `j`. [`MockNetwork::link`] commits, from the source
//! on, each chain's client, consensus state and connection for its predecessor, so every
//! chain's root covers the state of the chains before it.

use ibc_eureka_commitment::{apply_prefix, test_utils::MultiStore, MerklePath, MerklePrefix};
use ibc_eureka_host_types::{
    connection::{ConnectionEnd, Counterparty, State, Version},
    identifiers::{format_client_identifier, format_connection_identifier, parse_chain_id_revision},
    path::{client_state_path, connection_path, consensus_state_path},
    Height, TypedState,
};
use ibc_eureka_ics07_tendermint::{
    test_utils::{self as tendermint, SECOND},
    ClientState, ConsensusState, TENDERMINT_CLIENT_TYPE,
};
use ibc_eureka_utils::ensure;

use crate::{
    endpoint::{ChanPath, Endpoint, Path},
    error::MultihopError,
};

/// Name of the IBC store of every mock chain.
pub const IBC_STORE: &str = "ibc";

/// One mock chain: a multistore frozen at a single height.
#[derive(Clone, Debug)]
pub struct MockChain {
    /// Chain id
    pub chain_id: String,
    /// The only height the chain can prove at
    pub height: Height,
    /// Committed state
    pub store: MultiStore,
}

/// Chains connected in a line, the first being the source and the last the destination.
#[derive(Clone, Debug)]
pub struct MockNetwork {
    chains: Vec<MockChain>,
}

impl MockNetwork {
    /// Creates unlinked chains. Chain `i` sits at revision height `100 + i`.
    #[must_use]
    pub fn new(chain_ids: &[&str]) -> Self {
        let chains = chain_ids
            .iter()
            .zip(100..)
            .map(|(chain_id, height)| MockChain {
                chain_id: (*chain_id).to_string(),
                height: Height::new(parse_chain_id_revision(chain_id), height),
                store: MultiStore::new(IBC_STORE),
            })
            .collect();
        Self { chains }
    }

    /// The chains, source first.
    #[must_use]
    pub fn chains(&self) -> &[MockChain] {
        &self.chains
    }

    /// The store of the source chain.
    ///
    /// # Panics
    /// Panics if the network has no chains.
    pub fn source_mut(&mut self) -> &mut MultiStore {
        &mut self.chains[0].store
    }

    /// The store of chain `chain`. Writes made before [`MockNetwork::link`] are covered by
    /// the roots of the chains after it.
    ///
    /// # Panics
    /// Panics if there is no such chain.
    pub fn store_mut(&mut self, chain: usize) -> &mut MultiStore {
        &mut self.chains[chain].store
    }

    /// Commits the light-client state of each chain for its predecessor and the
    /// connections between neighbours.
    pub fn link(&mut self) {
        for i in 0..self.chains.len() {
            if i > 0 {
                let prev = &self.chains[i - 1];
                let client_state =
                    tendermint::client_state(&prev.chain_id, prev.height.revision_height);
                let consensus_state = ConsensusState {
                    timestamp: (1_700_000_000 + i as u64) * SECOND,
                    root: prev.store.root(),
                    next_validators_hash: vec![1; 32],
                };
                let prev_height = prev.height;
                self.commit(i, &client_state_path(&client_id(i - 1)), &client_state);
                self.commit(
                    i,
                    &consensus_state_path(&client_id(i - 1), prev_height),
                    &consensus_state,
                );
                self.commit(
                    i,
                    &connection_path(&connection_id(i - 1)),
                    &connection_end(i - 1, i),
                );
            }
            if i + 1 < self.chains.len() {
                self.commit(
                    i,
                    &connection_path(&connection_id(i + 1)),
                    &connection_end(i + 1, i),
                );
            }
        }
    }

    /// The channel path from the source to the destination.
    /// # Errors
    /// Returns an error if the network has fewer than three chains.
    pub fn chan_path(&self) -> Result<ChanPath<MockEndpoint<'_>>, MultihopError> {
        let paths = (1..self.chains.len())
            .map(|i| Path {
                endpoint_a: self.endpoint(i - 1, i),
                endpoint_b: self.endpoint(i, i - 1),
            })
            .collect();
        ChanPath::new(paths)
    }

    /// The consensus state the destination stores for the chain before it.
    /// # Errors
    /// Returns an error if the network is not linked.
    pub fn dest_consensus_state(&self) -> Result<ConsensusState, MultihopError> {
        let dest = self.chains.len().saturating_sub(1);
        ensure!(dest > 0, MultihopError::PathTooShort(dest));
        self.endpoint(dest, dest - 1)
            .consensus_state(self.chains[dest - 1].height)
    }

    /// The store prefix of the source chain.
    #[must_use]
    pub fn source_prefix() -> MerklePrefix {
        MerklePrefix::new(IBC_STORE)
    }

    /// The endpoint of chain `chain` toward chain `counterparty`.
    #[must_use]
    pub const fn endpoint(&self, chain: usize, counterparty: usize) -> MockEndpoint<'_> {
        MockEndpoint {
            network: self,
            chain,
            counterparty,
        }
    }

    fn commit<T: TypedState>(&mut self, chain: usize, path: &str, value: &T) {
        let bytes = value.encode_to_vec().expect("mock state encodes");
        self.chains[chain].store.set(path, bytes);
    }
}

/// The client every chain runs for chain `counterparty`.
#[must_use]
pub fn client_id(counterparty: usize) -> String {
    format_client_identifier(TENDERMINT_CLIENT_TYPE, counterparty as u64)
}

/// The connection every chain keeps toward chain `counterparty`.
#[must_use]
pub fn connection_id(counterparty: usize) -> String {
    format_connection_identifier(counterparty as u64)
}

fn connection_end(counterparty: usize, chain: usize) -> ConnectionEnd {
    ConnectionEnd {
        client_id: client_id(counterparty),
        versions: vec![Version::default()],
        state: State::Open,
        counterparty: Counterparty {
            client_id: client_id(chain),
            connection_id: Some(connection_id(chain)),
            prefix: MerklePrefix::new(IBC_STORE),
        },
        delay_period: 0,
    }
}

/// A read handle on one chain of a [`MockNetwork`], facing one of its neighbours.
#[derive(Clone, Copy, Debug)]
pub struct MockEndpoint<'a> {
    network: &'a MockNetwork,
    chain: usize,
    counterparty: usize,
}

impl MockEndpoint<'_> {
    fn chain(&self) -> &MockChain {
        &self.network.chains[self.chain]
    }

    fn read<T: TypedState>(&self, path: &str) -> Result<T, MultihopError> {
        let bytes = self
            .chain()
            .store
            .get(path)
            .ok_or_else(|| MultihopError::StateNotFound {
                chain_id: self.chain_id(),
                path: path.to_string(),
            })?;
        Ok(T::decode_from_slice(bytes)?)
    }
}

impl Endpoint for MockEndpoint<'_> {
    fn chain_id(&self) -> String {
        self.chain().chain_id.clone()
    }

    fn client_id(&self) -> String {
        client_id(self.counterparty)
    }

    fn client_state(&self) -> Result<ClientState, MultihopError> {
        self.read(&client_state_path(&self.client_id()))
    }

    fn consensus_state(&self, height: Height) -> Result<ConsensusState, MultihopError> {
        self.read(&consensus_state_path(&self.client_id(), height))
    }

    fn connection_id(&self) -> String {
        connection_id(self.counterparty)
    }

    fn connection(&self) -> Result<ConnectionEnd, MultihopError> {
        self.read(&connection_path(&self.connection_id()))
    }

    fn query_proof_at_height(&self, key: &str, height: Height) -> Result<Vec<u8>, MultihopError> {
        let chain = self.chain();
        let unavailable = || MultihopError::ProofUnavailable {
            chain_id: chain.chain_id.clone(),
            key: key.to_string(),
            height,
        };
        ensure!(height == chain.height, unavailable());

        let proof = match chain.store.get(key) {
            Some(_) => chain.store.membership_proof(key),
            None => chain.store.non_membership_proof(key),
        };
        proof.map(|proof| proof.encode_to_vec()).ok_or_else(unavailable)
    }

    fn merkle_path(&self, path: &str) -> Result<MerklePath, MultihopError> {
        Ok(apply_prefix(&self.chain().store.prefix(), [path])?)
    }

    fn counterparty(&self) -> Self {
        self.network.endpoint(self.counterparty, self.chain)
    }
}
