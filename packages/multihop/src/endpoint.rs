//! Generation of multi-hop proofs from read access to every chain on a channel path.

use ibc_eureka_commitment::{MerklePath, MerkleProof, MerkleRoot, ProofSpecs};
use ibc_eureka_host_types::{
    connection::ConnectionEnd,
    path::{client_state_path, connection_path, consensus_state_path},
    Height, TypedState,
};
use ibc_eureka_ics07_tendermint::{ClientState, ConsensusState};
use ibc_eureka_utils::ensure;

use crate::{
    error::MultihopError,
    proof::{MultihopProof, MultihopProofs},
};

/// Read access to one end of a single-hop connection.
///
/// The client and connection of an endpoint are the ones tracking its counterparty.
pub trait Endpoint: Sized {
    /// Chain id of the chain this endpoint lives on
    fn chain_id(&self) -> String;
    /// Client tracking the counterparty
    fn client_id(&self) -> String;
    /// Latest state of the client tracking the counterparty
    /// # Errors
    /// Returns an error if the client state cannot be read.
    fn client_state(&self) -> Result<ClientState, MultihopError>;
    /// Consensus state of the counterparty at `height`
    /// # Errors
    /// Returns an error if no consensus state is stored at the height.
    fn consensus_state(&self, height: Height) -> Result<ConsensusState, MultihopError>;
    /// Connection toward the counterparty
    fn connection_id(&self) -> String;
    /// The connection end toward the counterparty
    /// # Errors
    /// Returns an error if the connection cannot be read.
    fn connection(&self) -> Result<ConnectionEnd, MultihopError>;
    /// Protobuf encoded proof of `key` in this chain's IBC store at `height`
    /// # Errors
    /// Returns an error if the chain cannot prove the key at the height.
    fn query_proof_at_height(&self, key: &str, height: Height) -> Result<Vec<u8>, MultihopError>;
    /// The full path of `path` in this chain's commitment tree
    /// # Errors
    /// Returns an error if the store prefix of the chain is empty.
    fn merkle_path(&self, path: &str) -> Result<MerklePath, MultihopError>;
    /// The other end of the connection
    #[must_use]
    fn counterparty(&self) -> Self;
}

/// A single-hop path between two directly connected chains.
#[derive(Clone, Debug)]
pub struct Path<E> {
    /// End on the chain closer to the source
    pub endpoint_a: E,
    /// End on the chain closer to the destination
    pub endpoint_b: E,
}

/// A channel path of two or more single-hop paths, ordered from source to destination.
#[derive(Clone, Debug)]
pub struct ChanPath<E> {
    paths: Vec<Path<E>>,
}

impl<E: Endpoint> ChanPath<E> {
    /// Creates a channel path.
    /// # Errors
    /// Returns an error if fewer than two single-hop paths are given.
    pub fn new(paths: Vec<Path<E>>) -> Result<Self, MultihopError> {
        ensure!(paths.len() >= 2, MultihopError::PathTooShort(paths.len()));
        Ok(Self { paths })
    }

    /// The chain committing the proven key.
    #[must_use]
    pub fn source(&self) -> &E {
        &self.paths[0].endpoint_a
    }

    /// The chain verifying the proofs.
    #[must_use]
    pub fn dest(&self) -> &E {
        &self.paths[self.paths.len() - 1].endpoint_b
    }

    /// The connection hops the proofs walk: the source's connection, then the connection
    /// each intermediate chain keeps toward its predecessor.
    #[must_use]
    pub fn connection_hops(&self) -> Vec<String> {
        let intermediate = &self.paths[..self.paths.len() - 1];
        std::iter::once(self.source().connection_id())
            .chain(intermediate.iter().map(|path| path.endpoint_b.connection_id()))
            .collect()
    }

    /// Proves that `value` is stored under `key` on the source chain.
    /// # Errors
    /// Returns an error if any state cannot be read or any generated proof fails its own
    /// verification.
    pub fn generate_membership_proof(
        &self,
        key: &str,
        value: &[u8],
    ) -> Result<MultihopProofs, MultihopError> {
        ensure!(
            !key.is_empty() && !value.is_empty(),
            MultihopError::EmptyKeyOrValue
        );
        self.generate(key, Some(value))
    }

    /// Proves that nothing is stored under `key` on the source chain.
    /// # Errors
    /// Returns an error if any state cannot be read or any generated proof fails its own
    /// verification.
    pub fn generate_non_membership_proof(&self, key: &str) -> Result<MultihopProofs, MultihopError> {
        ensure!(!key.is_empty(), MultihopError::EmptyKeyOrValue);
        self.generate(key, None)
    }

    fn generate(&self, key: &str, value: Option<&[u8]>) -> Result<MultihopProofs, MultihopError> {
        tracing::debug!(
            source = %self.source().chain_id(),
            dest = %self.dest().chain_id(),
            key,
            "generating multi-hop proof"
        );
        let key_proof = key_proof(&self.paths[0].endpoint_b, key, value)?;

        let mut consensus_proofs = Vec::with_capacity(self.paths.len() - 1);
        let mut connection_proofs = Vec::with_capacity(self.paths.len() - 1);
        let mut client_proofs = Vec::with_capacity(self.paths.len() - 1);
        for (hop, pair) in self.paths.windows(2).enumerate() {
            // chain b holds the state of its predecessor, proven under the root chain c
            // trusts for chain b
            let (chain_b, chain_c) = (&pair[0].endpoint_b, &pair[1].endpoint_b);
            let client_ab = chain_b.client_state()?;
            let height_ab = client_ab.latest_height;
            let client_bc = chain_c.client_state()?;
            let height_bc = client_bc.latest_height;
            let root_bc = chain_c.consensus_state(height_bc)?.root;

            consensus_proofs.push(prove(
                chain_b,
                &consensus_state_path(&chain_b.client_id(), height_ab),
                chain_b.consensus_state(height_ab)?.encode_to_vec()?,
                height_bc,
                &root_bc,
                &client_bc.proof_specs,
            )?);
            connection_proofs.push(prove(
                chain_b,
                &connection_path(&chain_b.connection_id()),
                chain_b.connection()?.encode_to_vec()?,
                height_bc,
                &root_bc,
                &client_bc.proof_specs,
            )?);
            client_proofs.push(prove(
                chain_b,
                &client_state_path(&chain_b.client_id()),
                client_ab.encode_to_vec()?,
                height_bc,
                &root_bc,
                &client_bc.proof_specs,
            )?);

            tracing::debug!(
                hop,
                chain_id = %chain_b.chain_id(),
                counterparty = %chain_b.counterparty().chain_id(),
                height = %height_bc,
                verifier = %chain_c.chain_id(),
                "generated consensus state, connection and client state proofs"
            );
        }

        Ok(MultihopProofs {
            key_proof,
            consensus_proofs,
            connection_proofs,
            client_proofs,
        })
    }
}

/// Proves `key` on the counterparty of `chain_b` under the consensus state `chain_b` holds
/// at the latest height of its client.
fn key_proof<E: Endpoint>(
    chain_b: &E,
    key: &str,
    value: Option<&[u8]>,
) -> Result<MultihopProof, MultihopError> {
    let chain_a = chain_b.counterparty();
    let client_state = chain_b.client_state()?;
    let height_ab = client_state.latest_height;
    let root_ab = chain_b.consensus_state(height_ab)?.root;

    let prefixed_key = chain_a.merkle_path(key)?;
    let proof = chain_a.query_proof_at_height(key, height_ab)?;
    let merkle_proof = MerkleProof::decode(&proof)?;
    match value {
        Some(value) => {
            merkle_proof.verify_membership(&client_state.proof_specs, &root_ab, &prefixed_key, value)
        }
        None => merkle_proof.verify_non_membership(&client_state.proof_specs, &root_ab, &prefixed_key),
    }
    .map_err(MultihopError::InvalidKeyProof)?;

    Ok(MultihopProof {
        proof,
        value: value.map(<[u8]>::to_vec).unwrap_or_default(),
        prefixed_key,
    })
}

/// Proves `value` under `path` on `chain` at `height` and checks the proof against `root`.
fn prove<E: Endpoint>(
    chain: &E,
    path: &str,
    value: Vec<u8>,
    height: Height,
    root: &MerkleRoot,
    specs: &ProofSpecs,
) -> Result<MultihopProof, MultihopError> {
    let prefixed_key = chain.merkle_path(path)?;
    let proof = chain.query_proof_at_height(path, height)?;
    MerkleProof::decode(&proof)?.verify_membership(specs, root, &prefixed_key, &value)?;

    Ok(MultihopProof {
        proof,
        value,
        prefixed_key,
    })
}
