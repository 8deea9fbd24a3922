//! Deterministic commitment trees for tests.
//!
//! [`SimpleTree`] is a sorted simple-Merkle tree whose proofs verify under
//! [`ics23::tendermint_spec`]. [`MultiStore`] nests named [`SimpleTree`] stores inside a
//! root [`SimpleTree`] and produces two-layer [`MerkleProof`]s.

use std::collections::BTreeMap;

use ics23::{
    commitment_proof::Proof, CommitmentProof, ExistenceProof, HashOp, InnerOp, NonExistenceProof,
};
use sha2::{Digest, Sha256};

use crate::{
    merkle::{MerklePrefix, MerkleRoot},
    proof::MerkleProof,
    specs::ProofSpecs,
};

/// A sorted key-value tree hashed the way Tendermint hashes its simple Merkle trees.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimpleTree {
    leaves: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl SimpleTree {
    /// Inserts or replaces a value.
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.leaves.insert(key.into(), value.into());
    }

    /// Removes a value.
    pub fn remove(&mut self, key: &[u8]) {
        self.leaves.remove(key);
    }

    /// Returns the stored value.
    #[must_use]
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.leaves.get(key).map(Vec::as_slice)
    }

    /// Returns the root hash. The empty tree hashes to `sha256("")`.
    #[must_use]
    pub fn root(&self) -> Vec<u8> {
        let hashes = self.leaf_hashes();
        if hashes.is_empty() {
            return Sha256::digest(b"").to_vec();
        }
        subtree_root(&hashes).to_vec()
    }

    /// Builds the existence proof of a stored key.
    #[must_use]
    pub fn existence_proof(&self, key: &[u8]) -> Option<ExistenceProof> {
        let index = self.leaves.keys().position(|k| k == key)?;
        let (_, path) = root_and_path(&self.leaf_hashes(), index);
        Some(ExistenceProof {
            key: key.to_vec(),
            value: self.leaves[key].clone(),
            leaf: ics23::tendermint_spec().leaf_spec,
            path,
        })
    }

    /// Builds the non-existence proof of an absent key from its stored neighbours.
    #[must_use]
    pub fn non_existence_proof(&self, key: &[u8]) -> Option<NonExistenceProof> {
        if self.leaves.contains_key(key) {
            return None;
        }
        let left = self
            .leaves
            .range::<[u8], _>((std::ops::Bound::Unbounded, std::ops::Bound::Excluded(key)))
            .next_back()
            .and_then(|(k, _)| self.existence_proof(k));
        let right = self
            .leaves
            .range::<[u8], _>((std::ops::Bound::Excluded(key), std::ops::Bound::Unbounded))
            .next()
            .and_then(|(k, _)| self.existence_proof(k));
        Some(NonExistenceProof {
            key: key.to_vec(),
            left,
            right,
        })
    }

    fn leaf_hashes(&self) -> Vec<[u8; 32]> {
        self.leaves.iter().map(|(k, v)| leaf_hash(k, v)).collect()
    }
}

fn leaf_hash(key: &[u8], value: &[u8]) -> [u8; 32] {
    let mut preimage = vec![0];
    prost::encoding::encode_varint(key.len() as u64, &mut preimage);
    preimage.extend_from_slice(key);
    prost::encoding::encode_varint(32, &mut preimage);
    preimage.extend_from_slice(&Sha256::digest(value));
    Sha256::digest(preimage).into()
}

fn inner_hash(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    Sha256::new()
        .chain_update([1u8])
        .chain_update(left)
        .chain_update(right)
        .finalize()
        .into()
}

/// The largest power of two strictly below `n`, for `n >= 2`.
const fn split_point(n: usize) -> usize {
    1 << (usize::BITS - 1 - (n - 1).leading_zeros())
}

fn subtree_root(hashes: &[[u8; 32]]) -> [u8; 32] {
    if hashes.len() == 1 {
        return hashes[0];
    }
    let (left, right) = hashes.split_at(split_point(hashes.len()));
    inner_hash(&subtree_root(left), &subtree_root(right))
}

/// Returns the subtree root together with the inner ops from the leaf at `index` upward.
fn root_and_path(hashes: &[[u8; 32]], index: usize) -> ([u8; 32], Vec<InnerOp>) {
    if hashes.len() == 1 {
        return (hashes[0], vec![]);
    }

    let split = split_point(hashes.len());
    let (left, right) = hashes.split_at(split);
    if index < split {
        let (left_root, mut path) = root_and_path(left, index);
        let right_root = subtree_root(right);
        path.push(InnerOp {
            hash: HashOp::Sha256.into(),
            prefix: vec![1],
            suffix: right_root.to_vec(),
        });
        (inner_hash(&left_root, &right_root), path)
    } else {
        let left_root = subtree_root(left);
        let (right_root, mut path) = root_and_path(right, index - split);
        let mut prefix = vec![1];
        prefix.extend_from_slice(&left_root);
        path.push(InnerOp {
            hash: HashOp::Sha256.into(),
            prefix,
            suffix: vec![],
        });
        (inner_hash(&left_root, &right_root), path)
    }
}

/// Named application stores committed under a root store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiStore {
    ibc_store: String,
    stores: BTreeMap<String, SimpleTree>,
}

impl MultiStore {
    /// Creates a multistore with an empty store named `ibc_store`, which receives the
    /// writes of [`Self::set`].
    #[must_use]
    pub fn new(ibc_store: &str) -> Self {
        let mut stores = BTreeMap::new();
        stores.insert(ibc_store.to_string(), SimpleTree::default());
        Self {
            ibc_store: ibc_store.to_string(),
            stores,
        }
    }

    /// The proof specs matching the proofs of this multistore.
    #[must_use]
    pub fn specs() -> ProofSpecs {
        ProofSpecs::from(vec![ics23::tendermint_spec(), ics23::tendermint_spec()])
    }

    /// The store prefix of the IBC store.
    #[must_use]
    pub fn prefix(&self) -> MerklePrefix {
        MerklePrefix::new(self.ibc_store.as_bytes())
    }

    /// Writes to the IBC store.
    pub fn set(&mut self, key: &str, value: impl AsRef<[u8]>) {
        let store = self.ibc_store.clone();
        self.set_store(&store, key, value);
    }

    /// Writes to the named store, creating it if needed.
    pub fn set_store(&mut self, store: &str, key: &str, value: impl AsRef<[u8]>) {
        self.stores
            .entry(store.to_string())
            .or_default()
            .insert(key.as_bytes(), value.as_ref());
    }

    /// Deletes from the IBC store.
    pub fn remove(&mut self, key: &str) {
        if let Some(tree) = self.stores.get_mut(&self.ibc_store) {
            tree.remove(key.as_bytes());
        }
    }

    /// Reads from the IBC store.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.stores.get(&self.ibc_store)?.get(key.as_bytes())
    }

    /// The root of the root store.
    #[must_use]
    pub fn root(&self) -> MerkleRoot {
        MerkleRoot::new(self.root_tree().root())
    }

    /// Proves the value stored under `key` in the IBC store.
    #[must_use]
    pub fn membership_proof(&self, key: &str) -> Option<MerkleProof> {
        let inner = self.stores.get(&self.ibc_store)?.existence_proof(key.as_bytes())?;
        self.chain(Proof::Exist(inner))
    }

    /// Proves that nothing is stored under `key` in the IBC store.
    #[must_use]
    pub fn non_membership_proof(&self, key: &str) -> Option<MerkleProof> {
        let inner = self
            .stores
            .get(&self.ibc_store)?
            .non_existence_proof(key.as_bytes())?;
        self.chain(Proof::Nonexist(inner))
    }

    fn root_tree(&self) -> SimpleTree {
        let mut root = SimpleTree::default();
        for (name, tree) in &self.stores {
            root.insert(name.as_bytes(), tree.root());
        }
        root
    }

    fn chain(&self, inner: Proof) -> Option<MerkleProof> {
        let outer = self.root_tree().existence_proof(self.ibc_store.as_bytes())?;
        Some(MerkleProof {
            proofs: vec![
                CommitmentProof { proof: Some(inner) },
                CommitmentProof {
                    proof: Some(Proof::Exist(outer)),
                },
            ],
        })
    }
}
