//! This module defines [`MerkleProof`] and the chained verification algorithm.

use ibc_eureka_utils::ensure;
use ics23::{commitment_proof::Proof, CommitmentProof, HostFunctionsManager, NonExistenceProof};
use prost::Message;

use crate::{
    error::CommitmentError,
    merkle::{MerklePath, MerkleRoot},
    specs::ProofSpecs,
};

/// Protobuf shape of a merkle proof: `repeated CommitmentProof proofs = 1`.
#[derive(Clone, PartialEq, Message)]
struct RawMerkleProof {
    #[prost(message, repeated, tag = "1")]
    proofs: Vec<CommitmentProof>,
}

/// A stack of ICS-23 commitment proofs, innermost tree first.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct MerkleProof {
    /// Per-layer proofs
    pub proofs: Vec<CommitmentProof>,
}

impl MerkleProof {
    /// Decodes a proof from its protobuf bytes.
    /// # Errors
    /// Returns an error if the bytes are not a valid protobuf merkle proof.
    pub fn decode(bytes: &[u8]) -> Result<Self, CommitmentError> {
        let raw = RawMerkleProof::decode(bytes)?;
        Ok(Self { proofs: raw.proofs })
    }

    /// Encodes the proof to its protobuf bytes.
    #[must_use]
    pub fn encode_to_vec(&self) -> Vec<u8> {
        RawMerkleProof {
            proofs: self.proofs.clone(),
        }
        .encode_to_vec()
    }

    /// Verifies that `value` is committed under `path` in the tree rooted at `root`.
    /// # Errors
    /// Returns an error if the arguments are malformed or any layer fails to verify.
    pub fn verify_membership(
        &self,
        specs: &ProofSpecs,
        root: &MerkleRoot,
        path: &MerklePath,
        value: &[u8],
    ) -> Result<(), CommitmentError> {
        self.validate_shape(specs, root, path)?;
        ensure!(!value.is_empty(), CommitmentError::EmptyVerifiedValue);

        verify_chained_membership_proof(&root.hash, specs, &self.proofs, path, value.to_vec(), 0)
    }

    /// Verifies that nothing is committed under `path` in the tree rooted at `root`.
    ///
    /// The innermost layer must be a non-existence proof; every outer layer must prove the
    /// existence of the subroot below it.
    /// # Errors
    /// Returns an error if the arguments are malformed or any layer fails to verify.
    pub fn verify_non_membership(
        &self,
        specs: &ProofSpecs,
        root: &MerkleRoot,
        path: &MerklePath,
    ) -> Result<(), CommitmentError> {
        self.validate_shape(specs, root, path)?;

        let (layer, spec) = (&self.proofs[0], specs_at(specs, 0)?);
        let Some(Proof::Nonexist(non_existence)) = &layer.proof else {
            return Err(CommitmentError::UnexpectedProofType {
                index: 0,
                expected: "non-existence",
            });
        };

        let subroot = calculate_non_existence_root(non_existence)?;
        let key = path.key(path.len() - 1)?;
        ensure!(
            ics23::verify_non_membership::<HostFunctionsManager>(layer, spec, &subroot, key),
            CommitmentError::NonMembershipVerificationFailed {
                key: key.to_vec(),
                subroot,
            }
        );

        verify_chained_membership_proof(&root.hash, specs, &self.proofs, path, subroot, 1)
    }

    fn validate_shape(
        &self,
        specs: &ProofSpecs,
        root: &MerkleRoot,
        path: &MerklePath,
    ) -> Result<(), CommitmentError> {
        ensure!(!self.proofs.is_empty(), CommitmentError::EmptyMerkleProof);
        ensure!(!root.is_empty(), CommitmentError::EmptyMerkleRoot);
        ensure!(
            specs.len() == self.proofs.len(),
            CommitmentError::NumberOfSpecsMismatch {
                specs: specs.len(),
                proofs: self.proofs.len(),
            }
        );
        ensure!(
            path.len() == self.proofs.len(),
            CommitmentError::NumberOfKeysMismatch {
                keys: path.len(),
                proofs: self.proofs.len(),
            }
        );
        specs.validate()
    }
}

/// Walks the proofs from `start_index` upward. Each layer proves `value` under its key and
/// its computed root becomes the value of the next layer; the final root must equal `root`.
fn verify_chained_membership_proof(
    root: &[u8],
    specs: &ProofSpecs,
    proofs: &[CommitmentProof],
    keys: &MerklePath,
    mut value: Vec<u8>,
    start_index: usize,
) -> Result<(), CommitmentError> {
    for (index, layer) in proofs.iter().enumerate().skip(start_index) {
        let Some(Proof::Exist(existence)) = &layer.proof else {
            return Err(CommitmentError::UnexpectedProofType {
                index,
                expected: "existence",
            });
        };

        let subroot = ics23::calculate_existence_root::<HostFunctionsManager>(existence)
            .map_err(|e| CommitmentError::CalculateRoot {
                index,
                reason: e.to_string(),
            })?;

        let key = keys.key(keys.len() - 1 - index)?;
        ensure!(
            ics23::verify_membership::<HostFunctionsManager>(
                layer,
                specs_at(specs, index)?,
                &subroot,
                key,
                &value,
            ),
            CommitmentError::MembershipVerificationFailed {
                index,
                value,
                subroot,
            }
        );

        value = subroot;
    }

    ensure!(
        root == value.as_slice(),
        CommitmentError::RootMismatch {
            expected: root.to_vec(),
            actual: value,
        }
    );
    Ok(())
}

/// Computes the root a non-existence proof commits to, from its left neighbour if present
/// and its right neighbour otherwise.
/// # Errors
/// Returns an error if the proof has no neighbours or the root cannot be computed.
pub fn calculate_non_existence_root(
    proof: &NonExistenceProof,
) -> Result<Vec<u8>, CommitmentError> {
    let neighbour = proof
        .left
        .as_ref()
        .or(proof.right.as_ref())
        .ok_or(CommitmentError::CalculateRoot {
            index: 0,
            reason: "non-existence proof has neither left nor right neighbour".to_string(),
        })?;

    ics23::calculate_existence_root::<HostFunctionsManager>(neighbour).map_err(|e| {
        CommitmentError::CalculateRoot {
            index: 0,
            reason: e.to_string(),
        }
    })
}

fn specs_at(specs: &ProofSpecs, index: usize) -> Result<&ics23::ProofSpec, CommitmentError> {
    specs
        .get(index)
        .ok_or(CommitmentError::IncompleteProofSpec(index))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{
        merkle::{apply_prefix, MerklePrefix},
        test_utils::MultiStore,
    };

    fn fixture() -> MultiStore {
        let mut store = MultiStore::new("ibc");
        store.set("clients/07-tendermint-0/clientState", b"client state");
        store.set("connections/connection-0", b"connection end");
        store.set("commitments/ports/transfer/channels/channel-0/sequences/1", b"commitment");
        store.set_store("bank", "balances/cosmos1", b"100stake");
        store
    }

    fn prefixed(key: &str) -> MerklePath {
        apply_prefix(&MerklePrefix::new("ibc"), [key]).unwrap()
    }

    #[rstest]
    #[case("clients/07-tendermint-0/clientState", b"client state".as_slice())]
    #[case("connections/connection-0", b"connection end".as_slice())]
    #[case(
        "commitments/ports/transfer/channels/channel-0/sequences/1",
        b"commitment".as_slice()
    )]
    fn membership_of_stored_keys(#[case] key: &str, #[case] value: &[u8]) {
        let store = fixture();
        let proof = store.membership_proof(key).unwrap();

        proof
            .verify_membership(&MultiStore::specs(), &store.root(), &prefixed(key), value)
            .unwrap();
    }

    #[test]
    fn membership_with_a_different_value_fails() {
        let store = fixture();
        let key = "connections/connection-0";
        let proof = store.membership_proof(key).unwrap();

        let err = proof
            .verify_membership(&MultiStore::specs(), &store.root(), &prefixed(key), b"forged")
            .unwrap_err();
        assert!(matches!(
            err,
            CommitmentError::MembershipVerificationFailed { index: 0, .. }
        ));
    }

    #[test]
    fn membership_against_a_different_root_fails() {
        let store = fixture();
        let key = "connections/connection-0";
        let proof = store.membership_proof(key).unwrap();

        let err = proof
            .verify_membership(
                &MultiStore::specs(),
                &MerkleRoot::new(vec![7; 32]),
                &prefixed(key),
                b"connection end",
            )
            .unwrap_err();
        assert!(matches!(err, CommitmentError::RootMismatch { .. }));
    }

    #[test]
    fn non_membership_of_absent_key() {
        let store = fixture();
        let key = "receipts/ports/transfer/channels/channel-0/sequences/1";
        let proof = store.non_membership_proof(key).unwrap();

        proof
            .verify_non_membership(&MultiStore::specs(), &store.root(), &prefixed(key))
            .unwrap();
    }

    #[test]
    fn membership_and_non_membership_are_exclusive() {
        let mut store = fixture();
        let key = "receipts/ports/transfer/channels/channel-0/sequences/1";
        let absence = store.non_membership_proof(key).unwrap();
        let root_before = store.root();

        store.set(key, [1u8]);
        let presence = store.membership_proof(key).unwrap();
        let root_after = store.root();

        // the absence proof no longer holds against the new root
        assert!(absence
            .verify_non_membership(&MultiStore::specs(), &root_after, &prefixed(key))
            .is_err());
        // an existence proof cannot be passed off as an absence proof
        assert!(presence
            .verify_non_membership(&MultiStore::specs(), &root_after, &prefixed(key))
            .is_err());
        presence
            .verify_membership(&MultiStore::specs(), &root_after, &prefixed(key), &[1])
            .unwrap();
        assert_ne!(root_before, root_after);
    }

    #[test]
    fn non_membership_of_a_present_key_fails() {
        let store = fixture();
        let key = "connections/connection-0";
        let proof = store.membership_proof(key).unwrap();

        let err = proof
            .verify_non_membership(&MultiStore::specs(), &store.root(), &prefixed(key))
            .unwrap_err();
        assert_eq!(
            err,
            CommitmentError::UnexpectedProofType {
                index: 0,
                expected: "non-existence",
            }
        );
    }

    #[test]
    fn shape_errors() {
        let store = fixture();
        let key = "connections/connection-0";
        let proof = store.membership_proof(key).unwrap();
        let specs = MultiStore::specs();
        let root = store.root();

        assert_eq!(
            MerkleProof::default()
                .verify_membership(&specs, &root, &prefixed(key), b"v")
                .unwrap_err(),
            CommitmentError::EmptyMerkleProof
        );
        assert_eq!(
            proof
                .verify_membership(&specs, &MerkleRoot::default(), &prefixed(key), b"v")
                .unwrap_err(),
            CommitmentError::EmptyMerkleRoot
        );
        assert_eq!(
            proof
                .verify_membership(&specs, &root, &MerklePath::new([key]), b"v")
                .unwrap_err(),
            CommitmentError::NumberOfKeysMismatch { keys: 1, proofs: 2 }
        );
        assert_eq!(
            proof
                .verify_membership(
                    &ProofSpecs::from(vec![ics23::tendermint_spec()]),
                    &root,
                    &prefixed(key),
                    b"v"
                )
                .unwrap_err(),
            CommitmentError::NumberOfSpecsMismatch { specs: 1, proofs: 2 }
        );
        assert_eq!(
            proof
                .verify_membership(&specs, &root, &prefixed(key), b"")
                .unwrap_err(),
            CommitmentError::EmptyVerifiedValue
        );
    }

    #[test]
    fn protobuf_encoding_round_trips() {
        let store = fixture();
        let proof = store.membership_proof("connections/connection-0").unwrap();

        let decoded = MerkleProof::decode(&proof.encode_to_vec()).unwrap();
        assert_eq!(decoded, proof);
        assert!(matches!(
            MerkleProof::decode(&[0xff, 0xff]),
            Err(CommitmentError::DecodeMerkleProof(_))
        ));
    }
}
