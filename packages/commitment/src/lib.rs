//! ICS-23 commitment types and chained Merkle proof verification.
//!
//! A [`MerkleProof`] is a stack of independent single-tree proofs ordered from the
//! innermost (application) tree up to the outermost tree whose root is trusted. The
//! matching [`MerklePath`] lists one key per tree, ordered root-to-leaf.
#![deny(
    clippy::nursery,
    clippy::pedantic,
    warnings,
    missing_docs,
    unused_crate_dependencies
)]

pub mod error;
pub mod merkle;
pub mod proof;
pub mod specs;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::CommitmentError;
pub use merkle::{apply_prefix, MerklePath, MerklePrefix, MerkleRoot};
pub use proof::MerkleProof;
pub use specs::ProofSpecs;
