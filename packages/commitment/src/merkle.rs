//! This module defines [`MerkleRoot`], [`MerklePrefix`] and [`MerklePath`].

use std::fmt;

use ibc_eureka_utils::ensure;
use serde::{Deserialize, Serialize};

use crate::error::CommitmentError;

/// The root hash of a commitment tree.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug, Default)]
pub struct MerkleRoot {
    /// Root hash bytes
    #[serde(with = "ibc_eureka_utils::serde::hex_bytes")]
    pub hash: Vec<u8>,
}

impl MerkleRoot {
    /// Creates a new root from raw hash bytes.
    #[must_use]
    pub fn new(hash: impl Into<Vec<u8>>) -> Self {
        Self { hash: hash.into() }
    }

    /// Returns true if the root carries no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hash.is_empty()
    }
}

impl AsRef<[u8]> for MerkleRoot {
    fn as_ref(&self) -> &[u8] {
        &self.hash
    }
}

/// The store prefix under which a counterparty commits its IBC state.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug, Default)]
pub struct MerklePrefix {
    /// Prefix bytes (e.g. `b"ibc"`)
    #[serde(with = "ibc_eureka_utils::serde::hex_bytes")]
    pub key_prefix: Vec<u8>,
}

impl MerklePrefix {
    /// Creates a new prefix.
    #[must_use]
    pub fn new(key_prefix: impl Into<Vec<u8>>) -> Self {
        Self {
            key_prefix: key_prefix.into(),
        }
    }

    /// Returns true if the prefix carries no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.key_prefix.is_empty()
    }
}

/// An ordered list of raw key segments, one per commitment tree, from the outermost
/// tree to the innermost.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug, Default)]
pub struct MerklePath {
    /// Key segments, root to leaf
    #[serde(with = "ibc_eureka_utils::serde::hex_bytes_list")]
    pub key_path: Vec<Vec<u8>>,
}

impl MerklePath {
    /// Creates a path from its segments.
    #[must_use]
    pub fn new<K: Into<Vec<u8>>>(segments: impl IntoIterator<Item = K>) -> Self {
        Self {
            key_path: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.key_path.len()
    }

    /// Returns true if the path has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.key_path.is_empty()
    }

    /// Returns the segment at `index`.
    /// # Errors
    /// Returns an error if the index is out of range.
    pub fn key(&self, index: usize) -> Result<&[u8], CommitmentError> {
        self.key_path
            .get(index)
            .map(Vec::as_slice)
            .ok_or(CommitmentError::KeyNotFound(index))
    }

    /// Returns the innermost segment, if any.
    #[must_use]
    pub fn last_key(&self) -> Option<&[u8]> {
        self.key_path.last().map(Vec::as_slice)
    }
}

impl fmt::Display for MerklePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.key_path.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", String::from_utf8_lossy(segment))?;
        }
        Ok(())
    }
}

/// Prepends the store prefix to a path, producing the full path a proof commits to.
/// # Errors
/// Returns an error if the prefix is empty.
pub fn apply_prefix(
    prefix: &MerklePrefix,
    path: impl IntoIterator<Item = impl Into<Vec<u8>>>,
) -> Result<MerklePath, CommitmentError> {
    ensure!(!prefix.is_empty(), CommitmentError::EmptyPrefix);

    let mut key_path = vec![prefix.key_prefix.clone()];
    key_path.extend(path.into_iter().map(Into::into));
    Ok(MerklePath { key_path })
}
