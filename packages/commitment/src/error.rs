//! This module defines [`CommitmentError`].

/// Errors returned while building Merkle paths or verifying Merkle proofs.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub enum CommitmentError {
    /// The store prefix is empty
    #[error("prefix cannot be empty")]
    EmptyPrefix,

    /// The proof has no layers
    #[error("proof cannot be empty")]
    EmptyMerkleProof,

    /// The trusted root is empty
    #[error("root cannot be empty")]
    EmptyMerkleRoot,

    /// Membership was requested for an empty value
    #[error("empty value in membership proof")]
    EmptyVerifiedValue,

    /// The number of proof specs does not match the number of proof layers
    #[error("length of specs ({specs}) not equal to length of proof ({proofs})")]
    NumberOfSpecsMismatch {
        /// Number of specs
        specs: usize,
        /// Number of proof layers
        proofs: usize,
    },

    /// The number of path segments does not match the number of proof layers
    #[error("length of path ({keys}) not equal to length of proof ({proofs})")]
    NumberOfKeysMismatch {
        /// Number of path segments
        keys: usize,
        /// Number of proof layers
        proofs: usize,
    },

    /// A proof spec is missing its leaf or inner spec
    #[error("proof spec at position {0} is incomplete")]
    IncompleteProofSpec(usize),

    /// The requested key index is outside the path
    #[error("key not found at index {0} of merkle path")]
    KeyNotFound(usize),

    /// A proof layer carries the wrong kind of proof
    #[error("expected {expected} proof at index {index}")]
    UnexpectedProofType {
        /// Index of the offending layer
        index: usize,
        /// The expected proof kind
        expected: &'static str,
    },

    /// The root of a proof layer could not be calculated
    #[error("failed to calculate root of proof at index {index}: {reason}")]
    CalculateRoot {
        /// Index of the offending layer
        index: usize,
        /// Reason reported by ics23
        reason: String,
    },

    /// A chained existence proof does not commit to the expected value
    #[error(
        "chained membership proof failed to verify value ({value}) in subroot ({subroot}) at index {index}",
        value = hex::encode(.value),
        subroot = hex::encode(.subroot)
    )]
    MembershipVerificationFailed {
        /// Index of the offending layer
        index: usize,
        /// Value the layer should commit to
        value: Vec<u8>,
        /// Root computed for the layer
        subroot: Vec<u8>,
    },

    /// The non-existence proof does not prove absence of the key
    #[error(
        "failed to verify non-membership of key ({key}) in subroot ({subroot})",
        key = hex::encode(.key),
        subroot = hex::encode(.subroot)
    )]
    NonMembershipVerificationFailed {
        /// Key whose absence was checked
        key: Vec<u8>,
        /// Root computed for the innermost layer
        subroot: Vec<u8>,
    },

    /// The chained proof does not commit to the trusted root
    #[error(
        "proof did not commit to expected root ({expected}), got ({actual})",
        expected = hex::encode(.expected),
        actual = hex::encode(.actual)
    )]
    RootMismatch {
        /// Trusted root
        expected: Vec<u8>,
        /// Root computed from the proof
        actual: Vec<u8>,
    },

    /// The proof bytes are not a valid protobuf `MerkleProof`
    #[error("failed to decode merkle proof: {0}")]
    DecodeMerkleProof(#[from] prost::DecodeError),
}

impl CommitmentError {
    /// Returns true for every failure of the proof itself, as opposed to a malformed prefix.
    #[must_use]
    pub const fn is_invalid_proof(&self) -> bool {
        !matches!(self, Self::EmptyPrefix)
    }
}
