//! This module defines [`HostError`] and [`CodecError`].

/// Errors returned while parsing or validating host identifiers and heights.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub enum HostError {
    /// The height string is not of the form `{revision}-{height}`
    #[error("invalid height: {0}")]
    InvalidHeight(String),

    /// The identifier has an invalid length
    #[error("identifier {id} has invalid length {len}, must be between {min} and {max}")]
    InvalidIdentifierLength {
        /// The offending identifier
        id: String,
        /// Its length
        len: usize,
        /// Minimum length
        min: usize,
        /// Maximum length
        max: usize,
    },

    /// The identifier contains characters outside the allowed set
    #[error("identifier {0} contains invalid characters")]
    InvalidIdentifierCharacters(String),

    /// The client identifier is not of the form `{client_type}-{sequence}`
    #[error("invalid client identifier: {0}")]
    InvalidClientIdentifier(String),

    /// The client type is invalid
    #[error("invalid client type: {0}")]
    InvalidClientType(String),
}

/// Errors returned while encoding or decoding `Any`-wrapped host values.
#[derive(thiserror::Error, Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum CodecError {
    /// The `Any` type URL does not name the expected type
    #[error("type url mismatch: expected {expected}, got {actual}")]
    TypeUrlMismatch {
        /// Expected type URL
        expected: &'static str,
        /// Type URL found in the envelope
        actual: String,
    },

    /// The bytes are not a protobuf `Any`
    #[error("failed to decode Any: {0}")]
    Decode(#[from] prost::DecodeError),

    /// The `Any` value is not the JSON encoding of the expected type
    #[error("failed to (de)serialize json value: {0}")]
    Json(#[from] serde_json::Error),
}
