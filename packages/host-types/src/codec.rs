//! This module defines [`TypedState`], the `Any` envelope codec.
//!
//! Values are stored as a protobuf `Any` whose `value` is the JSON encoding of the concrete
//! type and whose type URL discriminates the type.

use ibc_eureka_utils::ensure;
use ibc_proto::google::protobuf::Any;
use prost::Message;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::CodecError;

/// A value that travels inside an `Any` envelope.
pub trait TypedState: Serialize + DeserializeOwned {
    /// The type URL of the envelope.
    const TYPE_URL: &'static str;

    /// Wraps the value in an `Any`.
    /// # Errors
    /// Returns an error if the value cannot be serialized.
    fn to_any(&self) -> Result<Any, CodecError> {
        Ok(Any {
            type_url: Self::TYPE_URL.to_string(),
            value: serde_json::to_vec(self)?,
        })
    }

    /// Unwraps a value from an `Any`.
    /// # Errors
    /// Returns an error if the type URL does not match or the value does not decode.
    fn from_any(any: &Any) -> Result<Self, CodecError> {
        ensure!(
            any.type_url == Self::TYPE_URL,
            CodecError::TypeUrlMismatch {
                expected: Self::TYPE_URL,
                actual: any.type_url.clone(),
            }
        );
        Ok(serde_json::from_slice(&any.value)?)
    }

    /// Encodes the value as protobuf `Any` bytes.
    /// # Errors
    /// Returns an error if the value cannot be serialized.
    fn encode_to_vec(&self) -> Result<Vec<u8>, CodecError> {
        Ok(self.to_any()?.encode_to_vec())
    }

    /// Decodes a value from protobuf `Any` bytes.
    /// # Errors
    /// Returns an error if the bytes are not an `Any` of this type.
    fn decode_from_slice(bytes: &[u8]) -> Result<Self, CodecError> {
        Self::from_any(&Any::decode(bytes)?)
    }
}
