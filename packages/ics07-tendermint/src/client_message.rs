//! This module defines [`ClientMessage`].

use ibc_eureka_host_types::{CodecError, TypedState};
use ibc_proto::google::protobuf::Any;

use crate::{header::Header, misbehaviour::Misbehaviour};

/// A message submitted to update the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientMessage {
    /// A new header
    Header(Box<Header>),
    /// Evidence of misbehaviour
    Misbehaviour(Box<Misbehaviour>),
}

impl ClientMessage {
    /// Decodes a message by its type URL.
    /// # Errors
    /// Returns an error if the type URL is unknown or the value does not decode.
    pub fn from_any(any: &Any) -> Result<Self, CodecError> {
        if any.type_url == Misbehaviour::TYPE_URL {
            Ok(Self::Misbehaviour(Box::new(Misbehaviour::from_any(any)?)))
        } else {
            Header::from_any(any).map(|header| Self::Header(Box::new(header)))
        }
    }

    /// Encodes the message into an `Any`.
    /// # Errors
    /// Returns an error if the message cannot be serialized.
    pub fn to_any(&self) -> Result<Any, CodecError> {
        match self {
            Self::Header(header) => header.to_any(),
            Self::Misbehaviour(misbehaviour) => misbehaviour.to_any(),
        }
    }
}

impl From<Header> for ClientMessage {
    fn from(header: Header) -> Self {
        Self::Header(Box::new(header))
    }
}

impl From<Misbehaviour> for ClientMessage {
    fn from(misbehaviour: Misbehaviour) -> Self {
        Self::Misbehaviour(Box::new(misbehaviour))
    }
}
