//! This module defines [`ChannelEnd`].

use serde::{Deserialize, Serialize};

use crate::codec::TypedState;

/// Channel handshake state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    /// Default state
    Uninitialized,
    /// A channel end has just started the opening handshake
    Init,
    /// A channel end has acknowledged the handshake step on the counterparty chain
    TryOpen,
    /// The channel is open and can send and receive packets
    Open,
    /// The channel is closed
    Closed,
}

/// Packet delivery ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    /// Packets may be delivered in any order
    Unordered,
    /// Packets are delivered in sending order
    Ordered,
}

/// The counterparty side of a channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterparty {
    /// Port on the counterparty
    pub port_id: String,
    /// Channel on the counterparty, unknown during the first handshake step
    pub channel_id: Option<String>,
}

/// A channel end as committed in the host store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEnd {
    /// Handshake state
    pub state: State,
    /// Packet ordering
    pub ordering: Order,
    /// Counterparty side
    pub counterparty: Counterparty,
    /// Connections the channel runs over, from this chain outward
    pub connection_hops: Vec<String>,
    /// Application version
    pub version: String,
}

impl TypedState for ChannelEnd {
    const TYPE_URL: &'static str = "/ibc.core.channel.v1.Channel";
}

#[cfg(test)]
mod tests {
    use ibc_proto::google::protobuf::Any;

    use super::*;
    use crate::error::CodecError;

    #[test]
    fn type_url_mismatch_is_rejected() {
        let any = Any {
            type_url: "/ibc.core.connection.v1.ConnectionEnd".to_string(),
            value: b"{}".to_vec(),
        };

        assert!(matches!(
            ChannelEnd::from_any(&any),
            Err(CodecError::TypeUrlMismatch { expected: "/ibc.core.channel.v1.Channel", .. })
        ));
    }
}
