//! This module defines [`ConnectionEnd`] and its parts.

use ibc_eureka_commitment::MerklePrefix;
use serde::{Deserialize, Serialize};

use crate::codec::TypedState;

/// Connection handshake state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    /// Default state
    Uninitialized,
    /// A connection end has just started the opening handshake
    Init,
    /// A connection end has acknowledged the handshake step on the counterparty chain
    TryOpen,
    /// The handshake is complete
    Open,
}

/// A connection version and the channel orderings it supports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Version identifier
    pub identifier: String,
    /// Supported channel orderings
    pub features: Vec<String>,
}

impl Default for Version {
    fn default() -> Self {
        Self {
            identifier: "1".to_string(),
            features: vec!["ORDER_ORDERED".to_string(), "ORDER_UNORDERED".to_string()],
        }
    }
}

/// The counterparty side of a connection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterparty {
    /// Client tracking this chain on the counterparty
    pub client_id: String,
    /// Connection id on the counterparty, unknown during the first handshake step
    pub connection_id: Option<String>,
    /// Store prefix of the counterparty
    pub prefix: MerklePrefix,
}

/// A connection end as committed in the host store under `connections/{id}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionEnd {
    /// Client tracking the counterparty chain
    pub client_id: String,
    /// Compatible versions
    pub versions: Vec<Version>,
    /// Handshake state
    pub state: State,
    /// Counterparty side
    pub counterparty: Counterparty,
    /// Delay period in nanoseconds
    pub delay_period: u64,
}

impl ConnectionEnd {
    /// Returns true if the handshake is complete.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == State::Open
    }
}

impl TypedState for ConnectionEnd {
    const TYPE_URL: &'static str = "/ibc.core.connection.v1.ConnectionEnd";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_end_round_trips_through_any() {
        let connection = ConnectionEnd {
            client_id: "07-tendermint-0".to_string(),
            versions: vec![Version::default()],
            state: State::Open,
            counterparty: Counterparty {
                client_id: "07-tendermint-3".to_string(),
                connection_id: Some("connection-1".to_string()),
                prefix: MerklePrefix::new("ibc"),
            },
            delay_period: 0,
        };

        let bytes = connection.encode_to_vec().unwrap();
        assert_eq!(ConnectionEnd::decode_from_slice(&bytes).unwrap(), connection);
        assert!(connection.is_open());
    }
}
