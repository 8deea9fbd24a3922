//! ICS-24 host store paths.

use crate::height::Height;

/// Root of the per-client stores.
pub const KEY_CLIENT_STORE_PREFIX: &str = "clients";
/// Key of the client state inside a client store.
pub const KEY_CLIENT_STATE: &str = "clientState";
/// Prefix of the consensus states inside a client store.
pub const KEY_CONSENSUS_STATE_PREFIX: &str = "consensusStates";
/// Prefix of the connection ends.
pub const KEY_CONNECTION_PREFIX: &str = "connections";
/// Prefix of the channel ends.
pub const KEY_CHANNEL_END_PREFIX: &str = "channelEnds";
/// Port segment.
pub const KEY_PORT_PREFIX: &str = "ports";
/// Channel segment.
pub const KEY_CHANNEL_PREFIX: &str = "channels";
/// Sequence segment.
pub const KEY_SEQUENCE_PREFIX: &str = "sequences";
/// Prefix of packet commitments.
pub const KEY_PACKET_COMMITMENT_PREFIX: &str = "commitments";
/// Prefix of packet acknowledgements.
pub const KEY_PACKET_ACK_PREFIX: &str = "acks";
/// Prefix of packet receipts.
pub const KEY_PACKET_RECEIPT_PREFIX: &str = "receipts";
/// Prefix of the next receive sequence.
pub const KEY_NEXT_SEQ_RECV_PREFIX: &str = "nextSequenceRecv";
/// Root of the upgrade store entries written for a planned chain upgrade.
pub const KEY_UPGRADED_IBC_STATE: &str = "upgradedIBCState";
/// Upgraded client state segment of an upgrade path.
pub const KEY_UPGRADED_CLIENT: &str = "upgradedClient";
/// Upgraded consensus state segment of an upgrade path.
pub const KEY_UPGRADED_CONS_STATE: &str = "upgradedConsState";

/// `clients/{client_id}`
#[must_use]
pub fn full_client_path(client_id: &str) -> String {
    format!("{KEY_CLIENT_STORE_PREFIX}/{client_id}")
}

/// `clients/{client_id}/clientState`
#[must_use]
pub fn client_state_path(client_id: &str) -> String {
    format!("{}/{KEY_CLIENT_STATE}", full_client_path(client_id))
}

/// `consensusStates/{height}`, relative to a client store.
#[must_use]
pub fn consensus_state_key(height: Height) -> String {
    format!("{KEY_CONSENSUS_STATE_PREFIX}/{height}")
}

/// `clients/{client_id}/consensusStates/{height}`
#[must_use]
pub fn consensus_state_path(client_id: &str, height: Height) -> String {
    format!(
        "{}/{}",
        full_client_path(client_id),
        consensus_state_key(height)
    )
}

/// `connections/{connection_id}`
#[must_use]
pub fn connection_path(connection_id: &str) -> String {
    format!("{KEY_CONNECTION_PREFIX}/{connection_id}")
}

fn channel_part(port_id: &str, channel_id: &str) -> String {
    format!("{KEY_PORT_PREFIX}/{port_id}/{KEY_CHANNEL_PREFIX}/{channel_id}")
}

fn sequence_part(port_id: &str, channel_id: &str, sequence: u64) -> String {
    format!(
        "{}/{KEY_SEQUENCE_PREFIX}/{sequence}",
        channel_part(port_id, channel_id)
    )
}

/// `channelEnds/ports/{port_id}/channels/{channel_id}`
#[must_use]
pub fn channel_path(port_id: &str, channel_id: &str) -> String {
    format!(
        "{KEY_CHANNEL_END_PREFIX}/{}",
        channel_part(port_id, channel_id)
    )
}

/// `commitments/ports/{port_id}/channels/{channel_id}/sequences/{sequence}`
#[must_use]
pub fn packet_commitment_path(port_id: &str, channel_id: &str, sequence: u64) -> String {
    format!(
        "{KEY_PACKET_COMMITMENT_PREFIX}/{}",
        sequence_part(port_id, channel_id, sequence)
    )
}

/// `acks/ports/{port_id}/channels/{channel_id}/sequences/{sequence}`
#[must_use]
pub fn packet_acknowledgement_path(port_id: &str, channel_id: &str, sequence: u64) -> String {
    format!(
        "{KEY_PACKET_ACK_PREFIX}/{}",
        sequence_part(port_id, channel_id, sequence)
    )
}

/// `receipts/ports/{port_id}/channels/{channel_id}/sequences/{sequence}`
#[must_use]
pub fn packet_receipt_path(port_id: &str, channel_id: &str, sequence: u64) -> String {
    format!(
        "{KEY_PACKET_RECEIPT_PREFIX}/{}",
        sequence_part(port_id, channel_id, sequence)
    )
}

/// `nextSequenceRecv/ports/{port_id}/channels/{channel_id}`
#[must_use]
pub fn next_sequence_recv_path(port_id: &str, channel_id: &str) -> String {
    format!(
        "{KEY_NEXT_SEQ_RECV_PREFIX}/{}",
        channel_part(port_id, channel_id)
    )
}

/// `upgradedIBCState/{plan_height}/upgradedClient`
#[must_use]
pub fn upgraded_client_path(plan_height: u64) -> String {
    format!("{KEY_UPGRADED_IBC_STATE}/{plan_height}/{KEY_UPGRADED_CLIENT}")
}

/// `upgradedIBCState/{plan_height}/upgradedConsState`
#[must_use]
pub fn upgraded_consensus_state_path(plan_height: u64) -> String {
    format!("{KEY_UPGRADED_IBC_STATE}/{plan_height}/{KEY_UPGRADED_CONS_STATE}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_match_the_host_layout() {
        assert_eq!(
            client_state_path("07-tendermint-0"),
            "clients/07-tendermint-0/clientState"
        );
        assert_eq!(
            consensus_state_path("07-tendermint-0", Height::new(1, 10)),
            "clients/07-tendermint-0/consensusStates/1-10"
        );
        assert_eq!(connection_path("connection-0"), "connections/connection-0");
        assert_eq!(
            channel_path("transfer", "channel-0"),
            "channelEnds/ports/transfer/channels/channel-0"
        );
        assert_eq!(
            packet_commitment_path("transfer", "channel-0", 1),
            "commitments/ports/transfer/channels/channel-0/sequences/1"
        );
        assert_eq!(
            packet_acknowledgement_path("transfer", "channel-0", 1),
            "acks/ports/transfer/channels/channel-0/sequences/1"
        );
        assert_eq!(
            packet_receipt_path("transfer", "channel-0", 1),
            "receipts/ports/transfer/channels/channel-0/sequences/1"
        );
        assert_eq!(
            next_sequence_recv_path("transfer", "channel-0"),
            "nextSequenceRecv/ports/transfer/channels/channel-0"
        );
        assert_eq!(
            upgraded_client_path(100),
            "upgradedIBCState/100/upgradedClient"
        );
        assert_eq!(
            upgraded_consensus_state_path(100),
            "upgradedIBCState/100/upgradedConsState"
        );
    }
}
