//! Messages accepted by the keeper and its light client modules.

use ibc_eureka_commitment::MerklePath;
use ibc_eureka_host_types::Height;
use ibc_proto::google::protobuf::Any;
use serde::{Deserialize, Serialize};

/// Create a client from its initial client and consensus state.
#[derive(Clone, Debug, PartialEq)]
pub struct MsgCreateClient {
    /// Initial client state
    pub client_state: Any,
    /// Consensus state at the latest height of the client state
    pub consensus_state: Any,
}

/// Submit a header or misbehaviour to a client.
#[derive(Clone, Debug, PartialEq)]
pub struct MsgUpdateClient {
    /// Client to update
    pub client_id: String,
    /// Header or misbehaviour
    pub client_message: Any,
}

/// Move a client onto the upgraded chain.
#[derive(Clone, Debug, PartialEq)]
pub struct MsgUpgradeClient {
    /// Client to upgrade
    pub client_id: String,
    /// The upgraded client committed by the tracked chain
    pub upgraded_client_state: Any,
    /// The upgraded consensus state committed by the tracked chain
    pub upgraded_consensus_state: Any,
    /// Proof of the upgraded client
    pub proof_upgrade_client: Vec<u8>,
    /// Proof of the upgraded consensus state
    pub proof_upgrade_consensus_state: Vec<u8>,
}

/// Replace a frozen or expired client with the state of an active substitute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgRecoverClient {
    /// The client to recover
    pub subject_client_id: String,
    /// The client whose state replaces the subject's
    pub substitute_client_id: String,
}

/// A planned chain upgrade.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradePlan {
    /// Name of the upgrade
    pub name: String,
    /// Last block height before the upgrade
    pub height: u64,
}

/// Schedule an upgrade of this chain together with the client counterparties should
/// upgrade to.
#[derive(Clone, Debug, PartialEq)]
pub struct MsgIbcSoftwareUpgrade {
    /// The upgrade plan
    pub plan: UpgradePlan,
    /// The client state counterparties will track after the upgrade
    pub upgraded_client_state: Any,
}

/// Verify that a value is committed under a path at a height of the counterparty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyMembershipMsg {
    /// The height of the counterparty the proof is for
    pub height: Height,
    /// Time delay, in nanoseconds, the consensus state must have been stored for
    pub delay_time_period: u64,
    /// Block delay the consensus state must have been stored for
    pub delay_block_period: u64,
    /// The proof
    #[serde(with = "ibc_eureka_utils::serde::hex_bytes")]
    pub proof: Vec<u8>,
    /// The prefixed path of the value
    pub merkle_path: MerklePath,
    /// The value
    #[serde(with = "ibc_eureka_utils::serde::hex_bytes")]
    pub value: Vec<u8>,
}

/// Verify that nothing is committed under a path at a height of the counterparty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyNonMembershipMsg {
    /// The height of the counterparty the proof is for
    pub height: Height,
    /// Time delay, in nanoseconds, the consensus state must have been stored for
    pub delay_time_period: u64,
    /// Block delay the consensus state must have been stored for
    pub delay_block_period: u64,
    /// The proof
    #[serde(with = "ibc_eureka_utils::serde::hex_bytes")]
    pub proof: Vec<u8>,
    /// The prefixed path
    pub merkle_path: MerklePath,
}
