//! Defines the [`LightClientModule`] trait implemented by every client type.

use cosmwasm_std::{Env, Storage};
use ibc_eureka_client_store::{self as store, GenesisMetadata, ReadonlyStorage};
use ibc_eureka_host_types::{Height, Status};
use ibc_proto::google::protobuf::Any;

use crate::{
    error::ClientError,
    msg::{MsgUpgradeClient, VerifyMembershipMsg, VerifyNonMembershipMsg},
};

/// The state machine of one client type.
///
/// `client_store` is always the prefixed store of the client the call is for, and is only
/// writable in the calls that change the client. Values cross the trait as `Any`; each
/// module decodes the concrete types it understands.
pub trait LightClientModule {
    /// The client type, used as the prefix of client identifiers.
    fn client_type(&self) -> &'static str;

    /// The type URL of the client states this module creates clients from, if any.
    fn client_state_type_url(&self) -> Option<&'static str>;

    /// Validates and stores the initial state of a new client.
    /// # Errors
    /// Returns an error if the states do not decode or fail validation.
    fn initialize(
        &self,
        client_store: &mut dyn Storage,
        env: &Env,
        client_state: &Any,
        consensus_state: &Any,
    ) -> Result<(), ClientError>;

    /// Verifies a header or misbehaviour.
    /// # Errors
    /// Returns an error if the message does not verify.
    fn verify_client_message(
        &self,
        client_store: &dyn ReadonlyStorage,
        env: &Env,
        client_message: &Any,
    ) -> Result<(), ClientError>;

    /// Returns true if the verified message proves misbehaviour.
    /// # Errors
    /// Returns an error if the message does not decode.
    fn check_for_misbehaviour(
        &self,
        client_store: &dyn ReadonlyStorage,
        env: &Env,
        client_message: &Any,
    ) -> Result<bool, ClientError>;

    /// Freezes the client after misbehaviour.
    /// # Errors
    /// Returns an error if the client state cannot be read or written.
    fn update_state_on_misbehaviour(
        &self,
        client_store: &mut dyn Storage,
        env: &Env,
        client_message: &Any,
    ) -> Result<(), ClientError>;

    /// Applies a verified header and returns the heights it updated.
    /// # Errors
    /// Returns an error if the message is not a header or the store cannot be written.
    fn update_state(
        &self,
        client_store: &mut dyn Storage,
        env: &Env,
        client_message: &Any,
    ) -> Result<Vec<Height>, ClientError>;

    /// Verifies a membership proof. `host_store` is the whole keeper store.
    /// # Errors
    /// Returns an error if the proof does not verify.
    fn verify_membership(
        &self,
        client_store: &dyn ReadonlyStorage,
        host_store: &dyn Storage,
        env: &Env,
        msg: &VerifyMembershipMsg,
    ) -> Result<(), ClientError>;

    /// Verifies a non-membership proof. `host_store` is the whole keeper store.
    /// # Errors
    /// Returns an error if the proof does not verify.
    fn verify_non_membership(
        &self,
        client_store: &dyn ReadonlyStorage,
        host_store: &dyn Storage,
        env: &Env,
        msg: &VerifyNonMembershipMsg,
    ) -> Result<(), ClientError>;

    /// The status of the client at the host time.
    /// # Errors
    /// Returns an error if the stored states do not decode.
    fn status(&self, client_store: &dyn ReadonlyStorage, env: &Env) -> Result<Status, ClientError>;

    /// The latest height of the client.
    /// # Errors
    /// Returns an error if the client state cannot be read.
    fn latest_height(&self, client_store: &dyn ReadonlyStorage, env: &Env)
        -> Result<Height, ClientError>;

    /// The timestamp, in nanoseconds, of the consensus state at `height`.
    /// # Errors
    /// Returns an error if no consensus state is stored at the height.
    fn timestamp_at_height(
        &self,
        client_store: &dyn ReadonlyStorage,
        env: &Env,
        height: Height,
    ) -> Result<u64, ClientError>;

    /// The stored client state.
    /// # Errors
    /// Returns an error if the client has no stored state.
    fn client_state(&self, client_store: &dyn ReadonlyStorage) -> Result<Any, ClientError>;

    /// The consensus state stored at `height`.
    /// # Errors
    /// Returns an error if no consensus state is stored at the height.
    fn consensus_state(
        &self,
        client_store: &dyn ReadonlyStorage,
        height: Height,
    ) -> Result<Any, ClientError>;

    /// Verifies the upgraded client and consensus state and replaces the client with them.
    /// Returns the new latest height.
    /// # Errors
    /// Returns an error if the upgrade does not verify.
    fn verify_upgrade_and_update_state(
        &self,
        client_store: &mut dyn Storage,
        env: &Env,
        msg: &MsgUpgradeClient,
    ) -> Result<Height, ClientError>;

    /// Replaces the subject client with the latest state of the substitute.
    /// # Errors
    /// Returns an error if the substitute does not match the subject.
    fn recover_client(
        &self,
        subject_store: &mut dyn Storage,
        substitute_store: &dyn ReadonlyStorage,
        env: &Env,
    ) -> Result<(), ClientError>;

    /// The heights of the stored consensus states, ascending.
    /// # Errors
    /// Returns an error if the index is malformed.
    fn consensus_heights(
        &self,
        client_store: &dyn ReadonlyStorage,
    ) -> Result<Vec<Height>, ClientError> {
        Ok(store::consensus_heights(client_store)?)
    }

    /// The consensus metadata entries of the client store.
    /// # Errors
    /// Returns an error if the index is malformed.
    fn export_metadata(
        &self,
        client_store: &dyn ReadonlyStorage,
    ) -> Result<Vec<GenesisMetadata>, ClientError> {
        Ok(store::export_metadata(client_store)?)
    }
}
