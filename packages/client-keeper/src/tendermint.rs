//! [`LightClientModule`] for ICS-07 Tendermint clients.

use cosmwasm_std::{Env, Storage};
use ibc_eureka_client_store::{self as store, ReadonlyStorage};
use ibc_eureka_commitment::ProofSpecs;
use ibc_eureka_host_types::{Height, Status, TypedState};
use ibc_eureka_ics07_tendermint::{
    client, membership, recovery, update, upgrade, ClientMessage, ClientState, ConsensusState,
    DelayPeriod, TENDERMINT_CLIENT_TYPE,
};
use ibc_proto::google::protobuf::Any;

use crate::{
    error::ClientError,
    module::LightClientModule,
    msg::{MsgUpgradeClient, VerifyMembershipMsg, VerifyNonMembershipMsg},
};

/// Routes client calls to the Tendermint light client.
#[derive(Clone, Debug, Default)]
pub struct TendermintModule {
    /// Proof specs of clients created without any
    default_proof_specs: ProofSpecs,
}

impl TendermintModule {
    /// Creates the module. Clients created without proof specs get `default_proof_specs`.
    #[must_use]
    pub const fn new(default_proof_specs: ProofSpecs) -> Self {
        Self {
            default_proof_specs,
        }
    }
}

fn client_state(
    client_store: &(impl ReadonlyStorage + ?Sized),
) -> Result<ClientState, ClientError> {
    Ok(store::get_client_state(client_store)?)
}

fn client_message(any: &Any) -> Result<ClientMessage, ClientError> {
    Ok(ClientMessage::from_any(any)?)
}

impl LightClientModule for TendermintModule {
    fn client_type(&self) -> &'static str {
        TENDERMINT_CLIENT_TYPE
    }

    fn client_state_type_url(&self) -> Option<&'static str> {
        Some(ClientState::TYPE_URL)
    }

    fn initialize(
        &self,
        client_store: &mut dyn Storage,
        env: &Env,
        client_state: &Any,
        consensus_state: &Any,
    ) -> Result<(), ClientError> {
        let mut client_state = ClientState::from_any(client_state)?;
        if client_state.proof_specs.is_empty() {
            client_state.proof_specs = self.default_proof_specs.clone();
        }
        let consensus_state = ConsensusState::from_any(consensus_state)?;
        Ok(client::initialize(
            client_store,
            env,
            &client_state,
            &consensus_state,
        )?)
    }

    fn verify_client_message(
        &self,
        client_store: &dyn ReadonlyStorage,
        env: &Env,
        client_message: &Any,
    ) -> Result<(), ClientError> {
        let client_state = client_state(client_store)?;
        let message = self::client_message(client_message)?;
        Ok(update::verify_client_message(
            client_store,
            env,
            &client_state,
            &message,
        )?)
    }

    fn check_for_misbehaviour(
        &self,
        _client_store: &dyn ReadonlyStorage,
        _env: &Env,
        client_message: &Any,
    ) -> Result<bool, ClientError> {
        Ok(update::check_for_misbehaviour(&self::client_message(
            client_message,
        )?))
    }

    fn update_state_on_misbehaviour(
        &self,
        client_store: &mut dyn Storage,
        _env: &Env,
        _client_message: &Any,
    ) -> Result<(), ClientError> {
        let mut client_state = client_state(client_store)?;
        Ok(update::update_state_on_misbehaviour(
            client_store,
            &mut client_state,
        )?)
    }

    fn update_state(
        &self,
        client_store: &mut dyn Storage,
        env: &Env,
        client_message: &Any,
    ) -> Result<Vec<Height>, ClientError> {
        let ClientMessage::Header(header) = self::client_message(client_message)? else {
            return Err(ClientError::InvalidClientMessage(
                "state can only be updated from a header".to_string(),
            ));
        };
        let mut client_state = client_state(client_store)?;
        Ok(update::update_state(
            client_store,
            env,
            &mut client_state,
            &header,
        )?)
    }

    fn verify_membership(
        &self,
        client_store: &dyn ReadonlyStorage,
        _host_store: &dyn Storage,
        env: &Env,
        msg: &VerifyMembershipMsg,
    ) -> Result<(), ClientError> {
        let client_state = client_state(client_store)?;
        Ok(membership::verify_membership(
            client_store,
            env,
            &client_state,
            msg.height,
            DelayPeriod::new(msg.delay_time_period, msg.delay_block_period),
            &msg.proof,
            &msg.merkle_path,
            &msg.value,
        )?)
    }

    fn verify_non_membership(
        &self,
        client_store: &dyn ReadonlyStorage,
        _host_store: &dyn Storage,
        env: &Env,
        msg: &VerifyNonMembershipMsg,
    ) -> Result<(), ClientError> {
        let client_state = client_state(client_store)?;
        Ok(membership::verify_non_membership(
            client_store,
            env,
            &client_state,
            msg.height,
            DelayPeriod::new(msg.delay_time_period, msg.delay_block_period),
            &msg.proof,
            &msg.merkle_path,
        )?)
    }

    fn status(&self, client_store: &dyn ReadonlyStorage, env: &Env) -> Result<Status, ClientError> {
        let client_state = client_state(client_store)?;
        Ok(client::status(client_store, env, &client_state)?)
    }

    fn latest_height(
        &self,
        client_store: &dyn ReadonlyStorage,
        _env: &Env,
    ) -> Result<Height, ClientError> {
        Ok(client::latest_height(client_store)?)
    }

    fn timestamp_at_height(
        &self,
        client_store: &dyn ReadonlyStorage,
        _env: &Env,
        height: Height,
    ) -> Result<u64, ClientError> {
        Ok(client::timestamp_at_height(client_store, height)?)
    }

    fn client_state(&self, client_store: &dyn ReadonlyStorage) -> Result<Any, ClientError> {
        Ok(client_state(client_store)?.to_any()?)
    }

    fn consensus_state(
        &self,
        client_store: &dyn ReadonlyStorage,
        height: Height,
    ) -> Result<Any, ClientError> {
        let consensus_state: ConsensusState = store::get_consensus_state(client_store, height)?;
        Ok(consensus_state.to_any()?)
    }

    fn verify_upgrade_and_update_state(
        &self,
        client_store: &mut dyn Storage,
        env: &Env,
        msg: &MsgUpgradeClient,
    ) -> Result<Height, ClientError> {
        let invalid = |e: ibc_eureka_host_types::CodecError| {
            ClientError::InvalidUpgradeClient(e.to_string())
        };
        let upgraded_client = ClientState::from_any(&msg.upgraded_client_state).map_err(invalid)?;
        let upgraded_consensus =
            ConsensusState::from_any(&msg.upgraded_consensus_state).map_err(invalid)?;

        let client_state = client_state(client_store)?;
        Ok(upgrade::verify_upgrade_and_update_state(
            client_store,
            env,
            &client_state,
            &upgraded_client,
            &upgraded_consensus,
            &msg.proof_upgrade_client,
            &msg.proof_upgrade_consensus_state,
        )?)
    }

    fn recover_client(
        &self,
        subject_store: &mut dyn Storage,
        substitute_store: &dyn ReadonlyStorage,
        env: &Env,
    ) -> Result<(), ClientError> {
        let subject = client_state(subject_store)?;
        let substitute = client_state(substitute_store)?;
        recovery::check_substitute_and_update_state(
            subject_store,
            substitute_store,
            env,
            &subject,
            &substitute,
        )?;
        Ok(())
    }
}
