//! The message and verification entrypoints of the keeper.

use cosmwasm_std::{Env, MemoryStorage, Order, Storage};
use ibc_eureka_client_store::{self as store, PrefixedStorage, ReadonlyPrefixedStorage};
use ibc_eureka_host_types::{
    identifiers::format_client_identifier,
    path::{client_state_path, upgraded_client_path},
    Height, Status, TypedState,
};
use ibc_eureka_ics07_tendermint::ClientState;
use ibc_eureka_utils::ensure;

use crate::{
    config::{KeeperConfig, Params},
    error::ClientError,
    localhost::LOCALHOST_CLIENT_ID,
    module::LightClientModule,
    msg::{
        MsgCreateClient, MsgIbcSoftwareUpgrade, MsgRecoverClient, MsgUpdateClient,
        MsgUpgradeClient, UpgradePlan, VerifyMembershipMsg, VerifyNonMembershipMsg,
    },
    router::ClientRouter,
};

/// Key of the sequence of the next client, a big-endian `u64`.
pub const KEY_NEXT_CLIENT_SEQUENCE: &[u8] = b"nextClientSequence";
/// Key of the JSON encoded [`Params`].
pub const KEY_PARAMS: &[u8] = b"params";
/// Key of the JSON encoded scheduled [`UpgradePlan`].
pub const KEY_UPGRADE_PLAN: &[u8] = b"upgradePlan";

/// The client keeper.
pub struct Keeper {
    router: ClientRouter,
}

impl Keeper {
    /// Creates a keeper routing to the modules of `router`.
    #[must_use]
    pub const fn new(router: ClientRouter) -> Self {
        Self { router }
    }

    /// Creates a keeper with the default modules and stores the configured parameters.
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn from_config(storage: &mut dyn Storage, config: &KeeperConfig) -> Result<Self, ClientError> {
        config.validate()?;
        set_params(storage, &config.params)?;
        Ok(Self::new(ClientRouter::with_defaults(
            config.proof_specs.clone(),
        )))
    }

    /// The router of the keeper.
    #[must_use]
    pub const fn router(&self) -> &ClientRouter {
        &self.router
    }

    /// The router of the keeper, to register more modules.
    pub fn router_mut(&mut self) -> &mut ClientRouter {
        &mut self.router
    }

    /// Creates a client and returns its generated identifier.
    /// # Errors
    /// Returns an error if no module accepts the client state, the client type is not
    /// allowed or the initial states are invalid.
    pub fn create_client(
        &self,
        storage: &mut dyn Storage,
        env: &Env,
        msg: &MsgCreateClient,
    ) -> Result<String, ClientError> {
        let module = self.router.module_for_client_state(&msg.client_state)?;
        let client_type = module.client_type();
        ensure!(
            get_params(storage)?.client.is_allowed(client_type),
            ClientError::ClientTypeNotAllowed(client_type.to_string())
        );

        let sequence = next_client_sequence(storage)?;
        let client_id = format_client_identifier(client_type, sequence);
        module.initialize(
            &mut PrefixedStorage::for_client(storage, &client_id),
            env,
            &msg.client_state,
            &msg.consensus_state,
        )?;
        let next = sequence
            .checked_add(1)
            .ok_or_else(|| ClientError::InvalidClientSequence(hex::encode(sequence.to_be_bytes())))?;
        set_next_client_sequence(storage, next);

        let height =
            module.latest_height(&ReadonlyPrefixedStorage::for_client(storage, &client_id), env)?;
        tracing::info!(client_id = %client_id, client_type, height = %height, "client created");
        Ok(client_id)
    }

    /// Verifies a header or misbehaviour and applies it. Returns the updated heights, which
    /// are empty when the client was frozen.
    /// # Errors
    /// Returns an error if the client is not active or the message does not verify.
    pub fn update_client(
        &self,
        storage: &mut dyn Storage,
        env: &Env,
        msg: &MsgUpdateClient,
    ) -> Result<Vec<Height>, ClientError> {
        let client_id = msg.client_id.as_str();
        let module = self.client_module(storage, client_id)?;
        ensure_active(storage, env, client_id, module)?;

        let client_store = ReadonlyPrefixedStorage::for_client(storage, client_id);
        if let Err(err) = module.verify_client_message(&client_store, env, &msg.client_message) {
            tracing::warn!(
                client_id,
                type_url = %msg.client_message.type_url,
                error = %err,
                "client message rejected"
            );
            return Err(err);
        }
        let misbehaviour = module.check_for_misbehaviour(&client_store, env, &msg.client_message)?;

        let mut client_store = PrefixedStorage::for_client(storage, client_id);
        if misbehaviour {
            module.update_state_on_misbehaviour(&mut client_store, env, &msg.client_message)?;
            tracing::info!(client_id, "client frozen due to misbehaviour");
            return Ok(vec![]);
        }

        let heights = module.update_state(&mut client_store, env, &msg.client_message)?;
        tracing::info!(client_id, heights = ?heights, "client state updated");
        Ok(heights)
    }

    /// Upgrades an active client to the state committed by the tracked chain.
    /// # Errors
    /// Returns an error if the client is not active or the upgrade does not verify.
    pub fn upgrade_client(
        &self,
        storage: &mut dyn Storage,
        env: &Env,
        msg: &MsgUpgradeClient,
    ) -> Result<Height, ClientError> {
        let client_id = msg.client_id.as_str();
        let module = self.client_module(storage, client_id)?;
        ensure_active(storage, env, client_id, module)?;

        let height = module.verify_upgrade_and_update_state(
            &mut PrefixedStorage::for_client(storage, client_id),
            env,
            msg,
        )?;
        tracing::info!(client_id, height = %height, "client state upgraded");
        Ok(height)
    }

    /// Replaces an inactive client with the state of an active client of the same type.
    /// # Errors
    /// Returns an error if the subject is active, the substitute is not, or the module rejects
    /// the substitute.
    pub fn recover_client(
        &self,
        storage: &mut dyn Storage,
        env: &Env,
        msg: &MsgRecoverClient,
    ) -> Result<(), ClientError> {
        let subject_id = msg.subject_client_id.as_str();
        let substitute_id = msg.substitute_client_id.as_str();
        ensure!(
            subject_id != substitute_id,
            ClientError::InvalidSubstitute(format!(
                "subject and substitute client are both {subject_id}"
            ))
        );

        let module = self.client_module(storage, subject_id)?;
        let status = client_status(storage, env, subject_id, module)?;
        ensure!(
            !status.is_active(),
            ClientError::InvalidRecovery(format!("cannot recover {status} client {subject_id}"))
        );

        let substitute_module = self.client_module(storage, substitute_id)?;
        ensure!(
            substitute_module.client_type() == module.client_type(),
            ClientError::InvalidSubstitute(format!(
                "substitute client type {} does not match subject client type {}",
                substitute_module.client_type(),
                module.client_type()
            ))
        );
        ensure_active(storage, env, substitute_id, substitute_module)?;

        let substitute_store = snapshot(&ReadonlyPrefixedStorage::for_client(storage, substitute_id));
        module.recover_client(
            &mut PrefixedStorage::for_client(storage, subject_id),
            &substitute_store,
            env,
        )?;
        tracing::info!(
            client_id = subject_id,
            substitute_client_id = substitute_id,
            "client recovered"
        );
        Ok(())
    }

    /// Schedules an upgrade of this chain and stores the client counterparties upgrade to,
    /// with its client-chosen fields zeroed, under the upgrade path of the plan height.
    /// A previously scheduled plan is replaced.
    /// # Errors
    /// Returns an error if the plan is not in the future or the upgraded client is not a
    /// valid Tendermint client state.
    pub fn schedule_ibc_software_upgrade(
        &self,
        storage: &mut dyn Storage,
        env: &Env,
        msg: &MsgIbcSoftwareUpgrade,
    ) -> Result<(), ClientError> {
        let plan = &msg.plan;
        ensure!(
            !plan.name.trim().is_empty(),
            ClientError::InvalidUpgradePlan("name cannot be blank".to_string())
        );
        ensure!(
            plan.height > env.block.height,
            ClientError::InvalidUpgradePlan(format!(
                "upgrade height {} must be after the current height {}",
                plan.height, env.block.height
            ))
        );

        let upgraded_client = ClientState::from_any(&msg.upgraded_client_state)
            .map_err(|e| ClientError::InvalidUpgradeClient(e.to_string()))?;
        upgraded_client.validate()?;

        if let Some(previous) = upgrade_plan(storage)? {
            storage.remove(upgraded_client_path(previous.height).as_bytes());
            tracing::debug!(name = %previous.name, height = previous.height, "upgrade plan replaced");
        }
        storage.set(
            upgraded_client_path(plan.height).as_bytes(),
            &upgraded_client.zero_custom_fields().encode_to_vec()?,
        );
        storage.set(KEY_UPGRADE_PLAN, &serde_json::to_vec(plan)?);

        tracing::info!(name = %plan.name, height = plan.height, "upgrade scheduled");
        Ok(())
    }

    /// Verifies a membership proof with the client `client_id`.
    /// # Errors
    /// Returns an error if the client is not active or the proof does not verify.
    pub fn verify_membership(
        &self,
        storage: &dyn Storage,
        env: &Env,
        client_id: &str,
        msg: &VerifyMembershipMsg,
    ) -> Result<(), ClientError> {
        let module = self.client_module(storage, client_id)?;
        ensure_verifiable(storage, env, client_id, module)?;
        module.verify_membership(
            &ReadonlyPrefixedStorage::for_client(storage, client_id),
            storage,
            env,
            msg,
        )
    }

    /// Verifies a non-membership proof with the client `client_id`.
    /// # Errors
    /// Returns an error if the client is not active or the proof does not verify.
    pub fn verify_non_membership(
        &self,
        storage: &dyn Storage,
        env: &Env,
        client_id: &str,
        msg: &VerifyNonMembershipMsg,
    ) -> Result<(), ClientError> {
        let module = self.client_module(storage, client_id)?;
        ensure_verifiable(storage, env, client_id, module)?;
        module.verify_non_membership(
            &ReadonlyPrefixedStorage::for_client(storage, client_id),
            storage,
            env,
            msg,
        )
    }

    /// The module of an existing client. The localhost client always exists.
    pub(crate) fn client_module(
        &self,
        storage: &dyn Storage,
        client_id: &str,
    ) -> Result<&dyn LightClientModule, ClientError> {
        let module = self.router.route(client_id)?;
        if client_id != LOCALHOST_CLIENT_ID {
            ensure!(
                storage.get(client_state_path(client_id).as_bytes()).is_some(),
                ClientError::ClientNotFound(client_id.to_string())
            );
        }
        Ok(module)
    }
}

/// The status of a client, [`Status::Unauthorized`] if its type is not allowed.
pub(crate) fn client_status(
    storage: &dyn Storage,
    env: &Env,
    client_id: &str,
    module: &dyn LightClientModule,
) -> Result<Status, ClientError> {
    if !get_params(storage)?.client.is_allowed(module.client_type()) {
        return Ok(Status::Unauthorized);
    }
    module.status(&ReadonlyPrefixedStorage::for_client(storage, client_id), env)
}

fn ensure_active(
    storage: &dyn Storage,
    env: &Env,
    client_id: &str,
    module: &dyn LightClientModule,
) -> Result<(), ClientError> {
    let status = client_status(storage, env, client_id, module)?;
    ensure!(
        status.is_active(),
        ClientError::ClientNotActive {
            client_id: client_id.to_string(),
            status,
        }
    );
    Ok(())
}

fn ensure_verifiable(
    storage: &dyn Storage,
    env: &Env,
    client_id: &str,
    module: &dyn LightClientModule,
) -> Result<(), ClientError> {
    match client_status(storage, env, client_id, module)? {
        Status::Active => Ok(()),
        Status::Frozen => Err(ClientError::ClientFrozen(client_id.to_string())),
        status => Err(ClientError::ClientNotActive {
            client_id: client_id.to_string(),
            status,
        }),
    }
}

/// Copies every entry of `storage` into memory.
fn snapshot(storage: &dyn store::ReadonlyStorage) -> MemoryStorage {
    let mut copy = MemoryStorage::new();
    for (key, value) in store::ReadonlyStorage::range(storage, None, None, Order::Ascending) {
        copy.set(&key, &value);
    }
    copy
}

/// The stored parameters, or the defaults if none are stored.
/// # Errors
/// Returns an error if the stored parameters do not decode.
pub fn get_params(storage: &dyn Storage) -> Result<Params, ClientError> {
    match storage.get(KEY_PARAMS) {
        Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
        None => Ok(Params::default()),
    }
}

/// Validates and stores the parameters.
/// # Errors
/// Returns an error if the parameters are invalid.
pub fn set_params(storage: &mut dyn Storage, params: &Params) -> Result<(), ClientError> {
    params.validate()?;
    storage.set(KEY_PARAMS, &serde_json::to_vec(params)?);
    tracing::debug!(params = ?params, "params updated");
    Ok(())
}

/// The sequence the next created client gets.
/// # Errors
/// Returns an error if the stored sequence is not a big-endian `u64`.
pub fn next_client_sequence(storage: &dyn Storage) -> Result<u64, ClientError> {
    let Some(bytes) = storage.get(KEY_NEXT_CLIENT_SEQUENCE) else {
        return Ok(0);
    };
    let bytes: [u8; 8] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| ClientError::InvalidClientSequence(hex::encode(&bytes)))?;
    Ok(u64::from_be_bytes(bytes))
}

pub(crate) fn set_next_client_sequence(storage: &mut dyn Storage, sequence: u64) {
    storage.set(KEY_NEXT_CLIENT_SEQUENCE, &sequence.to_be_bytes());
}

/// The scheduled upgrade plan, if any.
/// # Errors
/// Returns an error if the stored plan does not decode.
pub fn upgrade_plan(storage: &dyn Storage) -> Result<Option<UpgradePlan>, ClientError> {
    storage
        .get(KEY_UPGRADE_PLAN)
        .map(|bytes| serde_json::from_slice::<UpgradePlan>(&bytes))
        .transpose()
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use cosmwasm_std::testing::MockStorage;

    use super::*;

    #[test]
    fn client_sequence_is_big_endian() {
        let mut storage = MockStorage::new();
        assert_eq!(next_client_sequence(&storage).unwrap(), 0);

        set_next_client_sequence(&mut storage, 258);
        assert_eq!(
            storage.get(KEY_NEXT_CLIENT_SEQUENCE).unwrap(),
            [0, 0, 0, 0, 0, 0, 1, 2]
        );
        assert_eq!(next_client_sequence(&storage).unwrap(), 258);

        storage.set(KEY_NEXT_CLIENT_SEQUENCE, &[1, 2]);
        assert!(matches!(
            next_client_sequence(&storage),
            Err(ClientError::InvalidClientSequence(bytes)) if bytes == "0102"
        ));
    }

    #[test]
    fn params_default_until_stored() {
        let mut storage = MockStorage::new();
        assert_eq!(get_params(&storage).unwrap(), Params::default());

        let mut params = Params::default();
        params.client.allowed_clients = vec!["07-tendermint".to_string()];
        set_params(&mut storage, &params).unwrap();
        assert_eq!(get_params(&storage).unwrap(), params);

        params.connection.max_expected_time_per_block = 0;
        assert!(matches!(
            set_params(&mut storage, &params),
            Err(ClientError::InvalidParams(_))
        ));
    }

    #[test]
    fn snapshot_copies_every_entry() {
        let mut storage = MockStorage::new();
        storage.set(b"a", b"1");
        storage.set(b"b", b"2");

        let copy = snapshot(&storage);
        assert_eq!(copy.get(b"a"), Some(b"1".to_vec()));
        assert_eq!(copy.get(b"b"), Some(b"2".to_vec()));
    }
}
