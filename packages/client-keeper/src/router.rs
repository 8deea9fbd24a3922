//! Defines the [`ClientRouter`] that maps client types to their light client modules.

use std::collections::HashMap;

use ibc_eureka_commitment::ProofSpecs;
use ibc_eureka_host_types::identifiers::client_type_of;
use ibc_eureka_utils::ensure;
use ibc_proto::google::protobuf::Any;
use tracing::instrument;

use crate::{
    error::ClientError,
    localhost::{LocalhostModule, LOCALHOST_CLIENT_ID},
    module::LightClientModule,
    tendermint::TendermintModule,
};

/// Light client modules keyed by client type.
#[derive(Default)]
#[allow(clippy::module_name_repetitions)]
pub struct ClientRouter {
    modules: HashMap<String, Box<dyn LightClientModule>>,
}

impl ClientRouter {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a router with the Tendermint and localhost modules.
    #[must_use]
    pub fn with_defaults(default_proof_specs: ProofSpecs) -> Self {
        let mut router = Self::new();
        for module in [
            Box::new(TendermintModule::new(default_proof_specs)) as Box<dyn LightClientModule>,
            Box::new(LocalhostModule),
        ] {
            router
                .modules
                .insert(module.client_type().to_string(), module);
        }
        router
    }

    /// Registers a light client module for its client type.
    /// # Errors
    /// Returns [`ClientError::RouteExists`] if the client type is already registered.
    #[instrument(skip(self, module), fields(client_type = %module.client_type()))]
    pub fn add_module<T: LightClientModule + 'static>(&mut self, module: T) -> Result<(), ClientError> {
        let client_type = module.client_type();
        ensure!(
            !self.modules.contains_key(client_type),
            ClientError::RouteExists(client_type.to_string())
        );

        self.modules
            .insert(client_type.to_string(), Box::new(module));
        tracing::debug!("light client module added");
        Ok(())
    }

    /// The module of `client_type`.
    /// # Errors
    /// Returns [`ClientError::RouteNotFound`] if no module is registered for the type.
    pub fn get_module(&self, client_type: &str) -> Result<&dyn LightClientModule, ClientError> {
        self.modules
            .get(client_type)
            .map(|v| &**v)
            .ok_or_else(|| ClientError::RouteNotFound(client_type.to_string()))
    }

    /// The module of the client type embedded in `client_id`.
    /// # Errors
    /// Returns an error if the identifier is malformed or its type is not registered.
    pub fn route(&self, client_id: &str) -> Result<&dyn LightClientModule, ClientError> {
        self.get_module(client_type_for(client_id)?)
    }

    /// The module creating clients from `client_state`.
    /// # Errors
    /// Returns [`ClientError::UnknownClientState`] if no module accepts the type URL.
    pub fn module_for_client_state(
        &self,
        client_state: &Any,
    ) -> Result<&dyn LightClientModule, ClientError> {
        self.modules
            .values()
            .map(|v| &**v)
            .find(|module| module.client_state_type_url() == Some(client_state.type_url.as_str()))
            .ok_or_else(|| ClientError::UnknownClientState(client_state.type_url.clone()))
    }

    /// The registered client types, sorted.
    #[must_use]
    pub fn client_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

/// The client type of `client_id`. The localhost identifier is the bare client type.
/// # Errors
/// Returns an error if the identifier is malformed.
pub fn client_type_for(client_id: &str) -> Result<&str, ClientError> {
    if client_id == LOCALHOST_CLIENT_ID {
        return Ok(LOCALHOST_CLIENT_ID);
    }
    Ok(client_type_of(client_id)?)
}
