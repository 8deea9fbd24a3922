//! The `09-localhost` client: a stateless client for the host chain itself.
//!
//! Proofs are not needed to verify the host's own state, so membership checks read the
//! host store directly and only require the caller to pass [`SENTINEL_PROOF`].

use cosmwasm_std::{Env, Storage};
use ibc_eureka_client_store::{self_height, ReadonlyStorage};
use ibc_eureka_commitment::MerklePath;
use ibc_eureka_host_types::{Height, Status};
use ibc_eureka_utils::ensure;
use ibc_proto::google::protobuf::Any;

use crate::{
    error::ClientError,
    module::LightClientModule,
    msg::{MsgUpgradeClient, VerifyMembershipMsg, VerifyNonMembershipMsg},
};

/// The client type of the localhost client.
pub const LOCALHOST_CLIENT_TYPE: &str = "09-localhost";
/// The only localhost client identifier. It carries no sequence.
pub const LOCALHOST_CLIENT_ID: &str = "09-localhost";
/// The proof every localhost verification expects.
pub const SENTINEL_PROOF: [u8; 1] = [0x01];

/// The localhost light client.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalhostModule;

const fn unsupported(operation: &'static str) -> ClientError {
    ClientError::UnsupportedOperation {
        client_type: LOCALHOST_CLIENT_TYPE,
        operation,
    }
}

/// Checks the sentinel proof and returns the host store key of the path.
fn host_key<'a>(proof: &[u8], merkle_path: &'a MerklePath) -> Result<&'a [u8], ClientError> {
    ensure!(
        proof == SENTINEL_PROOF,
        ClientError::InvalidProof(format!(
            "localhost proof must be 0x{}, got 0x{}",
            hex::encode(SENTINEL_PROOF),
            hex::encode(proof)
        ))
    );
    ensure!(
        merkle_path.len() == 2,
        ClientError::InvalidMerklePath {
            path: merkle_path.to_string(),
            reason: format!("expected 2 keys, got {}", merkle_path.len()),
        }
    );
    Ok(merkle_path.key(1)?)
}

impl LightClientModule for LocalhostModule {
    fn client_type(&self) -> &'static str {
        LOCALHOST_CLIENT_TYPE
    }

    fn client_state_type_url(&self) -> Option<&'static str> {
        None
    }

    fn initialize(
        &self,
        _client_store: &mut dyn Storage,
        _env: &Env,
        _client_state: &Any,
        _consensus_state: &Any,
    ) -> Result<(), ClientError> {
        Err(unsupported("initialize"))
    }

    fn verify_client_message(
        &self,
        _client_store: &dyn ReadonlyStorage,
        _env: &Env,
        _client_message: &Any,
    ) -> Result<(), ClientError> {
        Err(unsupported("client message verification"))
    }

    fn check_for_misbehaviour(
        &self,
        _client_store: &dyn ReadonlyStorage,
        _env: &Env,
        _client_message: &Any,
    ) -> Result<bool, ClientError> {
        Ok(false)
    }

    fn update_state_on_misbehaviour(
        &self,
        _client_store: &mut dyn Storage,
        _env: &Env,
        _client_message: &Any,
    ) -> Result<(), ClientError> {
        Err(unsupported("freezing"))
    }

    fn update_state(
        &self,
        _client_store: &mut dyn Storage,
        env: &Env,
        _client_message: &Any,
    ) -> Result<Vec<Height>, ClientError> {
        Ok(vec![self_height(env)])
    }

    fn verify_membership(
        &self,
        _client_store: &dyn ReadonlyStorage,
        host_store: &dyn Storage,
        _env: &Env,
        msg: &VerifyMembershipMsg,
    ) -> Result<(), ClientError> {
        let key = host_key(&msg.proof, &msg.merkle_path)?;
        let path = String::from_utf8_lossy(key).into_owned();
        let stored = host_store
            .get(key)
            .ok_or_else(|| ClientError::ValueNotFound(path.clone()))?;
        ensure!(
            stored == msg.value,
            ClientError::ValueMismatch {
                path,
                expected: hex::encode(&msg.value),
                actual: hex::encode(stored),
            }
        );
        Ok(())
    }

    fn verify_non_membership(
        &self,
        _client_store: &dyn ReadonlyStorage,
        host_store: &dyn Storage,
        _env: &Env,
        msg: &VerifyNonMembershipMsg,
    ) -> Result<(), ClientError> {
        let key = host_key(&msg.proof, &msg.merkle_path)?;
        if let Some(value) = host_store.get(key) {
            return Err(ClientError::UnexpectedValue {
                path: String::from_utf8_lossy(key).into_owned(),
                value: hex::encode(value),
            });
        }
        Ok(())
    }

    fn status(&self, _client_store: &dyn ReadonlyStorage, _env: &Env) -> Result<Status, ClientError> {
        Ok(Status::Active)
    }

    fn latest_height(
        &self,
        _client_store: &dyn ReadonlyStorage,
        env: &Env,
    ) -> Result<Height, ClientError> {
        Ok(self_height(env))
    }

    fn timestamp_at_height(
        &self,
        _client_store: &dyn ReadonlyStorage,
        env: &Env,
        _height: Height,
    ) -> Result<u64, ClientError> {
        Ok(env.block.time.nanos())
    }

    fn client_state(&self, _client_store: &dyn ReadonlyStorage) -> Result<Any, ClientError> {
        Err(unsupported("client state queries"))
    }

    fn consensus_state(
        &self,
        _client_store: &dyn ReadonlyStorage,
        _height: Height,
    ) -> Result<Any, ClientError> {
        Err(unsupported("consensus state queries"))
    }

    fn verify_upgrade_and_update_state(
        &self,
        _client_store: &mut dyn Storage,
        _env: &Env,
        _msg: &MsgUpgradeClient,
    ) -> Result<Height, ClientError> {
        Err(unsupported("upgrades"))
    }

    fn recover_client(
        &self,
        _subject_store: &mut dyn Storage,
        _substitute_store: &dyn ReadonlyStorage,
        _env: &Env,
    ) -> Result<(), ClientError> {
        Err(unsupported("recovery"))
    }
}

#[cfg(test)]
mod tests {
    use cosmwasm_std::testing::{mock_env, MockStorage};
    use rstest::rstest;

    use super::*;

    const KEY: &str = "commitments/ports/transfer/channels/channel-0/sequences/1";

    fn membership(proof: &[u8], merkle_path: MerklePath, value: &[u8]) -> VerifyMembershipMsg {
        VerifyMembershipMsg {
            height: Height::new(0, 1),
            delay_time_period: 0,
            delay_block_period: 0,
            proof: proof.to_vec(),
            merkle_path,
            value: value.to_vec(),
        }
    }

    fn host_store() -> MockStorage {
        let mut storage = MockStorage::new();
        storage.set(KEY.as_bytes(), b"commitment");
        storage
    }

    #[test]
    fn membership_reads_the_host_store() {
        let storage = host_store();
        let msg = membership(&SENTINEL_PROOF, MerklePath::new(["ibc", KEY]), b"commitment");

        LocalhostModule
            .verify_membership(&MockStorage::new(), &storage, &mock_env(), &msg)
            .unwrap();
    }

    #[test]
    fn membership_rejects_other_values() {
        let storage = host_store();
        let msg = membership(&SENTINEL_PROOF, MerklePath::new(["ibc", KEY]), b"other");

        let err = LocalhostModule
            .verify_membership(&MockStorage::new(), &storage, &mock_env(), &msg)
            .unwrap_err();
        assert!(matches!(err, ClientError::ValueMismatch { .. }));
        assert!(err.to_string().contains(&hex::encode(b"commitment")));
    }

    #[rstest]
    #[case::empty_proof(vec![], MerklePath::new(["ibc", KEY]))]
    #[case::real_proof(vec![0x0a, 0x01], MerklePath::new(["ibc", KEY]))]
    fn membership_requires_the_sentinel_proof(#[case] proof: Vec<u8>, #[case] path: MerklePath) {
        let msg = membership(&proof, path, b"commitment");

        assert!(matches!(
            LocalhostModule.verify_membership(&MockStorage::new(), &host_store(), &mock_env(), &msg),
            Err(ClientError::InvalidProof(_))
        ));
    }

    #[rstest]
    #[case::unprefixed(MerklePath::new([KEY]))]
    #[case::nested(MerklePath::new(["ibc", "store", KEY]))]
    fn membership_requires_a_prefixed_key(#[case] path: MerklePath) {
        let msg = membership(&SENTINEL_PROOF, path, b"commitment");

        assert!(matches!(
            LocalhostModule.verify_membership(&MockStorage::new(), &host_store(), &mock_env(), &msg),
            Err(ClientError::InvalidMerklePath { .. })
        ));
    }

    #[test]
    fn non_membership_requires_absence() {
        let storage = host_store();
        let msg = |key: &str| VerifyNonMembershipMsg {
            height: Height::new(0, 1),
            delay_time_period: 0,
            delay_block_period: 0,
            proof: SENTINEL_PROOF.to_vec(),
            merkle_path: MerklePath::new(["ibc", key]),
        };

        LocalhostModule
            .verify_non_membership(&MockStorage::new(), &storage, &mock_env(), &msg("receipts/1"))
            .unwrap();
        assert!(matches!(
            LocalhostModule.verify_non_membership(&MockStorage::new(), &storage, &mock_env(), &msg(KEY)),
            Err(ClientError::UnexpectedValue { .. })
        ));
    }

    #[test]
    fn tracks_the_host_height() {
        let env = mock_env();
        let storage = MockStorage::new();

        assert_eq!(LocalhostModule.status(&storage, &env).unwrap(), Status::Active);
        assert_eq!(
            LocalhostModule.latest_height(&storage, &env).unwrap(),
            self_height(&env)
        );
        assert_eq!(
            LocalhostModule
                .timestamp_at_height(&storage, &env, Height::new(0, 1))
                .unwrap(),
            env.block.time.nanos()
        );
        assert!(matches!(
            LocalhostModule.recover_client(&mut MockStorage::new(), &storage, &env),
            Err(ClientError::UnsupportedOperation { .. })
        ));
    }
}
