//! Export and import of the consensus metadata of a client store.

use cosmwasm_std::Storage;
use serde::{Deserialize, Serialize};

use crate::{
    error::StoreError,
    prefixed::ReadonlyStorage,
    state::{consensus_heights, iteration_key, processed_height_key, processed_time_key},
};

/// A raw metadata entry of a client store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisMetadata {
    /// Store key
    #[serde(with = "ibc_eureka_utils::serde::hex_bytes")]
    pub key: Vec<u8>,
    /// Store value
    #[serde(with = "ibc_eureka_utils::serde::hex_bytes")]
    pub value: Vec<u8>,
}

/// Collect the processed time, processed height and index entries of every consensus state.
/// # Errors
/// Returns an error if an index key is malformed.
pub fn export_metadata(
    storage: &(impl ReadonlyStorage + ?Sized),
) -> Result<Vec<GenesisMetadata>, StoreError> {
    let mut metadata = vec![];
    for height in consensus_heights(storage)? {
        let keys = [
            processed_time_key(height).into_bytes(),
            processed_height_key(height).into_bytes(),
            iteration_key(height),
        ];
        for key in keys {
            if let Some(value) = storage.get(&key) {
                metadata.push(GenesisMetadata { key, value });
            }
        }
    }
    Ok(metadata)
}

/// Write back exported metadata entries verbatim.
pub fn import_metadata(storage: &mut dyn Storage, metadata: &[GenesisMetadata]) {
    for entry in metadata {
        storage.set(&entry.key, &entry.value);
    }
}
