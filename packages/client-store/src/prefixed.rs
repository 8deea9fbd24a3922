//! Namespaced views over a shared [`Storage`], one per client, and the [`ReadonlyStorage`]
//! access the read paths of a client take.

use cosmwasm_std::{Order, Record, Storage};
use ibc_eureka_host_types::path::full_client_path;

use crate::state::prefix_end;

/// The namespace of a client's store: `clients/{client_id}/`.
#[must_use]
pub fn client_store_prefix(client_id: &str) -> Vec<u8> {
    format!("{}/", full_client_path(client_id)).into_bytes()
}

fn namespaced(prefix: &[u8], key: &[u8]) -> Vec<u8> {
    let mut full = Vec::with_capacity(prefix.len() + key.len());
    full.extend_from_slice(prefix);
    full.extend_from_slice(key);
    full
}

fn range_with_prefix<'a, S: ReadonlyStorage + ?Sized>(
    storage: &'a S,
    prefix: &'a [u8],
    start: Option<&[u8]>,
    end: Option<&[u8]>,
    order: Order,
) -> Box<dyn Iterator<Item = Record> + 'a> {
    let start = start.map_or_else(|| prefix.to_vec(), |s| namespaced(prefix, s));
    let end = end.map_or_else(|| prefix_end(prefix), |e| Some(namespaced(prefix, e)));
    Box::new(
        storage
            .range(Some(&start), end.as_deref(), order)
            .map(move |(key, value)| (key[prefix.len()..].to_vec(), value)),
    )
}

/// Read access to a key-value store. Every [`Storage`] has it.
pub trait ReadonlyStorage {
    /// The value under `key`, if any.
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// The entries in `[start, end)`, in `order`.
    fn range<'a>(
        &'a self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        order: Order,
    ) -> Box<dyn Iterator<Item = Record> + 'a>;
}

impl<S: Storage + ?Sized> ReadonlyStorage for S {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        Storage::get(self, key)
    }

    fn range<'a>(
        &'a self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        order: Order,
    ) -> Box<dyn Iterator<Item = Record> + 'a> {
        Storage::range(self, start, end, order)
    }
}

/// A mutable view of the keys under a prefix. Keys are read and written relative to it.
pub struct PrefixedStorage<'a> {
    storage: &'a mut dyn Storage,
    prefix: Vec<u8>,
}

impl<'a> PrefixedStorage<'a> {
    /// Creates a view of `storage` under `prefix`.
    pub fn new(storage: &'a mut dyn Storage, prefix: impl Into<Vec<u8>>) -> Self {
        Self {
            storage,
            prefix: prefix.into(),
        }
    }

    /// Creates the view of the store of `client_id`.
    pub fn for_client(storage: &'a mut dyn Storage, client_id: &str) -> Self {
        Self::new(storage, client_store_prefix(client_id))
    }
}

impl Storage for PrefixedStorage<'_> {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        Storage::get(&*self.storage, &namespaced(&self.prefix, key))
    }

    fn range<'a>(
        &'a self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        order: Order,
    ) -> Box<dyn Iterator<Item = Record> + 'a> {
        range_with_prefix(&*self.storage, &self.prefix, start, end, order)
    }

    fn set(&mut self, key: &[u8], value: &[u8]) {
        self.storage.set(&namespaced(&self.prefix, key), value);
    }

    fn remove(&mut self, key: &[u8]) {
        self.storage.remove(&namespaced(&self.prefix, key));
    }
}

/// A read-only view of the keys under a prefix. It is a [`ReadonlyStorage`] and not a
/// [`Storage`], so nothing can be written through it.
pub struct ReadonlyPrefixedStorage<'a, S: ReadonlyStorage + ?Sized> {
    storage: &'a S,
    prefix: Vec<u8>,
}

impl<'a, S: ReadonlyStorage + ?Sized> ReadonlyPrefixedStorage<'a, S> {
    /// Creates a view of `storage` under `prefix`.
    pub fn new(storage: &'a S, prefix: impl Into<Vec<u8>>) -> Self {
        Self {
            storage,
            prefix: prefix.into(),
        }
    }

    /// Creates the view of the store of `client_id`.
    #[must_use]
    pub fn for_client(storage: &'a S, client_id: &str) -> Self {
        Self::new(storage, client_store_prefix(client_id))
    }
}

impl<S: ReadonlyStorage + ?Sized> ReadonlyStorage for ReadonlyPrefixedStorage<'_, S> {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.storage.get(&namespaced(&self.prefix, key))
    }

    fn range<'a>(
        &'a self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        order: Order,
    ) -> Box<dyn Iterator<Item = Record> + 'a> {
        range_with_prefix(self.storage, &self.prefix, start, end, order)
    }
}
