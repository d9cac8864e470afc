//! Storage interface: the abstract surface the engines use to read/write
//! untrusted server-side state, plus an in-memory reference implementation
//! for tests and simple embeddings.
//!
//! No durability guarantee is required of an implementation (spec.md
//! §4.5); on-disk persistence *formats* are explicitly out of scope, so no
//! `FileStore` is implemented here, mirroring
//! `examples/original_source/vds/storage/filestore.py`'s own scaffold-only
//! status — only `MemStore` (grounded on
//! `examples/original_source/vds/storage/memstore.py`) is provided.

#![forbid(unsafe_code)]

use std::collections::HashMap;

use crate::errors::StorageError;

/// Scheme tag used to namespace the root-digest cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Acc,
    Cvc,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Acc => "acc",
            Scheme::Cvc => "cvc",
        }
    }
}

/// A stored ACC item record: `(data, tag, index, signature)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccItemRecord {
    pub data: Vec<u8>,
    pub tag: [u8; 16],
    pub index: u64,
    pub sigma: [u8; 64],
}

/// Per-index, per-log storage for VDS-ACC.
pub trait AccStorage {
    fn save_item(&mut self, record: AccItemRecord) -> Result<(), StorageError>;
    fn get_item(&self, idx: u64) -> Result<AccItemRecord, StorageError>;
    fn set_state(&mut self, acc_value: Vec<u8>, powers: Vec<Vec<u8>>) -> Result<(), StorageError>;
    fn get_state(&self) -> Result<(Vec<u8>, Vec<Vec<u8>>), StorageError>;
    fn set_poly(&mut self, coeffs: Vec<Vec<u8>>) -> Result<(), StorageError>;
    fn get_poly(&self) -> Result<Vec<Vec<u8>>, StorageError>;
    fn count(&self) -> Result<u64, StorageError>;
}

/// A single materialized CVC tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CvcNodeRecord {
    pub idx: u64,
    /// `r = PRF(prf_key, idx)`, serialized scalar bytes.
    pub r: Vec<u8>,
    /// `m`-vector, `q+1` serialized scalars.
    pub m: Vec<Vec<u8>>,
    /// `C = commit_vec(r, m)`, serialized G1 bytes.
    pub c: Vec<u8>,
}

/// Node-level storage for VDS-CVC. The three spec-named operations
/// (`put_cvc_insert_path`, `get_cvc_auth_path`, `apply_cvc_updates`) are
/// default methods layered on top of `get_node`/`put_node`, which the
/// engine also uses directly to walk/update arbitrary ancestors.
pub trait CvcStorage {
    fn get_node(&self, idx: u64) -> Result<Option<CvcNodeRecord>, StorageError>;
    fn put_node(&mut self, record: CvcNodeRecord) -> Result<(), StorageError>;

    /// Persist a freshly-appended leaf together with every ancestor whose
    /// commitment changed as a result.
    fn put_cvc_insert_path(
        &mut self,
        leaf: CvcNodeRecord,
        parents: Vec<CvcNodeRecord>,
    ) -> Result<(), StorageError> {
        self.put_node(leaf)?;
        for p in parents {
            self.put_node(p)?;
        }
        Ok(())
    }

    /// Fetch every materialized node on the root-to-leaf path for `idx`,
    /// ordered leaf-first. Missing (unmaterialized) ancestors are skipped;
    /// the engine is responsible for detecting an incomplete path.
    fn get_cvc_auth_path(&self, idx: u64, q: usize) -> Result<Vec<CvcNodeRecord>, StorageError> {
        let mut out = Vec::new();
        let mut cur = idx;
        loop {
            if let Some(node) = self.get_node(cur)? {
                out.push(node);
            }
            if cur == 1 {
                break;
            }
            cur = crate::cvc::tree::parent(cur, q);
        }
        Ok(out)
    }

    /// Apply a batch of node updates (used after an in-place `update`,
    /// which recomputes every ancestor on the path exactly as `append`
    /// does).
    fn apply_cvc_updates(&mut self, tokens: Vec<CvcNodeRecord>) -> Result<(), StorageError> {
        for t in tokens {
            self.put_node(t)?;
        }
        Ok(())
    }
}

/// Scheme-agnostic root-digest cache.
pub trait RootStore {
    fn set_root(&mut self, scheme: Scheme, root: Vec<u8>);
    fn get_root(&self, scheme: Scheme) -> Result<Vec<u8>, StorageError>;
}

/// In-memory reference store implementing all three interfaces.
#[derive(Debug, Default)]
pub struct MemStore {
    acc_items: HashMap<u64, AccItemRecord>,
    acc_value: Option<Vec<u8>>,
    acc_powers: Vec<Vec<u8>>,
    acc_poly: Vec<Vec<u8>>,
    cvc_nodes: HashMap<u64, CvcNodeRecord>,
    roots: HashMap<Scheme, Vec<u8>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccStorage for MemStore {
    fn save_item(&mut self, record: AccItemRecord) -> Result<(), StorageError> {
        self.acc_items.insert(record.index, record);
        Ok(())
    }

    fn get_item(&self, idx: u64) -> Result<AccItemRecord, StorageError> {
        self.acc_items
            .get(&idx)
            .cloned()
            .ok_or(StorageError::ItemNotFound(idx))
    }

    fn set_state(&mut self, acc_value: Vec<u8>, powers: Vec<Vec<u8>>) -> Result<(), StorageError> {
        self.acc_value = Some(acc_value);
        self.acc_powers = powers;
        Ok(())
    }

    fn get_state(&self) -> Result<(Vec<u8>, Vec<Vec<u8>>), StorageError> {
        let value = self.acc_value.clone().ok_or(StorageError::AccStateNotSet)?;
        Ok((value, self.acc_powers.clone()))
    }

    fn set_poly(&mut self, coeffs: Vec<Vec<u8>>) -> Result<(), StorageError> {
        self.acc_poly = coeffs;
        Ok(())
    }

    fn get_poly(&self) -> Result<Vec<Vec<u8>>, StorageError> {
        Ok(self.acc_poly.clone())
    }

    fn count(&self) -> Result<u64, StorageError> {
        Ok(self.acc_items.len() as u64)
    }
}

impl CvcStorage for MemStore {
    fn get_node(&self, idx: u64) -> Result<Option<CvcNodeRecord>, StorageError> {
        Ok(self.cvc_nodes.get(&idx).cloned())
    }

    fn put_node(&mut self, record: CvcNodeRecord) -> Result<(), StorageError> {
        self.cvc_nodes.insert(record.idx, record);
        Ok(())
    }
}

impl RootStore for MemStore {
    fn set_root(&mut self, scheme: Scheme, root: Vec<u8>) {
        self.roots.insert(scheme, root);
    }

    fn get_root(&self, scheme: Scheme) -> Result<Vec<u8>, StorageError> {
        self.roots
            .get(&scheme)
            .cloned()
            .ok_or_else(|| StorageError::RootNotSet(scheme.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acc_item_round_trips() {
        let mut store = MemStore::new();
        let record = AccItemRecord {
            data: b"hello".to_vec(),
            tag: [1u8; 16],
            index: 1,
            sigma: [2u8; 64],
        };
        store.save_item(record.clone()).unwrap();
        assert_eq!(store.get_item(1).unwrap(), record);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn missing_acc_item_is_storage_error() {
        let store = MemStore::new();
        assert!(matches!(store.get_item(1), Err(StorageError::ItemNotFound(1))));
    }

    #[test]
    fn root_cache_is_scheme_namespaced() {
        let mut store = MemStore::new();
        store.set_root(Scheme::Acc, vec![1, 2, 3]);
        assert_eq!(store.get_root(Scheme::Acc).unwrap(), vec![1, 2, 3]);
        assert!(store.get_root(Scheme::Cvc).is_err());
    }
}
