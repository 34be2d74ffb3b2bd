use std::collections::BTreeSet;
use std::sync::Arc;

use super::entry::{fee_order_key, MempoolEntry};
use crate::model::Hash;

type FeeKey = (std::cmp::Reverse<ordered_float::OrderedFloat<f64>>, u64, Hash);

/// A `(feePerByte desc, nonce asc, hash asc)`-ordered index over a set of entries. Used twice by
/// `MempoolEngine`: once over every pending entry (`fee_index_all`, for global eviction) and once
/// restricted to executable user-pool entries (`fee_index_executable`, the miner iterator's
/// source). Keeps its own `(key -> entry)` map so removal by hash doesn't require recomputing the
/// sort key from scratch.
#[derive(Default)]
pub struct FeeIndex {
    ordered: BTreeSet<FeeKey>,
    by_key: std::collections::HashMap<FeeKey, Arc<MempoolEntry>>,
    key_by_hash: std::collections::HashMap<Hash, FeeKey>,
}

impl FeeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: Arc<MempoolEntry>) {
        let key = fee_order_key(&entry);
        let hash = entry.tx().hash();
        self.ordered.insert(key);
        self.by_key.insert(key, entry);
        self.key_by_hash.insert(hash, key);
    }

    pub fn remove_by_hash(&mut self, hash: &Hash) -> Option<Arc<MempoolEntry>> {
        let key = self.key_by_hash.remove(hash)?;
        self.ordered.remove(&key);
        self.by_key.remove(&key)
    }

    pub fn contains_hash(&self, hash: &Hash) -> bool {
        self.key_by_hash.contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// The globally lowest-fee-per-byte entry, i.e. the first eviction candidate when the
    /// mempool is full.
    pub fn lowest(&self) -> Option<Arc<MempoolEntry>> {
        self.ordered.iter().next_back().and_then(|k| self.by_key.get(k).cloned())
    }

    /// Iterates in the authoritative `(feePerByte desc, nonce asc, hash asc)` order.
    pub fn iter_in_order(&self) -> impl Iterator<Item = Arc<MempoolEntry>> + '_ {
        self.ordered.iter().filter_map(|k| self.by_key.get(k).cloned())
    }

    /// A point-in-time snapshot of the current order, for `MempoolEngine::getExecutableIterator`
    /// (concurrent mutation after the snapshot is taken must not be observed by the caller).
    pub fn snapshot_in_order(&self) -> Vec<Arc<MempoolEntry>> {
        self.iter_in_order().collect()
    }
}
