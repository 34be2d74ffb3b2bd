use std::collections::BTreeMap;
use std::sync::Arc;

use super::entry::MempoolEntry;
use crate::model::Address;

/// The accepted-but-not-yet-executable / now-executable distinction `SenderPool::add` reports
/// back to `MempoolEngine`, which only indexes `added` entries into `fee_index_executable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Inserted directly into `executable` (and possibly triggered further promotions from
    /// `future`).
    Added,
    /// Inserted into `future`; not yet part of the executable frontier.
    AddedFuture,
}

#[derive(Debug)]
pub enum SenderPoolError {
    Stale,
    FailedFeeTooLow,
    NonceTooFarFuture { max_gap: u64 },
}

/// Result of a successful `add`: which slot the new entry landed in, plus every entry promoted
/// from `future` into `executable` as a side effect (in ascending nonce order), plus any entry
/// it replaced via RBF.
pub struct AddResult {
    pub outcome: AddOutcome,
    pub added: Vec<Arc<MempoolEntry>>,
    pub removed: Vec<Arc<MempoolEntry>>,
}

/// Per-sender nonce-ordered transaction pool. Not internally locked: `MempoolEngine` owns one
/// lock per `SenderPool` (see `mempool::engine`) and serializes all access to a given sender
/// through it, so this type's methods take `&mut self` rather than reaching for interior
/// mutability of its own.
pub struct SenderPool {
    sender: Address,
    chain_nonce: u64,
    executable: BTreeMap<u64, Arc<MempoolEntry>>,
    future: BTreeMap<u64, Arc<MempoolEntry>>,
}

/// An RBF replacement must strictly exceed the old fee by at least this factor, expressed as a
/// numerator/denominator pair to avoid floating point in the comparison (`old * 110 / 100`).
const RBF_BUMP_NUM: u128 = 110;
const RBF_BUMP_DEN: u128 = 100;

impl SenderPool {
    pub fn new(sender: Address, chain_nonce: u64) -> Self {
        Self { sender, chain_nonce, executable: BTreeMap::new(), future: BTreeMap::new() }
    }

    pub fn sender(&self) -> Address {
        self.sender
    }

    pub fn chain_nonce(&self) -> u64 {
        self.chain_nonce
    }

    pub fn is_empty(&self) -> bool {
        self.executable.is_empty() && self.future.is_empty()
    }

    pub fn len(&self) -> usize {
        self.executable.len() + self.future.len()
    }

    pub fn executable_in_order(&self) -> impl Iterator<Item = &Arc<MempoolEntry>> {
        self.executable.values()
    }

    fn next_exec(&self) -> u64 {
        match self.executable.keys().next_back() {
            Some(&max) => max + 1,
            None => self.chain_nonce + 1,
        }
    }

    /// Returns `true` iff `candidate_fee_wei` clears the 110%-of-old RBF bump requirement against
    /// `old_fee_wei`. Both are the raw `Wei` magnitude (not fee-per-byte): same nonce implies the
    /// same encoded shape is being replaced, so comparing raw fee is equivalent and avoids the
    /// lossy `f64` fee-per-byte conversion.
    fn clears_rbf_bump(old_fee_wei: primitive_types::U256, candidate_fee_wei: primitive_types::U256) -> bool {
        if candidate_fee_wei <= old_fee_wei {
            return false;
        }
        let required = old_fee_wei.full_mul(primitive_types::U256::from(RBF_BUMP_NUM))
            / primitive_types::U512::from(RBF_BUMP_DEN);
        primitive_types::U512::from(candidate_fee_wei) >= required
    }

    pub fn add(&mut self, entry: Arc<MempoolEntry>, max_nonce_gap: u64) -> Result<AddResult, SenderPoolError> {
        let n = entry.tx().nonce().expect("SenderPool entries always carry a sender-bearing tx with a nonce");

        if n <= self.chain_nonce {
            return Err(SenderPoolError::Stale);
        }

        let was_executable = self.executable.contains_key(&n);
        let mut removed = Vec::new();
        if let Some(existing) = self.executable.get(&n).or_else(|| self.future.get(&n)) {
            if !Self::clears_rbf_bump(existing.tx().fee().0, entry.tx().fee().0) {
                return Err(SenderPoolError::FailedFeeTooLow);
            }
            let old = if was_executable { self.executable.remove(&n) } else { self.future.remove(&n) };
            removed.extend(old);
        }

        // Replacing an already-executable slot preserves contiguity trivially: the new entry
        // takes exactly the nonce the old one held, so there is nothing to promote and no gap
        // check to run (the slot was admissible before, it still is).
        if was_executable {
            self.executable.insert(n, entry.clone());
            return Ok(AddResult { outcome: AddOutcome::Added, added: vec![entry], removed });
        }

        let next_exec = self.next_exec();
        if n == next_exec {
            self.executable.insert(n, entry.clone());
            let mut added = vec![entry];
            let mut cursor = next_exec + 1;
            while let Some(promoted) = self.future.remove(&cursor) {
                self.executable.insert(cursor, promoted.clone());
                added.push(promoted);
                cursor += 1;
            }
            Ok(AddResult { outcome: AddOutcome::Added, added, removed })
        } else if n > next_exec {
            if n > self.chain_nonce + max_nonce_gap {
                return Err(SenderPoolError::NonceTooFarFuture { max_gap: max_nonce_gap });
            }
            self.future.insert(n, entry);
            Ok(AddResult { outcome: AddOutcome::AddedFuture, added: Vec::new(), removed })
        } else {
            Err(SenderPoolError::Stale)
        }
    }

    /// Removes every entry with nonce `<= new_chain_nonce`, advances `chain_nonce`, and promotes
    /// any now-contiguous `future` entries into `executable`. Returns `(evicted_stale, promoted)`.
    pub fn update_chain_nonce_and_promote(&mut self, new_chain_nonce: u64) -> (Vec<Arc<MempoolEntry>>, Vec<Arc<MempoolEntry>>) {
        let mut evicted_stale = Vec::new();
        let stale_exec: Vec<u64> = self.executable.range(..=new_chain_nonce).map(|(k, _)| *k).collect();
        for k in stale_exec {
            if let Some(v) = self.executable.remove(&k) {
                evicted_stale.push(v);
            }
        }
        let stale_future: Vec<u64> = self.future.range(..=new_chain_nonce).map(|(k, _)| *k).collect();
        for k in stale_future {
            if let Some(v) = self.future.remove(&k) {
                evicted_stale.push(v);
            }
        }

        self.chain_nonce = new_chain_nonce;

        let mut promoted = Vec::new();
        let mut cursor = self.next_exec();
        while let Some(entry) = self.future.remove(&cursor) {
            self.executable.insert(cursor, entry.clone());
            promoted.push(entry);
            cursor += 1;
        }

        (evicted_stale, promoted)
    }

    /// Removes a set of nonces from both maps unconditionally, e.g. on an explicit
    /// `removeTransaction` call. Returns whichever entries were actually present.
    pub fn remove(&mut self, nonces: &std::collections::HashSet<u64>) -> Vec<Arc<MempoolEntry>> {
        let mut removed = Vec::new();
        for n in nonces {
            if let Some(v) = self.executable.remove(n) {
                removed.push(v);
            }
            if let Some(v) = self.future.remove(n) {
                removed.push(v);
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u256(v: u64) -> primitive_types::U256 {
        primitive_types::U256::from(v)
    }

    #[test]
    fn rbf_bump_boundaries() {
        assert!(SenderPool::clears_rbf_bump(u256(1000), u256(1100)));
        assert!(!SenderPool::clears_rbf_bump(u256(1000), u256(1099)));
        assert!(!SenderPool::clears_rbf_bump(u256(1000), u256(1000)));
    }
}
