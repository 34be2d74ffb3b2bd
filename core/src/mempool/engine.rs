use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::config::MempoolConfig;
use super::entry::MempoolEntry;
use super::error::MempoolError;
use super::events::{AddReason, MempoolEvent, MempoolTxAddEvent, MempoolTxRemoveEvent, RemoveReason};
use super::fee_index::FeeIndex;
use super::governance::GovernanceSets;
use super::sender_pool::{AddOutcome as PoolAddOutcome, SenderPool, SenderPoolError};
use crate::collab::{ChainQuery, EventBus, WorldState};
use crate::model::{Address, Hash, Tx};
use crate::validation::mempool_validator::MempoolValidator;

/// Read-only snapshot of pool size, exposed for the (out-of-scope) metrics registry collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MempoolStats {
    pub tx_count: usize,
    pub total_bytes: usize,
    pub system_tx_count: usize,
}

/// Everything `MempoolEngine` mutates as one unit on every structural change. Bundled behind a
/// single lock (rather than the several independent locks a lock-free reference implementation
/// might use) because `by_hash`, both fee indexes, and the governance sets must always agree with
/// each other -- splitting them into separate locks would only buy parallelism no caller here
/// needs, at the cost of having to reason about cross-lock invariants.
struct Shared {
    by_hash: HashMap<Hash, Arc<MempoolEntry>>,
    fee_index_all: FeeIndex,
    fee_index_executable: FeeIndex,
    system_txs: VecDeque<Arc<MempoolEntry>>,
    governance: GovernanceSets,
}

impl Shared {
    fn new() -> Self {
        Self {
            by_hash: HashMap::new(),
            fee_index_all: FeeIndex::new(),
            fee_index_executable: FeeIndex::new(),
            system_txs: VecDeque::new(),
            governance: GovernanceSets::new(),
        }
    }
}

/// The global mempool facade: the nonce-ordered, fee-prioritized, governance-aware pending
/// transaction store. Generic over the collaborators it consults so callers can plug in real
/// storage/chain-query implementations in production and in-memory mocks in tests.
pub struct MempoolEngine<W, C, E> {
    config: MempoolConfig,
    shared: RwLock<Shared>,
    by_sender: RwLock<HashMap<Address, Arc<Mutex<SenderPool>>>>,
    world: Arc<W>,
    chain: Arc<C>,
    events: Arc<E>,
    clock: Box<dyn Clock>,
}

impl<W: WorldState, C: ChainQuery, E: EventBus> MempoolEngine<W, C, E> {
    pub fn new(config: MempoolConfig, world: Arc<W>, chain: Arc<C>, events: Arc<E>) -> Self {
        Self::with_clock(config, world, chain, events, Box::new(SystemClock))
    }

    pub fn with_clock(config: MempoolConfig, world: Arc<W>, chain: Arc<C>, events: Arc<E>, clock: Box<dyn Clock>) -> Self {
        Self {
            config,
            shared: RwLock::new(Shared::new()),
            by_sender: RwLock::new(HashMap::new()),
            world,
            chain,
            events,
            clock,
        }
    }

    pub fn stats(&self) -> MempoolStats {
        let shared = self.shared.read();
        MempoolStats {
            tx_count: shared.by_hash.len(),
            total_bytes: shared.by_hash.values().map(|e| e.tx().size()).sum(),
            system_tx_count: shared.system_txs.len(),
        }
    }

    fn sender_pool(&self, sender: Address, chain_nonce: u64) -> Arc<Mutex<SenderPool>> {
        if let Some(pool) = self.by_sender.read().get(&sender) {
            return pool.clone();
        }
        let mut map = self.by_sender.write();
        map.entry(sender).or_insert_with(|| Arc::new(Mutex::new(SenderPool::new(sender, chain_nonce)))).clone()
    }

    /// Admits a single transaction. Mirrors `add` in spirit but is itself the batch-of-one case;
    /// `add_batch` below groups by sender for its single pass rather than calling this in a loop,
    /// since it additionally defers all event publication until after lock release.
    pub fn add(&self, tx: Tx, received_from: Option<Address>) -> Result<(), MempoolError> {
        let (added_events, removed_events) = self.admit(tx, received_from, AddReason::New, false)?;
        for ev in added_events {
            self.events.publish(MempoolEvent::Add(ev));
        }
        for ev in removed_events {
            self.events.publish(MempoolEvent::Remove(ev));
        }
        Ok(())
    }

    pub fn add_batch(&self, txs: Vec<(Tx, Option<Address>)>) -> Vec<Result<(), MempoolError>> {
        let mut results = Vec::with_capacity(txs.len());
        let mut deferred_add = Vec::new();
        let mut deferred_remove = Vec::new();
        for (tx, from) in txs {
            match self.admit(tx, from, AddReason::New, false) {
                Ok((added, removed)) => {
                    deferred_add.extend(added);
                    deferred_remove.extend(removed);
                    results.push(Ok(()));
                },
                Err(e) => results.push(Err(e)),
            }
        }
        for ev in deferred_add {
            self.events.publish(MempoolEvent::Add(ev));
        }
        for ev in deferred_remove {
            self.events.publish(MempoolEvent::Remove(ev));
        }
        results
    }

    /// Re-admits transactions from a disconnected block during a reorg, stamping
    /// `firstSeenHeight`/`firstSeenTime` from the block being unwound rather than from the
    /// current clock.
    pub fn add_back(&self, txs: Vec<Tx>, disconnected_block_time_ms: u64, disconnected_block_height: u64) {
        let mut deferred_add = Vec::new();
        let mut deferred_remove = Vec::new();
        for tx in txs {
            match self.admit_at(tx, None, AddReason::Reorg, true, disconnected_block_time_ms, disconnected_block_height) {
                Ok((added, removed)) => {
                    deferred_add.extend(added);
                    deferred_remove.extend(removed);
                },
                Err(e) => warn!(error = %e, "addBack: transaction from disconnected block was not re-admitted"),
            }
        }
        for ev in deferred_add {
            self.events.publish(MempoolEvent::Add(ev));
        }
        for ev in deferred_remove {
            self.events.publish(MempoolEvent::Remove(ev));
        }
    }

    fn admit(
        &self,
        tx: Tx,
        received_from: Option<Address>,
        reason: AddReason,
        skip_stateless: bool,
    ) -> Result<(Vec<MempoolTxAddEvent>, Vec<MempoolTxRemoveEvent>), MempoolError> {
        let now = self.clock.now_ms();
        let height = self.chain.latest_height();
        self.admit_at(tx, received_from, reason, skip_stateless, now, height)
    }

    fn admit_at(
        &self,
        tx: Tx,
        received_from: Option<Address>,
        reason: AddReason,
        skip_stateless: bool,
        first_seen_time_ms: u64,
        first_seen_height: u64,
    ) -> Result<(Vec<MempoolTxAddEvent>, Vec<MempoolTxRemoveEvent>), MempoolError> {
        {
            let shared = self.shared.read();
            let validator = MempoolValidator::new(&self.config, self.world.as_ref(), &shared.governance);
            validator.validate(&tx, skip_stateless)?;
        }

        let hash = tx.hash();
        let sender = tx.sender();
        let entry = Arc::new(MempoolEntry::new(tx, first_seen_time_ms, first_seen_height, received_from));

        let mut add_events = Vec::new();
        let mut remove_events = Vec::new();
        let mut added_as_future = false;

        {
            let mut shared = self.shared.write();
            if shared.by_hash.contains_key(&hash) {
                return Err(MempoolError::RejectedDuplicate);
            }
            shared.by_hash.insert(hash, entry.clone());
            shared.fee_index_all.insert(entry.clone());

            if let Some(sender) = sender {
                let chain_nonce = self.world.nonce(&sender);
                let pool = self.sender_pool(sender, chain_nonce);
                let mut pool = pool.lock();
                let result = match pool.add(entry.clone(), self.config.max_nonce_gap) {
                    Ok(r) => r,
                    Err(SenderPoolError::Stale) => {
                        shared.by_hash.remove(&hash);
                        shared.fee_index_all.remove_by_hash(&hash);
                        return Err(MempoolError::Stale { chain_nonce, tx_nonce: entry.tx().nonce().unwrap_or(0) });
                    },
                    Err(SenderPoolError::FailedFeeTooLow) => {
                        shared.by_hash.remove(&hash);
                        shared.fee_index_all.remove_by_hash(&hash);
                        return Err(MempoolError::RejectedRbf);
                    },
                    Err(SenderPoolError::NonceTooFarFuture { max_gap }) => {
                        shared.by_hash.remove(&hash);
                        shared.fee_index_all.remove_by_hash(&hash);
                        return Err(MempoolError::RejectedNonceTooFarFuture {
                            chain_nonce,
                            tx_nonce: entry.tx().nonce().unwrap_or(0),
                            max_gap,
                        });
                    },
                };

                for old in result.removed {
                    shared.by_hash.remove(&old.tx().hash());
                    shared.fee_index_all.remove_by_hash(&old.tx().hash());
                    shared.fee_index_executable.remove_by_hash(&old.tx().hash());
                    shared.governance.on_remove(old.tx());
                    remove_events.push(MempoolTxRemoveEvent { entry: old, reason: RemoveReason::Rbf });
                }
                for added in &result.added {
                    shared.fee_index_executable.insert(added.clone());
                }
                added_as_future = matches!(result.outcome, PoolAddOutcome::AddedFuture);
            } else {
                shared.system_txs.push_back(entry.clone());
            }

            shared.governance.on_add(entry.tx());

            if shared.by_hash.len() > self.config.max_size {
                let self_is_global_lowest = shared.fee_index_all.lowest().map(|l| l.tx().hash()) == Some(hash);
                if added_as_future || self_is_global_lowest {
                    self.remove_internal(&mut shared, &hash);
                    return Err(MempoolError::RejectedMempoolFull);
                }
                let victim_hash = shared.fee_index_all.lowest().map(|e| e.tx().hash());
                if let Some(victim_hash) = victim_hash {
                    if let Some(removed_entry) = self.remove_internal(&mut shared, &victim_hash) {
                        remove_events.push(MempoolTxRemoveEvent { entry: removed_entry, reason: RemoveReason::EvictedFull });
                    }
                }
            }
        }

        add_events.push(MempoolTxAddEvent { entry, reason });
        Ok((add_events, remove_events))
    }

    /// Internal removal used by eviction, pruning, and explicit `removeTransaction(s)`: strips an
    /// entry out of every index, its sender pool, and the governance sets. Caller already holds
    /// `shared` write-locked.
    fn remove_internal(&self, shared: &mut Shared, hash: &Hash) -> Option<Arc<MempoolEntry>> {
        let entry = shared.by_hash.remove(hash)?;
        shared.fee_index_all.remove_by_hash(hash);
        shared.fee_index_executable.remove_by_hash(hash);
        shared.governance.on_remove(entry.tx());

        if let Some(sender) = entry.tx().sender() {
            if let Some(pool) = self.by_sender.read().get(&sender).cloned() {
                let nonce = entry.tx().nonce().unwrap_or(0);
                pool.lock().remove(&HashSet::from([nonce]));
            }
        } else {
            shared.system_txs.retain(|e| e.tx().hash() != *hash);
        }

        Some(entry)
    }

    pub fn remove_transaction(&self, hash: &Hash) -> Option<()> {
        let mut shared = self.shared.write();
        let removed = self.remove_internal(&mut shared, hash)?;
        drop(shared);
        self.events.publish(MempoolEvent::Remove(MempoolTxRemoveEvent { entry: removed, reason: RemoveReason::Invalid }));
        Some(())
    }

    pub fn remove_transactions(&self, hashes: &[Hash]) {
        let mut removed = Vec::new();
        {
            let mut shared = self.shared.write();
            for hash in hashes {
                if let Some(e) = self.remove_internal(&mut shared, hash) {
                    removed.push(e);
                }
            }
        }
        for entry in removed {
            self.events.publish(MempoolEvent::Remove(MempoolTxRemoveEvent { entry, reason: RemoveReason::Invalid }));
        }
    }

    /// Returns a point-in-time snapshot iterator: all system transactions (FIFO) followed by the
    /// executable user-pool entries in fee order. Later mutations are not observed.
    pub fn get_executable_iterator(&self) -> impl Iterator<Item = Arc<MempoolEntry>> {
        let shared = self.shared.read();
        let system: Vec<_> = shared.system_txs.iter().cloned().collect();
        let executable = shared.fee_index_executable.snapshot_in_order();
        system.into_iter().chain(executable)
    }

    /// Processes a newly-connected block: evicts its transactions from the pool, advances every
    /// affected sender's chain nonce, promotes newly-contiguous future transactions, and evicts
    /// anything that became stale as a result.
    pub fn process_new_block(&self, mined: &[Hash]) {
        let mut affected_senders = HashSet::new();
        let mut remove_events = Vec::new();

        {
            let mut shared = self.shared.write();
            for hash in mined {
                if let Some(entry) = shared.by_hash.get(hash).cloned() {
                    if let Some(sender) = entry.tx().sender() {
                        affected_senders.insert(sender);
                    }
                    shared.by_hash.remove(hash);
                    shared.fee_index_all.remove_by_hash(hash);
                    shared.fee_index_executable.remove_by_hash(hash);
                    shared.governance.on_remove(entry.tx());
                    if entry.tx().sender().is_none() {
                        shared.system_txs.retain(|e| e.tx().hash() != *hash);
                    }
                    remove_events.push(MempoolTxRemoveEvent { entry, reason: RemoveReason::Mined });
                }
            }

            for sender in &affected_senders {
                let Some(pool) = self.by_sender.read().get(sender).cloned() else { continue };
                let new_chain_nonce = self.world.nonce(sender);
                let (evicted_stale, promoted) = pool.lock().update_chain_nonce_and_promote(new_chain_nonce);

                for e in &promoted {
                    shared.fee_index_executable.insert(e.clone());
                }
                for e in evicted_stale {
                    let hash = e.tx().hash();
                    shared.by_hash.remove(&hash);
                    shared.fee_index_all.remove_by_hash(&hash);
                    shared.fee_index_executable.remove_by_hash(&hash);
                    shared.governance.on_remove(e.tx());
                    remove_events.push(MempoolTxRemoveEvent { entry: e, reason: RemoveReason::StaleNonce });
                }

                if pool.lock().is_empty() {
                    self.by_sender.write().remove(sender);
                }
            }
        }

        debug!(count = mined.len(), "processed new block, removing mined transactions from mempool");
        for ev in remove_events {
            self.events.publish(MempoolEvent::Remove(ev));
        }
    }

    /// Evicts every entry first seen before `cutoff_ms`. Scheduled by the caller every
    /// `config.prune_interval_ms`; `cutoff_ms = now - tx_expire_time_ms`.
    pub fn prune(&self, cutoff_ms: u64) {
        let mut expired_hashes = Vec::new();
        {
            let shared = self.shared.read();
            for (hash, entry) in shared.by_hash.iter() {
                if entry.first_seen_time_ms() < cutoff_ms {
                    expired_hashes.push(*hash);
                }
            }
        }

        let mut removed = Vec::new();
        {
            let mut shared = self.shared.write();
            for hash in &expired_hashes {
                if let Some(e) = self.remove_internal(&mut shared, hash) {
                    removed.push(e);
                }
            }
        }

        if !removed.is_empty() {
            info!(count = removed.len(), "pruned expired mempool transactions");
        }
        for entry in removed {
            self.events.publish(MempoolEvent::Remove(MempoolTxRemoveEvent { entry, reason: RemoveReason::Expired }));
        }
    }

    pub fn prune_now(&self) {
        let now = self.clock.now_ms();
        let cutoff = now.saturating_sub(self.config.tx_expire_time_ms());
        self.prune(cutoff);
    }

    pub fn clear(&self) {
        let mut shared = self.shared.write();
        *shared = Shared::new();
        self.by_sender.write().clear();
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.shared.read().by_hash.contains_key(hash)
    }
}
