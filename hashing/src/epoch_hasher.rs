use std::{
    sync::{atomic::{AtomicBool, Ordering}, Arc},
    time::Duration,
};

use lru::LruCache;
use parking_lot::{Mutex, RwLock};
use randomx_rs::RandomXFlag;

use crate::{
    cache_dataset::{self, RxCache, RxDataset},
    error::HasherError,
    outstanding::Outstanding,
    seed::{self, SeedProvider},
    vm::VmHandle,
};

/// Bounded wait for outstanding VMs to drain before an epoch swap proceeds. Exceeding this does
/// not abort the swap (we never risk a crash over a transient doubling of resident memory); it
/// only changes whether we log a warning that two generations may be resident briefly.
const SWAP_WAIT_TIMEOUT: Duration = Duration::from_secs(60);

/// How many light (cache-only) epoch generations to keep warm for cross-epoch verification.
const LIGHT_CACHE_CAPACITY: usize = 3;

struct ActiveEpoch {
    seed: [u8; 32],
    cache: Arc<RxCache>,
    dataset: Option<Arc<RxDataset>>,
    flags: RandomXFlag,
    outstanding: Arc<Outstanding>,
}

struct LightEntry {
    cache: Arc<RxCache>,
    outstanding: Arc<Outstanding>,
}

/// Lifecycle manager for RandomX caches/datasets keyed by epoch seed. Hands out reference-counted
/// light or mining VM handles, and performs the seed swap required whenever chain height crosses
/// into a new epoch.
pub struct EpochKeyedHasher {
    epoch_length: u64,
    genesis_seed: [u8; 32],
    mining_enabled: bool,
    active: RwLock<Option<ActiveEpoch>>,
    light_cache: Mutex<LruCache<[u8; 32], Arc<LightEntry>>>,
    shutting_down: AtomicBool,
}

impl EpochKeyedHasher {
    pub fn new(epoch_length: u64, genesis_seed: [u8; 32], mining_enabled: bool) -> Self {
        Self {
            epoch_length,
            genesis_seed,
            mining_enabled,
            active: RwLock::new(None),
            light_cache: Mutex::new(LruCache::new(std::num::NonZeroUsize::new(LIGHT_CACHE_CAPACITY).unwrap())),
            shutting_down: AtomicBool::new(false),
        }
    }

    fn check_alive(&self) -> Result<(), HasherError> {
        if self.shutting_down.load(Ordering::Acquire) {
            return Err(HasherError::ShuttingDown);
        }
        Ok(())
    }

    /// Ensures the active cache/dataset generation matches the epoch that `height` belongs to,
    /// swapping it if necessary. Fast path only takes a read lock when the seed already matches.
    pub fn ensure_initialized_for_height<P: SeedProvider>(&self, height: u64, seed_provider: &P) -> Result<(), HasherError> {
        self.check_alive()?;
        let epoch = seed::epoch_of(height, self.epoch_length);
        let required_seed = seed::seed_for_epoch(epoch, self.epoch_length, &self.genesis_seed, seed_provider)?;

        {
            let read = self.active.read();
            if let Some(active) = read.as_ref() {
                if active.seed == required_seed {
                    return Ok(());
                }
            }
        }

        let mut write = self.active.write();
        self.check_alive()?;
        let needs_swap = match write.as_ref() {
            Some(active) => active.seed != required_seed,
            None => true,
        };
        if !needs_swap {
            return Ok(());
        }

        tracing::info!(epoch, height, "epoch seed changed, swapping RandomX cache/dataset");
        if let Some(old) = write.as_ref() {
            if !old.outstanding.wait_for_zero(SWAP_WAIT_TIMEOUT) {
                tracing::error!(
                    epoch,
                    "timed out after {:?} waiting for outstanding RandomX VMs to drop during epoch swap; \
                     proceeding without forcing a free -- refusing to release memory a live VM might still \
                     be reading from is safer than risking a crash",
                    SWAP_WAIT_TIMEOUT
                );
            }
        }

        let alloc = cache_dataset::allocate(&required_seed, self.mining_enabled)?;
        *write = Some(ActiveEpoch {
            seed: required_seed,
            cache: Arc::new(alloc.cache),
            dataset: alloc.dataset.map(Arc::new),
            flags: alloc.flags,
            outstanding: Outstanding::new(),
        });
        Ok(())
    }

    /// A VM suitable for mining new blocks at the currently active epoch. Requires a dataset to
    /// have been allocated, which only happens when mining is enabled.
    pub fn create_mining_vm(&self) -> Result<VmHandle, HasherError> {
        self.check_alive()?;
        let read = self.active.read();
        let active = read.as_ref().ok_or(HasherError::NotInitialized)?;
        let dataset = active
            .dataset
            .clone()
            .ok_or_else(|| HasherError::AllocationFailed("mining disabled: no dataset allocated".to_string()))?;
        VmHandle::new_mining(active.cache.clone(), dataset, active.flags, &active.outstanding)
    }

    /// A cache-only VM for verifying PoW at `height`. If `height`'s epoch matches the active
    /// generation, borrows the active cache directly; otherwise consults (and, on miss,
    /// populates) the bounded epoch-VM cache for older epochs still being synced.
    pub fn light_vm_for_verification<P: SeedProvider>(&self, height: u64, seed_provider: &P) -> Result<VmHandle, HasherError> {
        self.check_alive()?;
        let epoch = seed::epoch_of(height, self.epoch_length);
        let required_seed = seed::seed_for_epoch(epoch, self.epoch_length, &self.genesis_seed, seed_provider)?;

        {
            let read = self.active.read();
            if let Some(active) = read.as_ref() {
                if active.seed == required_seed {
                    return VmHandle::new_light(active.cache.clone(), crate::flags::light_flags(), &active.outstanding);
                }
            }
        }

        self.light_vm_from_epoch_cache(required_seed)
    }

    fn light_vm_from_epoch_cache(&self, seed: [u8; 32]) -> Result<VmHandle, HasherError> {
        let mut cache = self.light_cache.lock();
        if let Some(entry) = cache.get(&seed) {
            let entry = entry.clone();
            drop(cache);
            return VmHandle::new_light(entry.cache.clone(), crate::flags::light_flags(), &entry.outstanding);
        }
        drop(cache);

        let rx_cache = Arc::new(cache_dataset::allocate_light(&seed)?);
        let entry = Arc::new(LightEntry { cache: rx_cache, outstanding: Outstanding::new() });

        let mut cache = self.light_cache.lock();
        // Another thread may have raced us to populate the same seed; prefer the existing entry
        // so we don't orphan VM handles across two distinct cache allocations for one seed.
        let entry = cache.get_or_insert(seed, || entry.clone()).clone();
        if cache.len() > LIGHT_CACHE_CAPACITY {
            cache.pop_lru();
        }
        drop(cache);

        VmHandle::new_light(entry.cache.clone(), crate::flags::light_flags(), &entry.outstanding)
    }

    /// Signals shutdown: no further VMs are handed out. If VMs handed out before the call are
    /// still outstanding after a bounded wait, the active cache/dataset is left in place rather
    /// than forcibly reclaimed -- the process is expected to exit shortly after, so leaking here
    /// is strictly preferable to a use-after-free.
    pub fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::Release);
        let write = self.active.write();
        if let Some(active) = write.as_ref() {
            if !active.outstanding.wait_for_zero(SWAP_WAIT_TIMEOUT) {
                tracing::warn!("shutting down with outstanding RandomX VMs still live; native memory will not be released");
            }
        }
    }
}
