use std::sync::Arc;

use randomx_rs::{RandomXFlag, RandomXVM};

use crate::{
    cache_dataset::{RxCache, RxDataset},
    error::HasherError,
    outstanding::{Outstanding, OutstandingExt, OutstandingGuard},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmKind {
    /// Cache + dataset, used only to mine new blocks.
    Mining,
    /// Cache only, used to verify PoW on headers.
    Light,
}

struct RxVm(RandomXVM);
// Safety: see the justification on `RxCache`/`RxDataset` in `cache_dataset.rs`; RandomX VMs are
// safe to call `calculate_hash` on concurrently from any thread once constructed.
unsafe impl Send for RxVm {}
unsafe impl Sync for RxVm {}

/// A handle to a constructed RandomX VM. Holds the cache/dataset it was built from alive via
/// `Arc` for its own lifetime, and increments the owning generation's outstanding-VM counter for
/// as long as it lives; an epoch swap will not consider the generation's memory free for
/// reclamation accounting until every handle referencing it has dropped.
pub struct VmHandle {
    vm: RxVm,
    kind: VmKind,
    _cache: Arc<RxCache>,
    _dataset: Option<Arc<RxDataset>>,
    _guard: OutstandingGuard,
}

impl VmHandle {
    pub(crate) fn new_mining(
        cache: Arc<RxCache>,
        dataset: Arc<RxDataset>,
        flags: RandomXFlag,
        outstanding: &Arc<Outstanding>,
    ) -> Result<Self, HasherError> {
        let guard = outstanding.acquire_guard();
        let vm = RandomXVM::new(flags, Some(cache.0.clone()), Some(dataset.0.clone()))?;
        Ok(Self {
            vm: RxVm(vm),
            kind: VmKind::Mining,
            _cache: cache,
            _dataset: Some(dataset),
            _guard: guard,
        })
    }

    pub(crate) fn new_light(
        cache: Arc<RxCache>,
        flags: RandomXFlag,
        outstanding: &Arc<Outstanding>,
    ) -> Result<Self, HasherError> {
        let guard = outstanding.acquire_guard();
        let vm = RandomXVM::new(flags, Some(cache.0.clone()), None)?;
        Ok(Self {
            vm: RxVm(vm),
            kind: VmKind::Light,
            _cache: cache,
            _dataset: None,
            _guard: guard,
        })
    }

    pub fn kind(&self) -> VmKind {
        self.kind
    }

    /// Hash `input`, returning the big-endian 32-byte RandomX digest.
    pub fn hash(&self, input: &[u8]) -> Result<[u8; 32], HasherError> {
        let out = self.vm.0.calculate_hash(input)?;
        let mut buf = [0u8; 32];
        let n = out.len().min(32);
        buf[..n].copy_from_slice(&out[..n]);
        Ok(buf)
    }
}
