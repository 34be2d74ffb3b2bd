use randomx_rs::{RandomXCache, RandomXDataset, RandomXFlag};

use crate::{
    error::HasherError,
    flags::{large_pages_supported, light_flags, MiningAllocAttempt},
};

/// `RandomXCache`/`RandomXDataset` are not `Send`/`Sync` in the upstream crate binding, even
/// though the underlying C library makes no thread-local assumptions and is safe to share once
/// initialized. We only ever touch these after construction completes, read-only, from any
/// number of threads concurrently, so the manual impls are sound.
pub(crate) struct RxCache(pub RandomXCache);
unsafe impl Send for RxCache {}
unsafe impl Sync for RxCache {}

pub(crate) struct RxDataset(pub RandomXDataset);
unsafe impl Send for RxDataset {}
unsafe impl Sync for RxDataset {}

pub(crate) struct Allocation {
    pub cache: RxCache,
    pub dataset: Option<RxDataset>,
    pub flags: RandomXFlag,
}

/// Allocate a cache (and, if `mining_enabled`, a full dataset) for `seed`. Tries `LARGE_PAGES`
/// first (skipped on macOS, where the flag is unsupported), then falls back to the standard
/// allocator path. Any partially constructed cache from a failed attempt is dropped immediately
/// by virtue of normal Rust ownership -- there is no manual free path to forget.
pub(crate) fn allocate(seed: &[u8], mining_enabled: bool) -> Result<Allocation, HasherError> {
    if mining_enabled {
        if large_pages_supported() {
            match try_allocate(seed, MiningAllocAttempt::LargePages, true) {
                Ok(alloc) => return Ok(alloc),
                Err(e) => tracing::warn!(error = %e, "large-pages RandomX allocation failed, retrying without large pages"),
            }
        }
        match try_allocate(seed, MiningAllocAttempt::Standard, true) {
            Ok(alloc) => Ok(alloc),
            Err(e) => Err(HasherError::AllocationFailed(e.to_string())),
        }
    } else {
        // Mining disabled: skip dataset allocation entirely, cache only.
        let flags = light_flags();
        let cache = RandomXCache::new(flags, seed).map_err(|e| HasherError::AllocationFailed(e.to_string()))?;
        Ok(Allocation { cache: RxCache(cache), dataset: None, flags })
    }
}

fn try_allocate(
    seed: &[u8],
    attempt: MiningAllocAttempt,
    with_dataset: bool,
) -> Result<Allocation, randomx_rs::RandomXError> {
    let flags = crate::flags::mining_flags(attempt);
    let cache = RandomXCache::new(flags, seed)?;
    let dataset = if with_dataset {
        Some(RxDataset(RandomXDataset::new(flags, cache.clone(), 0)?))
    } else {
        None
    };
    Ok(Allocation { cache: RxCache(cache), dataset, flags })
}

/// Allocate a light (cache-only, no `FULL_MEM`, no `LARGE_PAGES`) cache for cross-epoch
/// verification. Used by the epoch-VM cache, never by the active-epoch mining path.
pub(crate) fn allocate_light(seed: &[u8]) -> Result<RxCache, HasherError> {
    let flags = light_flags();
    let cache = RandomXCache::new(flags, seed).map_err(|e| HasherError::AllocationFailed(e.to_string()))?;
    Ok(RxCache(cache))
}
