use randomx_rs::RandomXFlag;

/// Whether the current platform supports `FLAG_LARGE_PAGES`. macOS does not expose the
/// hugetlb-style API RandomX large pages rely on, so the allocator skips straight to the
/// standard path there rather than burning a doomed allocation attempt every epoch swap.
pub fn large_pages_supported() -> bool {
    !cfg!(target_os = "macos")
}

/// Build the flag set for a mining VM (cache + dataset), trying the richest combination first.
/// Callers retry with progressively weaker flags on allocation failure.
pub fn mining_flags(attempt: MiningAllocAttempt) -> RandomXFlag {
    let mut flags = RandomXFlag::get_recommended_flags() | RandomXFlag::FLAG_FULL_MEM;
    if attempt == MiningAllocAttempt::LargePages && large_pages_supported() {
        flags |= RandomXFlag::FLAG_LARGE_PAGES;
    }
    flags
}

/// Flags for a light (cache-only, verification) VM. Never includes FULL_MEM: a light VM must
/// never imply a dataset allocation regardless of the mining-enabled setting.
pub fn light_flags() -> RandomXFlag {
    RandomXFlag::get_recommended_flags()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiningAllocAttempt {
    LargePages,
    Standard,
}
