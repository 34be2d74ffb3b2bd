/// Supplies the block hash at a given height, used to derive the seed for the epoch that starts
/// right after it. Implemented by the chain-query collaborator in the consuming crate; kept as a
/// trait here so the hashing crate has no dependency on block/chain types.
pub trait SeedProvider {
    /// Returns the 32-byte hash of the block at `height`, or `None` if it is not available
    /// (not yet synced, pruned, etc).
    fn block_hash_at(&self, height: u64) -> Option<[u8; 32]>;
}

/// A `SeedProvider` that never has anything, used when the caller already knows the seed (e.g.
/// batch header verification supplies `batch_seed_hashes` directly) and only needs the hasher's
/// epoch bookkeeping, not a chain lookup.
pub struct NoopSeedProvider;

impl SeedProvider for NoopSeedProvider {
    fn block_hash_at(&self, _height: u64) -> Option<[u8; 32]> {
        None
    }
}

/// A `SeedProvider` that first consults a supplied height->hash map (e.g. a validation batch's
/// `batch_seed_hashes`) before falling back to a wrapped provider (e.g. the chain store).
pub struct PreferringSeedProvider<'a, P> {
    preferred: &'a std::collections::HashMap<u64, [u8; 32]>,
    fallback: &'a P,
}

impl<'a, P: SeedProvider> PreferringSeedProvider<'a, P> {
    pub fn new(preferred: &'a std::collections::HashMap<u64, [u8; 32]>, fallback: &'a P) -> Self {
        Self { preferred, fallback }
    }
}

impl<'a, P: SeedProvider> SeedProvider for PreferringSeedProvider<'a, P> {
    fn block_hash_at(&self, height: u64) -> Option<[u8; 32]> {
        self.preferred.get(&height).copied().or_else(|| self.fallback.block_hash_at(height))
    }
}

/// Computes the epoch number a given height belongs to.
pub fn epoch_of(height: u64, epoch_length: u64) -> u64 {
    height / epoch_length
}

/// Computes the seed for `epoch`: the fixed genesis key for epoch 0, otherwise the hash of the
/// first block of the *previous* epoch.
pub fn seed_for_epoch<P: SeedProvider>(
    epoch: u64,
    epoch_length: u64,
    genesis_seed: &[u8; 32],
    provider: &P,
) -> Result<[u8; 32], crate::error::HasherError> {
    if epoch == 0 {
        return Ok(*genesis_seed);
    }
    let anchor_height = (epoch - 1) * epoch_length;
    provider
        .block_hash_at(anchor_height)
        .ok_or(crate::error::HasherError::SeedUnavailable { anchor_height })
}

/// Derives the fixed genesis seed from a well-known ASCII key, matching the convention of
/// hashing a human-readable domain string to get deterministic, non-adversarial key material.
pub fn genesis_seed_from_key(key: &str) -> [u8; 32] {
    use digest_genesis::Sha3_256Hasher;
    Sha3_256Hasher::digest(key.as_bytes())
}

/// Minimal local SHA3-256 wrapper so the hashing crate doesn't need a full digest dependency
/// tree just for a one-shot genesis constant; delegates to `sha3` when the `genesis-key` feature
/// consumer pulls it in. Kept tiny and explicit rather than generic over `Digest`.
mod digest_genesis {
    pub struct Sha3_256Hasher;
    impl Sha3_256Hasher {
        pub fn digest(input: &[u8]) -> [u8; 32] {
            use sha3::{Digest, Sha3_256};
            let mut hasher = Sha3_256::new();
            hasher.update(input);
            let out = hasher.finalize();
            let mut buf = [0u8; 32];
            buf.copy_from_slice(&out);
            buf
        }
    }
}
