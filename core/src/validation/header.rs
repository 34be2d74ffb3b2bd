use std::collections::HashMap;

use primitive_types::U256;
use warden_hashing::{EpochKeyedHasher, PreferringSeedProvider, SeedProvider};

use super::{
    error::{ValidationError, ValidationErrorKind as Kind},
    tx::TxValidator,
};
use crate::{
    collab::{ChainQuery, CheckpointRegistry},
    difficulty::{difficulty_to_target, DifficultyEngine},
    model::{merkle::merkle_root, Block, BlockHeader, NetworkParamsState},
};

/// Generous ceiling on a header's canonical encoding; headers are fixed-shape so this mostly
/// guards against a malformed/adversarial decode rather than natural growth.
pub const MAX_HEADER_SIZE: usize = 1024;
pub const MAX_BLOCK_SIZE_IN_BYTES: usize = 4 * 1024 * 1024;

/// Adapts a `ChainQuery` collaborator to the hashing crate's `SeedProvider` so the validator
/// doesn't have to thread a second, hashing-crate-specific trait through its callers.
struct ChainQuerySeedProvider<'a, C>(&'a C);

impl<'a, C: ChainQuery> SeedProvider for ChainQuerySeedProvider<'a, C> {
    fn block_hash_at(&self, height: u64) -> Option<[u8; 32]> {
        self.0.block_hash_by_height(height).map(|h| *h.as_bytes())
    }
}

/// How far into the future a header's timestamp may sit relative to local wall-clock time,
/// before it's rejected as implausible. Scales with the network's target block time; the exact
/// multiple is implementation-defined by spec, required only to be monotonic in target time.
fn dynamic_drift_ms(target_mining_time_ms: u64) -> u64 {
    (target_mining_time_ms * 6).max(60_000)
}

pub struct BlockValidator<'a, C> {
    hasher: &'a EpochKeyedHasher,
    chain: &'a C,
    checkpoints: &'a dyn CheckpointRegistry,
}

impl<'a, C: ChainQuery> BlockValidator<'a, C> {
    pub fn new(hasher: &'a EpochKeyedHasher, chain: &'a C, checkpoints: &'a dyn CheckpointRegistry) -> Self {
        Self { hasher, chain, checkpoints }
    }

    /// Header PoW and checkpoint checks, independent of any particular parent.
    pub fn validate_header(&self, header: &BlockHeader, batch_seed_hashes: &HashMap<u64, [u8; 32]>) -> Result<(), ValidationError> {
        if header.size() > MAX_HEADER_SIZE {
            return Err(ValidationError::new(
                Kind::HeaderTooLarge,
                format!("header size {} exceeds MAX_HEADER_SIZE {}", header.size(), MAX_HEADER_SIZE),
            ));
        }

        if !self.checkpoints.verify(header.height(), &header.hash()) {
            return Err(ValidationError::new(
                Kind::CheckpointMismatch,
                format!("header hash at height {} does not match the pinned checkpoint", header.height()),
            ));
        }

        let fallback = ChainQuerySeedProvider(self.chain);
        let provider = PreferringSeedProvider::new(batch_seed_hashes, &fallback);
        let vm = self
            .hasher
            .light_vm_for_verification(header.height(), &provider)
            .map_err(|e| ValidationError::new(Kind::PowFailed, format!("could not acquire verification VM: {e}")))?;

        let pow_input = header
            .pow_input()
            .map_err(|e| ValidationError::new(Kind::PowFailed, format!("could not encode pow_input: {e}")))?;
        let digest = vm
            .hash(&pow_input)
            .map_err(|e| ValidationError::new(Kind::PowFailed, format!("hash computation failed: {e}")))?;

        let hash_value = U256::from_big_endian(&digest);
        let target = difficulty_to_target(header.difficulty());
        if hash_value > target {
            return Err(ValidationError::new(Kind::PowFailed, "PoW hash exceeds target"));
        }

        Ok(())
    }

    /// Parent-linked contextual checks: chain of custody, monotonic time, and the difficulty
    /// retarget.
    pub fn validate_header_context(
        &self,
        child: &BlockHeader,
        parent: &BlockHeader,
        params: &NetworkParamsState,
        now_ms: u64,
    ) -> Result<(), ValidationError> {
        if child.previous_hash() != parent.hash() {
            return Err(ValidationError::new(Kind::BadParentLink, "child.previousHash != parent.hash"));
        }
        if child.height() != parent.height() + 1 {
            return Err(ValidationError::new(Kind::BadHeight, "child.height != parent.height + 1"));
        }
        if child.timestamp() <= parent.timestamp() {
            return Err(ValidationError::new(Kind::NonIncreasingTimestamp, "child.timestamp <= parent.timestamp"));
        }
        let drift = dynamic_drift_ms(params.target_mining_time_ms);
        if child.timestamp() > now_ms + drift {
            return Err(ValidationError::new(Kind::TimestampTooFarInFuture, "child.timestamp exceeds allowed future drift"));
        }

        let engine = DifficultyEngine::new(self.chain);
        let expected = engine.next_difficulty(parent, params);
        if child.difficulty() != expected {
            return Err(ValidationError::new(
                Kind::BadDifficulty,
                format!("child.difficulty {} != expected {}", child.difficulty(), expected),
            ));
        }

        Ok(())
    }

    /// Size, merkle root, and per-transaction stateless checks. `validate_pow` lets callers skip
    /// header PoW re-verification when it was already done upstream (e.g. during sync, where
    /// `validate_header` ran against a batch before full bodies were downloaded).
    pub fn validate_full_block(
        &self,
        block: &Block,
        batch_seed_hashes: &HashMap<u64, [u8; 32]>,
        validate_pow: bool,
    ) -> Result<(), ValidationError> {
        if validate_pow {
            self.validate_header(&block.header, batch_seed_hashes)?;
        }

        let size = block
            .size()
            .map_err(|e| ValidationError::new(Kind::BlockTooLarge, format!("could not compute block size: {e}")))?;
        if size > MAX_BLOCK_SIZE_IN_BYTES {
            return Err(ValidationError::new(
                Kind::BlockTooLarge,
                format!("block size {size} exceeds MAX_BLOCK_SIZE_IN_BYTES {MAX_BLOCK_SIZE_IN_BYTES}"),
            ));
        }

        let tx_hashes: Vec<_> = block.txs.iter().map(|t| t.hash()).collect();
        let computed_root = merkle_root(&tx_hashes);
        if computed_root != block.header.wire().tx_root_hash {
            return Err(ValidationError::new(Kind::MerkleRootMismatch, "computed merkle root does not match txRootHash"));
        }

        // Independent, side-effect-free per-tx checks: safe to run concurrently, but any single
        // failure must fail the whole block, so we short-circuit on the first one found.
        for tx in &block.txs {
            TxValidator::validate_stateless(tx)?;
        }

        Ok(())
    }
}
