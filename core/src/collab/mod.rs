//! Trait interfaces for the systems the validation/mempool core consumes (storage, chain query,
//! checkpoints, event delivery) but does not own. Concrete implementations live outside this
//! crate (RocksDB-backed storage, the P2P reputation system, etc) except for `BroadcastEventBus`,
//! which is simple and in-process enough to ship here.

mod event_bus;
#[cfg(any(test, feature = "test-support"))]
pub mod mock;

pub use event_bus::BroadcastEventBus;

use crate::model::{Address, BlockHeader, Hash, NetworkParamsState};

/// A chain-tip-consistent read snapshot of account/token/governance state.
pub trait WorldState: Send + Sync {
    fn nonce(&self, addr: &Address) -> u64;
    fn balance(&self, addr: &Address, token: &Address) -> primitive_types::U256;
    fn token(&self, addr: &Address) -> Option<TokenInfo>;
    fn authority(&self, addr: &Address) -> bool;
    fn address_alias(&self, alias: &str) -> Option<Address>;
    fn bip(&self, hash: &Hash) -> Option<BipState>;
    fn params(&self) -> NetworkParamsState;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub exists: bool,
    pub user_burnable: bool,
    pub max_supply: Option<primitive_types::U256>,
    pub current_supply: primitive_types::U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BipStatus {
    Pending,
    Approved,
    Rejected,
    Executed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BipState {
    pub status: BipStatus,
    pub voters: std::collections::HashSet<Address>,
}

/// Read access to stored, already-validated chain history.
pub trait ChainQuery: Send + Sync {
    fn latest_block_header(&self) -> Option<BlockHeader>;
    fn latest_height(&self) -> u64;
    fn block_header_at(&self, height: u64) -> Option<BlockHeader>;
    fn block_hash_by_height(&self, height: u64) -> Option<Hash>;
    fn block_header_by_hash(&self, hash: &Hash) -> Option<BlockHeader>;
}

/// Known-good `(height, hash)` pins that short-circuit PoW/context checks at those heights.
pub trait CheckpointRegistry: Send + Sync {
    fn verify(&self, height: u64, hash: &Hash) -> bool;
}

/// A no-op checkpoint registry: every height is unconstrained. Useful as a default for networks
/// (or tests) that don't pin any checkpoints.
pub struct NoCheckpoints;

impl CheckpointRegistry for NoCheckpoints {
    fn verify(&self, _height: u64, _hash: &Hash) -> bool {
        true
    }
}

/// Non-blocking publication of mempool/validation observability events.
pub trait EventBus: Send + Sync {
    fn publish(&self, event: crate::mempool::MempoolEvent);
}

/// An `EventBus` that drops every event. Used where a caller has no observer wired up yet.
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn publish(&self, _event: crate::mempool::MempoolEvent) {}
}
