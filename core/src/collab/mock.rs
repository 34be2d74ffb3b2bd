//! Test doubles for the collaborator traits, grounded in the teacher's
//! `validation::mocks::MockValidator` / `mempool/test_utils/mock.rs` pattern: hand-rolled,
//! `parking_lot`-guarded in-memory state that tests can poke directly rather than a mocking
//! framework, since every trait here is small and the tests mostly want to control specific
//! return values per call.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;
use primitive_types::U256;

use super::{BipState, ChainQuery, TokenInfo, WorldState};
use crate::model::{Address, BlockHeader, Hash, NetworkParamsState, Wei};

#[derive(Default)]
pub struct MockWorldState {
    pub nonces: Mutex<HashMap<Address, u64>>,
    pub balances: Mutex<HashMap<(Address, Address), U256>>,
    pub tokens: Mutex<HashMap<Address, TokenInfo>>,
    pub authorities: Mutex<HashSet<Address>>,
    pub aliases: Mutex<HashMap<String, Address>>,
    pub bips: Mutex<HashMap<Hash, BipState>>,
    pub params: Mutex<Option<NetworkParamsState>>,
}

impl MockWorldState {
    pub fn new(params: NetworkParamsState) -> Self {
        let s = Self::default();
        *s.params.lock() = Some(params);
        s
    }

    pub fn set_nonce(&self, addr: Address, nonce: u64) {
        self.nonces.lock().insert(addr, nonce);
    }

    pub fn set_balance(&self, addr: Address, token: Address, amount: U256) {
        self.balances.lock().insert((addr, token), amount);
    }

    pub fn add_authority(&self, addr: Address) {
        self.authorities.lock().insert(addr);
    }
}

impl WorldState for MockWorldState {
    fn nonce(&self, addr: &Address) -> u64 {
        self.nonces.lock().get(addr).copied().unwrap_or(0)
    }

    fn balance(&self, addr: &Address, token: &Address) -> U256 {
        self.balances.lock().get(&(*addr, *token)).copied().unwrap_or_default()
    }

    fn token(&self, addr: &Address) -> Option<TokenInfo> {
        self.tokens.lock().get(addr).cloned()
    }

    fn authority(&self, addr: &Address) -> bool {
        self.authorities.lock().contains(addr)
    }

    fn address_alias(&self, alias: &str) -> Option<Address> {
        self.aliases.lock().get(alias).copied()
    }

    fn bip(&self, hash: &Hash) -> Option<BipState> {
        self.bips.lock().get(hash).cloned()
    }

    fn params(&self) -> NetworkParamsState {
        self.params.lock().clone().expect("MockWorldState params must be set before use")
    }
}

#[derive(Default)]
pub struct MockChainQuery {
    pub headers_by_height: Mutex<HashMap<u64, BlockHeader>>,
}

impl MockChainQuery {
    pub fn insert(&self, header: BlockHeader) {
        self.headers_by_height.lock().insert(header.height(), header);
    }
}

impl ChainQuery for MockChainQuery {
    fn latest_block_header(&self) -> Option<BlockHeader> {
        self.headers_by_height.lock().values().max_by_key(|h| h.height()).cloned()
    }

    fn latest_height(&self) -> u64 {
        self.latest_block_header().map(|h| h.height()).unwrap_or(0)
    }

    fn block_header_at(&self, height: u64) -> Option<BlockHeader> {
        self.headers_by_height.lock().get(&height).cloned()
    }

    fn block_hash_by_height(&self, height: u64) -> Option<Hash> {
        self.block_header_at(height).map(|h| h.hash())
    }

    fn block_header_by_hash(&self, hash: &Hash) -> Option<BlockHeader> {
        self.headers_by_height.lock().values().find(|h| h.hash() == *hash).cloned()
    }
}

pub fn sample_params() -> NetworkParamsState {
    NetworkParamsState {
        block_reward: Wei::from_u64(1_000_000),
        block_reward_pool_address: Address::ZERO,
        target_mining_time_ms: 15_000,
        asert_half_life_blocks: 120,
        asert_anchor_height: 0,
        min_difficulty: U256::from(1000u64),
        min_tx_base_fee: Wei::from_u64(10),
        min_tx_byte_fee: Wei::from_u64(1),
        current_authority_count: 1,
    }
}
