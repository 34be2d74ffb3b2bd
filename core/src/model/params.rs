use serde::{Deserialize, Serialize};

use super::primitives::{Address, Wei};

/// The consensus-relevant network parameters, as stored in the state tree and mutated only
/// through `NETWORK_PARAMS_SET` governance transactions. Implementers must read a chain-tip
/// consistent snapshot of this struct from `WorldState::params()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkParamsState {
    pub block_reward: Wei,
    pub block_reward_pool_address: Address,
    pub target_mining_time_ms: u64,
    pub asert_half_life_blocks: u64,
    pub asert_anchor_height: u64,
    pub min_difficulty: primitive_types::U256,
    pub min_tx_base_fee: Wei,
    pub min_tx_byte_fee: Wei,
    pub current_authority_count: u32,
}

impl NetworkParamsState {
    /// The fee floor for a transaction of `size` encoded bytes: `base + byteFee * size`.
    pub fn min_tx_fee(&self, size: usize) -> Option<Wei> {
        self.min_tx_byte_fee.checked_mul_u64(size as u64)?.checked_add(&self.min_tx_base_fee)
    }
}
