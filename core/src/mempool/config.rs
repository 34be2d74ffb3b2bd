use serde::{Deserialize, Serialize};

use crate::model::Wei;

/// Mempool tuning knobs, loaded as the `mempool.*` section of `WardenConfig`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MempoolConfig {
    pub max_size: usize,
    pub tx_expire_time_in_minutes: u64,
    pub max_nonce_gap: u64,
    pub min_acceptable_fee_wei: Wei,
    pub prune_interval_ms: u64,
}

impl Default for MempoolConfig {
    fn default() -> Self {
        Self {
            max_size: 50_000,
            tx_expire_time_in_minutes: 180,
            max_nonce_gap: 64,
            min_acceptable_fee_wei: Wei::from_u64(1),
            prune_interval_ms: 30_000,
        }
    }
}

impl MempoolConfig {
    pub fn tx_expire_time_ms(&self) -> u64 {
        self.tx_expire_time_in_minutes.saturating_mul(60_000)
    }
}
