use clap::Parser;

/// `warden-node`: runs the validation pipeline and mempool engine against a local chain
/// database. Every flag overrides the corresponding config-file/environment value; see
/// `WardenConfig` for the full layered precedence.
#[derive(Debug, Parser)]
#[command(name = "warden-node", version, about)]
pub struct Cli {
    /// Path to a TOML config file. Missing is not an error: defaults and env vars still apply.
    #[arg(long, env = "WARDEN_CONFIG")]
    pub config: Option<String>,

    #[arg(long, env = "WARDEN_DB_PATH")]
    pub db_path: Option<String>,

    #[arg(long, env = "WARDEN_MEMPOOL_MAX_SIZE")]
    pub mempool_max_size: Option<usize>,

    #[arg(long, env = "WARDEN_MEMPOOL_TX_EXPIRE_MINUTES")]
    pub mempool_tx_expire_minutes: Option<u64>,

    #[arg(long, env = "WARDEN_MEMPOOL_MAX_NONCE_GAP")]
    pub mempool_max_nonce_gap: Option<u64>,

    #[arg(long, env = "WARDEN_MEMPOOL_MIN_ACCEPTABLE_FEE_WEI")]
    pub mempool_min_acceptable_fee_wei: Option<u64>,

    #[arg(long, env = "WARDEN_MINING_ENABLE")]
    pub mining_enable: bool,

    #[arg(long, env = "WARDEN_RANDOMX_EPOCH_LENGTH")]
    pub randomx_epoch_length: Option<u64>,

    #[arg(long, env = "WARDEN_RANDOMX_GENESIS_KEY")]
    pub randomx_genesis_key: Option<String>,
}

impl Cli {
    /// Applies CLI/env overrides on top of a loaded `WardenConfig`; flags take precedence over
    /// everything `WardenConfig::load` already merged in.
    pub fn apply_overrides(&self, mut config: crate::config::WardenConfig) -> crate::config::WardenConfig {
        if let Some(path) = &self.db_path {
            config.db_path = path.clone();
        }
        if let Some(v) = self.mempool_max_size {
            config.mempool.max_size = v;
        }
        if let Some(v) = self.mempool_tx_expire_minutes {
            config.mempool.tx_expire_time_in_minutes = v;
        }
        if let Some(v) = self.mempool_max_nonce_gap {
            config.mempool.max_nonce_gap = v;
        }
        if let Some(v) = self.mempool_min_acceptable_fee_wei {
            config.mempool.min_acceptable_fee_wei = crate::model::Wei::from_u64(v);
        }
        if self.mining_enable {
            config.randomx.mining_enabled = true;
        }
        if let Some(v) = self.randomx_epoch_length {
            config.randomx.epoch_length = v;
        }
        if let Some(v) = &self.randomx_genesis_key {
            config.randomx.genesis_key = v.clone();
        }
        config
    }
}
