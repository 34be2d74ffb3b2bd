use serde::{Deserialize, Serialize};

use crate::mempool::MempoolConfig;

/// The RandomX-family hasher's tunables, loaded as the `randomx.*` config section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HasherConfig {
    pub epoch_length: u64,
    pub genesis_key: String,
    pub mining_enabled: bool,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            epoch_length: warden_hashing::DEFAULT_EPOCH_LENGTH,
            genesis_key: "warden-genesis-key".to_string(),
            mining_enabled: false,
        }
    }
}

/// Validation-pipeline tunables. Presently just the checkpoint file path; most validation
/// behavior (header size ceilings, drift windows) is consensus-critical and intentionally not
/// operator-configurable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub checkpoints_path: Option<String>,
}

/// The aggregate configuration surface for `warden-node`, assembled by the `config` crate from
/// (in increasing precedence) a bundled default, an optional TOML file, and `WARDEN_`-prefixed
/// environment variable overrides -- the same layered convention the CLI (`cli.rs`) builds on top
/// of with explicit flags taking the highest precedence of all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    pub db_path: String,
    pub randomx: HasherConfig,
    pub mempool: MempoolConfig,
    pub validation: ValidationConfig,
}

impl WardenConfig {
    /// Loads configuration from an optional TOML file plus `WARDEN_*` environment overrides,
    /// layered on top of `WardenConfig::default()`. Grounded in the teacher's
    /// `config::Config`-builder convention (`ConfigBuilder::default().add_source(File).add_source(Environment)`).
    pub fn load(config_path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(config::Environment::with_prefix("WARDEN").separator("__"));

        // Every field is `#[serde(default)]`, so a completely empty source set still
        // deserializes into `WardenConfig::default()`.
        builder.build()?.try_deserialize()
    }
}
