use std::collections::HashMap;

use serde::Deserialize;

use crate::collab::CheckpointRegistry;
use crate::model::Hash;

/// A fixed set of known-good `(height, hash)` pins loaded once at startup, typically from the
/// file named by `ValidationConfig::checkpoints_path`. Heights with no pin are unconstrained.
pub struct StaticCheckpoints {
    pins: HashMap<u64, Hash>,
}

#[derive(Debug, Deserialize)]
struct CheckpointFile {
    checkpoints: Vec<CheckpointEntry>,
}

#[derive(Debug, Deserialize)]
struct CheckpointEntry {
    height: u64,
    hash: Hash,
}

impl StaticCheckpoints {
    pub fn empty() -> Self {
        Self { pins: HashMap::new() }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        let parsed: CheckpointFile = toml::from_str(contents)?;
        Ok(Self { pins: parsed.checkpoints.into_iter().map(|c| (c.height, c.hash)).collect() })
    }
}

impl CheckpointRegistry for StaticCheckpoints {
    fn verify(&self, height: u64, hash: &Hash) -> bool {
        match self.pins.get(&height) {
            Some(pinned) => pinned == hash,
            None => true,
        }
    }
}
