use thiserror::Error;

/// Failure modes of the epoch-keyed hasher lifecycle, per the hashing contract.
#[derive(Debug, Error)]
pub enum HasherError {
    #[error("hasher has not been initialized for any height yet")]
    NotInitialized,

    #[error("hasher is shutting down")]
    ShuttingDown,

    #[error("seed block for epoch anchor height {anchor_height} is unavailable and no seed provider supplied it")]
    SeedUnavailable { anchor_height: u64 },

    #[error("failed to allocate RandomX cache/dataset with both large-pages and standard paths: {0}")]
    AllocationFailed(String),

    #[error("randomx vm error: {0}")]
    Vm(String),

    #[error("timed out after {0:?} waiting for outstanding VMs to release during epoch swap")]
    SwapTimeout(std::time::Duration),
}

impl From<randomx_rs::RandomXError> for HasherError {
    fn from(e: randomx_rs::RandomXError) -> Self {
        HasherError::Vm(e.to_string())
    }
}
