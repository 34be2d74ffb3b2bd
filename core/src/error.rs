use thiserror::Error;

/// Unrecoverable conditions propagated all the way to the operator (process exit, paged alert).
/// Never caught-and-continued internally; scheduled background loops only catch and log
/// `Validation`/transient errors, letting a `FatalError` unwind to whatever drives the loop.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("failed to allocate the RandomX cache/dataset: {0}")]
    HasherAllocationFailed(#[from] warden_hashing::HasherError),

    #[error("storage is unavailable: {0}")]
    StorageUnavailable(String),

    #[error("consistency violation: {0}")]
    ConsistencyViolation(String),
}
