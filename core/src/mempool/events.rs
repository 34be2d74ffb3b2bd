use std::sync::Arc;

use super::entry::MempoolEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddReason {
    New,
    Reorg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveReason {
    Mined,
    Rbf,
    StaleNonce,
    Expired,
    EvictedFull,
    Invalid,
}

/// Published exactly once per transaction admitted, after all locks guarding the admission are
/// released. `entry` is `Arc`-wrapped so publication never clones the transaction body.
#[derive(Debug, Clone)]
pub struct MempoolTxAddEvent {
    pub entry: Arc<MempoolEntry>,
    pub reason: AddReason,
}

/// Published exactly once per transaction leaving the pool, after all locks guarding the removal
/// are released.
#[derive(Debug, Clone)]
pub struct MempoolTxRemoveEvent {
    pub entry: Arc<MempoolEntry>,
    pub reason: RemoveReason,
}

#[derive(Debug, Clone)]
pub enum MempoolEvent {
    Add(MempoolTxAddEvent),
    Remove(MempoolTxRemoveEvent),
}
