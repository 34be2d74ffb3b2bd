use std::time::{SystemTime, UNIX_EPOCH};

/// Injectable wall-clock source so `MempoolEngine` admission/pruning logic is deterministically
/// testable without sleeping.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

#[derive(Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
    }
}
