use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use parking_lot::{Condvar, Mutex};

/// Tracks how many live [`crate::vm::VmHandle`]s currently borrow a given cache/dataset
/// generation. A swap (epoch change, shutdown) waits on this to hit zero before it is safe to
/// consider the old allocation reclaimable.
#[derive(Default)]
pub struct Outstanding {
    count: Mutex<usize>,
    released: Condvar,
}

impl Outstanding {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        *self.count.lock()
    }

    /// Increment on VM construction. Paired with [`OutstandingGuard`]'s `Drop`.
    fn acquire(self: &Arc<Self>) -> OutstandingGuard {
        *self.count.lock() += 1;
        OutstandingGuard { outstanding: self.clone() }
    }

    /// Poll-with-backoff wait for the count to reach zero, capped at `timeout`. Returns `true` if
    /// it reached zero within the deadline, `false` if the cap was exceeded.
    pub fn wait_for_zero(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut guard = self.count.lock();
        while *guard != 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return *guard == 0;
            }
            let result = self.released.wait_for(&mut guard, remaining.min(Duration::from_millis(250)));
            if result.timed_out() && Instant::now() >= deadline {
                return *guard == 0;
            }
        }
        true
    }
}

pub struct OutstandingGuard {
    outstanding: Arc<Outstanding>,
}

impl Drop for OutstandingGuard {
    fn drop(&mut self) {
        let mut guard = self.outstanding.count.lock();
        debug_assert!(*guard > 0, "outstanding VM counter underflow");
        *guard = guard.saturating_sub(1);
        drop(guard);
        self.outstanding.released.notify_all();
    }
}

pub trait OutstandingExt {
    fn acquire_guard(self: &Arc<Self>) -> OutstandingGuard;
}

impl OutstandingExt for Outstanding {
    fn acquire_guard(self: &Arc<Self>) -> OutstandingGuard {
        self.acquire()
    }
}
