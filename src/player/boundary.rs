use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use crate::types::timestamp::UNBOUNDED;

/// Shared between the engine's notification thread, which only ever raises
/// the restart flag, and the main-thread driver, which consumes it.
#[derive(Debug)]
pub struct BoundaryWatch {
    end_ms: AtomicI64,
    pending: AtomicBool,
}

impl BoundaryWatch {
    pub fn new() -> Self {
        Self {
            end_ms: AtomicI64::new(UNBOUNDED),
            pending: AtomicBool::new(false),
        }
    }

    /// Watches for `end_ms` and drops any restart still pending.
    pub fn arm(&self, end_ms: i64) {
        self.end_ms.store(end_ms, Ordering::SeqCst);
        self.pending.store(false, Ordering::SeqCst);
    }

    pub fn disarm(&self) {
        self.arm(UNBOUNDED);
    }

    pub fn end_ms(&self) -> i64 {
        self.end_ms.load(Ordering::SeqCst)
    }

    /// Producer side, called from the engine's time-changed notification.
    pub fn observe(&self, time_ms: i64) {
        let end_ms = self.end_ms();
        if end_ms == UNBOUNDED {
            return;
        }
        if time_ms > end_ms && !self.pending.swap(true, Ordering::SeqCst) {
            tracing::trace!(time_ms, end_ms, "loop boundary crossed");
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Consumer side: returns whether a restart was pending and clears it.
    pub fn take_pending(&self) -> bool {
        self.pending.swap(false, Ordering::SeqCst)
    }
}

impl Default for BoundaryWatch {
    fn default() -> Self {
        Self::new()
    }
}
