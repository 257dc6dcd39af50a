use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// 楽観的更新の結果を数えるカウンタ
#[derive(Debug, Default)]
pub struct ReconcileMetrics {
    committed: AtomicU64,
    rolled_back: AtomicU64,
    ignored: AtomicU64,
    rejected: AtomicU64,
    collections_patched: AtomicU64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileMetricsSnapshot {
    pub committed: u64,
    pub rolled_back: u64,
    pub ignored: u64,
    pub rejected: u64,
    pub collections_patched: u64,
}

impl ReconcileMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_committed(&self) {
        self.committed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rolled_back(&self) {
        self.rolled_back.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ignored(&self) {
        self.ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_collections_patched(&self, count: usize) {
        self.collections_patched
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ReconcileMetricsSnapshot {
        ReconcileMetricsSnapshot {
            committed: self.committed.load(Ordering::Relaxed),
            rolled_back: self.rolled_back.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            collections_patched: self.collections_patched.load(Ordering::Relaxed),
        }
    }
}
