use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters maintained by the hub's coordinating task.
#[derive(Debug, Default)]
pub struct HubMetrics {
    pub connections_registered: AtomicU64,
    pub connections_unregistered: AtomicU64,
    pub slow_consumers_evicted: AtomicU64,
    pub active_connections: AtomicU64,
    pub broadcasts: AtomicU64,
    pub frames_delivered: AtomicU64,
    pub frames_dropped: AtomicU64,
}

/// Point-in-time copy of [`HubMetrics`] for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubMetricsSnapshot {
    pub connections_registered: u64,
    pub connections_unregistered: u64,
    pub slow_consumers_evicted: u64,
    pub active_connections: u64,
    pub broadcasts: u64,
    pub frames_delivered: u64,
    pub frames_dropped: u64,
}

impl HubMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_registered(&self) {
        self.connections_registered.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unregistered(&self) {
        self.connections_unregistered.fetch_add(1, Ordering::Relaxed);
        self.decrement_active();
    }

    pub fn record_evicted(&self) {
        self.slow_consumers_evicted.fetch_add(1, Ordering::Relaxed);
        self.decrement_active();
    }

    pub fn record_broadcast(&self, delivered: u64, dropped: u64) {
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
        self.frames_delivered.fetch_add(delivered, Ordering::Relaxed);
        self.frames_dropped.fetch_add(dropped, Ordering::Relaxed);
    }

    fn decrement_active(&self) {
        // Saturate at zero.
        let _ = self
            .active_connections
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(current.saturating_sub(1))
            });
    }

    pub fn snapshot(&self) -> HubMetricsSnapshot {
        HubMetricsSnapshot {
            connections_registered: self.connections_registered.load(Ordering::Relaxed),
            connections_unregistered: self.connections_unregistered.load(Ordering::Relaxed),
            slow_consumers_evicted: self.slow_consumers_evicted.load(Ordering::Relaxed),
            active_connections: self.active_connections.load(Ordering::Relaxed),
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
            frames_delivered: self.frames_delivered.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
        }
    }
}
