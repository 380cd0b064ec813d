//! Performance accounting for simulation analysis.

use hashbrown::HashMap;

use crate::time::Duration;
use crate::types::NodeId;

/// Per-station counters at the time of a [`NetworkStats`] snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationStats {
    pub resolved: u64,
    pub bytes_transmitted: u64,
    /// Tickets still waiting in the local queue.
    pub pending: usize,
    pub active: bool,
    pub resources_available: usize,
}

/// Network-wide statistics snapshot.
#[derive(Debug, Clone)]
pub struct NetworkStats {
    /// Emergencies ever registered (including failed registrations, which
    /// are still recorded for audit).
    pub total_registered: u64,
    pub total_resolved: u64,
    /// Emergencies dropped during redistribution because the failed station
    /// had no active neighbor.
    pub total_dropped: u64,
    pub total_bytes_transmitted: u64,
    /// Mean response latency over resolved emergencies, `None` if nothing
    /// has been resolved yet.
    pub avg_response_latency: Option<Duration>,
    pub per_station: HashMap<NodeId, StationStats>,
}

impl NetworkStats {
    /// Fraction of registered emergencies resolved so far.
    pub fn resolution_rate(&self) -> f64 {
        if self.total_registered == 0 {
            return 0.0;
        }
        self.total_resolved as f64 / self.total_registered as f64
    }

    pub fn station(&self, id: &NodeId) -> Option<&StationStats> {
        self.per_station.get(id)
    }
}
