#![forbid(unsafe_code)]
//! dispatchsim - Deterministic simulator for an emergency dispatch network.
//!
//! This crate models a small packet-switched network of dispatch stations
//! connected by weighted links. Each station maintains a local priority queue
//! of incoming emergencies and a pool of response resources; the network
//! routes, assigns, and redistributes work as stations fail and recover.
//!
//! # Features
//!
//! - **Weighted topology and routing**: undirected links, Dijkstra shortest
//!   paths restricted to active stations
//! - **Spatial assignment**: an alternating-axis BST assigns each emergency
//!   to the nearest active station within a fixed radius
//! - **Priority dispatch**: per-station queues ordered by urgency, one
//!   resolution attempt per station per round
//! - **Failure protocol**: deactivating a station redistributes its pending
//!   queue to random active neighbors (seeded, reproducible)
//! - **Performance accounting**: resolution counts, response latency, and
//!   simulated transmission bytes, globally and per station
//!
//! No real transport, wall clock, or persistence: the whole simulation is
//! in-memory and advanced by discrete processing rounds, deterministic for a
//! given seed.
//!
//! # Example
//!
//! ```
//! use dispatchsim::{
//!     Emergency, EmergencyKind, Network, NodeId, Priority, Resource, ResourceKind, Timestamp,
//! };
//!
//! let mut net = Network::new(42);
//! net.add_node("A", "Central", 0.0, 0.0);
//! net.add_resource(
//!     &NodeId::from("A"),
//!     Resource::new("A-amb-0", ResourceKind::Ambulance, (0.0, 0.0)),
//! )
//! .unwrap();
//!
//! let assigned = net
//!     .register_emergency(Emergency::new(
//!         "E001",
//!         EmergencyKind::Fire,
//!         Priority::Critical,
//!         (0.5, 0.5),
//!         "warehouse fire",
//!         Timestamp::ZERO,
//!     ))
//!     .unwrap();
//! assert_eq!(assigned, NodeId::from("A"));
//!
//! net.tick();
//! assert_eq!(net.stats().total_resolved, 1);
//! ```

pub mod error;
pub mod metrics;
pub mod network;
pub mod node;
pub mod record;
pub mod scenario;
pub mod spatial;
pub mod time;
pub mod topology;
pub mod types;

// Re-export main types
pub use error::NetworkError;
pub use metrics::{NetworkStats, StationStats};
pub use network::{Network, ASSIGNMENT_RADIUS};
pub use node::{DispatchOutcome, Station, StationMetadata};
pub use record::RecordIndex;
pub use scenario::ScenarioBuilder;
pub use spatial::SpatialIndex;
pub use time::{Duration, Timestamp};
pub use topology::{Route, Topology};
pub use types::{
    Emergency, EmergencyId, EmergencyKind, NodeId, Point, Priority, Resource, ResourceKind,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn emergency(id: &str, priority: Priority, lat: f64, lon: f64) -> Emergency {
        Emergency::new(
            id,
            EmergencyKind::Rescue,
            priority,
            (lat, lon),
            "person trapped",
            Timestamp::ZERO,
        )
    }

    #[test]
    fn test_generated_scenario_end_to_end() {
        let mut net = ScenarioBuilder::new(8).with_seed(42).build();

        let assigned = net
            .register_emergency(emergency("E001", Priority::Critical, 2.5, 3.1))
            .unwrap();
        assert!(net.node_ids().contains(&assigned));

        // Every generated station has at least one resource, so the first
        // round must resolve the emergency.
        net.tick();
        let stats = net.stats();
        assert_eq!(stats.total_registered, 1);
        assert_eq!(stats.total_resolved, 1);
        assert!(stats.avg_response_latency.is_some());
        assert!(stats.total_bytes_transmitted > 0);
    }

    #[test]
    fn test_edge_weight_bounds_shortest_path() {
        // Triangle inequality sanity over a generated topology.
        let net = ScenarioBuilder::new(10).with_seed(7).build();
        let mut checked = 0;
        for id in net.node_ids() {
            let station = net.station(id).unwrap();
            for (neighbor, weight) in station.links() {
                let route = net.shortest_path(id, neighbor);
                assert!(route.is_reachable());
                assert!(
                    route.total_weight <= *weight,
                    "{id} -> {neighbor}: {} > {weight}",
                    route.total_weight
                );
                checked += 1;
            }
        }
        assert!(checked > 0);
    }

    #[test]
    fn test_failure_then_recovery_cycle() {
        let mut net = ScenarioBuilder::new(6).with_seed(11).build();
        let failed = net.node_ids()[2].clone();

        for i in 0..4 {
            net.register_emergency(emergency(&format!("E{i:03}"), Priority::High, 0.0, 0.0))
                .unwrap();
        }
        let queued_before: usize = net
            .node_ids()
            .iter()
            .map(|id| net.station(id).unwrap().pending())
            .sum();
        assert_eq!(queued_before, 4);

        net.set_node_active(&failed, false).unwrap();

        // Nothing vanished: everything is queued elsewhere or counted dropped.
        let queued_after: usize = net
            .node_ids()
            .iter()
            .map(|id| net.station(id).unwrap().pending())
            .sum();
        let dropped = net.stats().total_dropped;
        assert_eq!(queued_after as u64 + dropped, 4);

        net.set_node_active(&failed, true).unwrap();
        assert!(net.station(&failed).unwrap().is_active());
        assert_eq!(net.station(&failed).unwrap().pending(), 0);
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let run = |seed: u64| -> (u64, u64, u64) {
            let mut net = ScenarioBuilder::new(8).with_seed(seed).build();
            for i in 0..12 {
                net.register_emergency(emergency(
                    &format!("E{i:03}"),
                    if i % 2 == 0 { Priority::Critical } else { Priority::Low },
                    (i as f64) - 6.0,
                    3.0,
                ))
                .unwrap();
            }
            let victim = net.node_ids()[0].clone();
            net.set_node_active(&victim, false).unwrap();
            for _ in 0..5 {
                net.tick();
            }
            let stats = net.stats();
            (
                stats.total_resolved,
                stats.total_dropped,
                stats.total_bytes_transmitted,
            )
        };
        assert_eq!(run(1234), run(1234));
    }

    #[test]
    fn test_station_metadata_attachment() {
        let mut net = Network::new(1);
        net.add_node("A", "Central", 0.0, 0.0);
        let a = NodeId::from("A");
        if let Some(station) = net.station_mut(&a) {
            station.metadata.ip = Some("192.168.1.1".to_owned());
            station.metadata.hardware = Some("router-2811".to_owned());
        }
        let station = net.station(&a).unwrap();
        assert_eq!(station.metadata.ip.as_deref(), Some("192.168.1.1"));
        assert_eq!(station.metadata.hardware.as_deref(), Some("router-2811"));
    }
}
