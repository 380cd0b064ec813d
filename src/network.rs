//! Network orchestrator.
//!
//! The [`Network`] owns every station, the topology, the spatial index, the
//! record index, the global counters, and the seeded randomness source. All
//! mutation flows through `&mut Network`; there is no ambient global state.
//! Time is an explicit [`Timestamp`] advanced in discrete rounds.

use hashbrown::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::error::NetworkError;
use crate::metrics::{NetworkStats, StationStats};
use crate::node::{DispatchOutcome, Station};
use crate::record::RecordIndex;
use crate::spatial::SpatialIndex;
use crate::time::{Duration, Timestamp};
use crate::topology::{Route, Topology};
use crate::types::{Emergency, NodeId, Point, Resource};

/// Fixed spatial search radius used when assigning a new emergency.
pub const ASSIGNMENT_RADIUS: f64 = 5.0;

const DEFAULT_ROUND_INTERVAL: Duration = Duration::from_secs(1);

/// The emergency dispatch network.
pub struct Network {
    stations: HashMap<NodeId, Station>,
    /// Station ids in registration order; this is the network iteration
    /// order for fallback assignment and dispatch rounds.
    order: Vec<NodeId>,
    topology: Topology,
    spatial: SpatialIndex,
    records: RecordIndex,
    current_time: Timestamp,
    round_interval: Duration,
    /// LCG state for redistribution choices.
    rng_state: u64,
    total_registered: u64,
    total_resolved: u64,
    total_dropped: u64,
    total_bytes: u64,
}

impl Network {
    /// Create an empty network with the given randomness seed.
    pub fn new(seed: u64) -> Self {
        Network {
            stations: HashMap::new(),
            order: Vec::new(),
            topology: Topology::new(),
            spatial: SpatialIndex::new(),
            records: RecordIndex::new(),
            current_time: Timestamp::ZERO,
            round_interval: DEFAULT_ROUND_INTERVAL,
            rng_state: seed,
            total_registered: 0,
            total_resolved: 0,
            total_dropped: 0,
            total_bytes: 0,
        }
    }

    /// Set how far the clock advances per processing round.
    pub fn with_round_interval(mut self, interval: Duration) -> Self {
        self.round_interval = interval;
        self
    }

    /// Current simulation time.
    pub fn now(&self) -> Timestamp {
        self.current_time
    }

    /// Advance the clock without processing a round.
    pub fn advance(&mut self, duration: Duration) {
        self.current_time = self.current_time.saturating_add(duration);
    }

    /// Register a station, its topology vertex, and its spatial entry.
    pub fn add_node(&mut self, id: impl Into<NodeId>, name: impl Into<String>, lat: f64, lon: f64) {
        let id = id.into();
        let position = Point::new(lat, lon);
        self.topology.add_vertex(id.clone());
        self.spatial.insert(id.clone(), position);
        if !self.stations.contains_key(&id) {
            self.order.push(id.clone());
        }
        debug!(station = %id, ?position, "station registered");
        self.stations.insert(id.clone(), Station::new(id, name, position));
    }

    /// Attach a resource to a station's pool.
    pub fn add_resource(&mut self, id: &NodeId, resource: Resource) -> Result<(), NetworkError> {
        let station = self
            .stations
            .get_mut(id)
            .ok_or_else(|| NetworkError::UnknownNode(id.clone()))?;
        station.add_resource(resource);
        Ok(())
    }

    /// Add an undirected weighted link between two stations.
    pub fn add_edge(&mut self, a: &NodeId, b: &NodeId, weight: f64) -> Result<(), NetworkError> {
        self.topology.add_edge(a, b, weight)?;
        if let Some(station) = self.stations.get_mut(a) {
            station.link(b.clone(), weight);
        }
        if let Some(station) = self.stations.get_mut(b) {
            station.link(a.clone(), weight);
        }
        Ok(())
    }

    pub fn station(&self, id: &NodeId) -> Option<&Station> {
        self.stations.get(id)
    }

    pub fn station_mut(&mut self, id: &NodeId) -> Option<&mut Station> {
        self.stations.get_mut(id)
    }

    /// Station ids in registration order.
    pub fn node_ids(&self) -> &[NodeId] {
        &self.order
    }

    /// The canonical emergency record store.
    pub fn records(&self) -> &RecordIndex {
        &self.records
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Register a new emergency and assign it to a station.
    ///
    /// The record is always stored in the record index first, so a failed
    /// assignment still leaves an auditable record. Assignment picks the
    /// nearest active station within [`ASSIGNMENT_RADIUS`], falling back to
    /// the first active station in registration order.
    pub fn register_emergency(&mut self, emergency: Emergency) -> Result<NodeId, NetworkError> {
        self.total_registered += 1;
        let id = emergency.id.clone();
        let priority = emergency.priority;
        let location = emergency.location;
        self.records.upsert(emergency);

        let target = self
            .nearest_active_in_radius(location)
            .or_else(|| self.first_active());

        match target {
            Some(node_id) => {
                if let Some(station) = self.stations.get_mut(&node_id) {
                    station.enqueue(id.clone(), priority);
                }
                debug!(emergency = %id, station = %node_id, "emergency assigned");
                Ok(node_id)
            }
            None => {
                warn!(emergency = %id, "no active station; emergency recorded but not enqueued");
                Err(NetworkError::NoActiveNode)
            }
        }
    }

    fn nearest_active_in_radius(&self, location: Point) -> Option<NodeId> {
        self.spatial
            .query(location, ASSIGNMENT_RADIUS)
            .into_iter()
            .filter(|(id, _)| self.stations.get(id).is_some_and(Station::is_active))
            .min_by(|(a_id, a_pos), (b_id, b_pos)| {
                location
                    .distance(*a_pos)
                    .total_cmp(&location.distance(*b_pos))
                    .then_with(|| a_id.cmp(b_id))
            })
            .map(|(id, _)| id)
    }

    fn first_active(&self) -> Option<NodeId> {
        self.order
            .iter()
            .find(|id| self.stations.get(*id).is_some_and(Station::is_active))
            .cloned()
    }

    /// Advance one processing round.
    ///
    /// The clock moves forward by the round interval, then every active
    /// station attempts to dispatch its single top-priority emergency. At
    /// most one emergency resolves per active station per round.
    pub fn tick(&mut self) {
        self.current_time = self.current_time.saturating_add(self.round_interval);
        let now = self.current_time;
        let active = self.active_set();
        let round: Vec<NodeId> = self
            .order
            .iter()
            .filter(|id| active.contains(*id))
            .cloned()
            .collect();

        for id in round {
            let active_neighbors = match self.stations.get(&id) {
                Some(station) => station
                    .links()
                    .keys()
                    .filter(|n| active.contains(*n))
                    .count(),
                None => continue,
            };
            let Some(station) = self.stations.get_mut(&id) else {
                continue;
            };
            match station.dispatch_one(&mut self.records, now, active_neighbors) {
                DispatchOutcome::Resolved { id: emergency, bytes } => {
                    self.total_resolved += 1;
                    self.total_bytes += bytes;
                    debug!(emergency = %emergency, station = %id, bytes, "emergency resolved");
                }
                DispatchOutcome::Deferred(emergency) => {
                    debug!(emergency = %emergency, station = %id, "no resource available, deferred");
                }
                DispatchOutcome::Stale(_) | DispatchOutcome::Idle => {}
            }
        }
    }

    /// Activate or deactivate a station.
    ///
    /// Deactivation drains the station's queue and redistributes each ticket
    /// to a uniformly random currently-active neighbor; tickets with no
    /// active neighbor are dropped (counted, warned, and still auditable in
    /// the record index). Reactivation resumes with an empty queue.
    pub fn set_node_active(&mut self, id: &NodeId, active: bool) -> Result<(), NetworkError> {
        if !self.stations.contains_key(id) {
            return Err(NetworkError::UnknownNode(id.clone()));
        }

        if active {
            if let Some(station) = self.stations.get_mut(id) {
                station.set_active(true);
            }
            debug!(station = %id, "station restored");
            return Ok(());
        }

        let (tickets, neighbor_ids) = match self.stations.get_mut(id) {
            Some(station) => {
                station.set_active(false);
                let tickets = station.drain();
                let neighbor_ids: Vec<NodeId> = station.links().keys().cloned().collect();
                (tickets, neighbor_ids)
            }
            None => return Ok(()),
        };

        let active_neighbors: Vec<NodeId> = neighbor_ids
            .into_iter()
            .filter(|n| self.stations.get(n).is_some_and(Station::is_active))
            .collect();

        for ticket in tickets {
            if active_neighbors.is_empty() {
                self.total_dropped += 1;
                warn!(
                    emergency = %ticket.id,
                    station = %id,
                    "no active neighbor; emergency dropped from all queues"
                );
                continue;
            }
            let pick = self.random_index(active_neighbors.len());
            let target = active_neighbors[pick].clone();
            if let Some(station) = self.stations.get_mut(&target) {
                // The ticket keeps its record's original creation timestamp,
                // so redistribution inflates measured response latency.
                station.enqueue(ticket.id.clone(), ticket.priority);
                debug!(emergency = %ticket.id, from = %id, to = %target, "emergency redistributed");
            }
        }
        debug!(station = %id, "station deactivated");
        Ok(())
    }

    /// Shortest route between two stations through active stations only.
    pub fn shortest_path(&self, a: &NodeId, b: &NodeId) -> Route {
        self.topology.shortest_path(a, b, &self.active_set())
    }

    /// Snapshot of network-wide and per-station statistics.
    pub fn stats(&self) -> NetworkStats {
        let mut latency_total_ms = 0u64;
        let mut latency_count = 0u64;
        for record in self.records.all() {
            if let Some(latency) = record.response_latency {
                latency_total_ms += latency.as_millis();
                latency_count += 1;
            }
        }
        let avg_response_latency = if latency_count > 0 {
            Some(Duration::from_millis(latency_total_ms / latency_count))
        } else {
            None
        };

        let per_station = self
            .stations
            .iter()
            .map(|(id, station)| {
                (
                    id.clone(),
                    StationStats {
                        resolved: station.resolved_count(),
                        bytes_transmitted: station.bytes_transmitted(),
                        pending: station.pending(),
                        active: station.is_active(),
                        resources_available: station.available_resources(),
                    },
                )
            })
            .collect();

        NetworkStats {
            total_registered: self.total_registered,
            total_resolved: self.total_resolved,
            total_dropped: self.total_dropped,
            total_bytes_transmitted: self.total_bytes,
            avg_response_latency,
            per_station,
        }
    }

    fn active_set(&self) -> HashSet<NodeId> {
        self.stations
            .iter()
            .filter(|(_, s)| s.is_active())
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn random_index(&mut self, len: usize) -> usize {
        (self.random_u64() % len as u64) as usize
    }

    /// 64-bit LCG step, seeded at construction for reproducible runs.
    fn random_u64(&mut self) -> u64 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1);
        self.rng_state
    }
}
