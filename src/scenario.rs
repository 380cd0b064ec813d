//! Deterministic scenario generation.
//!
//! Builds ready-to-run networks without hand-placing every station: stations
//! get LCG-random positions in a [-10, 10] square, one to three random
//! response resources each, and each station links to its next few
//! registration-order successors with Euclidean-distance weights. The same
//! seed always produces the same network.

use crate::network::Network;
use crate::node::Station;
use crate::time::Duration;
use crate::types::{NodeId, Resource, ResourceKind};

/// How many registration-order successors each station links to.
const LINK_FANOUT: usize = 3;

/// Builder for auto-generated dispatch scenarios.
pub struct ScenarioBuilder {
    num_stations: usize,
    seed: u64,
    round_interval: Option<Duration>,
    max_resources: u64,
}

impl ScenarioBuilder {
    /// Create a scenario with the given number of stations.
    pub fn new(num_stations: usize) -> Self {
        ScenarioBuilder {
            num_stations,
            seed: 42,
            round_interval: None,
            max_resources: 3,
        }
    }

    /// Set the randomness seed for deterministic generation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the network's round interval.
    pub fn with_round_interval(mut self, interval: Duration) -> Self {
        self.round_interval = Some(interval);
        self
    }

    /// Cap the number of resources generated per station (minimum stays 1).
    pub fn with_max_resources(mut self, max: u64) -> Self {
        self.max_resources = max.max(1);
        self
    }

    /// Build the network: stations, resources, and links.
    pub fn build(self) -> Network {
        let mut net = Network::new(self.seed);
        if let Some(interval) = self.round_interval {
            net = net.with_round_interval(interval);
        }

        let mut state = self.seed;
        for i in 0..self.num_stations {
            let id = NodeId::new(format!("N{:02}", i + 1));
            let lat = lcg_unit(&mut state) * 20.0 - 10.0;
            let lon = lcg_unit(&mut state) * 20.0 - 10.0;
            net.add_node(id.clone(), format!("Station {}", i + 1), lat, lon);

            let count = 1 + lcg_step(&mut state) % self.max_resources;
            for j in 0..count {
                let kind = match lcg_step(&mut state) % 3 {
                    0 => ResourceKind::Ambulance,
                    1 => ResourceKind::Firefighter,
                    _ => ResourceKind::Police,
                };
                net.add_resource(
                    &id,
                    Resource::new(format!("{id}-{kind}-{j}"), kind, (lat, lon)),
                )
                .expect("station was just registered");
            }
        }

        // Partially connected ring-ish topology: each station links to its
        // next few successors, weighted by distance (2 decimal places).
        let ids: Vec<NodeId> = net.node_ids().to_vec();
        for i in 0..ids.len() {
            for j in (i + 1)..(i + 1 + LINK_FANOUT).min(ids.len()) {
                let a = &ids[i];
                let b = &ids[j];
                let distance = net
                    .station(a)
                    .map(Station::position)
                    .zip(net.station(b).map(Station::position))
                    .map(|(pa, pb)| pa.distance(pb))
                    .unwrap_or_default();
                let weight = (distance * 100.0).round() / 100.0;
                net.add_edge(a, b, weight)
                    .expect("both stations were just registered");
            }
        }

        net
    }
}

fn lcg_step(state: &mut u64) -> u64 {
    // LCG parameters (same as glibc).
    *state = state.wrapping_mul(1103515245).wrapping_add(12345);
    (*state >> 16) & 0x7FFF
}

fn lcg_unit(state: &mut u64) -> f64 {
    lcg_step(state) as f64 / 32767.0
}
