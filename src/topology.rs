//! Weighted station graph and shortest-path routing.
//!
//! Edges are undirected: the weight is stored symmetrically and re-adding an
//! edge overwrites the previous weight for that pair. Routing runs Dijkstra
//! restricted to active stations, with a deterministic tie-break (distance by
//! `total_cmp`, then node id) so equal-weight routes are reproducible.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hashbrown::{HashMap, HashSet};

use crate::error::NetworkError;
use crate::types::NodeId;

/// Result of a shortest-path query.
///
/// Absence of a route is an expected outcome, reported as an empty path with
/// infinite weight rather than an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Ordered station ids from source to destination, empty if unreachable.
    pub path: Vec<NodeId>,
    /// Sum of edge weights along the path, `f64::INFINITY` if unreachable.
    pub total_weight: f64,
}

impl Route {
    /// The no-route sentinel.
    pub fn unreachable() -> Self {
        Route {
            path: Vec::new(),
            total_weight: f64::INFINITY,
        }
    }

    pub fn is_reachable(&self) -> bool {
        !self.path.is_empty()
    }
}

/// Entry in the Dijkstra frontier.
///
/// Ordering is reversed so `BinaryHeap` (a max-heap) behaves as a min-heap,
/// same trick as the event queue ordering in discrete event simulators.
#[derive(Debug, Clone)]
struct FrontierEntry {
    dist: f64,
    id: NodeId,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        match other.dist.total_cmp(&self.dist) {
            Ordering::Equal => other.id.cmp(&self.id),
            ord => ord,
        }
    }
}

/// Undirected weighted adjacency structure over station ids.
#[derive(Debug, Default)]
pub struct Topology {
    adjacency: HashMap<NodeId, HashMap<NodeId, f64>>,
}

impl Topology {
    pub fn new() -> Self {
        Topology {
            adjacency: HashMap::new(),
        }
    }

    /// Register a station id so edges may reference it.
    pub fn add_vertex(&mut self, id: NodeId) {
        self.adjacency.entry(id).or_default();
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.adjacency.contains_key(id)
    }

    /// Add an undirected edge, overwriting any prior weight for the pair.
    pub fn add_edge(&mut self, a: &NodeId, b: &NodeId, weight: f64) -> Result<(), NetworkError> {
        if !self.contains(a) {
            return Err(NetworkError::UnknownNode(a.clone()));
        }
        if !self.contains(b) {
            return Err(NetworkError::UnknownNode(b.clone()));
        }
        if let Some(edges) = self.adjacency.get_mut(a) {
            edges.insert(b.clone(), weight);
        }
        if let Some(edges) = self.adjacency.get_mut(b) {
            edges.insert(a.clone(), weight);
        }
        Ok(())
    }

    /// Weight of the edge between two stations, if one exists.
    pub fn weight(&self, a: &NodeId, b: &NodeId) -> Option<f64> {
        self.adjacency.get(a)?.get(b).copied()
    }

    /// Neighbors of a station with their edge weights.
    pub fn neighbors<'a>(&'a self, id: &NodeId) -> impl Iterator<Item = (&'a NodeId, f64)> + 'a {
        self.adjacency
            .get(id)
            .into_iter()
            .flat_map(|edges| edges.iter().map(|(n, &w)| (n, w)))
    }

    /// Every undirected edge exactly once, as `(a, b, weight)` with `a < b`.
    pub fn edges(&self) -> impl Iterator<Item = (&NodeId, &NodeId, f64)> {
        self.adjacency.iter().flat_map(|(a, edges)| {
            edges
                .iter()
                .filter(move |(b, _)| a < *b)
                .map(move |(b, &w)| (a, b, w))
        })
    }

    /// Dijkstra over the subgraph of active stations.
    ///
    /// Unknown or inactive endpoints, and destinations unreachable through
    /// only-active stations, yield [`Route::unreachable`]. The search settles
    /// stations in distance order and stops early once the destination is
    /// settled.
    pub fn shortest_path(
        &self,
        source: &NodeId,
        destination: &NodeId,
        active: &HashSet<NodeId>,
    ) -> Route {
        if !self.contains(source) || !self.contains(destination) {
            return Route::unreachable();
        }
        if !active.contains(source) || !active.contains(destination) {
            return Route::unreachable();
        }

        let mut dist: HashMap<NodeId, f64> = HashMap::new();
        let mut prev: HashMap<NodeId, NodeId> = HashMap::new();
        let mut settled: HashSet<NodeId> = HashSet::new();
        let mut frontier = BinaryHeap::new();

        dist.insert(source.clone(), 0.0);
        frontier.push(FrontierEntry {
            dist: 0.0,
            id: source.clone(),
        });

        while let Some(FrontierEntry { dist: d, id }) = frontier.pop() {
            if !settled.insert(id.clone()) {
                continue;
            }
            if &id == destination {
                break;
            }
            for (neighbor, weight) in self.neighbors(&id) {
                if settled.contains(neighbor) || !active.contains(neighbor) {
                    continue;
                }
                let candidate = d + weight;
                if candidate < dist.get(neighbor).copied().unwrap_or(f64::INFINITY) {
                    dist.insert(neighbor.clone(), candidate);
                    prev.insert(neighbor.clone(), id.clone());
                    frontier.push(FrontierEntry {
                        dist: candidate,
                        id: neighbor.clone(),
                    });
                }
            }
        }

        // Walk the predecessor chain backward from the destination.
        let mut path = vec![destination.clone()];
        let mut cursor = destination;
        while let Some(parent) = prev.get(cursor) {
            path.push(parent.clone());
            cursor = parent;
        }
        path.reverse();

        // A chain that never reached the source means the destination was
        // never settled (disconnected, or cut off by inactive stations).
        if path.len() == 1 && &path[0] != source {
            return Route::unreachable();
        }

        Route {
            total_weight: dist.get(destination).copied().unwrap_or(f64::INFINITY),
            path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology(nodes: &[&str], edges: &[(&str, &str, f64)]) -> Topology {
        let mut topo = Topology::new();
        for &n in nodes {
            topo.add_vertex(NodeId::from(n));
        }
        for &(a, b, w) in edges {
            topo.add_edge(&NodeId::from(a), &NodeId::from(b), w).unwrap();
        }
        topo
    }

    fn all_active(nodes: &[&str]) -> HashSet<NodeId> {
        nodes.iter().map(|&n| NodeId::from(n)).collect()
    }

    fn path_ids(route: &Route) -> Vec<&str> {
        route.path.iter().map(|id| id.as_str()).collect()
    }

    #[test]
    fn test_add_edge_unknown_node() {
        let mut topo = Topology::new();
        topo.add_vertex(NodeId::from("A"));
        let err = topo
            .add_edge(&NodeId::from("A"), &NodeId::from("B"), 1.0)
            .unwrap_err();
        assert_eq!(err, NetworkError::UnknownNode(NodeId::from("B")));
    }

    #[test]
    fn test_edge_is_symmetric_and_overwritten() {
        let mut topo = topology(&["A", "B"], &[("A", "B", 3.0)]);
        assert_eq!(topo.weight(&NodeId::from("A"), &NodeId::from("B")), Some(3.0));
        assert_eq!(topo.weight(&NodeId::from("B"), &NodeId::from("A")), Some(3.0));

        topo.add_edge(&NodeId::from("B"), &NodeId::from("A"), 7.0).unwrap();
        assert_eq!(topo.weight(&NodeId::from("A"), &NodeId::from("B")), Some(7.0));
    }

    #[test]
    fn test_shortest_path_prefers_two_hops() {
        let topo = topology(
            &["A", "B", "C"],
            &[("A", "B", 1.0), ("B", "C", 1.0), ("A", "C", 5.0)],
        );
        let route = topo.shortest_path(
            &NodeId::from("A"),
            &NodeId::from("C"),
            &all_active(&["A", "B", "C"]),
        );
        assert_eq!(path_ids(&route), vec!["A", "B", "C"]);
        assert_eq!(route.total_weight, 2.0);
    }

    #[test]
    fn test_inactive_relay_forces_detour() {
        let topo = topology(
            &["A", "B", "C"],
            &[("A", "B", 1.0), ("B", "C", 1.0), ("A", "C", 5.0)],
        );
        let route = topo.shortest_path(
            &NodeId::from("A"),
            &NodeId::from("C"),
            &all_active(&["A", "C"]),
        );
        assert_eq!(path_ids(&route), vec!["A", "C"]);
        assert_eq!(route.total_weight, 5.0);
    }

    #[test]
    fn test_inactive_endpoint_is_unreachable() {
        let topo = topology(&["A", "B"], &[("A", "B", 1.0)]);
        let route = topo.shortest_path(
            &NodeId::from("A"),
            &NodeId::from("B"),
            &all_active(&["A"]),
        );
        assert!(!route.is_reachable());
        assert!(route.total_weight.is_infinite());
    }

    #[test]
    fn test_unknown_node_is_unreachable() {
        let topo = topology(&["A"], &[]);
        let route = topo.shortest_path(
            &NodeId::from("A"),
            &NodeId::from("Z"),
            &all_active(&["A", "Z"]),
        );
        assert!(!route.is_reachable());
    }

    #[test]
    fn test_disconnected_is_unreachable() {
        let topo = topology(&["A", "B", "C"], &[("A", "B", 1.0)]);
        let route = topo.shortest_path(
            &NodeId::from("A"),
            &NodeId::from("C"),
            &all_active(&["A", "B", "C"]),
        );
        assert!(!route.is_reachable());
        assert!(route.total_weight.is_infinite());
    }

    #[test]
    fn test_source_equals_destination() {
        let topo = topology(&["A", "B"], &[("A", "B", 1.0)]);
        let route = topo.shortest_path(
            &NodeId::from("A"),
            &NodeId::from("A"),
            &all_active(&["A", "B"]),
        );
        assert_eq!(path_ids(&route), vec!["A"]);
        assert_eq!(route.total_weight, 0.0);
    }

    #[test]
    fn test_equal_weight_tie_break_is_deterministic() {
        // Two distinct routes of weight 2; the lower node id relay wins.
        let topo = topology(
            &["A", "B", "C", "D"],
            &[
                ("A", "B", 1.0),
                ("B", "D", 1.0),
                ("A", "C", 1.0),
                ("C", "D", 1.0),
            ],
        );
        for _ in 0..10 {
            let route = topo.shortest_path(
                &NodeId::from("A"),
                &NodeId::from("D"),
                &all_active(&["A", "B", "C", "D"]),
            );
            assert_eq!(path_ids(&route), vec!["A", "B", "D"]);
            assert_eq!(route.total_weight, 2.0);
        }
    }

    #[test]
    fn test_direct_edge_bounds_route_weight() {
        let topo = topology(
            &["A", "B", "C"],
            &[("A", "B", 2.0), ("B", "C", 2.0), ("A", "C", 10.0)],
        );
        let active = all_active(&["A", "B", "C"]);
        for (a, b, w) in topo.edges() {
            let route = topo.shortest_path(a, b, &active);
            assert!(route.total_weight <= w);
        }
    }
}
