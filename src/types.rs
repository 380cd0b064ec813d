//! Core domain types for the dispatch network.

use std::fmt;

use crate::time::{Duration, Timestamp};

/// Station identifier (e.g. `"N01"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId(id.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        NodeId(id)
    }
}

/// Emergency identifier (e.g. `"E001"`), unique across the simulation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EmergencyId(String);

impl EmergencyId {
    pub fn new(id: impl Into<String>) -> Self {
        EmergencyId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmergencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EmergencyId {
    fn from(id: &str) -> Self {
        EmergencyId(id.to_owned())
    }
}

impl From<String> for EmergencyId {
    fn from(id: String) -> Self {
        EmergencyId(id)
    }
}

/// A latitude/longitude coordinate pair.
///
/// Distances are plain Euclidean; the simulation operates on an abstract
/// plane, not a geodetic model.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Point { lat, lon }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Point) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        (dlat * dlat + dlon * dlon).sqrt()
    }
}

impl From<(f64, f64)> for Point {
    fn from((lat, lon): (f64, f64)) -> Self {
        Point { lat, lon }
    }
}

/// Category of an emergency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmergencyKind {
    Fire,
    Accident,
    Theft,
    Medical,
    Rescue,
}

/// Urgency level. Lower ordinal means more urgent, so the derived ordering
/// puts `Critical` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Critical = 1,
    High = 2,
    Medium = 3,
    Low = 4,
}

impl Priority {
    /// Numeric ordinal (1 = critical ... 4 = low).
    pub const fn ordinal(self) -> u8 {
        self as u8
    }
}

/// An emergency record.
///
/// Created by the caller, registered with the network exactly once, mutated
/// in place when dispatched, and retained forever for statistics.
#[derive(Debug, Clone)]
pub struct Emergency {
    pub id: EmergencyId,
    pub kind: EmergencyKind,
    pub priority: Priority,
    pub location: Point,
    pub description: String,
    /// When the emergency was reported.
    pub created: Timestamp,
    pub resolved: bool,
    /// Set exactly when `resolved` becomes true.
    pub response_latency: Option<Duration>,
}

impl Emergency {
    pub fn new(
        id: impl Into<EmergencyId>,
        kind: EmergencyKind,
        priority: Priority,
        location: impl Into<Point>,
        description: impl Into<String>,
        created: Timestamp,
    ) -> Self {
        Emergency {
            id: id.into(),
            kind,
            priority,
            location: location.into(),
            description: description.into(),
            created,
            resolved: false,
            response_latency: None,
        }
    }

    /// Mark the emergency resolved at `now`, recording the response latency.
    pub fn resolve(&mut self, now: Timestamp) {
        self.resolved = true;
        self.response_latency = Some(now.saturating_sub(self.created));
    }
}

/// Kind of response resource a station can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Ambulance,
    Firefighter,
    Police,
    Operator,
    Server,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Ambulance => "ambulance",
            ResourceKind::Firefighter => "firefighter",
            ResourceKind::Police => "police",
            ResourceKind::Operator => "operator",
            ResourceKind::Server => "server",
        };
        f.write_str(name)
    }
}

/// A response resource owned by exactly one station.
///
/// Availability is toggled by dispatch; resources are never transferred
/// between stations.
#[derive(Debug, Clone)]
pub struct Resource {
    pub id: String,
    pub kind: ResourceKind,
    /// Home location (the owning station's position).
    pub home: Point,
    pub available: bool,
    pub capacity: u32,
}

impl Resource {
    pub fn new(id: impl Into<String>, kind: ResourceKind, home: impl Into<Point>) -> Self {
        Resource {
            id: id.into(),
            kind,
            home: home.into(),
            available: true,
            capacity: 1,
        }
    }
}
