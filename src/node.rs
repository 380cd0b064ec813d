//! Dispatch stations.
//!
//! A station owns a local priority queue of pending emergencies, a pool of
//! response resources, an active flag, and cumulative counters. The queue
//! holds lightweight tickets; the canonical emergency records live in the
//! network's [`RecordIndex`] and are mutated in place on dispatch.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use hashbrown::HashMap;

use crate::record::RecordIndex;
use crate::time::Timestamp;
use crate::types::{EmergencyId, NodeId, Point, Priority, Resource};

/// Base byte cost per simulated broadcast, on top of the description length.
pub const TRANSMISSION_OVERHEAD_BYTES: u64 = 100;

/// A pending emergency in a station's queue.
///
/// Ordered by priority ordinal, then by insertion sequence number. The
/// sequence number is reassigned on every enqueue, so a ticket deferred for
/// lack of resources re-enters behind equal-priority peers that arrived in
/// the meantime. Within a priority level the order is deterministic but not
/// arrival-FIFO across deferrals.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket {
    pub priority: Priority,
    seq: u64,
    pub id: EmergencyId,
}

/// Outcome of a single dispatch attempt at one station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The queue was empty.
    Idle,
    /// The popped ticket referenced a missing or already-resolved record and
    /// was discarded.
    Stale(EmergencyId),
    /// No resource was available; the ticket was pushed back.
    Deferred(EmergencyId),
    /// The emergency was resolved. `bytes` is the total simulated broadcast
    /// cost, already added to the station's own counter.
    Resolved { id: EmergencyId, bytes: u64 },
}

/// Optional metadata attached to a station after construction, e.g. when a
/// topology adapter knows the underlying device.
#[derive(Debug, Clone, Default)]
pub struct StationMetadata {
    pub ip: Option<String>,
    pub hardware: Option<String>,
}

/// A dispatch station.
#[derive(Debug)]
pub struct Station {
    id: NodeId,
    name: String,
    position: Point,
    active: bool,
    resources: Vec<Resource>,
    queue: BinaryHeap<Reverse<Ticket>>,
    /// Mirror of this station's topology edges: neighbor id -> weight.
    links: HashMap<NodeId, f64>,
    next_seq: u64,
    resolved_count: u64,
    bytes_transmitted: u64,
    pub metadata: StationMetadata,
}

impl Station {
    pub(crate) fn new(id: NodeId, name: impl Into<String>, position: Point) -> Self {
        Station {
            id,
            name: name.into(),
            position,
            active: true,
            resources: Vec::new(),
            queue: BinaryHeap::new(),
            links: HashMap::new(),
            next_seq: 0,
            resolved_count: 0,
            bytes_transmitted: 0,
            metadata: StationMetadata::default(),
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Number of pending tickets.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn resolved_count(&self) -> u64 {
        self.resolved_count
    }

    pub fn bytes_transmitted(&self) -> u64 {
        self.bytes_transmitted
    }

    /// Adjacency mirror: neighbor id -> edge weight.
    pub fn links(&self) -> &HashMap<NodeId, f64> {
        &self.links
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Count of currently available resources.
    pub fn available_resources(&self) -> usize {
        self.resources.iter().filter(|r| r.available).count()
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub(crate) fn add_resource(&mut self, resource: Resource) {
        self.resources.push(resource);
    }

    pub(crate) fn link(&mut self, neighbor: NodeId, weight: f64) {
        self.links.insert(neighbor, weight);
    }

    /// Insert a ticket into the local priority queue.
    pub(crate) fn enqueue(&mut self, id: EmergencyId, priority: Priority) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Ticket { priority, seq, id }));
    }

    /// Drain the whole queue in priority order (used on deactivation).
    pub(crate) fn drain(&mut self) -> Vec<Ticket> {
        let mut tickets = Vec::with_capacity(self.queue.len());
        while let Some(Reverse(ticket)) = self.queue.pop() {
            tickets.push(ticket);
        }
        tickets
    }

    /// Pop the top-priority ticket and attempt to resolve it.
    ///
    /// `active_neighbors` is the number of this station's neighbors that are
    /// currently active; each one costs `description.len() + 100` simulated
    /// bytes on resolution.
    pub(crate) fn dispatch_one(
        &mut self,
        records: &mut RecordIndex,
        now: Timestamp,
        active_neighbors: usize,
    ) -> DispatchOutcome {
        let Some(Reverse(ticket)) = self.queue.pop() else {
            return DispatchOutcome::Idle;
        };

        let Some(record) = records.lookup_mut(&ticket.id) else {
            return DispatchOutcome::Stale(ticket.id);
        };
        if record.resolved {
            return DispatchOutcome::Stale(ticket.id);
        }

        match self.resources.iter_mut().find(|r| r.available) {
            Some(resource) => {
                resource.available = false;
                record.resolve(now);
                self.resolved_count += 1;
                let bytes = (record.description.len() as u64 + TRANSMISSION_OVERHEAD_BYTES)
                    * active_neighbors as u64;
                self.bytes_transmitted += bytes;
                DispatchOutcome::Resolved {
                    id: ticket.id,
                    bytes,
                }
            }
            None => {
                // Re-queue with a fresh sequence number; not lost, but it may
                // fall behind equal-priority peers that arrived later.
                self.enqueue(ticket.id.clone(), ticket.priority);
                DispatchOutcome::Deferred(ticket.id)
            }
        }
    }
}
