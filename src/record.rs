//! Direct-lookup index over emergency records.
//!
//! A fixed-bucket-count hash table with chaining, keyed by emergency id.
//! This is the canonical store for [`Emergency`] records: station queues hold
//! lightweight tickets and come back here to mutate the record on dispatch.
//! Records are never removed.

use std::collections::hash_map::DefaultHasher;
use std::hash::{BuildHasher, BuildHasherDefault};

use crate::types::{Emergency, EmergencyId};

const BUCKET_COUNT: usize = 1000;

/// Chained hash table over emergencies, with upsert semantics.
pub struct RecordIndex {
    buckets: Vec<Vec<Emergency>>,
    hasher: BuildHasherDefault<DefaultHasher>,
    len: usize,
}

impl Default for RecordIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordIndex {
    pub fn new() -> Self {
        let mut buckets = Vec::with_capacity(BUCKET_COUNT);
        buckets.resize_with(BUCKET_COUNT, Vec::new);
        RecordIndex {
            buckets,
            hasher: BuildHasherDefault::default(),
            len: 0,
        }
    }

    fn bucket_of(&self, id: &EmergencyId) -> usize {
        (self.hasher.hash_one(id) % BUCKET_COUNT as u64) as usize
    }

    /// Insert a record, replacing any existing record with the same id.
    pub fn upsert(&mut self, record: Emergency) {
        let idx = self.bucket_of(&record.id);
        let bucket = &mut self.buckets[idx];
        if let Some(existing) = bucket.iter_mut().find(|e| e.id == record.id) {
            *existing = record;
        } else {
            bucket.push(record);
            self.len += 1;
        }
    }

    /// Look up a record by id. Unknown ids yield `None`, never an error.
    pub fn lookup(&self, id: &EmergencyId) -> Option<&Emergency> {
        self.buckets[self.bucket_of(id)].iter().find(|e| &e.id == id)
    }

    /// Mutable lookup, used by dispatch to resolve the record in place.
    pub fn lookup_mut(&mut self, id: &EmergencyId) -> Option<&mut Emergency> {
        let bucket = self.bucket_of(id);
        self.buckets[bucket].iter_mut().find(|e| &e.id == id)
    }

    /// All records, unordered across buckets, insertion order within one.
    pub fn all(&self) -> impl Iterator<Item = &Emergency> {
        self.buckets.iter().flatten()
    }

    /// Number of distinct records stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
