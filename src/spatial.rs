//! Spatial index over station coordinates.
//!
//! An alternating-axis binary search tree: even depths compare latitude, odd
//! depths compare longitude. Insertion never rebalances, ties go right, and
//! there is no removal: a station leaving service is represented by its
//! active flag, which callers filter on after querying.
//!
//! The radius query prunes each subtree with a 1-D bound on the current axis
//! only. That bound is conservative but not a true 2-D check, so the index is
//! approximate-and-cheap rather than exact-and-minimal. Adversarial insertion
//! order degrades queries toward linear scans, which is acceptable at this
//! system's scale.
//!
//! Tree slots live in an arena and reference each other by index, so there is
//! no pointer aliasing anywhere.

use crate::types::{NodeId, Point};

#[derive(Debug)]
struct TreeSlot {
    id: NodeId,
    position: Point,
    left: Option<usize>,
    right: Option<usize>,
}

/// Incremental spatial index of stations.
#[derive(Debug, Default)]
pub struct SpatialIndex {
    arena: Vec<TreeSlot>,
    root: Option<usize>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        SpatialIndex {
            arena: Vec::new(),
            root: None,
        }
    }

    /// Number of indexed stations.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Add a station at its fixed coordinate.
    pub fn insert(&mut self, id: NodeId, position: Point) {
        let new_idx = self.arena.len();
        self.arena.push(TreeSlot {
            id,
            position,
            left: None,
            right: None,
        });

        let Some(mut current) = self.root else {
            self.root = Some(new_idx);
            return;
        };

        let mut lat_axis = true;
        loop {
            let (new_axis, current_axis) = if lat_axis {
                (position.lat, self.arena[current].position.lat)
            } else {
                (position.lon, self.arena[current].position.lon)
            };
            // Strict `<` goes left; ties go right.
            let go_left = new_axis < current_axis;

            let child = if go_left {
                self.arena[current].left
            } else {
                self.arena[current].right
            };
            match child {
                Some(next) => {
                    current = next;
                    lat_axis = !lat_axis;
                }
                None => {
                    if go_left {
                        self.arena[current].left = Some(new_idx);
                    } else {
                        self.arena[current].right = Some(new_idx);
                    }
                    return;
                }
            }
        }
    }

    /// All indexed stations within `radius` (Euclidean) of `center`.
    ///
    /// Result order is unspecified; callers must not rely on it beyond their
    /// own post-filtering.
    pub fn query(&self, center: Point, radius: f64) -> Vec<(NodeId, Point)> {
        let mut result = Vec::new();
        self.visit(self.root, center, radius, true, &mut result);
        result
    }

    fn visit(
        &self,
        slot: Option<usize>,
        center: Point,
        radius: f64,
        lat_axis: bool,
        out: &mut Vec<(NodeId, Point)>,
    ) {
        let Some(idx) = slot else { return };
        let node = &self.arena[idx];

        if center.distance(node.position) <= radius {
            out.push((node.id.clone(), node.position));
        }

        let (query_axis, node_axis) = if lat_axis {
            (center.lat, node.position.lat)
        } else {
            (center.lon, node.position.lon)
        };
        if query_axis - radius <= node_axis {
            self.visit(node.left, center, radius, !lat_axis, out);
        }
        if query_axis + radius >= node_axis {
            self.visit(node.right, center, radius, !lat_axis, out);
        }
    }
}
