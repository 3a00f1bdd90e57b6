//! Spatial registry: last-known NPC positions plus the latest startle broadcast
//!
//! Positions are bucketed into a sparse hash grid on the x/z plane so radius
//! queries only touch the cells that overlap the query circle.

use ahash::AHashMap;
use glam::Vec3;

use crate::core::types::{NpcId, Timestamp};

/// A single fright broadcast, e.g. from a successful eat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartleRecord {
    pub origin: Vec3,
    pub at: Timestamp,
}

pub struct SpatialRegistry {
    cell_size: f32,
    positions: AHashMap<NpcId, Vec3>,
    cells: AHashMap<(i32, i32), Vec<NpcId>>,
    last_startle: Option<StartleRecord>,
}

impl SpatialRegistry {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(0.5),
            positions: AHashMap::new(),
            cells: AHashMap::new(),
            last_startle: None,
        }
    }

    #[inline]
    fn cell_coord(&self, pos: Vec3) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.z / self.cell_size).floor() as i32,
        )
    }

    /// Record the resolved position of an NPC for this frame
    pub fn publish(&mut self, id: NpcId, pos: Vec3) {
        let new_cell = self.cell_coord(pos);
        if let Some(old) = self.positions.insert(id, pos) {
            let old_cell = self.cell_coord(old);
            if old_cell == new_cell {
                return;
            }
            self.detach(id, old_cell);
        }
        self.cells.entry(new_cell).or_default().push(id);
    }

    /// Forget an NPC (eaten or despawned)
    pub fn remove(&mut self, id: NpcId) {
        if let Some(old) = self.positions.remove(&id) {
            let cell = self.cell_coord(old);
            self.detach(id, cell);
        }
    }

    fn detach(&mut self, id: NpcId, cell: (i32, i32)) {
        if let Some(bucket) = self.cells.get_mut(&cell) {
            bucket.retain(|&e| e != id);
            if bucket.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }

    /// Drop every entry whose id fails the predicate
    pub fn retain(&mut self, mut keep: impl FnMut(NpcId) -> bool) {
        self.positions.retain(|id, _| keep(*id));
        let positions = &self.positions;
        self.cells.retain(|_, bucket| {
            bucket.retain(|id| positions.contains_key(id));
            !bucket.is_empty()
        });
    }

    pub fn position(&self, id: NpcId) -> Option<Vec3> {
        self.positions.get(&id).copied()
    }

    /// All registered NPCs within `radius` of `center`, sorted by id
    pub fn within(&self, center: Vec3, radius: f32) -> Vec<NpcId> {
        let radius_sq = radius * radius;
        let (min_x, min_z) = self.cell_coord(center - Vec3::splat(radius));
        let (max_x, max_z) = self.cell_coord(center + Vec3::splat(radius));

        let mut found = Vec::new();
        for cx in min_x..=max_x {
            for cz in min_z..=max_z {
                let Some(bucket) = self.cells.get(&(cx, cz)) else {
                    continue;
                };
                for id in bucket {
                    if let Some(pos) = self.positions.get(id) {
                        if pos.distance_squared(center) <= radius_sq {
                            found.push(*id);
                        }
                    }
                }
            }
        }
        // Bucket iteration order is hash-dependent; callers need a stable order
        found.sort_unstable();
        found
    }

    pub fn broadcast_startle(&mut self, origin: Vec3, at: Timestamp) {
        self.last_startle = Some(StartleRecord { origin, at });
    }

    pub fn last_startle(&self) -> Option<StartleRecord> {
        self.last_startle
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.cells.clear();
        self.last_startle = None;
    }
}

impl Default for SpatialRegistry {
    fn default() -> Self {
        Self::new(10.0)
    }
}
