//! Tracked entities around the avatar.

use std::collections::HashMap;
use std::time::Instant;

use wayfarer_proto::Vec3;

/// One remote entity.
#[derive(Debug, Clone)]
pub struct TrackedEntity {
    pub entity_type: i32,
    pub position: Vec3,
    pub last_update: Instant,
}

/// Entity set with absolute and delta position updates plus the spatial
/// queries navigation uses.
#[derive(Debug, Default)]
pub struct EntityTracker {
    entities: HashMap<i32, TrackedEntity>,
}

impl EntityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: i32, entity_type: i32, position: Vec3) {
        self.entities.insert(
            id,
            TrackedEntity {
                entity_type,
                position,
                last_update: Instant::now(),
            },
        );
    }

    pub fn set_position(&mut self, id: i32, position: Vec3) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.position = position;
            entity.last_update = Instant::now();
        }
    }

    /// Apply a delta already converted from wire units to blocks.
    pub fn apply_delta(&mut self, id: i32, delta: Vec3) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.position = entity.position + delta;
            entity.last_update = Instant::now();
        }
    }

    pub fn remove(&mut self, id: i32) {
        self.entities.remove(&id);
    }

    pub fn get(&self, id: i32) -> Option<&TrackedEntity> {
        self.entities.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    /// Entities within `radius` of `(x, z)` in the horizontal plane.
    pub fn nearby(&self, x: f64, z: f64, radius: f64) -> Vec<i32> {
        let center = Vec3::new(x, 0.0, z);
        self.entities
            .iter()
            .filter(|(_, e)| e.position.distance_xz(&center) <= radius)
            .map(|(&id, _)| id)
            .collect()
    }

    /// Entities whose perpendicular distance to the segment `a -> b` is at
    /// most `max_dist`: the crowd standing along the intended step.
    pub fn near_segment(&self, a: Vec3, b: Vec3, max_dist: f64) -> Vec<i32> {
        self.entities
            .iter()
            .filter(|(_, e)| segment_distance(e.position, a, b) <= max_dist)
            .map(|(&id, _)| id)
            .collect()
    }
}

/// Distance from `p` to the closest point of segment `a -> b`.
fn segment_distance(p: Vec3, a: Vec3, b: Vec3) -> f64 {
    let ab = b - a;
    let len_sq = ab.x * ab.x + ab.y * ab.y + ab.z * ab.z;
    if len_sq == 0.0 {
        return p.distance(&a);
    }
    let ap = p - a;
    let t = ((ap.x * ab.x + ap.y * ab.y + ap.z * ab.z) / len_sq).clamp(0.0, 1.0);
    p.distance(&(a + ab * t))
}
