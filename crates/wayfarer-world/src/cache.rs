//! Block and chunk cache.
//!
//! Only non-empty cells occupy memory: `block_cache` maps a packed cell key
//! to its state id, and `chunk_blocks` remembers which keys each chunk
//! contributed so unloading a chunk touches exactly its own cells.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use wayfarer_proto::{BlockPos, ChunkPos};

use crate::block::{BlockProps, BlockRegistry};
use crate::chunk::{ChunkRecord, DecodedSection, MIN_Y};
use crate::decode::{decode_chunk_body, DecodeError};

/// Sentinel returned by [`WorldCache::get_block`] for cells in chunks that
/// are not loaded. Distinct from any storable state id.
pub const UNLOADED: i32 = -1;

/// How block queries treat the [`UNLOADED`] sentinel.
///
/// The motion controller always runs `Strict` (unloaded is solid, fail
/// closed); the long-range planner may run `Assume` so routes can cross
/// unmapped territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMode {
    Strict,
    Assume,
}

/// Pack cell coordinates into one 64-bit key: x and z get 26 signed bits,
/// y gets 12.
fn pack_key(x: i32, y: i32, z: i32) -> i64 {
    (((x as i64) & 0x3FF_FFFF) << 38) | (((z as i64) & 0x3FF_FFFF) << 12) | ((y as i64) & 0xFFF)
}

pub struct WorldCache {
    chunks: HashMap<ChunkPos, ChunkRecord>,
    block_cache: HashMap<i64, u32>,
    chunk_blocks: HashMap<ChunkPos, HashSet<i64>>,
    registry: BlockRegistry,
    decode_failures: u64,
}

impl WorldCache {
    pub fn new(registry: BlockRegistry) -> Self {
        Self {
            chunks: HashMap::new(),
            block_cache: HashMap::new(),
            chunk_blocks: HashMap::new(),
            registry,
            decode_failures: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Chunk lifecycle
    // -----------------------------------------------------------------------

    /// Decode and index a chunk payload, replacing any existing record.
    /// A payload that fails every decode strategy is skipped and counted;
    /// the server keeps sending regardless.
    pub fn store_chunk(&mut self, pos: ChunkPos, body: &[u8]) -> Result<(), DecodeError> {
        match decode_chunk_body(body) {
            Ok(sections) => {
                self.store_sections(pos, sections);
                Ok(())
            }
            Err(e) => {
                self.decode_failures += 1;
                warn!(chunk = %pos, failures = self.decode_failures, "chunk decode failed: {e}");
                Err(e)
            }
        }
    }

    /// Index already-decoded sections under a chunk record.
    pub fn store_sections(&mut self, pos: ChunkPos, sections: Vec<DecodedSection>) {
        self.unload_chunk(pos);

        let mut keys = HashSet::new();
        for (section_y, section) in sections.iter().enumerate() {
            let base_y = MIN_Y + (section_y as i32) * 16;
            for (idx, &state) in section.states.iter().enumerate() {
                if state == 0 {
                    continue;
                }
                let local_y = (idx / 256) as i32;
                let local_z = ((idx / 16) % 16) as i32;
                let local_x = (idx % 16) as i32;
                let key = pack_key(pos.x * 16 + local_x, base_y + local_y, pos.z * 16 + local_z);
                self.block_cache.insert(key, state);
                keys.insert(key);
            }
        }

        self.chunk_blocks.insert(pos, keys);
        self.chunks.insert(pos, ChunkRecord::new(pos, sections));
    }

    /// Remove a chunk and every cell it contributed.
    pub fn unload_chunk(&mut self, pos: ChunkPos) {
        if self.chunks.remove(&pos).is_none() {
            return;
        }
        if let Some(keys) = self.chunk_blocks.remove(&pos) {
            for key in keys {
                self.block_cache.remove(&key);
            }
        }
    }

    /// Unload every chunk farther (Chebyshev, chunk coords) than
    /// `keep_range` from the given center.
    pub fn clear_distant_chunks(&mut self, center: ChunkPos, keep_range: i32) {
        let distant: Vec<ChunkPos> = self
            .chunks
            .keys()
            .filter(|pos| pos.chebyshev(&center) > keep_range)
            .copied()
            .collect();
        if !distant.is_empty() {
            debug!(count = distant.len(), "unloading distant chunks");
        }
        for pos in distant {
            self.unload_chunk(pos);
        }
    }

    /// Apply a single-cell update (block-change packet). Ignored when the
    /// containing chunk is not loaded.
    pub fn put_block(&mut self, x: i32, y: i32, z: i32, state: u32) {
        let chunk = BlockPos::new(x, y, z).chunk_pos();
        if !self.chunks.contains_key(&chunk) {
            return;
        }
        let key = pack_key(x, y, z);
        if state == 0 {
            self.block_cache.remove(&key);
            if let Some(keys) = self.chunk_blocks.get_mut(&chunk) {
                keys.remove(&key);
            }
        } else {
            self.block_cache.insert(key, state);
            self.chunk_blocks.entry(chunk).or_default().insert(key);
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_chunk_loaded(&self, pos: ChunkPos) -> bool {
        self.chunks.contains_key(&pos)
    }

    pub fn decode_failures(&self) -> u64 {
        self.decode_failures
    }

    // -----------------------------------------------------------------------
    // Cell queries
    // -----------------------------------------------------------------------

    /// State id at a cell: [`UNLOADED`] if the chunk is absent, 0 for empty
    /// cells of loaded chunks.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> i32 {
        let chunk = BlockPos::new(x, y, z).chunk_pos();
        if !self.chunks.contains_key(&chunk) {
            return UNLOADED;
        }
        self.block_cache
            .get(&pack_key(x, y, z))
            .map(|&s| s as i32)
            .unwrap_or(0)
    }

    fn props(&self, x: i32, y: i32, z: i32) -> Option<BlockProps> {
        match self.get_block(x, y, z) {
            UNLOADED => None,
            id => Some(self.registry.get(id as u32)),
        }
    }

    pub fn is_solid(&self, x: i32, y: i32, z: i32, mode: PathMode) -> bool {
        match self.props(x, y, z) {
            Some(props) => props.solid,
            None => mode == PathMode::Strict,
        }
    }

    pub fn is_fluid(&self, x: i32, y: i32, z: i32) -> bool {
        self.props(x, y, z).is_some_and(|p| p.fluid)
    }

    pub fn is_climbable(&self, x: i32, y: i32, z: i32) -> bool {
        self.props(x, y, z).is_some_and(|p| p.climbable)
    }

    pub fn is_hazard(&self, x: i32, y: i32, z: i32) -> bool {
        self.props(x, y, z).is_some_and(|p| p.hazard)
    }

    /// A cell an avatar can stand in: feet and head passable, supported by a
    /// solid floor (or a climbable feet cell). In `Assume` mode an unloaded
    /// feet cell counts as walkable outright.
    pub fn is_walkable(&self, x: i32, y: i32, z: i32, mode: PathMode) -> bool {
        if self.get_block(x, y, z) == UNLOADED {
            return mode == PathMode::Assume;
        }
        if self.is_solid(x, y, z, mode) || self.is_hazard(x, y, z) {
            return false;
        }
        if self.is_solid(x, y + 1, z, mode) {
            return false;
        }
        // The floor check always fails closed; an unloaded floor still
        // counts as support so Assume-mode routes can cross chunk borders.
        self.is_solid(x, y - 1, z, PathMode::Strict) || self.is_climbable(x, y, z)
    }

    /// Headroom for a jump from this cell.
    pub fn can_jump(&self, x: i32, y: i32, z: i32, mode: PathMode) -> bool {
        !self.is_solid(x, y + 2, z, mode)
    }

    /// Scan downward from `y` for the first cell with a solid floor under
    /// it, up to `max_fall` cells.
    pub fn find_floor_below(&self, x: i32, y: i32, z: i32, max_fall: i32) -> Option<i32> {
        for dy in 0..=max_fall {
            let cell_y = y - dy;
            if !self.is_solid(x, cell_y, z, PathMode::Strict)
                && self.is_solid(x, cell_y - 1, z, PathMode::Strict)
            {
                return Some(cell_y);
            }
        }
        None
    }

    /// Traversal cost of entering a cell. Fluids are expensive, and open
    /// ground costs slightly more than wall-hugging routes.
    pub fn movement_cost(&self, x: i32, y: i32, z: i32) -> f64 {
        let mut cost = 1.0;
        if self.is_fluid(x, y, z) {
            cost += 2.0;
        }
        if self.is_fluid(x, y - 1, z) {
            cost += 1.5;
        }
        let open = !(-1..=1).any(|dx| {
            (-1..=1).any(|dz| {
                (dx != 0 || dz != 0) && self.is_solid(x + dx, y, z + dz, PathMode::Strict)
            })
        });
        if open {
            cost += 0.5;
        }
        cost
    }

    // -----------------------------------------------------------------------
    // Invariant audit (tests)
    // -----------------------------------------------------------------------

    /// The union of per-chunk key sets must equal the block-cache key set.
    #[cfg(test)]
    pub(crate) fn check_index_invariant(&self) {
        let union: HashSet<i64> = self.chunk_blocks.values().flatten().copied().collect();
        let cached: HashSet<i64> = self.block_cache.keys().copied().collect();
        assert_eq!(union, cached, "chunk_blocks union must equal block_cache");
    }

    #[cfg(test)]
    pub(crate) fn cached_block_count(&self) -> usize {
        self.block_cache.len()
    }

    #[cfg(test)]
    pub(crate) fn has_chunk_index(&self, pos: ChunkPos) -> bool {
        self.chunk_blocks.contains_key(&pos)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{BIOME_VOLUME, SECTION_COUNT, SECTION_VOLUME};

    /// Cache with a flat slab: solid state 1 across the full 16x16 footprint
    /// of chunk (0,0) at world y = 63.
    pub(crate) fn slab_world() -> WorldCache {
        let mut world = WorldCache::new(BlockRegistry::new());
        world.store_sections(ChunkPos::new(0, 0), slab_sections(63, 1));
        world
    }

    /// Sections for one chunk with a single filled layer at `floor_y`.
    pub(crate) fn slab_sections(floor_y: i32, state: u32) -> Vec<DecodedSection> {
        let mut sections = Vec::new();
        for section_y in 0..SECTION_COUNT as i32 {
            let base = MIN_Y + section_y * 16;
            let mut states = vec![0u32; SECTION_VOLUME];
            if floor_y >= base && floor_y < base + 16 {
                let local = (floor_y - base) as usize;
                for idx in 0..256 {
                    states[local * 256 + idx] = state;
                }
            }
            sections.push(DecodedSection {
                block_count: states.iter().filter(|&&s| s != 0).count() as i16,
                states,
                biomes: vec![0; BIOME_VOLUME],
            });
        }
        sections
    }

    #[test]
    fn get_block_distinguishes_unloaded_air_and_solid() {
        let world = slab_world();
        assert_eq!(world.get_block(8, 63, 8), 1);
        assert_eq!(world.get_block(8, 64, 8), 0);
        assert_eq!(world.get_block(100, 63, 8), UNLOADED);
        assert_eq!(world.get_block(-1, 63, 0), UNLOADED);
    }

    #[test]
    fn store_via_wire_body() {
        let body =
            crate::decode::tests::body_with_sections(&[crate::decode::tests::slab_section(1)]);
        let mut world = WorldCache::new(BlockRegistry::new());
        world.store_chunk(ChunkPos::new(0, 0), &body).unwrap();
        // The slab sits at the bottom of section 0: world y = MIN_Y.
        assert_eq!(world.get_block(5, MIN_Y, 5), 1);
        assert_eq!(world.get_block(5, MIN_Y + 1, 5), 0);
        world.check_index_invariant();
    }

    #[test]
    fn bad_body_counts_failure_and_stores_nothing() {
        let mut world = WorldCache::new(BlockRegistry::new());
        assert!(world.store_chunk(ChunkPos::new(0, 0), &[0xFF, 0x00]).is_err());
        assert_eq!(world.decode_failures(), 1);
        assert_eq!(world.chunk_count(), 0);
        assert_eq!(world.get_block(0, 0, 0), UNLOADED);
    }

    #[test]
    fn unload_chunk_removes_every_tracked_cell() {
        let mut world = slab_world();
        assert_eq!(world.cached_block_count(), 256);
        world.unload_chunk(ChunkPos::new(0, 0));
        assert_eq!(world.cached_block_count(), 0);
        assert!(!world.has_chunk_index(ChunkPos::new(0, 0)));
        assert_eq!(world.get_block(8, 63, 8), UNLOADED);
        world.check_index_invariant();
    }

    #[test]
    fn index_invariant_holds_across_store_unload_sequences() {
        let mut world = WorldCache::new(BlockRegistry::new());
        let script: &[(i32, i32, bool)] = &[
            (0, 0, true),
            (1, 0, true),
            (0, 0, true), // re-store replaces
            (1, 0, false),
            (2, 2, true),
            (0, 0, false),
            (5, 5, false), // unload of never-loaded chunk is a no-op
        ];
        for &(cx, cz, store) in script {
            let pos = ChunkPos::new(cx, cz);
            if store {
                world.store_sections(pos, slab_sections(63, 1));
            } else {
                world.unload_chunk(pos);
            }
            world.check_index_invariant();
        }
        assert_eq!(world.chunk_count(), 1);
        assert_eq!(world.cached_block_count(), 256);
    }

    #[test]
    fn restore_replaces_previous_index() {
        let mut world = WorldCache::new(BlockRegistry::new());
        let pos = ChunkPos::new(0, 0);
        world.store_sections(pos, slab_sections(63, 1));
        world.store_sections(pos, slab_sections(70, 2));
        assert_eq!(world.get_block(3, 63, 3), 0, "old slab must be gone");
        assert_eq!(world.get_block(3, 70, 3), 2);
        assert_eq!(world.cached_block_count(), 256);
        world.check_index_invariant();
    }

    #[test]
    fn clear_distant_uses_chebyshev() {
        let mut world = WorldCache::new(BlockRegistry::new());
        for cx in -3..=3 {
            for cz in -3..=3 {
                world.store_sections(ChunkPos::new(cx, cz), slab_sections(63, 1));
            }
        }
        world.clear_distant_chunks(ChunkPos::new(0, 0), 2);
        assert_eq!(world.chunk_count(), 25);
        assert!(world.is_chunk_loaded(ChunkPos::new(2, -2)));
        assert!(!world.is_chunk_loaded(ChunkPos::new(3, 0)));
        world.check_index_invariant();
    }

    #[test]
    fn put_block_updates_index_both_ways() {
        let mut world = slab_world();
        world.put_block(4, 64, 4, 9);
        assert_eq!(world.get_block(4, 64, 4), 9);
        world.check_index_invariant();
        world.put_block(4, 64, 4, 0);
        assert_eq!(world.get_block(4, 64, 4), 0);
        world.check_index_invariant();
        // Updates outside loaded chunks are dropped.
        world.put_block(500, 64, 500, 9);
        assert_eq!(world.get_block(500, 64, 500), UNLOADED);
    }

    #[test]
    fn packed_keys_do_not_collide_on_negatives() {
        let mut world = WorldCache::new(BlockRegistry::new());
        world.store_sections(ChunkPos::new(-1, -1), slab_sections(63, 1));
        assert_eq!(world.get_block(-8, 63, -8), 1);
        assert_eq!(world.get_block(-8, 62, -8), 0);
        assert_eq!(world.get_block(-8, 64, -8), 0);
    }

    #[test]
    fn strict_mode_treats_unloaded_as_solid() {
        let world = slab_world();
        assert!(world.is_solid(100, 63, 100, PathMode::Strict));
        assert!(!world.is_solid(100, 63, 100, PathMode::Assume));
        assert!(!world.is_walkable(100, 64, 100, PathMode::Strict));
        assert!(world.is_walkable(100, 64, 100, PathMode::Assume));
    }

    #[test]
    fn walkable_needs_clearance_and_floor() {
        let mut world = slab_world();
        assert!(world.is_walkable(8, 64, 8, PathMode::Strict));
        assert!(!world.is_walkable(8, 63, 8, PathMode::Strict), "inside slab");
        assert!(!world.is_walkable(8, 66, 8, PathMode::Strict), "no floor");
        // Low ceiling over the feet cell.
        world.put_block(8, 65, 8, 1);
        assert!(!world.is_walkable(8, 64, 8, PathMode::Strict));
    }

    #[test]
    fn climbable_cell_is_walkable_without_floor() {
        let mut registry = BlockRegistry::new();
        registry.insert(7, BlockProps::CLIMBABLE);
        let mut world = WorldCache::new(registry);
        world.store_sections(ChunkPos::new(0, 0), slab_sections(63, 1));
        world.put_block(8, 66, 8, 7);
        assert!(world.is_walkable(8, 66, 8, PathMode::Strict));
        assert!(world.is_climbable(8, 66, 8));
    }

    #[test]
    fn can_jump_checks_headroom() {
        let mut world = slab_world();
        assert!(world.can_jump(8, 64, 8, PathMode::Strict));
        world.put_block(8, 66, 8, 1);
        assert!(!world.can_jump(8, 64, 8, PathMode::Strict));
    }

    #[test]
    fn find_floor_below_scans_down() {
        let world = slab_world();
        assert_eq!(world.find_floor_below(8, 69, 8, 20), Some(64));
        assert_eq!(world.find_floor_below(8, 64, 8, 20), Some(64));
        assert_eq!(world.find_floor_below(8, 69, 8, 2), None);
    }

    #[test]
    fn movement_cost_terms() {
        let mut registry = BlockRegistry::new();
        registry.insert(3, BlockProps::FLUID);
        let mut world = WorldCache::new(registry);
        world.store_sections(ChunkPos::new(0, 0), slab_sections(63, 1));

        // Open slab: base 1.0 plus the open-ground penalty.
        assert_eq!(world.movement_cost(8, 64, 8), 1.5);

        // A wall neighbor removes the open-ground penalty.
        world.put_block(7, 64, 8, 1);
        assert_eq!(world.movement_cost(8, 64, 8), 1.0);

        // Fluid at the feet.
        world.put_block(8, 64, 8, 3);
        assert_eq!(world.movement_cost(8, 64, 8), 3.0);

        // Fluid below as well.
        world.put_block(8, 63, 8, 3);
        assert_eq!(world.movement_cost(8, 64, 8), 4.5);
    }
}
