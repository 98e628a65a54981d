//! A* pathfinding over integer cells with jump, fall, climb, and diagonal
//! moves, plus a waypoint-based planner for long distances.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

use wayfarer_proto::BlockPos;
use wayfarer_world::{PathMode, WorldCache};

/// Distance at which the waypoint planner takes over from plain A*.
const LONG_RANGE_DISTANCE: f64 = 100.0;
/// Spacing of interpolated waypoints on long routes.
const WAYPOINT_DISTANCE: f64 = 50.0;
/// Node cap for each long-range segment.
const SEGMENT_MAX_NODES: usize = 10_000;
/// Raised cap for the skip-ahead segment after a failure.
const FALLBACK_MAX_NODES: usize = 15_000;
/// A popped node this close to the goal terminates the search.
const GOAL_RADIUS: f64 = 2.0;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("no path from {from} to {to}")]
    NoPath { from: BlockPos, to: BlockPos },
}

#[derive(Debug, Clone)]
pub struct PathfinderConfig {
    pub max_nodes: usize,
    pub timeout: Duration,
    pub mode: PathMode,
}

impl Default for PathfinderConfig {
    fn default() -> Self {
        Self {
            max_nodes: 20_000,
            timeout: Duration::from_secs(10),
            mode: PathMode::Strict,
        }
    }
}

#[derive(Debug, Default)]
pub struct Pathfinder {
    pub config: PathfinderConfig,
}

impl Pathfinder {
    pub fn new(config: PathfinderConfig) -> Self {
        Self { config }
    }

    /// Find a cell path. Short queries run one A* search; long queries go
    /// through the waypoint planner, which may return partial progress.
    pub fn find_path(
        &self,
        world: &WorldCache,
        start: BlockPos,
        goal: BlockPos,
    ) -> Result<Vec<BlockPos>, PathError> {
        let mode = self.config.mode;
        let start = soft_start(world, start, mode);
        let deadline = Instant::now() + self.config.timeout;

        if start.distance(&goal) < LONG_RANGE_DISTANCE {
            astar(world, start, goal, self.config.max_nodes, deadline, mode)
                .ok_or(PathError::NoPath { from: start, to: goal })
        } else {
            self.long_range(world, start, goal, deadline)
        }
    }

    /// Plan via straight-line waypoints, solving each leg with a capped A*.
    /// A failed leg is skipped by aiming at the following waypoint with a
    /// raised node budget; accumulated progress is returned even when the
    /// tail cannot be reached.
    fn long_range(
        &self,
        world: &WorldCache,
        start: BlockPos,
        goal: BlockPos,
        deadline: Instant,
    ) -> Result<Vec<BlockPos>, PathError> {
        let mode = self.config.mode;
        let waypoints = make_waypoints(world, start, goal);
        debug!(count = waypoints.len(), "long-range plan");

        let mut path: Vec<BlockPos> = Vec::new();
        let mut current = start;
        let mut i = 0;
        while i < waypoints.len() {
            match astar(world, current, waypoints[i], SEGMENT_MAX_NODES, deadline, mode) {
                Some(segment) => {
                    append_segment(&mut path, segment);
                    current = *path.last().unwrap_or(&current);
                    i += 1;
                }
                None => {
                    warn!(waypoint = %waypoints[i], "segment failed, trying soft-goal bypass");
                    let bypassed = waypoints.get(i + 1).and_then(|&next| {
                        astar(world, current, next, FALLBACK_MAX_NODES, deadline, mode)
                    });
                    match bypassed {
                        Some(segment) => {
                            append_segment(&mut path, segment);
                            current = *path.last().unwrap_or(&current);
                            i += 2;
                        }
                        None => break,
                    }
                }
            }
        }

        if path.is_empty() {
            Err(PathError::NoPath { from: start, to: goal })
        } else {
            Ok(path)
        }
    }
}

/// Rebase an unwalkable start onto the nearest walkable cell in the
/// surrounding 3x3x3 block, then one layer further down.
fn soft_start(world: &WorldCache, start: BlockPos, mode: PathMode) -> BlockPos {
    if world.is_walkable(start.x, start.y, start.z, mode) {
        return start;
    }
    let mut best: Option<(f64, BlockPos)> = None;
    for dy in [0, 1, -1, -2] {
        for dx in -1..=1 {
            for dz in -1..=1 {
                let cell = start.offset(dx, dy, dz);
                if !world.is_walkable(cell.x, cell.y, cell.z, mode) {
                    continue;
                }
                let dist = start.distance(&cell);
                if best.map_or(true, |(d, _)| dist < d) {
                    best = Some((dist, cell));
                }
            }
        }
        // Prefer cells in the nearest layer before searching lower.
        if dy == -1 && best.is_some() {
            break;
        }
    }
    best.map(|(_, cell)| cell).unwrap_or(start)
}

/// Interpolate waypoints every [`WAYPOINT_DISTANCE`] cells, snapping each to
/// the local floor when its chunk is loaded.
fn make_waypoints(world: &WorldCache, start: BlockPos, goal: BlockPos) -> Vec<BlockPos> {
    let total = start.distance(&goal);
    let steps = (total / WAYPOINT_DISTANCE).ceil().max(1.0) as i32;
    let mut waypoints = Vec::with_capacity(steps as usize);
    for i in 1..=steps {
        let t = i as f64 / steps as f64;
        let mut point = if i == steps {
            goal
        } else {
            BlockPos::new(
                (start.x as f64 + (goal.x - start.x) as f64 * t).round() as i32,
                (start.y as f64 + (goal.y - start.y) as f64 * t).round() as i32,
                (start.z as f64 + (goal.z - start.z) as f64 * t).round() as i32,
            )
        };
        if world.is_chunk_loaded(point.chunk_pos()) {
            if let Some(floor_y) = world.find_floor_below(point.x, point.y + 5, point.z, 20) {
                point.y = floor_y;
            }
        }
        waypoints.push(point);
    }
    waypoints
}

fn append_segment(path: &mut Vec<BlockPos>, segment: Vec<BlockPos>) {
    let skip = usize::from(path.last() == segment.first() && !path.is_empty());
    path.extend(segment.into_iter().skip(skip));
}

// ---------------------------------------------------------------------------
// A* core
// ---------------------------------------------------------------------------

type Key = (i32, i32, i32);

fn key(p: BlockPos) -> Key {
    (p.x, p.y, p.z)
}

struct OpenNode {
    f: f64,
    pos: BlockPos,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap pops the lowest f.
        other.f.total_cmp(&self.f)
    }
}

/// Plain A* between two cells. Returns `None` on open-set exhaustion, the
/// node cap, or the deadline.
fn astar(
    world: &WorldCache,
    start: BlockPos,
    goal: BlockPos,
    max_nodes: usize,
    deadline: Instant,
    mode: PathMode,
) -> Option<Vec<BlockPos>> {
    let mut open = BinaryHeap::new();
    let mut came_from: HashMap<Key, BlockPos> = HashMap::new();
    let mut g_score: HashMap<Key, f64> = HashMap::new();
    let mut closed: HashSet<Key> = HashSet::new();

    // A reachable goal must be hit exactly; the near-goal radius only
    // settles for a neighboring cell when the goal itself cannot be stood
    // in (mid-air or buried targets).
    let goal_walkable = world.is_walkable(goal.x, goal.y, goal.z, mode);

    g_score.insert(key(start), 0.0);
    open.push(OpenNode {
        f: start.distance(&goal),
        pos: start,
    });

    let mut expanded = 0usize;
    while let Some(OpenNode { pos, .. }) = open.pop() {
        if key(pos) == key(goal) || (!goal_walkable && pos.distance(&goal) < GOAL_RADIUS) {
            return Some(reconstruct(&came_from, pos));
        }
        if !closed.insert(key(pos)) {
            continue;
        }

        expanded += 1;
        if expanded >= max_nodes {
            debug!(expanded, "node cap reached");
            return None;
        }
        if expanded % 512 == 0 && Instant::now() >= deadline {
            debug!(expanded, "pathfinding deadline reached");
            return None;
        }

        let g_here = g_score.get(&key(pos)).copied().unwrap_or(f64::INFINITY);
        for (next, cost) in neighbors(world, pos, mode) {
            if closed.contains(&key(next)) {
                continue;
            }
            let tentative = g_here + cost;
            let best = g_score.get(&key(next)).copied().unwrap_or(f64::INFINITY);
            if tentative < best {
                g_score.insert(key(next), tentative);
                came_from.insert(key(next), pos);
                open.push(OpenNode {
                    f: tentative + next.distance(&goal),
                    pos: next,
                });
            }
        }
    }
    None
}

fn reconstruct(came_from: &HashMap<Key, BlockPos>, terminal: BlockPos) -> Vec<BlockPos> {
    let mut path = vec![terminal];
    let mut cursor = terminal;
    while let Some(&prev) = came_from.get(&key(cursor)) {
        path.push(prev);
        cursor = prev;
    }
    path.reverse();
    path
}

/// Maximum cells a fall move may drop.
const MAX_FALL: i32 = 3;

const CARDINALS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONALS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Generate `(cell, cost)` successors of `p` per the movement rules:
/// same-level walk, step-up (1.3x), falls of up to three cells
/// (1 + 0.2/cell), and climbs when standing in a climbable cell.
pub fn neighbors(world: &WorldCache, p: BlockPos, mode: PathMode) -> Vec<(BlockPos, f64)> {
    let mut out = Vec::new();

    let mut column = |tx: i32, tz: i32| {
        let base_cost = |y: i32| {
            let mut cost = world.movement_cost(tx, y, tz);
            if world.is_fluid(tx, y, tz) {
                cost += 8.0;
            }
            cost
        };

        if world.is_walkable(tx, p.y, tz, mode) {
            out.push((BlockPos::new(tx, p.y, tz), base_cost(p.y)));
            return;
        }
        if world.can_jump(p.x, p.y, p.z, mode) && world.is_walkable(tx, p.y + 1, tz, mode) {
            out.push((BlockPos::new(tx, p.y + 1, tz), 1.3 * base_cost(p.y + 1)));
            return;
        }
        for fall in 1..=MAX_FALL {
            let ty = p.y - fall;
            if world.is_walkable(tx, ty, tz, mode) {
                out.push((
                    BlockPos::new(tx, ty, tz),
                    (1.0 + 0.2 * fall as f64) * base_cost(ty),
                ));
                break;
            }
            if world.is_solid(tx, ty, tz, mode) {
                break;
            }
        }
    };

    for (dx, dz) in CARDINALS {
        column(p.x + dx, p.z + dz);
    }
    for (dx, dz) in DIAGONALS {
        // No corner-cutting through walls.
        if world.is_solid(p.x + dx, p.y, p.z, mode) || world.is_solid(p.x, p.y, p.z + dz, mode) {
            continue;
        }
        column(p.x + dx, p.z + dz);
    }

    if world.is_climbable(p.x, p.y, p.z) {
        for (dy, cost) in [(1, 1.5), (-1, 1.2)] {
            let cell = p.offset(0, dy, 0);
            if world.is_walkable(cell.x, cell.y, cell.z, mode)
                || world.is_climbable(cell.x, cell.y, cell.z)
            {
                out.push((cell, cost));
            }
        }
    }

    out
}

/// Whether `b` is a legal successor of `a` under the movement rules; used
/// by tests to audit returned paths.
pub fn is_adjacent_move(world: &WorldCache, a: BlockPos, b: BlockPos, mode: PathMode) -> bool {
    neighbors(world, a, mode).iter().any(|(cell, _)| *cell == b)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_proto::ChunkPos;
    use wayfarer_world::{BlockProps, BlockRegistry};

    fn open_world() -> WorldCache {
        let mut world = WorldCache::new(BlockRegistry::new());
        for cx in -2..=2 {
            for cz in -2..=2 {
                world.store_sections(ChunkPos::new(cx, cz), Vec::new());
            }
        }
        world
    }

    fn fill(world: &mut WorldCache, x: (i32, i32), y: (i32, i32), z: (i32, i32), state: u32) {
        for bx in x.0..=x.1 {
            for by in y.0..=y.1 {
                for bz in z.0..=z.1 {
                    world.put_block(bx, by, bz, state);
                }
            }
        }
    }

    /// 10x10 slab of solid cells at y = 63 (walkable surface at y = 64).
    fn slab_world() -> WorldCache {
        let mut world = open_world();
        fill(&mut world, (0, 9), (63, 63), (0, 9), 1);
        world
    }

    fn finder() -> Pathfinder {
        Pathfinder::default()
    }

    fn assert_sound(world: &WorldCache, path: &[BlockPos], mode: PathMode) {
        for pair in path.windows(2) {
            assert!(
                is_adjacent_move(world, pair[0], pair[1], mode),
                "illegal move {} -> {}",
                pair[0],
                pair[1]
            );
        }
    }

    // Seed scenario 1: open ground, straight path.
    #[test]
    fn straight_path_on_open_ground() {
        let world = slab_world();
        let path = finder()
            .find_path(&world, BlockPos::new(0, 64, 0), BlockPos::new(8, 64, 0))
            .unwrap();
        assert_eq!(path.len(), 9);
        assert!(path.iter().all(|p| p.y == 64));
        for pair in path.windows(2) {
            assert_eq!(pair[1].x, pair[0].x + 1, "x must increase monotonically");
        }
        assert_sound(&world, &path, PathMode::Strict);
    }

    // Seed scenario 2: single riser requiring a jump-up move. A one-cell
    // corridor pins the route over the riser.
    #[test]
    fn step_up_over_riser() {
        let mut world = open_world();
        fill(&mut world, (0, 9), (63, 63), (0, 0), 1);
        fill(&mut world, (4, 4), (64, 64), (0, 0), 1);
        let path = finder()
            .find_path(&world, BlockPos::new(0, 64, 0), BlockPos::new(8, 65, 0))
            .unwrap();
        assert!(path.contains(&BlockPos::new(4, 65, 0)), "path: {path:?}");
        // Past the riser the route drops back down and continues flat.
        let riser_at = path
            .iter()
            .position(|p| *p == BlockPos::new(4, 65, 0))
            .unwrap();
        assert!(path[riser_at + 1..].iter().all(|p| p.y == 64));
        assert_sound(&world, &path, PathMode::Strict);
    }

    // Seed scenario 3: pit crossed by falling in and stepping back out.
    #[test]
    fn pit_descends_and_climbs_back() {
        let mut world = open_world();
        // One-cell corridor with a pit over x = 3..=5; the pit floor steps
        // upward so the far rim is reachable again.
        fill(&mut world, (0, 2), (63, 63), (0, 0), 1);
        fill(&mut world, (6, 9), (63, 63), (0, 0), 1);
        world.put_block(3, 60, 0, 1);
        world.put_block(4, 61, 0, 1);
        world.put_block(5, 62, 0, 1);
        let path = finder()
            .find_path(&world, BlockPos::new(0, 64, 0), BlockPos::new(8, 64, 0))
            .unwrap();
        assert!(path.contains(&BlockPos::new(3, 61, 0)), "path: {path:?}");
        for banned in [
            BlockPos::new(3, 64, 0),
            BlockPos::new(4, 64, 0),
            BlockPos::new(5, 64, 0),
        ] {
            assert!(!path.contains(&banned), "path crosses the pit rim: {path:?}");
        }
        assert_sound(&world, &path, PathMode::Strict);
    }

    // Seed scenario 4: fully walled goal is unreachable.
    #[test]
    fn walled_goal_returns_no_path() {
        let mut world = slab_world();
        let goal = BlockPos::new(7, 64, 7);
        for (dx, dz) in [(1, 0), (-1, 0), (0, 1), (0, -1), (1, 1), (1, -1), (-1, 1), (-1, -1)] {
            fill(&mut world, (7 + dx, 7 + dx), (64, 66), (7 + dz, 7 + dz), 1);
        }
        // Roof the cell so jump-ups cannot enter either.
        world.put_block(7, 66, 7, 1);
        let result = finder().find_path(&world, BlockPos::new(0, 64, 0), goal);
        assert!(matches!(result, Err(PathError::NoPath { .. })));
    }

    #[test]
    fn diagonal_corner_cutting_rejected() {
        let mut world = slab_world();
        // Walls north and east of the start cell: the NE diagonal must not
        // slip between them.
        fill(&mut world, (5, 5), (64, 65), (4, 4), 1);
        fill(&mut world, (4, 4), (64, 65), (5, 5), 1);
        let moves = neighbors(&world, BlockPos::new(4, 64, 4), PathMode::Strict);
        assert!(!moves.iter().any(|(c, _)| *c == BlockPos::new(5, 64, 5)));
    }

    #[test]
    fn fall_stops_at_first_landing() {
        let mut world = open_world();
        fill(&mut world, (0, 0), (63, 63), (0, 0), 1); // start pillar
        fill(&mut world, (1, 1), (61, 61), (0, 0), 1); // landing two below
        fill(&mut world, (1, 1), (58, 58), (0, 0), 1); // deeper floor, ignored
        let moves = neighbors(&world, BlockPos::new(0, 64, 0), PathMode::Strict);
        assert!(moves.iter().any(|(c, _)| *c == BlockPos::new(1, 62, 0)));
        assert!(!moves.iter().any(|(c, _)| c.y < 62));
    }

    #[test]
    fn fall_blocked_by_solid_cell() {
        let mut world = open_world();
        fill(&mut world, (0, 0), (63, 63), (0, 0), 1);
        // The target column is capped (solid at 63 under a ceiling at 65):
        // no landing on top, and the fall scan must stop at the solid cell
        // instead of offering the deeper floor at 60.
        world.put_block(1, 63, 0, 1);
        world.put_block(1, 65, 0, 1);
        world.put_block(1, 60, 0, 1);
        let moves = neighbors(&world, BlockPos::new(0, 64, 0), PathMode::Strict);
        assert!(!moves.iter().any(|(c, _)| c.x == 1));
    }

    #[test]
    fn climb_moves_on_climbable_cells() {
        let mut registry = BlockRegistry::new();
        registry.insert(7, BlockProps::CLIMBABLE);
        let mut world = WorldCache::new(registry);
        world.store_sections(ChunkPos::new(0, 0), Vec::new());
        fill(&mut world, (0, 0), (63, 63), (0, 0), 1);
        for y in 64..=66 {
            world.put_block(0, y, 0, 7);
        }
        let moves = neighbors(&world, BlockPos::new(0, 65, 0), PathMode::Strict);
        let up = moves.iter().find(|(c, _)| *c == BlockPos::new(0, 66, 0));
        let down = moves.iter().find(|(c, _)| *c == BlockPos::new(0, 64, 0));
        assert_eq!(up.unwrap().1, 1.5);
        assert_eq!(down.unwrap().1, 1.2);
    }

    #[test]
    fn fluid_cells_cost_extra() {
        let mut registry = BlockRegistry::new();
        registry.insert(3, BlockProps::FLUID);
        let mut world = WorldCache::new(registry);
        world.store_sections(ChunkPos::new(0, 0), Vec::new());
        fill(&mut world, (0, 2), (63, 63), (0, 0), 1);
        world.put_block(1, 64, 0, 3);
        let moves = neighbors(&world, BlockPos::new(0, 64, 0), PathMode::Strict);
        let (_, cost) = moves
            .iter()
            .find(|(c, _)| *c == BlockPos::new(1, 64, 0))
            .unwrap();
        assert!(*cost > 8.0, "fluid surcharge missing: {cost}");
    }

    #[test]
    fn hazard_cells_rejected_outright() {
        let mut registry = BlockRegistry::new();
        registry.insert(4, BlockProps::HAZARD);
        let mut world = WorldCache::new(registry);
        world.store_sections(ChunkPos::new(0, 0), Vec::new());
        fill(&mut world, (0, 2), (63, 63), (0, 0), 1);
        world.put_block(1, 64, 0, 4);
        let moves = neighbors(&world, BlockPos::new(0, 64, 0), PathMode::Strict);
        assert!(!moves.iter().any(|(c, _)| c.x == 1 && c.y == 64));
    }

    #[test]
    fn soft_start_rebases_inside_wall() {
        let world = slab_world();
        // Start buried in the slab; the cell above is walkable.
        let path = finder()
            .find_path(&world, BlockPos::new(4, 63, 4), BlockPos::new(8, 64, 4))
            .unwrap();
        assert_eq!(path.first().unwrap().y, 64);
        assert_sound(&world, &path, PathMode::Strict);
    }

    #[test]
    fn assume_mode_crosses_unloaded_chunks() {
        // Only the start chunk is loaded; the goal is in unmapped space.
        let mut world = WorldCache::new(BlockRegistry::new());
        world.store_sections(ChunkPos::new(0, 0), Vec::new());
        fill(&mut world, (0, 15), (63, 63), (0, 15), 1);
        let finder = Pathfinder::new(PathfinderConfig {
            mode: PathMode::Assume,
            ..Default::default()
        });
        let path = finder
            .find_path(&world, BlockPos::new(4, 64, 4), BlockPos::new(40, 64, 4))
            .unwrap();
        assert_eq!(*path.last().unwrap(), BlockPos::new(40, 64, 4));
        assert_sound(&world, &path, PathMode::Assume);

        // Strict mode must refuse to leave the mapped chunk.
        let strict = Pathfinder::default();
        assert!(strict
            .find_path(&world, BlockPos::new(4, 64, 4), BlockPos::new(40, 64, 4))
            .is_err());
    }

    #[test]
    fn termination_respects_node_cap() {
        let world = slab_world();
        let finder = Pathfinder::new(PathfinderConfig {
            max_nodes: 5,
            ..Default::default()
        });
        // Adversarial: goal walled off, cap keeps the search finite.
        let result = finder.find_path(&world, BlockPos::new(0, 64, 0), BlockPos::new(9, 70, 9));
        assert!(result.is_err());
    }

    #[test]
    fn long_range_uses_waypoints_and_reaches_goal() {
        let mut world = WorldCache::new(BlockRegistry::new());
        for cx in 0..=9 {
            world.store_sections(ChunkPos::new(cx, 0), Vec::new());
        }
        for x in 0..160 {
            for z in 0..16 {
                world.put_block(x, 63, z, 1);
            }
        }
        let path = finder()
            .find_path(&world, BlockPos::new(0, 64, 8), BlockPos::new(150, 64, 8))
            .unwrap();
        assert_eq!(*path.last().unwrap(), BlockPos::new(150, 64, 8));
        assert_sound(&world, &path, PathMode::Strict);
    }

    #[test]
    fn long_range_returns_partial_progress() {
        let mut world = WorldCache::new(BlockRegistry::new());
        for cx in 0..=9 {
            world.store_sections(ChunkPos::new(cx, 0), Vec::new());
        }
        // Ground only under the first half; a chasm swallows the rest.
        for x in 0..70 {
            for z in 0..16 {
                world.put_block(x, 63, z, 1);
            }
        }
        let path = finder()
            .find_path(&world, BlockPos::new(0, 64, 8), BlockPos::new(150, 64, 8))
            .unwrap();
        let end = path.last().unwrap();
        assert!(end.x > 30, "should have advanced: {end}");
        assert!(end.x < 70, "cannot cross the chasm: {end}");
        assert_sound(&world, &path, PathMode::Strict);
    }

    #[test]
    fn adjacency_predicate_matches_neighbor_gen() {
        let world = slab_world();
        let from = BlockPos::new(4, 64, 4);
        for (cell, _) in neighbors(&world, from, PathMode::Strict) {
            assert!(is_adjacent_move(&world, from, cell, PathMode::Strict));
        }
        assert!(!is_adjacent_move(
            &world,
            from,
            BlockPos::new(4, 64, 7),
            PathMode::Strict
        ));
    }
}
