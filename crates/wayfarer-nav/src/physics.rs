//! Avatar physics: vanilla-compliant constants and swept-AABB collision.

use wayfarer_proto::Vec3;
use wayfarer_world::{PathMode, WorldCache};

pub const GRAVITY: f64 = -0.08;
pub const DRAG: f64 = 0.98;
pub const TERMINAL_VELOCITY: f64 = -3.92;
pub const JUMP_VELOCITY: f64 = 0.42;
pub const JUMP_COOLDOWN_TICKS: u32 = 10;
/// Walk speed in cells per second.
pub const WALK_SPEED: f64 = 4.317;
pub const TICK_SECONDS: f64 = 0.05;
/// Horizontal distance covered in one tick at walk speed.
pub const STEP_PER_TICK: f64 = WALK_SPEED * TICK_SECONDS;

pub const HALF_WIDTH: f64 = 0.3;
pub const HEIGHT: f64 = 1.8;
pub const STEP_HEIGHT: f64 = 0.6;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Avatar box standing at a feet position.
    pub fn player(feet: Vec3) -> Self {
        Self {
            min: Vec3::new(feet.x - HALF_WIDTH, feet.y, feet.z - HALF_WIDTH),
            max: Vec3::new(feet.x + HALF_WIDTH, feet.y + HEIGHT, feet.z + HALF_WIDTH),
        }
    }

    /// Unit cube of the cell at integer coordinates.
    pub fn unit(x: i32, y: i32, z: i32) -> Self {
        Self {
            min: Vec3::new(x as f64, y as f64, z as f64),
            max: Vec3::new(x as f64 + 1.0, y as f64 + 1.0, z as f64 + 1.0),
        }
    }

    pub fn offset(&self, d: Vec3) -> Self {
        Self {
            min: self.min + d,
            max: self.max + d,
        }
    }

    /// Feet position of an avatar box.
    pub fn feet(&self) -> Vec3 {
        Vec3::new(
            (self.min.x + self.max.x) / 2.0,
            self.min.y,
            (self.min.z + self.max.z) / 2.0,
        )
    }

    /// Smallest box containing this one swept along `motion`.
    pub fn expanded_by_motion(&self, motion: Vec3) -> Self {
        let mut out = *self;
        if motion.x < 0.0 {
            out.min.x += motion.x;
        } else {
            out.max.x += motion.x;
        }
        if motion.y < 0.0 {
            out.min.y += motion.y;
        } else {
            out.max.y += motion.y;
        }
        if motion.z < 0.0 {
            out.min.z += motion.z;
        } else {
            out.max.z += motion.z;
        }
        out
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.overlaps_x(other) && self.overlaps_y(other) && self.overlaps_z(other)
    }

    fn overlaps_x(&self, other: &Aabb) -> bool {
        self.max.x > other.min.x && self.min.x < other.max.x
    }

    fn overlaps_y(&self, other: &Aabb) -> bool {
        self.max.y > other.min.y && self.min.y < other.max.y
    }

    fn overlaps_z(&self, other: &Aabb) -> bool {
        self.max.z > other.min.z && self.min.z < other.max.z
    }
}

/// Collect the solid unit cubes a box could touch, padded to cell ceilings.
/// Unloaded cells count as solid (the motion controller fails closed).
pub fn collect_boxes(world: &WorldCache, area: &Aabb) -> Vec<Aabb> {
    let min_x = area.min.x.floor() as i32;
    let max_x = area.max.x.ceil() as i32;
    let min_y = area.min.y.floor() as i32;
    let max_y = area.max.y.ceil() as i32;
    let min_z = area.min.z.floor() as i32;
    let max_z = area.max.z.ceil() as i32;

    let mut boxes = Vec::new();
    for y in min_y..max_y {
        for z in min_z..max_z {
            for x in min_x..max_x {
                if world.is_solid(x, y, z, PathMode::Strict) {
                    boxes.push(Aabb::unit(x, y, z));
                }
            }
        }
    }
    boxes
}

/// Clamp motion along X so `moving` stops flush against `block`, provided
/// the boxes overlap on the other two axes.
pub fn clip_x(moving: &Aabb, block: &Aabb, dx: f64) -> f64 {
    if !moving.overlaps_y(block) || !moving.overlaps_z(block) {
        return dx;
    }
    if dx > 0.0 && moving.max.x <= block.min.x {
        dx.min(block.min.x - moving.max.x)
    } else if dx < 0.0 && moving.min.x >= block.max.x {
        dx.max(block.max.x - moving.min.x)
    } else {
        dx
    }
}

pub fn clip_y(moving: &Aabb, block: &Aabb, dy: f64) -> f64 {
    if !moving.overlaps_x(block) || !moving.overlaps_z(block) {
        return dy;
    }
    if dy > 0.0 && moving.max.y <= block.min.y {
        dy.min(block.min.y - moving.max.y)
    } else if dy < 0.0 && moving.min.y >= block.max.y {
        dy.max(block.max.y - moving.min.y)
    } else {
        dy
    }
}

pub fn clip_z(moving: &Aabb, block: &Aabb, dz: f64) -> f64 {
    if !moving.overlaps_x(block) || !moving.overlaps_y(block) {
        return dz;
    }
    if dz > 0.0 && moving.max.z <= block.min.z {
        dz.min(block.min.z - moving.max.z)
    } else if dz < 0.0 && moving.min.z >= block.max.z {
        dz.max(block.max.z - moving.min.z)
    } else {
        dz
    }
}

fn sweep_x(bb: &Aabb, boxes: &[Aabb], mut dx: f64) -> f64 {
    for block in boxes {
        dx = clip_x(bb, block, dx);
    }
    dx
}

fn sweep_y(bb: &Aabb, boxes: &[Aabb], mut dy: f64) -> f64 {
    for block in boxes {
        dy = clip_y(bb, block, dy);
    }
    dy
}

fn sweep_z(bb: &Aabb, boxes: &[Aabb], mut dz: f64) -> f64 {
    for block in boxes {
        dz = clip_z(bb, block, dz);
    }
    dz
}

/// Result of moving the avatar box one tick.
#[derive(Debug, Clone, Copy)]
pub struct StepResult {
    pub feet: Vec3,
    pub velocity_y: f64,
    pub on_ground: bool,
    pub blocked_horizontally: bool,
    pub stepped_up: bool,
}

/// Sweep the avatar from `feet` by the planned horizontal motion and the
/// current vertical velocity. Order: X, then Z, optional step-up retry,
/// then Y.
pub fn step(
    world: &WorldCache,
    feet: Vec3,
    dx: f64,
    dz: f64,
    velocity_y: f64,
    on_ground: bool,
) -> StepResult {
    let start = Aabb::player(feet);
    let boxes = collect_boxes(world, &start.expanded_by_motion(Vec3::new(dx, 0.0, dz)));

    let moved_x = sweep_x(&start, &boxes, dx);
    let mut bb = start.offset(Vec3::new(moved_x, 0.0, 0.0));
    let moved_z = sweep_z(&bb, &boxes, dz);
    bb = bb.offset(Vec3::new(0.0, 0.0, moved_z));

    let mut blocked = moved_x != dx || moved_z != dz;
    let mut stepped_up = false;

    if blocked && on_ground {
        // Retry the original motion from a lifted copy; commit only if it
        // strictly beats the ground-level result, dropping back down onto
        // whatever ledge was climbed.
        let lifted_start = start.offset(Vec3::new(0.0, STEP_HEIGHT, 0.0));
        let lifted_boxes = collect_boxes(
            world,
            &lifted_start.expanded_by_motion(Vec3::new(dx, 0.0, dz)),
        );
        let lifted_x = sweep_x(&lifted_start, &lifted_boxes, dx);
        let mut lifted = lifted_start.offset(Vec3::new(lifted_x, 0.0, 0.0));
        let lifted_z = sweep_z(&lifted, &lifted_boxes, dz);
        lifted = lifted.offset(Vec3::new(0.0, 0.0, lifted_z));

        let ground_sq = moved_x * moved_x + moved_z * moved_z;
        let lifted_sq = lifted_x * lifted_x + lifted_z * lifted_z;
        if lifted_sq > ground_sq {
            let drop_boxes =
                collect_boxes(world, &lifted.expanded_by_motion(Vec3::new(0.0, -STEP_HEIGHT, 0.0)));
            let drop = sweep_y(&lifted, &drop_boxes, -STEP_HEIGHT);
            bb = lifted.offset(Vec3::new(0.0, drop, 0.0));
            blocked = lifted_x != dx || lifted_z != dz;
            stepped_up = true;
        }
    }

    let fall_boxes = collect_boxes(world, &bb.expanded_by_motion(Vec3::new(0.0, velocity_y, 0.0)));
    let moved_y = sweep_y(&bb, &fall_boxes, velocity_y);
    bb = bb.offset(Vec3::new(0.0, moved_y, 0.0));
    let clipped_y = moved_y != velocity_y;

    StepResult {
        feet: bb.feet(),
        velocity_y: if clipped_y { 0.0 } else { velocity_y },
        on_ground: clipped_y && velocity_y < 0.0,
        blocked_horizontally: blocked,
        stepped_up,
    }
}

// ===========================================================================
// Tests
// ===========================================================================
