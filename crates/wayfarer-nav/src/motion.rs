//! Tick-driven motion controller: follows pathfinder output with vanilla
//! physics, detects lack of progress, and recovers from obstacles in
//! escalating stages.
//!
//! The controller performs no I/O. Each [`Motion::tick`] returns the
//! position packet to send (if any) and the events the tick produced; the
//! client facade owns the wire.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use wayfarer_proto::packets::SetPlayerPositionRotation;
use wayfarer_proto::{BlockPos, Vec3};
use wayfarer_world::WorldCache;

use crate::pathfinder::Pathfinder;
use crate::physics;

/// Arrival threshold around the final target (3D).
const ARRIVE_DISTANCE: f64 = 1.5;
/// A waypoint counts as reached inside this XZ radius.
const WAYPOINT_RADIUS: f64 = 0.7;
/// Under this much XZ progress per tick the avatar counts as stuck.
const STUCK_EPSILON: f64 = 0.05;
/// Degrees of yaw change allowed per tick.
const MAX_TURN_SPEED: f64 = 18.0;
/// Sideways nudge used while probing around an obstacle.
const LATERAL_STEP: f64 = 0.3;
/// Ticks of server-authority silence after a teleport.
const TELEPORT_COOLDOWN_TICKS: u32 = 10;
/// Wall-clock interval for routine path refreshes while moving.
const RECALC_INTERVAL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionEvent {
    /// The avatar is within [`ARRIVE_DISTANCE`] of the requested target.
    Arrived,
    /// No path could be produced; motion stopped.
    PathFailed,
}

#[derive(Debug, Default)]
pub struct TickOutput {
    pub packet: Option<SetPlayerPositionRotation>,
    pub events: Vec<MotionEvent>,
}

pub struct Motion {
    pathfinder: Pathfinder,

    position: Vec3,
    /// Vertical velocity only; horizontal motion is position-level.
    velocity_y: f64,
    yaw: f64,
    pitch: f64,
    on_ground: bool,

    target: Option<Vec3>,
    moving: bool,
    path: Vec<BlockPos>,
    path_index: usize,
    last_recalc: Instant,

    jump_queued: bool,
    jump_cooldown: u32,

    stuck_counter: u32,
    obstacle_stage: u8,
    lateral_sign: f64,

    movement_cooldown: u32,
    awaiting_teleport: bool,
    teleport_anchor: Option<Vec3>,
    last_tick_pos: Vec3,
}

impl Motion {
    pub fn new(pathfinder: Pathfinder) -> Self {
        Self {
            pathfinder,
            position: Vec3::ZERO,
            velocity_y: 0.0,
            yaw: 0.0,
            pitch: 0.0,
            on_ground: true,
            target: None,
            moving: false,
            path: Vec::new(),
            path_index: 0,
            last_recalc: Instant::now(),
            jump_queued: false,
            jump_cooldown: 0,
            stuck_counter: 0,
            obstacle_stage: 0,
            lateral_sign: 1.0,
            movement_cooldown: 0,
            awaiting_teleport: false,
            teleport_anchor: None,
            last_tick_pos: Vec3::ZERO,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn awaiting_teleport(&self) -> bool {
        self.awaiting_teleport
    }

    /// Place the avatar without physics (initial spawn).
    pub fn set_position(&mut self, position: Vec3, yaw: f64, pitch: f64) {
        self.position = position;
        self.last_tick_pos = position;
        self.yaw = yaw;
        self.pitch = pitch;
        self.velocity_y = 0.0;
    }

    /// Start navigating toward a target; the path is computed on the next
    /// tick so it sees the freshest world state.
    pub fn goto(&mut self, target: Vec3) {
        debug!(%target, "navigation target set");
        self.target = Some(target);
        self.moving = true;
        self.path.clear();
        self.path_index = 0;
        self.stuck_counter = 0;
        self.obstacle_stage = 0;
    }

    pub fn stop(&mut self) {
        self.target = None;
        self.moving = false;
        self.path.clear();
        self.path_index = 0;
        self.stuck_counter = 0;
        self.obstacle_stage = 0;
    }

    /// Server-authoritative teleport: freeze for the cooldown, then snap to
    /// the anchor and replan.
    pub fn server_position_reset(&mut self, anchor: Vec3, yaw: f64, pitch: f64) {
        self.movement_cooldown = TELEPORT_COOLDOWN_TICKS;
        self.awaiting_teleport = true;
        self.teleport_anchor = Some(anchor);
        self.velocity_y = 0.0;
        self.yaw = yaw;
        self.pitch = pitch;
    }

    /// Advance one 50 ms tick.
    pub fn tick(&mut self, world: &WorldCache) -> TickOutput {
        let mut out = TickOutput::default();

        if self.movement_cooldown > 0 {
            self.movement_cooldown -= 1;
            if self.movement_cooldown == 0 {
                self.awaiting_teleport = false;
                if let Some(anchor) = self.teleport_anchor.take() {
                    self.position = anchor;
                    self.last_tick_pos = anchor;
                    self.velocity_y = 0.0;
                    self.on_ground = true;
                    self.path.clear();
                    self.path_index = 0;
                }
            }
            return out;
        }
        if self.awaiting_teleport {
            return out;
        }
        let Some(target) = self.target else {
            return out;
        };
        if !self.moving {
            return out;
        }

        if self.position.distance(&target) < ARRIVE_DISTANCE {
            debug!(%target, "arrived");
            self.stop();
            out.events.push(MotionEvent::Arrived);
            return out;
        }

        if self.path_index >= self.path.len()
            || self.last_recalc.elapsed() >= RECALC_INTERVAL
        {
            if !self.recalculate(world, target, &mut out) {
                return out;
            }
        }

        let mut waypoint = self.path[self.path_index].center();
        if self.position.distance_xz(&waypoint) < WAYPOINT_RADIUS {
            self.path_index += 1;
            self.stuck_counter = 0;
            match self.path.get(self.path_index) {
                Some(cell) => waypoint = cell.center(),
                None => return out,
            }
        }

        // Planned horizontal motion toward the waypoint.
        let dxz = self.position.distance_xz(&waypoint);
        let scale = if dxz > 1e-9 {
            (physics::STEP_PER_TICK / dxz).min(1.0)
        } else {
            0.0
        };
        let mut dx = (waypoint.x - self.position.x) * scale;
        let mut dz = (waypoint.z - self.position.z) * scale;

        let progressed = self.position.distance_xz(&self.last_tick_pos);
        if progressed < STUCK_EPSILON {
            self.stuck_counter += 1;
            self.obstacle_recovery(&mut dx, &mut dz);
        } else {
            self.stuck_counter = 0;
            self.obstacle_stage = 0;
        }

        if let Some(next_next) = self.path.get(self.path_index + 1) {
            if next_next.y as f64 - self.position.y > 0.5 && self.on_ground {
                self.jump_queued = true;
            }
        }

        self.run_physics(world, dx, dz);
        out.packet = Some(SetPlayerPositionRotation {
            position: self.position,
            yaw: self.yaw as f32,
            pitch: self.pitch as f32,
            on_ground: self.on_ground,
        });
        out
    }

    fn recalculate(&mut self, world: &WorldCache, target: Vec3, out: &mut TickOutput) -> bool {
        self.last_recalc = Instant::now();
        let from = BlockPos::from_vec3(&self.position);
        let to = BlockPos::from_vec3(&target);
        match self.pathfinder.find_path(world, from, to) {
            Ok(path) => {
                debug!(len = path.len(), "path computed");
                self.path = path;
                self.path_index = 0;
                true
            }
            Err(e) => {
                warn!("navigation stopped: {e}");
                self.stop();
                out.events.push(MotionEvent::PathFailed);
                false
            }
        }
    }

    /// Escalating responses to consecutive no-progress ticks.
    fn obstacle_recovery(&mut self, dx: &mut f64, dz: &mut f64) {
        let yaw_rad = self.yaw.to_radians();
        match self.stuck_counter {
            0..=4 => {}
            5..=15 => {
                self.obstacle_stage = 1;
                if self.on_ground {
                    self.jump_queued = true;
                }
            }
            16..=30 => {
                self.obstacle_stage = 2;
                if self.stuck_counter % 5 == 0 {
                    self.lateral_sign = -self.lateral_sign;
                }
                // Strafe perpendicular to the facing direction.
                *dx += LATERAL_STEP * self.lateral_sign * yaw_rad.cos();
                *dz += LATERAL_STEP * self.lateral_sign * yaw_rad.sin();
            }
            31..=45 => {
                self.obstacle_stage = 3;
                // Back straight away from the facing direction.
                *dx = physics::STEP_PER_TICK * yaw_rad.sin();
                *dz = -physics::STEP_PER_TICK * yaw_rad.cos();
            }
            _ => {
                self.obstacle_stage = 4;
                if self.path_index + 1 < self.path.len() {
                    debug!("obstacle stage 4: skipping waypoint");
                    self.path_index += 1;
                } else {
                    debug!("obstacle stage 4: forcing path recalculation");
                    self.path.clear();
                    self.path_index = 0;
                }
                self.stuck_counter = 0;
                self.obstacle_stage = 0;
            }
        }
    }

    fn run_physics(&mut self, world: &WorldCache, dx: f64, dz: f64) {
        if self.jump_queued && self.on_ground && self.jump_cooldown == 0 {
            self.velocity_y = physics::JUMP_VELOCITY;
            self.on_ground = false;
            self.jump_cooldown = physics::JUMP_COOLDOWN_TICKS;
        }
        self.jump_queued = false;
        self.jump_cooldown = self.jump_cooldown.saturating_sub(1);

        // Integrate with the current velocity, then apply gravity for the
        // next tick (a 0.42 jump peaks at ~1.25 cells this way). A grounded
        // avatar probes the floor with one gravity step so the ground flag
        // stays fresh.
        let probe_vy = if self.on_ground && self.velocity_y <= 0.0 {
            physics::GRAVITY
        } else {
            self.velocity_y
        };

        let before = self.position;
        let result = physics::step(world, self.position, dx, dz, probe_vy, self.on_ground);
        self.position = result.feet;
        self.on_ground = result.on_ground;
        self.last_tick_pos = before;

        self.velocity_y = if result.on_ground {
            0.0
        } else {
            ((result.velocity_y + physics::GRAVITY) * physics::DRAG)
                .max(physics::TERMINAL_VELOCITY)
        };

        if dx.abs() > 1e-9 || dz.abs() > 1e-9 {
            self.face_toward(dx, dz);
        }
    }

    /// Turn toward the motion direction, at most [`MAX_TURN_SPEED`] degrees
    /// per tick.
    fn face_toward(&mut self, dx: f64, dz: f64) {
        let target_yaw = -dx.atan2(dz).to_degrees();
        let mut diff = target_yaw - self.yaw;
        while diff > 180.0 {
            diff -= 360.0;
        }
        while diff <= -180.0 {
            diff += 360.0;
        }
        self.yaw += diff.clamp(-MAX_TURN_SPEED, MAX_TURN_SPEED);
        while self.yaw > 180.0 {
            self.yaw -= 360.0;
        }
        while self.yaw <= -180.0 {
            self.yaw += 360.0;
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
