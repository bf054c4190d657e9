//! Kinematic step - gravity integration and axis-separated collision
//! resolution for every actor with a [`Body`].
//!
//! Order contract: horizontal pass first, then vertical.

use hecs::{Entity, World};

use super::collision::{resolve_axis, Axis};
use crate::components::{Body, Direction, Player, Rect};
use crate::config::{PhysicsConfig, SimConfig};

/// What happened to a body during one kinematic step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepReport {
    /// Vertical speed used by the vertical pass (after gravity)
    pub fall_speed: f32,
    /// Came to rest on top of an obstacle
    pub landed: bool,
    /// Hit the underside of an obstacle
    pub bumped_head: bool,
    /// Side of the obstacle the horizontal pass pushed against
    pub wall: Option<Direction>,
}

/// Two-branch integrator: a body at rest vertically gets the initial fall
/// impulse, a moving one accumulates gravity.
pub fn apply_gravity(body: &mut Body, physics: &PhysicsConfig) {
    if body.velocity.y == 0.0 {
        body.velocity.y = physics.fall_impulse;
    } else {
        body.velocity.y += physics.gravity;
    }
    if let Some(cap) = physics.terminal_velocity {
        body.velocity.y = body.velocity.y.min(cap);
    }
}

/// Integrate one body against the obstacles in `world`
pub fn step_body(
    world: &World,
    body: &mut Body,
    config: &SimConfig,
    gravity_enabled: bool,
) -> StepReport {
    if gravity_enabled {
        apply_gravity(body, &config.physics);
    }

    let mut report = StepReport {
        fall_speed: body.velocity.y,
        ..Default::default()
    };

    // Horizontal: velocity is kept so a held direction keeps pressing the wall.
    // The sweep stops at the world's side bounds so the vertical pass runs at
    // the x the body keeps.
    let vx = body.velocity.x;
    let dx = clamp_displacement(&body.rect, vx, config.world.width);
    body.wall_contact = None;
    if resolve_axis(world, &mut body.rect, Axis::Horizontal, dx) {
        body.wall_contact = Direction::from_velocity(vx);
        report.wall = body.wall_contact;
    }

    // Vertical
    let vy = body.velocity.y;
    body.on_ground = false;
    if resolve_axis(world, &mut body.rect, Axis::Vertical, vy) {
        body.velocity.y = 0.0;
        if vy > 0.0 {
            body.on_ground = true;
            report.landed = true;
        } else {
            report.bumped_head = true;
        }
    }

    report
}

/// Horizontal displacement that keeps the hitbox inside
/// `[0, world_width - width]`
pub fn clamp_displacement(rect: &Rect, dx: f32, world_width: f32) -> f32 {
    let max_x = (world_width - rect.width).max(0.0);
    (rect.x + dx).clamp(0.0, max_x) - rect.x
}

/// Step every body in the world. Wall-sticking players skip gravity.
pub fn physics_system(world: &mut World, config: &SimConfig) -> Vec<(Entity, StepReport)> {
    // Collect first: resolution reads obstacles while bodies are updated
    let bodies: Vec<(Entity, Body, bool)> = world
        .query::<(&Body, Option<&Player>)>()
        .iter()
        .map(|(entity, (body, player))| {
            let gravity = player.map_or(true, |p| !p.is_wall_sticking());
            (entity, *body, gravity)
        })
        .collect();

    let mut reports = Vec::with_capacity(bodies.len());
    for (entity, mut body, gravity) in bodies {
        let report = step_body(world, &mut body, config, gravity);
        if let Ok(mut b) = world.get::<&mut Body>(entity) {
            *b = body;
        }
        reports.push((entity, report));
    }
    reports
}
