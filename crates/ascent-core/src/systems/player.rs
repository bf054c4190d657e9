//! Player movement state machine and dash controller.
//!
//! Commands are accepted or silently ignored depending on the current mode:
//! extra jumps past `max_jumps`, dashes on cooldown and movement during a
//! dash are dropped without error.

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use super::physics::StepReport;
use super::projectiles::fire_projectile;
use crate::components::{Body, Direction, Player, PlayerMode};
use crate::config::{PlayerConfig, SimConfig};
use crate::events::Cue;

/// Discrete command delivered to the player for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    MoveLeft,
    MoveRight,
    Stop,
    Jump,
    Dash(Direction),
    Shoot,
}

/// Hold a horizontal direction. Snaps to max speed unless the accelerating
/// variant is configured; ignored for velocity while dashing.
pub fn move_horizontal(player: &mut Player, body: &mut Body, dir: Direction, cfg: &PlayerConfig) {
    player.held = Some(dir);
    body.facing = dir;

    if player.is_dashing() {
        log::trace!("move {:?} ignored during dash", dir);
        return;
    }
    if player.is_wall_sticking() {
        if body.wall_contact == Some(dir) {
            return;
        }
        // Pulling away from the wall releases it
        player.mode = PlayerMode::Running;
    }
    if cfg.run_acceleration.is_none() {
        body.velocity.x = dir.sign() * cfg.max_speed;
    }
    player.mode = PlayerMode::Running;
}

/// Release the horizontal command
pub fn stop(player: &mut Player, body: &mut Body, cfg: &PlayerConfig) {
    player.held = None;

    if player.is_dashing() {
        log::trace!("stop ignored during dash");
        return;
    }
    if cfg.run_deceleration.is_none() {
        body.velocity.x = 0.0;
    }
    player.mode = PlayerMode::Idle;
}

/// Jump or wall-jump. Returns true if the jump was taken.
pub fn jump(player: &mut Player, body: &mut Body, cfg: &PlayerConfig) -> bool {
    if player.is_wall_sticking() {
        let wall = body.wall_contact.unwrap_or(body.facing);
        let away = wall.opposite();
        body.velocity.y = cfg.jump_speed;
        body.velocity.x = away.sign() * cfg.max_speed;
        body.facing = away;
        player.mode = player.ground_mode();
        return true;
    }

    if player.jumps >= cfg.max_jumps {
        log::trace!("jump rejected: {} of {} used", player.jumps, cfg.max_jumps);
        return false;
    }
    body.velocity.y = cfg.jump_speed;
    player.jumps += 1;
    true
}

/// Start a dash if not dashing and the cooldown has elapsed
pub fn dash(player: &mut Player, body: &mut Body, dir: Direction, now: u64, cfg: &PlayerConfig) -> bool {
    if !player.dash.can_start(now, cfg.dash_cooldown) {
        log::trace!("dash rejected at tick {}", now);
        return false;
    }
    player.dash.start(now);
    player.trail.clear();
    player.mode = PlayerMode::Dashing;
    body.velocity.x = dir.sign() * cfg.dash_speed;
    body.facing = dir;
    true
}

/// End a dash whose duration has run out. Returns true if it ended.
pub fn expire_dash(player: &mut Player, body: &mut Body, now: u64, cfg: &PlayerConfig) -> bool {
    if !player.dash.is_expired(now, cfg.dash_duration) {
        return false;
    }
    player.dash.active = false;
    player.trail.clear();
    body.velocity.x = 0.0;
    player.mode = player.ground_mode();
    true
}

/// Per-tick velocity ramp for the accelerating variant
pub fn drive_running(player: &Player, body: &mut Body, cfg: &PlayerConfig) {
    if player.is_dashing() || player.is_wall_sticking() {
        return;
    }
    match player.held {
        Some(dir) => {
            if let Some(accel) = cfg.run_acceleration {
                body.velocity.x = approach(body.velocity.x, dir.sign() * cfg.max_speed, accel);
            }
        }
        None => {
            if let Some(decel) = cfg.run_deceleration {
                body.velocity.x = approach(body.velocity.x, 0.0, decel);
            }
        }
    }
}

fn approach(current: f32, target: f32, rate: f32) -> f32 {
    if current < target {
        (current + rate).min(target)
    } else {
        (current - rate).max(target)
    }
}

/// Landing, wall-stick entry/exit and trail recording after the kinematic step
pub fn settle(player: &mut Player, body: &mut Body, report: &StepReport, cfg: &PlayerConfig) {
    if report.landed {
        player.jumps = 0;
    }

    if player.is_wall_sticking() {
        let still_pressed = body.wall_contact.is_some() && body.wall_contact == player.held;
        if body.on_ground || !still_pressed {
            player.mode = player.ground_mode();
        } else {
            body.velocity.y = 0.0;
        }
    } else if !player.is_dashing()
        && !body.on_ground
        && report.fall_speed > 0.0
        && body.wall_contact.is_some()
        && body.wall_contact == player.held
    {
        player.mode = PlayerMode::WallSticking;
        body.velocity.y = 0.0;
    }

    if player.is_dashing() {
        player
            .trail
            .record(body.rect, body.facing, cfg.trail_opacity, cfg.trail_fade);
    }
    player.anim_ticks += 1;
}

/// Expire the dash, run the tick's commands and emit their cues
pub fn player_command_system(
    world: &mut World,
    player_entity: Entity,
    commands: &[Command],
    now: u64,
    config: &SimConfig,
    cues: &mut Vec<Cue>,
) {
    let cfg = &config.player;
    let mut shoot = false;
    {
        let (Ok(mut player), Ok(mut body)) = (
            world.get::<&mut Player>(player_entity),
            world.get::<&mut Body>(player_entity),
        ) else {
            return;
        };

        if expire_dash(&mut player, &mut body, now, cfg) {
            log::debug!("dash ended at tick {}", now);
        }

        for command in commands {
            match *command {
                Command::MoveLeft => move_horizontal(&mut player, &mut body, Direction::Left, cfg),
                Command::MoveRight => move_horizontal(&mut player, &mut body, Direction::Right, cfg),
                Command::Stop => stop(&mut player, &mut body, cfg),
                Command::Jump => {
                    if jump(&mut player, &mut body, cfg) {
                        cues.push(Cue::Jump);
                    }
                }
                Command::Dash(dir) => {
                    if dash(&mut player, &mut body, dir, now, cfg) {
                        log::debug!("dash {:?} at tick {}", dir, now);
                        cues.push(Cue::Dash);
                    }
                }
                Command::Shoot => shoot = true,
            }
        }

        drive_running(&player, &mut body, cfg);
    }

    if shoot && fire_projectile(world, player_entity, now, config) {
        cues.push(Cue::ProjectileFired);
    }
}

/// Apply [`settle`] to the player using its step report
pub fn player_settle_system(
    world: &mut World,
    player_entity: Entity,
    reports: &[(Entity, StepReport)],
    config: &SimConfig,
) {
    let Some((_, report)) = reports.iter().find(|(e, _)| *e == player_entity) else {
        return;
    };
    if let Ok((player, body)) = world.query_one_mut::<(&mut Player, &mut Body)>(player_entity) {
        let was_sticking = player.is_wall_sticking();
        settle(player, body, report, &config.player);
        if was_sticking != player.is_wall_sticking() {
            log::debug!("wall stick {}", if was_sticking { "released" } else { "engaged" });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Rect;

    fn setup() -> (Player, Body, PlayerConfig) {
        let cfg = PlayerConfig::default();
        (
            Player::new(cfg.trail_capacity),
            Body::new(Rect::new(100.0, 500.0, 50.0, 50.0)),
            cfg,
        )
    }

    #[test]
    fn test_double_jump_then_rejected() {
        let (mut p, mut b, cfg) = setup();
        assert!(jump(&mut p, &mut b, &cfg));
        assert!(jump(&mut p, &mut b, &cfg));
        assert!(!jump(&mut p, &mut b, &cfg));
        assert_eq!(p.jumps, 2);
        assert_eq!(b.velocity.y, cfg.jump_speed);
    }

    #[test]
    fn test_landing_resets_jumps() {
        let (mut p, mut b, cfg) = setup();
        p.jumps = 2;
        b.on_ground = true;
        let report = StepReport {
            fall_speed: 3.0,
            landed: true,
            ..Default::default()
        };
        settle(&mut p, &mut b, &report, &cfg);
        assert_eq!(p.jumps, 0);
        assert!(jump(&mut p, &mut b, &cfg));
    }

    #[test]
    fn test_dash_cooldown_sequence() {
        let (mut p, mut b, mut cfg) = setup();
        cfg.dash_cooldown = 30;
        cfg.dash_duration = 8;

        let mut accepted = Vec::new();
        for now in [0u64, 10, 31] {
            expire_dash(&mut p, &mut b, now, &cfg);
            accepted.push(dash(&mut p, &mut b, Direction::Right, now, &cfg));
        }
        assert_eq!(accepted, vec![true, false, true]);
    }

    #[test]
    fn test_dash_ignores_movement_and_ends_cleanly() {
        let (mut p, mut b, cfg) = setup();
        assert!(dash(&mut p, &mut b, Direction::Left, 5, &cfg));
        assert_eq!(b.velocity.x, -cfg.dash_speed);

        move_horizontal(&mut p, &mut b, Direction::Right, &cfg);
        stop(&mut p, &mut b, &cfg);
        assert_eq!(b.velocity.x, -cfg.dash_speed);
        assert!(!dash(&mut p, &mut b, Direction::Left, 6, &cfg), "already dashing");

        p.trail.record(b.rect, b.facing, 0.4, 0.9);
        assert!(!expire_dash(&mut p, &mut b, 5 + cfg.dash_duration - 1, &cfg));
        assert!(expire_dash(&mut p, &mut b, 5 + cfg.dash_duration, &cfg));
        assert_eq!(b.velocity.x, 0.0);
        assert!(p.trail.is_empty());
        assert_eq!(p.mode, PlayerMode::Idle);
    }

    #[test]
    fn test_trail_recorded_only_while_dashing() {
        let (mut p, mut b, cfg) = setup();
        let report = StepReport::default();
        settle(&mut p, &mut b, &report, &cfg);
        assert!(p.trail.is_empty());

        dash(&mut p, &mut b, Direction::Right, 0, &cfg);
        for _ in 0..(cfg.trail_capacity + 5) {
            settle(&mut p, &mut b, &report, &cfg);
        }
        assert_eq!(p.trail.len(), cfg.trail_capacity);
    }

    #[test]
    fn test_wall_stick_and_wall_jump() {
        let (mut p, mut b, cfg) = setup();
        move_horizontal(&mut p, &mut b, Direction::Right, &cfg);
        b.wall_contact = Some(Direction::Right);
        b.velocity.y = 4.0;
        let falling = StepReport {
            fall_speed: 4.0,
            wall: Some(Direction::Right),
            ..Default::default()
        };
        settle(&mut p, &mut b, &falling, &cfg);
        assert_eq!(p.mode, PlayerMode::WallSticking);
        assert_eq!(b.velocity.y, 0.0);

        let jumps_before = p.jumps;
        assert!(jump(&mut p, &mut b, &cfg));
        assert_eq!(p.jumps, jumps_before, "wall jump does not use a jump");
        assert_eq!(b.velocity.x, -cfg.max_speed);
        assert_eq!(b.velocity.y, cfg.jump_speed);
        assert_ne!(p.mode, PlayerMode::WallSticking);
    }

    #[test]
    fn test_no_stick_while_rising() {
        let (mut p, mut b, cfg) = setup();
        move_horizontal(&mut p, &mut b, Direction::Right, &cfg);
        b.wall_contact = Some(Direction::Right);
        let rising = StepReport {
            fall_speed: -8.0,
            wall: Some(Direction::Right),
            ..Default::default()
        };
        settle(&mut p, &mut b, &rising, &cfg);
        assert_eq!(p.mode, PlayerMode::Running);
    }

    #[test]
    fn test_stop_releases_wall_stick() {
        let (mut p, mut b, cfg) = setup();
        p.mode = PlayerMode::WallSticking;
        p.held = Some(Direction::Left);
        b.wall_contact = Some(Direction::Left);
        stop(&mut p, &mut b, &cfg);
        assert_eq!(p.mode, PlayerMode::Idle);
        assert_eq!(b.velocity.x, 0.0);
    }

    #[test]
    fn test_accelerating_variant_ramps() {
        let (mut p, mut b, mut cfg) = setup();
        cfg.run_acceleration = Some(1.5);
        cfg.run_deceleration = Some(2.0);
        move_horizontal(&mut p, &mut b, Direction::Right, &cfg);
        assert_eq!(b.velocity.x, 0.0, "no snap in accelerating variant");

        for _ in 0..3 {
            drive_running(&p, &mut b, &cfg);
        }
        assert_eq!(b.velocity.x, 4.5);
        for _ in 0..3 {
            drive_running(&p, &mut b, &cfg);
        }
        assert_eq!(b.velocity.x, cfg.max_speed);

        stop(&mut p, &mut b, &cfg);
        drive_running(&p, &mut b, &cfg);
        assert_eq!(b.velocity.x, 4.0);
    }
}
