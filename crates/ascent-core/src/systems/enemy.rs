//! Enemy patrol/attack controller.
//!
//! Before physics each enemy either patrols, starts an attack on a player in
//! range, or stands still (attack running or cooldown pending). After physics
//! a patrolling enemy reverses at ledges and walls.

use hecs::{Entity, World};

use super::collision::any_overlap;
use super::physics::StepReport;
use crate::components::{Body, Enemy, EnemyMode, Health, Rect};
use crate::config::SimConfig;
use crate::events::Cue;

/// True if an obstacle supports `rect` one patrol step ahead
pub fn has_support_ahead(world: &World, rect: &Rect, step: f32) -> bool {
    let probe = rect.translated(step, 1.0);
    any_overlap(world, &probe)
}

/// Choose velocities and start attacks. Damage lands on the player's
/// [`Health`] immediately when the hitboxes overlap.
pub fn enemy_think_system(
    world: &mut World,
    player: Entity,
    now: u64,
    config: &SimConfig,
    cues: &mut Vec<Cue>,
) {
    let cfg = &config.enemy;
    let attack_length = config.animation.attack_length();

    let Ok(player_rect) = world.get::<&Body>(player).map(|b| b.rect) else {
        return;
    };

    let mut damage_dealt = 0;
    for (_, (body, enemy)) in world.query_mut::<(&mut Body, &mut Enemy)>() {
        enemy.anim_ticks += 1;

        if enemy.mode == EnemyMode::Attacking {
            if now.saturating_sub(enemy.attack_started_at) < attack_length {
                body.velocity.x = 0.0;
                continue;
            }
            enemy.mode = EnemyMode::Patrolling;
            enemy.anim_ticks = 0;
        }

        let in_range = (player_rect.x - body.rect.x).abs() <= cfg.attack_range;
        if in_range {
            body.velocity.x = 0.0;
            if enemy.attack_ready(now, cfg.attack_cooldown) {
                enemy.mode = EnemyMode::Attacking;
                enemy.attack_started_at = now;
                enemy.last_attack_at = Some(now);
                enemy.anim_ticks = 0;
                if body.rect.intersects(&player_rect) {
                    damage_dealt += cfg.attack_damage;
                    cues.push(Cue::DamageInflicted);
                }
            }
            continue;
        }

        body.velocity.x = enemy.direction.sign() * cfg.patrol_speed;
        body.facing = enemy.direction;
    }

    if damage_dealt > 0 {
        if let Ok(mut health) = world.get::<&mut Health>(player) {
            let left = health.take_damage(damage_dealt);
            log::debug!("player hit for {}, {} left", damage_dealt, left);
        }
    }
}

/// Reverse patrolling enemies that reached a ledge or a wall
pub fn enemy_patrol_system(world: &mut World, reports: &[(Entity, StepReport)], config: &SimConfig) {
    let step = config.enemy.patrol_speed;

    let mut reverse = Vec::new();
    for (entity, report) in reports {
        let Ok(mut query) = world.query_one::<(&Body, &Enemy)>(*entity) else {
            continue;
        };
        let Some((body, enemy)) = query.get() else {
            continue;
        };
        if enemy.mode != EnemyMode::Patrolling {
            continue;
        }
        let at_wall = report.wall.is_some();
        let at_ledge = body.on_ground
            && !has_support_ahead(world, &body.rect, enemy.direction.sign() * step);
        if at_wall || at_ledge {
            reverse.push(*entity);
        }
    }

    for entity in reverse {
        if let Ok((body, enemy)) = world.query_one_mut::<(&mut Body, &mut Enemy)>(entity) {
            enemy.direction = enemy.direction.opposite();
            body.velocity.x = 0.0;
            body.facing = enemy.direction;
        }
    }
}

/// Despawn defeated enemies and those that fell out of the world.
/// Returns how many were removed.
pub fn enemy_cleanup_system(world: &mut World, world_height: f32, cues: &mut Vec<Cue>) -> usize {
    let mut doomed: Vec<(Entity, bool)> = world
        .query::<(&Body, &Enemy, Option<&Health>)>()
        .iter()
        .filter_map(|(entity, (body, _, health))| {
            let defeated = health.map_or(false, |h| h.is_depleted());
            let fell = body.rect.top() > world_height;
            (defeated || fell).then_some((entity, defeated))
        })
        .collect();
    doomed.sort_by_key(|(e, _)| e.id());

    for (entity, defeated) in &doomed {
        if *defeated {
            cues.push(Cue::EnemyDefeated);
        }
        let _ = world.despawn(*entity);
    }
    doomed.len()
}
