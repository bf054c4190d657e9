//! Player projectiles: spawning on `Shoot` and per-tick flight.

use hecs::{Entity, World};

use super::collision::any_overlap;
use crate::components::{Body, Enemy, Health, Player, Projectile, Rect};
use crate::config::SimConfig;
use crate::events::Cue;

/// Spawn a projectile from the player's centre in the facing direction.
/// Returns false while the shot cooldown is pending.
pub fn fire_projectile(world: &mut World, shooter: Entity, now: u64, config: &SimConfig) -> bool {
    let cfg = &config.projectile;
    let (origin, facing) = {
        let Ok(mut player) = world.get::<&mut Player>(shooter) else {
            return false;
        };
        if let Some(last) = player.last_shot_at {
            if now.saturating_sub(last) < cfg.cooldown {
                log::trace!("shot rejected: cooldown until tick {}", last + cfg.cooldown);
                return false;
            }
        }
        let Ok(body) = world.get::<&Body>(shooter) else {
            return false;
        };
        player.last_shot_at = Some(now);
        (body.rect.center(), body.facing)
    };

    let rect = Rect::new(
        origin.x - cfg.width / 2.0,
        origin.y - cfg.height / 2.0,
        cfg.width,
        cfg.height,
    );
    world.spawn((Projectile {
        rect,
        vx: facing.sign() * cfg.speed,
        damage: cfg.damage,
        ticks_left: cfg.lifetime,
    },));
    true
}

/// Move projectiles, apply hits and despawn the spent ones
pub fn projectile_system(world: &mut World, config: &SimConfig, cues: &mut Vec<Cue>) {
    let width = config.world.width;

    let mut moved: Vec<(Entity, Projectile)> = world
        .query::<&Projectile>()
        .iter()
        .map(|(e, p)| (e, *p))
        .collect();
    moved.sort_by_key(|(e, _)| e.id());

    let mut enemies: Vec<(Entity, Rect)> = world
        .query::<(&Body, &Enemy)>()
        .iter()
        .map(|(e, (body, _))| (e, body.rect))
        .collect();
    enemies.sort_by_key(|(e, _)| e.id());

    let mut spent = Vec::new();
    let mut hits: Vec<(Entity, i32)> = Vec::new();

    for (entity, projectile) in moved.iter_mut() {
        projectile.rect = projectile.rect.translated(projectile.vx, 0.0);
        projectile.ticks_left = projectile.ticks_left.saturating_sub(1);

        let out_of_bounds = projectile.rect.right() <= 0.0 || projectile.rect.left() >= width;
        if projectile.ticks_left == 0 || out_of_bounds || any_overlap(world, &projectile.rect) {
            spent.push(*entity);
            continue;
        }

        // First enemy hit absorbs the projectile
        if let Some((target, _)) = enemies
            .iter()
            .find(|(_, rect)| rect.intersects(&projectile.rect))
        {
            hits.push((*target, projectile.damage));
            spent.push(*entity);
        }
    }

    for (entity, projectile) in &moved {
        if let Ok(mut p) = world.get::<&mut Projectile>(*entity) {
            *p = *projectile;
        }
    }

    for (target, damage) in hits {
        if let Ok(mut health) = world.get::<&mut Health>(target) {
            health.take_damage(damage);
            cues.push(Cue::DamageInflicted);
        }
    }

    for entity in spent {
        let _ = world.despawn(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Direction, Material};
    use crate::systems::collision::add_obstacle;

    fn spawn_player(world: &mut World, x: f32, facing: Direction) -> Entity {
        world.spawn((
            Body::new(Rect::new(x, 100.0, 50.0, 50.0)).with_facing(facing),
            Player::new(4),
        ))
    }

    fn projectile_count(world: &World) -> usize {
        world.query::<&Projectile>().iter().count()
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let mut world = World::new();
        let config = SimConfig::default();
        let player = spawn_player(&mut world, 100.0, Direction::Right);

        assert!(fire_projectile(&mut world, player, 0, &config));
        assert!(!fire_projectile(&mut world, player, 5, &config));
        assert!(fire_projectile(&mut world, player, config.projectile.cooldown, &config));
        assert_eq!(projectile_count(&world), 2);
    }

    #[test]
    fn test_projectile_follows_facing() {
        let mut world = World::new();
        let config = SimConfig::default();
        let player = spawn_player(&mut world, 400.0, Direction::Left);
        fire_projectile(&mut world, player, 0, &config);

        let mut cues = Vec::new();
        projectile_system(&mut world, &config, &mut cues);
        let (_, p) = world.query::<&Projectile>().iter().map(|(e, p)| (e, *p)).next().unwrap();
        assert_eq!(p.vx, -config.projectile.speed);
        assert!(p.rect.center().x < 425.0);
    }

    #[test]
    fn test_projectile_damages_enemy_and_vanishes() {
        let mut world = World::new();
        let config = SimConfig::default();
        let player = spawn_player(&mut world, 100.0, Direction::Right);
        let enemy = world.spawn((
            Body::new(Rect::new(160.0, 100.0, 33.0, 45.0)),
            Enemy::new(Direction::Left),
            Health::new(100),
        ));

        fire_projectile(&mut world, player, 0, &config);
        let mut cues = Vec::new();
        for _ in 0..5 {
            projectile_system(&mut world, &config, &mut cues);
        }

        assert_eq!(world.get::<&Health>(enemy).unwrap().current, 75);
        assert_eq!(cues, vec![Cue::DamageInflicted]);
        assert_eq!(projectile_count(&world), 0);
    }

    #[test]
    fn test_projectile_stops_at_obstacle() {
        let mut world = World::new();
        let config = SimConfig::default();
        add_obstacle(&mut world, Rect::new(200.0, 0.0, 20.0, 300.0), Material::Stone);
        let player = spawn_player(&mut world, 100.0, Direction::Right);
        fire_projectile(&mut world, player, 0, &config);

        let mut cues = Vec::new();
        for _ in 0..10 {
            projectile_system(&mut world, &config, &mut cues);
        }
        assert_eq!(projectile_count(&world), 0);
        assert!(cues.is_empty());
    }

    #[test]
    fn test_projectile_expires() {
        let mut world = World::new();
        let mut config = SimConfig::default();
        config.projectile.speed = 0.5;
        config.projectile.lifetime = 3;
        let player = spawn_player(&mut world, 100.0, Direction::Right);
        fire_projectile(&mut world, player, 0, &config);

        let mut cues = Vec::new();
        projectile_system(&mut world, &config, &mut cues);
        projectile_system(&mut world, &config, &mut cues);
        assert_eq!(projectile_count(&world), 1);
        projectile_system(&mut world, &config, &mut cues);
        assert_eq!(projectile_count(&world), 0);
    }
}
