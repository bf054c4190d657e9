//! Read-only view of a settled tick for renderers and the HUD.
//!
//! Everything is copied out of the world so the caller holds no borrows.

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use crate::components::{Body, Direction, Enemy, Health, Material, Obstacle, Player, Projectile, Rect, TrailPose};
use crate::config::AnimationConfig;
use crate::events::SessionStatus;
use crate::systems::{enemy_frame, player_frame, FrameId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorView {
    pub rect: Rect,
    pub facing: Direction,
    pub frame: FrameId,
    pub health: i32,
    pub max_health: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    pub rect: Rect,
    pub material: Material,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub tick: u64,
    pub status: SessionStatus,
    pub score: u64,
    pub player: Option<ActorView>,
    /// Oldest pose first
    pub trail: Vec<TrailPose>,
    pub enemies: Vec<ActorView>,
    pub obstacles: Vec<ObstacleView>,
    pub projectiles: Vec<Rect>,
}

fn health_of(world: &World, entity: Entity) -> (i32, i32) {
    world
        .get::<&Health>(entity)
        .map(|h| (h.current, h.max))
        .unwrap_or((0, 0))
}

impl RenderSnapshot {
    /// Copy out everything a frame needs. Lists are ordered by entity id.
    pub fn capture(
        world: &World,
        player: Entity,
        tick: u64,
        status: SessionStatus,
        anim: &AnimationConfig,
    ) -> Self {
        let mut score = 0;
        let mut trail = Vec::new();
        let mut player_view = None;
        if let Ok(mut query) = world.query_one::<(&Body, &Player)>(player) {
            if let Some((body, p)) = query.get() {
                score = p.score;
                trail = p.trail.iter().copied().collect();
                let (health, max_health) = health_of(world, player);
                player_view = Some(ActorView {
                    rect: body.rect,
                    facing: body.facing,
                    frame: player_frame(p, body, anim),
                    health,
                    max_health,
                });
            }
        }

        let mut enemies: Vec<(u32, ActorView)> = world
            .query::<(&Body, &Enemy, Option<&Health>)>()
            .iter()
            .map(|(entity, (body, enemy, health))| {
                let (health, max_health) = health.map_or((0, 0), |h| (h.current, h.max));
                (
                    entity.id(),
                    ActorView {
                        rect: body.rect,
                        facing: body.facing,
                        frame: enemy_frame(enemy, body, anim),
                        health,
                        max_health,
                    },
                )
            })
            .collect();
        enemies.sort_by_key(|(id, _)| *id);

        let mut obstacles: Vec<(u32, ObstacleView)> = world
            .query::<&Obstacle>()
            .iter()
            .map(|(entity, o)| {
                (
                    entity.id(),
                    ObstacleView {
                        rect: o.rect,
                        material: o.material,
                    },
                )
            })
            .collect();
        obstacles.sort_by_key(|(id, _)| *id);

        let mut projectiles: Vec<(u32, Rect)> = world
            .query::<&Projectile>()
            .iter()
            .map(|(entity, p)| (entity.id(), p.rect))
            .collect();
        projectiles.sort_by_key(|(id, _)| *id);

        Self {
            tick,
            status,
            score,
            player: player_view,
            trail,
            enemies: enemies.into_iter().map(|(_, v)| v).collect(),
            obstacles: obstacles.into_iter().map(|(_, v)| v).collect(),
            projectiles: projectiles.into_iter().map(|(_, r)| r).collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::generation::{build_level, LevelLayout};

    #[test]
    fn test_capture_default_level() {
        let config = SimConfig::default();
        let mut world = World::new();
        let player = build_level(&mut world, &LevelLayout::from_config(&config), &config);

        let snap = RenderSnapshot::capture(&world, player, 3, SessionStatus::Running, &config.animation);
        let view = snap.player.as_ref().unwrap();
        assert_eq!(view.rect, Rect::new(100.0, 500.0, 50.0, 50.0));
        assert_eq!(view.health, 100);
        assert_eq!(snap.enemies.len(), 1);
        assert_eq!(snap.obstacles.len(), 1);
        assert!(snap.trail.is_empty());

        let json = snap.to_json().unwrap();
        assert!(json.contains("\"tick\":3"));
        let back: RenderSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
