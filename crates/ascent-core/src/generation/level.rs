//! Initial level layout and actor spawning

use hecs::{Entity, World};

use crate::components::{Body, Direction, Enemy, Health, Material, Player, Rect, Vec2};
use crate::config::{ConfigError, SimConfig};
use crate::systems::collision::add_obstacle;

/// Starting contents of a session
#[derive(Debug, Clone)]
pub struct LevelLayout {
    pub obstacles: Vec<(Rect, Material)>,
    pub player_start: Vec2,
    /// Top-left corners of enemies
    pub enemies: Vec<Vec2>,
    /// Populate and scroll with the platform generator
    pub procedural: bool,
}

impl LevelLayout {
    /// Full-width ground plus the configured enemies, generated platforms on top
    pub fn from_config(config: &SimConfig) -> Self {
        let world = &config.world;
        let ground_height = config.level.ground_height;
        let ground = Rect::new(0.0, world.height - ground_height, world.width, ground_height);
        Self {
            obstacles: vec![(ground, Material::Grass)],
            player_start: config.level.player_start,
            enemies: config.level.enemy_spawns.clone(),
            procedural: true,
        }
    }

    /// Hand-built layout; the generator is never consulted
    pub fn fixed(obstacles: Vec<(Rect, Material)>, player_start: Vec2) -> Self {
        Self {
            obstacles,
            player_start,
            enemies: Vec::new(),
            procedural: false,
        }
    }

    pub fn with_enemy(mut self, at: Vec2) -> Self {
        self.enemies.push(at);
        self
    }

    /// Reject degenerate obstacles and non-finite spawn points
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (rect, _) in &self.obstacles {
            Rect::try_new(rect.x, rect.y, rect.width, rect.height).map_err(|e| {
                ConfigError::Invalid {
                    field: "layout.obstacles",
                    reason: e.to_string(),
                }
            })?;
        }
        let finite = |p: &Vec2| p.x.is_finite() && p.y.is_finite();
        if !finite(&self.player_start) {
            return Err(ConfigError::Invalid {
                field: "layout.player_start",
                reason: format!("non-finite position {:?}", self.player_start),
            });
        }
        if let Some(at) = self.enemies.iter().find(|p| !finite(p)) {
            return Err(ConfigError::Invalid {
                field: "layout.enemies",
                reason: format!("non-finite position {:?}", at),
            });
        }
        Ok(())
    }
}

pub fn spawn_player(world: &mut World, start: Vec2, config: &SimConfig) -> Entity {
    let cfg = &config.player;
    world.spawn((
        Body::new(Rect::new(start.x, start.y, cfg.width, cfg.height)),
        Player::new(cfg.trail_capacity),
        Health::new(cfg.max_health),
    ))
}

pub fn spawn_enemy(world: &mut World, at: Vec2, config: &SimConfig) -> Entity {
    let cfg = &config.enemy;
    world.spawn((
        Body::new(Rect::new(at.x, at.y, cfg.width, cfg.height)),
        Enemy::new(Direction::Right),
        Health::new(cfg.max_health),
    ))
}

/// Spawn the layout's obstacles and actors. Returns the player entity.
pub fn build_level(world: &mut World, layout: &LevelLayout, config: &SimConfig) -> Entity {
    for (rect, material) in &layout.obstacles {
        add_obstacle(world, *rect, *material);
    }
    for at in &layout.enemies {
        spawn_enemy(world, *at, config);
    }
    spawn_player(world, layout.player_start, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::collision::{obstacle_count, obstacle_rects};

    #[test]
    fn test_default_layout_has_ground_under_player() {
        let config = SimConfig::default();
        let layout = LevelLayout::from_config(&config);
        let mut world = World::new();
        let player = build_level(&mut world, &layout, &config);

        assert_eq!(obstacle_count(&world), 1);
        let ground = obstacle_rects(&world)[0];
        assert_eq!(ground.top(), 560.0);
        let body = world.get::<&Body>(player).unwrap();
        assert!(!body.rect.intersects(&ground));
        assert_eq!(world.query::<&Enemy>().iter().count(), 1);
    }

    #[test]
    fn test_fixed_layout_is_not_procedural() {
        let layout = LevelLayout::fixed(Vec::new(), Vec2::new(10.0, 10.0))
            .with_enemy(Vec2::new(50.0, 10.0));
        assert!(!layout.procedural);
        assert_eq!(layout.enemies.len(), 1);
    }

    #[test]
    fn test_validate_rejects_degenerate_layouts() {
        let floor = Rect::new(0.0, 560.0, 800.0, 40.0);
        let ok = LevelLayout::fixed(vec![(floor, Material::Grass)], Vec2::new(10.0, 10.0));
        assert!(ok.validate().is_ok());

        let flat = Rect { x: 0.0, y: 560.0, width: 800.0, height: 0.0 };
        let layout = LevelLayout::fixed(vec![(flat, Material::Grass)], Vec2::new(10.0, 10.0));
        let err = layout.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "layout.obstacles", .. }));

        let inverted = Rect { x: 0.0, y: 560.0, width: -5.0, height: 40.0 };
        let layout = LevelLayout::fixed(vec![(inverted, Material::Grass)], Vec2::new(10.0, 10.0));
        assert!(layout.validate().is_err());

        let layout = ok.clone().with_enemy(Vec2::new(f32::NAN, 0.0));
        let err = layout.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "layout.enemies", .. }));
    }
}
