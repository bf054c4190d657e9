//! Simulation configuration.
//!
//! Every tunable of the simulation lives here. Defaults assume an 800x600
//! screen stepped at 60 ticks per second. Timers are expressed in ticks,
//! except the double-tap window which is measured on input event timestamps
//! in milliseconds.

use serde::{Deserialize, Serialize};

use crate::components::Vec2;

/// World dimensions (the visible screen)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Gravity integration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Added to vy every tick while already moving vertically
    pub gravity: f32,
    /// vy assigned when a body at vy == 0 starts falling
    pub fall_impulse: f32,
    /// Optional cap on downward speed. Off by default; sub-stepping already
    /// prevents tunnelling.
    pub terminal_velocity: Option<f32>,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.6,
            fall_impulse: 1.0,
            terminal_velocity: None,
        }
    }
}

/// Player movement, dash and combat tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub width: f32,
    pub height: f32,
    pub max_speed: f32,
    /// Negative: upward
    pub jump_speed: f32,
    pub max_jumps: u32,
    /// When set, running ramps toward max_speed instead of snapping
    pub run_acceleration: Option<f32>,
    /// When set, stopping decays speed instead of zeroing it
    pub run_deceleration: Option<f32>,
    pub dash_speed: f32,
    pub dash_duration: u64,
    pub dash_cooldown: u64,
    pub double_tap_ms: u64,
    pub max_health: i32,
    pub trail_capacity: usize,
    pub trail_opacity: f32,
    /// Opacity multiplier applied to older trail poses each tick
    pub trail_fade: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: 50.0,
            height: 50.0,
            max_speed: 6.0,
            jump_speed: -15.0,
            max_jumps: 2,
            run_acceleration: None,
            run_deceleration: None,
            dash_speed: 80.0,
            dash_duration: 40,
            dash_cooldown: 30,
            double_tap_ms: 200,
            max_health: 100,
            trail_capacity: 12,
            trail_opacity: 100.0 / 255.0,
            trail_fade: 0.85,
        }
    }
}

/// Enemy patrol and attack tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub width: f32,
    pub height: f32,
    pub patrol_speed: f32,
    pub attack_range: f32,
    pub attack_cooldown: u64,
    pub attack_damage: i32,
    pub max_health: i32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            width: 33.0,
            height: 45.0,
            patrol_speed: 2.0,
            attack_range: 100.0,
            attack_cooldown: 30,
            attack_damage: 10,
            max_health: 100,
        }
    }
}

/// Player projectiles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub damage: i32,
    pub lifetime: u32,
    pub cooldown: u64,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            width: 12.0,
            height: 6.0,
            speed: 12.0,
            damage: 25,
            lifetime: 90,
            cooldown: 15,
        }
    }
}

/// Animation cadences (ticks per frame) and frame counts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub idle_cadence: u64,
    pub running_cadence: u64,
    pub attack_cadence: u64,
    pub idle_frames: u32,
    pub running_frames: u32,
    pub attack_frames: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            idle_cadence: 24,
            running_cadence: 8,
            attack_cadence: 12,
            idle_frames: 2,
            running_frames: 2,
            attack_frames: 2,
        }
    }
}

impl AnimationConfig {
    /// Ticks an enemy attack lasts. The attack ends when the animation
    /// reaches its last frame, so a single-frame attack still takes one step.
    pub fn attack_length(&self) -> u64 {
        self.attack_cadence * (self.attack_frames as u64).saturating_sub(1).max(1)
    }
}

/// Procedural platform generation and scrolling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub target_count: usize,
    pub platform_width: f32,
    pub platform_height: f32,
    /// Platforms stacked at a fixed spacing above the player's start
    pub seeded_platforms: usize,
    pub vertical_spacing: f32,
    /// Largest horizontal offset between consecutive seeded platforms
    pub max_horizontal_gap: f32,
    pub max_attempts_per_platform: usize,
    /// Scrolling starts once the player's top is above this fraction of the screen
    pub scroll_line_fraction: f32,
    pub scroll_step: f32,
    pub score_per_scroll: u64,
    /// Fixed seed for reproducible layouts; entropy when unset
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            target_count: 10,
            platform_width: 200.0,
            platform_height: 20.0,
            seeded_platforms: 4,
            vertical_spacing: 100.0,
            max_horizontal_gap: 150.0,
            max_attempts_per_platform: 50,
            scroll_line_fraction: 1.0 / 3.0,
            scroll_step: 8.0,
            score_per_scroll: 1,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    pub fn scroll_line(&self, world_height: f32) -> f32 {
        world_height * self.scroll_line_fraction
    }
}

/// Initial level layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub player_start: Vec2,
    /// Thickness of the full-width floor at the bottom of the screen
    pub ground_height: f32,
    /// Top-left corners of enemies placed at session start
    pub enemy_spawns: Vec<Vec2>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            player_start: Vec2::new(100.0, 500.0),
            ground_height: 40.0,
            enemy_spawns: vec![Vec2::new(600.0, 515.0)],
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub world: WorldConfig,
    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub projectile: ProjectileConfig,
    pub animation: AnimationConfig,
    pub generator: GeneratorConfig,
    pub level: LevelConfig,
}

/// Invalid configuration
#[derive(Debug)]
pub enum ConfigError {
    Invalid { field: &'static str, reason: String },
    Json(serde_json::Error),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid { field, reason } => {
                write!(f, "invalid config `{}`: {}", field, reason)
            }
            ConfigError::Json(e) => write!(f, "config parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be positive, got {}", value),
        })
    }
}

fn nonzero(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value > 0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be greater than zero".to_string(),
        })
    }
}

impl SimConfig {
    /// Parse a JSON document (missing fields take their defaults) and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("world.width", self.world.width)?;
        positive("world.height", self.world.height)?;

        positive("physics.gravity", self.physics.gravity)?;
        positive("physics.fall_impulse", self.physics.fall_impulse)?;
        if let Some(cap) = self.physics.terminal_velocity {
            positive("physics.terminal_velocity", cap)?;
        }

        let p = &self.player;
        positive("player.width", p.width)?;
        positive("player.height", p.height)?;
        positive("player.max_speed", p.max_speed)?;
        positive("player.dash_speed", p.dash_speed)?;
        if p.jump_speed >= 0.0 {
            return Err(ConfigError::Invalid {
                field: "player.jump_speed",
                reason: format!("must be negative (upward), got {}", p.jump_speed),
            });
        }
        nonzero("player.max_jumps", p.max_jumps as u64)?;
        nonzero("player.dash_duration", p.dash_duration)?;
        nonzero("player.max_health", p.max_health.max(0) as u64)?;
        nonzero("player.trail_capacity", p.trail_capacity as u64)?;
        if let Some(a) = p.run_acceleration {
            positive("player.run_acceleration", a)?;
        }
        if let Some(d) = p.run_deceleration {
            positive("player.run_deceleration", d)?;
        }
        if p.width > self.world.width {
            return Err(ConfigError::Invalid {
                field: "player.width",
                reason: "player is wider than the world".to_string(),
            });
        }

        let e = &self.enemy;
        positive("enemy.width", e.width)?;
        positive("enemy.height", e.height)?;
        positive("enemy.patrol_speed", e.patrol_speed)?;
        nonzero("enemy.max_health", e.max_health.max(0) as u64)?;

        positive("projectile.width", self.projectile.width)?;
        positive("projectile.height", self.projectile.height)?;
        positive("projectile.speed", self.projectile.speed)?;

        let a = &self.animation;
        nonzero("animation.idle_cadence", a.idle_cadence)?;
        nonzero("animation.running_cadence", a.running_cadence)?;
        nonzero("animation.attack_cadence", a.attack_cadence)?;
        nonzero("animation.idle_frames", a.idle_frames as u64)?;
        nonzero("animation.running_frames", a.running_frames as u64)?;
        nonzero("animation.attack_frames", a.attack_frames as u64)?;

        let g = &self.generator;
        positive("generator.platform_width", g.platform_width)?;
        positive("generator.platform_height", g.platform_height)?;
        positive("generator.vertical_spacing", g.vertical_spacing)?;
        positive("generator.scroll_step", g.scroll_step)?;
        nonzero("generator.max_attempts_per_platform", g.max_attempts_per_platform as u64)?;
        if g.platform_width > self.world.width {
            return Err(ConfigError::Invalid {
                field: "generator.platform_width",
                reason: "platforms are wider than the world".to_string(),
            });
        }
        if !(g.scroll_line_fraction > 0.0 && g.scroll_line_fraction < 1.0) {
            return Err(ConfigError::Invalid {
                field: "generator.scroll_line_fraction",
                reason: format!("must be within (0, 1), got {}", g.scroll_line_fraction),
            });
        }

        positive("level.ground_height", self.level.ground_height)?;
        Ok(())
    }
}
