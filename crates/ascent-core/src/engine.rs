//! Simulation engine - main entry point for running a session

use hecs::{Entity, World};
use std::io::{Read, Write};

use crate::components::*;
use crate::config::{ConfigError, SimConfig};
use crate::events::{Cue, DeathCause, SessionStatus, TickReport};
use crate::generation::{build_level, LevelLayout, PlatformGenerator};
use crate::input::{InputFrame, InputTranslator};
use crate::persistence::{load_simulation, save_simulation, SaveError, SessionHeader};
use crate::snapshot::RenderSnapshot;
use crate::systems::*;

/// One play session: owns the ECS world, the platform generator and the
/// input translator
pub struct Simulation {
    /// ECS world containing obstacles, actors and projectiles
    pub world: World,
    config: SimConfig,
    tick: u64,
    status: SessionStatus,
    player: Entity,
    generator: PlatformGenerator,
    translator: InputTranslator,
    /// Populate and scroll with the generator
    procedural: bool,
}

impl Simulation {
    /// Start a procedural session from `config`
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        let layout = LevelLayout::from_config(&config);
        Self::from_layout(config, layout)
    }

    /// Start a session on an explicit layout
    pub fn from_layout(config: SimConfig, layout: LevelLayout) -> Result<Self, ConfigError> {
        config.validate()?;
        layout.validate()?;

        let mut world = World::new();
        let player = build_level(&mut world, &layout, &config);
        let mut generator = PlatformGenerator::new(&config.generator, config.world.width);

        if layout.procedural {
            let avoid = actor_rects(&world);
            let start = Rect::new(
                layout.player_start.x,
                layout.player_start.y,
                config.player.width,
                config.player.height,
            );
            generator.seed_initial(&mut world, &start, config.world.height, &avoid);
        }

        log::info!(
            "session started: {} obstacle(s), {} enemy(ies), seed {}",
            collision::obstacle_count(&world),
            layout.enemies.len(),
            generator.seed()
        );

        Ok(Self {
            world,
            translator: InputTranslator::new(config.player.double_tap_ms),
            config,
            tick: 0,
            status: SessionStatus::Running,
            player,
            generator,
            procedural: layout.procedural,
        })
    }

    /// Advance one tick from raw input
    pub fn tick(&mut self, input: &InputFrame) -> TickReport {
        let commands = self.translator.translate(input);
        self.step(&commands)
    }

    /// Advance one tick with already-translated commands
    pub fn step(&mut self, commands: &[Command]) -> TickReport {
        if self.status.is_over() {
            return TickReport {
                tick: self.tick,
                status: self.status,
                cues: Vec::new(),
            };
        }

        self.tick += 1;
        let now = self.tick;
        let mut cues = Vec::new();

        player_command_system(&mut self.world, self.player, commands, now, &self.config, &mut cues);
        enemy_think_system(&mut self.world, self.player, now, &self.config, &mut cues);

        let reports = physics_system(&mut self.world, &self.config);
        player_settle_system(&mut self.world, self.player, &reports, &self.config);
        enemy_patrol_system(&mut self.world, &reports, &self.config);

        // Projectile hits land before removal so a killing shot despawns this tick
        projectile_system(&mut self.world, &self.config, &mut cues);
        enemy_cleanup_system(&mut self.world, self.config.world.height, &mut cues);

        if let Some(cause) = self.death_cause() {
            self.status = SessionStatus::Dead(cause);
            cues.push(Cue::PlayerDied);
            log::info!("player died at tick {}: {:?}", now, cause);
        } else if self.procedural {
            let outcome = scroll_system(&mut self.world, self.player, &self.config);
            if outcome.scrolled() {
                let avoid = actor_rects(&self.world);
                let band = PlatformGenerator::refill_band(self.config.world.height);
                self.generator.fill_to_target(&mut self.world, band, &avoid);
            }
        }

        TickReport {
            tick: now,
            status: self.status,
            cues,
        }
    }

    fn death_cause(&self) -> Option<DeathCause> {
        let fell = self
            .world
            .get::<&Body>(self.player)
            .map_or(true, |b| b.rect.top() > self.config.world.height);
        if fell {
            return Some(DeathCause::FellOutOfWorld);
        }
        let defeated = self
            .world
            .get::<&Health>(self.player)
            .map_or(false, |h| h.is_depleted());
        defeated.then_some(DeathCause::Defeated)
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(
            &self.world,
            self.player,
            self.tick,
            self.status,
            &self.config.animation,
        )
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    pub fn seed(&self) -> u64 {
        self.generator.seed()
    }

    pub fn player_body(&self) -> Option<Body> {
        self.world.get::<&Body>(self.player).ok().map(|b| *b)
    }

    pub fn player_state(&self) -> Option<Player> {
        self.world.get::<&Player>(self.player).ok().map(|p| (*p).clone())
    }

    pub fn player_health(&self) -> Option<Health> {
        self.world.get::<&Health>(self.player).ok().map(|h| *h)
    }

    pub fn score(&self) -> u64 {
        self.world.get::<&Player>(self.player).map_or(0, |p| p.score)
    }

    pub fn enemy_count(&self) -> usize {
        self.world.query::<&Enemy>().iter().count()
    }

    pub fn obstacle_count(&self) -> usize {
        collision::obstacle_count(&self.world)
    }

    /// Save the complete session to a writer
    pub fn save<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        let header = SessionHeader {
            tick: self.tick,
            status: self.status,
            config: self.config.clone(),
            seed: self.generator.seed(),
            procedural: self.procedural,
        };
        save_simulation(writer, &self.world, self.player, &header)?;
        log::info!("session saved at tick {}", self.tick);
        Ok(())
    }

    /// Restore a session written by [`Simulation::save`]
    pub fn load<R: Read>(reader: R) -> Result<Self, SaveError> {
        let loaded = load_simulation(reader)?;
        let header = loaded.header;
        let generator = PlatformGenerator::resumed(
            header.seed,
            header.tick,
            &header.config.generator,
            header.config.world.width,
        );
        log::info!("session loaded at tick {}", header.tick);

        Ok(Self {
            world: loaded.world,
            translator: InputTranslator::new(header.config.player.double_tap_ms),
            config: header.config,
            tick: header.tick,
            status: header.status,
            player: loaded.player,
            generator,
            procedural: header.procedural,
        })
    }
}

/// Hitboxes of every actor, kept clear by the generator
fn actor_rects(world: &World) -> Vec<Rect> {
    world
        .query::<&Body>()
        .iter()
        .map(|(_, body)| body.rect)
        .collect()
}
