//! Upward scrolling: once the player climbs past the scroll line the whole
//! world shifts down and obstacles leaving the bottom of the screen are culled.

use hecs::{Entity, World};

use crate::components::{Body, Obstacle, Player, Projectile};
use crate::config::SimConfig;

/// What one scroll pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollOutcome {
    pub steps: u32,
    pub culled: usize,
}

impl ScrollOutcome {
    pub fn scrolled(&self) -> bool {
        self.steps > 0
    }
}

/// Shift everything down by `dy`
pub fn shift_world(world: &mut World, dy: f32) {
    for (_, obstacle) in world.query_mut::<&mut Obstacle>() {
        obstacle.rect = obstacle.rect.translated(0.0, dy);
    }
    for (_, body) in world.query_mut::<&mut Body>() {
        body.rect = body.rect.translated(0.0, dy);
    }
    for (_, projectile) in world.query_mut::<&mut Projectile>() {
        projectile.rect = projectile.rect.translated(0.0, dy);
    }
    for (_, player) in world.query_mut::<&mut Player>() {
        player.trail.translate(0.0, dy);
    }
}

/// Despawn obstacles whose top is at or below `world_height`
pub fn cull_below(world: &mut World, world_height: f32) -> usize {
    let doomed: Vec<Entity> = world
        .query::<&Obstacle>()
        .iter()
        .filter(|(_, obstacle)| obstacle.rect.top() >= world_height)
        .map(|(entity, _)| entity)
        .collect();
    for entity in &doomed {
        let _ = world.despawn(*entity);
    }
    doomed.len()
}

/// Scroll while the player is above the scroll line, scoring each step
pub fn scroll_system(world: &mut World, player: Entity, config: &SimConfig) -> ScrollOutcome {
    let line = config.generator.scroll_line(config.world.height);
    let step = config.generator.scroll_step;

    let mut outcome = ScrollOutcome::default();
    loop {
        let Ok(top) = world.get::<&Body>(player).map(|b| b.rect.top()) else {
            break;
        };
        if top >= line {
            break;
        }
        shift_world(world, step);
        if let Ok(mut p) = world.get::<&mut Player>(player) {
            p.score += config.generator.score_per_scroll;
        }
        outcome.steps += 1;
    }

    if outcome.scrolled() {
        outcome.culled = cull_below(world, config.world.height);
        log::debug!(
            "scrolled {} step(s), culled {} obstacle(s)",
            outcome.steps,
            outcome.culled
        );
    }
    outcome
}
