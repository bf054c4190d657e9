//! Save/Load functionality for persisting a session
//!
//! Uses bincode for compact binary serialization. Components are serialized
//! individually per entity then reconstructed on load; entity ids are not
//! preserved, so the player is located by its index in the saved list.

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::components::*;
use crate::config::{ConfigError, SimConfig};
use crate::events::SessionStatus;

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of a session
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub tick: u64,
    pub status: SessionStatus,
    pub config: SimConfig,
    /// Platform generator seed
    pub seed: u64,
    pub procedural: bool,
    /// Index of the player in `entities`
    pub player_index: usize,
    pub entities: Vec<SerializableEntity>,
}

/// All possible components for an entity, serialized as optionals
#[derive(Serialize, Deserialize, Default)]
pub struct SerializableEntity {
    // Actors
    pub body: Option<Body>,
    pub health: Option<Health>,
    pub player: Option<Player>,
    pub enemy: Option<Enemy>,

    // Level
    pub obstacle: Option<Obstacle>,
    pub projectile: Option<Projectile>,
}

/// Session-level values stored alongside the entities
#[derive(Debug, Clone)]
pub struct SessionHeader {
    pub tick: u64,
    pub status: SessionStatus,
    pub config: SimConfig,
    pub seed: u64,
    pub procedural: bool,
}

/// Extract all entities from a world into serializable form, ordered by
/// entity id. Returns the player's index alongside.
fn serialize_entities(world: &World, player: Entity) -> (Vec<SerializableEntity>, Option<usize>) {
    let mut refs: Vec<_> = world.iter().collect();
    refs.sort_by_key(|e| e.entity().id());

    let mut player_index = None;
    let mut entities = Vec::with_capacity(refs.len());
    for entity_ref in refs {
        let mut se = SerializableEntity::default();

        if let Some(c) = entity_ref.get::<&Body>() {
            se.body = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&Health>() {
            se.health = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&Player>() {
            se.player = Some((*c).clone());
        }
        if let Some(c) = entity_ref.get::<&Enemy>() {
            se.enemy = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&Obstacle>() {
            se.obstacle = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&Projectile>() {
            se.projectile = Some(*c);
        }

        if entity_ref.entity() == player {
            player_index = Some(entities.len());
        }
        entities.push(se);
    }

    (entities, player_index)
}

/// Spawn an entity with all its components
fn spawn_entity(world: &mut World, se: SerializableEntity) -> Entity {
    let entity = world.spawn(());

    if let Some(c) = se.body {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.health {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.player {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.enemy {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.obstacle {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.projectile {
        let _ = world.insert_one(entity, c);
    }
    entity
}

/// Save the complete session to a writer
pub fn save_simulation<W: Write>(
    writer: W,
    world: &World,
    player: Entity,
    header: &SessionHeader,
) -> Result<(), SaveError> {
    let (entities, player_index) = serialize_entities(world, player);
    let player_index = player_index.ok_or(SaveError::Invalid("player entity is missing"))?;

    let save_data = SaveData {
        version: SAVE_VERSION,
        tick: header.tick,
        status: header.status,
        config: header.config.clone(),
        seed: header.seed,
        procedural: header.procedural,
        player_index,
        entities,
    };

    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

/// Load a session from a reader
pub fn load_simulation<R: Read>(reader: R) -> Result<LoadedSimulation, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }
    save_data.config.validate()?;

    let player_ok = save_data
        .entities
        .get(save_data.player_index)
        .map_or(false, |se| se.player.is_some() && se.body.is_some());
    if !player_ok {
        return Err(SaveError::Invalid("player record has no body"));
    }

    let mut world = World::new();
    let mut player = None;
    for (index, se) in save_data.entities.into_iter().enumerate() {
        let entity = spawn_entity(&mut world, se);
        if index == save_data.player_index {
            player = Some(entity);
        }
    }
    let player = player.ok_or(SaveError::Invalid("player entity is missing"))?;

    Ok(LoadedSimulation {
        world,
        player,
        header: SessionHeader {
            tick: save_data.tick,
            status: save_data.status,
            config: save_data.config,
            seed: save_data.seed,
            procedural: save_data.procedural,
        },
    })
}

/// Result of loading a session
pub struct LoadedSimulation {
    pub world: World,
    pub player: Entity,
    pub header: SessionHeader,
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    VersionMismatch { expected: u32, found: u32 },
    Config(ConfigError),
    Invalid(&'static str),
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl From<ConfigError> for SaveError {
    fn from(e: ConfigError) -> Self {
        SaveError::Config(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Save version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            SaveError::Config(e) => write!(f, "Saved config rejected: {}", e),
            SaveError::Invalid(reason) => write!(f, "Invalid save: {}", reason),
        }
    }
}

impl std::error::Error for SaveError {}
