//! Ascent Core - Platformer Actor Simulation
//!
//! The simulation core of a 2D upward-scrolling platformer: kinematic
//! actors with axis-separated collision against static obstacles, a player
//! movement state machine with double jump, wall stick and a timed dash,
//! enemies that patrol and attack, and a procedural platform generator that
//! keeps the level populated as the screen scrolls.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: The player, enemies, obstacles, projectiles
//! - **Components**: Pure data attached to entities (Body, Player, Enemy, Obstacle, etc.)
//! - **Systems**: Logic that queries and updates components once per tick
//!
//! Rendering, audio and input devices live outside the core. They read a
//! [`snapshot::RenderSnapshot`], consume the [`events::Cue`]s of each
//! [`events::TickReport`] and feed [`input::InputFrame`]s in.
//!
//! # Example
//!
//! ```rust,no_run
//! use ascent_core::prelude::*;
//!
//! let mut sim = Simulation::new(SimConfig::default()).unwrap();
//!
//! loop {
//!     let report = sim.tick(&InputFrame::idle()); // 60 ticks per second
//!     if report.status.is_over() {
//!         break;
//!     }
//! }
//! ```

pub mod components;
pub mod config;
pub mod engine;
pub mod events;
pub mod generation;
pub mod input;
pub mod persistence;
pub mod snapshot;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::SimConfig;
    pub use crate::engine::Simulation;
    pub use crate::events::{Cue, DeathCause, SessionStatus, TickReport};
    pub use crate::input::{InputFrame, Key, KeyEvent};
    pub use crate::systems::Command;
}
