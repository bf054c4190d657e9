//! Component definitions for the ECS simulation.
//!
//! Components are pure data structs attached to entities.
//! They have no behavior - that lives in systems.

mod actors;
mod common;
mod level;

pub use actors::*;
pub use common::*;
pub use level::*;
