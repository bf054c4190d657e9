//! Systems - logic that operates on components

pub mod collision;
mod physics;
mod player;
mod enemy;
mod projectiles;
mod scroll;
mod animation;

pub use physics::*;
pub use player::*;
pub use enemy::*;
pub use projectiles::*;
pub use scroll::*;
pub use animation::*;
