//! Per-tick outputs: session status and fire-and-forget audio cues.

use serde::{Deserialize, Serialize};

/// Sound cue emitted on a transition edge. The core never waits on playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    Jump,
    Dash,
    ProjectileFired,
    DamageInflicted,
    EnemyDefeated,
    PlayerDied,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// The player's top edge passed the bottom of the world
    FellOutOfWorld,
    /// Health reached zero
    Defeated,
}

/// Session state. `Dead` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Running,
    Dead(DeathCause),
}

impl SessionStatus {
    pub fn is_over(&self) -> bool {
        matches!(self, SessionStatus::Dead(_))
    }
}

/// Result of one simulation tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub status: SessionStatus,
    pub cues: Vec<Cue>,
}

impl TickReport {
    pub fn has_cue(&self, cue: Cue) -> bool {
        self.cues.contains(&cue)
    }
}
