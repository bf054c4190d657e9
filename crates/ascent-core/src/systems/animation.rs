//! Animation frames derived from actor state. Nothing here mutates the world.

use serde::{Deserialize, Serialize};

use crate::components::{Body, Direction, Enemy, EnemyMode, Player, PlayerMode};
use crate::config::AnimationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sequence {
    Idle,
    Running,
    Attack,
    Dash,
    WallStick,
}

/// Which sprite frame to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameId {
    pub sequence: Sequence,
    pub index: u32,
    /// Mirror horizontally (facing left)
    pub flipped: bool,
}

impl FrameId {
    fn new(sequence: Sequence, index: u32, facing: Direction) -> Self {
        Self {
            sequence,
            index,
            flipped: facing == Direction::Left,
        }
    }
}

/// Frame index after `ticks` at `cadence` ticks per frame
pub fn cycle(ticks: u64, cadence: u64, count: u32) -> u32 {
    if cadence == 0 || count == 0 {
        return 0;
    }
    ((ticks / cadence) % count as u64) as u32
}

pub fn player_frame(player: &Player, body: &Body, anim: &AnimationConfig) -> FrameId {
    let (sequence, index) = match player.mode {
        PlayerMode::Dashing => (Sequence::Dash, 0),
        PlayerMode::WallSticking => (Sequence::WallStick, 0),
        PlayerMode::Running if body.velocity.x != 0.0 => (
            Sequence::Running,
            cycle(player.anim_ticks, anim.running_cadence, anim.running_frames),
        ),
        _ => (
            Sequence::Idle,
            cycle(player.anim_ticks, anim.idle_cadence, anim.idle_frames),
        ),
    };
    FrameId::new(sequence, index, body.facing)
}

pub fn enemy_frame(enemy: &Enemy, body: &Body, anim: &AnimationConfig) -> FrameId {
    let (sequence, index) = match enemy.mode {
        EnemyMode::Attacking => (
            Sequence::Attack,
            cycle(enemy.anim_ticks, anim.attack_cadence, anim.attack_frames),
        ),
        EnemyMode::Patrolling if body.velocity.x != 0.0 => (
            Sequence::Running,
            cycle(enemy.anim_ticks, anim.running_cadence, anim.running_frames),
        ),
        EnemyMode::Patrolling => (
            Sequence::Idle,
            cycle(enemy.anim_ticks, anim.idle_cadence, anim.idle_frames),
        ),
    };
    FrameId::new(sequence, index, body.facing)
}
