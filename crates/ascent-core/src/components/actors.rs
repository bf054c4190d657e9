//! Actor components: the shared kinematic body plus player and enemy state.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::{Direction, Rect, Vec2};

/// Kinematic body shared by every actor (player and enemies)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Body {
    /// Hitbox
    pub rect: Rect,
    pub velocity: Vec2,
    pub facing: Direction,
    /// Resting on an obstacle after the last vertical pass
    pub on_ground: bool,
    /// Side pushed against during the last horizontal pass
    pub wall_contact: Option<Direction>,
}

impl Body {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            velocity: Vec2::ZERO,
            facing: Direction::Right,
            on_ground: false,
            wall_contact: None,
        }
    }

    pub fn with_facing(mut self, facing: Direction) -> Self {
        self.facing = facing;
        self
    }
}

/// Hit points, never below zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    /// Subtract damage, saturating at zero. Returns the remaining health.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        self.current = (self.current - amount.max(0)).max(0);
        self.current
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0
    }
}

/// Player motion mode. Jumping and falling are not modes: they follow from
/// `Body::on_ground` and the sign of the vertical velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerMode {
    Idle,
    Running,
    Dashing,
    WallSticking,
}

/// Dash timing. All timestamps are simulation ticks.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DashState {
    pub active: bool,
    pub started_at: u64,
    /// Start tick of the most recently accepted dash
    pub last_dash_at: Option<u64>,
}

impl DashState {
    pub fn can_start(&self, now: u64, cooldown: u64) -> bool {
        if self.active {
            return false;
        }
        match self.last_dash_at {
            Some(last) => now.saturating_sub(last) >= cooldown,
            None => true,
        }
    }

    pub fn start(&mut self, now: u64) {
        self.active = true;
        self.started_at = now;
        self.last_dash_at = Some(now);
    }

    pub fn is_expired(&self, now: u64, duration: u64) -> bool {
        self.active && now.saturating_sub(self.started_at) >= duration
    }
}

/// One ghost image left behind during a dash
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPose {
    pub rect: Rect,
    pub facing: Direction,
    pub opacity: f32,
}

/// Bounded buffer of recent poses, oldest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trail {
    poses: VecDeque<TrailPose>,
    capacity: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            poses: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Fade the existing poses by `fade` and append a new one at `opacity`,
    /// dropping the oldest pose when full.
    pub fn record(&mut self, rect: Rect, facing: Direction, opacity: f32, fade: f32) {
        for pose in self.poses.iter_mut() {
            pose.opacity *= fade;
        }
        if self.poses.len() == self.capacity {
            self.poses.pop_front();
        }
        self.poses.push_back(TrailPose {
            rect,
            facing,
            opacity,
        });
    }

    pub fn clear(&mut self) {
        self.poses.clear();
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrailPose> {
        self.poses.iter()
    }

    /// Shift every pose, used when the world scrolls
    pub fn translate(&mut self, dx: f32, dy: f32) {
        for pose in self.poses.iter_mut() {
            pose.rect = pose.rect.translated(dx, dy);
        }
    }
}

/// The controllable actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub mode: PlayerMode,
    /// Jumps used since the last landing
    pub jumps: u32,
    /// Horizontal command currently held
    pub held: Option<Direction>,
    pub dash: DashState,
    pub trail: Trail,
    pub score: u64,
    /// Ticks alive, drives the idle/running frame counters
    pub anim_ticks: u64,
    pub last_shot_at: Option<u64>,
}

impl Player {
    pub fn new(trail_capacity: usize) -> Self {
        Self {
            mode: PlayerMode::Idle,
            jumps: 0,
            held: None,
            dash: DashState::default(),
            trail: Trail::new(trail_capacity),
            score: 0,
            anim_ticks: 0,
            last_shot_at: None,
        }
    }

    pub fn is_dashing(&self) -> bool {
        self.dash.active
    }

    pub fn is_wall_sticking(&self) -> bool {
        self.mode == PlayerMode::WallSticking
    }

    /// Mode to fall back to when no dash or wall-stick is in effect
    pub fn ground_mode(&self) -> PlayerMode {
        if self.held.is_some() {
            PlayerMode::Running
        } else {
            PlayerMode::Idle
        }
    }
}

/// Enemy behavior mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyMode {
    Patrolling,
    Attacking,
}

/// AI-driven actor
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Enemy {
    pub mode: EnemyMode,
    pub direction: Direction,
    pub last_attack_at: Option<u64>,
    pub attack_started_at: u64,
    pub anim_ticks: u64,
}

impl Enemy {
    pub fn new(direction: Direction) -> Self {
        Self {
            mode: EnemyMode::Patrolling,
            direction,
            last_attack_at: None,
            attack_started_at: 0,
            anim_ticks: 0,
        }
    }

    pub fn attack_ready(&self, now: u64, cooldown: u64) -> bool {
        match self.last_attack_at {
            Some(last) => now.saturating_sub(last) >= cooldown,
            None => true,
        }
    }
}

/// Player-fired shot travelling horizontally
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Projectile {
    pub rect: Rect,
    pub vx: f32,
    pub damage: i32,
    pub ticks_left: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_saturates() {
        let mut h = Health::new(100);
        assert_eq!(h.take_damage(30), 70);
        assert_eq!(h.take_damage(500), 0);
        assert!(h.is_depleted());
        // Negative damage is not healing
        assert_eq!(h.take_damage(-10), 0);
    }

    #[test]
    fn test_dash_cooldown_window() {
        let mut dash = DashState::default();
        assert!(dash.can_start(0, 30));
        dash.start(0);
        assert!(!dash.can_start(31, 30), "active dash blocks a new one");
        dash.active = false;
        assert!(!dash.can_start(29, 30));
        assert!(dash.can_start(30, 30));
    }

    #[test]
    fn test_dash_expiry() {
        let mut dash = DashState::default();
        dash.start(100);
        assert!(!dash.is_expired(139, 40));
        assert!(dash.is_expired(140, 40));
    }

    #[test]
    fn test_trail_is_bounded_and_fades() {
        let mut trail = Trail::new(3);
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        for i in 0..5 {
            trail.record(r.translated(i as f32, 0.0), Direction::Right, 0.4, 0.5);
        }
        assert_eq!(trail.len(), 3);
        let poses: Vec<_> = trail.iter().collect();
        assert_eq!(poses[0].rect.x, 2.0, "oldest surviving pose");
        assert!(poses[0].opacity < poses[1].opacity);
        assert_eq!(poses[2].opacity, 0.4);
    }

    #[test]
    fn test_player_ground_mode() {
        let mut p = Player::new(4);
        assert_eq!(p.ground_mode(), PlayerMode::Idle);
        p.held = Some(Direction::Left);
        assert_eq!(p.ground_mode(), PlayerMode::Running);
    }
}
