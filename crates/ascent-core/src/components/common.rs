//! Common geometry shared by actors, obstacles and projectiles.
//!
//! Screen coordinates: x grows to the right, y grows downward.

use serde::{Deserialize, Serialize};

/// 2D vector (positions, velocities)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

/// Horizontal direction, used for facing, patrols, dashes and wall sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// -1.0 for left, 1.0 for right
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Direction of a signed horizontal speed, `None` when stationary
    pub fn from_velocity(vx: f32) -> Option<Self> {
        if vx > 0.0 {
            Some(Direction::Right)
        } else if vx < 0.0 {
            Some(Direction::Left)
        } else {
            None
        }
    }
}

/// Axis-aligned rectangle (top-left corner + size)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Rejected rectangle construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryError {
    NonPositiveSize { width: f32, height: f32 },
    NonFinite,
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::NonPositiveSize { width, height } => {
                write!(f, "rectangle size must be positive, got {}x{}", width, height)
            }
            GeometryError::NonFinite => write!(f, "rectangle has non-finite coordinates"),
        }
    }
}

impl std::error::Error for GeometryError {}

impl Rect {
    /// Build a rectangle. Callers pass constant or validated sizes; use
    /// [`Rect::try_new`] for untrusted input.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        debug_assert!(width > 0.0 && height > 0.0, "rect size {}x{}", width, height);
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn try_new(x: f32, y: f32, width: f32, height: f32) -> Result<Self, GeometryError> {
        if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
            return Err(GeometryError::NonFinite);
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(GeometryError::NonPositiveSize { width, height });
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Strict overlap: rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    pub fn set_right(&mut self, right: f32) {
        self.x = right - self.width;
    }

    pub fn set_bottom(&mut self, bottom: f32) {
        self.y = bottom - self.height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right_neighbour = Rect::new(10.0, 0.0, 10.0, 10.0);
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!a.intersects(&right_neighbour));
        assert!(!a.intersects(&below));
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(9.5, 9.5, 1.0, 1.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));

        let far = Rect::new(50.0, 0.0, 1.0, 1.0);
        assert!(!a.intersects(&far));
    }

    #[test]
    fn test_try_new_rejects_degenerate() {
        assert_eq!(
            Rect::try_new(0.0, 0.0, 0.0, 5.0),
            Err(GeometryError::NonPositiveSize {
                width: 0.0,
                height: 5.0
            })
        );
        assert_eq!(
            Rect::try_new(f32::NAN, 0.0, 1.0, 1.0),
            Err(GeometryError::NonFinite)
        );
        assert!(Rect::try_new(1.0, 2.0, 3.0, 4.0).is_ok());
    }

    #[test]
    fn test_edge_setters() {
        let mut r = Rect::new(0.0, 0.0, 50.0, 50.0);
        r.set_right(200.0);
        r.set_bottom(560.0);
        assert_eq!(r.x, 150.0);
        assert_eq!(r.y, 510.0);
        assert_eq!(r.bottom(), 560.0);
    }

    #[test]
    fn test_direction_helpers() {
        assert_eq!(Direction::Left.sign(), -1.0);
        assert_eq!(Direction::Right.opposite(), Direction::Left);
        assert_eq!(Direction::from_velocity(-3.0), Some(Direction::Left));
        assert_eq!(Direction::from_velocity(0.0), None);
    }
}
