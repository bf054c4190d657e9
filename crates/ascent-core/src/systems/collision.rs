//! Static collision world - obstacles stored as ECS entities, plus the
//! per-axis push-out used by every kinematic body.
//!
//! Resolution contract: a displacement is applied in sub-steps no longer
//! than the hitbox extent on that axis, so a body can never skip over an
//! obstacle. After each sub-step the overlapping obstacles are processed
//! closest leading edge first (ties broken by entity id) and the hitbox is
//! pushed out along the axis of motion only.

use hecs::{Entity, World};

use crate::components::{Material, Obstacle, Rect};

/// An obstacle returned by [`query`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleHit {
    pub entity: Entity,
    pub rect: Rect,
}

/// Axis of a displacement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Obstacles strictly overlapping `rect`. No ordering guarantee.
pub fn query(world: &World, rect: &Rect) -> Vec<ObstacleHit> {
    world
        .query::<&Obstacle>()
        .iter()
        .filter(|(_, obstacle)| obstacle.rect.intersects(rect))
        .map(|(entity, obstacle)| ObstacleHit {
            entity,
            rect: obstacle.rect,
        })
        .collect()
}

/// True if any obstacle strictly overlaps `rect`
pub fn any_overlap(world: &World, rect: &Rect) -> bool {
    world
        .query::<&Obstacle>()
        .iter()
        .any(|(_, obstacle)| obstacle.rect.intersects(rect))
}

pub fn add_obstacle(world: &mut World, rect: Rect, material: Material) -> Entity {
    world.spawn((Obstacle::new(rect, material),))
}

/// Despawn an obstacle. Returns false if `entity` is not an obstacle.
pub fn remove_obstacle(world: &mut World, entity: Entity) -> bool {
    if world.get::<&Obstacle>(entity).is_err() {
        return false;
    }
    world.despawn(entity).is_ok()
}

pub fn obstacle_count(world: &World) -> usize {
    world.query::<&Obstacle>().iter().count()
}

pub fn obstacle_rects(world: &World) -> Vec<Rect> {
    world
        .query::<&Obstacle>()
        .iter()
        .map(|(_, obstacle)| obstacle.rect)
        .collect()
}

/// Move `rect` by `displacement` along `axis`, stopping at the first obstacle.
/// Returns true if the motion was blocked.
pub fn resolve_axis(world: &World, rect: &mut Rect, axis: Axis, displacement: f32) -> bool {
    if displacement == 0.0 {
        return false;
    }

    let extent = match axis {
        Axis::Horizontal => rect.width,
        Axis::Vertical => rect.height,
    };
    let steps = (displacement.abs() / extent).ceil().max(1.0) as u32;
    let step = displacement / steps as f32;

    for _ in 0..steps {
        *rect = match axis {
            Axis::Horizontal => rect.translated(step, 0.0),
            Axis::Vertical => rect.translated(0.0, step),
        };

        let mut hits = query(world, rect);
        if hits.is_empty() {
            continue;
        }

        sort_by_leading_edge(&mut hits, axis, step > 0.0);
        for hit in &hits {
            if !rect.intersects(&hit.rect) {
                continue;
            }
            match (axis, step > 0.0) {
                (Axis::Horizontal, true) => rect.set_right(hit.rect.left()),
                (Axis::Horizontal, false) => rect.x = hit.rect.right(),
                (Axis::Vertical, true) => rect.set_bottom(hit.rect.top()),
                (Axis::Vertical, false) => rect.y = hit.rect.bottom(),
            }
        }
        return true;
    }

    false
}

fn sort_by_leading_edge(hits: &mut [ObstacleHit], axis: Axis, positive: bool) {
    hits.sort_by(|a, b| {
        let (ea, eb) = match (axis, positive) {
            (Axis::Horizontal, true) => (a.rect.left(), b.rect.left()),
            (Axis::Horizontal, false) => (-a.rect.right(), -b.rect.right()),
            (Axis::Vertical, true) => (a.rect.top(), b.rect.top()),
            (Axis::Vertical, false) => (-a.rect.bottom(), -b.rect.bottom()),
        };
        ea.partial_cmp(&eb)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.entity.id().cmp(&b.entity.id()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with(rects: &[Rect]) -> World {
        let mut world = World::new();
        for r in rects {
            add_obstacle(&mut world, *r, Material::Stone);
        }
        world
    }

    #[test]
    fn test_query_is_strict() {
        let world = world_with(&[Rect::new(0.0, 100.0, 800.0, 20.0)]);
        let resting = Rect::new(10.0, 50.0, 50.0, 50.0);
        assert!(query(&world, &resting).is_empty());
        let sunk = resting.translated(0.0, 1.0);
        assert_eq!(query(&world, &sunk).len(), 1);
    }

    #[test]
    fn test_add_remove_take_effect_immediately() {
        let mut world = World::new();
        let probe = Rect::new(0.0, 0.0, 10.0, 10.0);
        let e = add_obstacle(&mut world, Rect::new(5.0, 5.0, 10.0, 10.0), Material::Dirt);
        assert!(any_overlap(&world, &probe));
        assert!(remove_obstacle(&mut world, e));
        assert!(!any_overlap(&world, &probe));
        assert!(!remove_obstacle(&mut world, e), "already removed");
    }

    #[test]
    fn test_remove_ignores_non_obstacles() {
        let mut world = World::new();
        let other = world.spawn((Rect::new(0.0, 0.0, 1.0, 1.0),));
        assert!(!remove_obstacle(&mut world, other));
        assert!(world.contains(other));
    }

    #[test]
    fn test_fall_snaps_to_top() {
        let world = world_with(&[Rect::new(0.0, 560.0, 800.0, 40.0)]);
        let mut r = Rect::new(100.0, 505.0, 50.0, 50.0);
        assert!(resolve_axis(&world, &mut r, Axis::Vertical, 10.0));
        assert_eq!(r.bottom(), 560.0);
    }

    #[test]
    fn test_head_bump_snaps_to_bottom() {
        let world = world_with(&[Rect::new(0.0, 100.0, 800.0, 20.0)]);
        let mut r = Rect::new(100.0, 125.0, 50.0, 50.0);
        assert!(resolve_axis(&world, &mut r, Axis::Vertical, -15.0));
        assert_eq!(r.top(), 120.0);
    }

    #[test]
    fn test_closest_wall_wins() {
        // Two walls overlapped in one step: the nearer one must stop us
        let world = world_with(&[
            Rect::new(130.0, 0.0, 20.0, 100.0),
            Rect::new(110.0, 0.0, 20.0, 100.0),
        ]);
        let mut r = Rect::new(50.0, 10.0, 50.0, 50.0);
        assert!(resolve_axis(&world, &mut r, Axis::Horizontal, 45.0));
        assert_eq!(r.right(), 110.0);
        assert!(query(&world, &r).is_empty());
    }

    #[test]
    fn test_fast_motion_does_not_tunnel() {
        // 80 units per tick against a 20-unit wall with a 50-unit body
        let world = world_with(&[Rect::new(200.0, 0.0, 20.0, 100.0)]);
        let mut r = Rect::new(100.0, 10.0, 50.0, 50.0);
        assert!(resolve_axis(&world, &mut r, Axis::Horizontal, 80.0));
        assert_eq!(r.right(), 200.0);

        let mut left = Rect::new(260.0, 10.0, 50.0, 50.0);
        assert!(resolve_axis(&world, &mut left, Axis::Horizontal, -80.0));
        assert_eq!(left.left(), 220.0);
    }

    #[test]
    fn test_free_motion_moves_full_distance() {
        let world = World::new();
        let mut r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!resolve_axis(&world, &mut r, Axis::Horizontal, 35.0));
        assert!((r.x - 35.0).abs() < 1e-4);
    }
}
