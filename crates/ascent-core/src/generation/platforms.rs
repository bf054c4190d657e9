//! Procedural platform generation.
//!
//! Platforms are sampled uniformly and rejected when they intersect anything
//! already placed. There is no reachability guarantee beyond the initial
//! stack seeded above the player's start.

use hecs::World;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::components::{Material, Rect};
use crate::config::GeneratorConfig;
use crate::systems::collision::{add_obstacle, obstacle_count, obstacle_rects};

/// Vertical range `[top, bottom)` for a platform's top edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub top: f32,
    pub bottom: f32,
}

impl Band {
    pub fn new(top: f32, bottom: f32) -> Self {
        Self { top, bottom }
    }
}

/// Seeded platform sampler owned by the simulation
#[derive(Debug, Clone)]
pub struct PlatformGenerator {
    rng: StdRng,
    seed: u64,
    config: GeneratorConfig,
    world_width: f32,
}

impl PlatformGenerator {
    /// Seed from `config.seed`, or from entropy when unset
    pub fn new(config: &GeneratorConfig, world_width: f32) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        Self::with_seed(seed, config, world_width)
    }

    pub fn with_seed(seed: u64, config: &GeneratorConfig, world_width: f32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
            config: config.clone(),
            world_width,
        }
    }

    /// Deterministic stream for a session restored at `tick`
    pub fn resumed(seed: u64, tick: u64, config: &GeneratorConfig, world_width: f32) -> Self {
        let mut generator = Self::with_seed(seed, config, world_width);
        generator.rng = StdRng::seed_from_u64(seed ^ tick.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        generator
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Platforms sit on whole units so push-out snaps stay exact in f32
    fn platform_at(&self, x: f32, y: f32) -> Rect {
        Rect::new(
            x.floor(),
            y.floor(),
            self.config.platform_width,
            self.config.platform_height,
        )
    }

    fn sample_x(&mut self, min: f32, max: f32) -> f32 {
        let hi = (self.world_width - self.config.platform_width).max(0.0);
        let lo = min.clamp(0.0, hi);
        let hi = max.clamp(0.0, hi);
        if hi > lo {
            self.rng.gen_range(lo..=hi)
        } else {
            lo
        }
    }

    /// Uniform candidate inside `band`
    pub fn sample(&mut self, band: Band) -> Rect {
        let x = self.sample_x(0.0, self.world_width);
        let y = if band.bottom > band.top {
            self.rng.gen_range(band.top..band.bottom)
        } else {
            band.top
        };
        self.platform_at(x, y)
    }

    /// Add platforms until the world holds `target_count` obstacles.
    /// Returns how many were placed.
    pub fn fill_to_target(&mut self, world: &mut World, band: Band, avoid: &[Rect]) -> usize {
        let existing = obstacle_count(world);
        let deficit = self.config.target_count.saturating_sub(existing);
        if deficit == 0 {
            return 0;
        }

        let mut occupied = obstacle_rects(world);
        occupied.extend_from_slice(avoid);

        let max_draws = self.config.max_attempts_per_platform * deficit;
        let mut placed = 0;
        let mut draws = 0;
        while placed < deficit && draws < max_draws {
            draws += 1;
            let candidate = self.sample(band);
            if occupied.iter().any(|r| r.intersects(&candidate)) {
                continue;
            }
            let material = Material::random(&mut self.rng);
            add_obstacle(world, candidate, material);
            occupied.push(candidate);
            placed += 1;
        }

        if placed < deficit {
            log::warn!(
                "platform generator placed {} of {} after {} draws",
                placed,
                deficit,
                draws
            );
        } else {
            log::debug!("placed {} platform(s) in {} draws", placed, draws);
        }
        placed
    }

    /// Stack platforms above `start` at the configured spacing, each within a
    /// reachable horizontal gap of the previous one. Returns how many were placed.
    pub fn seed_stack(&mut self, world: &mut World, start: &Rect, avoid: &[Rect]) -> usize {
        let mut occupied = obstacle_rects(world);
        occupied.extend_from_slice(avoid);

        let gap = self.config.max_horizontal_gap;
        let mut prev_x = start.x;
        let mut placed = 0;
        for i in 1..=self.config.seeded_platforms {
            let y = start.bottom() - i as f32 * self.config.vertical_spacing;
            if y < 0.0 {
                break;
            }
            for _ in 0..self.config.max_attempts_per_platform {
                let x = self.sample_x(prev_x - gap, prev_x + gap);
                let candidate = self.platform_at(x, y);
                if occupied.iter().any(|r| r.intersects(&candidate)) {
                    continue;
                }
                add_obstacle(world, candidate, Material::random(&mut self.rng));
                occupied.push(candidate);
                prev_x = x;
                placed += 1;
                break;
            }
        }
        placed
    }

    /// Seed the stack above the player, then fill the visible screen
    pub fn seed_initial(
        &mut self,
        world: &mut World,
        start: &Rect,
        world_height: f32,
        avoid: &[Rect],
    ) -> usize {
        let stacked = self.seed_stack(world, start, avoid);
        let band = Band::new(0.0, world_height - self.config.platform_height);
        stacked + self.fill_to_target(world, band, avoid)
    }

    /// Refill band above the visible screen, used after scrolling
    pub fn refill_band(world_height: f32) -> Band {
        Band::new(-world_height / 2.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(target: usize) -> GeneratorConfig {
        GeneratorConfig {
            target_count: target,
            seed: Some(7),
            ..Default::default()
        }
    }

    fn assert_pairwise_disjoint(rects: &[Rect]) {
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                assert!(!a.intersects(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_fill_reaches_target_without_overlap() {
        let mut world = World::new();
        let mut generator = PlatformGenerator::new(&config(10), 4000.0);
        let placed = generator.fill_to_target(&mut world, Band::new(0.0, 4000.0), &[]);

        assert_eq!(placed, 10);
        let rects = obstacle_rects(&world);
        assert_eq!(rects.len(), 10);
        assert_pairwise_disjoint(&rects);
    }

    #[test]
    fn test_fill_respects_band_and_avoid() {
        let mut world = World::new();
        let mut generator = PlatformGenerator::new(&config(8), 800.0);
        let actor = Rect::new(300.0, -150.0, 50.0, 50.0);
        generator.fill_to_target(&mut world, Band::new(-300.0, 0.0), &[actor]);

        for rect in obstacle_rects(&world) {
            assert!(rect.top() >= -300.0 && rect.top() < 0.0);
            assert!(rect.left() >= 0.0 && rect.right() <= 800.0);
            assert!(!rect.intersects(&actor));
        }
    }

    #[test]
    fn test_fill_gives_up_when_crowded() {
        let mut world = World::new();
        // Band only fits one 200-wide platform per row and a single row
        let mut generator = PlatformGenerator::new(&config(5), 200.0);
        let placed = generator.fill_to_target(&mut world, Band::new(0.0, 0.0), &[]);
        assert_eq!(placed, 1);
        assert_eq!(obstacle_count(&world), 1);
    }

    #[test]
    fn test_fill_noop_at_target() {
        let mut world = World::new();
        let mut generator = PlatformGenerator::new(&config(0), 800.0);
        assert_eq!(generator.fill_to_target(&mut world, Band::new(0.0, 600.0), &[]), 0);
    }

    #[test]
    fn test_same_seed_same_layout() {
        let layout = |seed| {
            let mut world = World::new();
            let mut generator = PlatformGenerator::with_seed(seed, &config(10), 800.0);
            generator.fill_to_target(&mut world, Band::new(0.0, 560.0), &[]);
            let mut rects = obstacle_rects(&world);
            rects.sort_by(|a, b| a.y.partial_cmp(&b.y).unwrap().then(a.x.partial_cmp(&b.x).unwrap()));
            rects
        };
        assert_eq!(layout(42), layout(42));
    }

    #[test]
    fn test_seeded_stack_is_reachable() {
        let mut world = World::new();
        let cfg = config(10);
        let mut generator = PlatformGenerator::new(&cfg, 800.0);
        let start = Rect::new(100.0, 500.0, 50.0, 50.0);
        let placed = generator.seed_stack(&mut world, &start, &[start]);
        assert_eq!(placed, cfg.seeded_platforms);

        let mut rects = obstacle_rects(&world);
        rects.sort_by(|a, b| b.y.partial_cmp(&a.y).unwrap());
        let mut prev_x = start.x;
        for (i, rect) in rects.iter().enumerate() {
            assert_eq!(rect.y, start.bottom() - (i + 1) as f32 * cfg.vertical_spacing);
            assert!((rect.x - prev_x).abs() <= cfg.max_horizontal_gap);
            prev_x = rect.x;
        }
    }
}
