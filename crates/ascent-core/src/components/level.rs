//! Static level geometry: platforms and walls.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Rect;

/// Surface material of an obstacle. Cosmetic only; all materials collide the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    Grass,
    Stone,
    Dirt,
}

impl Material {
    pub const ALL: [Material; 3] = [Material::Grass, Material::Stone, Material::Dirt];

    pub fn random(rng: &mut impl Rng) -> Self {
        *Self::ALL.choose(rng).unwrap_or(&Material::Grass)
    }
}

/// Immovable rectangular collision surface
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Obstacle {
    pub rect: Rect,
    pub material: Material,
}

impl Obstacle {
    pub fn new(rect: Rect, material: Material) -> Self {
        Self { rect, material }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_material_covers_all() {
        let mut rng = StdRng::seed_from_u64(11);
        let picked: Vec<Material> = (0..64).map(|_| Material::random(&mut rng)).collect();
        for material in Material::ALL {
            assert!(picked.contains(&material), "{:?} never picked", material);
        }
    }
}
