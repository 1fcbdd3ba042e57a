//! Food population maintenance
//!
//! Keeps the pellet count near a density-derived target: a full seed at
//! round start, then a small trickle of replacements each step so eaten
//! food reappears gradually instead of all at once.

use rand::Rng;

use crate::game::constants::food;
use crate::game::state::WorldState;
use crate::util::vec2::Vec2;

#[derive(Debug)]
pub struct FoodSystem {
    target_count: usize,
}

impl FoodSystem {
    /// Target derives from map area and the difficulty's density multiplier
    pub fn new(map_size: f32, density: f32) -> Self {
        Self {
            target_count: ((map_size * map_size / food::AREA_PER_FOOD) * density) as usize,
        }
    }

    pub fn target_count(&self) -> usize {
        self.target_count
    }

    fn spawn_one(&self, world: &mut WorldState, rng: &mut impl Rng) {
        let map_size = world.map_size;
        let position = Vec2::new(
            rng.gen_range(0.0..map_size),
            rng.gen_range(0.0..map_size),
        );
        let color = rng.gen_range(0..food::COLOR_VARIANTS);
        world.add_food(position, food::SIZE, food::VALUE, color);
    }

    /// Seed the full target at round start
    pub fn spawn_initial(&self, world: &mut WorldState, rng: &mut impl Rng) {
        for _ in 0..self.target_count.saturating_sub(world.foods.len()) {
            self.spawn_one(world, rng);
        }
        tracing::info!(count = world.foods.len(), "seeded food");
    }

    /// Top up toward the target, a few pellets per step
    pub fn replenish(&self, world: &mut WorldState, rng: &mut impl Rng) {
        let deficit = self.target_count.saturating_sub(world.foods.len());
        for _ in 0..deficit.min(food::REPLENISH_PER_STEP) {
            self.spawn_one(world, rng);
        }
    }
}
