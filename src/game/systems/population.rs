//! NPC population maintenance
//!
//! Removes dead NPCs from the roster and refills toward the difficulty
//! cap on a randomized respawn timer. Fresh NPCs spawn in a ring around
//! the map center, with spawn length scaling up as the round progresses.

use rand::Rng;
use std::f32::consts::TAU;

use crate::config::DifficultyConfig;
use crate::game::constants::{snake, spawn};
use crate::game::state::{generate_npc_name, Agent, AgentId, Archetype, WorldState};
use crate::game::systems::behavior::BehaviorController;
use crate::util::torus;
use crate::util::vec2::Vec2;

#[derive(Debug)]
pub struct NpcPopulation {
    difficulty: DifficultyConfig,
    spawn_timer: f32,
}

impl NpcPopulation {
    pub fn new(difficulty: DifficultyConfig) -> Self {
        Self {
            difficulty,
            spawn_timer: 0.0,
        }
    }

    pub fn cap(&self) -> usize {
        self.difficulty.npc_cap
    }

    /// Fill a fraction of the cap at round start
    pub fn spawn_initial(
        &mut self,
        world: &mut WorldState,
        controller: &mut BehaviorController,
        rng: &mut impl Rng,
    ) {
        let initial = (self.difficulty.npc_cap as f32 * spawn::INITIAL_FILL_RATIO) as usize;
        for _ in 0..initial {
            self.spawn_npc(world, controller, rng);
        }
        self.spawn_timer = rng.gen_range(spawn::TIMER_MIN..spawn::TIMER_MAX);
        tracing::info!(count = initial, cap = self.difficulty.npc_cap, "spawned initial npcs");
    }

    /// Reap dead NPCs, then respawn toward the cap on the timer
    pub fn update(
        &mut self,
        world: &mut WorldState,
        controller: &mut BehaviorController,
        rng: &mut impl Rng,
        dt: f32,
    ) {
        let dead: Vec<AgentId> = world
            .roster
            .iter()
            .copied()
            .filter(|&id| world.get_agent(id).map(|a| !a.alive).unwrap_or(true))
            .collect();
        for id in dead {
            world.remove_npc(id);
            controller.unregister(id);
        }

        if world.npc_count() >= self.difficulty.npc_cap {
            return;
        }

        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            self.spawn_npc(world, controller, rng);
            self.spawn_timer = rng.gen_range(spawn::TIMER_MIN..spawn::TIMER_MAX);
        }
    }

    fn roll_archetype(&self, rng: &mut impl Rng) -> Archetype {
        let roll: f32 = rng.gen();
        if roll < self.difficulty.aggressive_ratio {
            Archetype::Aggressive
        } else if roll < self.difficulty.aggressive_ratio + self.difficulty.timid_ratio {
            Archetype::Timid
        } else {
            Archetype::Normal
        }
    }

    fn spawn_npc(
        &self,
        world: &mut WorldState,
        controller: &mut BehaviorController,
        rng: &mut impl Rng,
    ) {
        let map_size = world.map_size;
        let center = Vec2::new(map_size / 2.0, map_size / 2.0);
        let angle = rng.gen_range(0.0..TAU);
        let distance = rng.gen_range(spawn::DISTANCE_MIN..spawn::DISTANCE_MAX);
        let position = torus::wrap_point(center + Vec2::from_angle(angle) * distance, map_size);

        // Spawn length drifts upward over the round so late arrivals can
        // still compete, capped by the difficulty's size ceiling
        let growth = 1.0
            + (world.elapsed / spawn::GROWTH_TIME_SCALE).min(spawn::GROWTH_MAX)
                * self.difficulty.growth_rate;
        let base = rng.gen_range(
            snake::INITIAL_LENGTH..snake::INITIAL_LENGTH * spawn::NPC_LENGTH_MAX_FACTOR,
        );
        let length = (base * growth).min(snake::INITIAL_LENGTH * self.difficulty.max_size);

        let archetype = self.roll_archetype(rng);
        let heading = rng.gen_range(0.0..TAU);
        let id = world.alloc_agent_id();
        let name = generate_npc_name(rng);

        tracing::debug!(id, %name, ?archetype, length, "npc spawned");
        world.add_npc(Agent::npc(id, name, position, archetype, heading, length, map_size));
        controller.register(id, archetype, heading, rng);
    }
}
