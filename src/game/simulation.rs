//! Simulation orchestrator
//!
//! Owns the world, the spatial index, the NPC controllers, and the RNG,
//! and advances everything by one tick in a fixed order: index rebuild,
//! player, player collisions, population, NPC steering and motion,
//! NPC collisions, food replenishment.
//!
//! The index is rebuilt once at the start of the step, so all collision
//! and sensing queries within a step observe the pre-movement world. An
//! agent can therefore die to a body position from the previous tick;
//! at 60 Hz the error is a fraction of a segment spacing.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::{Difficulty, GameConfig};
use crate::game::constants::{map, sim};
use crate::game::spatial::SpatialGrid;
use crate::game::state::{Agent, AgentId, Food, GameEvent, WorldState};
use crate::game::systems::behavior::BehaviorController;
use crate::game::systems::food::FoodSystem;
use crate::game::systems::motion::{self, SteerIntent};
use crate::game::systems::population::NpcPopulation;

/// Player input for one tick
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlayerIntent {
    pub target_heading: f32,
    pub boost: bool,
}

/// Serializable view of the world for a renderer or replay log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub elapsed: f32,
    pub agents: Vec<Agent>,
    pub foods: Vec<Food>,
}

#[derive(Debug)]
pub struct Simulation {
    config: GameConfig,
    world: WorldState,
    grid: SpatialGrid,
    controller: BehaviorController,
    population: NpcPopulation,
    food: FoodSystem,
    rng: SmallRng,
    round_over: bool,
}

impl Simulation {
    pub fn new(config: GameConfig) -> Self {
        let difficulty = config.difficulty_config();
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            world: WorldState::new(config.map_size),
            grid: SpatialGrid::new(config.map_size, config.map_size / map::GRID_CELL_DIVISOR),
            controller: BehaviorController::new(difficulty.reaction_speed),
            population: NpcPopulation::new(difficulty),
            food: FoodSystem::new(config.map_size, difficulty.food_density),
            config,
            rng,
            round_over: false,
        }
    }

    pub fn with_seed(mut config: GameConfig, seed: u64) -> Self {
        config.seed = Some(seed);
        Self::new(config)
    }

    /// Start a fresh round, possibly under a new difficulty. The player's
    /// best score survives the restart.
    pub fn restart(&mut self, difficulty: Difficulty) {
        self.config.difficulty = difficulty;
        let bundle = self.config.difficulty_config();
        self.controller = BehaviorController::new(bundle.reaction_speed);
        self.population = NpcPopulation::new(bundle);
        self.food = FoodSystem::new(self.config.map_size, bundle.food_density);
        self.world.reset_round();
        self.round_over = false;
        self.start();
    }

    /// Seed the round: initial NPC roster and the full food field
    pub fn start(&mut self) {
        tracing::info!(
            difficulty = %self.config.difficulty,
            map_size = self.config.map_size,
            "round started"
        );
        self.population
            .spawn_initial(&mut self.world, &mut self.controller, &mut self.rng);
        self.food.spawn_initial(&mut self.world, &mut self.rng);
    }

    /// Advance the world by `dt` seconds
    pub fn step(&mut self, intent: PlayerIntent, dt: f32) {
        if self.round_over {
            return;
        }
        let dt = dt.min(sim::MAX_DT);

        self.grid.rebuild(self.world.live_agents(), &self.world.foods);

        // Player first
        let steer = SteerIntent::player(intent.target_heading, intent.boost);
        if let Some(player) = self.world.get_agent_mut(self.world.player_id) {
            motion::update_agent(player, steer, self.config.map_size, dt);
        }
        self.resolve_collisions(self.world.player_id);

        // Population upkeep before NPCs think, so dead minds are gone
        self.population
            .update(&mut self.world, &mut self.controller, &mut self.rng, dt);

        // NPC steering and motion in roster order
        let roster: Vec<AgentId> = self.world.roster.clone();
        for &id in &roster {
            let Some(steer) =
                self.controller
                    .update(id, &self.world, &self.grid, &mut self.rng, dt)
            else {
                continue;
            };
            if let Some(agent) = self.world.get_agent_mut(id) {
                motion::update_agent(agent, steer, self.config.map_size, dt);
            }
        }

        // NPC collisions, same order
        for &id in &roster {
            self.resolve_collisions(id);
        }

        self.food.replenish(&mut self.world, &mut self.rng);

        self.world.tick += 1;
        self.world.elapsed += dt;
    }

    /// Apply one agent's collision scan: eat overlapped food, die on a
    /// body hit
    fn resolve_collisions(&mut self, id: AgentId) {
        let Some(agent) = self.world.get_agent(id).filter(|a| a.alive) else {
            return;
        };
        let hits = self.grid.check_collisions(agent);

        for food_id in hits.foods {
            // The index is a snapshot; a pellet may already be gone
            let Some(food) = self.world.remove_food(food_id) else {
                continue;
            };
            self.world.events.push(GameEvent::FoodEaten {
                position: food.position,
                color_index: food.color_index,
            });
            if let Some(agent) = self.world.get_agent_mut(id) {
                agent.eat_food(food.value);
            }
        }

        if let Some(killer) = hits.agent {
            self.kill_agent(id, killer);
        }
    }

    /// Kill an agent: emit its death, scatter its body as food, credit
    /// the killer, and end the round if the player died
    fn kill_agent(&mut self, victim_id: AgentId, killer_id: AgentId) {
        let Some(victim) = self.world.get_agent_mut(victim_id).filter(|a| a.alive) else {
            return;
        };
        victim.die();
        let position = victim.position;
        let segments = victim.segments.clone();
        let color_index = victim.color_index;
        let scatter = (victim.length / 2.0).floor() as usize;
        let name = victim.name.clone();

        tracing::debug!(victim = %name, victim_id, killer_id, "agent died");

        self.world.events.push(GameEvent::AgentDied {
            id: victim_id,
            position,
            segments,
            color_index,
        });
        self.world.scatter_death_food(position, scatter, &mut self.rng);

        if victim_id == self.world.player_id {
            self.round_over = true;
            tracing::info!(score = self.world.player().max_score, "round over");
        } else if killer_id == self.world.player_id {
            self.world
                .events
                .push(GameEvent::NpcKilledByPlayer { id: victim_id });
            self.world.player_mut().kills += 1;
        }
    }

    /// Drain the events accumulated since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.world.events)
    }

    /// Clone out a serializable view of the live world
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.world.tick,
            elapsed: self.world.elapsed,
            agents: self.world.live_agents().cloned().collect(),
            foods: self.world.foods.clone(),
        }
    }

    /// Live agents sorted by score, best first
    pub fn leaderboard(&self, top: usize) -> Vec<(String, u32)> {
        let mut entries: Vec<(String, u32)> = self
            .world
            .live_agents()
            .map(|a| (a.name.clone(), a.score))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(top);
        entries
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut WorldState {
        &mut self.world
    }

    pub fn player(&self) -> &Agent {
        self.world.player()
    }

    pub fn is_round_over(&self) -> bool {
        self.round_over
    }
}
