//! World state definitions and structures
//!
//! Contains all entities (player and NPC agents, food) plus the per-tick
//! event log consumed by the presentation layer.

use hashbrown::HashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::constants::{food, snake};
use crate::util::torus;
use crate::util::vec2::Vec2;

/// Unique agent identifier
pub type AgentId = u64;

/// Unique food identifier
pub type FoodId = u64;

/// Behavioral profile tag. The player carries its own tag; NPC tags bias
/// their state-transition weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Archetype {
    Player,
    Normal,
    Aggressive,
    Timid,
}

impl Archetype {
    /// Palette index handed to the renderer
    pub fn color_index(self) -> u8 {
        match self {
            Archetype::Player => 0,
            Archetype::Normal => 1,
            Archetype::Aggressive => 2,
            Archetype::Timid => 3,
        }
    }

    pub fn is_player(self) -> bool {
        matches!(self, Archetype::Player)
    }
}

/// One body-chain element trailing the head
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub position: Vec2,
    pub width: f32,
}

/// Head width derived from length: grows with the square root of relative
/// length, capped at the maximum
pub fn width_for_length(length: f32) -> f32 {
    (snake::INITIAL_WIDTH * (length / snake::INITIAL_LENGTH).sqrt()).min(snake::WIDTH_CAP)
}

/// A controlled organism: the player or an NPC, distinguished by archetype
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub archetype: Archetype,
    pub color_index: u8,
    /// Head position in world space
    pub position: Vec2,
    /// Current heading, always in [0, 2π)
    pub heading: f32,
    /// Heading the agent is turning toward
    pub target_heading: f32,
    /// Base speed in units/second (before boost)
    pub base_speed: f32,
    pub boosting: bool,
    /// Real-valued length; drives score, width, and segment count
    pub length: f32,
    /// Head width derived from length
    pub width: f32,
    /// Ordered body chain behind the head
    pub segments: Vec<Segment>,
    pub alive: bool,
    pub score: u32,
    /// Running maximum score (meaningful for the player)
    pub max_score: u32,
    /// NPCs credited to this agent (meaningful for the player)
    pub kills: u32,
}

impl Agent {
    /// Create the player agent at a position
    pub fn player(id: AgentId, position: Vec2, map_size: f32) -> Self {
        let mut agent = Self {
            id,
            name: "You".to_string(),
            archetype: Archetype::Player,
            color_index: Archetype::Player.color_index(),
            position,
            heading: 0.0,
            target_heading: 0.0,
            base_speed: snake::PLAYER_SPEED,
            boosting: false,
            length: snake::INITIAL_LENGTH,
            width: snake::INITIAL_WIDTH,
            segments: Vec::new(),
            alive: true,
            score: 0,
            max_score: 0,
            kills: 0,
        };
        agent.init_segments(map_size);
        agent
    }

    /// Create an NPC agent with a given archetype, heading, and length
    pub fn npc(
        id: AgentId,
        name: String,
        position: Vec2,
        archetype: Archetype,
        heading: f32,
        length: f32,
        map_size: f32,
    ) -> Self {
        let mut agent = Self {
            id,
            name,
            archetype,
            color_index: archetype.color_index(),
            position,
            heading,
            target_heading: heading,
            base_speed: snake::NPC_SPEED,
            boosting: false,
            length,
            width: width_for_length(length),
            segments: Vec::new(),
            alive: true,
            score: 0,
            max_score: 0,
            kills: 0,
        };
        agent.init_segments(map_size);
        agent
    }

    /// Lay out a fresh segment chain behind the head at fixed spacing,
    /// widths tapering toward the tail
    pub fn init_segments(&mut self, map_size: f32) {
        let count = self.length.floor() as usize;
        let back = -Vec2::from_angle(self.heading);
        self.segments = (0..count)
            .map(|i| Segment {
                position: torus::wrap_point(
                    self.position + back * (i as f32 * snake::SEGMENT_SPACING),
                    map_size,
                ),
                width: self.width * (1.0 - i as f32 / (count as f32 * 2.0)),
            })
            .collect();
    }

    #[inline]
    pub fn head_radius(&self) -> f32 {
        self.width / 2.0
    }

    #[inline]
    pub fn is_player(&self) -> bool {
        self.archetype.is_player()
    }

    /// Current speed including the boost multiplier
    pub fn current_speed(&self) -> f32 {
        if self.boosting {
            self.base_speed * snake::BOOST_MULTIPLIER
        } else {
            self.base_speed
        }
    }

    /// Instantaneous velocity vector, used for pursuit extrapolation
    pub fn velocity(&self) -> Vec2 {
        Vec2::from_angle(self.heading) * self.current_speed()
    }

    /// Consume a food item: unconditional length gain. The caller removes
    /// the food from the world and ensures it is eaten at most once.
    pub fn eat_food(&mut self, value: f32) {
        self.length += value;
    }

    /// Mark the agent dead. Idempotent; a dead agent no longer moves,
    /// grows, or appears in the spatial index.
    pub fn die(&mut self) {
        self.alive = false;
    }

    /// Reset the player for a new round
    pub fn reset(&mut self, position: Vec2, map_size: f32) {
        self.position = position;
        self.heading = 0.0;
        self.target_heading = 0.0;
        self.length = snake::INITIAL_LENGTH;
        self.width = snake::INITIAL_WIDTH;
        self.alive = true;
        self.score = 0;
        self.kills = 0;
        self.boosting = false;
        self.init_segments(map_size);
    }
}

/// A food pellet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Food {
    pub id: FoodId,
    pub position: Vec2,
    /// Diameter
    pub size: f32,
    /// Length gained when eaten
    pub value: f32,
    pub color_index: u8,
}

impl Food {
    #[inline]
    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }
}

/// Events produced during one simulation step, consumed by the renderer
/// for effects and scoring widgets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GameEvent {
    FoodEaten {
        position: Vec2,
        color_index: u8,
    },
    AgentDied {
        id: AgentId,
        position: Vec2,
        segments: Vec<Segment>,
        color_index: u8,
    },
    NpcKilledByPlayer {
        id: AgentId,
    },
}

/// Name pool for NPC agents
const NPC_NAMES: [&str; 20] = [
    "Slithery",
    "Wiggles",
    "Fangs",
    "Hissy",
    "Scales",
    "Venom",
    "Coil",
    "Serpent",
    "Python",
    "Cobra",
    "Mamba",
    "Viper",
    "Anaconda",
    "Boa",
    "Rattler",
    "Sidewinder",
    "Adder",
    "Krait",
    "Taipan",
    "Asp",
];

/// Generate a display name for a freshly spawned NPC
pub fn generate_npc_name(rng: &mut impl Rng) -> String {
    format!(
        "{}{}",
        NPC_NAMES[rng.gen_range(0..NPC_NAMES.len())],
        rng.gen_range(1..1000)
    )
}

/// Full mutable world state for one round.
///
/// Owned exclusively by the simulation step during a tick; the agent and
/// behavior code it calls synchronously reads through it.
#[derive(Debug)]
pub struct WorldState {
    pub map_size: f32,
    /// Arena of agents keyed by id (owner lookup for segment proxies)
    agents: HashMap<AgentId, Agent>,
    /// NPC update order; the player is not part of the roster
    pub roster: Vec<AgentId>,
    pub player_id: AgentId,
    pub foods: Vec<Food>,
    pub events: Vec<GameEvent>,
    pub tick: u64,
    /// Elapsed simulated time since round start (seconds)
    pub elapsed: f32,
    next_agent_id: AgentId,
    next_food_id: FoodId,
}

impl WorldState {
    /// Fresh world with the player placed at the map center
    pub fn new(map_size: f32) -> Self {
        let player_id: AgentId = 0;
        let center = Vec2::new(map_size / 2.0, map_size / 2.0);
        let mut agents = HashMap::new();
        agents.insert(player_id, Agent::player(player_id, center, map_size));

        Self {
            map_size,
            agents,
            roster: Vec::new(),
            player_id,
            foods: Vec::new(),
            events: Vec::new(),
            tick: 0,
            elapsed: 0.0,
            next_agent_id: 1,
            next_food_id: 0,
        }
    }

    pub fn get_agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub fn get_agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    pub fn player(&self) -> &Agent {
        &self.agents[&self.player_id]
    }

    pub fn player_mut(&mut self) -> &mut Agent {
        self.agents
            .get_mut(&self.player_id)
            .expect("player agent always present")
    }

    pub fn alloc_agent_id(&mut self) -> AgentId {
        let id = self.next_agent_id;
        self.next_agent_id += 1;
        id
    }

    /// Insert an NPC into the arena and the back of the roster
    pub fn add_npc(&mut self, agent: Agent) {
        self.roster.push(agent.id);
        self.agents.insert(agent.id, agent);
    }

    /// Drop an NPC from the arena and roster entirely
    pub fn remove_npc(&mut self, id: AgentId) {
        self.roster.retain(|&r| r != id);
        self.agents.remove(&id);
    }

    /// Live agents in index insertion order: player first, then roster order
    pub fn live_agents(&self) -> impl Iterator<Item = &Agent> + '_ {
        std::iter::once(self.player_id)
            .chain(self.roster.iter().copied())
            .filter_map(move |id| self.agents.get(&id))
            .filter(|a| a.alive)
    }

    pub fn npc_count(&self) -> usize {
        self.roster.len()
    }

    pub fn add_food(&mut self, position: Vec2, size: f32, value: f32, color_index: u8) -> FoodId {
        let id = self.next_food_id;
        self.next_food_id += 1;
        self.foods.push(Food {
            id,
            position,
            size,
            value,
            color_index,
        });
        id
    }

    pub fn food_position(&self, id: FoodId) -> Option<Vec2> {
        self.foods.iter().find(|f| f.id == id).map(|f| f.position)
    }

    /// Remove and return a food item by id
    pub fn remove_food(&mut self, id: FoodId) -> Option<Food> {
        let index = self.foods.iter().position(|f| f.id == id)?;
        Some(self.foods.remove(index))
    }

    /// Clear the arena back to a fresh round. The player agent survives
    /// with its lifetime best score; everything else is dropped.
    pub fn reset_round(&mut self) {
        let ids: Vec<AgentId> = self.roster.drain(..).collect();
        for id in ids {
            self.agents.remove(&id);
        }
        self.foods.clear();
        self.events.clear();
        self.tick = 0;
        self.elapsed = 0.0;
        let center = Vec2::new(self.map_size / 2.0, self.map_size / 2.0);
        let map_size = self.map_size;
        self.player_mut().reset(center, map_size);
    }

    /// Scatter food in a randomized burst around a death site
    pub fn scatter_death_food(&mut self, position: Vec2, amount: usize, rng: &mut impl Rng) {
        let map_size = self.map_size;
        for _ in 0..amount {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let distance = rng.gen_range(0.0..food::SCATTER_RADIUS);
            let pos = torus::wrap_point(position + Vec2::from_angle(angle) * distance, map_size);
            let color = rng.gen_range(0..food::COLOR_VARIANTS);
            self.add_food(
                pos,
                food::SIZE * food::DEATH_SIZE_FACTOR,
                food::DEATH_VALUE,
                color,
            );
        }
    }
}
