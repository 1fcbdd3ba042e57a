//! NPC decision making
//!
//! Every NPC carries a small state machine (explore, collect, attack,
//! flee) plus an archetype that biases its transition weights and colors
//! its steering. Decisions are re-evaluated on a randomized per-NPC
//! countdown so the population doesn't rethink in lockstep; steering is
//! refreshed every tick from the current state.

use hashbrown::HashMap;
use rand::Rng;

use crate::game::constants::{ai, snake};
use crate::game::spatial::SpatialGrid;
use crate::game::state::{Agent, AgentId, Archetype, FoodId, WorldState};
use crate::game::systems::motion::SteerIntent;
use crate::util::torus;
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorState {
    Exploring,
    Collecting,
    Attacking,
    Fleeing,
}

/// Archetype-specific state transition probabilities
#[derive(Debug, Clone, Copy)]
struct BehaviorWeights {
    explore: f32,
    attack: f32,
    flee: f32,
}

impl BehaviorWeights {
    fn for_archetype(archetype: Archetype) -> Self {
        match archetype {
            Archetype::Aggressive => Self {
                explore: 0.3,
                attack: 0.6,
                flee: 0.1,
            },
            Archetype::Timid => Self {
                explore: 0.8,
                attack: 0.05,
                flee: 0.15,
            },
            _ => Self {
                explore: 0.7,
                attack: 0.2,
                flee: 0.1,
            },
        }
    }
}

/// Per-NPC behavioral memory
#[derive(Debug)]
struct NpcMind {
    state: BehaviorState,
    /// Countdown to the next wander-heading re-roll while exploring;
    /// other states ignore it (they end via decisions, not expiry)
    state_timer: f32,
    /// Countdown to the next decision pass
    decision_timer: f32,
    target_food: Option<FoodId>,
    target_agent: Option<AgentId>,
    /// Heading away from the threat, latched when fleeing begins
    threat_heading: f32,
    weights: BehaviorWeights,
    /// Heading the NPC is currently steering toward
    target_heading: f32,
    boost: bool,
}

impl NpcMind {
    fn new(archetype: Archetype, heading: f32, rng: &mut impl Rng) -> Self {
        Self {
            state: BehaviorState::Exploring,
            state_timer: rng.gen_range(ai::EXPLORE_TIMER_MIN..ai::EXPLORE_TIMER_MAX),
            decision_timer: rng.gen_range(ai::DECISION_INTERVAL_MIN..ai::DECISION_INTERVAL_MAX),
            target_food: None,
            target_agent: None,
            threat_heading: 0.0,
            weights: BehaviorWeights::for_archetype(archetype),
            target_heading: heading,
            boost: false,
        }
    }

    fn enter(&mut self, state: BehaviorState, rng: &mut impl Rng) {
        self.state = state;
        self.boost = false;
        self.state_timer = match state {
            BehaviorState::Exploring => {
                rng.gen_range(ai::EXPLORE_TIMER_MIN..ai::EXPLORE_TIMER_MAX)
            }
            BehaviorState::Collecting => {
                rng.gen_range(ai::COLLECT_TIMER_MIN..ai::COLLECT_TIMER_MAX)
            }
            BehaviorState::Attacking => rng.gen_range(ai::ATTACK_TIMER_MIN..ai::ATTACK_TIMER_MAX),
            BehaviorState::Fleeing => rng.gen_range(ai::FLEE_TIMER_MIN..ai::FLEE_TIMER_MAX),
        };
    }
}

/// Owns the minds of all NPCs and turns world observations into steering
#[derive(Debug)]
pub struct BehaviorController {
    minds: HashMap<AgentId, NpcMind>,
    /// Difficulty reaction multiplier applied to every NPC's turn rate
    reaction: f32,
}

impl BehaviorController {
    pub fn new(reaction: f32) -> Self {
        Self {
            minds: HashMap::new(),
            reaction,
        }
    }

    pub fn register(&mut self, id: AgentId, archetype: Archetype, heading: f32, rng: &mut impl Rng) {
        self.minds.insert(id, NpcMind::new(archetype, heading, rng));
    }

    pub fn unregister(&mut self, id: AgentId) {
        self.minds.remove(&id);
    }

    #[cfg(test)]
    pub fn state_of(&self, id: AgentId) -> Option<BehaviorState> {
        self.minds.get(&id).map(|m| m.state)
    }

    /// Run one NPC's behavior for this tick and produce its steering.
    /// Returns `None` for ids without a mind or whose agent is gone.
    pub fn update(
        &mut self,
        id: AgentId,
        world: &WorldState,
        grid: &SpatialGrid,
        rng: &mut impl Rng,
        dt: f32,
    ) -> Option<SteerIntent> {
        let agent = world.get_agent(id).filter(|a| a.alive)?;
        let mind = self.minds.get_mut(&id)?;

        mind.decision_timer -= dt;
        mind.state_timer -= dt;

        if mind.decision_timer <= 0.0 {
            mind.decision_timer =
                rng.gen_range(ai::DECISION_INTERVAL_MIN..ai::DECISION_INTERVAL_MAX);
            Self::decide(mind, agent, world, grid, rng);
        }

        Self::steer(mind, agent, world, grid, rng, dt);

        Some(SteerIntent::npc(mind.target_heading, mind.boost, self.reaction))
    }

    /// Re-evaluate the state machine from current observations
    fn decide(
        mind: &mut NpcMind,
        agent: &Agent,
        world: &WorldState,
        grid: &SpatialGrid,
        rng: &mut impl Rng,
    ) {
        let rivals = grid.find_nearby_agents(agent.position, ai::AGENT_SENSE_RADIUS, agent.id, |id| {
            world.get_agent(id)
        });

        // Threats override everything, gated by the (doubled) flee weight
        let threat = rivals
            .iter()
            .find(|r| r.length > agent.length * ai::THREAT_LENGTH_RATIO);
        if let Some(threat) = threat {
            if rng.gen::<f32>() < mind.weights.flee * 2.0 {
                mind.threat_heading = torus::normalize_angle(
                    torus::heading_to(threat.position, agent.position, world.map_size),
                );
                mind.target_agent = None;
                mind.target_food = None;
                mind.enter(BehaviorState::Fleeing, rng);
                return;
            }
        }

        // Hunting needs both a suitable victim and enough own length
        let prey = rivals
            .iter()
            .find(|r| r.length < agent.length * ai::PREY_LENGTH_RATIO);
        if let Some(prey) = prey {
            if agent.length > snake::INITIAL_LENGTH * ai::HUNT_MIN_LENGTH_FACTOR
                && rng.gen::<f32>() < mind.weights.attack
            {
                mind.target_agent = Some(prey.id);
                mind.target_food = None;
                mind.enter(BehaviorState::Attacking, rng);
                return;
            }
        }

        // Food nearby pulls toward collecting, gated like the other
        // transitions so snakes don't beeline every pellet they pass
        let food = grid.find_nearby_food(agent.position, ai::FOOD_SENSE_RADIUS);
        if let Some(nearest) = food.first() {
            if rng.gen::<f32>() < mind.weights.explore {
                mind.target_food = Some(nearest.id);
                mind.target_agent = None;
                mind.enter(BehaviorState::Collecting, rng);
                return;
            }
        }

        // Nothing interesting: a small residual chance to drop back to
        // wandering. Whatever state the snake is in rides on otherwise,
        // so flee and attack runs last their full course.
        if rng.gen::<f32>() < ai::EXPLORE_REROLL_CHANCE {
            mind.target_food = None;
            mind.target_agent = None;
            mind.target_heading = rng.gen_range(0.0..std::f32::consts::TAU);
            mind.enter(BehaviorState::Exploring, rng);
        }
    }

    /// Refresh the steering command from the current state
    fn steer(
        mind: &mut NpcMind,
        agent: &Agent,
        world: &WorldState,
        grid: &SpatialGrid,
        rng: &mut impl Rng,
        _dt: f32,
    ) {
        let map_size = world.map_size;
        mind.boost = false;

        match mind.state {
            BehaviorState::Exploring => {
                // Wander, but drift back toward the center when hugging an edge
                let p = agent.position;
                let near_edge = p.x < ai::EDGE_BUFFER
                    || p.y < ai::EDGE_BUFFER
                    || p.x > map_size - ai::EDGE_BUFFER
                    || p.y > map_size - ai::EDGE_BUFFER;
                if near_edge {
                    let center = Vec2::new(map_size / 2.0, map_size / 2.0);
                    mind.target_heading =
                        torus::normalize_angle(torus::heading_to(p, center, map_size));
                } else if mind.state_timer <= 0.0 {
                    mind.target_heading = rng.gen_range(0.0..std::f32::consts::TAU);
                    mind.state_timer =
                        rng.gen_range(ai::EXPLORE_TIMER_MIN..ai::EXPLORE_TIMER_MAX);
                } else if rng.gen::<f32>() < ai::EXPLORE_REDIRECT_CHANCE {
                    mind.target_heading = rng.gen_range(0.0..std::f32::consts::TAU);
                }
            }
            BehaviorState::Collecting => {
                match mind.target_food.and_then(|id| world.food_position(id)) {
                    Some(pos) => {
                        mind.target_heading = torus::normalize_angle(torus::heading_to(
                            agent.position,
                            pos,
                            map_size,
                        ));
                    }
                    None => {
                        // Pellet vanished: grab the next one or go back to wandering
                        let food = grid.find_nearby_food(agent.position, ai::FOOD_SENSE_RADIUS);
                        match food.first() {
                            Some(next) => mind.target_food = Some(next.id),
                            None => {
                                mind.target_heading = rng.gen_range(0.0..std::f32::consts::TAU);
                                mind.enter(BehaviorState::Exploring, rng);
                            }
                        }
                    }
                }
            }
            BehaviorState::Attacking => {
                let victim = mind
                    .target_agent
                    .and_then(|id| world.get_agent(id))
                    .filter(|v| v.alive);
                match victim {
                    Some(victim) => {
                        // Aim ahead of the victim along its current velocity
                        let predicted = torus::wrap_point(
                            victim.position + victim.velocity() * ai::ATTACK_LOOKAHEAD,
                            map_size,
                        );
                        let mut heading =
                            torus::heading_to(agent.position, predicted, map_size);
                        if agent.archetype == Archetype::Aggressive {
                            heading +=
                                rng.gen_range(-ai::AGGRESSIVE_JITTER..ai::AGGRESSIVE_JITTER);
                        }
                        mind.target_heading = torus::normalize_angle(heading);

                        let range =
                            torus::distance(agent.position, victim.position, map_size);
                        mind.boost = range < ai::ATTACK_BOOST_RANGE
                            && agent.length
                                > snake::INITIAL_LENGTH * ai::ATTACK_BOOST_LENGTH_FACTOR;
                    }
                    None => {
                        mind.target_agent = None;
                        mind.target_heading = rng.gen_range(0.0..std::f32::consts::TAU);
                        mind.enter(BehaviorState::Exploring, rng);
                    }
                }
            }
            BehaviorState::Fleeing => {
                mind.target_heading = mind.threat_heading;
                mind.boost =
                    agent.length > snake::INITIAL_LENGTH * snake::BOOST_MIN_LENGTH_FACTOR;
            }
        }

        // Timid snakes veer away from any rival that gets too close,
        // whatever state they are in
        if agent.archetype == Archetype::Timid {
            let rivals = grid.find_nearby_agents(
                agent.position,
                ai::TIMID_AVOID_RADIUS,
                agent.id,
                |id| world.get_agent(id),
            );
            if let Some(closest) = rivals.first() {
                let away = torus::normalize_angle(torus::heading_to(
                    closest.position,
                    agent.position,
                    map_size,
                ));
                let diff = torus::angle_diff(away, mind.target_heading);
                mind.target_heading =
                    torus::normalize_angle(mind.target_heading + diff * ai::TIMID_BLEND);
            }
        }
    }
}
