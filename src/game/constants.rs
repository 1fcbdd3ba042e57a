/// World/map constants
pub mod map {
    /// Side length of the square toroidal arena (world units)
    pub const SIZE: f32 = 5000.0;
    /// Spatial grid cell size as a fraction of the map side.
    /// Too small multiplies cell-boundary crossings in the 3x3 scan,
    /// too large degrades bucket selectivity; map/20 works well empirically.
    pub const GRID_CELL_DIVISOR: f32 = 20.0;
}

/// Snake (agent) body and movement constants
pub mod snake {
    /// Starting length for every agent; also the floor boosting can drain to
    pub const INITIAL_LENGTH: f32 = 10.0;
    /// Head width at the initial length
    pub const INITIAL_WIDTH: f32 = 20.0;
    /// Width never grows past this regardless of length
    pub const WIDTH_CAP: f32 = 40.0;
    /// Distance between adjacent body segments
    pub const SEGMENT_SPACING: f32 = 5.0;
    /// Heading relaxation rate: fraction of the angular difference closed
    /// per second (0.15 per frame at the original 60 Hz)
    pub const TURN_RATE: f32 = 9.0;
    /// Easing rate for the first segment chasing the head, per second
    pub const FOLLOW_RATE: f32 = 30.0;
    /// Player base speed (units/second)
    pub const PLAYER_SPEED: f32 = 180.0;
    /// NPC base speed (units/second)
    pub const NPC_SPEED: f32 = 150.0;
    /// Speed multiplier while boosting
    pub const BOOST_MULTIPLIER: f32 = 2.0;
    /// Length consumed per second of boosting (player rate)
    pub const BOOST_CONSUMPTION: f32 = 18.0;
    /// NPCs pay a reduced fraction of the player's boost cost
    pub const NPC_BOOST_DRAIN_FACTOR: f32 = 0.7;
    /// Boosting is permitted only while length > factor x initial length
    pub const BOOST_MIN_LENGTH_FACTOR: f32 = 1.5;
    /// Segment widths taper by index but never below this fraction of head width
    pub const SEGMENT_WIDTH_FLOOR: f32 = 0.3;
    /// A freshly appended tail segment takes this fraction of the old tail width
    pub const TAIL_WIDTH_FACTOR: f32 = 0.9;
    /// Own segments this close to the head are exempt from self-collision,
    /// so the body can curl without instantly killing itself
    pub const SELF_COLLISION_EXEMPT_SEGMENTS: usize = 10;
    /// Body collisions trigger at this fraction of the summed radii.
    /// Deliberate forgiveness margin, not a bug.
    pub const COLLISION_FORGIVENESS: f32 = 0.8;
}

/// Food constants
pub mod food {
    /// Diameter of a normal food pellet
    pub const SIZE: f32 = 10.0;
    /// Length gained by eating a normal pellet
    pub const VALUE: f32 = 1.0;
    /// One pellet per this much map area, before the density multiplier
    pub const AREA_PER_FOOD: f32 = 10_000.0;
    /// Replenishment cap per simulation step
    pub const REPLENISH_PER_STEP: usize = 5;
    /// Death scatter spreads pellets within this radius of the corpse
    pub const SCATTER_RADIUS: f32 = 100.0;
    /// Pellets scattered by a death are worth more
    pub const DEATH_VALUE: f32 = 2.0;
    /// ...and slightly larger
    pub const DEATH_SIZE_FACTOR: f32 = 1.5;
    /// Number of food color variants available to the renderer
    pub const COLOR_VARIANTS: u8 = 4;
}

/// NPC behavior constants
pub mod ai {
    /// Radius within which an NPC senses food
    pub const FOOD_SENSE_RADIUS: f32 = 300.0;
    /// Radius within which an NPC senses rival agents (player included)
    pub const AGENT_SENSE_RADIUS: f32 = 400.0;
    /// A rival longer than this ratio of own length is a threat
    pub const THREAT_LENGTH_RATIO: f32 = 1.2;
    /// A rival shorter than this ratio of own length is an opportunity
    pub const PREY_LENGTH_RATIO: f32 = 0.8;
    /// Minimum own length (x initial) before considering an attack
    pub const HUNT_MIN_LENGTH_FACTOR: f32 = 1.5;
    /// Minimum own length (x initial) before boosting during an attack
    pub const ATTACK_BOOST_LENGTH_FACTOR: f32 = 2.0;
    /// Randomized per-NPC decision interval bounds (seconds)
    pub const DECISION_INTERVAL_MIN: f32 = 0.1;
    pub const DECISION_INTERVAL_MAX: f32 = 0.3;
    /// State timer bounds per state (seconds)
    pub const EXPLORE_TIMER_MIN: f32 = 5.0;
    pub const EXPLORE_TIMER_MAX: f32 = 15.0;
    pub const COLLECT_TIMER_MIN: f32 = 2.0;
    pub const COLLECT_TIMER_MAX: f32 = 5.0;
    pub const ATTACK_TIMER_MIN: f32 = 5.0;
    pub const ATTACK_TIMER_MAX: f32 = 10.0;
    pub const FLEE_TIMER_MIN: f32 = 3.0;
    pub const FLEE_TIMER_MAX: f32 = 6.0;
    /// Residual chance to re-roll exploration when nothing else fires
    pub const EXPLORE_REROLL_CHANCE: f32 = 0.1;
    /// Per-tick chance for an exploring NPC to wander off in a new direction
    pub const EXPLORE_REDIRECT_CHANCE: f32 = 0.02;
    /// Exploring NPCs steer back toward the center inside this edge band.
    /// The world wraps, so this is a behavioral choice to cluster activity
    /// centrally rather than a physical boundary.
    pub const EDGE_BUFFER: f32 = 100.0;
    /// Pursuit extrapolates the target this far into the future (seconds)
    pub const ATTACK_LOOKAHEAD: f32 = 0.17;
    /// Attackers boost inside this range of the target
    pub const ATTACK_BOOST_RANGE: f32 = 200.0;
    /// Aggressive archetype perturbs the pursuit angle by up to +-this (radians)
    pub const AGGRESSIVE_JITTER: f32 = 0.25;
    /// Timid archetype veers away from rivals closer than this
    pub const TIMID_AVOID_RADIUS: f32 = 200.0;
    /// ...blending the avoidance heading in by this factor
    pub const TIMID_BLEND: f32 = 0.3;
}

/// NPC population/spawn constants
pub mod spawn {
    /// Fraction of the population cap filled at round start
    pub const INITIAL_FILL_RATIO: f32 = 0.7;
    /// Randomized respawn timer bounds while below capacity (seconds)
    pub const TIMER_MIN: f32 = 3.0;
    pub const TIMER_MAX: f32 = 8.0;
    /// NPCs spawn in this distance band from the map center,
    /// never directly on top of the player
    pub const DISTANCE_MIN: f32 = 1000.0;
    pub const DISTANCE_MAX: f32 = 2000.0;
    /// Fresh NPC length is drawn between initial and this factor x initial
    pub const NPC_LENGTH_MAX_FACTOR: f32 = 2.0;
    /// Elapsed-time scale for late-game spawn growth (seconds)
    pub const GROWTH_TIME_SCALE: f32 = 300.0;
    /// Cap on the elapsed-time growth term
    pub const GROWTH_MAX: f32 = 2.0;
}

/// Simulation step constants
pub mod sim {
    /// Nominal tick rate in Hz
    pub const TICK_RATE: u32 = 60;
    /// Delta time per nominal tick in seconds
    pub const DT: f32 = 1.0 / TICK_RATE as f32;
    /// Elapsed time per step is clamped to this, avoiding large-step
    /// integration artifacts after a stall
    pub const MAX_DT: f32 = 0.1;
}
