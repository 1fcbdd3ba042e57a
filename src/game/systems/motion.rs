//! Agent movement and body dynamics
//!
//! One shared motion model for the player and NPCs: heading relaxation
//! toward a target, boost drain with a length floor, head integration on
//! the torus, segment chain follow, and segment-count reconciliation
//! against the current length.

use crate::game::constants::snake;
use crate::game::state::{width_for_length, Agent, Segment};
use crate::util::torus;
use crate::util::vec2::Vec2;

/// Per-tick steering command applied to one agent
#[derive(Debug, Clone, Copy)]
pub struct SteerIntent {
    /// Heading the agent wants to face
    pub target_heading: f32,
    /// Whether the agent wants to boost
    pub boost: bool,
    /// Multiplier on the turn rate (difficulty reaction speed for NPCs)
    pub reaction: f32,
    /// Multiplier on the boost length drain
    pub boost_drain: f32,
}

impl SteerIntent {
    /// Player input: full turn rate, full boost cost
    pub fn player(target_heading: f32, boost: bool) -> Self {
        Self {
            target_heading,
            boost,
            reaction: 1.0,
            boost_drain: 1.0,
        }
    }

    /// NPC steering: difficulty-scaled reaction, reduced boost cost
    pub fn npc(target_heading: f32, boost: bool, reaction: f32) -> Self {
        Self {
            target_heading,
            boost,
            reaction,
            boost_drain: snake::NPC_BOOST_DRAIN_FACTOR,
        }
    }
}

/// Advance one agent by `dt` seconds under a steering intent
pub fn update_agent(agent: &mut Agent, intent: SteerIntent, map_size: f32, dt: f32) {
    if !agent.alive {
        return;
    }

    agent.target_heading = torus::normalize_angle(intent.target_heading);

    // Relax the heading toward the target over the shortest arc
    let diff = torus::angle_diff(agent.target_heading, agent.heading);
    let fraction = (snake::TURN_RATE * intent.reaction * dt).min(1.0);
    agent.heading = torus::normalize_angle(agent.heading + diff * fraction);

    // Boost gate: only permitted with enough length in reserve
    agent.boosting =
        intent.boost && agent.length > snake::INITIAL_LENGTH * snake::BOOST_MIN_LENGTH_FACTOR;

    if agent.boosting {
        agent.length -= snake::BOOST_CONSUMPTION * intent.boost_drain * dt;
        if agent.length <= snake::INITIAL_LENGTH {
            agent.length = snake::INITIAL_LENGTH;
            agent.boosting = false;
        }
    }

    // Integrate the head
    let speed = agent.current_speed();
    agent.position = torus::wrap_point(
        agent.position + Vec2::from_angle(agent.heading) * (speed * dt),
        map_size,
    );

    agent.width = width_for_length(agent.length);

    update_segments(agent, map_size, dt);
    reconcile_segment_count(agent, map_size);
    retaper_widths(agent);

    agent.score = (agent.length - snake::INITIAL_LENGTH).max(0.0).floor() as u32;
    agent.max_score = agent.max_score.max(agent.score);
}

/// Drag the segment chain along behind the head
fn update_segments(agent: &mut Agent, map_size: f32, dt: f32) {
    if agent.segments.is_empty() {
        return;
    }

    // First segment eases toward the point one spacing behind the head
    let anchor = torus::wrap_point(
        agent.position - Vec2::from_angle(agent.heading) * snake::SEGMENT_SPACING,
        map_size,
    );
    let to_anchor = torus::delta(agent.segments[0].position, anchor, map_size);
    let ease = (snake::FOLLOW_RATE * dt).min(1.0);
    agent.segments[0].position =
        torus::wrap_point(agent.segments[0].position + to_anchor * ease, map_size);

    // Each later segment moves toward its predecessor just enough to
    // restore the fixed spacing, so the chain never bunches or stretches
    for i in 1..agent.segments.len() {
        let prev = agent.segments[i - 1].position;
        let cur = agent.segments[i].position;
        let d = torus::distance(cur, prev, map_size);
        if d > snake::SEGMENT_SPACING {
            let step = torus::delta(cur, prev, map_size).normalize() * (d - snake::SEGMENT_SPACING);
            agent.segments[i].position = torus::wrap_point(cur + step, map_size);
        }
    }
}

/// Grow or shrink the chain until its count matches floor(length)
fn reconcile_segment_count(agent: &mut Agent, map_size: f32) {
    let target = agent.length.floor().max(0.0) as usize;

    while agent.segments.len() < target {
        let (pos, width) = match agent.segments.last() {
            Some(tail) => {
                let prev = agent
                    .segments
                    .len()
                    .checked_sub(2)
                    .map(|i| agent.segments[i].position)
                    .unwrap_or(agent.position);
                // Extend along the tail's own heading, away from its predecessor
                let away = -torus::delta(tail.position, prev, map_size);
                let dir = if away.length_sq() > f32::EPSILON * f32::EPSILON {
                    away.normalize()
                } else {
                    -Vec2::from_angle(agent.heading)
                };
                (
                    torus::wrap_point(tail.position + dir * snake::SEGMENT_SPACING, map_size),
                    tail.width * snake::TAIL_WIDTH_FACTOR,
                )
            }
            None => (
                torus::wrap_point(
                    agent.position - Vec2::from_angle(agent.heading) * snake::SEGMENT_SPACING,
                    map_size,
                ),
                agent.width,
            ),
        };
        agent.segments.push(Segment { position: pos, width });
    }

    while agent.segments.len() > target {
        agent.segments.pop();
    }
}

/// Re-taper segment widths from the current head width, with a floor so
/// the tail stays visible
fn retaper_widths(agent: &mut Agent) {
    let n = agent.segments.len();
    if n == 0 {
        return;
    }
    for (i, seg) in agent.segments.iter_mut().enumerate() {
        let taper = 1.0 - i as f32 / (n as f32 * 1.5);
        seg.width = agent.width * taper.max(snake::SEGMENT_WIDTH_FLOOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::sim;
    use crate::game::state::Archetype;
    use std::f32::consts::{FRAC_PI_2, PI, TAU};

    const MAP: f32 = 5000.0;

    fn player() -> Agent {
        Agent::player(0, Vec2::new(2500.0, 2500.0), MAP)
    }

    fn step(agent: &mut Agent, intent: SteerIntent) {
        update_agent(agent, intent, MAP, sim::DT);
    }

    #[test]
    fn test_heading_stays_normalized() {
        let mut agent = player();
        for target in [-3.0f32, 7.0, TAU + 1.0, -TAU, 0.0] {
            for _ in 0..30 {
                step(&mut agent, SteerIntent::player(target, false));
                assert!(
                    (0.0..TAU).contains(&agent.heading),
                    "heading {} out of range",
                    agent.heading
                );
            }
        }
    }

    #[test]
    fn test_turn_takes_shortest_arc() {
        let mut agent = player();
        agent.heading = 0.1;
        // Target just below 2π: shortest arc is a small negative rotation
        step(&mut agent, SteerIntent::player(TAU - 0.1, false));
        let d = torus::angle_diff(agent.heading, 0.1);
        assert!(d < 0.0, "expected negative rotation, got {d}");
        assert!(d.abs() < 0.2);
    }

    #[test]
    fn test_heading_converges_to_target() {
        let mut agent = player();
        for _ in 0..300 {
            step(&mut agent, SteerIntent::player(FRAC_PI_2, false));
        }
        assert!(torus::angle_diff(FRAC_PI_2, agent.heading).abs() < 1e-3);
    }

    #[test]
    fn test_boost_requires_reserve() {
        let mut agent = player();
        // At initial length: boost request ignored
        step(&mut agent, SteerIntent::player(0.0, true));
        assert!(!agent.boosting);
        assert_eq!(agent.length, snake::INITIAL_LENGTH);

        agent.length = snake::INITIAL_LENGTH * 2.0;
        step(&mut agent, SteerIntent::player(0.0, true));
        assert!(agent.boosting);
        assert!(agent.length < snake::INITIAL_LENGTH * 2.0);
    }

    #[test]
    fn test_boost_cancels_at_reserve_gate() {
        let mut agent = player();
        agent.length = snake::INITIAL_LENGTH * snake::BOOST_MIN_LENGTH_FACTOR + 0.01;
        for _ in 0..120 {
            step(&mut agent, SteerIntent::player(0.0, true));
            assert!(agent.length >= snake::INITIAL_LENGTH);
        }
        assert!(!agent.boosting);
        assert!(agent.length < snake::INITIAL_LENGTH * snake::BOOST_MIN_LENGTH_FACTOR);
    }

    #[test]
    fn test_boost_never_drains_below_initial() {
        // A single oversized dt cannot overshoot the floor
        let mut agent = player();
        agent.length = snake::INITIAL_LENGTH * snake::BOOST_MIN_LENGTH_FACTOR + 0.01;
        update_agent(&mut agent, SteerIntent::player(0.0, true), MAP, 10.0);
        assert_eq!(agent.length, snake::INITIAL_LENGTH);
        assert!(!agent.boosting);
    }

    #[test]
    fn test_boost_doubles_distance() {
        let mut slow = player();
        let mut fast = player();
        fast.length = 100.0;
        let start = slow.position;

        step(&mut slow, SteerIntent::player(0.0, false));
        step(&mut fast, SteerIntent::player(0.0, true));

        let d_slow = torus::distance(start, slow.position, MAP);
        let d_fast = torus::distance(start, fast.position, MAP);
        assert!((d_fast - d_slow * snake::BOOST_MULTIPLIER).abs() < 1e-3);
    }

    #[test]
    fn test_npc_boost_drains_less() {
        let mut npc = Agent::npc(
            1,
            "N".to_string(),
            Vec2::new(100.0, 100.0),
            Archetype::Normal,
            0.0,
            100.0,
            MAP,
        );
        let mut pl = player();
        pl.length = 100.0;

        update_agent(&mut pl, SteerIntent::player(0.0, true), MAP, sim::DT);
        update_agent(&mut npc, SteerIntent::npc(0.0, true, 1.0), MAP, sim::DT);

        let player_drain = 100.0 - pl.length;
        let npc_drain = 100.0 - npc.length;
        assert!((npc_drain - player_drain * snake::NPC_BOOST_DRAIN_FACTOR).abs() < 1e-4);
    }

    #[test]
    fn test_segment_count_tracks_length() {
        let mut agent = player();
        agent.eat_food(7.3);
        step(&mut agent, SteerIntent::player(0.0, false));
        assert_eq!(agent.segments.len(), agent.length.floor() as usize);

        // Shrink: boosting drains length, chain must follow downward too
        agent.length = 50.0;
        for _ in 0..60 {
            step(&mut agent, SteerIntent::player(0.0, true));
            assert_eq!(agent.segments.len(), agent.length.floor() as usize);
        }
    }

    #[test]
    fn test_large_growth_reconciled_in_one_tick() {
        let mut agent = player();
        agent.eat_food(42.0);
        step(&mut agent, SteerIntent::player(0.0, false));
        assert_eq!(agent.segments.len(), agent.length.floor() as usize);
    }

    #[test]
    fn test_spacing_converges_while_moving_straight() {
        let mut agent = player();
        for _ in 0..600 {
            step(&mut agent, SteerIntent::player(0.0, false));
        }
        for i in 1..agent.segments.len() {
            let d = torus::distance(
                agent.segments[i].position,
                agent.segments[i - 1].position,
                MAP,
            );
            assert!(
                (d - snake::SEGMENT_SPACING).abs() < 0.5,
                "segment {i} spacing {d}"
            );
        }
    }

    #[test]
    fn test_segments_stay_in_world() {
        let mut agent = player();
        agent.position = Vec2::new(3.0, 3.0);
        agent.init_segments(MAP);
        for _ in 0..120 {
            step(&mut agent, SteerIntent::player(PI, false));
            for seg in &agent.segments {
                assert!((0.0..MAP).contains(&seg.position.x));
                assert!((0.0..MAP).contains(&seg.position.y));
            }
        }
    }

    #[test]
    fn test_restored_agent_chain_reconverges() {
        // Serialize a grown, turning agent; restore it, lay a fresh chain,
        // and let the follow dynamics settle back to the fixed spacing
        let mut agent = player();
        agent.eat_food(25.0);
        for _ in 0..120 {
            step(&mut agent, SteerIntent::player(1.3, false));
        }

        let bytes =
            bincode::serde::encode_to_vec(&agent, bincode::config::standard()).unwrap();
        let (mut restored, _): (Agent, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard()).unwrap();
        assert!(restored.position.approx_eq(agent.position, 1e-6));
        assert_eq!(restored.length, agent.length);
        assert_eq!(restored.heading, agent.heading);

        restored.init_segments(MAP);
        let heading = restored.heading + FRAC_PI_2;
        for _ in 0..600 {
            step(&mut restored, SteerIntent::player(heading, false));
        }
        for i in 1..restored.segments.len() {
            let d = torus::distance(
                restored.segments[i].position,
                restored.segments[i - 1].position,
                MAP,
            );
            assert!(
                d <= snake::SEGMENT_SPACING + 0.1,
                "segment {i} spacing {d}"
            );
        }
    }

    #[test]
    fn test_widths_taper_with_floor() {
        let mut agent = player();
        agent.eat_food(90.0);
        step(&mut agent, SteerIntent::player(0.0, false));
        let head_w = agent.width;
        let mut prev = f32::INFINITY;
        for seg in &agent.segments {
            assert!(seg.width <= prev + 1e-4);
            assert!(seg.width >= head_w * snake::SEGMENT_WIDTH_FLOOR - 1e-4);
            prev = seg.width;
        }
    }

    #[test]
    fn test_score_tracks_growth() {
        let mut agent = player();
        agent.eat_food(12.6);
        step(&mut agent, SteerIntent::player(0.0, false));
        assert_eq!(agent.score, 12);
        assert_eq!(agent.max_score, 12);
    }

    #[test]
    fn test_dead_agent_is_inert() {
        let mut agent = player();
        agent.die();
        let before = agent.position;
        step(&mut agent, SteerIntent::player(1.0, true));
        assert_eq!(agent.position, before);
    }
}
