//! Headless demo round
//!
//! Runs the simulation for one minute with a scripted player that circles
//! the arena, logging the leaderboard as it goes. Useful for smoke-testing
//! tuning changes without a renderer.

use anyhow::Context;
use tracing::{info, Level};

use serpent_royale_core::config::GameConfig;
use serpent_royale_core::game::constants::sim;
use serpent_royale_core::game::simulation::{PlayerIntent, Simulation};
use serpent_royale_core::game::state::GameEvent;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let config = GameConfig::load_or_default();
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid configuration")?;

    let mut simulation = Simulation::new(config);
    simulation.start();

    let mut food_eaten = 0usize;
    let ticks = sim::TICK_RATE as u64 * 60;

    for tick in 0..ticks {
        // Scripted input: sweep through a slow circle, with a burst of
        // boost partway through the round
        let t = tick as f32 * sim::DT;
        let intent = PlayerIntent {
            target_heading: t * 0.4,
            boost: (20.0..25.0).contains(&t),
        };

        simulation.step(intent, sim::DT);

        for event in simulation.take_events() {
            match event {
                GameEvent::FoodEaten { .. } => food_eaten += 1,
                GameEvent::NpcKilledByPlayer { id } => info!(id, "npc eliminated"),
                GameEvent::AgentDied { .. } => {}
            }
        }

        if simulation.is_round_over() {
            break;
        }

        if tick > 0 && tick % (sim::TICK_RATE as u64 * 10) == 0 {
            let board = simulation.leaderboard(5);
            info!(elapsed = %format!("{t:.0}s"), ?board, "leaderboard");
        }
    }

    let player = simulation.player();
    info!(
        score = player.max_score,
        kills = player.kills,
        food_eaten,
        survived = player.alive,
        ticks = simulation.world().tick,
        "demo finished"
    );

    Ok(())
}
