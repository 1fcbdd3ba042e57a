//! Serpent Royale simulation core
//!
//! A single-player arena game kernel on a toroidal 2D map: a uniform-grid
//! spatial index for collision queries, a behavior state machine for
//! autonomous rival snakes, and the shared movement/growth model used by
//! both the player and NPC agents.
//!
//! Rendering, menus, and input capture are presentation concerns that live
//! outside this crate: callers feed [`game::simulation::PlayerIntent`] into
//! each step and read back snapshots and events once per frame.

pub mod config;
pub mod game;
pub mod util;
