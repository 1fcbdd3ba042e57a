pub mod constants;
pub mod simulation;
pub mod spatial;
pub mod state;
pub mod systems;
