use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::game::constants::map;

/// Named difficulty preset selecting an NPC population/behavior bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown difficulty '{0}', expected one of: easy, normal, hard")]
pub struct ParseDifficultyError(String);

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            other => Err(ParseDifficultyError(other.to_string())),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

/// Tuning bundle attached to a difficulty level
#[derive(Debug, Clone, Copy)]
pub struct DifficultyConfig {
    /// Maximum NPC roster size
    pub npc_cap: usize,
    /// Probability a fresh NPC spawns aggressive
    pub aggressive_ratio: f32,
    /// Probability a fresh NPC spawns timid (remainder is normal)
    pub timid_ratio: f32,
    /// Multiplier on NPC turn rate
    pub reaction_speed: f32,
    /// NPC length cap as a multiple of the initial length
    pub max_size: f32,
    /// Multiplier on the food density target
    pub food_density: f32,
    /// How fast late-game NPC spawns scale up in size
    pub growth_rate: f32,
}

impl Difficulty {
    pub fn config(self) -> DifficultyConfig {
        match self {
            Difficulty::Easy => DifficultyConfig {
                npc_cap: 20,
                aggressive_ratio: 0.1,
                timid_ratio: 0.4,
                reaction_speed: 0.7,
                max_size: 5.0,
                food_density: 1.5,
                growth_rate: 0.8,
            },
            Difficulty::Normal => DifficultyConfig {
                npc_cap: 40,
                aggressive_ratio: 0.33,
                timid_ratio: 0.33,
                reaction_speed: 1.0,
                max_size: 10.0,
                food_density: 1.0,
                growth_rate: 1.0,
            },
            Difficulty::Hard => DifficultyConfig {
                npc_cap: 60,
                aggressive_ratio: 0.4,
                timid_ratio: 0.2,
                reaction_speed: 1.2,
                max_size: 20.0,
                food_density: 0.7,
                growth_rate: 1.2,
            },
        }
    }
}

/// Simulation configuration
///
/// A single immutable value constructed up front and passed into every
/// component; no ambient global tuning state.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Side length of the square toroidal world
    pub map_size: f32,
    /// Difficulty selected at round start
    pub difficulty: Difficulty,
    /// Optional override of the difficulty's NPC cap
    pub npc_cap_override: Option<usize>,
    /// Optional RNG seed for reproducible rounds
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_size: map::SIZE,
            difficulty: Difficulty::Normal,
            npc_cap_override: None,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(size) = std::env::var("MAP_SIZE") {
            if let Ok(parsed) = size.parse::<f32>() {
                if parsed > 0.0 && parsed.is_finite() {
                    config.map_size = parsed;
                } else {
                    tracing::warn!("MAP_SIZE must be positive and finite, using default");
                }
            } else {
                tracing::warn!("Invalid MAP_SIZE '{}', using default", size);
            }
        }

        if let Ok(diff) = std::env::var("DIFFICULTY") {
            match diff.parse() {
                Ok(parsed) => config.difficulty = parsed,
                Err(e) => tracing::warn!("{}, using default", e),
            }
        }

        if let Ok(cap) = std::env::var("NPC_CAP") {
            if let Ok(parsed) = cap.parse::<usize>() {
                config.npc_cap_override = Some(parsed);
            } else {
                tracing::warn!("Invalid NPC_CAP '{}', ignoring", cap);
            }
        }

        if let Ok(seed) = std::env::var("SIM_SEED") {
            if let Ok(parsed) = seed.parse::<u64>() {
                config.seed = Some(parsed);
            } else {
                tracing::warn!("Invalid SIM_SEED '{}', ignoring", seed);
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if !(self.map_size > 0.0 && self.map_size.is_finite()) {
            return Err("map_size must be positive and finite".to_string());
        }
        if self.map_size < map::SIZE / map::GRID_CELL_DIVISOR {
            return Err("map_size too small for the spatial grid cell size".to_string());
        }
        if self.npc_cap_override == Some(0) {
            return Err("npc cap override must be at least 1".to_string());
        }
        Ok(())
    }

    /// Difficulty bundle with the optional cap override applied
    pub fn difficulty_config(&self) -> DifficultyConfig {
        let mut bundle = self.difficulty.config();
        if let Some(cap) = self.npc_cap_override {
            bundle.npc_cap = cap;
        }
        bundle
    }
}
