use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{Motivation, Resource, Variation};

pub const DEFAULT_MAX_ROUNDS: usize = 10_000;

/// Parameters for one run of the model.
///
/// The defaults are the reference setup: 16 players over 4 resource letters with
/// 5 objectives each, both ratios 3, values 20/10 and 25 idle rounds to converge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub num_players: usize,
    pub num_resources: usize,
    pub objectives_per_player: usize,
    pub resource_ratio: usize,
    pub objective_ratio: usize,
    pub value_high: u32,
    pub value_low: u32,
    pub variation: Variation,
    /// Consecutive rounds without a successful action before the run stops.
    pub stale_rounds: usize,
    pub motivation: Motivation,
    pub seed: u64,
    /// Hard stop for runs that never settle.
    pub max_rounds: usize,
    /// Randomize the resource partition and the player/objective deal.
    pub shuffle: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            num_players: 16,
            num_resources: 4,
            objectives_per_player: 5,
            resource_ratio: 3,
            objective_ratio: 3,
            value_high: 20,
            value_low: 10,
            variation: Variation::AllocationOnly,
            stale_rounds: 25,
            motivation: Motivation::SelfInterested,
            seed: 12345,
            max_rounds: DEFAULT_MAX_ROUNDS,
            shuffle: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("player count must be positive and even, got {0}")]
    PlayerCount(usize),
    #[error("resource count must be even and between 2 and {max}, got {got}", max = Resource::MAX_KINDS)]
    ResourceCount { got: usize },
    #[error("each player needs at least one objective")]
    NoObjectives,
    #[error("{0} ratio must be at least 1")]
    Ratio(&'static str),
    #[error("max_rounds must be positive when negotiation is enabled")]
    NoRoundBudget,
    #[error("unknown variation {0}; expected 0-5")]
    UnknownVariation(u8),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ModelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_players == 0 || self.num_players % 2 != 0 {
            return Err(ConfigError::PlayerCount(self.num_players));
        }
        if self.num_resources < 2
            || self.num_resources % 2 != 0
            || self.num_resources > Resource::MAX_KINDS
        {
            return Err(ConfigError::ResourceCount {
                got: self.num_resources,
            });
        }
        if self.objectives_per_player == 0 {
            return Err(ConfigError::NoObjectives);
        }
        if self.resource_ratio == 0 {
            return Err(ConfigError::Ratio("resource"));
        }
        if self.objective_ratio == 0 {
            return Err(ConfigError::Ratio("objective"));
        }
        if self.variation.negotiates() && self.max_rounds == 0 {
            return Err(ConfigError::NoRoundBudget);
        }
        Ok(())
    }

    pub fn with_variation(mut self, variation: Variation) -> Self {
        self.variation = variation;
        self
    }

    pub fn with_motivation(mut self, motivation: Motivation) -> Self {
        self.motivation = motivation;
        self
    }

    /// Reads a JSON config; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: ModelConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}

/// Maps variation numbers (0-5) onto variations, rejecting the first unknown one.
pub fn parse_variations(numbers: &[u8]) -> Result<Vec<Variation>, ConfigError> {
    numbers
        .iter()
        .map(|number| Variation::from_number(*number).ok_or(ConfigError::UnknownVariation(*number)))
        .collect()
}
