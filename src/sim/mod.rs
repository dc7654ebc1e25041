pub mod config;
pub mod model;

use crate::negotiation::NegotiationError;

pub use config::{ConfigError, DEFAULT_MAX_ROUNDS, ModelConfig, parse_variations};
pub use model::{CollaborationModel, Progress, Simulation};

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("negotiation failed: {0}")]
    Negotiation(#[from] NegotiationError),
}
