#![warn(clippy::all)]
#![deny(rust_2018_idioms)]

pub mod community;
pub mod negotiation;
pub mod pool;
pub mod sim;
pub mod stats;
pub mod types;

#[cfg(test)]
mod fixtures;

pub use community::{Community, CommunityError, Player, Team};
pub use negotiation::{NegotiationError, Negotiator, Protocol};
pub use pool::{ObjectivePool, ResourcePool};
pub use sim::{CollaborationModel, ConfigError, ModelConfig, Simulation, SimulationError};
pub use stats::{BatchStats, RunSummary};
pub use types::{Motivation, Objective, ObjectiveCategory, PlayerId, Resource, TeamId, Variation};
