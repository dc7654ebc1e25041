use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::community::Community;
use crate::negotiation::{NegotiationError, Negotiator, Protocol};
use crate::pool::{ObjectivePool, ResourcePool};
use crate::sim::SimulationError;
use crate::sim::config::{ConfigError, ModelConfig};
use crate::stats::RunSummary;
use crate::types::{Motivation, PlayerId};

/// Counters for the negotiation loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub rounds: usize,
    pub encounters: usize,
    pub actions: usize,
    pub stale_rounds: usize,
    pub converged: bool,
}

/// One run: freshly built pools and community, negotiated until nothing has
/// changed for `stale_rounds` rounds in a row.
#[derive(Debug, Clone)]
pub struct CollaborationModel {
    pub config: ModelConfig,
    pub resources: ResourcePool,
    pub objectives: ObjectivePool,
    pub community: Community,
    initial_values: Vec<u32>,
    progress: Progress,
}

impl CollaborationModel {
    pub fn new<R: Rng + ?Sized>(config: ModelConfig, rng: &mut R) -> Result<Self, ConfigError> {
        config.validate()?;
        let resources = ResourcePool::build(
            config.num_resources,
            config.num_players,
            config.resource_ratio,
            config.shuffle,
            rng,
        );
        let objectives = ObjectivePool::build(
            &resources,
            config.num_players,
            config.objectives_per_player,
            config.objective_ratio,
            config.value_high,
            config.value_low,
        );
        let community = Community::allocate(
            &resources,
            &objectives,
            config.objectives_per_player,
            config.shuffle,
            rng,
        );
        let initial_values = community.player_values();
        Ok(Self {
            config,
            resources,
            objectives,
            community,
            initial_values,
            progress: Progress::default(),
        })
    }

    pub fn initial_values(&self) -> &[u32] {
        &self.initial_values
    }

    pub fn initial_total(&self) -> u32 {
        self.initial_values.iter().sum()
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// Random disjoint pairs covering every player, in random order.
    pub fn pairing<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<(PlayerId, PlayerId)> {
        let mut order: Vec<PlayerId> = self.community.players().iter().map(|p| p.id).collect();
        order.shuffle(rng);
        let mut pairs: Vec<(PlayerId, PlayerId)> = order.into_iter().tuples().collect();
        pairs.shuffle(rng);
        pairs
    }

    /// Negotiates every pair split across teams once. Returns the number of
    /// negotiations that changed something.
    pub fn play_round<R: Rng + ?Sized>(
        &mut self,
        protocol: &Protocol,
        rng: &mut R,
    ) -> Result<usize, NegotiationError> {
        let mut actions = 0;
        for (initiator, responder) in self.pairing(rng) {
            if self.community.same_team(initiator, responder)? {
                continue;
            }
            self.progress.encounters += 1;
            if protocol.negotiate(&mut self.community, initiator, responder, rng)? {
                actions += 1;
            }
        }
        self.progress.rounds += 1;
        self.progress.actions += actions;
        Ok(actions)
    }

    /// Runs to convergence (or the round cap) and summarizes the result.
    pub fn run<R: Rng + ?Sized>(
        &mut self,
        batch_id: Uuid,
        run_index: usize,
        rng: &mut R,
    ) -> Result<RunSummary, SimulationError> {
        let Some(protocol) = Protocol::for_variation(self.config.variation, self.config.motivation)
        else {
            self.progress.converged = true;
            return Ok(RunSummary::collect(batch_id, run_index, self));
        };

        while self.progress.stale_rounds < self.config.stale_rounds {
            if self.progress.rounds >= self.config.max_rounds {
                warn!(
                    run_index,
                    variation = %self.config.variation,
                    rounds = self.progress.rounds,
                    "round cap reached before convergence"
                );
                break;
            }
            let actions = self.play_round(&protocol, rng)?;
            if actions == 0 {
                self.progress.stale_rounds += 1;
            } else {
                self.progress.stale_rounds = 0;
            }
            debug!(run_index, round = self.progress.rounds, actions, "round complete");
        }
        self.progress.converged = self.progress.stale_rounds >= self.config.stale_rounds;

        info!(
            run_index,
            variation = %self.config.variation,
            motivation = %self.config.motivation,
            rounds = self.progress.rounds,
            actions = self.progress.actions,
            converged = self.progress.converged,
            "run finished"
        );
        Ok(RunSummary::collect(batch_id, run_index, self))
    }
}

/// A seeded batch of runs sharing one random stream, consumed run after run.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub id: Uuid,
    pub config: ModelConfig,
    rng: StdRng,
}

impl Simulation {
    pub fn new(config: ModelConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            rng: StdRng::seed_from_u64(config.seed),
            config,
        })
    }

    pub fn run(&mut self, run_index: usize) -> Result<RunSummary, SimulationError> {
        let mut model = CollaborationModel::new(self.config.clone(), &mut self.rng)?;
        model.run(self.id, run_index, &mut self.rng)
    }

    /// `runs` self-interested runs followed by `runs` community runs, all drawing
    /// on the one random stream. Community runs are numbered from `runs` upward
    /// whether or not the self-interested half was requested.
    pub fn run_motivations(
        &mut self,
        runs: usize,
        motivations: &[Motivation],
    ) -> Result<Vec<RunSummary>, SimulationError> {
        let mut summaries = Vec::with_capacity(runs * motivations.len());
        let order = [Motivation::SelfInterested, Motivation::Community];
        for (position, motivation) in order.into_iter().enumerate() {
            if !motivations.contains(&motivation) {
                continue;
            }
            self.config.motivation = motivation;
            for run_index in position * runs..(position + 1) * runs {
                summaries.push(self.run(run_index)?);
            }
        }
        Ok(summaries)
    }

    /// Like [`Simulation::run`] but hands back the finished model as well.
    pub fn run_model(
        &mut self,
        run_index: usize,
    ) -> Result<(CollaborationModel, RunSummary), SimulationError> {
        let mut model = CollaborationModel::new(self.config.clone(), &mut self.rng)?;
        let summary = model.run(self.id, run_index, &mut self.rng)?;
        Ok((model, summary))
    }
}
