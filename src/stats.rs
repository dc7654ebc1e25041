use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sim::model::CollaborationModel;
use crate::types::{FrequencyTier, Motivation, ObjectiveCategory, Resource, Variation};

/// Stand-in denominator for ratios over empty counts, so runs without any
/// encounters (or objectives) still produce finite ratios.
pub const EMPTY_DENOMINATOR: f64 = 1e-9;

pub fn ratio(numerator: usize, denominator: usize) -> f64 {
    let denominator = if denominator == 0 {
        EMPTY_DENOMINATOR
    } else {
        denominator as f64
    };
    numerator as f64 / denominator
}

fn median(sorted: &[f64]) -> f64 {
    match sorted.len() {
        0 => 0.0,
        n if n % 2 == 1 => sorted[n / 2],
        n => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueStats {
    pub total: u64,
    pub min: u32,
    pub max: u32,
    pub mean: f64,
    pub median: f64,
}

impl ValueStats {
    pub fn from_values(values: &[u32]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let sorted: Vec<f64> = values.iter().sorted().map(|v| f64::from(*v)).collect();
        let total: u64 = values.iter().map(|v| u64::from(*v)).sum();
        Self {
            total,
            min: values.iter().copied().min().unwrap_or(0),
            max: values.iter().copied().max().unwrap_or(0),
            mean: total as f64 / values.len() as f64,
            median: median(&sorted),
        }
    }
}

/// Sizes of the teams that still have members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub count: usize,
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    pub median: f64,
}

impl TeamStats {
    pub fn from_sizes(sizes: &[usize]) -> Self {
        if sizes.is_empty() {
            return Self::default();
        }
        let sorted: Vec<f64> = sizes.iter().sorted().map(|s| *s as f64).collect();
        Self {
            count: sizes.len(),
            min: sizes.iter().copied().min().unwrap_or(0),
            max: sizes.iter().copied().max().unwrap_or(0),
            mean: sizes.iter().sum::<usize>() as f64 / sizes.len() as f64,
            median: median(&sorted),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub category: String,
    pub value: u32,
    pub initial: usize,
    pub fulfilled: usize,
    pub unfulfilled: usize,
    pub dropped: usize,
    pub traded: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceReport {
    pub resource: Resource,
    pub tier: FrequencyTier,
    pub quantity: usize,
}

/// Flat per-run record handed to whatever writes results out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub batch_id: Uuid,
    pub run_index: usize,
    pub variation: Variation,
    pub motivation: Motivation,
    pub num_players: usize,
    pub rounds: usize,
    pub converged: bool,
    pub encounters: usize,
    pub actions: usize,
    pub switch_ratio: f64,
    pub value_before: ValueStats,
    pub value_after: ValueStats,
    pub teams: TeamStats,
    pub objectives_initial: usize,
    pub objectives_remaining: usize,
    pub dropped: usize,
    pub traded: usize,
    pub fulfilled: usize,
    pub unfulfilled: usize,
    pub fulfillment_ratio: f64,
    pub categories: Vec<CategoryReport>,
    pub resources: Vec<ResourceReport>,
}

impl RunSummary {
    pub fn collect(batch_id: Uuid, run_index: usize, model: &CollaborationModel) -> Self {
        let community = &model.community;
        let ledger = community.ledger();
        let fulfillment = community.fulfillment();
        let progress = model.progress();

        let categories = model
            .objectives
            .quantities()
            .iter()
            .map(|(category, initial)| {
                let tally = fulfillment.get(category).copied().unwrap_or_default();
                CategoryReport {
                    category: category.to_string(),
                    value: model.objectives.value_of(category.tier),
                    initial: *initial,
                    fulfilled: tally.fulfilled,
                    unfulfilled: tally.unfulfilled,
                    dropped: count(&ledger.dropped, category),
                    traded: count(&ledger.traded, category),
                }
            })
            .collect();

        let resources = model
            .resources
            .kinds()
            .into_iter()
            .filter_map(|resource| {
                model.resources.tier(resource).map(|tier| ResourceReport {
                    resource,
                    tier,
                    quantity: model.resources.quantity(resource),
                })
            })
            .collect();

        let fulfilled: usize = fulfillment.values().map(|f| f.fulfilled).sum();
        let unfulfilled: usize = fulfillment.values().map(|f| f.unfulfilled).sum();

        Self {
            batch_id,
            run_index,
            variation: model.config.variation,
            motivation: model.config.motivation,
            num_players: community.players().len(),
            rounds: progress.rounds,
            converged: progress.converged,
            encounters: progress.encounters,
            actions: progress.actions,
            switch_ratio: ratio(progress.actions, progress.encounters),
            value_before: ValueStats::from_values(model.initial_values()),
            value_after: ValueStats::from_values(&community.player_values()),
            teams: TeamStats::from_sizes(&community.active_team_sizes()),
            objectives_initial: model.objectives.len(),
            objectives_remaining: community.objective_count(),
            dropped: ledger.dropped_total(),
            traded: ledger.traded_total(),
            fulfilled,
            unfulfilled,
            fulfillment_ratio: ratio(fulfilled, fulfilled + unfulfilled),
            categories,
            resources,
        }
    }
}

fn count(tally: &BTreeMap<ObjectiveCategory, usize>, category: &ObjectiveCategory) -> usize {
    tally.get(category).copied().unwrap_or(0)
}

/// Running totals over many runs of one variation/motivation pair.
#[derive(Debug, Clone, Default)]
pub struct GroupStats {
    pub runs: u32,
    pub converged: u32,
    pub total_before: u64,
    pub total_after: u64,
    pub total_rounds: u64,
    pub total_actions: u64,
    pub total_dropped: u64,
    pub total_traded: u64,
    pub total_teams: u64,
}

impl GroupStats {
    fn mean(&self, sum: u64) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        sum as f64 / f64::from(self.runs)
    }

    pub fn avg_before(&self) -> f64 {
        self.mean(self.total_before)
    }

    pub fn avg_after(&self) -> f64 {
        self.mean(self.total_after)
    }

    pub fn avg_rounds(&self) -> f64 {
        self.mean(self.total_rounds)
    }

    pub fn avg_actions(&self) -> f64 {
        self.mean(self.total_actions)
    }

    pub fn avg_teams(&self) -> f64 {
        self.mean(self.total_teams)
    }

    pub fn avg_dropped(&self) -> f64 {
        self.mean(self.total_dropped)
    }

    pub fn avg_traded(&self) -> f64 {
        self.mean(self.total_traded)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    pub groups: BTreeMap<(Variation, Motivation), GroupStats>,
}

impl BatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, summary: &RunSummary) {
        let group = self
            .groups
            .entry((summary.variation, summary.motivation))
            .or_default();
        group.runs += 1;
        group.converged += u32::from(summary.converged);
        group.total_before += summary.value_before.total;
        group.total_after += summary.value_after.total;
        group.total_rounds += summary.rounds as u64;
        group.total_actions += summary.actions as u64;
        group.total_dropped += summary.dropped as u64;
        group.total_traded += summary.traded as u64;
        group.total_teams += summary.teams.count as u64;
    }

    pub fn merge(&mut self, other: BatchStats) {
        for (key, theirs) in other.groups {
            let ours = self.groups.entry(key).or_default();
            ours.runs += theirs.runs;
            ours.converged += theirs.converged;
            ours.total_before += theirs.total_before;
            ours.total_after += theirs.total_after;
            ours.total_rounds += theirs.total_rounds;
            ours.total_actions += theirs.total_actions;
            ours.total_dropped += theirs.total_dropped;
            ours.total_traded += theirs.total_traded;
            ours.total_teams += theirs.total_teams;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{ModelConfig, Simulation};

    #[test]
    fn ratio_guards_zero_denominator() {
        assert_eq!(ratio(0, 0), 0.0);
        assert!(ratio(3, 0).is_finite());
        assert_eq!(ratio(1, 4), 0.25);
    }

    #[test]
    fn value_stats_median_even_and_odd() {
        let odd = ValueStats::from_values(&[30, 10, 20]);
        assert_eq!((odd.min, odd.max, odd.total), (10, 30, 60));
        assert_eq!(odd.median, 20.0);
        assert_eq!(odd.mean, 20.0);

        let even = ValueStats::from_values(&[40, 10, 20, 30]);
        assert_eq!(even.median, 25.0);
        assert_eq!(ValueStats::from_values(&[]), ValueStats::default());
    }

    #[test]
    fn team_stats_over_sizes() {
        let stats = TeamStats::from_sizes(&[1, 3, 2, 2]);
        assert_eq!(stats.count, 4);
        assert_eq!((stats.min, stats.max), (1, 3));
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.median, 2.0);
    }

    #[test]
    fn merged_batches_match_one_accumulator() {
        let mut summaries = Simulation::new(ModelConfig::default().with_variation(Variation::FreeMerge))
            .unwrap()
            .run_motivations(2, &[Motivation::SelfInterested, Motivation::Community])
            .unwrap();
        summaries.extend(
            Simulation::new(ModelConfig::default())
                .unwrap()
                .run_motivations(1, &[Motivation::SelfInterested])
                .unwrap(),
        );

        let mut whole = BatchStats::new();
        for summary in &summaries {
            whole.record(summary);
        }
        let (left, right) = summaries.split_at(3);
        let mut first = BatchStats::new();
        let mut second = BatchStats::new();
        left.iter().for_each(|s| first.record(s));
        right.iter().for_each(|s| second.record(s));
        first.merge(second);

        assert_eq!(first.groups.len(), 3);
        for (key, group) in &whole.groups {
            let merged = &first.groups[key];
            assert_eq!(merged.runs, group.runs);
            assert_eq!(merged.total_after, group.total_after);
            assert_eq!(merged.total_actions, group.total_actions);
            assert_eq!(merged.converged, group.converged);
        }
        let free_community = &first.groups[&(Variation::FreeMerge, Motivation::Community)];
        assert_eq!(free_community.runs, 2);
    }
}
