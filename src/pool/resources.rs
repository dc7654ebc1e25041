use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::pool::sampler::distribute;
use crate::types::{FrequencyTier, Resource};

/// Resource letters split into a high- and low-frequency half, with the number of
/// players that will hold each letter.
///
/// For 16 players, 4 letters and a ratio of 3 the quantities come out as
/// `{A: 6, B: 6, C: 2, D: 2}` when `A` and `B` form the high half.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcePool {
    high: Vec<Resource>,
    low: Vec<Resource>,
    quantities: BTreeMap<Resource, usize>,
}

impl ResourcePool {
    /// Partitions `kinds` letters and distributes `players` holders across them.
    ///
    /// With `shuffle` off the partition is alphabetical (first half high).
    pub fn build<R: Rng + ?Sized>(
        kinds: usize,
        players: usize,
        ratio: usize,
        shuffle: bool,
        rng: &mut R,
    ) -> Self {
        let mut letters = Resource::alphabet(kinds);
        if shuffle {
            letters.shuffle(rng);
        }
        let low = letters.split_off(kinds / 2);
        let high = letters;
        let quantities = distribute(&low, &high, ratio, players);
        Self {
            high,
            low,
            quantities,
        }
    }

    pub fn high(&self) -> &[Resource] {
        &self.high
    }

    pub fn low(&self) -> &[Resource] {
        &self.low
    }

    pub fn quantities(&self) -> &BTreeMap<Resource, usize> {
        &self.quantities
    }

    pub fn quantity(&self, resource: Resource) -> usize {
        self.quantities.get(&resource).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.quantities.values().sum()
    }

    pub fn tier(&self, resource: Resource) -> Option<FrequencyTier> {
        if self.high.contains(&resource) {
            Some(FrequencyTier::High)
        } else if self.low.contains(&resource) {
            Some(FrequencyTier::Low)
        } else {
            None
        }
    }

    /// Every letter in the partition, alphabetically.
    pub fn kinds(&self) -> Vec<Resource> {
        let mut all: Vec<Resource> = self.high.iter().chain(&self.low).copied().collect();
        all.sort();
        all
    }

    /// One entry per holder: letters in sorted order, each repeated by its quantity.
    pub fn allocation(&self) -> impl Iterator<Item = Resource> + '_ {
        self.quantities
            .iter()
            .flat_map(|(resource, quantity)| std::iter::repeat(*resource).take(*quantity))
    }
}
