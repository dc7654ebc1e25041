use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::pool::resources::ResourcePool;
use crate::pool::sampler::distribute;
use crate::types::{Objective, ObjectiveCategory, Resource, ValueTier};

/// The full set of objective instances handed out to players.
///
/// How common an objective is (prevalent or rare) is decided by cross-cutting the
/// resource partition, so it is independent of how common the matching resource is.
/// Its value depends only on the subscript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectivePool {
    prevalent: Vec<Resource>,
    rare: Vec<Resource>,
    quantities: BTreeMap<ObjectiveCategory, usize>,
    table: Vec<Objective>,
    value_high: u32,
    value_low: u32,
}

impl ObjectivePool {
    pub fn build(
        resources: &ResourcePool,
        players: usize,
        per_player: usize,
        ratio: usize,
        value_high: u32,
        value_low: u32,
    ) -> Self {
        let (high_head, high_tail) = resources.high().split_at(resources.high().len() / 2);
        let (low_head, low_tail) = resources.low().split_at(resources.low().len() / 2);

        let prevalent: Vec<Resource> = high_head.iter().chain(low_head).copied().collect();
        let rare: Vec<Resource> = high_tail.iter().chain(low_tail).copied().collect();

        let prevalent_categories = categories_for(&prevalent);
        let rare_categories = categories_for(&rare);
        let quantities = distribute(
            &rare_categories,
            &prevalent_categories,
            ratio,
            players * per_player,
        );

        let mut pool = Self {
            prevalent,
            rare,
            quantities,
            table: Vec::new(),
            value_high,
            value_low,
        };
        pool.table = pool
            .quantities
            .iter()
            .flat_map(|(category, quantity)| {
                let objective = Objective {
                    category: *category,
                    value: pool.value_of(category.tier),
                };
                std::iter::repeat(objective).take(*quantity)
            })
            .collect();
        pool
    }

    pub fn value_of(&self, tier: ValueTier) -> u32 {
        match tier {
            ValueTier::High => self.value_high,
            ValueTier::Low => self.value_low,
        }
    }

    /// Flat list of instances, grouped by category in sorted order.
    pub fn table(&self) -> &[Objective] {
        &self.table
    }

    pub fn quantities(&self) -> &BTreeMap<ObjectiveCategory, usize> {
        &self.quantities
    }

    pub fn quantity(&self, category: ObjectiveCategory) -> usize {
        self.quantities.get(&category).copied().unwrap_or(0)
    }

    pub fn prevalent(&self) -> &[Resource] {
        &self.prevalent
    }

    pub fn rare(&self) -> &[Resource] {
        &self.rare
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

fn categories_for(resources: &[Resource]) -> Vec<ObjectiveCategory> {
    resources
        .iter()
        .flat_map(|r| ObjectiveCategory::pair_for(*r))
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn letter(c: char) -> Resource {
        Resource::from_letter(c).unwrap()
    }

    #[test]
    fn documented_example_table() {
        let mut rng = StdRng::seed_from_u64(0);
        let resources = ResourcePool::build(4, 16, 3, false, &mut rng);
        let pool = ObjectivePool::build(&resources, 16, 5, 3, 20, 10);

        assert_eq!(pool.prevalent(), &[letter('A'), letter('C')]);
        assert_eq!(pool.rare(), &[letter('B'), letter('D')]);

        let quantities: Vec<(String, usize)> = pool
            .quantities()
            .iter()
            .map(|(c, q)| (c.to_string(), *q))
            .collect();
        let expected: Vec<(String, usize)> = [
            ("a1", 15),
            ("a2", 15),
            ("b1", 5),
            ("b2", 5),
            ("c1", 15),
            ("c2", 15),
            ("d1", 5),
            ("d2", 5),
        ]
        .into_iter()
        .map(|(c, q)| (c.to_string(), q))
        .collect();
        assert_eq!(quantities, expected);
        assert_eq!(pool.len(), 80);
    }

    #[test]
    fn values_follow_subscript_only() {
        let mut rng = StdRng::seed_from_u64(11);
        let resources = ResourcePool::build(6, 24, 2, true, &mut rng);
        let pool = ObjectivePool::build(&resources, 24, 4, 3, 20, 10);
        for objective in pool.table() {
            let expected = match objective.category.tier {
                ValueTier::High => 20,
                ValueTier::Low => 10,
            };
            assert_eq!(objective.value, expected);
            assert_eq!(
                objective.value == 20,
                objective.category.to_string().ends_with('1')
            );
        }
    }

    #[test]
    fn table_size_matches_players_times_objectives() {
        let mut rng = StdRng::seed_from_u64(5);
        for kinds in [2, 4, 8] {
            for (players, per_player) in [(2, 1), (16, 5), (30, 3)] {
                let resources = ResourcePool::build(kinds, players, 3, true, &mut rng);
                let pool = ObjectivePool::build(&resources, players, per_player, 2, 5, 1);
                assert_eq!(pool.len(), players * per_player);
                assert_eq!(pool.quantities().values().sum::<usize>(), players * per_player);
            }
        }
    }

    #[test]
    fn prevalent_and_rare_cover_every_letter_once() {
        let mut rng = StdRng::seed_from_u64(8);
        let resources = ResourcePool::build(8, 16, 3, true, &mut rng);
        let pool = ObjectivePool::build(&resources, 16, 5, 3, 20, 10);
        let mut all: Vec<Resource> = pool.prevalent().iter().chain(pool.rare()).copied().collect();
        all.sort();
        assert_eq!(all, resources.kinds());
        assert_eq!(pool.prevalent().len(), 4);
    }
}
