use std::collections::BTreeMap;
use std::hash::Hash;
use std::iter;

use itertools::Itertools;

/// Weighted round-robin tally.
///
/// Walks the repeating sequence "every `low` category once, then the whole `high`
/// list `ratio` times" for `target` draws and counts how often each category came up.
/// High-priority categories therefore end up roughly `ratio` times as common as
/// low-priority ones; small targets are skewed by where the last cycle gets cut.
///
/// Categories that are never drawn are absent from the result.
pub fn distribute<T>(low: &[T], high: &[T], ratio: usize, target: usize) -> BTreeMap<T, usize>
where
    T: Ord + Hash + Clone,
{
    let cycle: Vec<&T> = low
        .iter()
        .chain(iter::repeat(high).take(ratio).flatten())
        .collect();

    cycle
        .iter()
        .cycle()
        .take(target)
        .map(|category| (*category).clone())
        .counts()
        .into_iter()
        .collect()
}
