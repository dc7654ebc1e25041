use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// A productive capability, named by an upper-case letter (`A`, `B`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Resource(char);

impl Resource {
    pub const MAX_KINDS: usize = 26;

    /// The first `count` resource letters in alphabetical order.
    pub fn alphabet(count: usize) -> Vec<Resource> {
        ('A'..='Z').take(count).map(Resource).collect()
    }

    pub fn from_letter(letter: char) -> Option<Resource> {
        let upper = letter.to_ascii_uppercase();
        upper.is_ascii_uppercase().then_some(Resource(upper))
    }

    pub fn letter(self) -> char {
        self.0
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Subscript `1` objectives are worth `value_high`, subscript `2` ones `value_low`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueTier {
    High,
    Low,
}

impl ValueTier {
    pub const ALL: [ValueTier; 2] = [ValueTier::High, ValueTier::Low];

    pub const fn subscript(self) -> u8 {
        match self {
            ValueTier::High => 1,
            ValueTier::Low => 2,
        }
    }
}

/// Which half of the resource partition a category landed in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FrequencyTier {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectiveCategory {
    pub resource: Resource,
    pub tier: ValueTier,
}

impl ObjectiveCategory {
    pub const fn new(resource: Resource, tier: ValueTier) -> Self {
        Self { resource, tier }
    }

    /// Both value tiers for a resource letter, high first.
    pub fn pair_for(resource: Resource) -> [ObjectiveCategory; 2] {
        ValueTier::ALL.map(|tier| ObjectiveCategory::new(resource, tier))
    }
}

impl fmt::Display for ObjectiveCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            self.resource.letter().to_ascii_lowercase(),
            self.tier.subscript()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Objective {
    pub category: ObjectiveCategory,
    pub value: u32,
}

impl Objective {
    /// True when one of `resources` can fulfil this objective.
    pub fn is_fulfilled_by<'a>(&self, mut resources: impl Iterator<Item = &'a Resource>) -> bool {
        resources.any(|r| *r == self.category.resource)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub usize);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {:02}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(pub usize);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Team {:02}", self.0)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Variation {
    AllocationOnly,
    DropToJoin,
    PayToJoin,
    FreeMerge,
    CappedMerge,
    Trade,
}

impl Variation {
    pub const ALL: [Variation; 6] = [
        Variation::AllocationOnly,
        Variation::DropToJoin,
        Variation::PayToJoin,
        Variation::FreeMerge,
        Variation::CappedMerge,
        Variation::Trade,
    ];

    pub const fn number(self) -> u8 {
        match self {
            Variation::AllocationOnly => 0,
            Variation::DropToJoin => 1,
            Variation::PayToJoin => 2,
            Variation::FreeMerge => 3,
            Variation::CappedMerge => 4,
            Variation::Trade => 5,
        }
    }

    pub fn from_number(number: u8) -> Option<Variation> {
        Variation::ALL.into_iter().find(|v| v.number() == number)
    }

    pub const fn negotiates(self) -> bool {
        !matches!(self, Variation::AllocationOnly)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Motivation {
    #[default]
    SelfInterested,
    Community,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_names_use_lowercase_letter_and_subscript() {
        let a = Resource::from_letter('a').unwrap();
        assert_eq!(ObjectiveCategory::new(a, ValueTier::High).to_string(), "a1");
        assert_eq!(ObjectiveCategory::new(a, ValueTier::Low).to_string(), "a2");
    }

    #[test]
    fn categories_sort_by_letter_then_subscript() {
        let [a1, a2] = ObjectiveCategory::pair_for(Resource::from_letter('A').unwrap());
        let [b1, _] = ObjectiveCategory::pair_for(Resource::from_letter('B').unwrap());
        let mut cats = vec![b1, a2, a1];
        cats.sort();
        assert_eq!(cats, vec![a1, a2, b1]);
    }

    #[test]
    fn variation_numbers_round_trip() {
        for variation in Variation::ALL {
            assert_eq!(Variation::from_number(variation.number()), Some(variation));
        }
        assert_eq!(Variation::from_number(6), None);
    }

    #[test]
    fn alphabet_is_ordered() {
        let letters: String = Resource::alphabet(4).iter().map(|r| r.letter()).collect();
        assert_eq!(letters, "ABCD");
    }
}
