use crate::types::{Objective, ObjectiveCategory, Resource, ValueTier};

pub fn letter(c: char) -> Resource {
    Resource::from_letter(c).unwrap()
}

/// Objective on letter `c`, worth 20 when high and 10 when low.
pub fn obj(c: char, tier: ValueTier) -> Objective {
    let value = match tier {
        ValueTier::High => 20,
        ValueTier::Low => 10,
    };
    Objective {
        category: ObjectiveCategory::new(letter(c), tier),
        value,
    }
}
