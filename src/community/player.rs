use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::{Objective, PlayerId, Resource, TeamId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    resource: Resource,
    /// Keyed by the objective's slot in the pool table, so iteration order is stable.
    objectives: BTreeMap<usize, Objective>,
    team: TeamId,
}

impl Player {
    pub fn new(
        id: PlayerId,
        resource: Resource,
        objectives: BTreeMap<usize, Objective>,
        team: TeamId,
    ) -> Self {
        Self {
            id,
            name: id.to_string(),
            resource,
            objectives,
            team,
        }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn team(&self) -> TeamId {
        self.team
    }

    pub fn objectives(&self) -> &BTreeMap<usize, Objective> {
        &self.objectives
    }

    pub fn objective(&self, slot: usize) -> Option<&Objective> {
        self.objectives.get(&slot)
    }

    pub fn holds(&self, slot: usize) -> bool {
        self.objectives.contains_key(&slot)
    }

    /// Value realized if exactly `resources` were reachable.
    pub fn value_with(&self, resources: &BTreeSet<Resource>) -> u32 {
        realized_value(self.objectives.values(), resources)
    }

    pub(crate) fn set_team(&mut self, team: TeamId) {
        self.team = team;
    }

    pub(crate) fn take_objective(&mut self, slot: usize) -> Option<Objective> {
        self.objectives.remove(&slot)
    }

    pub(crate) fn receive_objective(&mut self, slot: usize, objective: Objective) {
        self.objectives.insert(slot, objective);
    }
}

pub fn realized_value<'a>(
    objectives: impl Iterator<Item = &'a Objective>,
    resources: &BTreeSet<Resource>,
) -> u32 {
    objectives
        .filter(|objective| resources.contains(&objective.category.resource))
        .map(|objective| objective.value)
        .sum()
}
