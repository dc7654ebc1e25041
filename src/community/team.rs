use serde::{Deserialize, Serialize};

use crate::types::{PlayerId, TeamId};

/// Membership list for a team. Empty teams are kept around, never removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    members: Vec<PlayerId>,
}

impl Team {
    pub fn new(id: TeamId) -> Self {
        Self {
            id,
            members: Vec::new(),
        }
    }

    pub fn singleton(id: TeamId, player: PlayerId) -> Self {
        Self {
            id,
            members: vec![player],
        }
    }

    pub fn members(&self) -> &[PlayerId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.members.contains(&player)
    }

    pub(crate) fn add(&mut self, player: PlayerId) {
        if !self.contains(player) {
            self.members.push(player);
        }
    }

    pub(crate) fn remove(&mut self, player: PlayerId) {
        self.members.retain(|member| *member != player);
    }
}
