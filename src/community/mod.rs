pub mod player;
pub mod score;
pub mod team;

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::pool::{ObjectivePool, ResourcePool};
use crate::types::{Objective, ObjectiveCategory, PlayerId, Resource, TeamId};

pub use player::{Player, realized_value};
pub use score::{Counterpart, ScoreQuery};
pub use team::Team;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommunityError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("unknown player {0:?}")]
    UnknownPlayer(PlayerId),
    #[error("unknown team {0:?}")]
    UnknownTeam(TeamId),
    #[error("{player} does not hold objective slot {slot}")]
    ObjectiveNotHeld { player: PlayerId, slot: usize },
}

/// Per-category tallies of objectives removed from play or moved between players.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectiveLedger {
    pub dropped: BTreeMap<ObjectiveCategory, usize>,
    pub traded: BTreeMap<ObjectiveCategory, usize>,
}

impl ObjectiveLedger {
    pub fn dropped_total(&self) -> usize {
        self.dropped.values().sum()
    }

    pub fn traded_total(&self) -> usize {
        self.traded.values().sum()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fulfillment {
    pub fulfilled: usize,
    pub unfulfilled: usize,
}

/// Every player and team in one run.
///
/// Teams own their membership lists; players only remember the id of the team
/// they are on, and both sides are updated together by [`Community::join_team`].
#[derive(Debug, Clone)]
pub struct Community {
    players: Vec<Player>,
    teams: Vec<Team>,
    ledger: ObjectiveLedger,
}

impl Community {
    /// Deals one resource and `per_player` objectives to each player slot and puts
    /// every player on a team of their own.
    pub fn allocate<R: Rng + ?Sized>(
        resources: &ResourcePool,
        objectives: &ObjectivePool,
        per_player: usize,
        shuffle: bool,
        rng: &mut R,
    ) -> Self {
        let num_players = resources.total();
        let mut slots: Vec<usize> = (0..num_players).collect();
        let mut order: Vec<usize> = (0..objectives.len()).collect();
        if shuffle {
            slots.shuffle(rng);
            order.shuffle(rng);
        }

        let table = objectives.table();
        let mut dealt: Vec<(usize, Resource, BTreeMap<usize, Objective>)> = slots
            .iter()
            .zip(resources.allocation())
            .zip(order.chunks(per_player.max(1)))
            .map(|((slot, resource), chunk)| {
                let held = chunk
                    .iter()
                    .filter_map(|idx| table.get(*idx).map(|objective| (*idx, *objective)))
                    .collect();
                (*slot, resource, held)
            })
            .collect();
        dealt.sort_by_key(|(slot, _, _)| *slot);

        Self::from_dealt(dealt)
    }

    /// Builds a community from explicit holdings, one singleton team per entry.
    /// Objective slots are numbered in the order they appear.
    pub fn from_holdings(holdings: Vec<(Resource, Vec<Objective>)>) -> Self {
        let mut next_slot = 0;
        let dealt = holdings
            .into_iter()
            .enumerate()
            .map(|(idx, (resource, objectives))| {
                let held = objectives
                    .into_iter()
                    .map(|objective| {
                        let slot = next_slot;
                        next_slot += 1;
                        (slot, objective)
                    })
                    .collect();
                (idx, resource, held)
            })
            .collect();
        Self::from_dealt(dealt)
    }

    fn from_dealt(dealt: Vec<(usize, Resource, BTreeMap<usize, Objective>)>) -> Self {
        let mut players = Vec::with_capacity(dealt.len());
        let mut teams = Vec::with_capacity(dealt.len());
        for (idx, (_, resource, held)) in dealt.into_iter().enumerate() {
            let id = PlayerId(idx);
            let team = TeamId(idx);
            players.push(Player::new(id, resource, held, team));
            teams.push(Team::singleton(team, id));
        }
        Self {
            players,
            teams,
            ledger: ObjectiveLedger::default(),
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn ledger(&self) -> &ObjectiveLedger {
        &self.ledger
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, CommunityError> {
        self.players.get(id.0).ok_or(CommunityError::UnknownPlayer(id))
    }

    pub fn team(&self, id: TeamId) -> Result<&Team, CommunityError> {
        self.teams.get(id.0).ok_or(CommunityError::UnknownTeam(id))
    }

    pub fn team_of(&self, player: PlayerId) -> Result<&Team, CommunityError> {
        self.team(self.player(player)?.team())
    }

    pub fn same_team(&self, a: PlayerId, b: PlayerId) -> Result<bool, CommunityError> {
        Ok(self.player(a)?.team() == self.player(b)?.team())
    }

    /// De-duplicated union of the members' own resources.
    pub fn team_resources(&self, team: TeamId) -> Result<BTreeSet<Resource>, CommunityError> {
        Ok(self.resources_of(self.team(team)?.members().iter().copied()))
    }

    pub(crate) fn resources_of(
        &self,
        members: impl IntoIterator<Item = PlayerId>,
    ) -> BTreeSet<Resource> {
        members
            .into_iter()
            .filter_map(|id| self.players.get(id.0))
            .map(Player::resource)
            .collect()
    }

    /// Moves `player` onto `team`. Their previous team keeps existing even if it
    /// ends up empty.
    pub fn join_team(&mut self, player: PlayerId, team: TeamId) -> Result<(), CommunityError> {
        let previous = self.player(player)?.team();
        self.team(team)?;
        if previous == team {
            return Ok(());
        }
        if let Some(old) = self.teams.get_mut(previous.0) {
            old.remove(player);
        }
        if let Some(new) = self.teams.get_mut(team.0) {
            new.add(player);
        }
        if let Some(p) = self.players.get_mut(player.0) {
            p.set_team(team);
        }
        Ok(())
    }

    /// Opens a fresh team (next index after the highest in use) and moves both players onto it.
    pub fn form_team(&mut self, a: PlayerId, b: PlayerId) -> Result<TeamId, CommunityError> {
        self.player(a)?;
        self.player(b)?;
        let id = TeamId(self.next_team_index());
        self.teams.push(Team::new(id));
        self.join_team(a, id)?;
        self.join_team(b, id)?;
        Ok(id)
    }

    fn next_team_index(&self) -> usize {
        self.teams.iter().map(|t| t.id.0 + 1).max().unwrap_or(0)
    }

    /// Removes an objective from the game entirely.
    pub fn drop_objective(
        &mut self,
        player: PlayerId,
        slot: usize,
    ) -> Result<Objective, CommunityError> {
        let objective = self
            .players
            .get_mut(player.0)
            .ok_or(CommunityError::UnknownPlayer(player))?
            .take_objective(slot)
            .ok_or(CommunityError::ObjectiveNotHeld { player, slot })?;
        *self.ledger.dropped.entry(objective.category).or_insert(0) += 1;
        Ok(objective)
    }

    pub fn transfer_objective(
        &mut self,
        from: PlayerId,
        to: PlayerId,
        slot: usize,
    ) -> Result<Objective, CommunityError> {
        self.player(to)?;
        let objective = self
            .players
            .get_mut(from.0)
            .ok_or(CommunityError::UnknownPlayer(from))?
            .take_objective(slot)
            .ok_or(CommunityError::ObjectiveNotHeld { player: from, slot })?;
        if let Some(receiver) = self.players.get_mut(to.0) {
            receiver.receive_objective(slot, objective);
        }
        *self.ledger.traded.entry(objective.category).or_insert(0) += 1;
        Ok(objective)
    }

    /// Value a player realizes on their current team.
    pub fn value_of(&self, player: &Player) -> u32 {
        let resources = self
            .teams
            .get(player.team().0)
            .map(|team| self.resources_of(team.members().iter().copied()))
            .unwrap_or_default();
        player.value_with(&resources)
    }

    pub fn player_values(&self) -> Vec<u32> {
        self.players.iter().map(|p| self.value_of(p)).collect()
    }

    pub fn total_value(&self) -> u32 {
        self.player_values().iter().sum()
    }

    pub fn objective_count(&self) -> usize {
        self.players.iter().map(|p| p.objectives().len()).sum()
    }

    /// Sizes of the teams that still have members.
    pub fn active_team_sizes(&self) -> Vec<usize> {
        self.teams
            .iter()
            .filter(|team| !team.is_empty())
            .map(Team::len)
            .collect()
    }

    /// How many held objectives of each category their holder's team can fulfil.
    pub fn fulfillment(&self) -> BTreeMap<ObjectiveCategory, Fulfillment> {
        let mut tally: BTreeMap<ObjectiveCategory, Fulfillment> = BTreeMap::new();
        for team in &self.teams {
            let resources = self.resources_of(team.members().iter().copied());
            for player in team.members().iter().filter_map(|id| self.players.get(id.0)) {
                for objective in player.objectives().values() {
                    let entry = tally.entry(objective.category).or_default();
                    if objective.is_fulfilled_by(resources.iter()) {
                        entry.fulfilled += 1;
                    } else {
                        entry.unfulfilled += 1;
                    }
                }
            }
        }
        tally
    }
}
