use std::collections::BTreeSet;

use crate::community::{Community, CommunityError, realized_value};
use crate::types::{Objective, PlayerId, Resource, TeamId, ValueTier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counterpart {
    Team(TeamId),
    Player(PlayerId),
}

/// Hypothetical situation to score a player under.
///
/// | fields set                          | resources in scope                      |
/// |-------------------------------------|-----------------------------------------|
/// | nothing                             | player's current team                   |
/// | `alone`                             | player's own resource                   |
/// | `counterpart: Team(t)`              | team `t` plus the player's own resource |
/// | `counterpart: Player(q)`            | player's current team plus `q`'s        |
/// | `counterpart: Player(q)`, `new_team`| the player's and `q`'s resources only   |
///
/// `objective_to_drop` leaves one held objective out; `given_objective` (with
/// `giver`) counts one of the giver's objectives as if it were already held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreQuery {
    pub alone: bool,
    pub counterpart: Option<Counterpart>,
    pub new_team: bool,
    pub objective_to_drop: Option<usize>,
    pub given_objective: Option<usize>,
    pub giver: Option<PlayerId>,
}

impl ScoreQuery {
    pub fn current() -> Self {
        Self::default()
    }

    pub fn alone() -> Self {
        Self {
            alone: true,
            ..Self::default()
        }
    }

    /// What if the player joined `team`.
    pub fn joining(team: TeamId) -> Self {
        Self {
            counterpart: Some(Counterpart::Team(team)),
            ..Self::default()
        }
    }

    /// What if `player` joined the scored player's team.
    pub fn recruiting(player: PlayerId) -> Self {
        Self {
            counterpart: Some(Counterpart::Player(player)),
            ..Self::default()
        }
    }

    /// What if the two players started a team of their own.
    pub fn new_team_with(player: PlayerId) -> Self {
        Self {
            counterpart: Some(Counterpart::Player(player)),
            new_team: true,
            ..Self::default()
        }
    }

    pub fn dropping(mut self, slot: usize) -> Self {
        self.objective_to_drop = Some(slot);
        self
    }

    pub fn receiving(mut self, slot: usize, giver: PlayerId) -> Self {
        self.given_objective = Some(slot);
        self.giver = Some(giver);
        self
    }

    pub fn validate(&self) -> Result<(), CommunityError> {
        if self.new_team {
            match self.counterpart {
                None => {
                    return Err(CommunityError::InvalidArgument(
                        "new_team requires a counterpart player",
                    ));
                }
                Some(Counterpart::Team(_)) => {
                    return Err(CommunityError::InvalidArgument(
                        "new_team cannot be combined with a team counterpart",
                    ));
                }
                Some(Counterpart::Player(_)) => {}
            }
        }
        if self.alone && self.counterpart.is_some() {
            return Err(CommunityError::InvalidArgument(
                "alone cannot be combined with a counterpart",
            ));
        }
        match (self.given_objective, self.giver) {
            (Some(_), None) => Err(CommunityError::InvalidArgument(
                "given_objective requires a giver",
            )),
            (None, Some(_)) => Err(CommunityError::InvalidArgument(
                "giver supplied without a given_objective",
            )),
            _ => Ok(()),
        }
    }
}

impl Community {
    /// Sum of the values of `player`'s objectives whose letter is reachable under `query`.
    ///
    /// Reads state only; drop and give modifiers never touch real holdings.
    pub fn current_total(&self, player: PlayerId, query: &ScoreQuery) -> Result<u32, CommunityError> {
        query.validate()?;
        let scored = self.player(player)?;
        let resources = self.resources_in_scope(player, query)?;

        if let Some(slot) = query.objective_to_drop {
            if !scored.holds(slot) {
                return Err(CommunityError::ObjectiveNotHeld { player, slot });
            }
        }
        let received: Option<Objective> = match (query.given_objective, query.giver) {
            (Some(slot), Some(giver)) => Some(
                *self
                    .player(giver)?
                    .objective(slot)
                    .ok_or(CommunityError::ObjectiveNotHeld {
                        player: giver,
                        slot,
                    })?,
            ),
            _ => None,
        };

        let kept = scored
            .objectives()
            .iter()
            .filter(|(slot, _)| Some(**slot) != query.objective_to_drop)
            .map(|(_, objective)| objective);
        Ok(realized_value(kept.chain(received.iter()), &resources))
    }

    /// Same as [`Community::current_total`] but as a signed change from the current value.
    pub fn delta(&self, player: PlayerId, query: &ScoreQuery) -> Result<i64, CommunityError> {
        let now = self.current_total(player, &ScoreQuery::current())?;
        let then = self.current_total(player, query)?;
        Ok(i64::from(then) - i64::from(now))
    }

    pub fn resources_in_scope(
        &self,
        player: PlayerId,
        query: &ScoreQuery,
    ) -> Result<BTreeSet<Resource>, CommunityError> {
        let scored = self.player(player)?;
        let mut resources = match (query.alone, query.counterpart, query.new_team) {
            (true, _, _) => BTreeSet::new(),
            (false, None, _) => self.team_resources(scored.team())?,
            (false, Some(Counterpart::Team(team)), _) => self.team_resources(team)?,
            (false, Some(Counterpart::Player(other)), false) => {
                let mut pooled = self.team_resources(scored.team())?;
                pooled.insert(self.player(other)?.resource());
                pooled
            }
            (false, Some(Counterpart::Player(other)), true) => {
                BTreeSet::from([self.player(other)?.resource()])
            }
        };
        resources.insert(scored.resource());
        Ok(resources)
    }

    /// Picks the held objective `player` would miss least if it had to go.
    ///
    /// Preference: outside `pool` and low value, outside and high, inside and low,
    /// inside and high. With a `target` resource, an objective outside `pool` on the
    /// target's letter (low before high) is preferred over all of those. Within a
    /// rank the lowest slot wins. `None` if nothing is held.
    pub fn objective_to_give_up(
        &self,
        player: PlayerId,
        pool: &BTreeSet<Resource>,
        target: Option<Resource>,
    ) -> Result<Option<usize>, CommunityError> {
        let held = self.player(player)?.objectives();
        let find = |matched: bool, tier: ValueTier, only: Option<Resource>| {
            held.iter()
                .find(|(_, objective)| {
                    let resource = objective.category.resource;
                    pool.contains(&resource) == matched
                        && objective.category.tier == tier
                        && only.is_none_or(|wanted| wanted == resource)
                })
                .map(|(slot, _)| *slot)
        };

        if let Some(target) = target {
            for tier in [ValueTier::Low, ValueTier::High] {
                if let Some(slot) = find(false, tier, Some(target)) {
                    return Ok(Some(slot));
                }
            }
        }
        let ranked = [
            (false, ValueTier::Low),
            (false, ValueTier::High),
            (true, ValueTier::Low),
            (true, ValueTier::High),
        ];
        Ok(ranked
            .into_iter()
            .find_map(|(matched, tier)| find(matched, tier, None)))
    }
}
