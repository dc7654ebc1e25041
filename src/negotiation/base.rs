use std::collections::BTreeSet;

use rand::Rng;

use crate::community::{Community, CommunityError};
use crate::types::{PlayerId, Resource, TeamId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NegotiationError {
    #[error("drop and give costs are mutually exclusive")]
    ConflictingCost,
    #[error("{0} cannot negotiate with themselves")]
    SamePlayer(PlayerId),
    #[error("{a} and {b} are already on the same team")]
    SameTeam { a: PlayerId, b: PlayerId },
    #[error(transparent)]
    Community(#[from] CommunityError),
}

/// One bilateral negotiation between an initiator and a responder on different teams.
/// Returns whether anything in the community changed.
pub trait Negotiator {
    fn negotiate<R: Rng + ?Sized>(
        &self,
        community: &mut Community,
        initiator: PlayerId,
        responder: PlayerId,
        rng: &mut R,
    ) -> Result<bool, NegotiationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Nothing,
    /// Initiator joins the responder's team.
    Move,
    /// Responder joins the initiator's team.
    Invite,
}

/// Score changes for both sides of a pair under the two possible merges.
///
/// `*_move` is the change when that side changes team; `*_stay` is the change when
/// the other side comes over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deltas {
    pub initiator_move: i64,
    pub initiator_stay: i64,
    pub responder_move: i64,
    pub responder_stay: i64,
}

impl Deltas {
    /// The responder's consent terms for a given decision.
    pub fn responder_consent(&self, decision: Decision) -> Consent {
        match decision {
            Decision::Move => Consent::Required {
                preferred: self.responder_stay,
                alternative: self.responder_move,
            },
            Decision::Invite => Consent::Required {
                preferred: self.responder_move,
                alternative: self.responder_stay,
            },
            Decision::Nothing => Consent::Refused,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consent {
    /// Community-motivated players never refuse a merge that helps the whole.
    Implied,
    Required { preferred: i64, alternative: i64 },
    Refused,
}

impl Consent {
    pub fn granted(self) -> bool {
        match self {
            Consent::Implied => true,
            Consent::Required {
                preferred,
                alternative,
            } => preferred >= 0 && preferred >= alternative,
            Consent::Refused => false,
        }
    }
}

/// What the side changing teams pays on the way over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeTerms {
    pub drop_objective: Option<usize>,
    pub give_objective: Option<usize>,
}

impl MergeTerms {
    pub const FREE: MergeTerms = MergeTerms {
        drop_objective: None,
        give_objective: None,
    };

    pub fn dropping(slot: usize) -> Self {
        Self {
            drop_objective: Some(slot),
            give_objective: None,
        }
    }

    pub fn giving(slot: usize) -> Self {
        Self {
            drop_objective: None,
            give_objective: Some(slot),
        }
    }
}

/// Initiator's preference between moving and inviting, falling back on the
/// responder's preference and finally a coin flip when both are indifferent.
pub fn decide_self_interested<R: Rng + ?Sized>(deltas: &Deltas, rng: &mut R) -> Decision {
    let (moving, staying) = (deltas.initiator_move, deltas.initiator_stay);
    if moving <= 0 && staying <= 0 {
        return Decision::Nothing;
    }
    if moving >= 0 && moving > staying {
        return Decision::Move;
    }
    if staying >= 0 && staying > moving {
        return Decision::Invite;
    }

    let (their_move, their_stay) = (deltas.responder_move, deltas.responder_stay);
    if their_move > their_stay {
        Decision::Invite
    } else if their_stay > their_move {
        Decision::Move
    } else if their_move > 0 {
        coin_flip(rng)
    } else {
        Decision::Nothing
    }
}

/// Picks the merge direction with the larger positive community-wide change.
pub fn decide_community<R: Rng + ?Sized>(move_total: i64, invite_total: i64, rng: &mut R) -> Decision {
    if move_total <= 0 && invite_total <= 0 {
        Decision::Nothing
    } else if move_total > invite_total {
        Decision::Move
    } else if invite_total > move_total {
        Decision::Invite
    } else {
        coin_flip(rng)
    }
}

fn coin_flip<R: Rng + ?Sized>(rng: &mut R) -> Decision {
    if rng.gen_bool(0.5) {
        Decision::Move
    } else {
        Decision::Invite
    }
}

/// Moves `mover` onto `host`'s team once consent is granted, paying `terms` first.
pub fn move_to(
    community: &mut Community,
    mover: PlayerId,
    host: PlayerId,
    terms: MergeTerms,
    consent: Consent,
) -> Result<bool, NegotiationError> {
    if terms.drop_objective.is_some() && terms.give_objective.is_some() {
        return Err(NegotiationError::ConflictingCost);
    }
    if mover == host {
        return Err(NegotiationError::SamePlayer(mover));
    }
    if community.same_team(mover, host)? {
        return Err(NegotiationError::SameTeam { a: mover, b: host });
    }
    if !consent.granted() {
        return Ok(false);
    }

    if let Some(slot) = terms.drop_objective {
        community.drop_objective(mover, slot)?;
    }
    if let Some(slot) = terms.give_objective {
        community.transfer_objective(mover, host, slot)?;
    }
    let team = community.player(host)?.team();
    community.join_team(mover, team)?;
    Ok(true)
}

/// `host` brings `invitee` onto their team; the invitee pays `terms`.
pub fn invite(
    community: &mut Community,
    host: PlayerId,
    invitee: PlayerId,
    terms: MergeTerms,
    consent: Consent,
) -> Result<bool, NegotiationError> {
    move_to(community, invitee, host, terms, consent)
}

/// Summed change for everyone on `team` other than `excluded`, if the team's
/// reachable resources became `resources`.
pub fn teammates_delta(
    community: &Community,
    team: TeamId,
    excluded: &[PlayerId],
    resources: &BTreeSet<Resource>,
) -> Result<i64, NegotiationError> {
    let mut total = 0;
    for member in community.team(team)?.members() {
        if excluded.contains(member) {
            continue;
        }
        let player = community.player(*member)?;
        total += i64::from(player.value_with(resources)) - i64::from(community.value_of(player));
    }
    Ok(total)
}

/// Resources of `team` after `leaving` walks out.
pub fn resources_without(
    community: &Community,
    team: TeamId,
    leaving: PlayerId,
) -> Result<BTreeSet<Resource>, NegotiationError> {
    let remaining = community
        .team(team)?
        .members()
        .iter()
        .copied()
        .filter(|member| *member != leaving);
    Ok(community.resources_of(remaining))
}

pub(crate) fn ensure_pair(
    community: &Community,
    initiator: PlayerId,
    responder: PlayerId,
) -> Result<(), NegotiationError> {
    if initiator == responder {
        return Err(NegotiationError::SamePlayer(initiator));
    }
    if community.same_team(initiator, responder)? {
        return Err(NegotiationError::SameTeam {
            a: initiator,
            b: responder,
        });
    }
    Ok(())
}
