use rand::Rng;
use tracing::debug;

use crate::community::{Community, ScoreQuery};
use crate::negotiation::base::{
    Consent, Decision, Deltas, MergeTerms, NegotiationError, decide_community,
    decide_self_interested, ensure_pair, invite, move_to, resources_without, teammates_delta,
};
use crate::types::{Motivation, PlayerId};

/// Price of changing teams in the merge-style protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeCost {
    Free,
    /// The mover discards one objective.
    Drop,
    /// The mover hands one objective to the player whose team it joins.
    Pay,
}

/// Everything needed to decide and carry out one of the two merges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergePlan {
    /// Deltas of a direction whose terms are `None` are all zero.
    pub deltas: Deltas,
    /// `None` when the mover owes a cost but holds nothing to pay it with.
    pub move_terms: Option<MergeTerms>,
    pub invite_terms: Option<MergeTerms>,
}

/// Terms and score changes for `mover` joining `host`'s team.
struct Direction {
    terms: Option<MergeTerms>,
    mover_delta: i64,
    host_delta: i64,
}

impl Direction {
    const UNAVAILABLE: Direction = Direction {
        terms: None,
        mover_delta: 0,
        host_delta: 0,
    };
}

fn direction(
    community: &Community,
    mover: PlayerId,
    host: PlayerId,
    cost: MergeCost,
) -> Result<Direction, NegotiationError> {
    let host_team = community.player(host)?.team();
    let host_resource = community.player(host)?.resource();
    let mut pool = community.team_resources(host_team)?;
    pool.insert(community.player(mover)?.resource());

    let joining = ScoreQuery::joining(host_team);
    let recruiting = ScoreQuery::recruiting(mover);
    let slot = match cost {
        MergeCost::Free => None,
        MergeCost::Drop => community.objective_to_give_up(mover, &pool, None)?,
        MergeCost::Pay => community.objective_to_give_up(mover, &pool, Some(host_resource))?,
    };

    let (terms, mover_query, host_query) = match (cost, slot) {
        (MergeCost::Free, _) => (MergeTerms::FREE, joining, recruiting),
        (MergeCost::Drop, Some(slot)) => (MergeTerms::dropping(slot), joining.dropping(slot), recruiting),
        (MergeCost::Pay, Some(slot)) => (
            MergeTerms::giving(slot),
            joining.dropping(slot),
            recruiting.receiving(slot, mover),
        ),
        // Nothing to pay with: this merge is off the table and promises no change.
        (_, None) => return Ok(Direction::UNAVAILABLE),
    };

    Ok(Direction {
        terms: Some(terms),
        mover_delta: community.delta(mover, &mover_query)?,
        host_delta: community.delta(host, &host_query)?,
    })
}

pub fn plan(
    community: &Community,
    initiator: PlayerId,
    responder: PlayerId,
    cost: MergeCost,
) -> Result<MergePlan, NegotiationError> {
    let moving = direction(community, initiator, responder, cost)?;
    let inviting = direction(community, responder, initiator, cost)?;
    Ok(MergePlan {
        deltas: Deltas {
            initiator_move: moving.mover_delta,
            initiator_stay: inviting.host_delta,
            responder_move: inviting.mover_delta,
            responder_stay: moving.host_delta,
        },
        move_terms: moving.terms,
        invite_terms: inviting.terms,
    })
}

/// Change in total community value if `mover` joins `host`'s team, counting
/// the teammates both leave behind and gain.
pub fn community_delta(
    community: &Community,
    mover: PlayerId,
    host: PlayerId,
    mover_delta: i64,
    host_delta: i64,
) -> Result<i64, NegotiationError> {
    let mover_team = community.player(mover)?.team();
    let host_team = community.player(host)?.team();

    let left_behind = resources_without(community, mover_team, mover)?;
    let mut enlarged = community.team_resources(host_team)?;
    enlarged.insert(community.player(mover)?.resource());

    let old_mates = teammates_delta(community, mover_team, &[mover], &left_behind)?;
    let new_mates = teammates_delta(community, host_team, &[host], &enlarged)?;
    Ok(mover_delta + host_delta + old_mates + new_mates)
}

/// Shared decision procedure for the drop, pay and free merge protocols.
pub fn negotiate_merge<R: Rng + ?Sized>(
    community: &mut Community,
    initiator: PlayerId,
    responder: PlayerId,
    cost: MergeCost,
    motivation: Motivation,
    rng: &mut R,
) -> Result<bool, NegotiationError> {
    ensure_pair(community, initiator, responder)?;
    let plan = plan(community, initiator, responder, cost)?;
    let deltas = plan.deltas;

    let (decision, consent) = match motivation {
        Motivation::SelfInterested => {
            let decision = decide_self_interested(&deltas, rng);
            (decision, deltas.responder_consent(decision))
        }
        Motivation::Community => {
            let move_total = match plan.move_terms {
                Some(_) => community_delta(
                    community,
                    initiator,
                    responder,
                    deltas.initiator_move,
                    deltas.responder_stay,
                )?,
                None => 0,
            };
            let invite_total = match plan.invite_terms {
                Some(_) => community_delta(
                    community,
                    responder,
                    initiator,
                    deltas.responder_move,
                    deltas.initiator_stay,
                )?,
                None => 0,
            };
            (decide_community(move_total, invite_total, rng), Consent::Implied)
        }
    };

    let changed = match (decision, plan.move_terms, plan.invite_terms) {
        (Decision::Move, Some(terms), _) => move_to(community, initiator, responder, terms, consent)?,
        (Decision::Invite, _, Some(terms)) => invite(community, initiator, responder, terms, consent)?,
        _ => false,
    };
    if changed {
        debug!(
            ?cost,
            ?motivation,
            ?decision,
            initiator = initiator.0,
            responder = responder.0,
            "teams merged"
        );
    }
    Ok(changed)
}
