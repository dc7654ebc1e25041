use std::collections::BTreeSet;

use rand::Rng;
use tracing::debug;

use crate::community::{Community, ScoreQuery};
use crate::negotiation::base::{NegotiationError, Negotiator, ensure_pair, resources_without, teammates_delta};
use crate::types::{Motivation, PlayerId};

/// Pairs leave their teams and found a new two-person team together, so no team
/// ever grows past two members.
#[derive(Debug, Clone, Copy)]
pub struct CappedMerge {
    pub motivation: Motivation,
}

impl CappedMerge {
    /// Each player's change from founding a team with the other.
    pub fn deltas(
        community: &Community,
        initiator: PlayerId,
        responder: PlayerId,
    ) -> Result<(i64, i64), NegotiationError> {
        Ok((
            community.delta(initiator, &ScoreQuery::new_team_with(responder))?,
            community.delta(responder, &ScoreQuery::new_team_with(initiator))?,
        ))
    }

    fn abandoned_delta(community: &Community, leaver: PlayerId, partner: PlayerId) -> Result<i64, NegotiationError> {
        let team = community.player(leaver)?.team();
        let remaining: BTreeSet<_> = resources_without(community, team, leaver)?;
        teammates_delta(community, team, &[leaver, partner], &remaining)
    }
}

impl Negotiator for CappedMerge {
    fn negotiate<R: Rng + ?Sized>(
        &self,
        community: &mut Community,
        initiator: PlayerId,
        responder: PlayerId,
        _rng: &mut R,
    ) -> Result<bool, NegotiationError> {
        ensure_pair(community, initiator, responder)?;
        let (initiator_delta, responder_delta) = Self::deltas(community, initiator, responder)?;

        let agreed = match self.motivation {
            Motivation::SelfInterested => initiator_delta > 0 && responder_delta > 0,
            Motivation::Community => {
                let total = initiator_delta
                    + responder_delta
                    + Self::abandoned_delta(community, initiator, responder)?
                    + Self::abandoned_delta(community, responder, initiator)?;
                total > 0
            }
        };
        if !agreed {
            return Ok(false);
        }

        let team = community.form_team(initiator, responder)?;
        debug!(
            motivation = ?self.motivation,
            initiator = initiator.0,
            responder = responder.0,
            team = team.0,
            "new pair team formed"
        );
        Ok(true)
    }
}
