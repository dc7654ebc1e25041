use rand::Rng;
use tracing::debug;

use crate::community::{Community, ScoreQuery};
use crate::negotiation::base::{NegotiationError, Negotiator, ensure_pair};
use crate::types::{Motivation, PlayerId};

/// A proposed one-for-one swap of objectives. Teams are untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeOffer {
    pub initiator_gives: usize,
    pub responder_gives: usize,
    pub initiator_delta: i64,
    pub responder_delta: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct Trade {
    pub motivation: Motivation,
}

impl Trade {
    /// Each side offers what it values least, aiming at the other side's letter.
    /// `None` if either side holds nothing.
    pub fn offer(
        community: &Community,
        initiator: PlayerId,
        responder: PlayerId,
    ) -> Result<Option<TradeOffer>, NegotiationError> {
        let a = community.player(initiator)?;
        let b = community.player(responder)?;
        let a_pool = community.team_resources(a.team())?;
        let b_pool = community.team_resources(b.team())?;

        let Some(a_gives) = community.objective_to_give_up(initiator, &a_pool, Some(b.resource()))? else {
            return Ok(None);
        };
        let Some(b_gives) = community.objective_to_give_up(responder, &b_pool, Some(a.resource()))? else {
            return Ok(None);
        };

        let a_query = ScoreQuery::current().dropping(a_gives).receiving(b_gives, responder);
        let b_query = ScoreQuery::current().dropping(b_gives).receiving(a_gives, initiator);
        Ok(Some(TradeOffer {
            initiator_gives: a_gives,
            responder_gives: b_gives,
            initiator_delta: community.delta(initiator, &a_query)?,
            responder_delta: community.delta(responder, &b_query)?,
        }))
    }
}

impl Negotiator for Trade {
    fn negotiate<R: Rng + ?Sized>(
        &self,
        community: &mut Community,
        initiator: PlayerId,
        responder: PlayerId,
        _rng: &mut R,
    ) -> Result<bool, NegotiationError> {
        ensure_pair(community, initiator, responder)?;
        let Some(offer) = Self::offer(community, initiator, responder)? else {
            return Ok(false);
        };

        // Teammates keep the same resources and holdings, so only the pair's own
        // changes make up the community total.
        let agreed = match self.motivation {
            Motivation::SelfInterested => offer.initiator_delta > 0 && offer.responder_delta > 0,
            Motivation::Community => offer.initiator_delta + offer.responder_delta > 0,
        };
        if !agreed {
            return Ok(false);
        }

        community.transfer_objective(initiator, responder, offer.initiator_gives)?;
        community.transfer_objective(responder, initiator, offer.responder_gives)?;
        debug!(
            motivation = ?self.motivation,
            initiator = initiator.0,
            responder = responder.0,
            "objectives swapped"
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::mock::StepRng;

    use super::*;
    use crate::fixtures::{letter, obj};
    use crate::types::{TeamId, ValueTier};

    // Each holds what the other can fulfil.
    fn crossed() -> Community {
        Community::from_holdings(vec![
            (letter('A'), vec![obj('b', ValueTier::Low), obj('a', ValueTier::High)]),
            (letter('B'), vec![obj('a', ValueTier::Low), obj('b', ValueTier::High)]),
        ])
    }

    #[test]
    fn offer_targets_counterpart_letter() {
        let community = crossed();
        let offer = Trade::offer(&community, PlayerId(0), PlayerId(1)).unwrap().unwrap();
        assert_eq!(offer.initiator_gives, 0);
        assert_eq!(offer.responder_gives, 2);
        assert_eq!(offer.initiator_delta, 10);
        assert_eq!(offer.responder_delta, 10);
    }

    #[test]
    fn mutually_beneficial_swap_goes_through() {
        let mut community = crossed();
        let protocol = Trade {
            motivation: Motivation::SelfInterested,
        };
        let before = community.total_value();
        let changed = protocol.negotiate(&mut community, PlayerId(0), PlayerId(1), &mut StepRng::new(0, 0));
        assert_eq!(changed, Ok(true));
        assert_eq!(community.total_value(), before + 20);
        assert_eq!(community.objective_count(), 4);
        assert_eq!(community.ledger().traded_total(), 2);
        assert_eq!(community.player(PlayerId(0)).unwrap().team(), TeamId(0));
        assert!(community.player(PlayerId(0)).unwrap().holds(2));
        assert!(community.player(PlayerId(1)).unwrap().holds(0));
    }

    #[test]
    fn one_sided_swap_needs_community_motivation() {
        let holdings = || {
            vec![
                (letter('A'), vec![obj('b', ValueTier::High)]),
                (letter('B'), vec![obj('c', ValueTier::Low)]),
            ]
        };
        // Player 1 gains b1 (+20); player 0 loses nothing it could use.
        let mut community = Community::from_holdings(holdings());
        let selfish = Trade {
            motivation: Motivation::SelfInterested,
        };
        assert_eq!(
            selfish.negotiate(&mut community, PlayerId(0), PlayerId(1), &mut StepRng::new(0, 0)),
            Ok(false)
        );

        let mut community = Community::from_holdings(holdings());
        let caring = Trade {
            motivation: Motivation::Community,
        };
        assert_eq!(
            caring.negotiate(&mut community, PlayerId(0), PlayerId(1), &mut StepRng::new(0, 0)),
            Ok(true)
        );
        assert_eq!(community.total_value(), 20);
    }

    #[test]
    fn empty_handed_player_cannot_trade() {
        let mut community = Community::from_holdings(vec![
            (letter('A'), vec![obj('b', ValueTier::High)]),
            (letter('B'), vec![]),
        ]);
        let protocol = Trade {
            motivation: Motivation::Community,
        };
        assert_eq!(
            protocol.negotiate(&mut community, PlayerId(0), PlayerId(1), &mut StepRng::new(0, 0)),
            Ok(false)
        );
    }
}
