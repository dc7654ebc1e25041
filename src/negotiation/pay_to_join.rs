use rand::Rng;

use crate::community::Community;
use crate::negotiation::base::{NegotiationError, Negotiator};
use crate::negotiation::merge::{MergeCost, negotiate_merge};
use crate::types::{Motivation, PlayerId};

/// Whoever changes team hands one objective to the player that takes them in.
#[derive(Debug, Clone, Copy)]
pub struct PayToJoin {
    pub motivation: Motivation,
}

impl Negotiator for PayToJoin {
    fn negotiate<R: Rng + ?Sized>(
        &self,
        community: &mut Community,
        initiator: PlayerId,
        responder: PlayerId,
        rng: &mut R,
    ) -> Result<bool, NegotiationError> {
        negotiate_merge(
            community,
            initiator,
            responder,
            MergeCost::Pay,
            self.motivation,
            rng,
        )
    }
}
