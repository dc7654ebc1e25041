use rand::Rng;

use crate::community::Community;
use crate::negotiation::base::{NegotiationError, Negotiator};
use crate::negotiation::merge::{MergeCost, negotiate_merge};
use crate::types::{Motivation, PlayerId};

#[derive(Debug, Clone, Copy)]
pub struct FreeMerge {
    pub motivation: Motivation,
}

impl Negotiator for FreeMerge {
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
            MergeCost::Free,
            self.motivation,
            rng,
        )
    }
}
