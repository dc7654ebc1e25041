pub mod base;
pub mod capped_merge;
pub mod drop_to_join;
pub mod free_merge;
pub mod merge;
pub mod pay_to_join;
pub mod trade;

use rand::Rng;

use crate::community::Community;
use crate::types::{Motivation, PlayerId, Variation};

pub use base::{Consent, Decision, Deltas, MergeTerms, NegotiationError, Negotiator};
pub use capped_merge::CappedMerge;
pub use drop_to_join::DropToJoin;
pub use free_merge::FreeMerge;
pub use merge::{MergeCost, MergePlan};
pub use pay_to_join::PayToJoin;
pub use trade::{Trade, TradeOffer};

#[derive(Debug, Clone, Copy)]
pub enum Protocol {
    DropToJoin(DropToJoin),
    PayToJoin(PayToJoin),
    FreeMerge(FreeMerge),
    CappedMerge(CappedMerge),
    Trade(Trade),
}

impl Protocol {
    /// `None` for [`Variation::AllocationOnly`], which never negotiates.
    pub fn for_variation(variation: Variation, motivation: Motivation) -> Option<Self> {
        match variation {
            Variation::AllocationOnly => None,
            Variation::DropToJoin => Some(Protocol::DropToJoin(DropToJoin { motivation })),
            Variation::PayToJoin => Some(Protocol::PayToJoin(PayToJoin { motivation })),
            Variation::FreeMerge => Some(Protocol::FreeMerge(FreeMerge { motivation })),
            Variation::CappedMerge => Some(Protocol::CappedMerge(CappedMerge { motivation })),
            Variation::Trade => Some(Protocol::Trade(Trade { motivation })),
        }
    }

    pub fn variation(&self) -> Variation {
        match self {
            Protocol::DropToJoin(_) => Variation::DropToJoin,
            Protocol::PayToJoin(_) => Variation::PayToJoin,
            Protocol::FreeMerge(_) => Variation::FreeMerge,
            Protocol::CappedMerge(_) => Variation::CappedMerge,
            Protocol::Trade(_) => Variation::Trade,
        }
    }
}

impl Negotiator for Protocol {
    fn negotiate<R: Rng + ?Sized>(
        &self,
        community: &mut Community,
        initiator: PlayerId,
        responder: PlayerId,
        rng: &mut R,
    ) -> Result<bool, NegotiationError> {
        match self {
            Protocol::DropToJoin(p) => p.negotiate(community, initiator, responder, rng),
            Protocol::PayToJoin(p) => p.negotiate(community, initiator, responder, rng),
            Protocol::FreeMerge(p) => p.negotiate(community, initiator, responder, rng),
            Protocol::CappedMerge(p) => p.negotiate(community, initiator, responder, rng),
            Protocol::Trade(p) => p.negotiate(community, initiator, responder, rng),
        }
    }
}
