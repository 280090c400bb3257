//! Invalid-argument failures raised by the net and its components.
//!
//! Every variant is a rejected precondition; none of them leave partially
//! mutated state behind.
use thiserror::Error;

use crate::net::edge::Direction;
use crate::net::ids::{EdgeId, PlaceId, TransitionId};
use crate::net::place::Tokens;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetError {
    #[error("token amount {0} is negative")]
    NegativeAmount(i64),
    #[error("cannot remove {requested} tokens, place only holds {available}")]
    InsufficientTokens { requested: Tokens, available: Tokens },
    #[error("adding {amount} tokens to {current} overflows the place")]
    TokenOverflow { current: Tokens, amount: Tokens },
    #[error("edge weight {0} is negative")]
    NegativeWeight(i64),
    #[error("edge {0:?} has no weight")]
    Unweighted(EdgeId),
    #[error("transition {0:?} can't be drawn")]
    NotDrawable(TransitionId),
    #[error(
        "an {direction} edge between {place:?} and {transition:?} already exists with weight {weight}"
    )]
    EdgeAlreadyExists {
        direction: Direction,
        place: PlaceId,
        transition: TransitionId,
        weight: Tokens,
    },
    #[error("place {0:?} is not registered in the net")]
    UnknownPlace(PlaceId),
    #[error("transition {0:?} is not registered in the net")]
    UnknownTransition(TransitionId),
    #[error("edge {0:?} is not registered in the net")]
    UnknownEdge(EdgeId),
}

pub type NetResult<T> = Result<T, NetError>;
