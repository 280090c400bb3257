//! Typed connectors between one place and one transition.
//!
//! The activation rules form a closed set, so they are a plain enum with the
//! rule table spelled out in [`Edge::is_activable`] and [`Edge::activate`]:
//!
//! | kind          | direction | activable when   | effect on fire          |
//! |---------------|-----------|------------------|-------------------------|
//! | `WeightedIn`  | P -> T    | `tokens >= w`    | place loses `w` tokens  |
//! | `Empty`       | P -> T    | `tokens >= 1`    | place is drained to 0   |
//! | `Zero`        | P -> T    | `tokens == 0`    | none (inhibitor test)   |
//! | `WeightedOut` | T -> P    | always           | place gains `w` tokens  |
use std::fmt;

use crate::net::error::{NetError, NetResult};
use crate::net::ids::{EdgeId, PlaceId, TransitionId};
use crate::net::place::{Place, Tokens, non_negative};
use crate::net::registry::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    PlaceToTransition,
    TransitionToPlace,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::PlaceToTransition => f.write_str("incoming"),
            Direction::TransitionToPlace => f.write_str("outgoing"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    WeightedIn { weight: Tokens },
    WeightedOut { weight: Tokens },
    Empty,
    Zero,
}

impl EdgeKind {
    pub fn weighted_in(weight: i64) -> NetResult<Self> {
        Ok(EdgeKind::WeightedIn {
            weight: checked_weight(weight)?,
        })
    }

    pub fn weighted_out(weight: i64) -> NetResult<Self> {
        Ok(EdgeKind::WeightedOut {
            weight: checked_weight(weight)?,
        })
    }

    pub fn direction(self) -> Direction {
        match self {
            EdgeKind::WeightedOut { .. } => Direction::TransitionToPlace,
            EdgeKind::WeightedIn { .. } | EdgeKind::Empty | EdgeKind::Zero => {
                Direction::PlaceToTransition
            }
        }
    }

    pub fn weight(self) -> Option<Tokens> {
        match self {
            EdgeKind::WeightedIn { weight } | EdgeKind::WeightedOut { weight } => Some(weight),
            EdgeKind::Empty | EdgeKind::Zero => None,
        }
    }
}

fn checked_weight(weight: i64) -> NetResult<Tokens> {
    non_negative(weight).map_err(|_| NetError::NegativeWeight(weight))
}

/// An edge record in the net's edge registry.
///
/// Either endpoint may be unset while a net is being wired up; an incoming
/// edge without a place never enables its transition, and activating an edge
/// without a place does nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    kind: EdgeKind,
    place: Option<PlaceId>,
    transition: Option<TransitionId>,
}

impl Edge {
    pub(crate) fn new(
        kind: EdgeKind,
        place: Option<PlaceId>,
        transition: Option<TransitionId>,
    ) -> Self {
        Self {
            kind,
            place,
            transition,
        }
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn direction(&self) -> Direction {
        self.kind.direction()
    }

    pub fn weight(&self) -> Option<Tokens> {
        self.kind.weight()
    }

    pub fn place(&self) -> Option<PlaceId> {
        self.place
    }

    pub fn transition(&self) -> Option<TransitionId> {
        self.transition
    }

    pub fn is_incoming(&self) -> bool {
        self.direction() == Direction::PlaceToTransition
    }

    pub(crate) fn set_place(&mut self, place: Option<PlaceId>) {
        self.place = place;
    }

    pub(crate) fn set_transition(&mut self, transition: Option<TransitionId>) {
        self.transition = transition;
    }

    pub(crate) fn set_weight(&mut self, id: EdgeId, weight: i64) -> NetResult<()> {
        match &mut self.kind {
            EdgeKind::WeightedIn { weight: current }
            | EdgeKind::WeightedOut { weight: current } => {
                *current = checked_weight(weight)?;
                Ok(())
            }
            EdgeKind::Empty | EdgeKind::Zero => Err(NetError::Unweighted(id)),
        }
    }

    /// Enablement predicate. Outgoing edges never block a transition.
    pub fn is_activable(&self, places: &Registry<PlaceId, Place>) -> bool {
        if !self.is_incoming() {
            return true;
        }
        let Some(place) = self.place.and_then(|id| places.get(id)) else {
            return false;
        };
        match self.kind {
            EdgeKind::WeightedIn { weight } => place.tokens() >= weight,
            EdgeKind::Empty => place.tokens() >= 1,
            EdgeKind::Zero => place.tokens() == 0,
            EdgeKind::WeightedOut { .. } => true,
        }
    }

    /// Applies the token effect without re-checking [`Edge::is_activable`].
    ///
    /// Only a `WeightedIn` edge over-drawing its place can fail; the place is
    /// left unchanged in that case.
    pub fn activate(&self, places: &mut Registry<PlaceId, Place>) -> NetResult<()> {
        let Some(place) = self.place.and_then(|id| places.get_mut(id)) else {
            return Ok(());
        };
        match self.kind {
            EdgeKind::WeightedIn { weight } => place.take(weight),
            EdgeKind::WeightedOut { weight } => place.give(weight),
            EdgeKind::Empty => {
                place.drain();
                Ok(())
            }
            EdgeKind::Zero => Ok(()),
        }
    }
}
