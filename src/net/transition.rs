//! Firing points and their ordered edge sets.
use indexmap::IndexSet;

use crate::net::edge::Edge;
use crate::net::error::NetResult;
use crate::net::ids::{EdgeId, PlaceId};
use crate::net::place::{Place, Tokens};
use crate::net::registry::Registry;

/// A transition only stores edge handles; the edge records themselves live in
/// the net's edge registry. Both sets keep insertion order, which is the
/// order edges are evaluated and activated in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    incoming: IndexSet<EdgeId>,
    outgoing: IndexSet<EdgeId>,
}

impl Transition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incoming(&self) -> impl ExactSizeIterator<Item = EdgeId> + '_ {
        self.incoming.iter().copied()
    }

    pub fn outgoing(&self) -> impl ExactSizeIterator<Item = EdgeId> + '_ {
        self.outgoing.iter().copied()
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.incoming().chain(self.outgoing())
    }

    pub fn attach_incoming(&mut self, edge: EdgeId) {
        self.incoming.insert(edge);
    }

    pub fn detach_incoming(&mut self, edge: EdgeId) {
        self.incoming.shift_remove(&edge);
    }

    pub fn attach_outgoing(&mut self, edge: EdgeId) {
        self.outgoing.insert(edge);
    }

    pub fn detach_outgoing(&mut self, edge: EdgeId) {
        self.outgoing.shift_remove(&edge);
    }

    /// True when every incoming edge is activable, checked in insertion order
    /// and stopping at the first one that is not.
    pub fn is_drawable(
        &self,
        edges: &Registry<EdgeId, Edge>,
        places: &Registry<PlaceId, Place>,
    ) -> bool {
        self.incoming
            .iter()
            .filter_map(|&id| edges.get(id))
            .all(|edge| edge.is_activable(places))
    }

    /// Activates every incoming edge, then every outgoing edge.
    ///
    /// No enablement check is made here. If an activation fails, the token
    /// counts of every place this transition touches are put back as they
    /// were before the call.
    pub fn draw(
        &self,
        edges: &Registry<EdgeId, Edge>,
        places: &mut Registry<PlaceId, Place>,
    ) -> NetResult<()> {
        let in_order = || self.edges().filter_map(|id| edges.get(id));

        let snapshot: Vec<(PlaceId, Tokens)> = in_order()
            .filter_map(|edge| edge.place())
            .filter_map(|id| places.get(id).map(|place| (id, place.tokens())))
            .collect();

        for edge in in_order() {
            if let Err(err) = edge.activate(places) {
                for &(id, tokens) in &snapshot {
                    if let Some(place) = places.get_mut(id) {
                        place.restore(tokens);
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }
}
