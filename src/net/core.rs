//! The net: registries, wiring invariants and single-step firing.
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::net::edge::{Direction, Edge, EdgeKind};
use crate::net::error::{NetError, NetResult};
use crate::net::ids::{EdgeId, PlaceId, TransitionId};
use crate::net::marking::Marking;
use crate::net::place::{Place, Tokens};
use crate::net::registry::Registry;
use crate::net::transition::Transition;

#[derive(Debug, Clone)]
pub struct Net {
    places: Registry<PlaceId, Place>,
    transitions: Registry<TransitionId, Transition>,
    edges: Registry<EdgeId, Edge>,
    pub(crate) rng: StdRng,
}

impl Net {
    /// An empty net whose simulation RNG is seeded from the OS.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// An empty net whose simulation runs are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            places: Registry::new(),
            transitions: Registry::new(),
            edges: Registry::new(),
            rng,
        }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn add_place(&mut self, tokens: i64) -> PlaceId {
        let place = Place::new(tokens);
        let initial = place.tokens();
        let id = self.places.insert(place);
        log::debug!("added place {id} with {initial} tokens");
        id
    }

    pub fn add_transition(&mut self) -> TransitionId {
        let id = self.transitions.insert(Transition::new());
        log::debug!("added transition {id}");
        id
    }

    /// Weighted edge `place -> transition`.
    ///
    /// Fails if a weighted incoming edge already joins the two nodes.
    pub fn add_input_edge(
        &mut self,
        weight: i64,
        place: PlaceId,
        transition: TransitionId,
    ) -> NetResult<EdgeId> {
        self.check_place(place)?;
        self.check_transition(transition)?;
        self.ensure_unique(Direction::PlaceToTransition, place, transition, None)?;
        let kind = EdgeKind::weighted_in(weight)?;
        Ok(self.insert_edge(kind, Some(place), Some(transition)))
    }

    /// Weighted edge `transition -> place`.
    ///
    /// Fails if a weighted outgoing edge already joins the two nodes.
    pub fn add_output_edge(
        &mut self,
        weight: i64,
        transition: TransitionId,
        place: PlaceId,
    ) -> NetResult<EdgeId> {
        self.check_place(place)?;
        self.check_transition(transition)?;
        self.ensure_unique(Direction::TransitionToPlace, place, transition, None)?;
        let kind = EdgeKind::weighted_out(weight)?;
        Ok(self.insert_edge(kind, Some(place), Some(transition)))
    }

    pub fn add_empty_edge_between(
        &mut self,
        place: PlaceId,
        transition: TransitionId,
    ) -> NetResult<EdgeId> {
        self.check_place(place)?;
        self.check_transition(transition)?;
        Ok(self.insert_edge(EdgeKind::Empty, Some(place), Some(transition)))
    }

    pub fn add_zero_edge_between(
        &mut self,
        place: PlaceId,
        transition: TransitionId,
    ) -> NetResult<EdgeId> {
        self.check_place(place)?;
        self.check_transition(transition)?;
        Ok(self.insert_edge(EdgeKind::Zero, Some(place), Some(transition)))
    }

    // Unattached edges, wired later through `set_edge_place` / `set_edge_transition`.

    pub fn add_weighted_in(&mut self, weight: i64) -> NetResult<EdgeId> {
        Ok(self.insert_edge(EdgeKind::weighted_in(weight)?, None, None))
    }

    pub fn add_weighted_out(&mut self, weight: i64) -> NetResult<EdgeId> {
        Ok(self.insert_edge(EdgeKind::weighted_out(weight)?, None, None))
    }

    pub fn add_empty_edge(&mut self) -> EdgeId {
        self.insert_edge(EdgeKind::Empty, None, None)
    }

    pub fn add_zero_edge(&mut self) -> EdgeId {
        self.insert_edge(EdgeKind::Zero, None, None)
    }

    fn insert_edge(
        &mut self,
        kind: EdgeKind,
        place: Option<PlaceId>,
        transition: Option<TransitionId>,
    ) -> EdgeId {
        let id = self.edges.insert(Edge::new(kind, place, transition));
        if let Some(transition) = transition {
            self.link(id, kind.direction(), transition);
        }
        log::debug!("added {kind:?} edge {id} ({place:?}, {transition:?})");
        id
    }

    /// Moves the place end of an edge. Token counts are not touched.
    pub fn set_edge_place(&mut self, edge: EdgeId, place: Option<PlaceId>) -> NetResult<()> {
        let record = self.edge_record(edge)?;
        let (direction, transition) = (record.direction(), record.transition());
        if let Some(place) = place {
            self.check_place(place)?;
            if let (Some(transition), Some(_)) = (transition, record.weight()) {
                self.ensure_unique(direction, place, transition, Some(edge))?;
            }
        }
        self.edge_record_mut(edge)?.set_place(place);
        Ok(())
    }

    /// Moves the transition end of an edge, keeping both transitions' edge
    /// sets in agreement with the edge record.
    pub fn set_edge_transition(
        &mut self,
        edge: EdgeId,
        transition: Option<TransitionId>,
    ) -> NetResult<()> {
        let record = self.edge_record(edge)?;
        let (direction, place, previous) =
            (record.direction(), record.place(), record.transition());
        if let Some(transition) = transition {
            self.check_transition(transition)?;
            if let (Some(place), Some(_)) = (place, record.weight()) {
                self.ensure_unique(direction, place, transition, Some(edge))?;
            }
        }

        if let Some(previous) = previous {
            self.unlink(edge, direction, previous);
        }
        if let Some(transition) = transition {
            self.link(edge, direction, transition);
        }
        self.edge_record_mut(edge)?.set_transition(transition);
        Ok(())
    }

    /// Clears both endpoints of an edge without removing it from the net.
    pub fn detach_edge(&mut self, edge: EdgeId) -> NetResult<()> {
        self.set_edge_transition(edge, None)?;
        self.set_edge_place(edge, None)
    }

    /// Removes a place together with every edge attached to it.
    pub fn remove_place(&mut self, place: PlaceId) -> NetResult<Place> {
        let removed = self.places.remove(place).ok_or(NetError::UnknownPlace(place))?;
        let attached: Vec<EdgeId> = self
            .edges
            .iter()
            .filter(|(_, edge)| edge.place() == Some(place))
            .map(|(id, _)| id)
            .collect();
        for edge in &attached {
            self.remove_edge(*edge)?;
        }
        log::debug!("removed place {place} and {} attached edges", attached.len());
        Ok(removed)
    }

    /// Removes a transition together with every edge attached to it.
    pub fn remove_transition(&mut self, transition: TransitionId) -> NetResult<Transition> {
        let removed = self
            .transitions
            .remove(transition)
            .ok_or(NetError::UnknownTransition(transition))?;
        for edge in removed.edges() {
            self.edges.remove(edge);
        }
        log::debug!(
            "removed transition {transition} and {} attached edges",
            removed.edges().count()
        );
        Ok(removed)
    }

    pub fn remove_edge(&mut self, edge: EdgeId) -> NetResult<Edge> {
        let removed = self.edges.remove(edge).ok_or(NetError::UnknownEdge(edge))?;
        if let Some(transition) = removed.transition() {
            self.unlink(edge, removed.direction(), transition);
        }
        Ok(removed)
    }

    /// Sets a place's count outright (not additive).
    pub fn set_tokens(&mut self, place: PlaceId, tokens: i64) -> NetResult<()> {
        self.place_record_mut(place)?.set_tokens(tokens)
    }

    pub fn add_tokens(&mut self, place: PlaceId, amount: i64) -> NetResult<()> {
        self.place_record_mut(place)?.add_tokens(amount)
    }

    pub fn remove_tokens(&mut self, place: PlaceId, amount: i64) -> NetResult<()> {
        self.place_record_mut(place)?.remove_tokens(amount)
    }

    /// Updates the weight of a `WeightedIn` / `WeightedOut` edge.
    pub fn set_weight(&mut self, edge: EdgeId, weight: i64) -> NetResult<()> {
        self.edge_record_mut(edge)?.set_weight(edge, weight)
    }

    pub fn place(&self, place: PlaceId) -> Option<&Place> {
        self.places.get(place)
    }

    pub fn transition(&self, transition: TransitionId) -> Option<&Transition> {
        self.transitions.get(transition)
    }

    pub fn edge(&self, edge: EdgeId) -> Option<&Edge> {
        self.edges.get(edge)
    }

    pub fn tokens(&self, place: PlaceId) -> NetResult<Tokens> {
        self.places
            .get(place)
            .map(Place::tokens)
            .ok_or(NetError::UnknownPlace(place))
    }

    pub fn places(&self) -> impl Iterator<Item = (PlaceId, &Place)> {
        self.places.iter()
    }

    pub fn transitions(&self) -> impl Iterator<Item = (TransitionId, &Transition)> {
        self.transitions.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter()
    }

    pub fn places_len(&self) -> usize {
        self.places.len()
    }

    pub fn transitions_len(&self) -> usize {
        self.transitions.len()
    }

    pub fn edges_len(&self) -> usize {
        self.edges.len()
    }

    pub fn marking(&self) -> Marking {
        Marking::new(
            self.places
                .iter()
                .map(|(id, place)| (id, place.tokens()))
                .collect(),
        )
    }

    pub fn is_drawable(&self, transition: TransitionId) -> NetResult<bool> {
        let record = self
            .transitions
            .get(transition)
            .ok_or(NetError::UnknownTransition(transition))?;
        Ok(record.is_drawable(&self.edges, &self.places))
    }

    /// Fires a transition without checking that it is drawable.
    ///
    /// Edges whose rule does not hold still apply their effect, so a
    /// non-drawable transition guarded only by `Zero` or `Empty` edges fires
    /// anyway. An over-drawing `WeightedIn` edge makes the whole draw fail
    /// with the marking unchanged. Use [`Net::step_simulation`] for the
    /// checked path.
    pub fn draw(&mut self, transition: TransitionId) -> NetResult<()> {
        let record = self
            .transitions
            .get(transition)
            .ok_or(NetError::UnknownTransition(transition))?;
        record.draw(&self.edges, &mut self.places)?;
        log::debug!("drew {transition}");
        Ok(())
    }

    /// Transitions that are drawable under the current marking, in registry order.
    pub fn firable(&self) -> Vec<TransitionId> {
        self.transitions
            .iter()
            .filter(|(_, transition)| transition.is_drawable(&self.edges, &self.places))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn step_simulation(&mut self, transition: TransitionId) -> NetResult<()> {
        if !self.is_drawable(transition)? {
            return Err(NetError::NotDrawable(transition));
        }
        self.draw(transition)
    }

    fn ensure_unique(
        &self,
        direction: Direction,
        place: PlaceId,
        transition: TransitionId,
        except: Option<EdgeId>,
    ) -> NetResult<()> {
        let Some(record) = self.transitions.get(transition) else {
            return Ok(());
        };
        let candidates = match direction {
            Direction::PlaceToTransition => record.incoming().collect::<Vec<_>>(),
            Direction::TransitionToPlace => record.outgoing().collect::<Vec<_>>(),
        };
        let existing = candidates
            .into_iter()
            .filter(|&id| Some(id) != except)
            .filter_map(|id| self.edges.get(id))
            .filter(|edge| edge.place() == Some(place))
            .find_map(Edge::weight);

        match existing {
            Some(weight) => Err(NetError::EdgeAlreadyExists {
                direction,
                place,
                transition,
                weight,
            }),
            None => Ok(()),
        }
    }

    fn link(&mut self, edge: EdgeId, direction: Direction, transition: TransitionId) {
        if let Some(record) = self.transitions.get_mut(transition) {
            match direction {
                Direction::PlaceToTransition => record.attach_incoming(edge),
                Direction::TransitionToPlace => record.attach_outgoing(edge),
            }
        }
    }

    fn unlink(&mut self, edge: EdgeId, direction: Direction, transition: TransitionId) {
        if let Some(record) = self.transitions.get_mut(transition) {
            match direction {
                Direction::PlaceToTransition => record.detach_incoming(edge),
                Direction::TransitionToPlace => record.detach_outgoing(edge),
            }
        }
    }

    fn check_place(&self, place: PlaceId) -> NetResult<()> {
        if self.places.contains(place) {
            Ok(())
        } else {
            Err(NetError::UnknownPlace(place))
        }
    }

    fn check_transition(&self, transition: TransitionId) -> NetResult<()> {
        if self.transitions.contains(transition) {
            Ok(())
        } else {
            Err(NetError::UnknownTransition(transition))
        }
    }

    fn place_record_mut(&mut self, place: PlaceId) -> NetResult<&mut Place> {
        self.places.get_mut(place).ok_or(NetError::UnknownPlace(place))
    }

    fn edge_record(&self, edge: EdgeId) -> NetResult<&Edge> {
        self.edges.get(edge).ok_or(NetError::UnknownEdge(edge))
    }

    fn edge_record_mut(&mut self, edge: EdgeId) -> NetResult<&mut Edge> {
        self.edges.get_mut(edge).ok_or(NetError::UnknownEdge(edge))
    }
}

impl Default for Net {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every edge listed by a transition points back at it, and every
    /// attached edge is listed by its transition exactly once.
    fn assert_wiring_consistent(net: &Net) {
        for (tid, transition) in net.transitions() {
            for eid in transition.incoming() {
                let edge = net.edge(eid).unwrap();
                assert_eq!(edge.transition(), Some(tid));
                assert!(edge.is_incoming());
            }
            for eid in transition.outgoing() {
                let edge = net.edge(eid).unwrap();
                assert_eq!(edge.transition(), Some(tid));
                assert!(!edge.is_incoming());
            }
        }
        for (eid, edge) in net.edges() {
            if let Some(tid) = edge.transition() {
                let listed = net
                    .transition(tid)
                    .unwrap()
                    .edges()
                    .filter(|&e| e == eid)
                    .count();
                assert_eq!(listed, 1, "{eid} listed {listed} times by {tid}");
            }
        }
    }

    #[test]
    fn duplicate_weighted_edge_reports_existing_weight() {
        let mut net = Net::with_seed(0);
        let p = net.add_place(0);
        let t = net.add_transition();

        net.add_input_edge(2, p, t).unwrap();
        let err = net.add_input_edge(3, p, t).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("already exists"), "{message}");
        assert!(message.contains("weight 2"), "{message}");
        assert_eq!(net.edges_len(), 1);

        net.add_output_edge(1, t, p).unwrap();
        let err = net.add_output_edge(5, t, p).unwrap_err();
        assert!(matches!(err, NetError::EdgeAlreadyExists { weight: 1, .. }));
        assert_eq!(net.edges_len(), 2);
    }

    #[test]
    fn unweighted_edges_skip_uniqueness() {
        let mut net = Net::with_seed(0);
        let p = net.add_place(0);
        let t = net.add_transition();

        net.add_input_edge(1, p, t).unwrap();
        net.add_zero_edge_between(p, t).unwrap();
        net.add_zero_edge_between(p, t).unwrap();
        net.add_empty_edge_between(p, t).unwrap();
        assert_eq!(net.transition(t).unwrap().incoming().len(), 4);
        assert_wiring_consistent(&net);
    }

    #[test]
    fn negative_weight_rejected_before_registration() {
        let mut net = Net::with_seed(0);
        let p = net.add_place(0);
        let t = net.add_transition();
        assert_eq!(
            net.add_input_edge(-1, p, t),
            Err(NetError::NegativeWeight(-1))
        );
        assert_eq!(net.add_weighted_out(-4), Err(NetError::NegativeWeight(-4)));
        assert_eq!(net.edges_len(), 0);
        assert_eq!(net.transition(t).unwrap().incoming().len(), 0);
    }

    #[test]
    fn set_weight_rules() {
        let mut net = Net::with_seed(0);
        let p = net.add_place(0);
        let t = net.add_transition();
        let weighted = net.add_input_edge(1, p, t).unwrap();
        let zero = net.add_zero_edge_between(p, t).unwrap();

        net.set_weight(weighted, 4).unwrap();
        assert_eq!(net.edge(weighted).unwrap().weight(), Some(4));
        assert_eq!(
            net.set_weight(weighted, -1),
            Err(NetError::NegativeWeight(-1))
        );
        assert_eq!(net.edge(weighted).unwrap().weight(), Some(4));
        assert_eq!(net.set_weight(zero, 1), Err(NetError::Unweighted(zero)));
    }

    #[test]
    fn reassigning_transition_moves_edge_between_sets() {
        let mut net = Net::with_seed(0);
        let p = net.add_place(3);
        let t1 = net.add_transition();
        let t2 = net.add_transition();
        let edge = net.add_input_edge(1, p, t1).unwrap();

        net.set_edge_transition(edge, Some(t2)).unwrap();
        assert_eq!(net.transition(t1).unwrap().incoming().len(), 0);
        assert_eq!(
            net.transition(t2).unwrap().incoming().collect::<Vec<_>>(),
            vec![edge]
        );
        assert_eq!(net.tokens(p), Ok(3));
        assert_wiring_consistent(&net);

        net.detach_edge(edge).unwrap();
        assert_eq!(net.transition(t2).unwrap().incoming().len(), 0);
        assert_eq!(net.edge(edge).unwrap().place(), None);
        assert_wiring_consistent(&net);
    }

    #[test]
    fn incremental_wiring_of_unattached_edges() {
        let mut net = Net::with_seed(0);
        let p = net.add_place(2);
        let t = net.add_transition();
        let edge = net.add_weighted_in(2).unwrap();

        // transition first, place second: not activable until both ends are set
        net.set_edge_transition(edge, Some(t)).unwrap();
        assert_eq!(net.is_drawable(t), Ok(false));
        net.set_edge_place(edge, Some(p)).unwrap();
        assert_eq!(net.is_drawable(t), Ok(true));
        assert_wiring_consistent(&net);
    }

    #[test]
    fn reassignment_respects_uniqueness() {
        let mut net = Net::with_seed(0);
        let p1 = net.add_place(0);
        let p2 = net.add_place(0);
        let t = net.add_transition();
        net.add_output_edge(7, t, p1).unwrap();
        let other = net.add_output_edge(1, t, p2).unwrap();

        let err = net.set_edge_place(other, Some(p1)).unwrap_err();
        assert!(matches!(err, NetError::EdgeAlreadyExists { weight: 7, .. }));
        assert_eq!(net.edge(other).unwrap().place(), Some(p2));

        let loose = net.add_weighted_out(2).unwrap();
        net.set_edge_place(loose, Some(p1)).unwrap();
        let err = net.set_edge_transition(loose, Some(t)).unwrap_err();
        assert!(matches!(err, NetError::EdgeAlreadyExists { weight: 7, .. }));
        assert_eq!(net.edge(loose).unwrap().transition(), None);
        assert_wiring_consistent(&net);
    }

    #[test]
    fn removing_nodes_deletes_attached_edges() {
        let mut net = Net::with_seed(0);
        let p1 = net.add_place(1);
        let p2 = net.add_place(0);
        let t1 = net.add_transition();
        let t2 = net.add_transition();
        net.add_input_edge(1, p1, t1).unwrap();
        net.add_output_edge(1, t1, p2).unwrap();
        let kept = net.add_input_edge(1, p2, t2).unwrap();
        net.add_zero_edge_between(p1, t2).unwrap();

        net.remove_place(p1).unwrap();
        assert_eq!(net.edges_len(), 2);
        assert_eq!(net.transition(t1).unwrap().incoming().len(), 0);
        assert_eq!(
            net.transition(t2).unwrap().incoming().collect::<Vec<_>>(),
            vec![kept]
        );
        assert_wiring_consistent(&net);

        net.remove_transition(t1).unwrap();
        assert_eq!(net.edges_len(), 1);
        assert!(net.edge(kept).is_some());

        net.remove_edge(kept).unwrap();
        assert_eq!(net.transition(t2).unwrap().incoming().len(), 0);
        assert_eq!(net.remove_edge(kept), Err(NetError::UnknownEdge(kept)));
        assert_eq!(net.remove_place(p1), Err(NetError::UnknownPlace(p1)));
    }

    #[test]
    fn stale_handles_are_rejected() {
        let mut net = Net::with_seed(0);
        let p = net.add_place(0);
        let t = net.add_transition();
        net.remove_place(p).unwrap();
        net.remove_transition(t).unwrap();

        let fresh = net.add_transition();
        assert_eq!(net.set_tokens(p, 1), Err(NetError::UnknownPlace(p)));
        assert_eq!(
            net.add_input_edge(1, p, fresh),
            Err(NetError::UnknownPlace(p))
        );
        assert_eq!(net.step_simulation(t), Err(NetError::UnknownTransition(t)));
    }

    #[test]
    fn step_simulation_refuses_non_drawable() {
        let mut net = Net::with_seed(0);
        let p = net.add_place(0);
        let out = net.add_place(0);
        let t = net.add_transition();
        net.add_input_edge(1, p, t).unwrap();
        net.add_output_edge(1, t, out).unwrap();

        assert_eq!(net.step_simulation(t), Err(NetError::NotDrawable(t)));
        assert_eq!(net.tokens(out), Ok(0));

        net.set_tokens(p, 1).unwrap();
        net.step_simulation(t).unwrap();
        assert_eq!(net.tokens(p), Ok(0));
        assert_eq!(net.tokens(out), Ok(1));
    }

    #[test]
    fn unchecked_draw_of_inhibited_transition_still_fires() {
        let mut net = Net::with_seed(0);
        let guard = net.add_place(1);
        let out = net.add_place(0);
        let t = net.add_transition();
        net.add_zero_edge_between(guard, t).unwrap();
        net.add_output_edge(2, t, out).unwrap();

        assert_eq!(net.is_drawable(t), Ok(false));
        net.draw(t).unwrap();
        assert_eq!(net.tokens(guard), Ok(1));
        assert_eq!(net.tokens(out), Ok(2));
    }

    #[test]
    fn firable_lists_in_registry_order() {
        let mut net = Net::with_seed(0);
        let p = net.add_place(1);
        let t0 = net.add_transition();
        let t1 = net.add_transition();
        let t2 = net.add_transition();
        net.add_input_edge(2, p, t1).unwrap();
        net.add_zero_edge_between(p, t2).unwrap();

        assert_eq!(net.firable(), vec![t0]);
        net.set_tokens(p, 0).unwrap();
        assert_eq!(net.firable(), vec![t0, t2]);
        net.set_tokens(p, 5).unwrap();
        assert_eq!(net.firable(), vec![t0, t1]);
    }

    #[test]
    fn token_helpers_validate() {
        let mut net = Net::with_seed(0);
        let p = net.add_place(-3);
        assert_eq!(net.tokens(p), Ok(0));
        net.add_tokens(p, 4).unwrap();
        assert_eq!(
            net.remove_tokens(p, 5),
            Err(NetError::InsufficientTokens {
                requested: 5,
                available: 4
            })
        );
        assert_eq!(net.set_tokens(p, -1), Err(NetError::NegativeAmount(-1)));
        assert_eq!(net.marking().tokens(p), Some(4));
    }
}
