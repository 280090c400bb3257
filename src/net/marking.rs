//! Point-in-time snapshot of the token distribution.
use std::fmt;

use crate::net::ids::PlaceId;
use crate::net::place::Tokens;

/// Token counts of every live place, in registry order.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Marking(Vec<(PlaceId, Tokens)>);

impl Marking {
    pub(crate) fn new(tokens: Vec<(PlaceId, Tokens)>) -> Self {
        Self(tokens)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlaceId, Tokens)> + '_ {
        self.0.iter().copied()
    }

    pub fn tokens(&self, place: PlaceId) -> Option<Tokens> {
        self.0
            .iter()
            .find_map(|&(id, tokens)| (id == place).then_some(tokens))
    }

    /// Sum of all token counts, or `None` if it does not fit in [`Tokens`].
    pub fn total(&self) -> Option<Tokens> {
        self.0
            .iter()
            .try_fold(0 as Tokens, |sum, &(_, tokens)| sum.checked_add(tokens))
    }
}

impl fmt::Debug for Marking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (place, tokens) in self.iter() {
            map.entry(&place, &tokens);
        }
        map.finish()
    }
}
