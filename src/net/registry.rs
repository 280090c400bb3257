//! Slot arena keyed by strongly typed handles.
//!
//! A handle stays valid until its entry is removed and is never reused, so a
//! stale handle always resolves to `None` instead of aliasing a newer entry.
//! Iteration yields live entries in insertion order, which is the "registry
//! order" the simulation driver relies on.
//!
//! The id types are `u32` wide, so a registry holds at most `u32::MAX + 1`
//! inserts over its lifetime; the next insert panics.
use std::fmt;
use std::marker::PhantomData;

/// Trait implemented by identifier types that can index into a [`Registry`].
pub trait Idx: Copy + Eq + Ord + fmt::Debug {
    fn index(self) -> usize;
    fn from_usize(idx: usize) -> Self;
}

#[derive(Clone, PartialEq, Eq)]
pub struct Registry<I, T> {
    slots: Vec<Option<T>>,
    live: usize,
    _marker: PhantomData<I>,
}

impl<I, T> Registry<I, T>
where
    I: Idx,
{
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
            _marker: PhantomData,
        }
    }

    pub fn insert(&mut self, value: T) -> I {
        let idx = self.slots.len();
        self.slots.push(Some(value));
        self.live += 1;
        I::from_usize(idx)
    }

    pub fn remove(&mut self, id: I) -> Option<T> {
        let removed = self.slots.get_mut(id.index())?.take();
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    pub fn contains(&self, id: I) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: I) -> Option<&T> {
        self.slots.get(id.index())?.as_ref()
    }

    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn ids(&self) -> impl Iterator<Item = I> + '_ {
        self.iter().map(|(id, _)| id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|value| (I::from_usize(idx), value)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (I, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_mut().map(|value| (I::from_usize(idx), value)))
    }
}

impl<I, T> Default for Registry<I, T>
where
    I: Idx,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<I, T> fmt::Debug for Registry<I, T>
where
    I: Idx,
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
