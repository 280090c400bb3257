//! Strongly typed handles for the three registries of a [`Net`](crate::net::Net).
use std::fmt;

use crate::net::registry::Idx;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        }

        impl Idx for $name {
            fn index(self) -> usize {
                self.0 as usize
            }

            /// Panics past `u32::MAX` rather than wrapping onto a live handle.
            fn from_usize(idx: usize) -> Self {
                Self(u32::try_from(idx).expect(concat!($prefix, " handle space exhausted")))
            }
        }
    };
}

define_id!(PlaceId, "p");
define_id!(TransitionId, "t");
define_id!(EdgeId, "e");
