//! Append-only storage addressed by typed indices.
//!
//! Cells, pins and nets each live in their own [`Arena`], so connectivity
//! is plain `u32` indices and a pin ID can never be used to look up a net.

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// A typed `u32` index into an [`Arena`].
pub trait ArenaId: Copy {
    /// Wraps a raw slot number.
    fn from_raw(index: u32) -> Self;

    /// The raw slot number.
    fn as_raw(self) -> u32;

    /// The slot number as a `usize`, for addressing parallel vectors.
    fn index(self) -> usize {
        self.as_raw() as usize
    }
}

/// Declares a `u32` newtype usable as an [`ArenaId`].
///
/// The generated type derives serde traits, so the calling crate needs
/// `serde` with the `derive` feature.
#[macro_export]
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Wraps a raw slot number.
            pub const fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// The raw slot number.
            pub const fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl $crate::arena::ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

/// Entities of one kind, in insertion order.
///
/// Nothing is ever removed, so an ID stays valid for the arena's lifetime.
/// Indexing with `arena[id]` panics on a foreign ID; [`get`](Self::get)
/// does not.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arena<I, T> {
    slots: Vec<T>,
    #[serde(skip)]
    ids: PhantomData<fn() -> I>,
}

impl<I, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            ids: PhantomData,
        }
    }
}

impl<I: ArenaId, T> Arena<I, T> {
    /// An empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `item` and returns the ID it was given.
    pub fn alloc(&mut self, item: T) -> I {
        let id = self.next_id();
        self.slots.push(item);
        id
    }

    /// The ID the next [`alloc`](Self::alloc) will return.
    pub fn next_id(&self) -> I {
        I::from_raw(self.slots.len() as u32)
    }

    /// Looks `id` up, returning `None` if it was never allocated here.
    pub fn get(&self, id: I) -> Option<&T> {
        self.slots.get(id.index())
    }

    /// Mutable variant of [`get`](Self::get).
    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.slots.get_mut(id.index())
    }

    /// Number of stored entities.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether nothing has been allocated yet.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// `(id, item)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> + '_ {
        (0u32..).zip(&self.slots).map(|(i, item)| (I::from_raw(i), item))
    }

    /// Items in insertion order, without their IDs.
    pub fn values(&self) -> std::slice::Iter<'_, T> {
        self.slots.iter()
    }
}

impl<I: ArenaId, T> Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        &self.slots[id.index()]
    }
}

impl<I: ArenaId, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        &mut self.slots[id.index()]
    }
}
