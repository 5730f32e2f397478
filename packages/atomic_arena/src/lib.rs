#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Fixed-capacity arenas for values of a single type, filled concurrently without locks and
//! reused in bulk.
//!
//! An arena allocates all of its slots up front. Putting a value into it does not allocate memory -
//! it bumps an atomic counter to claim a slot and moves the value in. When a usage cycle ends (a
//! frame of a game loop, a batch of network packets, a request), the whole arena is reset at once
//! and can be filled again. This makes arenas a cheap fast path in front of ordinary heap
//! allocation: try the arena first and fall back to the heap when it is full.
//!
//! # Arena types
//!
//! * [`Arena<T>`] - lock-free, fails when full. Reset requires exclusive access, which the
//!   borrow checker enforces.
//! * [`LockedArena<T>`] - fails when full. Allocation takes a shared lock and reset takes an
//!   exclusive lock, so it can be reset through a shared reference.
//! * [`RingArena<T>`] - lock-free, never fails. Once full, each new value overwrites the oldest.
//!
//! # Filling an arena
//!
//! * [`alloc()`][Arena::alloc] moves in one value.
//! * [`append_many()`][Arena::append_many] moves in a batch of values as one contiguous range.
//! * [`reserve()`][Arena::reserve] claims a contiguous range and returns a [`Reservation`] that
//!   the caller fills in place, avoiding the intermediate copy of the values.
//!
//! When a fail-on-full arena does not have room, the operation fails with [`Error::ArenaFull`]
//! and leaves the arena unchanged. The value-consuming operations return the rejected input in an
//! [`AllocError`], so nothing is lost.
//!
//! # Configuration
//!
//! Use [`Arena::builder()`] to size the arena by element count or by memory budget (see
//! [`Capacity`]) and to choose what happens to stored values on reset (see [`ResetPolicy`]).
//!
//! # Example
//!
//! ```
//! use atomic_arena::Arena;
//!
//! #[derive(Debug)]
//! struct Entity {
//!     id: u32,
//!     position: (f32, f32),
//! }
//!
//! let mut arena = Arena::<Entity>::new(2).unwrap();
//! let mut overflow = Vec::new();
//!
//! for id in 0..3 {
//!     let entity = Entity {
//!         id,
//!         position: (0.0, 0.0),
//!     };
//!
//!     if let Err(rejected) = arena.alloc(entity) {
//!         // The arena is full - fall back to the heap.
//!         overflow.push(Box::new(rejected.into_inner()));
//!     }
//! }
//!
//! assert_eq!(arena.len(), 2);
//! assert_eq!(overflow.len(), 1);
//! assert_eq!(overflow[0].id, 2);
//!
//! // End of the cycle. Every entity in the arena is dropped and the slots can be reused.
//! arena.reset();
//! assert!(arena.is_empty());
//! ```
//!
//! # Thread safety
//!
//! All arena types are thread-safe (`Send` and `Sync`) when `T` is `Send` and `Sync`. A value
//! stored by one thread becomes visible to [`peek()`][Arena::peek] on other threads only after it
//! has been completely written.

mod arena;
mod builder;
mod capacity;
mod error;
mod locked;
mod reservation;
mod reset_policy;
mod ring;
mod state;
mod storage;

pub use arena::*;
pub use builder::*;
pub use capacity::*;
pub use error::{AllocError, Error};
pub(crate) use error::Result;
pub use locked::*;
pub use reservation::*;
pub use reset_policy::*;
pub use ring::*;
pub use state::*;
pub(crate) use storage::*;
