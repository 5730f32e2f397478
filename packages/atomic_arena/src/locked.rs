use std::fmt;

use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};

#[cfg(doc)]
use crate::Error;
use crate::{AllocError, Arena, ArenaBuilder, ArenaState, ResetPolicy, Result};

/// A fixed-capacity arena that can be reset through a shared reference.
///
/// This is the internally locked counterpart of [`Arena`]. Allocation and peeking take a shared
/// lock, which many threads can hold at the same time, and return guards that keep the lock held
/// for as long as the value is borrowed. [`reset()`][1] takes an exclusive lock, so it waits until
/// every outstanding guard has been dropped and no allocation is in flight.
///
/// Use this when a reset needs to happen from a thread that cannot regain exclusive access to the
/// arena, for example when the arena lives in a `static` or an `Arc` shared with long-lived
/// workers. If you can arrange for exclusive access at reset time, prefer [`Arena`], which takes
/// no locks at all.
///
/// Shared locks are taken recursively, so a thread that holds a guard can keep allocating.
/// Calling [`reset()`][1] while holding a guard on the same thread deadlocks.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
///
/// use atomic_arena::LockedArena;
///
/// let arena = Arc::new(LockedArena::<u64>::new(1024).unwrap());
///
/// let workers: Vec<_> = (0..4)
///     .map(|worker| {
///         let arena = Arc::clone(&arena);
///         thread::spawn(move || {
///             for i in 0..100 {
///                 let value = arena.alloc(worker * 1000 + i).unwrap();
///                 assert_eq!(*value, worker * 1000 + i);
///             }
///         })
///     })
///     .collect();
///
/// for worker in workers {
///     worker.join().unwrap();
/// }
///
/// assert_eq!(arena.len(), 400);
///
/// // No exclusive access needed.
/// arena.reset();
/// assert!(arena.is_empty());
/// ```
///
/// [1]: Self::reset
pub struct LockedArena<T> {
    inner: RwLock<Arena<T>>,
}

impl<T> LockedArena<T> {
    pub(crate) fn from_arena(arena: Arena<T>) -> Self {
        Self {
            inner: RwLock::new(arena),
        }
    }

    /// Creates a locked arena with room for `capacity` values and the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` is zero or too large to allocate.
    pub fn new(capacity: usize) -> Result<Self> {
        Arena::builder().capacity(capacity).build_locked()
    }

    /// Starts building a new arena.
    ///
    /// Finish with [`ArenaBuilder::build_locked()`] to obtain a [`LockedArena`].
    pub fn builder() -> ArenaBuilder<T> {
        ArenaBuilder::new()
    }

    fn shared(&self) -> RwLockReadGuard<'_, Arena<T>> {
        self.inner.read_recursive()
    }

    /// The fixed number of slots in the arena.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.shared().capacity()
    }

    /// The number of slots issued since the arena was created or last reset.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared().len()
    }

    /// Whether no slots have been issued since the arena was created or last reset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared().is_empty()
    }

    /// Whether every slot has been issued.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.shared().is_full()
    }

    /// The number of slots that have not been issued yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.shared().remaining()
    }

    /// The fill level of the arena.
    #[must_use]
    pub fn state(&self) -> ArenaState {
        self.shared().state()
    }

    /// The policy applied to stored values on reset and when the arena is dropped.
    #[must_use]
    pub fn reset_policy(&self) -> ResetPolicy {
        self.shared().reset_policy()
    }

    /// Moves a value into the next free slot, as [`Arena::alloc()`] does.
    ///
    /// The returned guard holds a shared lock on the arena until dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArenaFull`] if every slot has been issued. The value is returned to the
    /// caller inside the error and the arena is left unchanged.
    pub fn alloc(
        &self,
        value: T,
    ) -> std::result::Result<MappedRwLockReadGuard<'_, T>, AllocError<T>> {
        let mut rejected = None;

        RwLockReadGuard::try_map(self.shared(), |arena| {
            arena
                .alloc(value)
                .map_err(|error| rejected = Some(error))
                .ok()
        })
        .map_err(|_guard| rejected.expect("mapping only fails when the arena rejects the value"))
    }

    /// Moves a batch of values into a contiguous range of slots, as [`Arena::append_many()`]
    /// does.
    ///
    /// The returned guard holds a shared lock on the arena until dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArenaFull`] if fewer slots remain than the iterator reports. The iterator
    /// is returned to the caller inside the error and the arena is left unchanged.
    pub fn append_many<I>(
        &self,
        values: I,
    ) -> std::result::Result<MappedRwLockReadGuard<'_, [T]>, AllocError<I::IntoIter>>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let mut rejected = None;

        RwLockReadGuard::try_map(self.shared(), |arena| {
            arena
                .append_many(values)
                .map_err(|error| rejected = Some(error))
                .ok()
        })
        .map_err(|_guard| rejected.expect("mapping only fails when the arena rejects the values"))
    }

    /// Claims `count` contiguous slots and fills them in place from `f`, as
    /// [`Arena::reserve()`] followed by [`Reservation::fill_with()`][crate::Reservation::fill_with]
    /// does.
    ///
    /// The returned guard holds a shared lock on the arena until dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArenaFull`] if fewer than `count` slots remain. The arena is left
    /// unchanged.
    pub fn reserve_with(
        &self,
        count: usize,
        f: impl FnMut(usize) -> T,
    ) -> Result<MappedRwLockReadGuard<'_, [T]>> {
        let mut rejected = None;

        RwLockReadGuard::try_map(self.shared(), |arena| match arena.reserve(count) {
            Ok(reservation) => Some(reservation.fill_with(f)),
            Err(error) => {
                rejected = Some(error);
                None
            }
        })
        .map_err(|_guard| rejected.expect("mapping only fails when the arena rejects the count"))
    }

    /// Returns the value in the slot at `index`, if one has been published since the arena was
    /// created or last reset.
    ///
    /// The returned guard holds a shared lock on the arena until dropped.
    #[must_use]
    pub fn peek(&self, index: usize) -> Option<MappedRwLockReadGuard<'_, T>> {
        RwLockReadGuard::try_map(self.shared(), |arena| arena.peek(index)).ok()
    }

    /// Copies out every published value in slot order.
    ///
    /// The shared lock is held only for the duration of the call.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.shared().iter().cloned().collect()
    }

    /// Returns the arena to its initial state, as [`Arena::reset()`] does.
    ///
    /// Blocks until every guard returned by this arena has been dropped and no allocation is in
    /// flight.
    pub fn reset(&self) {
        self.inner.write().reset();
    }

    /// Direct access to the lock-free arena, for when the caller already has exclusive access.
    pub fn get_mut(&mut self) -> &mut Arena<T> {
        self.inner.get_mut()
    }

    /// Unwraps the lock-free arena.
    #[must_use]
    pub fn into_inner(self) -> Arena<T> {
        self.inner.into_inner()
    }
}

impl<T> From<Arena<T>> for LockedArena<T> {
    fn from(value: Arena<T>) -> Self {
        Self::from_arena(value)
    }
}

impl<T> fmt::Debug for LockedArena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_read_recursive() {
            Some(arena) => f
                .debug_struct("LockedArena")
                .field("inner", &*arena)
                .finish(),
            None => f
                .debug_struct("LockedArena")
                .field("inner", &format_args!("<locked>"))
                .finish(),
        }
    }
}
