use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use crate::{Arena, Capacity, Error, LockedArena, ResetPolicy, Result};

/// Builder for creating an instance of [`Arena`] or [`LockedArena`].
///
/// The capacity is mandatory. Everything else has a default that is sufficient for most use
/// cases. Which terminal method you call decides the synchronization discipline of the arena:
///
/// * [`build()`][1] - a lock-free [`Arena`] that requires exclusive access to reset.
/// * [`build_locked()`][2] - a [`LockedArena`] that can be reset through a shared reference,
///   at the cost of taking a shared lock on every allocation.
///
/// # Examples
///
/// ```
/// use atomic_arena::{Arena, ResetPolicy};
///
/// let arena = Arena::<String>::builder()
///     .byte_budget(64 * 1024)
///     .reset_policy(ResetPolicy::ScrubValues)
///     .build()
///     .unwrap();
///
/// assert_eq!(arena.capacity(), 64 * 1024 / size_of::<String>());
/// ```
///
/// [1]: Self::build
/// [2]: Self::build_locked
#[must_use]
pub struct ArenaBuilder<T> {
    capacity: Option<Capacity>,
    reset_policy: ResetPolicy,

    _item: PhantomData<T>,
}

impl<T> fmt::Debug for ArenaBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArenaBuilder")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("capacity", &self.capacity)
            .field("reset_policy", &self.reset_policy)
            .finish()
    }
}

impl<T> ArenaBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            capacity: None,
            reset_policy: ResetPolicy::default(),
            _item: PhantomData,
        }
    }

    /// Sets the capacity of the arena as a number of values.
    ///
    /// Replaces any capacity set earlier via this method or
    /// [`byte_budget()`][Self::byte_budget].
    pub fn capacity(mut self, count: usize) -> Self {
        self.capacity = Some(Capacity::Elements(count));
        self
    }

    /// Sets the capacity of the arena as a memory budget for the values, in bytes.
    ///
    /// The arena gets as many slots as whole values of `T` fit in the budget.
    /// Replaces any capacity set earlier via this method or [`capacity()`][Self::capacity].
    pub fn byte_budget(mut self, bytes: usize) -> Self {
        self.capacity = Some(Capacity::Bytes(bytes));
        self
    }

    /// Sets the [reset policy][ResetPolicy] for the arena. This governs what happens to stored
    /// values when the arena is reset or dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_arena::{Arena, ResetPolicy};
    ///
    /// let arena = Arena::<u32>::builder()
    ///     .capacity(16)
    ///     .reset_policy(ResetPolicy::ForgetValues)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(arena.reset_policy(), ResetPolicy::ForgetValues);
    /// ```
    pub fn reset_policy(mut self, policy: ResetPolicy) -> Self {
        self.reset_policy = policy;
        self
    }

    fn resolve_capacity(&self) -> Result<Capacity> {
        self.capacity.ok_or_else(|| {
            Error::invalid_capacity(format!(
                "no capacity was specified for arena of {}",
                type_name::<T>()
            ))
        })
    }

    /// Builds a lock-free arena with the specified configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if no capacity was specified or if the capacity does not
    /// resolve to a positive number of slots that can be allocated.
    pub fn build(self) -> Result<Arena<T>> {
        Arena::new_inner(self.resolve_capacity()?, self.reset_policy)
    }

    /// Builds an internally locked arena with the specified configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if no capacity was specified or if the capacity does not
    /// resolve to a positive number of slots that can be allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_arena::Arena;
    ///
    /// let arena = Arena::<u32>::builder().capacity(4).build_locked().unwrap();
    ///
    /// arena.alloc(1).unwrap();
    /// arena.reset();
    ///
    /// assert!(arena.is_empty());
    /// ```
    pub fn build_locked(self) -> Result<LockedArena<T>> {
        self.build().map(LockedArena::from_arena)
    }
}
