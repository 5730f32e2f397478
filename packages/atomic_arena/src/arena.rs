use std::any::type_name;
use std::fmt;
use std::num::NonZero;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, trace};

use crate::{
    AllocError, ArenaBuilder, ArenaState, Capacity, Error, Reservation, ResetPolicy, Result,
    Storage,
};

/// A fixed-capacity arena of values of type `T` that can be filled concurrently without locks.
///
/// All slots are allocated when the arena is created. Filling the arena never allocates memory;
/// it only issues slot indexes by bumping an atomic counter. There is no way to remove an
/// individual value - instead, the whole arena is [reset][Self::reset] at once when a usage
/// cycle (a frame, a batch, a request) ends, after which it can be filled again.
///
/// There are multiple ways to put values into the arena, all callable from any number of threads
/// at the same time:
///
/// * [`alloc()`][1] - moves one value into the next free slot and returns a shared reference to
///   it.
/// * [`append_many()`][2] - moves a batch of values into a contiguous range of slots and returns
///   them as a shared slice.
/// * [`reserve()`][3] - claims a contiguous range of slots and returns a [`Reservation`] through
///   which the caller fills the slots in place, without moving values in.
///
/// When the arena does not have enough vacant slots, these fail with [`Error::ArenaFull`] and leave
/// the arena unchanged. The value-consuming methods return the rejected input to the caller.
///
/// # Visibility
///
/// A value becomes visible to [`peek()`][4] and [`iter()`][5] once it has been fully written,
/// including on other threads. Each slot is published with release ordering after being written
/// and read back with acquire ordering, so observing a slot implies observing its value.
///
/// # Resetting
///
/// [`reset()`][6] requires exclusive access to the arena. This means no reference returned by the
/// arena can still be alive and no allocation can be in flight when the reset happens - the
/// compiler checks this for you. If you need to reset an arena that is shared between threads
/// without first regaining exclusive access, use [`LockedArena`][7] instead.
///
/// # Examples
///
/// ```
/// use atomic_arena::Arena;
///
/// let mut arena = Arena::<u32>::new(5).unwrap();
///
/// for value in [0, 10, 20, 30, 40] {
///     arena.alloc(value).unwrap();
/// }
///
/// assert!(arena.alloc(50).is_err());
/// assert_eq!(arena.peek(3), Some(&30));
///
/// arena.reset();
///
/// let value = arena.alloc(99).unwrap();
/// assert_eq!(*value, 99);
/// assert_eq!(arena.peek(0), Some(&99));
/// ```
///
/// [1]: Self::alloc
/// [2]: Self::append_many
/// [3]: Self::reserve
/// [4]: Self::peek
/// [5]: Self::iter
/// [6]: Self::reset
/// [7]: crate::LockedArena
pub struct Arena<T> {
    storage: Storage<T>,

    /// Number of slots issued since the last reset. This is also the index of the next slot to
    /// issue. A failing `alloc()` may push it past the capacity for a moment before rolling back
    /// its own increment, so readers must clamp it to the capacity.
    issued: AtomicUsize,

    capacity: NonZero<usize>,
}

impl<T> Arena<T> {
    pub(crate) fn new_inner(capacity: Capacity, reset_policy: ResetPolicy) -> Result<Self> {
        let slots = capacity.slot_count::<T>()?;

        debug!(
            item_type = type_name::<T>(),
            capacity = slots.get(),
            ?reset_policy,
            "arena constructed"
        );

        Ok(Self {
            storage: Storage::new(slots, reset_policy),
            issued: AtomicUsize::new(0),
            capacity: slots,
        })
    }

    /// Creates an arena with room for `capacity` values and the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` is zero or too large to allocate.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_arena::Arena;
    ///
    /// let arena = Arena::<String>::new(128).unwrap();
    ///
    /// assert_eq!(arena.capacity(), 128);
    /// assert!(arena.is_empty());
    ///
    /// assert!(Arena::<String>::new(0).is_err());
    /// ```
    pub fn new(capacity: usize) -> Result<Self> {
        Self::builder().capacity(capacity).build()
    }

    /// Creates an arena with as many slots as fit in a memory budget of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if the budget is too small for a single value or if
    /// `T` is zero-sized.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_arena::Arena;
    ///
    /// let arena = Arena::<u64>::with_byte_budget(4096).unwrap();
    ///
    /// assert_eq!(arena.capacity(), 512);
    /// ```
    pub fn with_byte_budget(bytes: usize) -> Result<Self> {
        Self::builder().byte_budget(bytes).build()
    }

    /// Starts building a new [`Arena`].
    ///
    /// Use this when you want to customize the arena configuration beyond the defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_arena::{Arena, ResetPolicy};
    ///
    /// let arena = Arena::<Vec<u8>>::builder()
    ///     .capacity(64)
    ///     .reset_policy(ResetPolicy::ScrubValues)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(arena.capacity(), 64);
    /// ```
    pub fn builder() -> ArenaBuilder<T> {
        ArenaBuilder::new()
    }

    /// The fixed number of slots in the arena.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// The number of slots issued since the arena was created or last reset.
    ///
    /// This includes slots issued to reservations that have not been completed yet.
    #[must_use]
    pub fn len(&self) -> usize {
        self.issued.load(Ordering::Relaxed).min(self.capacity())
    }

    /// Whether no slots have been issued since the arena was created or last reset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether every slot has been issued. All further allocations fail until the next reset.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// The number of slots that have not been issued yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity()
            .checked_sub(self.len())
            .expect("len is clamped to capacity")
    }

    /// The fill level of the arena.
    #[must_use]
    pub fn state(&self) -> ArenaState {
        ArenaState::from_issued(self.len(), self.capacity())
    }

    /// The policy applied to stored values on reset and when the arena is dropped.
    #[must_use]
    pub fn reset_policy(&self) -> ResetPolicy {
        self.storage.reset_policy()
    }

    /// Moves a value into the next free slot and returns a reference to it.
    ///
    /// Lock-free and wait-free: a single atomic increment decides the slot. Concurrent callers
    /// always receive distinct slots. Within one thread, successive calls receive increasing slot
    /// indexes until the next reset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArenaFull`] if every slot has been issued. The value is returned to the
    /// caller inside the error and the arena is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_arena::Arena;
    ///
    /// let arena = Arena::<String>::new(1).unwrap();
    ///
    /// let hello = arena.alloc("hello".to_string()).unwrap();
    /// assert_eq!(hello, "hello");
    ///
    /// let rejected = arena.alloc("world".to_string()).unwrap_err();
    /// assert_eq!(rejected.into_inner(), "world");
    /// ```
    pub fn alloc(&self, value: T) -> std::result::Result<&T, AllocError<T>> {
        // Index issuance needs no ordering of its own - the atomicity of the increment is what
        // makes the index ours. Visibility of the value is handled by publication.
        let index = self.issued.fetch_add(1, Ordering::Relaxed);

        if index >= self.capacity() {
            // Undo our increment so the counter is restored before we return.
            self.issued.fetch_sub(1, Ordering::Relaxed);
            return Err(AllocError::new(value, self.full_error(1)));
        }

        // SAFETY: The increment above issued `index` to us and nobody else in this epoch. The
        // epoch cannot end while we hold `&self` because reset requires `&mut self`.
        Ok(unsafe { self.storage.insert(index, value) })
    }

    /// Moves a batch of values into a contiguous range of slots and returns them as a slice,
    /// in the same order as they were provided.
    ///
    /// The range is claimed with a compare-and-swap loop that checks the remaining capacity before
    /// claiming anything, so a batch is either placed entirely or not at all. Each value is
    /// published as soon as it is written.
    ///
    /// If the iterator yields fewer items than its reported length, only the items it did yield
    /// are placed and returned; the rest of the claimed range stays unpublished until the next
    /// reset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArenaFull`] if fewer slots remain than the iterator reports. The iterator
    /// is returned to the caller, untouched, inside the error and the arena is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_arena::Arena;
    ///
    /// let arena = Arena::<u32>::new(3).unwrap();
    ///
    /// let first = arena.append_many([1, 2]).unwrap();
    /// assert_eq!(first, &[1, 2]);
    ///
    /// // Only one slot is left, so this batch is rejected as a whole.
    /// let rejected = arena.append_many([3, 4]).unwrap_err();
    /// assert_eq!(arena.len(), 2);
    /// assert_eq!(rejected.into_inner().collect::<Vec<_>>(), vec![3, 4]);
    ///
    /// let second = arena.append_many([3]).unwrap();
    /// assert_eq!(second, &[3]);
    /// assert!(arena.is_full());
    /// ```
    pub fn append_many<I>(&self, values: I) -> std::result::Result<&[T], AllocError<I::IntoIter>>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let values = values.into_iter();
        let count = values.len();

        let start = match self.claim(count) {
            Ok(start) => start,
            Err(error) => return Err(AllocError::new(values, error)),
        };

        let end = start
            .checked_add(count)
            .expect("claim guarantees the range fits within capacity");

        let mut written: usize = 0;

        // The range comes first so that we never pull more items from the iterator than we
        // have claimed slots for.
        for (index, value) in (start..end).zip(values) {
            // SAFETY: The claim issued the whole range to us and nobody else in this epoch, and
            // we write each index only once.
            unsafe {
                self.storage.insert(index, value);
            }

            written = written
                .checked_add(1)
                .expect("guarded by range length, which is within capacity");
        }

        // SAFETY: We wrote every slot in this prefix of the range above.
        Ok(unsafe { self.storage.slice(start, written) })
    }

    /// Claims `count` contiguous slots and returns a [`Reservation`] for filling them in place.
    ///
    /// This is the zero-copy bulk path: the caller writes values directly into arena memory. The
    /// values become visible to other threads only when the reservation is completed, which
    /// publishes the whole range at once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArenaFull`] if fewer than `count` slots remain. The arena is left
    /// unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_arena::Arena;
    ///
    /// let arena = Arena::<[u8; 4]>::new(16).unwrap();
    ///
    /// let pixels = arena.reserve(4).unwrap().fill_with(|i| [i as u8; 4]);
    ///
    /// assert_eq!(pixels.len(), 4);
    /// assert_eq!(pixels[3], [3, 3, 3, 3]);
    /// assert_eq!(arena.remaining(), 12);
    /// ```
    pub fn reserve(&self, count: usize) -> Result<Reservation<'_, T>> {
        let start = self.claim(count)?;

        // SAFETY: The claim issued the range to us and nobody else in this epoch.
        Ok(unsafe { Reservation::new(&self.storage, start, count) })
    }

    /// Claims `count` contiguous slots, returning the index of the first one.
    ///
    /// The capacity check happens before the compare-and-swap, so a failed claim never mutates
    /// the counter and needs no rollback.
    fn claim(&self, count: usize) -> Result<usize> {
        let capacity = self.capacity();
        let mut current = self.issued.load(Ordering::Relaxed);

        loop {
            let end = current
                .checked_add(count)
                .filter(|&end| end <= capacity);

            let Some(end) = end else {
                return Err(self.full_error(count));
            };

            if count == 0 {
                // Nothing to claim, no need to touch the counter.
                return Ok(current);
            }

            match self.issued.compare_exchange_weak(
                current,
                end,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Ok(current),
                Err(actual) => current = actual,
            }
        }
    }

    fn full_error(&self, requested: usize) -> Error {
        Error::ArenaFull {
            requested,
            available: self.remaining(),
            capacity: self.capacity(),
        }
    }

    /// Returns the value in the slot at `index`, if one has been published since the arena was
    /// created or last reset.
    ///
    /// Slots issued to a [`Reservation`] that has not been completed yet are not published.
    /// Out of bounds indexes return `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_arena::Arena;
    ///
    /// let arena = Arena::<char>::new(2).unwrap();
    /// arena.alloc('a').unwrap();
    ///
    /// assert_eq!(arena.peek(0), Some(&'a'));
    /// assert_eq!(arena.peek(1), None);
    /// assert_eq!(arena.peek(2), None);
    /// ```
    #[must_use]
    pub fn peek(&self, index: usize) -> Option<&T> {
        self.storage.peek(index)
    }

    /// Iterates over the published values in slot order.
    ///
    /// Only slots issued before the iteration started are visited. Values allocated concurrently
    /// with the iteration may or may not be observed.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            arena: self,
            next_index: 0,
            end_index: self.len(),
        }
    }

    /// Returns the arena to its initial state so that every slot can be issued again.
    ///
    /// Only the slots issued since the last reset are visited, so the cost is proportional to the
    /// high-water mark rather than the capacity. Values are released according to the
    /// [reset policy][ResetPolicy].
    ///
    /// Requiring exclusive access guarantees that no allocation is in flight and that no
    /// reference into the arena survives the reset.
    pub fn reset(&mut self) {
        let high_water = (*self.issued.get_mut()).min(self.capacity());

        self.storage.clear(high_water);
        *self.issued.get_mut() = 0;

        trace!(
            item_type = type_name::<T>(),
            high_water,
            capacity = self.capacity(),
            "arena reset"
        );
    }
}

impl<T> Drop for Arena<T> {
    fn drop(&mut self) {
        let high_water = (*self.issued.get_mut()).min(self.capacity());

        self.storage.clear(high_water);
    }
}

impl<'a, T> IntoIterator for &'a Arena<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the published values of an [`Arena`], in slot order.
///
/// Returned by [`Arena::iter()`].
#[derive(Debug)]
pub struct Iter<'a, T> {
    arena: &'a Arena<T>,
    next_index: usize,
    end_index: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_index < self.end_index {
            let index = self.next_index;
            self.next_index = index
                .checked_add(1)
                .expect("guarded by end index, which is within capacity");

            if let Some(value) = self.arena.peek(index) {
                return Some(value);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end_index.saturating_sub(self.next_index);
        (0, Some(remaining))
    }
}

impl<T> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("reset_policy", &self.reset_policy())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Barrier;
    use std::thread;

    use static_assertions::{assert_impl_all, assert_not_impl_any};
    use testing::{DropTracker, with_watchdog};

    use super::*;

    assert_impl_all!(Arena<u32>: Send, Sync);
    assert_impl_all!(Arena<String>: Send, Sync);
    assert_impl_all!(Arena<Cell<u32>>: Send);
    assert_not_impl_any!(Arena<Cell<u32>>: Sync);
    assert_not_impl_any!(Arena<*const u32>: Send, Sync);

    #[test]
    fn smoke_test() {
        let arena = Arena::<u32>::new(3).unwrap();

        let a = arena.alloc(42).unwrap();
        let b = arena.alloc(43).unwrap();
        let c = arena.alloc(44).unwrap();

        assert_eq!(*a, 42);
        assert_eq!(*b, 43);
        assert_eq!(*c, 44);

        assert_eq!(arena.len(), 3);
        assert!(arena.is_full());
    }

    #[test]
    fn zero_capacity_is_error() {
        let error = Arena::<u32>::new(0).unwrap_err();

        assert!(matches!(error, Error::InvalidCapacity { .. }));
    }

    #[test]
    fn full_arena_rejects_and_is_unchanged() {
        let arena = Arena::<u32>::new(2).unwrap();

        arena.alloc(1).unwrap();
        arena.alloc(2).unwrap();

        let rejected = arena.alloc(3).unwrap_err();

        assert_eq!(
            *rejected.error(),
            Error::ArenaFull {
                requested: 1,
                available: 0,
                capacity: 2,
            }
        );
        assert_eq!(rejected.into_inner(), 3);

        assert_eq!(arena.len(), 2);
        assert_eq!(arena.issued.load(Ordering::Relaxed), 2);
        assert_eq!(arena.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn successive_allocs_take_increasing_slots() {
        let arena = Arena::<u32>::new(4).unwrap();

        for value in 0..4 {
            let reference = arena.alloc(value).unwrap();

            let index = usize::try_from(value).unwrap();
            assert!(std::ptr::eq(reference, arena.peek(index).unwrap()));
        }
    }

    #[test]
    fn append_many_exact_fit() {
        let arena = Arena::<u32>::new(3).unwrap();

        let values = arena.append_many(vec![7, 8, 9]).unwrap();

        assert_eq!(values, &[7, 8, 9]);
        assert!(arena.is_full());
    }

    #[test]
    fn append_many_empty_does_not_touch_counter() {
        let arena = Arena::<u32>::new(1).unwrap();
        arena.alloc(1).unwrap();

        // Empty batches succeed even when the arena is full.
        let values = arena.append_many(Vec::new()).unwrap();

        assert!(values.is_empty());
        assert_eq!(arena.issued.load(Ordering::Relaxed), 1);
    }

    /// An iterator that reports a different length than the number of items it yields.
    struct Liar {
        yields: u32,
        reports: usize,
        yielded: Rc<Cell<u32>>,
    }

    impl Iterator for Liar {
        type Item = u32;

        fn next(&mut self) -> Option<u32> {
            let yielded = self.yielded.get();

            if yielded == self.yields {
                return None;
            }

            self.yielded.set(yielded.checked_add(1).unwrap());
            Some(yielded)
        }
    }

    impl ExactSizeIterator for Liar {
        fn len(&self) -> usize {
            self.reports
        }
    }

    #[test]
    fn append_many_short_iterator_places_prefix() {
        let arena = Arena::<u32>::new(8).unwrap();
        let yielded = Rc::new(Cell::new(0));

        let values = arena
            .append_many(Liar {
                yields: 2,
                reports: 5,
                yielded: Rc::clone(&yielded),
            })
            .unwrap();

        assert_eq!(values, &[0, 1]);
        assert_eq!(arena.len(), 5);
        assert_eq!(arena.iter().count(), 2);
        assert!(arena.peek(2).is_none());
    }

    #[test]
    fn append_many_long_iterator_is_not_overconsumed() {
        let arena = Arena::<u32>::new(8).unwrap();
        let yielded = Rc::new(Cell::new(0));

        let values = arena
            .append_many(Liar {
                yields: 5,
                reports: 2,
                yielded: Rc::clone(&yielded),
            })
            .unwrap();

        assert_eq!(values, &[0, 1]);
        assert_eq!(yielded.get(), 2);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn append_many_rejected_iterator_is_untouched() {
        let arena = Arena::<u32>::new(1).unwrap();
        let yielded = Rc::new(Cell::new(0));

        let rejected = arena
            .append_many(Liar {
                yields: 3,
                reports: 3,
                yielded: Rc::clone(&yielded),
            })
            .unwrap_err();

        assert_eq!(yielded.get(), 0);
        assert_eq!(rejected.into_inner().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(arena.is_empty());
    }

    #[test]
    fn reserve_too_many_leaves_counter() {
        let arena = Arena::<u32>::new(3).unwrap();

        _ = arena.reserve(2).unwrap().fill_with(|_| 0);

        let error = arena.reserve(2).unwrap_err();
        assert!(error.is_arena_full());
        assert_eq!(arena.issued.load(Ordering::Relaxed), 2);

        _ = arena.reserve(1).unwrap().fill_with(|_| 0);
        assert!(arena.reserve(1).is_err());
    }

    #[test]
    fn reserve_overflowing_count_is_full_error() {
        let arena = Arena::<u32>::new(3).unwrap();
        arena.alloc(1).unwrap();

        let error = arena.reserve(usize::MAX).unwrap_err();
        assert!(error.is_arena_full());
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn state_transitions() {
        let mut arena = Arena::<u32>::new(2).unwrap();
        assert_eq!(arena.state(), ArenaState::Empty);

        arena.alloc(1).unwrap();
        assert_eq!(arena.state(), ArenaState::PartiallyFilled);

        arena.alloc(2).unwrap();
        assert_eq!(arena.state(), ArenaState::Full);

        _ = arena.alloc(3).unwrap_err();
        assert_eq!(arena.state(), ArenaState::Full);

        arena.reset();
        assert_eq!(arena.state(), ArenaState::Empty);
    }

    #[test]
    fn reset_unpublishes_and_rewinds() {
        let mut arena = Arena::<u32>::new(3).unwrap();

        arena.alloc(1).unwrap();
        arena.alloc(2).unwrap();

        arena.reset();

        assert!(arena.is_empty());
        assert_eq!(arena.remaining(), 3);
        assert!(arena.peek(0).is_none());
        assert!(arena.peek(1).is_none());

        arena.alloc(3).unwrap();
        assert_eq!(arena.peek(0), Some(&3));
    }

    #[test]
    fn reset_drops_values_by_default() {
        let tracker = DropTracker::new();
        let mut arena = Arena::new(4).unwrap();

        arena.alloc(tracker.track(1)).unwrap();
        arena.append_many([tracker.track(2), tracker.track(3)]).unwrap();

        assert_eq!(tracker.dropped(), 0);

        arena.reset();
        assert_eq!(tracker.dropped(), 3);

        // Nothing is dropped twice.
        arena.reset();
        assert_eq!(tracker.dropped(), 3);
    }

    #[test]
    fn reset_forget_policy_leaks() {
        let tracker = DropTracker::new();
        let mut arena = Arena::builder()
            .capacity(2)
            .reset_policy(ResetPolicy::ForgetValues)
            .build()
            .unwrap();

        arena.alloc(tracker.track(1)).unwrap();
        arena.reset();

        assert_eq!(tracker.dropped(), 0);
        assert!(arena.peek(0).is_none());
    }

    #[test]
    fn drop_releases_values() {
        let tracker = DropTracker::new();
        let arena = Arena::new(4).unwrap();

        arena.alloc(tracker.track(1)).unwrap();
        arena.alloc(tracker.track(2)).unwrap();

        drop(arena);

        assert_eq!(tracker.dropped(), 2);
    }

    #[test]
    fn rejected_value_is_not_dropped_by_arena() {
        let tracker = DropTracker::new();
        let arena = Arena::new(1).unwrap();

        arena.alloc(tracker.track(1)).unwrap();
        let rejected = arena.alloc(tracker.track(2)).unwrap_err();

        assert_eq!(tracker.dropped(), 0);

        drop(rejected);
        assert_eq!(tracker.dropped(), 1);

        drop(arena);
        assert_eq!(tracker.dropped(), 2);
    }

    #[test]
    fn zero_sized_items() {
        let mut arena = Arena::<()>::new(2).unwrap();

        arena.alloc(()).unwrap();
        arena.alloc(()).unwrap();
        assert!(arena.alloc(()).is_err());
        assert_eq!(arena.iter().count(), 2);

        arena.reset();
        assert!(arena.peek(0).is_none());
    }

    #[test]
    fn iterates_in_slot_order() {
        let arena = Arena::<&str>::new(4).unwrap();

        arena.alloc("a").unwrap();
        arena.append_many(["b", "c"]).unwrap();

        let collected: Vec<_> = (&arena).into_iter().copied().collect();
        assert_eq!(collected, vec!["a", "b", "c"]);
    }

    #[test]
    fn debug_output_names_item_type() {
        let arena = Arena::<u32>::new(2).unwrap();

        let output = format!("{arena:?}");

        assert!(output.contains("u32"));
        assert!(output.contains("capacity: 2"));
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn concurrent_allocs_get_distinct_slots() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 250;

        with_watchdog(|| {
            let arena = Arena::<usize>::new(THREADS * PER_THREAD).unwrap();
            let barrier = Barrier::new(THREADS);

            thread::scope(|s| {
                for thread_index in 0..THREADS {
                    let arena = &arena;
                    let barrier = &barrier;

                    s.spawn(move || {
                        barrier.wait();

                        for i in 0..PER_THREAD {
                            let value = thread_index * PER_THREAD + i;
                            assert_eq!(*arena.alloc(value).unwrap(), value);
                        }
                    });
                }
            });

            assert!(arena.is_full());

            let mut values: Vec<_> = arena.iter().copied().collect();
            values.sort_unstable();

            assert_eq!(values, (0..THREADS * PER_THREAD).collect::<Vec<_>>());
        });
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn concurrent_overflow_rolls_back() {
        const THREADS: usize = 8;
        const ATTEMPTS: usize = 100;
        const CAPACITY: usize = 64;

        with_watchdog(|| {
            let arena = Arena::<usize>::new(CAPACITY).unwrap();
            let barrier = Barrier::new(THREADS);

            let successes: usize = thread::scope(|s| {
                let handles: Vec<_> = (0..THREADS)
                    .map(|_| {
                        let arena = &arena;
                        let barrier = &barrier;

                        s.spawn(move || {
                            barrier.wait();

                            (0..ATTEMPTS)
                                .filter(|&i| arena.alloc(i).is_ok())
                                .count()
                        })
                    })
                    .collect();

                handles.into_iter().map(|h| h.join().unwrap()).sum()
            });

            assert_eq!(successes, CAPACITY);
            assert_eq!(arena.issued.load(Ordering::Relaxed), CAPACITY);
            assert_eq!(arena.iter().count(), CAPACITY);
        });
    }
}
