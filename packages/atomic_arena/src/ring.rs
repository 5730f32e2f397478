use std::any::type_name;
use std::fmt;
use std::num::NonZero;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use arc_swap::ArcSwapOption;
use tracing::{debug, trace};

use crate::{Capacity, Result};

/// A fixed-capacity arena that never fails to allocate. Once every slot has been used, each new
/// value overwrites the oldest one.
///
/// Every allocation takes the next number from an atomic sequence counter and stores the value in
/// slot `sequence % capacity`. Because a value may be overwritten while some thread still looks
/// at it, values are handed out as [`Arc<T>`] rather than as plain references - a reader that
/// holds on to an overwritten value keeps it alive, while the arena itself moves on.
///
/// This makes the ring arena a good fit for "last N things" buffers, such as recent log records
/// or recent frames, where losing the oldest entries under pressure is preferable to failing.
///
/// Unlike [`Arena`][crate::Arena], each value still lives in its own reference-counted heap
/// allocation. What the ring arena bounds is the number of values it retains.
///
/// # Examples
///
/// ```
/// use atomic_arena::RingArena;
///
/// let ring = RingArena::<u32>::new(3).unwrap();
///
/// for value in 0..5 {
///     ring.alloc(value);
/// }
///
/// // Values 0 and 1 were overwritten by 3 and 4.
/// assert_eq!(ring.peek(0).as_deref(), Some(&3));
/// assert_eq!(ring.peek(1).as_deref(), Some(&4));
/// assert_eq!(ring.peek(2).as_deref(), Some(&2));
///
/// // Indexes wrap around the capacity.
/// assert_eq!(ring.peek(5).as_deref(), Some(&2));
///
/// assert_eq!(ring.len(), 3);
/// assert_eq!(ring.total_allocated(), 5);
/// ```
pub struct RingArena<T> {
    slots: Box<[ArcSwapOption<T>]>,

    /// Number of values allocated since the last reset. The next value goes into the slot at
    /// `sequence % capacity`.
    sequence: AtomicUsize,

    capacity: NonZero<usize>,
}

impl<T> RingArena<T> {
    /// Creates a ring arena that retains the most recent `capacity` values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`][crate::Error::InvalidCapacity] if `capacity` is zero or
    /// too large to allocate.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_capacity(Capacity::Elements(capacity))
    }

    /// Creates a ring arena with the number of slots derived from `capacity`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`][crate::Error::InvalidCapacity] if the capacity does not
    /// resolve to a positive number of slots that can be allocated.
    pub fn with_capacity(capacity: Capacity) -> Result<Self> {
        let slots = capacity.slot_count::<T>()?;

        debug!(
            item_type = type_name::<T>(),
            capacity = slots.get(),
            "ring arena constructed"
        );

        Ok(Self {
            slots: (0..slots.get())
                .map(|_| ArcSwapOption::const_empty())
                .collect(),
            sequence: AtomicUsize::new(0),
            capacity: slots,
        })
    }

    /// The fixed number of slots in the arena.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// The number of slots that have been filled since the arena was created or last reset.
    ///
    /// This never exceeds [`capacity()`][Self::capacity].
    #[must_use]
    pub fn len(&self) -> usize {
        self.total_allocated().min(self.capacity.get())
    }

    /// Whether nothing has been allocated since the arena was created or last reset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_allocated() == 0
    }

    /// The number of values allocated since the arena was created or last reset, including those
    /// that have since been overwritten.
    #[must_use]
    pub fn total_allocated(&self) -> usize {
        self.sequence.load(Ordering::Relaxed)
    }

    fn slot(&self, sequence: usize) -> &ArcSwapOption<T> {
        self.slots
            .get(sequence % self.capacity)
            .expect("the remainder is always less than the number of slots")
    }

    /// Stores a value in the next slot, overwriting the oldest value once the arena has wrapped
    /// around.
    ///
    /// The overwritten value is released by the arena but stays alive for as long as anyone else
    /// holds an [`Arc`] to it.
    pub fn alloc(&self, value: T) -> Arc<T> {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);

        let value = Arc::new(value);
        self.slot(sequence).store(Some(Arc::clone(&value)));

        value
    }

    /// Stores a batch of values in consecutive slots.
    ///
    /// The sequence range for the whole batch is claimed with a single atomic operation, so the
    /// batch is never interleaved with values from other threads. If the batch is larger than the
    /// capacity, the later values in the batch overwrite the earlier ones, though every value is
    /// still returned to the caller.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_arena::RingArena;
    ///
    /// let ring = RingArena::<char>::new(4).unwrap();
    ///
    /// let values = ring.append_many(['a', 'b', 'c']);
    /// assert_eq!(values.len(), 3);
    ///
    /// assert_eq!(ring.peek(2).as_deref(), Some(&'c'));
    /// ```
    pub fn append_many<I>(&self, values: I) -> Vec<Arc<T>>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let values = values.into_iter();
        let count = values.len();

        if count == 0 {
            return Vec::new();
        }

        let start = self.sequence.fetch_add(count, Ordering::Relaxed);

        // We trust the length we claimed for, not the iterator, which may lie about its length.
        values
            .take(count)
            .enumerate()
            .map(|(offset, value)| {
                let value = Arc::new(value);
                self.slot(start.wrapping_add(offset))
                    .store(Some(Arc::clone(&value)));
                value
            })
            .collect()
    }

    /// Returns the value currently stored in the slot at `index % capacity`, if any.
    #[must_use]
    pub fn peek(&self, index: usize) -> Option<Arc<T>> {
        self.slot(index).load_full()
    }

    /// Returns the retained values from oldest to newest.
    ///
    /// If other threads are allocating at the same time, the snapshot may include values newer
    /// than the point at which the snapshot started.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_arena::RingArena;
    ///
    /// let ring = RingArena::<u32>::new(2).unwrap();
    /// ring.append_many([1, 2, 3]);
    ///
    /// let recent: Vec<u32> = ring.snapshot().iter().map(|value| **value).collect();
    /// assert_eq!(recent, [2, 3]);
    /// ```
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        let end = self.total_allocated();
        let start = end.saturating_sub(self.capacity.get());

        (start..end)
            .filter_map(|sequence| self.slot(sequence).load_full())
            .collect()
    }

    /// Releases every retained value and rewinds the sequence counter.
    ///
    /// Values still held by callers stay alive until the last [`Arc`] to them is dropped.
    pub fn reset(&mut self) {
        let touched = self.len();

        trace!(
            item_type = type_name::<T>(),
            touched,
            total_allocated = self.total_allocated(),
            "resetting ring arena"
        );

        #[expect(
            clippy::indexing_slicing,
            reason = "len() never exceeds the number of slots"
        )]
        let touched_slots = &self.slots[..touched];

        for slot in touched_slots {
            slot.store(None);
        }

        *self.sequence.get_mut() = 0;
    }
}

impl<T> fmt::Debug for RingArena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingArena")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("capacity", &self.capacity)
            .field("total_allocated", &self.total_allocated())
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::cell::Cell;
    use std::thread;

    use static_assertions::{assert_impl_all, assert_not_impl_any};
    use testing::{DropTracker, with_watchdog};

    use super::*;

    assert_impl_all!(RingArena<u32>: Send, Sync);
    assert_not_impl_any!(RingArena<Cell<u32>>: Send, Sync);

    #[test]
    fn zero_capacity_is_error() {
        RingArena::<u32>::new(0).unwrap_err();
    }

    #[test]
    fn never_fails_and_overwrites_oldest() {
        let ring = RingArena::<u32>::new(2).unwrap();

        assert!(ring.is_empty());

        let first = ring.alloc(1);
        ring.alloc(2);
        ring.alloc(3);

        assert_eq!(ring.len(), 2);
        assert_eq!(ring.total_allocated(), 3);
        assert_eq!(ring.peek(0).as_deref(), Some(&3));
        assert_eq!(ring.peek(1).as_deref(), Some(&2));

        // The overwritten value is still alive for whoever holds it.
        assert_eq!(*first, 1);
        assert_eq!(Arc::strong_count(&first), 1);
    }

    #[test]
    fn overwritten_values_are_released() {
        let tracker = DropTracker::new();
        let ring = RingArena::new(1).unwrap();

        drop(ring.alloc(tracker.track(1)));
        assert_eq!(tracker.dropped(), 0);

        drop(ring.alloc(tracker.track(2)));
        assert_eq!(tracker.dropped(), 1);
    }

    #[test]
    fn append_many_larger_than_capacity() {
        let ring = RingArena::<u32>::new(3).unwrap();

        let values = ring.append_many(0..5);

        assert_eq!(values.len(), 5);
        assert_eq!(ring.total_allocated(), 5);

        let retained: Vec<u32> = ring.snapshot().iter().map(|value| **value).collect();
        assert_eq!(retained, [2, 3, 4]);
    }

    #[test]
    fn append_many_empty_is_noop() {
        let ring = RingArena::<u32>::new(3).unwrap();

        assert!(ring.append_many(Vec::new()).is_empty());
        assert!(ring.is_empty());
    }

    #[test]
    fn reset_releases_and_rewinds() {
        let tracker = DropTracker::new();
        let mut ring = RingArena::new(4).unwrap();

        ring.append_many([tracker.track(1), tracker.track(2)]);
        let kept = ring.alloc(tracker.track(3));

        ring.reset();

        assert!(ring.is_empty());
        assert!(ring.peek(0).is_none());
        assert_eq!(tracker.dropped(), 2);

        drop(kept);
        assert_eq!(tracker.dropped(), 3);

        ring.alloc(tracker.track(4));
        assert_eq!(ring.peek(0).map(|value| *value.value()), Some(4));
    }

    #[test]
    fn debug_output() {
        let ring = RingArena::<u8>::new(2).unwrap();
        ring.alloc(1);

        let output = format!("{ring:?}");

        assert!(output.contains("u8"));
        assert!(output.contains("total_allocated: 1"));
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn concurrent_batches_are_not_interleaved() {
        const THREADS: usize = 4;
        const BATCH: usize = 8;

        with_watchdog(|| {
            let ring = RingArena::<(usize, usize)>::new(THREADS * BATCH).unwrap();

            thread::scope(|s| {
                for thread_index in 0..THREADS {
                    let ring = &ring;
                    s.spawn(move || {
                        ring.append_many((0..BATCH).map(|offset| (thread_index, offset)));
                    });
                }
            });

            assert_eq!(ring.total_allocated(), THREADS * BATCH);

            let values = ring.snapshot();

            for batch in values.chunks(BATCH) {
                let owner = batch[0].0;

                for (offset, value) in batch.iter().enumerate() {
                    assert_eq!(**value, (owner, offset));
                }
            }
        });
    }
}
