use std::any::type_name;
use std::fmt;
use std::mem::MaybeUninit;

use crate::Storage;

/// A contiguous range of arena slots exclusively owned by the caller, to be filled in place.
///
/// Returned by [`Arena::reserve()`][1]. The slots in the range are not visible to
/// [`Arena::peek()`][2] or to any other thread until the reservation is completed via one of:
///
/// * [`fill_with()`][3] - fills every slot from a closure.
/// * [`clone_from_slice()`][4] - fills every slot by cloning from a slice.
/// * [`assume_init()`][5] - for callers who filled the slots themselves through
///   [`as_uninit_mut()`][6] or [`write()`][7].
///
/// Completion publishes the whole range with a single release fence and turns the reservation
/// into a shared slice. This is the synchronizing handoff that makes the values safe to read from
/// other threads.
///
/// If a reservation is dropped without being completed, its slots remain unpublished until the
/// arena is reset. Any values already written into it are leaked (their destructors never run).
///
/// # Examples
///
/// ```
/// use atomic_arena::Arena;
///
/// let arena = Arena::<u64>::new(8).unwrap();
///
/// let mut reservation = arena.reserve(3).unwrap();
/// assert_eq!(reservation.start(), 0);
///
/// for (offset, slot) in reservation.as_uninit_mut().iter_mut().enumerate() {
///     slot.write(offset as u64 * 100);
/// }
///
/// // SAFETY: We initialized every slot above.
/// let values = unsafe { reservation.assume_init() };
///
/// assert_eq!(values, &[0, 100, 200]);
/// assert_eq!(arena.peek(2), Some(&200));
/// ```
///
/// [1]: crate::Arena::reserve
/// [2]: crate::Arena::peek
/// [3]: Self::fill_with
/// [4]: Self::clone_from_slice
/// [5]: Self::assume_init
/// [6]: Self::as_uninit_mut
/// [7]: Self::write
#[must_use = "the reserved slots stay unusable until the arena is reset"]
pub struct Reservation<'a, T> {
    storage: &'a Storage<T>,
    start: usize,
    len: usize,
}

impl<'a, T> Reservation<'a, T> {
    /// # Safety
    ///
    /// The range must have been issued to the caller in the current epoch and never handed out
    /// before.
    pub(crate) unsafe fn new(storage: &'a Storage<T>, start: usize, len: usize) -> Self {
        Self {
            storage,
            start,
            len,
        }
    }

    /// Index of the first reserved slot.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of reserved slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the reservation covers zero slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Zero-copy mutable view over the reserved slots.
    ///
    /// The slots start out uninitialized. Writing to a slot that was already written leaks the
    /// previous value.
    #[must_use]
    pub fn as_uninit_mut(&mut self) -> &mut [MaybeUninit<T>] {
        // SAFETY: The range was issued to us exclusively and the view borrows `self` mutably,
        // so there is only ever one view at a time. Nothing in the range is published yet.
        unsafe { self.storage.uninit_range_mut(self.start, self.len) }
    }

    /// Writes a value into the slot at `offset` within the reservation.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is not less than [`len()`][Self::len].
    pub fn write(&mut self, offset: usize, value: T) -> &mut T {
        let len = self.len;

        self.as_uninit_mut()
            .get_mut(offset)
            .unwrap_or_else(|| {
                panic!(
                    "offset {offset} out of bounds in reservation of {len} slots of {}",
                    type_name::<T>()
                )
            })
            .write(value)
    }

    /// Fills every slot with the value returned by `f` for its offset, then publishes the range.
    ///
    /// If `f` panics, the reservation is abandoned and values written so far are leaked.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_arena::Arena;
    ///
    /// let arena = Arena::<String>::new(4).unwrap();
    ///
    /// let names = arena
    ///     .reserve(2)
    ///     .unwrap()
    ///     .fill_with(|offset| format!("item-{offset}"));
    ///
    /// assert_eq!(names, ["item-0", "item-1"]);
    /// ```
    pub fn fill_with(mut self, mut f: impl FnMut(usize) -> T) -> &'a [T] {
        for (offset, slot) in self.as_uninit_mut().iter_mut().enumerate() {
            slot.write(f(offset));
        }

        // SAFETY: We initialized every slot above.
        unsafe { self.assume_init() }
    }

    /// Fills the slots with clones of the items in `source`, then publishes the range.
    ///
    /// # Panics
    ///
    /// Panics if `source` does not have exactly [`len()`][Self::len] items.
    pub fn clone_from_slice(self, source: &[T]) -> &'a [T]
    where
        T: Clone,
    {
        assert_eq!(
            source.len(),
            self.len,
            "source slice length must match the reservation length"
        );

        let mut source = source.iter();

        self.fill_with(|_| {
            source
                .next()
                .expect("guarded by length assertion above")
                .clone()
        })
    }

    /// Publishes the range and returns the values as a shared slice.
    ///
    /// # Safety
    ///
    /// Every slot in the reservation must have been initialized through
    /// [`as_uninit_mut()`][Self::as_uninit_mut] or [`write()`][Self::write].
    pub unsafe fn assume_init(self) -> &'a [T] {
        // SAFETY: The range is ours, every slot is initialized (forwarding safety requirements)
        // and consuming `self` ends our mutable access.
        unsafe { self.storage.publish_range(self.start, self.len) }
    }
}

impl<T> fmt::Debug for Reservation<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reservation")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("start", &self.start)
            .field("len", &self.len)
            .finish()
    }
}
