use std::any::type_name;
use std::cell::UnsafeCell;
use std::fmt;
use std::iter;
use std::mem::{self, MaybeUninit};
use std::num::NonZero;
use std::sync::atomic::{self, AtomicPtr, Ordering};
use std::{ptr, slice};

use crate::ResetPolicy;

/// The backing storage of an arena: two parallel fixed-length arrays allocated once.
///
/// * `values` owns the raw value memory. A slot is written by exactly one thread per reset
///   epoch, namely the thread that was issued its index.
/// * `published` holds, for each slot, either null or a pointer to the slot's value. A non-null
///   pointer is stored with release semantics only after the value is fully written, so any
///   thread that loads it with acquire semantics also sees the value.
///
/// The storage itself does not know which slots have been issued - that is the job of the
/// owning arena. All index-taking methods assert that the index is in bounds.
pub(crate) struct Storage<T> {
    values: Box<[UnsafeCell<MaybeUninit<T>>]>,
    published: Box<[AtomicPtr<T>]>,

    reset_policy: ResetPolicy,
}

impl<T> Storage<T> {
    #[must_use]
    pub(crate) fn new(slots: NonZero<usize>, reset_policy: ResetPolicy) -> Self {
        let values = iter::repeat_with(|| UnsafeCell::new(MaybeUninit::uninit()))
            .take(slots.get())
            .collect();

        let published = iter::repeat_with(|| AtomicPtr::new(ptr::null_mut()))
            .take(slots.get())
            .collect();

        Self {
            values,
            published,
            reset_policy,
        }
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub(crate) fn reset_policy(&self) -> ResetPolicy {
        self.reset_policy
    }

    fn slot_ptr(&self, index: usize) -> *mut T {
        let cell = self.values.get(index).unwrap_or_else(|| {
            panic!(
                "slot {index} out of bounds in arena of {} with {} slots",
                type_name::<T>(),
                self.len()
            )
        });

        cell.get().cast::<T>()
    }

    fn range_ptr(&self, start: usize, len: usize) -> *mut MaybeUninit<T> {
        let end = start.checked_add(len);

        assert!(
            end.is_some_and(|end| end <= self.len()),
            "slot range {start}+{len} out of bounds in arena of {} with {} slots",
            type_name::<T>(),
            self.len()
        );

        // SAFETY: The range start is within the array (or one past the end for an empty range
        // at the end), guarded by the assertion above.
        UnsafeCell::raw_get(unsafe { self.values.as_ptr().add(start) })
    }

    /// Writes the value into the slot and publishes it.
    ///
    /// # Safety
    ///
    /// The caller must have been issued `index` in the current epoch and must not have written
    /// to it before. No other thread may access the slot until this call has returned.
    pub(crate) unsafe fn insert(&self, index: usize, value: T) -> &T {
        let slot = self.slot_ptr(index);

        // SAFETY: The slot is exclusively ours (forwarding safety requirements) and the pointer
        // is valid and aligned for a T because it comes from our own value array.
        unsafe {
            slot.write(value);
        }

        self.published
            .get(index)
            .expect("guarded by slot_ptr bounds check")
            .store(slot, Ordering::Release);

        // SAFETY: We just initialized the value. Nobody can mutate or drop it until the
        // next reset, which requires an exclusive reference to the owner of the storage.
        unsafe { &*slot }
    }

    /// Returns a mutable view over uninitialized slots.
    ///
    /// # Safety
    ///
    /// The caller must have been issued the entire range in the current epoch and must ensure
    /// that it holds at most one view over the range at any given time. None of the slots may
    /// have been published.
    pub(crate) unsafe fn uninit_range_mut(
        &self,
        start: usize,
        len: usize,
    ) -> &mut [MaybeUninit<T>] {
        let first = self.range_ptr(start, len);

        // SAFETY: The range is in bounds and exclusively ours (forwarding safety requirements).
        // UnsafeCell permits mutation through a shared reference to the storage.
        unsafe { slice::from_raw_parts_mut(first, len) }
    }

    /// Publishes a range of slots that the caller has filled in place.
    ///
    /// A single release fence covers the whole batch, after which the individual pointers are
    /// stored with relaxed ordering. An acquire load that observes any of them synchronizes
    /// with the fence.
    ///
    /// # Safety
    ///
    /// The caller must have been issued the entire range in the current epoch and must have
    /// initialized every slot in it. The caller must not retain mutable access to the range.
    pub(crate) unsafe fn publish_range(&self, start: usize, len: usize) -> &[T] {
        let first = self.range_ptr(start, len).cast::<T>();

        atomic::fence(Ordering::Release);

        for offset in 0..len {
            // SAFETY: In bounds, guarded by range_ptr.
            let slot = unsafe { first.add(offset) };

            let index = start
                .checked_add(offset)
                .expect("guarded by range_ptr bounds check");

            self.published
                .get(index)
                .expect("guarded by range_ptr bounds check")
                .store(slot, Ordering::Relaxed);
        }

        // SAFETY: Every slot in the range is initialized (forwarding safety requirements).
        unsafe { self.slice(start, len) }
    }

    /// Returns a shared slice over a range of slots.
    ///
    /// # Safety
    ///
    /// Every slot in the range must be initialized and nobody may hold mutable access to it.
    pub(crate) unsafe fn slice(&self, start: usize, len: usize) -> &[T] {
        let first = self.range_ptr(start, len).cast::<T>();

        // SAFETY: In bounds (guarded by range_ptr) and initialized (forwarding safety
        // requirements). Nobody can mutate or drop the values until the next reset.
        unsafe { slice::from_raw_parts(first, len) }
    }

    /// Returns the published value in the slot, if any.
    ///
    /// Out of bounds indexes are treated as never published.
    #[must_use]
    pub(crate) fn peek(&self, index: usize) -> Option<&T> {
        let ptr = self.published.get(index)?.load(Ordering::Acquire);

        // SAFETY: A non-null pointer was stored only after the value was written and the
        // acquire load makes that write visible to us. The value stays alive until the next
        // reset, which requires an exclusive reference to the owner of the storage.
        unsafe { ptr.as_ref() }
    }

    /// Unpublishes the slots `[0, high_water)` and releases their values per the reset policy.
    pub(crate) fn clear(&mut self, high_water: usize) {
        let visits_slots = self.reset_policy.visits_slots::<T>();

        let published = self
            .published
            .get_mut(..high_water)
            .expect("high water mark cannot exceed the number of slots");

        for entry in published {
            let ptr = mem::replace(entry.get_mut(), ptr::null_mut());

            if ptr.is_null() || !visits_slots {
                continue;
            }

            match self.reset_policy {
                ResetPolicy::DropValues => {
                    // SAFETY: The slot was published, so it holds an initialized value, and we
                    // have exclusive access to the storage. We unpublished it above, so the
                    // value cannot be dropped twice.
                    unsafe {
                        ptr.drop_in_place();
                    }
                }
                ResetPolicy::ScrubValues => {
                    // SAFETY: As above.
                    unsafe {
                        ptr.drop_in_place();
                    }

                    // SAFETY: The slot memory is valid for size_of::<T>() bytes of writes and
                    // we have exclusive access to it.
                    unsafe {
                        scrub(ptr);
                    }
                }
                ResetPolicy::ForgetValues => {}
            }
        }
    }
}

/// Overwrites the memory of a dropped value with zero bytes.
///
/// Volatile writes prevent the compiler from eliding stores to memory nobody reads afterwards.
///
/// # Safety
///
/// `ptr` must be valid for writes of `size_of::<T>()` bytes and must not hold a live value.
#[cfg_attr(test, mutants::skip)] // Nothing reads the scrubbed memory through safe code.
unsafe fn scrub<T>(ptr: *mut T) {
    let bytes = ptr.cast::<u8>();

    for offset in 0..size_of::<T>() {
        // SAFETY: In bounds of the value memory (forwarding safety requirements).
        unsafe {
            bytes.add(offset).write_volatile(0);
        }
    }

    atomic::compiler_fence(Ordering::SeqCst);
}

impl<T> fmt::Debug for Storage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("slots", &self.len())
            .field("reset_policy", &self.reset_policy)
            .finish_non_exhaustive()
    }
}

// SAFETY: Shared access to the storage can move values in from other threads (requires Send)
// and hand out shared references to values on other threads (requires Sync). Concurrent writes
// never touch the same slot because the owning arena issues each index to exactly one caller
// per epoch, and publication uses release/acquire ordering.
unsafe impl<T: Send + Sync> Sync for Storage<T> {}
