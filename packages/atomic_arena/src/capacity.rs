use std::alloc::Layout;
use std::any::type_name;
use std::num::NonZero;
use std::sync::atomic::AtomicPtr;

use crate::{Error, Result};

/// How many slots an arena has, expressed either directly or as a memory budget.
///
/// The capacity of an arena is fixed at construction time. A byte budget is converted to a slot
/// count by dividing it by the size of the item type, rounding down.
///
/// # Examples
///
/// ```
/// use atomic_arena::Capacity;
///
/// assert_eq!(Capacity::Elements(10).slot_count::<u64>().unwrap().get(), 10);
/// assert_eq!(Capacity::Bytes(100).slot_count::<u64>().unwrap().get(), 12);
///
/// assert!(Capacity::Elements(0).slot_count::<u64>().is_err());
/// assert!(Capacity::Bytes(4).slot_count::<u64>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Capacity {
    /// A fixed number of slots.
    Elements(usize),

    /// A memory budget for the value storage, in bytes.
    Bytes(usize),
}

impl Capacity {
    /// Converts the capacity into the number of slots an arena of `T` will have.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if the result would be zero slots, if a byte budget is
    /// used with a zero-sized `T` or if the storage for that many slots cannot be laid out in
    /// memory.
    pub fn slot_count<T>(self) -> Result<NonZero<usize>> {
        let slots = match self {
            Self::Elements(count) => count,
            Self::Bytes(bytes) => {
                let item_size = size_of::<T>();

                if item_size == 0 {
                    return Err(Error::invalid_capacity(format!(
                        "a byte budget cannot be applied to zero-sized {}",
                        type_name::<T>()
                    )));
                }

                bytes
                    .checked_div(item_size)
                    .expect("guarded by zero size check above")
            }
        };

        let Some(slots) = NonZero::new(slots) else {
            return Err(Error::invalid_capacity(format!(
                "{self:?} yields no slots for {} of {} bytes",
                type_name::<T>(),
                size_of::<T>()
            )));
        };

        // Both parallel arrays must be representable, otherwise we cannot pre-allocate them.
        if Layout::array::<T>(slots.get()).is_err()
            || Layout::array::<AtomicPtr<T>>(slots.get()).is_err()
        {
            return Err(Error::invalid_capacity(format!(
                "{slots} slots of {} exceed the addressable memory size",
                type_name::<T>()
            )));
        }

        Ok(slots)
    }
}

impl From<NonZero<usize>> for Capacity {
    fn from(value: NonZero<usize>) -> Self {
        Self::Elements(value.get())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use new_zealand::nz;

    use super::*;

    #[test]
    fn elements_are_taken_as_is() {
        assert_eq!(Capacity::Elements(1).slot_count::<u8>().unwrap().get(), 1);
        assert_eq!(
            Capacity::Elements(1000).slot_count::<[u8; 64]>().unwrap().get(),
            1000
        );
    }

    #[test]
    fn zero_elements_is_invalid() {
        let error = Capacity::Elements(0).slot_count::<u32>().unwrap_err();

        assert!(matches!(error, Error::InvalidCapacity { .. }));
    }

    #[test]
    fn bytes_round_down_to_whole_items() {
        assert_eq!(Capacity::Bytes(16).slot_count::<u32>().unwrap().get(), 4);
        assert_eq!(Capacity::Bytes(19).slot_count::<u32>().unwrap().get(), 4);
        assert_eq!(Capacity::Bytes(20).slot_count::<u32>().unwrap().get(), 5);
    }

    #[test]
    fn bytes_below_one_item_is_invalid() {
        let error = Capacity::Bytes(7).slot_count::<u64>().unwrap_err();

        assert!(matches!(error, Error::InvalidCapacity { .. }));
    }

    #[test]
    fn bytes_for_zero_sized_is_invalid() {
        let error = Capacity::Bytes(1024).slot_count::<()>().unwrap_err();

        assert!(matches!(error, Error::InvalidCapacity { .. }));
    }

    #[test]
    fn elements_for_zero_sized_is_fine() {
        assert_eq!(Capacity::Elements(8).slot_count::<()>().unwrap().get(), 8);
    }

    #[test]
    fn unaddressable_is_invalid() {
        let error = Capacity::Elements(usize::MAX)
            .slot_count::<u64>()
            .unwrap_err();

        assert!(matches!(error, Error::InvalidCapacity { .. }));
    }

    #[test]
    fn from_non_zero() {
        let capacity = Capacity::from(nz!(42_usize));

        assert_eq!(capacity, Capacity::Elements(42));
    }
}
