use std::mem;

/// Determines what happens to stored values when an arena is reset or dropped.
///
/// Resetting an arena always unpublishes every slot, so the values become unreachable through the
/// arena. The policy decides whether the values themselves are also released.
///
/// By default, the arena drops its values.
///
/// # Examples
///
/// ```
/// use atomic_arena::{Arena, ResetPolicy};
///
/// // Frame-local plain data does not need its destructors run.
/// let arena = Arena::<[f32; 4]>::builder()
///     .capacity(1024)
///     .reset_policy(ResetPolicy::ForgetValues)
///     .build()
///     .unwrap();
///
/// assert_eq!(arena.reset_policy(), ResetPolicy::ForgetValues);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ResetPolicy {
    /// Every published value is dropped in place. This is the default.
    #[default]
    DropValues,

    /// Every published value is dropped in place and the slot memory is then overwritten with
    /// zero bytes.
    ///
    /// This may be valuable if the values contain sensitive data that should not linger in memory
    /// until the slot happens to be reused.
    ScrubValues,

    /// Only the publication layer is cleared; values are never dropped.
    ///
    /// This is the cheapest policy when the item type owns no resources. If the item type does
    /// own resources (heap memory, handles), those resources are leaked.
    ForgetValues,
}

impl ResetPolicy {
    /// Whether resetting under this policy needs to visit each previously published slot.
    #[must_use]
    pub(crate) fn visits_slots<T>(self) -> bool {
        match self {
            Self::DropValues => mem::needs_drop::<T>(),
            Self::ScrubValues => mem::needs_drop::<T>() || size_of::<T>() > 0,
            Self::ForgetValues => false,
        }
    }
}
