/// Fill level of a fail-on-full arena, derived from the number of slots issued since the last
/// reset.
///
/// A successful allocation moves an arena from `Empty` toward `Full`. A failed allocation leaves
/// the state unchanged. A reset moves an arena in any state back to `Empty`. There is no terminal
/// state - the arena can be reused indefinitely.
///
/// # Examples
///
/// ```
/// use atomic_arena::{Arena, ArenaState};
///
/// let mut arena = Arena::<u8>::new(2).unwrap();
/// assert_eq!(arena.state(), ArenaState::Empty);
///
/// arena.alloc(1).unwrap();
/// assert_eq!(arena.state(), ArenaState::PartiallyFilled);
///
/// arena.alloc(2).unwrap();
/// assert_eq!(arena.state(), ArenaState::Full);
///
/// arena.reset();
/// assert_eq!(arena.state(), ArenaState::Empty);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ArenaState {
    /// No slots have been issued.
    Empty,

    /// Some but not all slots have been issued.
    PartiallyFilled,

    /// Every slot has been issued. Every further allocation fails until the arena is reset.
    Full,
}

impl ArenaState {
    #[must_use]
    pub(crate) fn from_issued(issued: usize, capacity: usize) -> Self {
        if issued == 0 {
            Self::Empty
        } else if issued < capacity {
            Self::PartiallyFilled
        } else {
            Self::Full
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn derived_from_issued_count() {
        assert_eq!(ArenaState::from_issued(0, 3), ArenaState::Empty);
        assert_eq!(ArenaState::from_issued(1, 3), ArenaState::PartiallyFilled);
        assert_eq!(ArenaState::from_issued(2, 3), ArenaState::PartiallyFilled);
        assert_eq!(ArenaState::from_issued(3, 3), ArenaState::Full);

        // A failing allocation may transiently push the counter past capacity.
        assert_eq!(ArenaState::from_issued(4, 3), ArenaState::Full);
    }
}
