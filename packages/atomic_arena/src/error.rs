use std::fmt;

use thiserror::Error;

/// Errors that can occur when constructing or allocating from an arena.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The requested capacity cannot be turned into a positive number of slots.
    ///
    /// This is only ever returned at construction time. No arena is created.
    #[error("invalid arena capacity: {problem}")]
    InvalidCapacity {
        /// A human-readable description of the problem.
        problem: String,
    },

    /// The arena does not have enough vacant slots to satisfy the request.
    ///
    /// The arena is left exactly as it was before the failing call. The caller may reset the
    /// arena and retry or fall back to another allocation strategy.
    #[error(
        "arena full: {requested} slot(s) requested but only {available} of {capacity} are vacant"
    )]
    ArenaFull {
        /// Number of slots the failing call asked for.
        requested: usize,

        /// Number of vacant slots at the time the request was evaluated.
        available: usize,

        /// Fixed capacity of the arena.
        capacity: usize,
    },
}

impl Error {
    /// Whether this is an [`Error::ArenaFull`] error.
    #[must_use]
    pub fn is_arena_full(&self) -> bool {
        matches!(self, Self::ArenaFull { .. })
    }

    pub(crate) fn invalid_capacity(problem: impl Into<String>) -> Self {
        Self::InvalidCapacity {
            problem: problem.into(),
        }
    }
}

/// A specialized `Result` type for arena operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;

/// Error returned by arena operations that take ownership of their input.
///
/// The rejected input is handed back to the caller unchanged, so it can be placed somewhere else
/// (typically in an ordinary heap allocation) without having been cloned up front.
///
/// # Examples
///
/// ```
/// use atomic_arena::Arena;
///
/// let arena = Arena::<String>::new(1).unwrap();
/// arena.alloc("first".to_string()).unwrap();
///
/// let rejected = arena.alloc("second".to_string()).unwrap_err();
/// assert!(rejected.error().is_arena_full());
///
/// // Fall back to the heap.
/// let fallback = Box::new(rejected.into_inner());
/// assert_eq!(*fallback, "second");
/// ```
#[derive(Error)]
#[error("{error}")]
pub struct AllocError<V> {
    value: V,
    error: Error,
}

impl<V> AllocError<V> {
    pub(crate) fn new(value: V, error: Error) -> Self {
        Self { value, error }
    }

    /// The reason the input was rejected.
    #[must_use]
    pub fn error(&self) -> &Error {
        &self.error
    }

    /// Returns the rejected input to the caller.
    #[must_use]
    pub fn into_inner(self) -> V {
        self.value
    }

    /// Splits the error into the rejected input and the reason it was rejected.
    #[must_use]
    pub fn into_parts(self) -> (V, Error) {
        (self.value, self.error)
    }
}

impl<V> fmt::Debug for AllocError<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllocError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<V> From<AllocError<V>> for Error {
    fn from(value: AllocError<V>) -> Self {
        value.error
    }
}
