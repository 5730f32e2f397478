#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))] // This is all test code, no need to test it.

//! Private helpers for testing and examples in `atomic_arena`.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// How long a test may run before the watchdog fails it.
///
/// Miri is dramatically slower for thread synchronization, so it gets a longer timeout to avoid
/// false positives while still catching real hangs.
const WATCHDOG_TIMEOUT: Duration = if cfg!(miri) {
    Duration::from_secs(60)
} else {
    Duration::from_secs(10)
};

/// Runs a test with a timeout to prevent infinite hangs.
///
/// The test closure runs on a separate thread. If it takes longer than the timeout to complete,
/// the calling thread panics so that a deadlocked arena fails the test instead of hanging CI.
///
/// When the `MUTATION_TESTING` environment variable is set to "1", the watchdog is disabled and
/// the test function is executed directly. This allows mutation testing to properly detect
/// hanging mutations.
///
/// # Panics
///
/// Panics if the test exceeds the timeout (when not in mutation testing mode) and resumes the
/// panic of the test thread if the test itself panics.
///
/// # Example
///
/// ```rust
/// use testing::with_watchdog;
///
/// with_watchdog(|| {
///     // Your test code here
///     assert_eq!(2 + 2, 4);
/// });
/// ```
#[cfg_attr(test, mutants::skip)] // Mutating the timeout handling only produces hangs.
pub fn with_watchdog<F, R>(test_fn: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    if std::env::var("MUTATION_TESTING").as_deref() == Ok("1") {
        return test_fn();
    }

    let (tx, rx) = mpsc::channel();

    let test_handle = thread::spawn(move || {
        let result = test_fn();
        // If this fails, the receiver has already timed out.
        drop(tx.send(result));
    });

    match rx.recv_timeout(WATCHDOG_TIMEOUT) {
        Ok(result) => {
            test_handle.join().expect("test thread should not panic");
            result
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            panic!("test exceeded {WATCHDOG_TIMEOUT:?} timeout");
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => match test_handle.join() {
            Ok(()) => panic!("test thread disconnected unexpectedly"),
            Err(e) => std::panic::resume_unwind(e),
        },
    }
}

/// Counts how many of the values it has handed out have been dropped.
///
/// Used to verify that arenas drop (or deliberately do not drop) the values they hold.
///
/// # Example
///
/// ```rust
/// use testing::DropTracker;
///
/// let tracker = DropTracker::new();
///
/// let a = tracker.track("a");
/// let b = tracker.track("b");
///
/// drop(a);
/// assert_eq!(tracker.dropped(), 1);
///
/// std::mem::forget(b);
/// assert_eq!(tracker.dropped(), 1);
/// ```
#[derive(Debug, Default)]
pub struct DropTracker {
    dropped: Arc<AtomicUsize>,
}

impl DropTracker {
    /// Creates a tracker that has not seen any drops yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a value so that dropping it is counted by this tracker.
    #[must_use]
    pub fn track<V>(&self, value: V) -> Tracked<V> {
        Tracked {
            value,
            dropped: Arc::clone(&self.dropped),
        }
    }

    /// The number of tracked values dropped so far.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::SeqCst)
    }
}

/// A value whose drop is counted by the [`DropTracker`] that created it.
pub struct Tracked<V> {
    value: V,
    dropped: Arc<AtomicUsize>,
}

impl<V> Tracked<V> {
    /// The wrapped value.
    #[must_use]
    pub fn value(&self) -> &V {
        &self.value
    }
}

impl<V> Drop for Tracked<V> {
    fn drop(&mut self) {
        self.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

impl<V: fmt::Debug> fmt::Debug for Tracked<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Tracked").field(&self.value).finish()
    }
}

impl<V: PartialEq> PartialEq for Tracked<V> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}
