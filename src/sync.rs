#[cfg(not(all(test, feature = "loom")))]
use core::sync::atomic::{Ordering, AtomicU64};
#[cfg(all(not(all(test, feature = "loom")), feature = "singleton"))]
use core::sync::atomic::AtomicU8;
#[cfg(all(not(all(test, feature = "loom")), feature = "singleton"))]
use std::thread::yield_now;

#[cfg(all(test, feature = "loom"))]
use loom::{
    thread::yield_now,
    sync::atomic::{Ordering, AtomicU8, AtomicU64}
};

#[cfg(feature = "singleton")]
use crate::error::LoggerError;

/// Source of log line ids. The first id handed out is 1; ids are never reused.
#[derive(Debug)]
pub(crate) struct SequenceCounter {
    last: AtomicU64,
}

impl SequenceCounter {
    #[cfg(not(all(test, feature = "loom")))]
    pub(crate) const fn new() -> Self {
        Self { last: AtomicU64::new(0) }
    }

    #[cfg(all(test, feature = "loom"))]
    pub(crate) fn new() -> Self {
        Self { last: AtomicU64::new(0) }
    }

    #[inline]
    pub(crate) fn next(&self) -> u64 {
        self.last.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn last(&self) -> u64 {
        self.last.load(Ordering::Relaxed)
    }
}

#[cfg(feature = "singleton")]
enum LazyState {
    Unloaded = 0,
    Locked = 1,
    Ready = 2
}

/// A value built on first use and shared for the rest of the process.
///
/// If the initializer fails or panics the cell goes back to unloaded and the next caller
/// retries.
#[cfg(feature = "singleton")]
pub(crate) struct Lazy<T> {
    inner: core::cell::UnsafeCell<Option<T>>,
    state: AtomicU8,
}

#[cfg(feature = "singleton")]
impl<T> Lazy<T> {
    #[cfg(not(all(test, feature = "loom")))]
    pub(crate) const fn new() -> Self {
        Self {
            inner: core::cell::UnsafeCell::new(None),
            state: AtomicU8::new(LazyState::Unloaded as u8),
        }
    }

    #[cfg(all(test, feature = "loom"))]
    pub(crate) fn new() -> Self {
        Self {
            inner: core::cell::UnsafeCell::new(None),
            state: AtomicU8::new(LazyState::Unloaded as u8),
        }
    }

    pub(crate) fn get_or_init<F>(&self, init: F) -> Result<&T, LoggerError>
    where
        F: FnOnce() -> Result<T, LoggerError>,
    {
        loop {
            if self.state.load(Ordering::Acquire) == LazyState::Ready as u8 {
                // SAFETY: `inner` is only written while the state is `Locked`, and never
                // again once `Ready` has been published.
                unsafe {
                    return (*self.inner.get()).as_ref().ok_or(LoggerError::Poisoned);
                }
            }

            match self.state.compare_exchange(
                LazyState::Unloaded as u8,
                LazyState::Locked as u8,
                Ordering::Acquire,
                Ordering::Relaxed
            ) {
                Ok(_) => {
                    // Dropped without `disarm` on an error or a panic in `init`.
                    let guard = UnloadOnDrop { state: &self.state };
                    let value = init()?;

                    // SAFETY: winning the exchange gives exclusive access until `Ready`.
                    unsafe {
                        *self.inner.get() = Some(value);
                    }

                    guard.disarm();
                    self.state.store(LazyState::Ready as u8, Ordering::Release);

                    // SAFETY: written just above by this thread.
                    unsafe {
                        return (*self.inner.get()).as_ref().ok_or(LoggerError::Poisoned);
                    }
                }
                Err(_) => {
                    // Another thread is initializing; wait for it to publish or give up.
                    while self.state.load(Ordering::Acquire) == LazyState::Locked as u8 {
                        yield_now();
                    }
                }
            }
        }
    }
}

#[cfg(feature = "singleton")]
unsafe impl<T: Send + Sync> Sync for Lazy<T> {}

/// Puts a `Lazy` back to `Unloaded` unless initialization got through.
#[cfg(feature = "singleton")]
struct UnloadOnDrop<'a> {
    state: &'a AtomicU8,
}

#[cfg(feature = "singleton")]
impl UnloadOnDrop<'_> {
    fn disarm(self) {
        core::mem::forget(self);
    }
}

#[cfg(feature = "singleton")]
impl Drop for UnloadOnDrop<'_> {
    fn drop(&mut self) {
        self.state.store(LazyState::Unloaded as u8, Ordering::Release);
    }
}
