//! Pause abstraction for the eraser's retry loop.
//!
//! Retries wait for the OS to release a handle. Tests substitute
//! [`MockSleeper`] so exhausting the retry budget costs nothing.

use std::cell::Cell;
use std::time::Duration;

/// Something that can block the calling thread for a while.
pub trait Sleeper {
    fn pause(&self, duration: Duration);
}

/// Blocks with `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealSleeper;

impl RealSleeper {
    pub fn new() -> Self {
        Self
    }
}

impl Sleeper for RealSleeper {
    fn pause(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Returns immediately and counts how often it was asked to pause.
#[derive(Debug, Default)]
pub struct MockSleeper {
    pauses: Cell<u32>,
}

impl MockSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pauses requested so far.
    pub fn pauses(&self) -> u32 {
        self.pauses.get()
    }
}

impl Sleeper for MockSleeper {
    fn pause(&self, _duration: Duration) {
        self.pauses.set(self.pauses.get() + 1);
    }
}

impl<S: Sleeper + ?Sized> Sleeper for &S {
    fn pause(&self, duration: Duration) {
        (**self).pause(duration);
    }
}
