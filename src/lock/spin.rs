use std::hint;
use std::sync::atomic::{AtomicBool, Ordering};

use super::Lock;

// Upper bound on the backoff delay, in pause iterations.
const BACKOFF_LIMIT: usize = 1 << 16;

/// Test-and-set lock: busy-loops on the atomic exchange itself.
#[derive(Default)]
pub struct TasLock {
    locked: AtomicBool,
}

impl Lock for TasLock {
    #[inline]
    fn lock(&self) {
        while self.locked.swap(true, Ordering::Acquire) {
            hint::spin_loop();
        }
    }

    #[inline]
    fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }
}

/// Test-and-test-and-set lock: waits on plain loads and only retries the
/// exchange once the word reads free, keeping the cache line shared while
/// spinning.
#[derive(Default)]
pub struct TatasLock {
    locked: AtomicBool,
}

impl Lock for TatasLock {
    #[inline]
    fn lock(&self) {
        loop {
            if !self.locked.swap(true, Ordering::Acquire) {
                return;
            }
            while self.locked.load(Ordering::Relaxed) {
                hint::spin_loop();
            }
        }
    }

    #[inline]
    fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }
}

/// Test-and-set with exponential backoff: every failed exchange doubles a
/// local delay spent in pause hints before the next attempt.
#[derive(Default)]
pub struct TasBackoffLock {
    locked: AtomicBool,
}

impl Lock for TasBackoffLock {
    #[inline]
    fn lock(&self) {
        let mut delay = 1usize;
        while self.locked.swap(true, Ordering::Acquire) {
            for _ in 0..delay {
                hint::spin_loop();
            }
            if delay < BACKOFF_LIMIT {
                delay <<= 1;
            }
        }
    }

    #[inline]
    fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }
}
