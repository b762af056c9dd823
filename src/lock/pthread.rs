// Thin wrapper around the platform mutex, the baseline the spin variants
// are measured against.

use std::cell::UnsafeCell;

use nix::libc;

use super::Lock;

pub struct PthreadLock {
    inner: UnsafeCell<libc::pthread_mutex_t>,
}

unsafe impl Send for PthreadLock {}
unsafe impl Sync for PthreadLock {}

impl Default for PthreadLock {
    fn default() -> Self {
        PthreadLock {
            inner: UnsafeCell::new(libc::PTHREAD_MUTEX_INITIALIZER),
        }
    }
}

impl Lock for PthreadLock {
    #[inline]
    fn lock(&self) {
        let rc = unsafe { libc::pthread_mutex_lock(self.inner.get()) };
        debug_assert_eq!(rc, 0);
    }

    #[inline]
    fn unlock(&self) {
        let rc = unsafe { libc::pthread_mutex_unlock(self.inner.get()) };
        debug_assert_eq!(rc, 0);
    }
}
