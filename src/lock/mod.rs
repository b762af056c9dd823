// Interchangeable mutual-exclusion primitives for the heap nodes and the
// admission lock. The queue picks one variant at compile time through its
// type parameter; all variants share the same minimal contract.

#[cfg(target_os = "linux")]
mod futex;
#[cfg(unix)]
mod pthread;
mod spin;

#[cfg(target_os = "linux")]
pub use futex::FutexLock;
#[cfg(unix)]
pub use pthread::PthreadLock;
pub use spin::{TasBackoffLock, TasLock, TatasLock};

/// Minimal mutual-exclusion contract.
///
/// `lock` blocks until the caller holds the lock, `unlock` releases it.
/// Acquisition is not reentrant. `Default` must produce an unlocked lock
/// so fresh heap levels can be appended in bulk, and an unlocked lock must
/// tolerate being moved (the heap only relocates nodes while no lock in it
/// is held).
pub trait Lock: Default + Send + Sync + 'static {
    fn lock(&self);
    fn unlock(&self);
}
