pub mod counter;
pub mod lock;

mod hunt_queue;
mod node;

pub use counter::{BitReversedCounter, LinearCounter, SlotCounter};
pub use hunt_queue::HuntQueue;
#[cfg(target_os = "linux")]
pub use lock::FutexLock;
#[cfg(unix)]
pub use lock::PthreadLock;
pub use lock::{Lock, TasBackoffLock, TasLock, TatasLock};

// Common interface for all concurrent priority queues.
pub trait ConcurrentPriorityQueue<T: Send>: Send + Sync {
    // Inserts `value` under the given priority. Higher priorities pop first.
    fn insert(&self, value: T, priority: usize);

    // Removes the payload of some element whose priority is maximal among
    // the settled elements, or `None` when the queue is observed empty.
    fn pop_max(&self) -> Option<T>;

    /// Current element count. Advisory while operations are in flight.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
