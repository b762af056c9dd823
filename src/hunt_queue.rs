// Array-based concurrent priority queue with one lock per heap node, after
// Hunt et al., "An efficient algorithm for concurrent priority queue
// heaps" (1996).
//
// The heap is a one-based array of lock-guarded nodes. A single admission
// lock serializes the slot counter and the hand-over of a slot to the
// admitted operation; past admission, threads synchronize only through
// lock coupling on the nodes of one root-to-leaf path. Inserts bubble up
// from a fresh leaf picked in bit-reversed order, deletes move the bottom
// element into the root and sift it down. The structure is not
// linearizable: its contract is that the heap is a correct max-heap at
// quiescence, and that each pop returns a maximal settled element as of
// its admission.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicI32, AtomicU64, AtomicUsize, Ordering};

use crossbeam_utils::{Backoff, CachePadded};

use crate::counter::{BitReversedCounter, SlotCounter};
use crate::lock::{Lock, TatasLock};
use crate::node::{Node, Tag};
use crate::ConcurrentPriorityQueue;

const ROOT: usize = 1;

pub struct HuntQueue<T, L = TatasLock, C = BitReversedCounter>
where
    L: Lock,
    C: SlotCounter,
{
    // One-based heap; index 0 is an unused sentinel. The array length is
    // always a power of two. Growth relocates nodes, so it only happens
    // while no other thread is past admission.
    heap: UnsafeCell<Vec<Node<T, L>>>,
    // Guarded by `admission`.
    counter: UnsafeCell<C>,
    // Mirror of counter.size() for lock-free len(); advisory under
    // contention.
    len: CachePadded<AtomicUsize>,
    admission: CachePadded<L>,
    // Threads currently past admission; the growth path waits for zero.
    active: CachePadded<AtomicI32>,
    // Owner ids for in-flight inserts, one fresh id per admission.
    next_owner: AtomicU64,
}

unsafe impl<T: Send, L: Lock, C: SlotCounter> Send for HuntQueue<T, L, C> {}
unsafe impl<T: Send, L: Lock, C: SlotCounter> Sync for HuntQueue<T, L, C> {}

impl<T, L: Lock, C: SlotCounter> HuntQueue<T, L, C> {
    pub fn new() -> Self {
        let mut heap = Vec::new();
        heap.push(Node::empty());
        HuntQueue {
            heap: UnsafeCell::new(heap),
            counter: UnsafeCell::new(C::default()),
            len: CachePadded::new(AtomicUsize::new(0)),
            admission: CachePadded::new(L::default()),
            active: CachePadded::new(AtomicI32::new(0)),
            next_owner: AtomicU64::new(1),
        }
    }

    // Caller is past admission (or holds the admission lock), so the heap
    // cannot be concurrently grown out from under the reference.
    #[inline]
    unsafe fn node(&self, index: usize) -> &Node<T, L> {
        &(&*self.heap.get())[index]
    }

    /// Inserts `value` under the given priority.
    pub fn insert(&self, value: T, priority: usize) {
        self.admission.lock();

        let owner = Tag::Owner(self.next_owner.fetch_add(1, Ordering::Relaxed));

        let counter = unsafe { &mut *self.counter.get() };
        let mut child = counter.increment();

        // This insert filled the current level: append the next one.
        // Growing may relocate every node, so wait until all previously
        // admitted threads have left the heap; none of them can block on
        // us since we hold no node lock, and nobody new can be admitted.
        if counter.size() == unsafe { (*self.heap.get()).len() } {
            let backoff = Backoff::new();
            while self.active.load(Ordering::Acquire) != 0 {
                backoff.snooze();
            }
            let heap = unsafe { &mut *self.heap.get() };
            let new_len = heap.len() + counter.high_bit();
            heap.resize_with(new_len, Node::empty);
        }
        self.len.store(counter.size(), Ordering::Release);

        self.active.fetch_add(1, Ordering::AcqRel);

        unsafe {
            let leaf = self.node(child);
            leaf.lock();
            leaf.init(value, priority, owner);
            self.admission.unlock();
            leaf.unlock();

            // Bubble-up: climb towards the root, swapping with the parent
            // while our element outranks it. Concurrent operations may
            // carry the element upward for us or consume it outright; the
            // tag tells the cases apart.
            while child > ROOT {
                let parent = child >> 1;
                let p = self.node(parent);
                let c = self.node(child);
                p.lock();
                c.lock();
                let entered = child;

                if p.tag() == Tag::Available && c.tag() == owner {
                    if c.priority() > p.priority() {
                        c.swap(p);
                        child = parent;
                    } else {
                        c.set_tag(Tag::Available);
                        child = 0;
                    }
                } else if p.tag() == Tag::Empty {
                    // A pop vacated the parent; our element was already
                    // carried above this slot and has since been consumed.
                    child = 0;
                } else if c.tag() != owner {
                    // Somebody swapped our element upward; chase it.
                    child = parent;
                }
                // Remaining case: the parent still carries another
                // in-flight insert. Drop both locks and retry the edge.

                self.node(entered).unlock();
                p.unlock();
            }

            if child == ROOT {
                let root = self.node(ROOT);
                root.lock();
                if root.tag() == owner {
                    root.set_tag(Tag::Available);
                }
                root.unlock();
            }
        }

        self.active.fetch_sub(1, Ordering::AcqRel);
    }

    /// Removes the payload of some element of maximal priority among the
    /// settled elements as of this call's admission, or `None` when the
    /// queue is observed empty.
    pub fn pop_max(&self) -> Option<T> {
        self.admission.lock();
        self.active.fetch_add(1, Ordering::AcqRel);

        let counter = unsafe { &mut *self.counter.get() };

        // Re-check emptiness under the admission lock: another popper may
        // have drained the queue since the caller decided to pop.
        if counter.size() == 0 {
            self.admission.unlock();
            self.active.fetch_sub(1, Ordering::AcqRel);
            return None;
        }

        let bottom = counter.decrement();
        self.len.store(counter.size(), Ordering::Release);

        unsafe {
            let b = self.node(bottom);
            b.lock();
            self.admission.unlock();

            let bottom_priority = b.priority();
            let bottom_value = b.take_value().expect("allocated slot holds an element");
            b.set_tag(Tag::Empty);
            b.unlock();

            let root = self.node(ROOT);
            root.lock();

            // The vacated bottom slot held the only element, which makes
            // it the maximum.
            if root.tag() == Tag::Empty {
                root.unlock();
                self.active.fetch_sub(1, Ordering::AcqRel);
                return Some(bottom_value);
            }

            // Otherwise take the root's element and let the bottom one
            // sink down from the top.
            let max_value = root.take_value();
            root.init(bottom_value, bottom_priority, Tag::Available);

            // Sift-down under lock coupling: lock both children, keep the
            // larger one, swap if it outranks the parent. In-flight
            // (owner-tagged) children count as present and are compared by
            // priority like settled ones.
            let mut parent = ROOT;
            let last = (*self.heap.get()).len() - 1;

            while 2 * parent <= last {
                let left_idx = 2 * parent;
                let left = self.node(left_idx);
                let right = self.node(left_idx + 1);
                left.lock();
                right.lock();

                let (child_idx, child) = if left.tag() == Tag::Empty {
                    // Leaf boundary: slots fill left before right.
                    right.unlock();
                    left.unlock();
                    break;
                } else if right.tag() == Tag::Empty || left.priority() > right.priority() {
                    right.unlock();
                    (left_idx, left)
                } else {
                    left.unlock();
                    (left_idx + 1, right)
                };

                let p = self.node(parent);
                if child.priority() > p.priority() {
                    child.swap(p);
                    p.unlock();
                    parent = child_idx;
                } else {
                    child.unlock();
                    break;
                }
            }

            self.node(parent).unlock();
            self.active.fetch_sub(1, Ordering::AcqRel);
            max_value
        }
    }

    /// Current element count. Advisory while operations are in flight.
    #[inline]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks the quiescent invariants: every occupied slot is settled
    /// (no owner tags left behind), occupied slots form a subtree hanging
    /// off the root with left siblings filled before right ones, the
    /// occupied count matches the counter, and every occupied child ranks
    /// at or below its parent.
    ///
    /// Exclusive access stands in for quiescence, so no locks are taken.
    /// Intended for tests and debugging.
    pub fn validate(&mut self) -> bool {
        let size = self.counter.get_mut().size();
        let heap = self.heap.get_mut();
        let mut occupied = 0;

        unsafe {
            for i in 1..heap.len() {
                match heap[i].tag() {
                    Tag::Empty => {}
                    Tag::Available => {
                        occupied += 1;
                        if i > 1 && heap[i / 2].tag() == Tag::Empty {
                            return false;
                        }
                        if i > 1 && heap[i / 2].priority() < heap[i].priority() {
                            return false;
                        }
                        if i % 2 == 1 && i > 1 && heap[i - 1].tag() == Tag::Empty {
                            return false;
                        }
                    }
                    Tag::Owner(_) => return false,
                }
            }
        }

        occupied == size
    }
}

impl<T, L: Lock, C: SlotCounter> Default for HuntQueue<T, L, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send, L: Lock, C: SlotCounter> ConcurrentPriorityQueue<T> for HuntQueue<T, L, C> {
    fn insert(&self, value: T, priority: usize) {
        HuntQueue::insert(self, value, priority);
    }

    fn pop_max(&self) -> Option<T> {
        HuntQueue::pop_max(self)
    }

    fn len(&self) -> usize {
        HuntQueue::len(self)
    }
}
