use std::cell::UnsafeCell;
use std::mem;

use crate::lock::Lock;

/// Occupancy state of a heap slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag {
    /// Slot unused.
    Empty,
    /// Slot holds a settled element.
    Available,
    /// Slot holds an element whose insert is still bubbling up; the id
    /// names the admission that owns it.
    Owner(u64),
}

struct Slot<T> {
    value: Option<T>,
    priority: usize,
    tag: Tag,
}

// A heap slot guarded by its own embedded lock. Every field accessor is an
// unsafe fn whose contract is that the caller holds `lock`; swap requires
// both locks.
pub struct Node<T, L: Lock> {
    slot: UnsafeCell<Slot<T>>,
    lock: L,
}

unsafe impl<T: Send, L: Lock> Send for Node<T, L> {}
unsafe impl<T: Send, L: Lock> Sync for Node<T, L> {}

impl<T, L: Lock> Node<T, L> {
    pub fn empty() -> Self {
        Node {
            slot: UnsafeCell::new(Slot {
                value: None,
                priority: 0,
                tag: Tag::Empty,
            }),
            lock: L::default(),
        }
    }

    #[inline]
    pub fn lock(&self) {
        self.lock.lock();
    }

    #[inline]
    pub fn unlock(&self) {
        self.lock.unlock();
    }

    // Caller holds the node lock.
    #[inline]
    pub unsafe fn init(&self, value: T, priority: usize, tag: Tag) {
        let slot = &mut *self.slot.get();
        slot.value = Some(value);
        slot.priority = priority;
        slot.tag = tag;
    }

    // Caller holds the node lock.
    #[inline]
    pub unsafe fn tag(&self) -> Tag {
        (*self.slot.get()).tag
    }

    // Caller holds the node lock.
    #[inline]
    pub unsafe fn set_tag(&self, tag: Tag) {
        (*self.slot.get()).tag = tag;
    }

    // Caller holds the node lock.
    #[inline]
    pub unsafe fn priority(&self) -> usize {
        (*self.slot.get()).priority
    }

    // Moves the value out, leaving the slot without a payload.
    // Caller holds the node lock.
    #[inline]
    pub unsafe fn take_value(&self) -> Option<T> {
        (*self.slot.get()).value.take()
    }

    // Exchanges the entire slot (value, priority, tag) with `other`.
    // Caller holds both node locks.
    #[inline]
    pub unsafe fn swap(&self, other: &Self) {
        mem::swap(&mut *self.slot.get(), &mut *other.slot.get());
    }
}
