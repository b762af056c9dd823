// Slot counters for the array heap, adapted from Hunt et al. (1996).
//
// increment() hands out the leaf slots of each heap level in bit-reversed
// order, so that two nearly concurrent inserts bubble up along paths that
// share nodes only near the root. decrement() undoes the most recent
// allocation and reports which slot it vacated.

/// Maps insert/delete admission order to heap slot indices.
///
/// The queue serializes every call under its admission lock; the `&mut`
/// receivers make that single-writer discipline explicit. The concurrency
/// of the queue comes from the per-node locks, never from the counter.
pub trait SlotCounter: Default + Send {
    /// Allocates the next slot and returns its one-based index.
    fn increment(&mut self) -> usize;

    /// Frees the most recently allocated slot and returns its index.
    fn decrement(&mut self) -> usize;

    /// Number of currently allocated slots.
    fn size(&self) -> usize;

    /// Width of the heap level `size` falls into, i.e. the most
    /// significant bit of `size`.
    fn high_bit(&self) -> usize;
}

/// Bit-reversal counter: successive increments enumerate each heap level
/// in bit-reversed order (1, 2, 3, 4, 6, 5, 7, 8, 12, 10, 14, 9, ...).
pub struct BitReversedCounter {
    size: usize,
    reverse: usize,
    high_bit: usize,
}

impl Default for BitReversedCounter {
    fn default() -> Self {
        BitReversedCounter {
            size: 0,
            reverse: 0,
            high_bit: 1,
        }
    }
}

impl SlotCounter for BitReversedCounter {
    fn increment(&mut self) -> usize {
        let was_empty = self.size == 0;
        self.size += 1;

        if was_empty {
            self.reverse = 1;
            self.high_bit = 1;
            return 1;
        }

        // Walk from the bit below the level bit towards the least
        // significant one, flipping as we go; the first flip that leaves
        // the bit set is a carry-free step within the level.
        let mut bit = self.high_bit >> 1;
        while bit != 0 {
            self.reverse ^= bit;
            if self.reverse & bit != 0 {
                break;
            }
            bit >>= 1;
        }

        // All bits wrapped around: the level is full, open the next one.
        if bit == 0 {
            self.high_bit <<= 1;
            self.reverse = self.high_bit;
        }

        self.reverse
    }

    fn decrement(&mut self) -> usize {
        let vacated = self.reverse;
        self.size -= 1;

        let mut bit = self.high_bit >> 1;
        while bit != 0 {
            self.reverse ^= bit;
            if self.reverse & bit == 0 {
                break;
            }
            bit >>= 1;
        }

        // The level just emptied, fall back to the one below.
        if bit == 0 {
            self.reverse = self.size;
            self.high_bit >>= 1;
        }

        vacated
    }

    #[inline]
    fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn high_bit(&self) -> usize {
        self.high_bit
    }
}

/// Plain sequential counter: slots are handed out left to right. Kept as a
/// baseline strategy; concurrent inserts that use it contend on overlapping
/// bubble-up paths far more often than with [`BitReversedCounter`].
pub struct LinearCounter {
    size: usize,
    high_bit: usize,
}

impl Default for LinearCounter {
    fn default() -> Self {
        LinearCounter {
            size: 0,
            high_bit: 1,
        }
    }
}

impl SlotCounter for LinearCounter {
    fn increment(&mut self) -> usize {
        if self.size == self.high_bit {
            self.high_bit <<= 1;
        }
        self.size += 1;
        self.size
    }

    fn decrement(&mut self) -> usize {
        if self.size == self.high_bit {
            self.high_bit >>= 1;
        }
        let vacated = self.size;
        self.size -= 1;
        vacated
    }

    #[inline]
    fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn high_bit(&self) -> usize {
        self.high_bit
    }
}
