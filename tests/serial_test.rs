// Serial correctness checks, cross-validated against std's BinaryHeap as
// the reference priority queue.

use std::collections::BinaryHeap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cpq::{HuntQueue, LinearCounter, TatasLock};

const SEED: u64 = 0x5EED_CAFE;

fn drain(queue: &HuntQueue<usize>) -> Vec<usize> {
    let mut out = Vec::new();
    while let Some(value) = queue.pop_max() {
        out.push(value);
    }
    out
}

#[test]
fn pop_on_fresh_queue_is_none() {
    let queue: HuntQueue<usize> = HuntQueue::new();
    assert!(queue.is_empty());
    assert_eq!(queue.pop_max(), None);
    assert_eq!(queue.pop_max(), None);
}

#[test]
fn fixed_sequence_pops_in_priority_order() {
    let queue: HuntQueue<usize> = HuntQueue::new();
    for p in [5usize, 3, 8, 1, 9, 2] {
        queue.insert(p, p);
    }
    assert_eq!(queue.len(), 6);
    for expected in [9usize, 8, 5, 3, 2, 1] {
        assert_eq!(queue.pop_max(), Some(expected));
    }
    assert_eq!(queue.pop_max(), None);
    assert!(queue.is_empty());
}

#[test]
fn values_travel_with_their_priorities() {
    let queue: HuntQueue<&str> = HuntQueue::new();
    queue.insert("low", 1);
    queue.insert("high", 30);
    queue.insert("mid", 20);
    assert_eq!(queue.pop_max(), Some("high"));
    queue.insert("top", 99);
    assert_eq!(queue.pop_max(), Some("top"));
    assert_eq!(queue.pop_max(), Some("mid"));
    assert_eq!(queue.pop_max(), Some("low"));
    assert_eq!(queue.pop_max(), None);
}

#[test]
fn duplicate_priorities_all_come_back() {
    let queue: HuntQueue<usize> = HuntQueue::new();
    for value in 0..10usize {
        queue.insert(value, 7);
    }
    queue.insert(42, 9);

    assert_eq!(queue.pop_max(), Some(42));
    let mut rest = drain(&queue);
    rest.sort_unstable();
    assert_eq!(rest, (0..10).collect::<Vec<_>>());
}

#[test]
fn len_tracks_inserts_and_pops() {
    let queue: HuntQueue<usize> = HuntQueue::new();
    for i in 1..=100usize {
        queue.insert(i, i);
        assert_eq!(queue.len(), i);
    }
    for i in (0..100usize).rev() {
        queue.pop_max();
        assert_eq!(queue.len(), i);
    }
}

#[test]
fn growth_keeps_invariants() {
    let mut queue: HuntQueue<usize> = HuntQueue::new();
    // Each power of two crossed appends one more level.
    for i in 1..=64usize {
        queue.insert(i, i);
        assert!(queue.validate(), "after insert {i}");
    }
    let drained = drain(&queue);
    assert_eq!(drained, (1..=64).rev().collect::<Vec<_>>());
}

#[test]
fn growth_stress() {
    let mut queue: HuntQueue<usize> = HuntQueue::new();
    let n = 1usize << 16;
    for i in 1..=n {
        queue.insert(i, i);
    }
    assert_eq!(queue.len(), n);
    assert!(queue.validate());

    let drained = drain(&queue);
    assert_eq!(drained.len(), n);
    assert!(drained.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
#[ignore = "large: 2^20 inserts, run with --ignored"]
fn growth_stress_full() {
    let mut queue: HuntQueue<usize> = HuntQueue::new();
    let n = 1usize << 20;
    for i in 1..=n {
        queue.insert(i, i);
    }
    assert!(queue.validate());
    let drained = drain(&queue);
    assert_eq!(drained.len(), n);
    assert!(drained.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn mixed_workload_matches_reference() {
    let queue: HuntQueue<usize> = HuntQueue::new();
    let mut reference: BinaryHeap<usize> = BinaryHeap::new();
    let mut rng = StdRng::seed_from_u64(SEED);

    for _ in 0..10_000 {
        let p = rng.gen::<u32>() as usize;
        queue.insert(p, p);
        reference.push(p);
    }

    for _ in 0..100_000 {
        if rng.gen_bool(0.5) {
            let p = rng.gen::<u32>() as usize;
            queue.insert(p, p);
            reference.push(p);
        } else {
            assert_eq!(queue.pop_max(), reference.pop());
        }
    }

    loop {
        let (got, want) = (queue.pop_max(), reference.pop());
        assert_eq!(got, want);
        if got.is_none() {
            break;
        }
    }
}

#[test]
fn linear_counter_strategy_behaves_identically() {
    let queue: HuntQueue<usize, TatasLock, LinearCounter> = HuntQueue::new();
    let mut reference: BinaryHeap<usize> = BinaryHeap::new();
    let mut rng = StdRng::seed_from_u64(SEED ^ 1);

    for _ in 0..5_000 {
        let p = rng.gen::<u32>() as usize;
        queue.insert(p, p);
        reference.push(p);
    }
    for _ in 0..5_000 {
        assert_eq!(queue.pop_max(), reference.pop());
    }
    assert_eq!(queue.pop_max(), None);
}

macro_rules! queue_suite {
    ($lock_type:ty, $name:ident) => {
        mod $name {
            use super::*;

            #[test]
            fn insert_pop_cycle() {
                let queue: HuntQueue<usize, $lock_type> = HuntQueue::new();
                for p in [5usize, 3, 8, 1, 9, 2] {
                    queue.insert(p, p);
                }
                for expected in [9usize, 8, 5, 3, 2, 1] {
                    assert_eq!(queue.pop_max(), Some(expected));
                }
                assert_eq!(queue.pop_max(), None);
            }

            #[test]
            fn survives_growth() {
                let queue: HuntQueue<usize, $lock_type> = HuntQueue::new();
                for i in 0..1_000usize {
                    queue.insert(i, i);
                }
                let mut previous = usize::MAX;
                while let Some(value) = queue.pop_max() {
                    assert!(value <= previous);
                    previous = value;
                }
            }
        }
    };
}

queue_suite!(cpq::TasLock, tas_queue);
queue_suite!(cpq::TatasLock, tatas_queue);
queue_suite!(cpq::TasBackoffLock, tas_backoff_queue);
#[cfg(target_os = "linux")]
queue_suite!(cpq::FutexLock, futex_queue);
#[cfg(unix)]
queue_suite!(cpq::PthreadLock, pthread_queue);
