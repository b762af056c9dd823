// Futex-backed sleeping lock with the classic three-state word:
// 0 = free, 1 = held, 2 = contended. An acquirer spins locally for a
// bounded number of attempts before parking in the kernel; release pays
// for a wake syscall only when the word was contended, and even then first
// spins briefly hoping an arriving thread grabs the lock instead.

use std::hint;
use std::ptr;
use std::sync::atomic::{AtomicU32, Ordering};

use nix::libc;

use super::Lock;

const FREE: u32 = 0;
const HELD: u32 = 1;
const CONTENDED: u32 = 2;

// Local spin attempts before parking.
const SPIN_LIMIT: usize = 100;

fn futex_wait(word: &AtomicU32, expected: u32) {
    unsafe {
        libc::syscall(
            libc::SYS_futex,
            word.as_ptr(),
            libc::FUTEX_WAIT | libc::FUTEX_PRIVATE_FLAG,
            expected,
            ptr::null::<libc::timespec>(),
            ptr::null::<u32>(),
            0u32,
        );
    }
}

fn futex_wake(word: &AtomicU32, waiters: u32) {
    unsafe {
        libc::syscall(
            libc::SYS_futex,
            word.as_ptr(),
            libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG,
            waiters,
            ptr::null::<libc::timespec>(),
            ptr::null::<u32>(),
            0u32,
        );
    }
}

#[derive(Default)]
pub struct FutexLock {
    state: AtomicU32,
}

impl Lock for FutexLock {
    fn lock(&self) {
        let mut state = FREE;
        for _ in 0..SPIN_LIMIT {
            state = match self
                .state
                .compare_exchange(FREE, HELD, Ordering::Acquire, Ordering::Relaxed)
            {
                Ok(_) => return,
                Err(observed) => observed,
            };
            hint::spin_loop();
        }

        // The lock is contended: advertise that, then wait in the kernel
        // until the exchange hands it to us.
        if state == HELD {
            state = self.state.swap(CONTENDED, Ordering::Acquire);
        }
        while state != FREE {
            futex_wait(&self.state, CONTENDED);
            state = self.state.swap(CONTENDED, Ordering::Acquire);
        }
    }

    fn unlock(&self) {
        if self.state.load(Ordering::Relaxed) == CONTENDED {
            self.state.store(FREE, Ordering::Release);
        } else if self.state.swap(FREE, Ordering::Release) == HELD {
            // Nobody was waiting.
            return;
        }

        // Spin briefly in the hope an arriving thread takes the lock and
        // inherits the duty to wake the sleepers.
        for _ in 0..2 * SPIN_LIMIT {
            if self.state.load(Ordering::Relaxed) == HELD {
                match self
                    .state
                    .compare_exchange(HELD, CONTENDED, Ordering::Relaxed, Ordering::Relaxed)
                {
                    Ok(_) => return,
                    Err(FREE) => {}
                    Err(_) => return,
                }
            }
            hint::spin_loop();
        }
        futex_wake(&self.state, 1);
    }
}
