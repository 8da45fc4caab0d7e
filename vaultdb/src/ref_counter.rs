//! A striped, sign-bit-encoded reference counter used to track the live
//! transactions and cursors borrowed from an [`Env`](crate::Env) so that
//! closing the environment can fail fast instead of blocking.
//!
//! Native handles must not be freed while another thread is mid-operation on
//! them, but taking a lock on every acquire/release would destroy read
//! throughput. Each stripe is a single atomic `i32` whose sign bit is
//! repurposed depending on the state of the environment:
//!
//! * While `OPEN`, a stripe holds a non-negative open reference count.
//! * Once `close` is called, every stripe with a non-zero count is negated,
//!   which freezes new acquires on that stripe (they observe a negative
//!   value and fail with [`RefCounterError::AlreadyClosed`]) while letting
//!   existing holders finish: each `release` increments a negative counter
//!   towards zero.
//! * A stripe that is at zero when `close` runs is marked with the sentinel
//!   [`CLOSED_SENTINEL`] (`i32::MIN`) directly.
//!
//! Thread-to-stripe assignment hashes the thread id through the Stafford
//! variant 13 mixer so sequential thread ids spread evenly across the
//! `2^k` stripes without using a modulo.

use std::sync::atomic::{AtomicI32, AtomicU8, Ordering};

const STATE_OPEN: u8 = 0;
const STATE_CLOSING: u8 = 1;
const STATE_CLOSED: u8 = 2;

/// Sentinel value stored in a stripe once it has been observed at zero
/// during a `close` and will never accept another acquire.
const CLOSED_SENTINEL: i32 = i32::MIN;

/// Maximum number of in-flight acquires a single stripe can hold.
///
/// One value below `i32::MAX` is reserved so the stripe can never be
/// confused with the sentinel or overflow into the sign bit through normal
/// use; hitting this is a fatal invariant violation, not a recoverable error.
pub const MAX_PER_STRIPE: i32 = i32::MAX - 1;

/// Errors raised by [`RefCounter::acquire`] and [`RefCounter::close`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefCounterError {
    /// The environment has already transitioned past `OPEN`.
    AlreadyClosed,
    /// `close` was attempted while `count` acquires were still outstanding.
    EnvInUse(i64),
}

impl std::fmt::Display for RefCounterError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RefCounterError::AlreadyClosed => f.write_str("the environment is already closed"),
            RefCounterError::EnvInUse(count) => {
                write!(f, "the environment has {count} live transaction(s) or cursor(s)")
            }
        }
    }
}

impl std::error::Error for RefCounterError {}

/// Stafford variant 13 64-bit mixer, used to spread thread ids across stripes.
fn stafford_mix13(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

fn current_thread_stripe(stripe_mask: usize) -> usize {
    use std::hash::{Hash, Hasher};
    // `ThreadId` does not expose its integer value, so we hash it into a u64
    // and run it through the same high-quality mixer the spec calls for.
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    std::thread::current().id().hash(&mut hasher);
    let h = stafford_mix13(hasher.finish());
    (h as usize) & stripe_mask
}

/// A guard returned by [`RefCounter::acquire`]. Releasing is idempotent:
/// calling [`Self::release`] more than once, or dropping after releasing,
/// has no further effect.
pub struct Releaser<'a> {
    counter: &'a RefCounter,
    stripe: usize,
    released: bool,
}

impl<'a> Releaser<'a> {
    /// Releases the acquired stripe slot. Safe to call at most meaningfully
    /// once; subsequent calls (or a later `Drop`) are no-ops.
    pub fn release(mut self) {
        self.do_release();
    }

    fn do_release(&mut self) {
        if !self.released {
            self.counter.release_stripe(self.stripe);
            self.released = true;
        }
    }
}

impl Drop for Releaser<'_> {
    fn drop(&mut self) {
        self.do_release();
    }
}

/// The striped, sign-bit-encoded reference counter guarding an [`Env`](crate::Env).
pub struct RefCounter {
    stripes: Box<[AtomicI32]>,
    mask: usize,
    state: AtomicU8,
}

impl RefCounter {
    /// Creates a new counter with `2^stripe_bits` stripes, all starting at `OPEN`/zero.
    pub fn new(stripe_bits: u32) -> RefCounter {
        let count = 1usize << stripe_bits;
        let stripes = (0..count).map(|_| AtomicI32::new(0)).collect::<Vec<_>>().into_boxed_slice();
        RefCounter { stripes, mask: count - 1, state: AtomicU8::new(STATE_OPEN) }
    }

    /// Acquires a slot on the stripe assigned to the calling thread.
    ///
    /// Fails with [`RefCounterError::AlreadyClosed`] if the environment is
    /// not `OPEN`, or if this particular stripe has already been frozen or
    /// closed by a concurrent `close`.
    pub fn acquire(&self) -> Result<Releaser<'_>, RefCounterError> {
        if self.state.load(Ordering::Acquire) != STATE_OPEN {
            return Err(RefCounterError::AlreadyClosed);
        }

        let stripe = current_thread_stripe(self.mask);
        let cell = &self.stripes[stripe];

        let mut current = cell.load(Ordering::Acquire);
        loop {
            if current < 0 || current == CLOSED_SENTINEL {
                return Err(RefCounterError::AlreadyClosed);
            }
            if current >= MAX_PER_STRIPE {
                panic!("reference counter stripe overflow: more than {MAX_PER_STRIPE} live handles");
            }
            match cell.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(Releaser { counter: self, stripe, released: false }),
                Err(observed) => current = observed,
            }
        }
    }

    fn release_stripe(&self, stripe: usize) {
        let cell = &self.stripes[stripe];
        // A negative, non-sentinel count means this stripe is draining after
        // a `close`: releasing nudges it towards zero instead of decrementing
        // further away from it.
        let mut current = cell.load(Ordering::Acquire);
        loop {
            let next = if current < 0 && current != CLOSED_SENTINEL { current + 1 } else { current - 1 };
            match cell.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }

    /// Transitions `OPEN` → `CLOSING` → `CLOSED`, running `on_zero` exactly
    /// once if and only if every stripe is observed to have zero in-flight
    /// users. Returns [`RefCounterError::EnvInUse`] with the total
    /// outstanding count otherwise, leaving the counter `OPEN` again so a
    /// later retry is possible once users have released.
    pub fn close(&self, on_zero: impl FnOnce()) -> Result<(), RefCounterError> {
        match self.state.compare_exchange(
            STATE_OPEN,
            STATE_CLOSING,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {}
            Err(_) => return Err(RefCounterError::AlreadyClosed),
        }

        let mut total = 0i64;
        for cell in self.stripes.iter() {
            let mut current = cell.load(Ordering::Acquire);
            loop {
                if current == CLOSED_SENTINEL {
                    break;
                }
                let next = if current == 0 { CLOSED_SENTINEL } else { -current };
                match cell.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
                {
                    Ok(_) => {
                        total += current as i64;
                        break;
                    }
                    Err(observed) => current = observed,
                }
            }
        }

        if total > 0 {
            // Revert: give the stripes back their OPEN semantics so existing
            // holders can keep releasing normally and a retry is possible.
            for cell in self.stripes.iter() {
                let mut current = cell.load(Ordering::Acquire);
                loop {
                    let next = match current {
                        CLOSED_SENTINEL => 0,
                        n if n < 0 => -n,
                        n => n,
                    };
                    match cell.compare_exchange_weak(
                        current,
                        next,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    ) {
                        Ok(_) => break,
                        Err(observed) => current = observed,
                    }
                }
            }
            self.state.store(STATE_OPEN, Ordering::Release);
            return Err(RefCounterError::EnvInUse(total));
        }

        on_zero();
        self.state.store(STATE_CLOSED, Ordering::Release);
        Ok(())
    }

    /// Whether `close` has completed successfully.
    pub fn is_closed(&self) -> bool {
        self.state.load(Ordering::Acquire) == STATE_CLOSED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn acquire_release_nets_zero() {
        let counter = Arc::new(RefCounter::new(4));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let counter = Arc::clone(&counter);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    let releaser = counter.acquire().unwrap();
                    releaser.release();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert!(counter.close(|| {}).is_ok());
    }

    #[test]
    fn close_with_live_user_fails_then_succeeds() {
        let counter = RefCounter::new(2);
        let releaser = counter.acquire().unwrap();

        match counter.close(|| panic!("on_zero must not run while a user is live")) {
            Err(RefCounterError::EnvInUse(n)) => assert!(n >= 1),
            other => panic!("expected EnvInUse, got {other:?}"),
        }

        releaser.release();

        let mut ran = false;
        counter.close(|| ran = true).unwrap();
        assert!(ran);
    }

    #[test]
    fn acquire_after_close_is_rejected() {
        let counter = RefCounter::new(1);
        counter.close(|| {}).unwrap();
        assert_eq!(counter.acquire().unwrap_err(), RefCounterError::AlreadyClosed);
    }

    #[test]
    fn double_release_is_a_no_op() {
        let counter = RefCounter::new(1);
        let releaser = counter.acquire().unwrap();
        releaser.release();
        // A second acquire/release cycle must still observe a net-zero count.
        let releaser = counter.acquire().unwrap();
        releaser.release();
        counter.close(|| {}).unwrap();
    }
}
