//! Injectable randomness for template and strategy selection.
//!
//! Everything that rolls dice takes a `&dyn RandomSource`, so tests swap in
//! scripted sources and assert exact branch coverage while production uses
//! a seedable PRNG.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

pub trait RandomSource: Send + Sync {
    /// Uniform value in `[0, 1)`.
    fn next_f32(&self) -> f32;

    /// Uniform index in `[0, len)`. Callers guarantee `len > 0`.
    fn pick_index(&self, len: usize) -> usize {
        debug_assert!(len > 0);
        ((self.next_f32() * len as f32) as usize).min(len.saturating_sub(1))
    }
}

/// Default source: a small fast PRNG behind a mutex.
#[derive(Debug)]
pub struct SmallRngSource {
    inner: Mutex<SmallRng>,
}

impl SmallRngSource {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SmallRng::from_os_rng()),
        }
    }

    /// Fixed-seed source for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SmallRng> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for SmallRngSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for SmallRngSource {
    fn next_f32(&self) -> f32 {
        self.lock().random::<f32>()
    }

    fn pick_index(&self, len: usize) -> usize {
        debug_assert!(len > 0);
        self.lock().random_range(0..len)
    }
}
