//! Deterministic random number generation
//!
//! Uses xorshift64* algorithm for fast, deterministic random number generation.
//! All randomness in the simulator goes through a [`RandomSource`]; the engine
//! never reaches for a global generator.

mod xorshift;

pub use xorshift::RngManager;

/// Injectable source of uniform integer draws
///
/// The propagation engine takes this as a capability so tests can pin the
/// exact sequence of branching caps. [`RngManager`] is the production
/// implementation.
pub trait RandomSource {
    /// Draw a value uniformly from `[min, max)`
    ///
    /// Callers guarantee `min < max`.
    fn range(&mut self, min: i64, max: i64) -> i64;
}

impl RandomSource for RngManager {
    fn range(&mut self, min: i64, max: i64) -> i64 {
        RngManager::range(self, min, max)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn range(&mut self, min: i64, max: i64) -> i64 {
        (**self).range(min, max)
    }
}
