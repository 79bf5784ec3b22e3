//! Per-generation branching cap jitter

use crate::rng::RandomSource;

/// Jitter a branching cap
///
/// With `factor == 0` the cap is returned unchanged and no draw is made.
/// Otherwise one value is drawn uniformly from `[r − factor, r + factor)`;
/// negative draws clamp to `0`.
///
/// # Example
///
/// ```rust
/// use outbreak_simulator_core_rs::{propagation::randomize, RngManager};
///
/// let mut rng = RngManager::new(7);
/// assert_eq!(randomize(3, 0, &mut rng), 3);
///
/// let drawn = randomize(3, 2, &mut rng);
/// assert!((1..5).contains(&drawn));
/// ```
pub fn randomize<R: RandomSource + ?Sized>(r: i64, factor: u32, rng: &mut R) -> i64 {
    if factor == 0 {
        return r;
    }
    let factor = i64::from(factor);
    let drawn = rng.range(r.saturating_sub(factor), r.saturating_add(factor));
    drawn.max(0)
}
