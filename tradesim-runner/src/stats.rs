//! Order statistics over balances and trajectories.
//!
//! All functions are pure. Ordering uses `f64::total_cmp`, so a stray NaN
//! sorts last instead of poisoning the comparison.

use tradesim_core::Trajectory;

/// Median of `values`; the mean of the two middle values for even counts.
/// `None` for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(median_sorted(&sorted))
}

/// Median of an already sorted, non-empty slice.
pub(crate) fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    let mid = n / 2;
    if n % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Percentile of a sorted slice using linear interpolation.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}

/// Per-index median across trajectories.
///
/// The result is as long as the shortest trajectory. It is a synthetic path:
/// in general no single trajectory passes through every median point.
pub fn median_trajectory(trajectories: &[Trajectory]) -> Trajectory {
    column_stat(trajectories, median_sorted)
}

/// Per-index `p`-th percentile across trajectories.
pub fn percentile_trajectory(trajectories: &[Trajectory], p: f64) -> Trajectory {
    column_stat(trajectories, |sorted| percentile_sorted(sorted, p))
}

fn column_stat<F>(trajectories: &[Trajectory], stat: F) -> Trajectory
where
    F: Fn(&[f64]) -> f64,
{
    let steps = trajectories.iter().map(Vec::len).min().unwrap_or(0);
    let mut column = Vec::with_capacity(trajectories.len());

    (0..steps)
        .map(|i| {
            column.clear();
            column.extend(trajectories.iter().map(|t| t[i]));
            column.sort_by(f64::total_cmp);
            stat(column.as_slice())
        })
        .collect()
}
