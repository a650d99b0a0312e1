//! Completion percentage math for a single category.

use crate::model::CategoryProgress;

/// Compute count and percentage for a category.
///
/// `percentage` is `round(completed / total * 100)` when `total > 0`, else 0,
/// clamped to `[0, 100]`. Completed counts can exceed the shipped total when
/// the client constants lag the backend catalog; the clamp keeps the bar from
/// rendering past full.
#[must_use]
pub fn compute_progress(completed: u32, total: u32) -> CategoryProgress {
    let percentage = if total > 0 {
        let raw = (f64::from(completed) / f64::from(total) * 100.0).round();
        raw.clamp(0.0, 100.0) as u8
    } else {
        0
    };
    CategoryProgress {
        completed,
        total,
        percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_total_is_zero_percent() {
        assert_eq!(compute_progress(0, 0).percentage, 0);
        assert_eq!(compute_progress(5, 0).percentage, 0);
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(compute_progress(1, 3).percentage, 33);
        assert_eq!(compute_progress(2, 3).percentage, 67);
        assert_eq!(compute_progress(1, 8).percentage, 13);
    }

    #[test]
    fn drifted_counts_clamp_to_full() {
        // Shipped totals can be stale, so completed may overshoot.
        let progress = compute_progress(12, 10);
        assert_eq!(progress.percentage, 100);
        assert_eq!(progress.completed, 12);
        assert_eq!(progress.total, 10);
    }

    #[test]
    fn percentage_is_always_within_bounds() {
        for completed in 0..=40 {
            for total in 0..=20 {
                let progress = compute_progress(completed, total);
                assert!(progress.percentage <= 100);
            }
        }
    }
}
