//! Aggregated totals over the exercise log.

use crate::model::exercise::Exercise;

/// Totals shown by the summary surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    /// Sum of `duration` in minutes.
    pub total_duration: f64,
    /// Sum of `calories`.
    pub total_calories: f64,
    pub entry_count: usize,
}

/// Sums duration and calories independently over `exercises`.
///
/// An empty slice yields all-zero totals.
pub fn summarize(exercises: &[Exercise]) -> Summary {
    exercises
        .iter()
        .fold(Summary::default(), |mut acc, exercise| {
            acc.total_duration += exercise.duration;
            acc.total_calories += exercise.calories;
            acc.entry_count += 1;
            acc
        })
}
