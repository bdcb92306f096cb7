//! Plain-text views of the exercise log.
//!
//! Pure functions over store state; printing is left to the caller.

use fittrack_core::{Exercise, Summary};

const EMPTY_LOG_MESSAGE: &str = "No exercises logged yet. Add one with `fittrack add`.";

/// Renders the history list, one row per exercise, newest first.
pub fn render_list(exercises: &[Exercise]) -> String {
    if exercises.is_empty() {
        return EMPTY_LOG_MESSAGE.to_string();
    }

    let activity_width = exercises
        .iter()
        .map(|exercise| exercise.activity.chars().count())
        .max()
        .unwrap_or(0)
        .max("ACTIVITY".len());

    let mut out = format!(
        "{:<15} {:<activity_width$} {:>12} {:>12}",
        "ID", "ACTIVITY", "DURATION", "CALORIES"
    );
    for exercise in exercises {
        out.push('\n');
        out.push_str(&format!(
            "{:<15} {:<activity_width$} {:>12} {:>12}",
            exercise.id,
            exercise.activity,
            format!("{} min", exercise.duration),
            format!("{} kcal", exercise.calories),
        ));
    }
    out
}

/// Renders the two running totals.
pub fn render_summary(summary: &Summary) -> String {
    format!(
        "Total duration: {} min\nTotal calories: {} kcal\nEntries: {}",
        summary.total_duration, summary.total_calories, summary.entry_count
    )
}

/// One-line confirmation after a successful add.
pub fn render_added(exercise: &Exercise) -> String {
    format!(
        "Logged {} ({} min, {} kcal) with id {}",
        exercise.activity, exercise.duration, exercise.calories, exercise.id
    )
}
