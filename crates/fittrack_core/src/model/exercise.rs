//! Exercise domain model.
//!
//! # Responsibility
//! - Define the canonical exercise record persisted under the log key.
//! - Define the form-boundary input shape and its validation rules.
//! - Generate record identifiers.
//!
//! # Invariants
//! - `id` is assigned once at creation and never changes.
//! - Generated ids are strictly increasing within one generator.
//! - Input validation happens at the form boundary, not in the store.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Identifier of one logged exercise.
///
/// Epoch-millisecond based, bumped forward when the clock would repeat.
pub type ExerciseId = i64;

/// One logged activity entry.
///
/// Field names match the persisted JSON layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: ExerciseId,
    pub activity: String,
    /// Minutes.
    pub duration: f64,
    /// Kilocalories.
    pub calories: f64,
}

impl Exercise {
    /// Builds a record from submitted input and an already generated id.
    pub fn from_input(id: ExerciseId, input: NewExercise) -> Self {
        Self {
            id,
            activity: input.activity,
            duration: input.duration,
            calories: input.calories,
        }
    }
}

/// Form input for a new exercise; everything except the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExercise {
    pub activity: String,
    pub duration: f64,
    pub calories: f64,
}

impl NewExercise {
    pub fn new(activity: impl Into<String>, duration: f64, calories: f64) -> Self {
        Self {
            activity: activity.into(),
            duration,
            calories,
        }
    }

    /// Returns a copy with surrounding whitespace stripped from `activity`.
    pub fn normalized(mut self) -> Self {
        let trimmed = self.activity.trim();
        if trimmed.len() != self.activity.len() {
            self.activity = trimmed.to_string();
        }
        self
    }

    /// Validates form-level constraints.
    ///
    /// # Errors
    /// - `EmptyActivity` when `activity` is blank.
    /// - `InvalidDuration` / `InvalidCalories` when the value is negative,
    ///   NaN or infinite.
    pub fn validate(&self) -> Result<(), ExerciseValidationError> {
        if self.activity.trim().is_empty() {
            return Err(ExerciseValidationError::EmptyActivity);
        }
        if !is_non_negative_finite(self.duration) {
            return Err(ExerciseValidationError::InvalidDuration(self.duration));
        }
        if !is_non_negative_finite(self.calories) {
            return Err(ExerciseValidationError::InvalidCalories(self.calories));
        }
        Ok(())
    }
}

/// Validation failure for exercise form input.
#[derive(Debug, Clone, PartialEq)]
pub enum ExerciseValidationError {
    EmptyActivity,
    InvalidDuration(f64),
    InvalidCalories(f64),
}

impl Display for ExerciseValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyActivity => write!(f, "activity cannot be empty"),
            Self::InvalidDuration(value) => write!(
                f,
                "duration must be a non-negative number of minutes, got {value}"
            ),
            Self::InvalidCalories(value) => {
                write!(f, "calories must be a non-negative number, got {value}")
            }
        }
    }
}

impl Error for ExerciseValidationError {}

fn is_non_negative_finite(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Strictly monotonic id source.
///
/// Uses the wall clock in epoch milliseconds, but never hands out an id
/// less than or equal to the previous one. Once `i64::MAX` has been handed
/// out (or seeded) the generator is exhausted and returns `None`.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: Option<ExerciseId>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator that will only return ids above every id in
    /// `existing`.
    pub fn seeded<'a>(existing: impl IntoIterator<Item = &'a Exercise>) -> Self {
        Self {
            last: existing.into_iter().map(|exercise| exercise.id).max(),
        }
    }

    /// Returns the next id using the current wall clock.
    pub fn next_id(&mut self) -> Option<ExerciseId> {
        self.next_id_at(now_epoch_ms())
    }

    /// Returns the next id for a given clock reading.
    ///
    /// `None` when no id above the last one is representable.
    pub fn next_id_at(&mut self, now_ms: i64) -> Option<ExerciseId> {
        let id = match self.last {
            Some(last) if now_ms <= last => last.checked_add(1)?,
            _ => now_ms,
        };
        self.last = Some(id);
        Some(id)
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
