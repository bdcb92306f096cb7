//! Persistence adapter for the exercise log.
//!
//! # Responsibility
//! - Serialize the full exercise list under one fixed key.
//! - Decode persisted content with explicit per-record schema checks.
//!
//! # Invariants
//! - The stored value is a JSON array of `{id, activity, duration, calories}`.
//! - Malformed content never fails a load; it degrades to an empty list or
//!   to the subset of records that decode cleanly.
//! - Storage transport errors are propagated, not masked.

use crate::model::exercise::Exercise;
use crate::repo::kv_repo::{KvRepository, RepoError, RepoResult};
use log::{error, warn};
use serde_json::Value;

/// Key the exercise list is stored under.
pub const EXERCISES_KEY: &str = "fitTrackExercises";

/// Reads and writes the exercise list through a key-value repository.
pub struct ExerciseStorage<K: KvRepository> {
    kv: K,
}

impl<K: KvRepository> ExerciseStorage<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Loads the persisted list, newest first.
    ///
    /// Returns an empty list when the key is missing or its value is not a
    /// JSON array. Array elements that do not match the record schema are
    /// dropped and counted in a `warn` event.
    ///
    /// # Errors
    /// - Returns `RepoError::Db` when the underlying store cannot be read.
    pub fn load(&self) -> RepoResult<Vec<Exercise>> {
        let Some(raw) = self.kv.get(EXERCISES_KEY)? else {
            return Ok(Vec::new());
        };
        Ok(decode_exercises(&raw))
    }

    /// Overwrites the persisted list with `exercises`.
    ///
    /// # Errors
    /// - `NonFiniteField` when a duration or calorie value is NaN or
    ///   infinite; JSON would store it as `null`, which `load` rejects.
    ///   Nothing is written in that case.
    pub fn save(&self, exercises: &[Exercise]) -> RepoResult<()> {
        ensure_finite(exercises)?;
        let encoded = serde_json::to_string(exercises)?;
        self.kv.set(EXERCISES_KEY, &encoded)
    }

    /// Removes the persisted list entirely.
    pub fn clear(&self) -> RepoResult<bool> {
        self.kv.remove(EXERCISES_KEY)
    }
}

fn ensure_finite(exercises: &[Exercise]) -> RepoResult<()> {
    for exercise in exercises {
        let field = if !exercise.duration.is_finite() {
            "duration"
        } else if !exercise.calories.is_finite() {
            "calories"
        } else {
            continue;
        };
        return Err(RepoError::NonFiniteField {
            id: exercise.id,
            field,
        });
    }
    Ok(())
}

fn decode_exercises(raw: &str) -> Vec<Exercise> {
    let document: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            error!(
                "event=exercises_load module=repo status=error error_code=malformed_json line={} column={}",
                err.line(),
                err.column()
            );
            return Vec::new();
        }
    };

    let Value::Array(items) = document else {
        error!(
            "event=exercises_load module=repo status=error error_code=unexpected_shape found={}",
            json_kind(&document)
        );
        return Vec::new();
    };

    let total = items.len();
    let exercises = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<Exercise>(item).ok())
        .collect::<Vec<_>>();

    let dropped = total - exercises.len();
    if dropped > 0 {
        warn!(
            "event=exercises_load module=repo status=partial dropped={dropped} kept={}",
            exercises.len()
        );
    }
    exercises
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
