//! Core logic for the FitTrack exercise log.
//! This crate owns the exercise list, its totals and its local persistence.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, flush_logging, init_logging};
pub use model::exercise::{
    Exercise, ExerciseId, ExerciseValidationError, IdGenerator, NewExercise,
};
pub use repo::exercise_repo::{ExerciseStorage, EXERCISES_KEY};
pub use repo::kv_repo::{
    KvRepository, MemoryKvRepository, RepoError, RepoResult, SqliteKvRepository,
};
pub use service::exercise_store::{ExerciseStore, StoreError, StoreResult};
pub use service::summary::{summarize, Summary};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
