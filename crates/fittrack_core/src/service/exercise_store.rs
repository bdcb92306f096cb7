//! Exercise store: the authoritative in-memory log.
//!
//! # Responsibility
//! - Own the ordered exercise list and the id generator.
//! - Mirror every effective mutation to storage and refresh totals.
//!
//! # Invariants
//! - The list is newest first; existing records are never reordered.
//! - Memory only changes after the matching storage write succeeded.
//! - `summary()` always reflects the current list.

use crate::model::exercise::{Exercise, ExerciseId, IdGenerator, NewExercise};
use crate::repo::exercise_repo::ExerciseStorage;
use crate::repo::kv_repo::{KvRepository, RepoError};
use crate::service::summary::{summarize, Summary};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level error.
#[derive(Debug)]
pub enum StoreError {
    /// Initial load from storage failed.
    Load(RepoError),
    /// Writing the updated list failed; in-memory state is unchanged.
    Persist(RepoError),
    /// No id above the largest existing one is left.
    IdsExhausted,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load(err) => write!(f, "failed to load exercise log: {err}"),
            Self::Persist(err) => write!(f, "failed to save exercise log: {err}"),
            Self::IdsExhausted => write!(f, "no exercise ids left above the largest stored id"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) | Self::Persist(err) => Some(err),
            Self::IdsExhausted => None,
        }
    }
}

/// In-memory exercise log synchronized with a key-value repository.
pub struct ExerciseStore<K: KvRepository> {
    storage: ExerciseStorage<K>,
    exercises: Vec<Exercise>,
    summary: Summary,
    ids: IdGenerator,
}

impl<K: KvRepository> ExerciseStore<K> {
    /// Loads the persisted log and seeds the id generator from it.
    pub fn open(kv: K) -> StoreResult<Self> {
        let storage = ExerciseStorage::new(kv);
        let exercises = storage.load().map_err(|err| {
            error!("event=store_open module=store status=error error={err}");
            StoreError::Load(err)
        })?;
        info!(
            "event=store_open module=store status=ok entries={}",
            exercises.len()
        );

        Ok(Self {
            summary: summarize(&exercises),
            ids: IdGenerator::seeded(&exercises),
            exercises,
            storage,
        })
    }

    /// Current snapshot, newest first.
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    /// Prepends a new record built from `input` and persists the list.
    ///
    /// The store does not validate `input`; callers enforce form rules via
    /// `NewExercise::validate`. Non-finite numbers still fail here, at the
    /// storage write, leaving the list untouched.
    pub fn add(&mut self, input: NewExercise) -> StoreResult<Exercise> {
        let Some(id) = self.ids.next_id() else {
            error!("event=exercise_add module=store status=error error_code=ids_exhausted");
            return Err(StoreError::IdsExhausted);
        };
        let exercise = Exercise::from_input(id, input);

        let mut next = Vec::with_capacity(self.exercises.len() + 1);
        next.push(exercise.clone());
        next.extend(self.exercises.iter().cloned());

        self.commit(next, "exercise_add")?;
        debug!("event=exercise_add module=store status=ok id={}", exercise.id);
        Ok(exercise)
    }

    /// Removes every record whose id equals `id`.
    ///
    /// Returns `false` without touching storage when nothing matched.
    pub fn delete(&mut self, id: ExerciseId) -> StoreResult<bool> {
        if !self.exercises.iter().any(|exercise| exercise.id == id) {
            debug!("event=exercise_delete module=store status=noop id={id}");
            return Ok(false);
        }

        let next = self
            .exercises
            .iter()
            .filter(|exercise| exercise.id != id)
            .cloned()
            .collect::<Vec<_>>();

        self.commit(next, "exercise_delete")?;
        debug!("event=exercise_delete module=store status=ok id={id}");
        Ok(true)
    }

    /// Removes all records and the persisted key.
    pub fn clear(&mut self) -> StoreResult<()> {
        self.storage.clear().map_err(|err| {
            error!("event=exercise_clear module=store status=error error={err}");
            StoreError::Persist(err)
        })?;
        self.exercises.clear();
        self.summary = Summary::default();
        info!("event=exercise_clear module=store status=ok");
        Ok(())
    }

    fn commit(&mut self, next: Vec<Exercise>, event: &str) -> StoreResult<()> {
        if let Err(err) = self.storage.save(&next) {
            error!("event={event} module=store status=error error_code=persist_failed error={err}");
            return Err(StoreError::Persist(err));
        }
        self.summary = summarize(&next);
        self.exercises = next;
        Ok(())
    }
}
