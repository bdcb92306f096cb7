//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the exercise form, list and summary use cases to Dart via FRB.
//! - Translate core errors into stable response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Form validation happens here, before input reaches the store.
//! - Every call opens the configured database, so the UI always sees
//!   what is persisted.

use fittrack_core::db::open_db;
use fittrack_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, Exercise,
    ExerciseStore, NewExercise, SqliteKvRepository, Summary,
};
use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;

const DB_FILE_NAME: &str = "fittrack.sqlite3";
const DB_PATH_ENV: &str = "FITTRACK_DB_PATH";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Pins the database file used by every exercise call.
///
/// Must run before the first exercise call; afterwards only the same path
/// is accepted. Without it, `FITTRACK_DB_PATH` or a temp-dir default is used.
///
/// # FFI contract
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_storage(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = DB_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "storage already configured at `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// One row of the exercise list.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseItem {
    pub id: i64,
    pub activity: String,
    /// Minutes.
    pub duration: f64,
    pub calories: f64,
}

/// Envelope for add/delete actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Affected exercise ID, when there is one.
    pub exercise_id: Option<i64>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ExerciseActionResponse {
    fn success(message: impl Into<String>, exercise_id: i64) -> Self {
        Self {
            ok: true,
            exercise_id: Some(exercise_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            exercise_id: None,
            message: message.into(),
        }
    }
}

/// Envelope for the history list, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseListResponse {
    pub ok: bool,
    pub items: Vec<ExerciseItem>,
    pub message: String,
}

/// Envelope for the summary surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseSummaryResponse {
    pub ok: bool,
    pub total_duration: f64,
    pub total_calories: f64,
    pub entry_count: u32,
    pub message: String,
}

/// Logs a new exercise from the form.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Rejects blank activity and negative/non-finite numbers.
/// - Returns the created exercise ID on success.
#[flutter_rust_bridge::frb(sync)]
pub fn exercise_add(activity: String, duration: f64, calories: f64) -> ExerciseActionResponse {
    let input = NewExercise::new(activity, duration, calories).normalized();
    if let Err(err) = input.validate() {
        return ExerciseActionResponse::failure(format!("exercise_add rejected: {err}"));
    }

    match with_exercise_store(|store| store.add(input).map_err(|err| err.to_string())) {
        Ok(exercise) => ExerciseActionResponse::success("Exercise logged.", exercise.id),
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error call=exercise_add");
            ExerciseActionResponse::failure(format!("exercise_add failed: {err}"))
        }
    }
}

/// Deletes one exercise by ID.
///
/// # FFI contract
/// - Unknown IDs succeed with `exercise_id = None`.
#[flutter_rust_bridge::frb(sync)]
pub fn exercise_delete(id: i64) -> ExerciseActionResponse {
    match with_exercise_store(|store| store.delete(id).map_err(|err| err.to_string())) {
        Ok(true) => ExerciseActionResponse::success("Exercise deleted.", id),
        Ok(false) => ExerciseActionResponse {
            ok: true,
            exercise_id: None,
            message: "No matching exercise.".to_string(),
        },
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error call=exercise_delete");
            ExerciseActionResponse::failure(format!("exercise_delete failed: {err}"))
        }
    }
}

/// Lists logged exercises, newest first.
#[flutter_rust_bridge::frb(sync)]
pub fn exercise_list() -> ExerciseListResponse {
    match with_exercise_store(|store| {
        Ok(store.exercises().iter().map(to_item).collect::<Vec<_>>())
    }) {
        Ok(items) => {
            let message = if items.is_empty() {
                "No exercises logged yet.".to_string()
            } else {
                format!("{} exercise(s) logged.", items.len())
            };
            ExerciseListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => ExerciseListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("exercise_list failed: {err}"),
        },
    }
}

/// Returns total duration and calories across the log.
#[flutter_rust_bridge::frb(sync)]
pub fn exercise_summary() -> ExerciseSummaryResponse {
    match with_exercise_store(|store| Ok(store.summary())) {
        Ok(summary) => to_summary_response(summary),
        Err(err) => ExerciseSummaryResponse {
            ok: false,
            total_duration: 0.0,
            total_calories: 0.0,
            entry_count: 0,
            message: format!("exercise_summary failed: {err}"),
        },
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn with_exercise_store<T>(
    f: impl FnOnce(&mut ExerciseStore<SqliteKvRepository<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("DB open failed: {err}"))?;
    let mut store = ExerciseStore::open(SqliteKvRepository::new(&conn))
        .map_err(|err| err.to_string())?;
    f(&mut store)
}

fn to_item(exercise: &Exercise) -> ExerciseItem {
    ExerciseItem {
        id: exercise.id,
        activity: exercise.activity.clone(),
        duration: exercise.duration,
        calories: exercise.calories,
    }
}

fn to_summary_response(summary: Summary) -> ExerciseSummaryResponse {
    ExerciseSummaryResponse {
        ok: true,
        total_duration: summary.total_duration,
        total_calories: summary.total_calories,
        entry_count: u32::try_from(summary.entry_count).unwrap_or(u32::MAX),
        message: format!("{} exercise(s) summarized.", summary.entry_count),
    }
}
