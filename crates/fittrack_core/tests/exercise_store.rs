use fittrack_core::db::{open_db, open_db_in_memory};
use fittrack_core::{
    ExerciseStore, KvRepository, MemoryKvRepository, NewExercise, RepoError, RepoResult,
    SqliteKvRepository, StoreError, EXERCISES_KEY,
};
use std::cell::Cell;

#[test]
fn add_prepends_and_grows_by_one() {
    let mut store = ExerciseStore::open(MemoryKvRepository::new()).unwrap();

    let first = store.add(NewExercise::new("Running", 30.0, 300.0)).unwrap();
    assert_eq!(store.exercises().len(), 1);

    let second = store.add(NewExercise::new("Cycling", 45.0, 400.0)).unwrap();
    assert_eq!(store.exercises().len(), 2);
    assert_eq!(store.exercises()[0], second);
    assert_eq!(store.exercises()[1], first);
}

#[test]
fn ids_are_strictly_increasing_for_rapid_adds() {
    let mut store = ExerciseStore::open(MemoryKvRepository::new()).unwrap();

    let ids = (0..50)
        .map(|i| store.add(NewExercise::new(format!("set {i}"), 1.0, 1.0)).unwrap().id)
        .collect::<Vec<_>>();
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn delete_removes_only_matching_record_and_keeps_order() {
    let mut store = ExerciseStore::open(MemoryKvRepository::new()).unwrap();
    let a = store.add(NewExercise::new("A", 1.0, 1.0)).unwrap();
    let b = store.add(NewExercise::new("B", 2.0, 2.0)).unwrap();
    let c = store.add(NewExercise::new("C", 3.0, 3.0)).unwrap();

    assert!(store.delete(b.id).unwrap());
    assert_eq!(store.exercises(), &[c, a]);
}

#[test]
fn delete_of_unknown_id_is_noop_without_write() {
    let kv = CountingKv::default();
    let mut store = ExerciseStore::open(&kv).unwrap();
    store.add(NewExercise::new("Rowing", 15.0, 120.0)).unwrap();
    let before = store.exercises().to_vec();
    let writes = kv.writes.get();

    assert!(!store.delete(-1).unwrap());
    assert_eq!(store.exercises(), before.as_slice());
    assert_eq!(kv.writes.get(), writes);
}

#[test]
fn running_totals_follow_add_and_delete() {
    let mut store = ExerciseStore::open(MemoryKvRepository::new()).unwrap();
    assert_eq!(store.summary().total_duration, 0.0);
    assert_eq!(store.summary().total_calories, 0.0);

    let running = store.add(NewExercise::new("Running", 30.0, 300.0)).unwrap();
    assert_eq!(store.exercises().len(), 1);
    assert_eq!(store.exercises()[0].activity, "Running");
    assert_eq!(totals(&store), (30.0, 300.0));

    let cycling = store.add(NewExercise::new("Cycling", 45.0, 400.0)).unwrap();
    let order = store
        .exercises()
        .iter()
        .map(|e| e.activity.as_str())
        .collect::<Vec<_>>();
    assert_eq!(order, vec!["Cycling", "Running"]);
    assert_eq!(totals(&store), (75.0, 700.0));

    store.delete(running.id).unwrap();
    assert_eq!(store.exercises(), &[cycling]);
    assert_eq!(totals(&store), (45.0, 400.0));
    assert_eq!(store.summary().entry_count, 1);
}

#[test]
fn every_mutation_is_mirrored_to_storage() {
    let kv = MemoryKvRepository::new();
    let mut store = ExerciseStore::open(&kv).unwrap();
    let added = store.add(NewExercise::new("Hiking", 90.0, 600.0)).unwrap();

    let reopened = ExerciseStore::open(&kv).unwrap();
    assert_eq!(reopened.exercises(), store.exercises());

    store.delete(added.id).unwrap();
    let raw = kv.get(EXERCISES_KEY).unwrap().unwrap();
    assert_eq!(raw, "[]");
}

#[test]
fn state_survives_reopening_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fittrack.db");

    let saved = {
        let conn = open_db(&path).unwrap();
        let mut store = ExerciseStore::open(SqliteKvRepository::new(&conn)).unwrap();
        store.add(NewExercise::new("Running", 30.0, 300.0)).unwrap();
        store.add(NewExercise::new("Cycling", 45.0, 400.0)).unwrap();
        store.exercises().to_vec()
    };

    let conn = open_db(&path).unwrap();
    let mut store = ExerciseStore::open(SqliteKvRepository::new(&conn)).unwrap();
    assert_eq!(store.exercises(), saved.as_slice());
    assert_eq!(totals(&store), (75.0, 700.0));

    let next = store.add(NewExercise::new("Yoga", 60.0, 150.0)).unwrap();
    assert!(saved.iter().all(|e| e.id < next.id));
}

#[test]
fn opening_over_corrupt_value_starts_empty() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvRepository::new(&conn);
    kv.set(EXERCISES_KEY, "{definitely not a list").unwrap();

    let store = ExerciseStore::open(&kv).unwrap();
    assert!(store.exercises().is_empty());
    assert_eq!(totals(&store), (0.0, 0.0));
}

#[test]
fn failed_write_leaves_memory_unchanged() {
    let kv = CountingKv::default();
    let mut store = ExerciseStore::open(&kv).unwrap();
    let kept = store.add(NewExercise::new("Running", 30.0, 300.0)).unwrap();

    kv.fail_writes.set(true);
    let err = store
        .add(NewExercise::new("Cycling", 45.0, 400.0))
        .unwrap_err();
    assert!(matches!(err, StoreError::Persist(_)));
    assert!(matches!(store.delete(kept.id), Err(StoreError::Persist(_))));

    assert_eq!(store.exercises(), &[kept]);
    assert_eq!(totals(&store), (30.0, 300.0));
}

#[test]
fn non_finite_input_is_rejected_and_storage_stays_in_sync() {
    let kv = MemoryKvRepository::new();
    let mut store = ExerciseStore::open(&kv).unwrap();
    let kept = store.add(NewExercise::new("Running", 30.0, 300.0)).unwrap();

    let err = store
        .add(NewExercise::new("Broken", f64::NAN, 10.0))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Persist(RepoError::NonFiniteField { field: "duration", .. })
    ));
    let err = store
        .add(NewExercise::new("Broken", 10.0, f64::INFINITY))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Persist(RepoError::NonFiniteField { field: "calories", .. })
    ));

    assert_eq!(store.exercises(), &[kept]);
    let reopened = ExerciseStore::open(&kv).unwrap();
    assert_eq!(reopened.exercises(), store.exercises());
}

#[test]
fn delete_removes_every_record_sharing_a_legacy_id() {
    let kv = MemoryKvRepository::new();
    kv.set(
        EXERCISES_KEY,
        r#"[
            {"id": 20, "activity": "Swim", "duration": 30, "calories": 250},
            {"id": 10, "activity": "Run", "duration": 20, "calories": 200},
            {"id": 10, "activity": "Run again", "duration": 25, "calories": 240},
            {"id": 5, "activity": "Walk", "duration": 40, "calories": 150}
        ]"#,
    )
    .unwrap();
    let mut store = ExerciseStore::open(&kv).unwrap();
    assert_eq!(store.exercises().len(), 4);

    assert!(store.delete(10).unwrap());
    let ids = store.exercises().iter().map(|e| e.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![20, 5]);
    assert_eq!(totals(&store), (70.0, 400.0));

    let reopened = ExerciseStore::open(&kv).unwrap();
    assert_eq!(reopened.exercises(), store.exercises());
}

#[test]
fn add_fails_cleanly_when_ids_are_exhausted() {
    let kv = MemoryKvRepository::new();
    kv.set(
        EXERCISES_KEY,
        &format!(
            r#"[{{"id": {}, "activity": "Last", "duration": 1, "calories": 1}}]"#,
            i64::MAX
        ),
    )
    .unwrap();
    let mut store = ExerciseStore::open(&kv).unwrap();

    let err = store.add(NewExercise::new("Overflow", 1.0, 1.0)).unwrap_err();
    assert!(matches!(err, StoreError::IdsExhausted));
    assert_eq!(store.exercises().len(), 1);
    assert_eq!(store.exercises()[0].id, i64::MAX);
}

#[test]
fn clear_empties_store_and_storage() {
    let kv = MemoryKvRepository::new();
    let mut store = ExerciseStore::open(&kv).unwrap();
    store.add(NewExercise::new("Running", 30.0, 300.0)).unwrap();

    store.clear().unwrap();
    assert!(store.exercises().is_empty());
    assert_eq!(store.summary().entry_count, 0);
    assert_eq!(kv.get(EXERCISES_KEY).unwrap(), None);
}

fn totals<K: KvRepository>(store: &ExerciseStore<K>) -> (f64, f64) {
    let summary = store.summary();
    (summary.total_duration, summary.total_calories)
}

#[derive(Default)]
struct CountingKv {
    inner: MemoryKvRepository,
    writes: Cell<usize>,
    fail_writes: Cell<bool>,
}

impl KvRepository for CountingKv {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        if self.fail_writes.get() {
            return Err(RepoError::Db(fittrack_core::db::DbError::Sqlite(
                rusqlite::Error::InvalidQuery,
            )));
        }
        self.writes.set(self.writes.get() + 1);
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> RepoResult<bool> {
        self.inner.remove(key)
    }
}
