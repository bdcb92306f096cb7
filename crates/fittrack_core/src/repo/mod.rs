//! Repository layer: durable storage behind the exercise log.
//!
//! # Responsibility
//! - Define the key-value contract the log persists through.
//! - Isolate SQLite and JSON details from the store/service layer.
//!
//! # Invariants
//! - Only `exercise_repo` knows the persisted key and value layout.

pub mod exercise_repo;
pub mod kv_repo;
