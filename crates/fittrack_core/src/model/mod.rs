//! Domain model for the exercise log.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//!
//! # Invariants
//! - Every record is identified by an `ExerciseId` unique within the log.
//! - Records are immutable after creation; removal is the only lifecycle step.

pub mod exercise;
