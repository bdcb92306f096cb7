//! Core use-case services.
//!
//! # Responsibility
//! - Hold the exercise log state and derive its totals.
//! - Keep CLI/FFI layers decoupled from storage details.

pub mod exercise_store;
pub mod summary;
