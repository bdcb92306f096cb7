//! Flutter-facing bindings for the FitTrack core.

pub mod api;
