//! Core types and refresh wiring for the Bin Buddy collection-date notifier.

/// Per-stream date entities exposed to the host.
pub mod entity;
/// Domain models and identifiers shared by the council backend and the host.
pub mod model;
/// Bundle of ports making up one council backend.
pub mod plugin;
/// Traits describing the council backend interfaces.
pub mod ports;
/// Refresh cycle coordinator owning the latest collection dates.
pub mod refresh;
/// Periodic tick sources driving the refresh cycle.
pub mod schedule;

pub use entity::*;
pub use model::*;
pub use plugin::*;
pub use ports::*;
pub use refresh::*;
pub use schedule::*;
