//! Domain models
//!
//! Shared between the booking engine and any outer API surface.
//! Money is stored as `f64` (arithmetic goes through the engine's decimal
//! helpers); timestamps are `i64` Unix milliseconds.

pub mod booking;
pub mod screening;

// Re-exports
pub use booking::*;
pub use screening::*;
