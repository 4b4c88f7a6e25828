//! Shared types for the booking engine
//!
//! Domain models, error codes and utility types used by the engine crate
//! and by any outer surface (HTTP/CLI) built on top of it.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{BookingError, ErrorCode};
pub use serde::{Deserialize, Serialize};
