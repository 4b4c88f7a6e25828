//! Cinema seat inventory and booking lifecycle engine
//!
//! ```text
//!                    ┌────────────────────┐
//!                    │   BookingService   │   facade, BookingError codes
//!                    └──┬──────┬──────┬───┘
//!           ┌───────────┘      │      └───────────┐
//!  ┌────────▼─────────┐ ┌──────▼───────┐ ┌────────▼─────────┐
//!  │ ReservationMgr   │ │ Cancellation │ │  ExpirySweeper   │
//!  │ reserve/confirm/ │ │ authorize,   │ │  periodic lapse  │
//!  │ release/expire   │ │ quote, refund│ │  cleanup         │
//!  └────────┬─────────┘ └──────┬───────┘ └────────┬─────────┘
//!           └───────────┬──────┴─────────────┬────┘
//!                ┌──────▼───────┐     ┌──────▼────────┐
//!                │ SeatInventory│     │ RefundSchedule│
//!                │ CAS seat map │     │ tier table    │
//!                └──────┬───────┘     └───────────────┘
//!                ┌──────▼───────┐
//!                │ Repositories │  versioned CAS storage
//!                └──────────────┘
//! ```
//!
//! Concurrency model: no locks are held across awaits. Every seat-map or
//! booking write is an optimistic compare-and-swap against the version the
//! writer read, retried a bounded number of times on a race. Seat holds
//! carry a soft TTL: a lapsed hold counts as available immediately,
//! whether or not the sweeper has run.

pub mod booking_number;
pub mod cancellation;
pub mod config;
pub mod gateway;
pub mod inventory;
pub mod money;
pub mod refund;
pub mod repository;
pub mod reservation;
pub mod service;
pub mod sweeper;

pub use cancellation::{CancellationOutcome, CancellationWorkflow, Requester};
pub use config::EngineConfig;
pub use inventory::{Reservation, SeatClaim, SeatEvent, SeatInventory, SeatOwner};
pub use refund::{RefundQuote, RefundSchedule, RefundTier};
pub use reservation::ReservationManager;
pub use service::BookingService;
pub use sweeper::{ExpirySweeper, SweepReport};

pub use shared::error::{BookingError, ErrorCode};
pub use shared::models;
