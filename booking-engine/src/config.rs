//! Engine configuration
//!
//! Policy values (refund tiers, reservation TTL) are configuration, not
//! hardcoded business rules. Scalar knobs can be overridden from the
//! environment; the refund tier table comes from the deserialized form or
//! the stock default.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::refund::{self, RefundSchedule, RefundTier, ScheduleError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// How long a seat hold survives without payment confirmation
    pub reservation_ttl_secs: u64,
    /// Seat-count bound per booking (inclusive)
    pub max_seats_per_booking: usize,
    /// Extra attempts after a version race before surfacing a conflict
    pub conflict_retry_limit: u32,
    /// Attempts to find a collision-free booking number
    pub booking_number_attempts: u32,
    /// Expiry sweeper period
    pub sweep_interval_secs: u64,
    /// Refund tier table, highest tier first
    pub refund_tiers: Vec<RefundTier>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reservation_ttl_secs: 600,
            max_seats_per_booking: 10,
            conflict_retry_limit: 3,
            booking_number_attempts: 5,
            sweep_interval_secs: 60,
            refund_tiers: refund::default_tiers(),
        }
    }
}

impl EngineConfig {
    /// Defaults with scalar overrides from the environment.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            reservation_ttl_secs: std::env::var("RESERVATION_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.reservation_ttl_secs),
            max_seats_per_booking: std::env::var("MAX_SEATS_PER_BOOKING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_seats_per_booking),
            conflict_retry_limit: std::env::var("CONFLICT_RETRY_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.conflict_retry_limit),
            booking_number_attempts: std::env::var("BOOKING_NUMBER_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.booking_number_attempts),
            sweep_interval_secs: std::env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sweep_interval_secs),
            refund_tiers: defaults.refund_tiers,
        }
    }

    pub fn reservation_ttl(&self) -> Duration {
        Duration::from_secs(self.reservation_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Validate the tier table into a usable schedule.
    pub fn refund_schedule(&self) -> Result<RefundSchedule, ScheduleError> {
        RefundSchedule::new(self.refund_tiers.clone())
    }
}
