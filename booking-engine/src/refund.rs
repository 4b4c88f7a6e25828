//! Refund policy engine
//!
//! A pure tier table mapping hours-until-showtime to a refund percentage.
//! No side effects and no clock access: callers pass the hour distance in,
//! which keeps the policy independently testable.

use crate::money;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One refund tier: applies when `hours_until_showtime >= min_hours`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RefundTier {
    pub min_hours: f64,
    pub percentage: u32,
}

impl RefundTier {
    pub const fn new(min_hours: f64, percentage: u32) -> Self {
        Self {
            min_hours,
            percentage,
        }
    }
}

/// Errors from building a schedule out of config values
#[derive(Debug, Error, PartialEq)]
pub enum ScheduleError {
    #[error("refund schedule must have at least one tier")]
    Empty,
    #[error("refund tiers must be sorted by min_hours, strictly descending")]
    NotDescending,
    #[error("refund percentage {0} exceeds 100")]
    PercentageOutOfRange(u32),
    #[error("tier min_hours must be finite and non-negative, got {0}")]
    InvalidHours(f64),
}

/// Policy rejection: the request falls inside the no-cancellation window
#[derive(Debug, Error, PartialEq)]
pub enum RefundPolicyError {
    #[error(
        "cancellation window closed: bookings cannot be cancelled less than \
         {cutoff_hours} hours before showtime"
    )]
    WindowClosed { cutoff_hours: f64 },
}

/// Computed refund decision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RefundQuote {
    pub percentage: u32,
    pub amount: f64,
}

/// Ordered refund tier table, evaluated top-down, first match wins
#[derive(Debug, Clone, PartialEq)]
pub struct RefundSchedule {
    tiers: Vec<RefundTier>,
}

impl Default for RefundSchedule {
    fn default() -> Self {
        Self {
            tiers: default_tiers(),
        }
    }
}

/// Stock policy: 48h/100%, 24h/75%, 12h/50%, 6h/25%, 2h/10%, under 2h rejected.
pub fn default_tiers() -> Vec<RefundTier> {
    vec![
        RefundTier::new(48.0, 100),
        RefundTier::new(24.0, 75),
        RefundTier::new(12.0, 50),
        RefundTier::new(6.0, 25),
        RefundTier::new(2.0, 10),
    ]
}

impl RefundSchedule {
    /// Build a schedule from config tiers, validating shape up front so the
    /// hot path never has to.
    pub fn new(tiers: Vec<RefundTier>) -> Result<Self, ScheduleError> {
        if tiers.is_empty() {
            return Err(ScheduleError::Empty);
        }
        for tier in &tiers {
            if tier.percentage > 100 {
                return Err(ScheduleError::PercentageOutOfRange(tier.percentage));
            }
            if !tier.min_hours.is_finite() || tier.min_hours < 0.0 {
                return Err(ScheduleError::InvalidHours(tier.min_hours));
            }
        }
        for pair in tiers.windows(2) {
            if pair[1].min_hours >= pair[0].min_hours {
                return Err(ScheduleError::NotDescending);
            }
        }
        Ok(Self { tiers })
    }

    /// Hours below which cancellation is rejected outright.
    pub fn cutoff_hours(&self) -> f64 {
        self.tiers.last().map(|t| t.min_hours).unwrap_or(0.0)
    }

    /// Map hour distance and total price to a refund decision.
    pub fn quote(
        &self,
        hours_until_showtime: f64,
        total_price: f64,
    ) -> Result<RefundQuote, RefundPolicyError> {
        for tier in &self.tiers {
            if hours_until_showtime >= tier.min_hours {
                return Ok(RefundQuote {
                    percentage: tier.percentage,
                    amount: money::percentage_of(total_price, tier.percentage),
                });
            }
        }
        Err(RefundPolicyError::WindowClosed {
            cutoff_hours: self.cutoff_hours(),
        })
    }
}
