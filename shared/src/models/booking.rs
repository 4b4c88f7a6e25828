//! Booking and refund models
//!
//! A `Booking` is one customer's claim over 1-10 seats on exactly one
//! screening. Once cancelled or completed it is terminal and immutable
//! except for refund-status updates.

use serde::{Deserialize, Serialize};

/// How the customer pays (and gets refunded)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Cash,
    Online,
}

impl PaymentMethod {
    /// Cash cannot be refunded through the gateway; it needs manual handling
    /// at the box office.
    pub fn supports_automatic_refund(&self) -> bool {
        !matches!(self, Self::Cash)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Card => "card",
            Self::Cash => "cash",
            Self::Online => "online",
        };
        write!(f, "{name}")
    }
}

/// Payment lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
    PartiallyRefunded,
}

/// Booking lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    Expired,
}

impl BookingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed | Self::Expired)
    }
}

/// Outcome of one refund attempt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    /// Gateway cannot process this payment method (e.g. cash); staff must
    /// refund by hand.
    ManualRequired,
}

/// One refund attempt against a booking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefundRecord {
    /// Refund ID
    pub id: String,
    /// Amount to return (already tier-adjusted and rounded)
    pub amount: f64,
    /// Tier percentage that produced the amount
    pub percentage: u32,
    /// Customer-supplied cancellation reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Refund processing state
    pub status: RefundStatus,
    /// Gateway transaction ID once processed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// When the refund was requested (millis)
    pub requested_at: i64,
    /// When the gateway answered (millis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<i64>,
}

/// A customer's durable claim over seats plus payment/cancellation state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    /// Booking ID
    pub id: String,
    /// Owning customer
    pub user_id: String,
    /// The screening the seats belong to
    pub screening_id: String,
    /// Claimed seat numbers (1-10, disjoint per screening)
    pub seats: Vec<String>,
    /// Total price across all seats
    pub total_price: f64,
    /// Average per-seat price (display)
    pub ticket_price: f64,
    /// Payment method chosen at creation
    pub payment_method: PaymentMethod,
    /// Payment lifecycle state
    pub payment_status: PaymentStatus,
    /// Booking lifecycle state
    pub booking_status: BookingStatus,
    /// Globally unique human-readable number, e.g. BK-20260825-04217
    pub booking_number: String,
    /// Ordered refund attempts
    #[serde(default)]
    pub refunds: Vec<RefundRecord>,
    /// Seat-hold expiry while pending (millis); cleared on confirmation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_expires_at: Option<i64>,
    /// When the booking was cancelled (millis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_date: Option<i64>,
    /// Why the booking was cancelled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    /// Creation timestamp (millis)
    pub created_at: i64,
    /// Last update timestamp (millis)
    pub updated_at: i64,
    /// Optimistic-concurrency version; bumped by the repository on save
    pub version: u64,
}

impl Booking {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        screening_id: impl Into<String>,
        seats: Vec<String>,
        total_price: f64,
        ticket_price: f64,
        payment_method: PaymentMethod,
        booking_number: impl Into<String>,
        now: i64,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            screening_id: screening_id.into(),
            seats,
            total_price,
            ticket_price,
            payment_method,
            payment_status: PaymentStatus::Pending,
            booking_status: BookingStatus::Pending,
            booking_number: booking_number.into(),
            refunds: Vec::new(),
            reservation_expires_at: None,
            cancellation_date: None,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }

    /// Sum of refunds the gateway has actually completed.
    /// Invariant: never exceeds `total_price`.
    pub fn refunded_total(&self) -> f64 {
        self.refunds
            .iter()
            .filter(|r| r.status == RefundStatus::Completed)
            .map(|r| r.amount)
            .sum()
    }

    /// Whether the pending seat hold has lapsed.
    pub fn is_reservation_lapsed(&self, now: i64) -> bool {
        self.booking_status == BookingStatus::Pending
            && self.reservation_expires_at.is_some_and(|at| at <= now)
    }
}
