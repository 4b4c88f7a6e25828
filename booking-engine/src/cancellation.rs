//! Cancellation workflow
//!
//! Authorizes the requester, quotes the refund tier, releases seats, marks
//! the booking cancelled, then settles the refund through the gateway.
//! Ordering matters: the refund record is persisted in `pending` before the
//! gateway is called, so a crash between the two leaves an auditable trail
//! instead of silent money loss.
//!
//! Gateway and notification failures are deliberately non-fatal. Once seats
//! are back in the pool and the booking is cancelled, the cancellation has
//! happened; a failed refund is recorded as `failed` for staff follow-up,
//! never rolled back into a live booking.

use std::sync::Arc;

use shared::error::{BookingError, ErrorCode};
use shared::models::{
    Booking, BookingStatus, PaymentStatus, RefundRecord, RefundStatus, Screening,
};
use shared::util::now_millis;
use thiserror::Error;

use crate::config::EngineConfig;
use crate::gateway::{NotificationService, PaymentRefundGateway};
use crate::inventory::{InventoryError, SeatInventory, SeatOwner};
use crate::refund::{RefundPolicyError, RefundSchedule};
use crate::repository::{
    update_booking_versioned, BookingRepository, RepositoryError, ScreeningRepository,
};

/// Who is asking for the cancellation
#[derive(Debug, Clone)]
pub struct Requester {
    pub id: String,
    pub is_admin: bool,
}

impl Requester {
    pub fn customer(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_admin: false,
        }
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_admin: true,
        }
    }

    fn may_cancel(&self, booking: &Booking) -> bool {
        self.is_admin || self.id == booking.user_id
    }
}

/// What the workflow settled on
#[derive(Debug, Clone)]
pub struct CancellationOutcome {
    /// The booking after cancellation, refund record included
    pub booking: Booking,
    /// Amount quoted for refund (0.0 when nothing was paid)
    pub refund_amount: f64,
    /// Tier percentage behind the amount
    pub refund_percentage: u32,
}

#[derive(Debug, Error)]
pub enum CancellationError {
    #[error("booking not found: {0}")]
    BookingNotFound(String),

    #[error("screening not found: {0}")]
    ScreeningNotFound(String),

    #[error("requester {0} may not cancel this booking")]
    Unauthorized(String),

    #[error("booking {0} is already cancelled")]
    AlreadyCancelled(String),

    #[error("booking {booking_id} is {status:?} and cannot be cancelled")]
    NotCancellable {
        booking_id: String,
        status: BookingStatus,
    },

    #[error("screening {0} has already started")]
    PastScreening(String),

    #[error(transparent)]
    Policy(#[from] RefundPolicyError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<CancellationError> for BookingError {
    fn from(err: CancellationError) -> Self {
        let code = match &err {
            CancellationError::BookingNotFound(_) | CancellationError::ScreeningNotFound(_) => {
                ErrorCode::NotFound
            }
            CancellationError::Unauthorized(_) => ErrorCode::Unauthorized,
            CancellationError::AlreadyCancelled(_) => ErrorCode::AlreadyCancelled,
            CancellationError::NotCancellable { .. } => ErrorCode::Validation,
            CancellationError::PastScreening(_) => ErrorCode::PastScreening,
            CancellationError::Policy(RefundPolicyError::WindowClosed { .. }) => {
                ErrorCode::CancellationWindowClosed
            }
            CancellationError::Inventory(inner) => inner.code(),
            CancellationError::Repository(RepositoryError::StaleVersion { .. })
            | CancellationError::Repository(RepositoryError::RetriesExhausted(_))
            | CancellationError::Repository(RepositoryError::DuplicateId(_)) => ErrorCode::Conflict,
            CancellationError::Repository(_) => ErrorCode::NotFound,
        };
        BookingError::new(code, err.to_string())
    }
}

pub type CancellationResult<T> = Result<T, CancellationError>;

pub struct CancellationWorkflow {
    bookings: Arc<dyn BookingRepository>,
    screenings: Arc<dyn ScreeningRepository>,
    inventory: Arc<SeatInventory>,
    schedule: RefundSchedule,
    refund_gateway: Arc<dyn PaymentRefundGateway>,
    notifier: Arc<dyn NotificationService>,
    retry_limit: u32,
}

impl CancellationWorkflow {
    pub fn new(
        config: &EngineConfig,
        schedule: RefundSchedule,
        bookings: Arc<dyn BookingRepository>,
        screenings: Arc<dyn ScreeningRepository>,
        inventory: Arc<SeatInventory>,
        refund_gateway: Arc<dyn PaymentRefundGateway>,
        notifier: Arc<dyn NotificationService>,
    ) -> Self {
        Self {
            bookings,
            screenings,
            inventory,
            schedule,
            refund_gateway,
            notifier,
            retry_limit: config.conflict_retry_limit,
        }
    }

    /// Cancel a booking on behalf of `requester`.
    ///
    /// Validation happens before any state changes; from seat release
    /// onward the cancellation is committed and later failures only
    /// degrade the refund record.
    pub async fn cancel(
        &self,
        booking_id: &str,
        requester: &Requester,
        reason: Option<String>,
    ) -> CancellationResult<CancellationOutcome> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| CancellationError::BookingNotFound(booking_id.to_string()))?;

        if !requester.may_cancel(&booking) {
            return Err(CancellationError::Unauthorized(requester.id.clone()));
        }
        match booking.booking_status {
            BookingStatus::Pending | BookingStatus::Confirmed => {}
            BookingStatus::Cancelled => {
                return Err(CancellationError::AlreadyCancelled(booking_id.to_string()))
            }
            status => {
                return Err(CancellationError::NotCancellable {
                    booking_id: booking_id.to_string(),
                    status,
                })
            }
        }

        let screening = self
            .screenings
            .find_by_id(&booking.screening_id)
            .await?
            .ok_or_else(|| CancellationError::ScreeningNotFound(booking.screening_id.clone()))?;
        let now = now_millis();
        if screening.has_started(now) {
            return Err(CancellationError::PastScreening(screening.id.clone()));
        }

        let quote = self
            .schedule
            .quote(screening.hours_until_start(now), booking.total_price)?;

        // Point of no return: seats go back to the pool first, so a crash
        // afterwards over-frees seats rather than stranding them.
        self.release_claim(&booking, &screening).await?;

        let refund_id = uuid::Uuid::new_v4().to_string();
        let paid = booking.payment_status == PaymentStatus::Completed;
        let cancelled = update_booking_versioned::<CancellationError, _>(
            self.bookings.as_ref(),
            booking_id,
            self.retry_limit,
            |b| {
                if b.booking_status == BookingStatus::Cancelled {
                    return Err(CancellationError::AlreadyCancelled(b.id.clone()));
                }
                let now = now_millis();
                b.booking_status = BookingStatus::Cancelled;
                b.cancellation_date = Some(now);
                b.cancellation_reason = reason.clone();
                b.reservation_expires_at = None;
                b.updated_at = now;
                if paid && quote.amount > 0.0 {
                    b.refunds.push(RefundRecord {
                        id: refund_id.clone(),
                        amount: quote.amount,
                        percentage: quote.percentage,
                        reason: reason.clone(),
                        status: RefundStatus::Pending,
                        transaction_id: None,
                        requested_at: now,
                        processed_at: None,
                    });
                }
                Ok(())
            },
        )
        .await?;

        let final_booking = if paid && quote.amount > 0.0 {
            self.settle_refund(&cancelled, &refund_id, quote.amount, quote.percentage)
                .await?
        } else {
            cancelled
        };

        if let Err(e) = self.notifier.send_cancellation_notice(&final_booking).await {
            tracing::warn!(booking_id, error = %e, "cancellation notice failed");
        }

        tracing::info!(
            booking_id,
            booking_number = %final_booking.booking_number,
            requester = %requester.id,
            refund_amount = quote.amount,
            refund_percentage = quote.percentage,
            "booking cancelled"
        );
        Ok(CancellationOutcome {
            booking: final_booking,
            refund_amount: if paid { quote.amount } else { 0.0 },
            refund_percentage: if paid { quote.percentage } else { 0 },
        })
    }

    /// Hand the booking's seats back. Pending bookings hold them as a
    /// reservation under the user, confirmed ones as a booked claim.
    async fn release_claim(
        &self,
        booking: &Booking,
        screening: &Screening,
    ) -> CancellationResult<()> {
        let owner = match booking.booking_status {
            BookingStatus::Pending => SeatOwner::Reservation(&booking.user_id),
            _ => SeatOwner::Booking(&booking.id),
        };
        self.inventory
            .release_seats(&screening.id, &booking.seats, Some(owner))
            .await?;
        Ok(())
    }

    /// Drive the pending refund record to its final state via the gateway.
    /// Gateway failure marks the record `failed` and is not an error here.
    async fn settle_refund(
        &self,
        booking: &Booking,
        refund_id: &str,
        amount: f64,
        percentage: u32,
    ) -> CancellationResult<Booking> {
        let (status, transaction_id) = if !booking.payment_method.supports_automatic_refund() {
            tracing::info!(
                booking_id = %booking.id,
                method = %booking.payment_method,
                "payment method needs manual refund handling"
            );
            (RefundStatus::ManualRequired, None)
        } else {
            match self
                .refund_gateway
                .refund(booking.payment_method, amount, &booking.booking_number)
                .await
            {
                Ok(txn) => (RefundStatus::Completed, Some(txn)),
                Err(e) => {
                    tracing::error!(
                        booking_id = %booking.id,
                        amount,
                        error = %e,
                        "refund gateway call failed; flagging for retry"
                    );
                    (RefundStatus::Failed, None)
                }
            }
        };

        let refund_id = refund_id.to_string();
        let updated = update_booking_versioned::<CancellationError, _>(
            self.bookings.as_ref(),
            &booking.id,
            self.retry_limit,
            |b| {
                let now = now_millis();
                if let Some(record) = b.refunds.iter_mut().find(|r| r.id == refund_id) {
                    record.status = status;
                    record.transaction_id = transaction_id.clone();
                    record.processed_at = Some(now);
                }
                if status == RefundStatus::Completed {
                    b.payment_status = if percentage == 100 {
                        PaymentStatus::Refunded
                    } else {
                        PaymentStatus::PartiallyRefunded
                    };
                }
                b.updated_at = now;
                Ok(())
            },
        )
        .await?;
        Ok(updated)
    }
}
