//! Booking service facade
//!
//! Wires the engine components together behind one surface that speaks
//! [`BookingError`] only, so embedders get stable error codes instead of
//! the internal error taxonomy. Construction validates the refund tier
//! table up front; a service never runs with a broken policy.

use std::sync::Arc;

use shared::error::{BookingError, ErrorCode};
use shared::models::{Booking, PaymentMethod, Seat};
use tokio_util::sync::CancellationToken;

use crate::cancellation::{CancellationOutcome, CancellationWorkflow, Requester};
use crate::config::EngineConfig;
use crate::gateway::{NotificationService, PaymentRefundGateway};
use crate::inventory::{SeatEvent, SeatInventory};
use crate::refund::ScheduleError;
use crate::repository::{BookingRepository, ScreeningRepository};
use crate::reservation::ReservationManager;
use crate::sweeper::ExpirySweeper;

pub struct BookingService {
    config: EngineConfig,
    inventory: Arc<SeatInventory>,
    reservations: Arc<ReservationManager>,
    cancellations: CancellationWorkflow,
    screenings: Arc<dyn ScreeningRepository>,
    bookings: Arc<dyn BookingRepository>,
}

impl BookingService {
    pub fn new(
        config: EngineConfig,
        screenings: Arc<dyn ScreeningRepository>,
        bookings: Arc<dyn BookingRepository>,
        refund_gateway: Arc<dyn PaymentRefundGateway>,
        notifier: Arc<dyn NotificationService>,
    ) -> Result<Self, ScheduleError> {
        let schedule = config.refund_schedule()?;
        let inventory = Arc::new(SeatInventory::new(
            screenings.clone(),
            config.conflict_retry_limit,
        ));
        let reservations = Arc::new(ReservationManager::new(
            &config,
            inventory.clone(),
            bookings.clone(),
            screenings.clone(),
            notifier.clone(),
        ));
        let cancellations = CancellationWorkflow::new(
            &config,
            schedule,
            bookings.clone(),
            screenings.clone(),
            inventory.clone(),
            refund_gateway,
            notifier,
        );
        Ok(Self {
            config,
            inventory,
            reservations,
            cancellations,
            screenings,
            bookings,
        })
    }

    /// Reserve seats and create a pending booking.
    pub async fn create_booking(
        &self,
        screening_id: &str,
        user_id: &str,
        seat_numbers: &[String],
        payment_method: PaymentMethod,
    ) -> Result<Booking, BookingError> {
        self.reservations
            .create_booking(screening_id, user_id, seat_numbers, payment_method)
            .await
            .map_err(Into::into)
    }

    /// Confirm payment on a pending booking, claiming the held seats.
    pub async fn confirm_payment(&self, booking_id: &str) -> Result<Booking, BookingError> {
        self.reservations
            .confirm_payment(booking_id)
            .await
            .map_err(Into::into)
    }

    /// Abandon a pending booking without payment.
    pub async fn release_booking(&self, booking_id: &str) -> Result<Booking, BookingError> {
        self.reservations
            .release_booking(booking_id)
            .await
            .map_err(Into::into)
    }

    /// Cancel a booking and settle the tiered refund.
    pub async fn cancel_booking(
        &self,
        booking_id: &str,
        requester: &Requester,
        reason: Option<String>,
    ) -> Result<CancellationOutcome, BookingError> {
        self.cancellations
            .cancel(booking_id, requester, reason)
            .await
            .map_err(Into::into)
    }

    pub async fn get_booking(&self, booking_id: &str) -> Result<Booking, BookingError> {
        self.reservations
            .get_booking(booking_id)
            .await
            .map_err(Into::into)
    }

    /// Seats a customer could claim on this screening right now.
    pub async fn available_seats(&self, screening_id: &str) -> Result<Vec<Seat>, BookingError> {
        self.inventory
            .available_seats(screening_id)
            .await
            .map_err(Into::into)
    }

    /// Subscribe to committed seat-map change events.
    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<SeatEvent> {
        self.inventory.subscribe()
    }

    /// Spawn the background expiry sweeper; cancel the returned token to
    /// stop it.
    pub fn spawn_sweeper(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let sweeper = ExpirySweeper::new(
            self.inventory.clone(),
            self.reservations.clone(),
            self.screenings.clone(),
            self.bookings.clone(),
            self.config.sweep_interval(),
            token.clone(),
        );
        tokio::spawn(sweeper.run());
        token
    }
}

// Convenience so embedders can bubble a bad config straight into the
// unified error type.
impl From<ScheduleError> for BookingError {
    fn from(err: ScheduleError) -> Self {
        BookingError::new(ErrorCode::Validation, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::{RecordingNotifier, RecordingRefundGateway};
    use crate::refund::RefundTier;
    use crate::repository::{MemoryBookingRepository, MemoryScreeningRepository};

    #[tokio::test]
    async fn test_bad_refund_config_is_rejected_at_construction() {
        let config = EngineConfig {
            refund_tiers: vec![RefundTier::new(2.0, 10), RefundTier::new(48.0, 100)],
            ..EngineConfig::default()
        };
        let result = BookingService::new(
            config,
            Arc::new(MemoryScreeningRepository::new()),
            Arc::new(MemoryBookingRepository::new()),
            Arc::new(RecordingRefundGateway::new()),
            Arc::new(RecordingNotifier::new()),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_missing_booking_surfaces_not_found_code() {
        let service = BookingService::new(
            EngineConfig::default(),
            Arc::new(MemoryScreeningRepository::new()),
            Arc::new(MemoryBookingRepository::new()),
            Arc::new(RecordingRefundGateway::new()),
            Arc::new(RecordingNotifier::new()),
        )
        .unwrap();

        let err = service.get_booking("missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.code.code(), "E1002");
    }
}
