//! Reservation manager
//!
//! Orchestrates the booking-attempt state machine over seat state and
//! booking status:
//!
//! ```text
//! Requested ──reserve──► Reserved ──confirm──► Booked (terminal here)
//!     │                     │  │
//!     └─► Rejected          │  └─TTL lapse──► Expired
//!                           └─explicit abandon─► Released
//! ```
//!
//! The machine has no shadow state of its own: `Reserved` is seat holds
//! plus a pending booking, `Booked` is booked seats plus a confirmed
//! booking. Confirmation re-validates the hold; a lapsed reservation can
//! never be confirmed.

use std::sync::Arc;
use std::time::Duration;

use shared::error::{BookingError, ErrorCode};
use shared::models::{Booking, BookingStatus, PaymentMethod, PaymentStatus};
use shared::util::now_millis;
use thiserror::Error;

use crate::booking_number::{BookingNumberError, BookingNumberGenerator};
use crate::config::EngineConfig;
use crate::gateway::NotificationService;
use crate::inventory::{InventoryError, SeatInventory, SeatOwner};
use crate::money;
use crate::repository::{
    update_booking_versioned, BookingRepository, RepositoryError, ScreeningRepository,
};

#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("invalid booking request: {0}")]
    Validation(String),

    #[error("screening not found: {0}")]
    ScreeningNotFound(String),

    #[error("booking not found: {0}")]
    BookingNotFound(String),

    #[error("screening {0} has already started")]
    ScreeningStarted(String),

    #[error("screening {0} is not open for booking")]
    ScreeningNotBookable(String),

    #[error("booking {booking_id} is {status:?}, expected pending")]
    NotPending {
        booking_id: String,
        status: BookingStatus,
    },

    #[error("reservation for booking {0} has expired; seats were released")]
    ReservationExpired(String),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    BookingNumber(#[from] BookingNumberError),
}

impl From<ReservationError> for BookingError {
    fn from(err: ReservationError) -> Self {
        let code = match &err {
            ReservationError::Validation(_)
            | ReservationError::ScreeningNotBookable(_)
            | ReservationError::NotPending { .. } => ErrorCode::Validation,
            ReservationError::ScreeningNotFound(_) | ReservationError::BookingNotFound(_) => {
                ErrorCode::NotFound
            }
            ReservationError::ScreeningStarted(_) => ErrorCode::PastScreening,
            ReservationError::ReservationExpired(_) => ErrorCode::ReservationExpired,
            ReservationError::Inventory(inner) => inner.code(),
            ReservationError::Repository(RepositoryError::StaleVersion { .. })
            | ReservationError::Repository(RepositoryError::RetriesExhausted(_))
            | ReservationError::Repository(RepositoryError::DuplicateId(_)) => ErrorCode::Conflict,
            ReservationError::Repository(_) => ErrorCode::NotFound,
            ReservationError::BookingNumber(_) => ErrorCode::Internal,
        };
        BookingError::new(code, err.to_string())
    }
}

pub type ReservationResult<T> = Result<T, ReservationError>;

pub struct ReservationManager {
    inventory: Arc<SeatInventory>,
    bookings: Arc<dyn BookingRepository>,
    screenings: Arc<dyn ScreeningRepository>,
    notifier: Arc<dyn NotificationService>,
    number_generator: BookingNumberGenerator,
    reservation_ttl: Duration,
    max_seats_per_booking: usize,
    retry_limit: u32,
}

impl ReservationManager {
    pub fn new(
        config: &EngineConfig,
        inventory: Arc<SeatInventory>,
        bookings: Arc<dyn BookingRepository>,
        screenings: Arc<dyn ScreeningRepository>,
        notifier: Arc<dyn NotificationService>,
    ) -> Self {
        Self {
            inventory,
            bookings,
            screenings,
            notifier,
            number_generator: BookingNumberGenerator::new(config.booking_number_attempts),
            reservation_ttl: config.reservation_ttl(),
            max_seats_per_booking: config.max_seats_per_booking,
            retry_limit: config.conflict_retry_limit,
        }
    }

    /// Reserve the requested seats and create a pending booking.
    pub async fn create_booking(
        &self,
        screening_id: &str,
        user_id: &str,
        seat_numbers: &[String],
        payment_method: PaymentMethod,
    ) -> ReservationResult<Booking> {
        self.validate_seat_request(seat_numbers)?;

        let now = now_millis();
        let screening = self
            .screenings
            .find_by_id(screening_id)
            .await?
            .ok_or_else(|| ReservationError::ScreeningNotFound(screening_id.to_string()))?;
        if screening.has_started(now) {
            return Err(ReservationError::ScreeningStarted(screening_id.to_string()));
        }
        if !screening.status.is_occupancy_driven() {
            return Err(ReservationError::ScreeningNotBookable(
                screening_id.to_string(),
            ));
        }

        let reservation = self
            .inventory
            .reserve_seats(screening_id, seat_numbers, self.reservation_ttl, user_id)
            .await?;

        // Seats are now held; anything failing past this point must hand
        // them back before surfacing.
        let booking_number = match self.number_generator.generate(self.bookings.as_ref()).await {
            Ok(number) => number,
            Err(e) => {
                self.rollback_hold(screening_id, seat_numbers, user_id).await;
                return Err(e.into());
            }
        };

        let mut booking = Booking::new(
            uuid::Uuid::new_v4().to_string(),
            user_id,
            screening_id,
            seat_numbers.to_vec(),
            reservation.total_price,
            money::per_seat_price(reservation.total_price, seat_numbers.len()),
            payment_method,
            booking_number,
            now,
        );
        booking.reservation_expires_at = Some(reservation.expires_at);

        if let Err(e) = self.bookings.insert(&booking).await {
            self.rollback_hold(screening_id, seat_numbers, user_id).await;
            return Err(e.into());
        }

        tracing::info!(
            booking_id = %booking.id,
            booking_number = %booking.booking_number,
            screening_id,
            user_id,
            seats = ?seat_numbers,
            total_price = booking.total_price,
            "booking created"
        );
        Ok(booking)
    }

    /// Payment completed: convert the hold into a booked claim and confirm
    /// the booking. Rejected with `ReservationExpired` if the TTL lapsed.
    pub async fn confirm_payment(&self, booking_id: &str) -> ReservationResult<Booking> {
        let booking = self.get_booking(booking_id).await?;
        match booking.booking_status {
            BookingStatus::Pending => {}
            BookingStatus::Expired => {
                return Err(ReservationError::ReservationExpired(booking_id.to_string()))
            }
            status => {
                return Err(ReservationError::NotPending {
                    booking_id: booking_id.to_string(),
                    status,
                })
            }
        }

        let now = now_millis();
        if booking.is_reservation_lapsed(now) {
            self.expire_internal(&booking).await?;
            return Err(ReservationError::ReservationExpired(booking_id.to_string()));
        }

        match self
            .inventory
            .book_seats(
                &booking.screening_id,
                &booking.seats,
                &booking.id,
                &booking.user_id,
            )
            .await
        {
            Ok(_) => {}
            Err(InventoryError::Seat(e)) => {
                // The hold lapsed mid-flight and someone else claimed a seat.
                tracing::warn!(booking_id, error = %e, "seat claim failed on confirmation");
                self.expire_internal(&booking).await?;
                return Err(ReservationError::ReservationExpired(booking_id.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        let updated = update_booking_versioned::<ReservationError, _>(
            self.bookings.as_ref(),
            booking_id,
            self.retry_limit,
            |b| {
                if b.booking_status != BookingStatus::Pending {
                    return Err(ReservationError::NotPending {
                        booking_id: b.id.clone(),
                        status: b.booking_status,
                    });
                }
                b.booking_status = BookingStatus::Confirmed;
                b.payment_status = PaymentStatus::Completed;
                b.reservation_expires_at = None;
                b.updated_at = now_millis();
                Ok(())
            },
        )
        .await?;

        if let Err(e) = self.notifier.send_confirmation_notice(&updated).await {
            tracing::warn!(booking_id, error = %e, "confirmation notice failed");
        }
        tracing::info!(booking_id, booking_number = %updated.booking_number, "booking confirmed");
        Ok(updated)
    }

    /// Explicit abandon of a pending booking (Reserved → Released): seats
    /// go back to available, the booking is cancelled without a refund
    /// record since nothing was paid.
    pub async fn release_booking(&self, booking_id: &str) -> ReservationResult<Booking> {
        let booking = self.get_booking(booking_id).await?;
        if booking.booking_status != BookingStatus::Pending {
            return Err(ReservationError::NotPending {
                booking_id: booking_id.to_string(),
                status: booking.booking_status,
            });
        }

        self.inventory
            .release_seats(
                &booking.screening_id,
                &booking.seats,
                Some(SeatOwner::Reservation(&booking.user_id)),
            )
            .await?;

        let updated = update_booking_versioned::<ReservationError, _>(
            self.bookings.as_ref(),
            booking_id,
            self.retry_limit,
            |b| {
                if b.booking_status != BookingStatus::Pending {
                    return Err(ReservationError::NotPending {
                        booking_id: b.id.clone(),
                        status: b.booking_status,
                    });
                }
                b.booking_status = BookingStatus::Cancelled;
                b.cancellation_date = Some(now_millis());
                b.cancellation_reason = Some("abandoned before payment".to_string());
                b.reservation_expires_at = None;
                b.updated_at = now_millis();
                Ok(())
            },
        )
        .await?;
        tracing::info!(booking_id, "pending booking released");
        Ok(updated)
    }

    /// Transition a pending booking whose hold lapsed to `expired`,
    /// releasing any seats it still holds. Returns `None` when there is
    /// nothing to do (not pending, or hold still live).
    pub async fn expire_booking(&self, booking_id: &str) -> ReservationResult<Option<Booking>> {
        let booking = self.get_booking(booking_id).await?;
        if !booking.is_reservation_lapsed(now_millis()) {
            return Ok(None);
        }
        let updated = self.expire_internal(&booking).await?;
        Ok(Some(updated))
    }

    pub async fn get_booking(&self, booking_id: &str) -> ReservationResult<Booking> {
        self.bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| ReservationError::BookingNotFound(booking_id.to_string()))
    }

    async fn expire_internal(&self, booking: &Booking) -> ReservationResult<Booking> {
        self.inventory
            .release_seats(
                &booking.screening_id,
                &booking.seats,
                Some(SeatOwner::Reservation(&booking.user_id)),
            )
            .await?;
        // A prior confirmation attempt may have committed the seat claim and
        // then lost the booking write; those seats are booked under this id
        // and must come back too, or the expired booking strands them.
        self.inventory
            .release_seats(
                &booking.screening_id,
                &booking.seats,
                Some(SeatOwner::Booking(&booking.id)),
            )
            .await?;

        let updated = update_booking_versioned::<ReservationError, _>(
            self.bookings.as_ref(),
            &booking.id,
            self.retry_limit,
            |b| {
                if b.booking_status == BookingStatus::Pending {
                    b.booking_status = BookingStatus::Expired;
                    b.updated_at = now_millis();
                }
                Ok(())
            },
        )
        .await?;
        tracing::info!(booking_id = %booking.id, "pending booking expired");
        Ok(updated)
    }

    /// Seats were held but the booking could not be created; hand them back.
    async fn rollback_hold(&self, screening_id: &str, seat_numbers: &[String], user_id: &str) {
        if let Err(e) = self
            .inventory
            .release_seats(
                screening_id,
                seat_numbers,
                Some(SeatOwner::Reservation(user_id)),
            )
            .await
        {
            tracing::error!(screening_id, error = %e, "failed to roll back seat hold");
        }
    }

    fn validate_seat_request(&self, seat_numbers: &[String]) -> ReservationResult<()> {
        if seat_numbers.is_empty() {
            return Err(ReservationError::Validation(
                "at least one seat must be requested".to_string(),
            ));
        }
        if seat_numbers.len() > self.max_seats_per_booking {
            return Err(ReservationError::Validation(format!(
                "at most {} seats per booking, got {}",
                self.max_seats_per_booking,
                seat_numbers.len()
            )));
        }
        for (i, number) in seat_numbers.iter().enumerate() {
            if seat_numbers[..i].contains(number) {
                return Err(ReservationError::Validation(format!(
                    "duplicate seat number: {number}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::RecordingNotifier;
    use crate::repository::{MemoryBookingRepository, MemoryScreeningRepository};
    use shared::models::{Screening, ScreeningStatus, Seat, SeatStatus, SeatType};

    struct Harness {
        manager: ReservationManager,
        screenings: Arc<MemoryScreeningRepository>,
        bookings: Arc<MemoryBookingRepository>,
        notifier: Arc<RecordingNotifier>,
    }

    async fn setup(seat_count: u32, config: EngineConfig) -> Harness {
        let screenings = Arc::new(MemoryScreeningRepository::new());
        let bookings = Arc::new(MemoryBookingRepository::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let inventory = Arc::new(SeatInventory::new(
            screenings.clone(),
            config.conflict_retry_limit,
        ));

        let seats = (1..=seat_count)
            .map(|c| Seat::new("A", c, SeatType::Standard, 10.0))
            .collect();
        let far_future = now_millis() + 100 * 3_600_000;
        let mut screening = Screening::new("s1", "Movie", "Room 1", far_future, seats);
        screening.status = ScreeningStatus::Open;
        screenings.insert(&screening).await.unwrap();

        let manager = ReservationManager::new(
            &config,
            inventory,
            bookings.clone(),
            screenings.clone(),
            notifier.clone(),
        );
        Harness {
            manager,
            screenings,
            bookings,
            notifier,
        }
    }

    fn nums(numbers: &[&str]) -> Vec<String> {
        numbers.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn test_create_booking_reserves_and_persists() {
        let h = setup(4, EngineConfig::default()).await;
        let booking = h
            .manager
            .create_booking("s1", "user-1", &nums(&["A1", "A2"]), PaymentMethod::Card)
            .await
            .unwrap();

        assert_eq!(booking.booking_status, BookingStatus::Pending);
        assert_eq!(booking.total_price, 20.0);
        assert_eq!(booking.ticket_price, 10.0);
        assert!(booking.booking_number.starts_with("BK-"));
        assert!(booking.reservation_expires_at.is_some());

        let screening = h.screenings.find_by_id("s1").await.unwrap().unwrap();
        assert_eq!(screening.seats_available, 2);
        assert_eq!(screening.seat("A1").unwrap().status, SeatStatus::Reserved);

        let stored = h.bookings.find_by_id(&booking.id).await.unwrap().unwrap();
        assert_eq!(stored.booking_status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn test_create_booking_rejects_bad_seat_counts() {
        let h = setup(4, EngineConfig::default()).await;

        let err = h
            .manager
            .create_booking("s1", "user-1", &[], PaymentMethod::Card)
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::Validation(_)));

        let too_many: Vec<String> = (1..=11).map(|i| format!("A{i}")).collect();
        let err = h
            .manager
            .create_booking("s1", "user-1", &too_many, PaymentMethod::Card)
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::Validation(_)));

        let err = h
            .manager
            .create_booking("s1", "user-1", &nums(&["A1", "A1"]), PaymentMethod::Card)
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_booking_missing_screening_is_a_hard_error() {
        let h = setup(2, EngineConfig::default()).await;
        let err = h
            .manager
            .create_booking("missing", "user-1", &nums(&["A1"]), PaymentMethod::Card)
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::ScreeningNotFound(_)));
    }

    #[tokio::test]
    async fn test_create_booking_rejects_started_screening() {
        let h = setup(2, EngineConfig::default()).await;
        let mut screening = h.screenings.find_by_id("s1").await.unwrap().unwrap();
        let version = screening.version;
        screening.start_time = now_millis() - 1_000;
        h.screenings.save(&screening, version).await.unwrap();

        let err = h
            .manager
            .create_booking("s1", "user-1", &nums(&["A1"]), PaymentMethod::Card)
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::ScreeningStarted(_)));
    }

    #[tokio::test]
    async fn test_create_booking_rejects_cancelled_screening() {
        let h = setup(2, EngineConfig::default()).await;
        let mut screening = h.screenings.find_by_id("s1").await.unwrap().unwrap();
        let version = screening.version;
        screening.status = ScreeningStatus::Cancelled;
        h.screenings.save(&screening, version).await.unwrap();

        let err = h
            .manager
            .create_booking("s1", "user-1", &nums(&["A1"]), PaymentMethod::Card)
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::ScreeningNotBookable(_)));
    }

    #[tokio::test]
    async fn test_confirm_payment_books_seats_and_notifies() {
        let h = setup(2, EngineConfig::default()).await;
        let booking = h
            .manager
            .create_booking("s1", "user-1", &nums(&["A1", "A2"]), PaymentMethod::Card)
            .await
            .unwrap();

        let confirmed = h.manager.confirm_payment(&booking.id).await.unwrap();
        assert_eq!(confirmed.booking_status, BookingStatus::Confirmed);
        assert_eq!(confirmed.payment_status, PaymentStatus::Completed);
        assert!(confirmed.reservation_expires_at.is_none());

        let screening = h.screenings.find_by_id("s1").await.unwrap().unwrap();
        assert_eq!(screening.seats_available, 0);
        assert_eq!(screening.status, ScreeningStatus::SoldOut);
        assert_eq!(
            screening.seat("A1").unwrap().booking_id.as_deref(),
            Some(booking.id.as_str())
        );

        let sent = h.notifier.sent().await;
        assert_eq!(sent, vec![format!("confirmation:{}", booking.booking_number)]);
    }

    #[tokio::test]
    async fn test_confirm_payment_twice_fails() {
        let h = setup(2, EngineConfig::default()).await;
        let booking = h
            .manager
            .create_booking("s1", "user-1", &nums(&["A1"]), PaymentMethod::Card)
            .await
            .unwrap();
        h.manager.confirm_payment(&booking.id).await.unwrap();

        let err = h.manager.confirm_payment(&booking.id).await.unwrap_err();
        assert!(matches!(
            err,
            ReservationError::NotPending {
                status: BookingStatus::Confirmed,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_confirm_lapsed_reservation_expires_booking() {
        let config = EngineConfig {
            reservation_ttl_secs: 0,
            ..EngineConfig::default()
        };
        let h = setup(2, config).await;
        let booking = h
            .manager
            .create_booking("s1", "user-1", &nums(&["A1"]), PaymentMethod::Card)
            .await
            .unwrap();

        // TTL of zero: the hold is lapsed by the time we confirm.
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let err = h.manager.confirm_payment(&booking.id).await.unwrap_err();
        assert!(matches!(err, ReservationError::ReservationExpired(_)));

        let stored = h.bookings.find_by_id(&booking.id).await.unwrap().unwrap();
        assert_eq!(stored.booking_status, BookingStatus::Expired);
        let screening = h.screenings.find_by_id("s1").await.unwrap().unwrap();
        assert_eq!(screening.seat("A1").unwrap().status, SeatStatus::Available);

        // An expired booking can never be confirmed afterwards.
        let err = h.manager.confirm_payment(&booking.id).await.unwrap_err();
        assert!(matches!(err, ReservationError::ReservationExpired(_)));
        assert!(h.notifier.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_confirm_retry_after_committed_seat_claim_succeeds() {
        let h = setup(2, EngineConfig::default()).await;
        let booking = h
            .manager
            .create_booking("s1", "user-1", &nums(&["A1"]), PaymentMethod::Card)
            .await
            .unwrap();

        // A prior confirmation attempt committed the seat claim but lost the
        // booking-status write. The retry must converge, not expire.
        let inventory = SeatInventory::new(h.screenings.clone(), 3);
        inventory
            .book_seats("s1", &nums(&["A1"]), &booking.id, "user-1")
            .await
            .unwrap();

        let confirmed = h.manager.confirm_payment(&booking.id).await.unwrap();
        assert_eq!(confirmed.booking_status, BookingStatus::Confirmed);
        let screening = h.screenings.find_by_id("s1").await.unwrap().unwrap();
        assert_eq!(
            screening.seat("A1").unwrap().booking_id.as_deref(),
            Some(booking.id.as_str())
        );
    }

    #[tokio::test]
    async fn test_expiry_releases_seats_claimed_under_the_booking() {
        let config = EngineConfig {
            reservation_ttl_secs: 0,
            ..EngineConfig::default()
        };
        let h = setup(2, config).await;
        let booking = h
            .manager
            .create_booking("s1", "user-1", &nums(&["A1"]), PaymentMethod::Card)
            .await
            .unwrap();

        // Seats claimed under the booking id, but the hold has lapsed by the
        // time confirmation retries: the booking expires and the claimed
        // seats must come back with it.
        let inventory = SeatInventory::new(h.screenings.clone(), 3);
        inventory
            .book_seats("s1", &nums(&["A1"]), &booking.id, "user-1")
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let err = h.manager.confirm_payment(&booking.id).await.unwrap_err();
        assert!(matches!(err, ReservationError::ReservationExpired(_)));

        let stored = h.bookings.find_by_id(&booking.id).await.unwrap().unwrap();
        assert_eq!(stored.booking_status, BookingStatus::Expired);
        let screening = h.screenings.find_by_id("s1").await.unwrap().unwrap();
        assert_eq!(screening.seat("A1").unwrap().status, SeatStatus::Available);
        assert!(screening.seat("A1").unwrap().booking_id.is_none());
    }

    #[tokio::test]
    async fn test_release_booking_returns_seats() {
        let h = setup(2, EngineConfig::default()).await;
        let booking = h
            .manager
            .create_booking("s1", "user-1", &nums(&["A1", "A2"]), PaymentMethod::Cash)
            .await
            .unwrap();

        let released = h.manager.release_booking(&booking.id).await.unwrap();
        assert_eq!(released.booking_status, BookingStatus::Cancelled);
        assert!(released.refunds.is_empty());

        let screening = h.screenings.find_by_id("s1").await.unwrap().unwrap();
        assert_eq!(screening.seats_available, 2);
    }

    #[tokio::test]
    async fn test_expire_booking_is_a_noop_while_hold_is_live() {
        let h = setup(2, EngineConfig::default()).await;
        let booking = h
            .manager
            .create_booking("s1", "user-1", &nums(&["A1"]), PaymentMethod::Card)
            .await
            .unwrap();

        assert!(h.manager.expire_booking(&booking.id).await.unwrap().is_none());
        let stored = h.bookings.find_by_id(&booking.id).await.unwrap().unwrap();
        assert_eq!(stored.booking_status, BookingStatus::Pending);
    }

    #[test]
    fn test_error_codes_delegate_to_inventory_classification() {
        let not_found: BookingError =
            ReservationError::Inventory(InventoryError::ScreeningNotFound("s1".to_string()))
                .into();
        assert_eq!(not_found.code, ErrorCode::NotFound);

        let conflict: BookingError =
            ReservationError::Inventory(InventoryError::Conflict("s1".to_string())).into();
        assert_eq!(conflict.code, ErrorCode::Conflict);

        let expired: BookingError = ReservationError::ReservationExpired("b1".to_string()).into();
        assert_eq!(expired.code, ErrorCode::ReservationExpired);
    }

    #[tokio::test]
    async fn test_second_customer_cannot_take_held_seats() {
        let h = setup(2, EngineConfig::default()).await;
        h.manager
            .create_booking("s1", "user-1", &nums(&["A1", "A2"]), PaymentMethod::Card)
            .await
            .unwrap();

        let err = h
            .manager
            .create_booking("s1", "user-2", &nums(&["A2"]), PaymentMethod::Card)
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::Inventory(_)));
        let code = BookingError::from(err).code;
        assert_eq!(code, ErrorCode::Conflict);
    }
}
