//! Seat inventory
//!
//! Owns the per-screening seat map state machine. Every mutation follows
//! the same optimistic flow:
//!
//! ```text
//! load screening ─ apply pure transition ─ CAS save
//!       ▲                                    │ stale?
//!       └──────────── bounded retry ◄────────┘
//! ```
//!
//! Seat conflicts (someone else holds the seat) are business rejections and
//! surface immediately; version races are retried up to the configured
//! limit and only then surface as a retryable conflict. Successful
//! transitions are broadcast as [`SeatEvent`]s.

pub mod transitions;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared::error::{BookingError, ErrorCode};
use shared::models::{Screening, Seat};
use shared::util::now_millis;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::money;
use crate::repository::{RepositoryError, ScreeningRepository};

pub use transitions::{SeatOwner, SeatTransitionError};

/// Seat-event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// Seat-map change notification, emitted after the write is committed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SeatEvent {
    SeatsReserved {
        screening_id: String,
        seat_numbers: Vec<String>,
        reserved_by: String,
        expires_at: i64,
        timestamp: i64,
    },
    SeatsBooked {
        screening_id: String,
        booking_id: String,
        seat_numbers: Vec<String>,
        timestamp: i64,
    },
    SeatsReleased {
        screening_id: String,
        seat_numbers: Vec<String>,
        timestamp: i64,
    },
    ReservationsExpired {
        screening_id: String,
        seat_numbers: Vec<String>,
        timestamp: i64,
    },
}

/// A TTL-bounded hold over a seat set, pending payment confirmation
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub screening_id: String,
    pub seat_numbers: Vec<String>,
    pub reserved_by: String,
    pub expires_at: i64,
    pub total_price: f64,
}

/// A durable seat claim under a booking id
#[derive(Debug, Clone, PartialEq)]
pub struct SeatClaim {
    pub screening_id: String,
    pub booking_id: String,
    pub seat_numbers: Vec<String>,
    pub total_price: f64,
}

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("screening not found: {0}")]
    ScreeningNotFound(String),

    #[error(transparent)]
    Seat(#[from] SeatTransitionError),

    #[error("concurrent updates on screening {0}, retries exhausted")]
    Conflict(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl InventoryError {
    /// Error-code classification, shared with the wrapping error types.
    pub(crate) fn code(&self) -> ErrorCode {
        match self {
            InventoryError::ScreeningNotFound(_) => ErrorCode::NotFound,
            InventoryError::Seat(SeatTransitionError::SeatNotFound(_)) => ErrorCode::Validation,
            InventoryError::Seat(_) => ErrorCode::Conflict,
            InventoryError::Conflict(_) => ErrorCode::Conflict,
            InventoryError::Repository(RepositoryError::StaleVersion { .. }) => ErrorCode::Conflict,
            InventoryError::Repository(RepositoryError::RetriesExhausted(_)) => ErrorCode::Conflict,
            InventoryError::Repository(RepositoryError::DuplicateId(_)) => ErrorCode::Conflict,
            InventoryError::Repository(_) => ErrorCode::NotFound,
        }
    }
}

impl From<InventoryError> for BookingError {
    fn from(err: InventoryError) -> Self {
        BookingError::new(err.code(), err.to_string())
    }
}

pub type InventoryResult<T> = Result<T, InventoryError>;

/// Sole owner of seat state. Bookings never mutate seats directly.
pub struct SeatInventory {
    screenings: Arc<dyn ScreeningRepository>,
    retry_limit: u32,
    events: broadcast::Sender<SeatEvent>,
}

impl SeatInventory {
    pub fn new(screenings: Arc<dyn ScreeningRepository>, retry_limit: u32) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            screenings,
            retry_limit,
            events,
        }
    }

    /// Subscribe to committed seat-map changes.
    pub fn subscribe(&self) -> broadcast::Receiver<SeatEvent> {
        self.events.subscribe()
    }

    /// Seats a customer could claim right now: available, plus reserved
    /// seats whose hold has lapsed (soft TTL).
    pub async fn available_seats(&self, screening_id: &str) -> InventoryResult<Vec<Seat>> {
        let screening = self.load(screening_id).await?;
        let now = now_millis();
        Ok(screening
            .seats
            .iter()
            .filter(|s| s.is_claimable(now))
            .cloned()
            .collect())
    }

    /// Place a TTL hold on the seat set; all-or-nothing.
    pub async fn reserve_seats(
        &self,
        screening_id: &str,
        seat_numbers: &[String],
        ttl: Duration,
        reserved_by: &str,
    ) -> InventoryResult<Reservation> {
        let ttl_ms = ttl.as_millis() as i64;
        let (screening, event) = self
            .run_transition(screening_id, |screening, now| {
                transitions::reserve_seats(screening, seat_numbers, ttl_ms, reserved_by, now)
                    .map(Some)
            })
            .await?;

        let expires_at = match &event {
            Some(SeatEvent::SeatsReserved { expires_at, .. }) => *expires_at,
            _ => 0,
        };
        let total_price = money::sum_seat_prices(
            screening
                .seats
                .iter()
                .filter(|s| seat_numbers.contains(&s.seat_number)),
        );
        tracing::info!(
            screening_id,
            ?seat_numbers,
            reserved_by,
            expires_at,
            "seats reserved"
        );
        Ok(Reservation {
            screening_id: screening_id.to_string(),
            seat_numbers: seat_numbers.to_vec(),
            reserved_by: reserved_by.to_string(),
            expires_at,
            total_price,
        })
    }

    /// Convert holds into a booked claim; requires seats to be available or
    /// reserved by `reserved_by` with an unexpired hold.
    pub async fn book_seats(
        &self,
        screening_id: &str,
        seat_numbers: &[String],
        booking_id: &str,
        reserved_by: &str,
    ) -> InventoryResult<SeatClaim> {
        let (screening, _) = self
            .run_transition(screening_id, |screening, now| {
                transitions::book_seats(screening, seat_numbers, booking_id, reserved_by, now)
                    .map(Some)
            })
            .await?;

        let total_price = money::sum_seat_prices(
            screening
                .seats
                .iter()
                .filter(|s| seat_numbers.contains(&s.seat_number)),
        );
        tracing::info!(screening_id, booking_id, ?seat_numbers, "seats booked");
        Ok(SeatClaim {
            screening_id: screening_id.to_string(),
            booking_id: booking_id.to_string(),
            seat_numbers: seat_numbers.to_vec(),
            total_price,
        })
    }

    /// Release reserved/booked seats back to available. Seats not claimed by
    /// `owner` are skipped, so repeated releases are harmless.
    pub async fn release_seats(
        &self,
        screening_id: &str,
        seat_numbers: &[String],
        owner: Option<SeatOwner<'_>>,
    ) -> InventoryResult<()> {
        self.run_transition(screening_id, |screening, now| {
            transitions::release_seats(screening, seat_numbers, owner, now)
        })
        .await?;
        tracing::info!(screening_id, ?seat_numbers, "seats released");
        Ok(())
    }

    /// Proactively expire lapsed holds; returns how many seats were freed.
    pub async fn expire_lapsed(&self, screening_id: &str) -> InventoryResult<usize> {
        let (_, event) = self
            .run_transition(screening_id, |screening, now| {
                Ok(transitions::expire_lapsed(screening, now))
            })
            .await?;
        Ok(match event {
            Some(SeatEvent::ReservationsExpired { seat_numbers, .. }) => seat_numbers.len(),
            _ => 0,
        })
    }

    async fn load(&self, screening_id: &str) -> InventoryResult<Screening> {
        self.screenings
            .find_by_id(screening_id)
            .await?
            .ok_or_else(|| InventoryError::ScreeningNotFound(screening_id.to_string()))
    }

    /// The optimistic write loop shared by every mutation: load, apply the
    /// pure transition, CAS-save; reload and retry on a version race.
    async fn run_transition<F>(
        &self,
        screening_id: &str,
        apply: F,
    ) -> InventoryResult<(Screening, Option<SeatEvent>)>
    where
        F: Fn(&mut Screening, i64) -> Result<Option<SeatEvent>, SeatTransitionError>,
    {
        for attempt in 0..=self.retry_limit {
            let mut screening = self.load(screening_id).await?;
            let read_version = screening.version;
            let now = now_millis();

            let event = apply(&mut screening, now)?;
            if event.is_none() {
                // Nothing changed; skip the write entirely.
                return Ok((screening, None));
            }

            match self.screenings.save(&screening, read_version).await {
                Ok(new_version) => {
                    screening.version = new_version;
                    if let Some(event) = &event {
                        let _ = self.events.send(event.clone());
                    }
                    return Ok((screening, event));
                }
                Err(RepositoryError::StaleVersion { .. }) => {
                    tracing::warn!(
                        screening_id,
                        attempt,
                        read_version,
                        "version race on seat map, reloading"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(InventoryError::Conflict(screening_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryScreeningRepository;
    use shared::models::{ScreeningStatus, SeatStatus, SeatType};

    async fn setup(seats: u32) -> (SeatInventory, Arc<MemoryScreeningRepository>) {
        let repo = Arc::new(MemoryScreeningRepository::new());
        let seat_vec = (1..=seats)
            .map(|c| Seat::new("A", c, SeatType::Standard, 10.0))
            .collect();
        let far_future = now_millis() + 100 * 3_600_000;
        let mut screening = Screening::new("s1", "Movie", "Room 1", far_future, seat_vec);
        screening.status = ScreeningStatus::Open;
        repo.insert(&screening).await.unwrap();
        (SeatInventory::new(repo.clone(), 3), repo)
    }

    fn nums(numbers: &[&str]) -> Vec<String> {
        numbers.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn test_reserve_persists_and_prices_the_hold() {
        let (inventory, repo) = setup(4).await;

        let reservation = inventory
            .reserve_seats("s1", &nums(&["A1", "A2"]), Duration::from_secs(600), "user-1")
            .await
            .unwrap();
        assert_eq!(reservation.total_price, 20.0);
        assert!(reservation.expires_at > now_millis());

        let stored = repo.find_by_id("s1").await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.seats_available, 2);
        assert_eq!(stored.seat("A1").unwrap().status, SeatStatus::Reserved);
    }

    #[tokio::test]
    async fn test_reserve_unknown_screening_fails() {
        let (inventory, _) = setup(2).await;
        let err = inventory
            .reserve_seats("missing", &nums(&["A1"]), Duration::from_secs(600), "user-1")
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::ScreeningNotFound(_)));
    }

    #[tokio::test]
    async fn test_book_then_release_round_trip() {
        let (inventory, repo) = setup(2).await;

        inventory
            .reserve_seats("s1", &nums(&["A1", "A2"]), Duration::from_secs(600), "user-1")
            .await
            .unwrap();
        let claim = inventory
            .book_seats("s1", &nums(&["A1", "A2"]), "b1", "user-1")
            .await
            .unwrap();
        assert_eq!(claim.total_price, 20.0);

        let stored = repo.find_by_id("s1").await.unwrap().unwrap();
        assert_eq!(stored.seats_available, 0);
        assert_eq!(stored.status, ScreeningStatus::SoldOut);

        inventory
            .release_seats("s1", &nums(&["A1", "A2"]), Some(SeatOwner::Booking("b1")))
            .await
            .unwrap();
        let stored = repo.find_by_id("s1").await.unwrap().unwrap();
        assert_eq!(stored.seats_available, 2);
        assert_eq!(stored.status, ScreeningStatus::Open);
    }

    #[tokio::test]
    async fn test_seat_conflict_is_not_retried_as_a_version_race() {
        let (inventory, repo) = setup(1).await;

        inventory
            .reserve_seats("s1", &nums(&["A1"]), Duration::from_secs(600), "user-1")
            .await
            .unwrap();
        let version_after_first = repo.find_by_id("s1").await.unwrap().unwrap().version;

        let err = inventory
            .reserve_seats("s1", &nums(&["A1"]), Duration::from_secs(600), "user-2")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            InventoryError::Seat(SeatTransitionError::SeatUnavailable(_))
        ));
        // The losing call must not have written anything.
        let stored = repo.find_by_id("s1").await.unwrap().unwrap();
        assert_eq!(stored.version, version_after_first);
        assert_eq!(stored.seat("A1").unwrap().reserved_by.as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn test_last_seat_has_exactly_one_winner() {
        let (inventory, _) = setup(1).await;
        let inventory = Arc::new(inventory);

        let a = {
            let inv = inventory.clone();
            tokio::spawn(async move {
                inv.reserve_seats("s1", &nums(&["A1"]), Duration::from_secs(600), "user-a")
                    .await
            })
        };
        let b = {
            let inv = inventory.clone();
            tokio::spawn(async move {
                inv.reserve_seats("s1", &nums(&["A1"]), Duration::from_secs(600), "user-b")
                    .await
            })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1, "exactly one of two racing holds may win");
    }

    #[tokio::test]
    async fn test_events_are_broadcast_after_commit() {
        let (inventory, _) = setup(2).await;
        let mut rx = inventory.subscribe();

        inventory
            .reserve_seats("s1", &nums(&["A1"]), Duration::from_secs(600), "user-1")
            .await
            .unwrap();
        match rx.recv().await.unwrap() {
            SeatEvent::SeatsReserved { seat_numbers, .. } => {
                assert_eq!(seat_numbers, nums(&["A1"]));
            }
            other => panic!("expected SeatsReserved, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_expire_lapsed_counts_freed_seats() {
        let (inventory, repo) = setup(3).await;

        inventory
            .reserve_seats("s1", &nums(&["A1", "A2"]), Duration::from_millis(0), "user-1")
            .await
            .unwrap();
        // Zero TTL: the holds are lapsed immediately.
        let freed = inventory.expire_lapsed("s1").await.unwrap();
        assert_eq!(freed, 2);

        let stored = repo.find_by_id("s1").await.unwrap().unwrap();
        assert_eq!(stored.seats_available, 3);
        // Nothing further to expire; no write happens.
        let version = stored.version;
        assert_eq!(inventory.expire_lapsed("s1").await.unwrap(), 0);
        assert_eq!(
            repo.find_by_id("s1").await.unwrap().unwrap().version,
            version
        );
    }
}
