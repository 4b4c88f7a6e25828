//! Persistence boundary
//!
//! Repositories expose a compare-and-swap write contract: every `save`
//! carries the version the caller read, and a write against a different
//! stored version is rejected with [`RepositoryError::StaleVersion`].
//! Callers recover by reloading and retrying a bounded number of times;
//! no lock is ever held across I/O or an external call.

pub mod memory;

use async_trait::async_trait;
use shared::models::{Booking, Screening};
use thiserror::Error;

pub use memory::{MemoryBookingRepository, MemoryScreeningRepository};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("screening not found: {0}")]
    ScreeningNotFound(String),

    #[error("booking not found: {0}")]
    BookingNotFound(String),

    #[error("duplicate id: {0}")]
    DuplicateId(String),

    #[error("stale version on {entity_id}: read {read_version}, stored {stored_version}")]
    StaleVersion {
        entity_id: String,
        read_version: u64,
        stored_version: u64,
    },

    #[error("retries exhausted updating {0}")]
    RetriesExhausted(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Storage for screenings and their seat maps
#[async_trait]
pub trait ScreeningRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Screening>>;

    /// Insert a new screening; fails on duplicate id.
    async fn insert(&self, screening: &Screening) -> RepositoryResult<()>;

    /// CAS write. `read_version` is the version the caller loaded; the write
    /// is rejected if the stored version differs. On success the stored copy
    /// carries `read_version + 1`, which is returned.
    async fn save(&self, screening: &Screening, read_version: u64) -> RepositoryResult<u64>;

    /// Ids of all stored screenings (sweeper scan).
    async fn screening_ids(&self) -> RepositoryResult<Vec<String>>;
}

/// Storage for bookings
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Booking>>;

    /// Insert a new booking; fails on duplicate id.
    async fn insert(&self, booking: &Booking) -> RepositoryResult<()>;

    /// CAS write, same contract as [`ScreeningRepository::save`].
    async fn save(&self, booking: &Booking, read_version: u64) -> RepositoryResult<u64>;

    /// Uniqueness probe for human-readable booking numbers.
    async fn booking_number_exists(&self, booking_number: &str) -> RepositoryResult<bool>;

    /// Ids of bookings still in `pending` (sweeper scan).
    async fn pending_booking_ids(&self) -> RepositoryResult<Vec<String>>;
}

/// Reload-mutate-save loop over a booking, retried on version races.
///
/// `mutate` runs against a freshly loaded copy on every attempt, so guards
/// inside it re-validate under the latest state. Bounded by `retry_limit`
/// extra attempts, after which [`RepositoryError::RetriesExhausted`] is
/// surfaced (retryable from the caller's perspective).
pub async fn update_booking_versioned<E, F>(
    repo: &dyn BookingRepository,
    booking_id: &str,
    retry_limit: u32,
    mut mutate: F,
) -> Result<Booking, E>
where
    E: From<RepositoryError>,
    F: FnMut(&mut Booking) -> Result<(), E>,
{
    for attempt in 0..=retry_limit {
        let mut booking = repo
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| RepositoryError::BookingNotFound(booking_id.to_string()))?;
        let read_version = booking.version;

        mutate(&mut booking)?;

        match repo.save(&booking, read_version).await {
            Ok(new_version) => {
                booking.version = new_version;
                return Ok(booking);
            }
            Err(RepositoryError::StaleVersion { .. }) if attempt < retry_limit => {
                tracing::warn!(
                    booking_id,
                    attempt,
                    "version race on booking update, reloading"
                );
            }
            Err(RepositoryError::StaleVersion { .. }) => {
                return Err(RepositoryError::RetriesExhausted(booking_id.to_string()).into());
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(RepositoryError::RetriesExhausted(booking_id.to_string()).into())
}
