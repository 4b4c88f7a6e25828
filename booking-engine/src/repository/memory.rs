//! In-memory repositories backed by DashMap
//!
//! Each entry is guarded by its DashMap shard lock, which makes the CAS
//! check-and-store atomic per screening/booking. That matches the engine's
//! unit of mutual exclusion: two unrelated screenings never contend.

use async_trait::async_trait;
use dashmap::DashMap;
use shared::models::{Booking, BookingStatus, Screening};

use super::{
    BookingRepository, RepositoryError, RepositoryResult, ScreeningRepository,
};

#[derive(Default)]
pub struct MemoryScreeningRepository {
    screenings: DashMap<String, Screening>,
}

impl MemoryScreeningRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScreeningRepository for MemoryScreeningRepository {
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Screening>> {
        Ok(self.screenings.get(id).map(|entry| entry.clone()))
    }

    async fn insert(&self, screening: &Screening) -> RepositoryResult<()> {
        match self.screenings.entry(screening.id.clone()) {
            dashmap::Entry::Occupied(_) => Err(RepositoryError::DuplicateId(screening.id.clone())),
            dashmap::Entry::Vacant(slot) => {
                slot.insert(screening.clone());
                Ok(())
            }
        }
    }

    async fn save(&self, screening: &Screening, read_version: u64) -> RepositoryResult<u64> {
        let mut entry = self
            .screenings
            .get_mut(&screening.id)
            .ok_or_else(|| RepositoryError::ScreeningNotFound(screening.id.clone()))?;
        if entry.version != read_version {
            return Err(RepositoryError::StaleVersion {
                entity_id: screening.id.clone(),
                read_version,
                stored_version: entry.version,
            });
        }
        let mut stored = screening.clone();
        stored.version = read_version + 1;
        *entry = stored;
        Ok(read_version + 1)
    }

    async fn screening_ids(&self) -> RepositoryResult<Vec<String>> {
        Ok(self.screenings.iter().map(|e| e.key().clone()).collect())
    }
}

#[derive(Default)]
pub struct MemoryBookingRepository {
    bookings: DashMap<String, Booking>,
}

impl MemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for MemoryBookingRepository {
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Booking>> {
        Ok(self.bookings.get(id).map(|entry| entry.clone()))
    }

    async fn insert(&self, booking: &Booking) -> RepositoryResult<()> {
        match self.bookings.entry(booking.id.clone()) {
            dashmap::Entry::Occupied(_) => Err(RepositoryError::DuplicateId(booking.id.clone())),
            dashmap::Entry::Vacant(slot) => {
                slot.insert(booking.clone());
                Ok(())
            }
        }
    }

    async fn save(&self, booking: &Booking, read_version: u64) -> RepositoryResult<u64> {
        let mut entry = self
            .bookings
            .get_mut(&booking.id)
            .ok_or_else(|| RepositoryError::BookingNotFound(booking.id.clone()))?;
        if entry.version != read_version {
            return Err(RepositoryError::StaleVersion {
                entity_id: booking.id.clone(),
                read_version,
                stored_version: entry.version,
            });
        }
        let mut stored = booking.clone();
        stored.version = read_version + 1;
        *entry = stored;
        Ok(read_version + 1)
    }

    async fn booking_number_exists(&self, booking_number: &str) -> RepositoryResult<bool> {
        Ok(self
            .bookings
            .iter()
            .any(|e| e.booking_number == booking_number))
    }

    async fn pending_booking_ids(&self) -> RepositoryResult<Vec<String>> {
        Ok(self
            .bookings
            .iter()
            .filter(|e| e.booking_status == BookingStatus::Pending)
            .map(|e| e.key().clone())
            .collect())
    }
}
