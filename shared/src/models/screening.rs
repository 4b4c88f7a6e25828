//! Screening and seat models
//!
//! A `Screening` is the sole owner of its seat map: bookings never touch
//! seat state directly, they go through the engine's `SeatInventory`.
//! `version` backs the compare-and-swap write contract at the storage
//! boundary; it is bumped by the repository on every successful save.

use crate::util::MILLIS_PER_HOUR;
use serde::{Deserialize, Serialize};

/// Fraction of total seats at or below which a screening is "almost full"
pub const ALMOST_FULL_RATIO: f64 = 0.10;

/// Screening lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningStatus {
    #[default]
    Scheduled,
    Open,
    AlmostFull,
    SoldOut,
    Cancelled,
    InProgress,
    Completed,
}

impl ScreeningStatus {
    /// Statuses that occupancy recomputation must never overwrite
    pub fn is_occupancy_driven(&self) -> bool {
        matches!(
            self,
            Self::Scheduled | Self::Open | Self::AlmostFull | Self::SoldOut
        )
    }
}

/// Seat category (drives pricing at catalog level)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SeatType {
    #[default]
    Standard,
    Premium,
    Vip,
    Couple,
    Accessible,
}

/// Per-seat state machine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SeatStatus {
    #[default]
    Available,
    Reserved,
    Booked,
    Unavailable,
    Maintenance,
}

/// One addressable seat within a screening's seat map
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seat {
    /// Seat ID (unique within the screening)
    pub id: String,
    /// Row label, e.g. "A"
    pub row: String,
    /// Column index within the row, 1-based
    pub column: u32,
    /// Display number, e.g. "A1"; unique within the screening
    pub seat_number: String,
    /// Seat category
    pub seat_type: SeatType,
    /// Ticket price for this seat
    pub price: f64,
    /// Current seat state
    pub status: SeatStatus,
    /// Owning booking; Some iff status == Booked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    /// Hold expiry (millis); Some iff status == Reserved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_expires_at: Option<i64>,
    /// Customer holding the reservation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserved_by: Option<String>,
}

impl Seat {
    /// Create an available seat from its grid position.
    pub fn new(row: impl Into<String>, column: u32, seat_type: SeatType, price: f64) -> Self {
        let row = row.into();
        let seat_number = format!("{row}{column}");
        Self {
            id: seat_number.clone(),
            row,
            column,
            seat_number,
            seat_type,
            price,
            status: SeatStatus::Available,
            booking_id: None,
            reservation_expires_at: None,
            reserved_by: None,
        }
    }

    /// Whether a reservation on this seat has lapsed.
    ///
    /// A reserved seat with no expiry is treated as lapsed: the invariant
    /// says the expiry is always set while reserved, so a missing value can
    /// only mean corrupted state and must not block the seat forever.
    pub fn is_reservation_lapsed(&self, now: i64) -> bool {
        self.status == SeatStatus::Reserved
            && self.reservation_expires_at.is_none_or(|at| at <= now)
    }

    /// Whether the seat can be claimed right now (soft TTL: a lapsed
    /// reservation counts as available without waiting for a sweeper).
    pub fn is_claimable(&self, now: i64) -> bool {
        self.status == SeatStatus::Available || self.is_reservation_lapsed(now)
    }

    /// Whether the seat counts against availability: booked, or reserved
    /// with an unexpired hold.
    pub fn is_occupied(&self, now: i64) -> bool {
        match self.status {
            SeatStatus::Booked => true,
            SeatStatus::Reserved => !self.is_reservation_lapsed(now),
            _ => false,
        }
    }

    /// Drop any claim fields, returning the seat to `Available`.
    pub fn clear_claim(&mut self) {
        self.status = SeatStatus::Available;
        self.booking_id = None;
        self.reservation_expires_at = None;
        self.reserved_by = None;
    }
}

/// One scheduled showing of a movie in a room, owning its seat map
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Screening {
    /// Screening ID
    pub id: String,
    /// Movie title (display only)
    pub movie_title: String,
    /// Room name (display only)
    pub room: String,
    /// Showtime start (millis)
    pub start_time: i64,
    /// Total seats in the room
    pub total_seats: u32,
    /// Seats neither booked nor held by an unexpired reservation
    pub seats_available: u32,
    /// Screening status
    pub status: ScreeningStatus,
    /// Optimistic-concurrency version; bumped by the repository on save
    pub version: u64,
    /// The seat map, addressed by `seat_number`
    pub seats: Vec<Seat>,
}

impl Screening {
    /// Create a screening from a seat map. Availability and status are
    /// derived from the seats.
    pub fn new(
        id: impl Into<String>,
        movie_title: impl Into<String>,
        room: impl Into<String>,
        start_time: i64,
        seats: Vec<Seat>,
    ) -> Self {
        let total_seats = seats.len() as u32;
        let mut screening = Self {
            id: id.into(),
            movie_title: movie_title.into(),
            room: room.into(),
            start_time,
            total_seats,
            seats_available: total_seats,
            status: ScreeningStatus::Scheduled,
            version: 0,
            seats,
        };
        screening.recount_available(0);
        screening
    }

    /// Look up a seat by its display number.
    pub fn seat(&self, seat_number: &str) -> Option<&Seat> {
        self.seats.iter().find(|s| s.seat_number == seat_number)
    }

    /// Mutable seat lookup by display number.
    pub fn seat_mut(&mut self, seat_number: &str) -> Option<&mut Seat> {
        self.seats.iter_mut().find(|s| s.seat_number == seat_number)
    }

    /// Hours from `now` until showtime; negative once the screening started.
    pub fn hours_until_start(&self, now: i64) -> f64 {
        (self.start_time - now) as f64 / MILLIS_PER_HOUR
    }

    pub fn has_started(&self, now: i64) -> bool {
        now >= self.start_time
    }

    /// Recount `seats_available` from seat states:
    /// available = total - booked - reserved-and-unexpired.
    pub fn recount_available(&mut self, now: i64) {
        let occupied = self.seats.iter().filter(|s| s.is_occupied(now)).count() as u32;
        self.seats_available = self.total_seats.saturating_sub(occupied);
    }

    /// Recompute the occupancy-driven status from `seats_available`.
    ///
    /// sold_out at zero, almost_full at or below 10% of total, and demotion
    /// back to open once above the threshold. Cancelled/in-progress/completed
    /// are never touched.
    pub fn recompute_status(&mut self) {
        if !self.status.is_occupancy_driven() {
            return;
        }
        if self.seats_available == 0 {
            self.status = ScreeningStatus::SoldOut;
        } else if f64::from(self.seats_available)
            <= f64::from(self.total_seats) * ALMOST_FULL_RATIO
        {
            self.status = ScreeningStatus::AlmostFull;
        } else if matches!(
            self.status,
            ScreeningStatus::SoldOut | ScreeningStatus::AlmostFull
        ) {
            self.status = ScreeningStatus::Open;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat_grid(rows: &[&str], cols: u32, price: f64) -> Vec<Seat> {
        let mut seats = Vec::new();
        for row in rows {
            for col in 1..=cols {
                seats.push(Seat::new(*row, col, SeatType::Standard, price));
            }
        }
        seats
    }

    #[test]
    fn test_new_screening_counts_all_seats_available() {
        let screening = Screening::new("s1", "Movie", "Room 1", 1_000, seat_grid(&["A"], 4, 10.0));
        assert_eq!(screening.total_seats, 4);
        assert_eq!(screening.seats_available, 4);
        assert_eq!(screening.status, ScreeningStatus::Scheduled);
        assert_eq!(screening.version, 0);
    }

    #[test]
    fn test_seat_lookup_by_number() {
        let screening = Screening::new("s1", "Movie", "Room 1", 1_000, seat_grid(&["A", "B"], 2, 10.0));
        assert_eq!(screening.seat("B2").map(|s| s.row.as_str()), Some("B"));
        assert!(screening.seat("C1").is_none());
    }

    #[test]
    fn test_lapsed_reservation_is_claimable() {
        let mut seat = Seat::new("A", 1, SeatType::Standard, 10.0);
        seat.status = SeatStatus::Reserved;
        seat.reservation_expires_at = Some(1_000);
        seat.reserved_by = Some("user-1".to_string());

        assert!(!seat.is_claimable(999));
        assert!(seat.is_occupied(999));
        assert!(seat.is_claimable(1_000));
        assert!(!seat.is_occupied(1_000));
    }

    #[test]
    fn test_reserved_seat_without_expiry_is_treated_as_lapsed() {
        let mut seat = Seat::new("A", 1, SeatType::Standard, 10.0);
        seat.status = SeatStatus::Reserved;
        assert!(seat.is_reservation_lapsed(0));
        assert!(seat.is_claimable(0));
    }

    #[test]
    fn test_recount_excludes_lapsed_reservations() {
        let mut screening = Screening::new("s1", "Movie", "Room 1", 1_000, seat_grid(&["A"], 3, 10.0));
        let seat = screening.seat_mut("A1").unwrap();
        seat.status = SeatStatus::Reserved;
        seat.reservation_expires_at = Some(5_000);
        let seat = screening.seat_mut("A2").unwrap();
        seat.status = SeatStatus::Booked;
        seat.booking_id = Some("b1".to_string());

        screening.recount_available(1_000);
        assert_eq!(screening.seats_available, 1);

        // Reservation on A1 lapses; only the booked seat still counts.
        screening.recount_available(6_000);
        assert_eq!(screening.seats_available, 2);
    }

    #[test]
    fn test_recompute_status_thresholds() {
        let mut screening = Screening::new("s1", "Movie", "Room 1", 1_000, seat_grid(&["A", "B"], 10, 10.0));
        screening.status = ScreeningStatus::Open;

        screening.seats_available = 2; // 10% of 20
        screening.recompute_status();
        assert_eq!(screening.status, ScreeningStatus::AlmostFull);

        screening.seats_available = 0;
        screening.recompute_status();
        assert_eq!(screening.status, ScreeningStatus::SoldOut);

        screening.seats_available = 3;
        screening.recompute_status();
        assert_eq!(screening.status, ScreeningStatus::Open);
    }

    #[test]
    fn test_recompute_status_keeps_scheduled_above_threshold() {
        let mut screening = Screening::new("s1", "Movie", "Room 1", 1_000, seat_grid(&["A"], 10, 10.0));
        screening.seats_available = 8;
        screening.recompute_status();
        assert_eq!(screening.status, ScreeningStatus::Scheduled);
    }

    #[test]
    fn test_recompute_status_never_touches_cancelled() {
        let mut screening = Screening::new("s1", "Movie", "Room 1", 1_000, seat_grid(&["A"], 4, 10.0));
        screening.status = ScreeningStatus::Cancelled;
        screening.seats_available = 0;
        screening.recompute_status();
        assert_eq!(screening.status, ScreeningStatus::Cancelled);
    }

    #[test]
    fn test_hours_until_start() {
        let screening = Screening::new("s1", "Movie", "Room 1", 7_200_000, vec![]);
        assert!((screening.hours_until_start(0) - 2.0).abs() < f64::EPSILON);
        assert!(screening.has_started(7_200_000));
        assert!(!screening.has_started(7_199_999));
    }
}
