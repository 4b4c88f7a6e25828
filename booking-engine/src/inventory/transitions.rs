//! Pure seat-map transitions
//!
//! Each function validates the whole requested seat set first and only then
//! mutates, so a rejection leaves the screening untouched (all-or-nothing).
//! Persistence and retry live in the inventory wrapper; nothing here does
//! I/O or reads the clock.

use shared::models::{Screening, SeatStatus};
use thiserror::Error;

use super::SeatEvent;

#[derive(Debug, Error, PartialEq)]
pub enum SeatTransitionError {
    #[error("seat not found: {0}")]
    SeatNotFound(String),

    #[error("seat {0} is not available")]
    SeatUnavailable(String),

    #[error("seat {0} is held by another customer")]
    SeatHeldByAnother(String),
}

/// Who a release is allowed to evict. `None` releases any claim (the
/// cancellation path, where authorization already happened upstream).
#[derive(Debug, Clone, Copy)]
pub enum SeatOwner<'a> {
    /// Seats reserved by this customer
    Reservation(&'a str),
    /// Seats booked under this booking id
    Booking(&'a str),
}

fn owner_matches(
    status: SeatStatus,
    reserved_by: Option<&str>,
    booking_id: Option<&str>,
    owner: Option<SeatOwner<'_>>,
) -> bool {
    match owner {
        None => true,
        Some(SeatOwner::Reservation(user)) => {
            status == SeatStatus::Reserved && reserved_by == Some(user)
        }
        Some(SeatOwner::Booking(id)) => status == SeatStatus::Booked && booking_id == Some(id),
    }
}

/// Place a TTL-bounded hold on every requested seat.
///
/// Requires each seat to be available or reserved-and-lapsed; fails the
/// whole call otherwise.
pub fn reserve_seats(
    screening: &mut Screening,
    seat_numbers: &[String],
    ttl_ms: i64,
    reserved_by: &str,
    now: i64,
) -> Result<SeatEvent, SeatTransitionError> {
    for number in seat_numbers {
        let seat = screening
            .seat(number)
            .ok_or_else(|| SeatTransitionError::SeatNotFound(number.clone()))?;
        if !seat.is_claimable(now) {
            return Err(SeatTransitionError::SeatUnavailable(number.clone()));
        }
    }

    let expires_at = now + ttl_ms;
    for number in seat_numbers {
        let seat = screening.seat_mut(number).unwrap();
        seat.status = SeatStatus::Reserved;
        seat.booking_id = None;
        seat.reservation_expires_at = Some(expires_at);
        seat.reserved_by = Some(reserved_by.to_string());
    }
    screening.recount_available(now);
    screening.recompute_status();

    Ok(SeatEvent::SeatsReserved {
        screening_id: screening.id.clone(),
        seat_numbers: seat_numbers.to_vec(),
        reserved_by: reserved_by.to_string(),
        expires_at,
        timestamp: now,
    })
}

/// Convert holds into a durable claim under `booking_id`.
///
/// Each seat must be available, or reserved by `reserved_by` with an
/// unexpired hold. A seat held (unexpired) by anyone else fails the call.
/// A seat already booked under this same `booking_id` counts as claimed, so
/// a confirmation retry after a partially committed attempt converges
/// instead of failing.
pub fn book_seats(
    screening: &mut Screening,
    seat_numbers: &[String],
    booking_id: &str,
    reserved_by: &str,
    now: i64,
) -> Result<SeatEvent, SeatTransitionError> {
    for number in seat_numbers {
        let seat = screening
            .seat(number)
            .ok_or_else(|| SeatTransitionError::SeatNotFound(number.clone()))?;
        match seat.status {
            SeatStatus::Available => {}
            SeatStatus::Reserved if seat.is_reservation_lapsed(now) => {}
            SeatStatus::Reserved => {
                if seat.reserved_by.as_deref() != Some(reserved_by) {
                    return Err(SeatTransitionError::SeatHeldByAnother(number.clone()));
                }
            }
            SeatStatus::Booked if seat.booking_id.as_deref() == Some(booking_id) => {}
            _ => return Err(SeatTransitionError::SeatUnavailable(number.clone())),
        }
    }

    for number in seat_numbers {
        let seat = screening.seat_mut(number).unwrap();
        seat.status = SeatStatus::Booked;
        seat.booking_id = Some(booking_id.to_string());
        seat.reservation_expires_at = None;
        seat.reserved_by = None;
    }
    screening.recount_available(now);
    screening.recompute_status();

    Ok(SeatEvent::SeatsBooked {
        screening_id: screening.id.clone(),
        booking_id: booking_id.to_string(),
        seat_numbers: seat_numbers.to_vec(),
        timestamp: now,
    })
}

/// Return reserved/booked seats to available, restoring availability and
/// demoting sold_out/almost_full when the threshold is no longer met.
///
/// Seats that are not claimed (or are claimed by someone other than
/// `owner`) are skipped, which makes the release paths idempotent.
pub fn release_seats(
    screening: &mut Screening,
    seat_numbers: &[String],
    owner: Option<SeatOwner<'_>>,
    now: i64,
) -> Result<Option<SeatEvent>, SeatTransitionError> {
    for number in seat_numbers {
        if screening.seat(number).is_none() {
            return Err(SeatTransitionError::SeatNotFound(number.clone()));
        }
    }

    let mut released = Vec::new();
    for number in seat_numbers {
        let seat = screening.seat_mut(number).unwrap();
        if !matches!(seat.status, SeatStatus::Reserved | SeatStatus::Booked) {
            continue;
        }
        if !owner_matches(
            seat.status,
            seat.reserved_by.as_deref(),
            seat.booking_id.as_deref(),
            owner,
        ) {
            continue;
        }
        seat.clear_claim();
        released.push(number.clone());
    }

    if released.is_empty() {
        return Ok(None);
    }
    screening.recount_available(now);
    screening.recompute_status();

    Ok(Some(SeatEvent::SeatsReleased {
        screening_id: screening.id.clone(),
        seat_numbers: released,
        timestamp: now,
    }))
}

/// Flip every lapsed reservation back to available (proactive sweep).
/// The lazy paths already treat lapsed holds as claimable, so this only
/// frees inventory faster; behavior is identical without it.
pub fn expire_lapsed(screening: &mut Screening, now: i64) -> Option<SeatEvent> {
    let mut expired = Vec::new();
    for seat in &mut screening.seats {
        if seat.is_reservation_lapsed(now) {
            let number = seat.seat_number.clone();
            seat.clear_claim();
            expired.push(number);
        }
    }
    if expired.is_empty() {
        return None;
    }
    screening.recount_available(now);
    screening.recompute_status();

    Some(SeatEvent::ReservationsExpired {
        screening_id: screening.id.clone(),
        seat_numbers: expired,
        timestamp: now,
    })
}
