//! Expiry sweeper
//!
//! Background task that walks screenings and pending bookings on an
//! interval, proactively freeing lapsed seat holds and moving lapsed
//! pending bookings to `expired`. Correctness never depends on it: reads
//! treat lapsed holds as available and confirmation re-validates the TTL,
//! so the sweeper only keeps counters tidy and the booking table honest.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::inventory::SeatInventory;
use crate::repository::{BookingRepository, ScreeningRepository};
use crate::reservation::{ReservationError, ReservationManager};

/// What one sweep pass accomplished
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Seats whose lapsed holds were freed
    pub seats_expired: usize,
    /// Pending bookings moved to `expired`
    pub bookings_expired: usize,
}

pub struct ExpirySweeper {
    inventory: Arc<SeatInventory>,
    reservations: Arc<ReservationManager>,
    screenings: Arc<dyn ScreeningRepository>,
    bookings: Arc<dyn BookingRepository>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl ExpirySweeper {
    pub fn new(
        inventory: Arc<SeatInventory>,
        reservations: Arc<ReservationManager>,
        screenings: Arc<dyn ScreeningRepository>,
        bookings: Arc<dyn BookingRepository>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            inventory,
            reservations,
            screenings,
            bookings,
            interval,
            shutdown,
        }
    }

    /// Run until the shutdown token fires. Spawn with `tokio::spawn`.
    pub async fn run(self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "expiry sweeper started");
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("expiry sweeper stopped");
                    return;
                }
                _ = tokio::time::sleep(self.interval) => {
                    let report = self.sweep_once().await;
                    if report != SweepReport::default() {
                        tracing::info!(
                            seats_expired = report.seats_expired,
                            bookings_expired = report.bookings_expired,
                            "sweep pass"
                        );
                    }
                }
            }
        }
    }

    /// One full pass over screenings and pending bookings. Per-entity
    /// failures are logged and skipped; a sweep never aborts mid-pass.
    pub async fn sweep_once(&self) -> SweepReport {
        let mut report = SweepReport::default();

        match self.screenings.screening_ids().await {
            Ok(ids) => {
                for id in ids {
                    match self.inventory.expire_lapsed(&id).await {
                        Ok(freed) => report.seats_expired += freed,
                        Err(e) => {
                            tracing::error!(screening_id = %id, error = %e, "sweep: expire failed")
                        }
                    }
                }
            }
            Err(e) => tracing::error!(error = %e, "sweep: screening scan failed"),
        }

        match self.bookings.pending_booking_ids().await {
            Ok(ids) => {
                for id in ids {
                    match self.reservations.expire_booking(&id).await {
                        Ok(Some(_)) => report.bookings_expired += 1,
                        Ok(None) => {}
                        // The booking may have been confirmed or cancelled
                        // between the scan and the expiry attempt.
                        Err(ReservationError::BookingNotFound(_)) => {}
                        Err(e) => {
                            tracing::error!(booking_id = %id, error = %e, "sweep: booking expiry failed")
                        }
                    }
                }
            }
            Err(e) => tracing::error!(error = %e, "sweep: booking scan failed"),
        }

        report
    }
}
