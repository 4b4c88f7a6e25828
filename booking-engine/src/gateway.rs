//! External collaborator interfaces
//!
//! The engine consumes a payment-refund gateway and a notification service
//! but implements neither. Gateway failures are downgraded by the
//! cancellation workflow; they never escalate into rolling back committed
//! inventory state. Notifications are fire-and-forget.

use async_trait::async_trait;
use shared::models::{Booking, PaymentMethod};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("refund gateway rejected the request: {0}")]
    Rejected(String),

    #[error("refund gateway unavailable: {0}")]
    Unavailable(String),

    #[error("notification delivery failed: {0}")]
    NotificationFailed(String),
}

/// Processes money back to the customer through the original payment rail.
#[async_trait]
pub trait PaymentRefundGateway: Send + Sync {
    /// Returns the gateway transaction id on success.
    async fn refund(
        &self,
        method: PaymentMethod,
        amount: f64,
        booking_number: &str,
    ) -> Result<String, GatewayError>;
}

/// Sends customer-facing notices. Content templating is out of scope.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn send_cancellation_notice(&self, booking: &Booking) -> Result<(), GatewayError>;
    async fn send_confirmation_notice(&self, booking: &Booking) -> Result<(), GatewayError>;
}

/// Recording fakes for tests and local wiring.
pub mod mock {
    use super::*;
    use tokio::sync::Mutex;

    /// One refund call as seen by the fake gateway
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedRefund {
        pub method: PaymentMethod,
        pub amount: f64,
        pub booking_number: String,
    }

    /// Gateway fake: records calls, optionally failing them all.
    #[derive(Default)]
    pub struct RecordingRefundGateway {
        calls: Mutex<Vec<RecordedRefund>>,
        fail: std::sync::atomic::AtomicBool,
    }

    impl RecordingRefundGateway {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every subsequent refund call fail as unavailable.
        pub fn fail_all(&self, fail: bool) {
            self.fail.store(fail, std::sync::atomic::Ordering::SeqCst);
        }

        pub async fn calls(&self) -> Vec<RecordedRefund> {
            self.calls.lock().await.clone()
        }
    }

    #[async_trait]
    impl PaymentRefundGateway for RecordingRefundGateway {
        async fn refund(
            &self,
            method: PaymentMethod,
            amount: f64,
            booking_number: &str,
        ) -> Result<String, GatewayError> {
            self.calls.lock().await.push(RecordedRefund {
                method,
                amount,
                booking_number: booking_number.to_string(),
            });
            if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(GatewayError::Unavailable("simulated outage".to_string()));
            }
            Ok(format!("txn-{}", uuid::Uuid::new_v4()))
        }
    }

    /// Notifier fake: records which notices went out, optionally failing.
    #[derive(Default)]
    pub struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
        fail: std::sync::atomic::AtomicBool,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail_all(&self, fail: bool) {
            self.fail.store(fail, std::sync::atomic::Ordering::SeqCst);
        }

        /// Entries look like "cancellation:BK-..." / "confirmation:BK-...".
        pub async fn sent(&self) -> Vec<String> {
            self.sent.lock().await.clone()
        }

        async fn record(&self, kind: &str, booking: &Booking) -> Result<(), GatewayError> {
            if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(GatewayError::NotificationFailed(
                    "simulated outage".to_string(),
                ));
            }
            self.sent
                .lock()
                .await
                .push(format!("{kind}:{}", booking.booking_number));
            Ok(())
        }
    }

    #[async_trait]
    impl NotificationService for RecordingNotifier {
        async fn send_cancellation_notice(&self, booking: &Booking) -> Result<(), GatewayError> {
            self.record("cancellation", booking).await
        }

        async fn send_confirmation_notice(&self, booking: &Booking) -> Result<(), GatewayError> {
            self.record("confirmation", booking).await
        }
    }
}
