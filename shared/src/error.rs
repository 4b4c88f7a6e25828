//! Error taxonomy for the booking engine
//!
//! Every engine-level failure is classified into an [`ErrorCode`] so callers
//! can tell retryable conflicts apart from business-rule rejections without
//! parsing messages. The string codes are stable and safe to expose.

use thiserror::Error;

/// Stable error codes for engine failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Malformed request (seat count out of range, unknown payment method)
    Validation,
    /// Missing booking or screening
    NotFound,
    /// Seat or version race; safe to retry after re-reading state
    Conflict,
    /// Requester is not the booking owner and not an admin
    Unauthorized,
    /// Reservation TTL lapsed before payment confirmation
    ReservationExpired,
    /// Cancellation requested inside the no-refund cutoff window
    CancellationWindowClosed,
    /// The screening has already started
    PastScreening,
    /// The booking was already cancelled
    AlreadyCancelled,
    /// Refund gateway or notification collaborator failed
    ExternalService,
    /// Unexpected internal failure
    Internal,
}

impl ErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation => "E1001",
            Self::NotFound => "E1002",
            Self::Conflict => "E1003",
            Self::Unauthorized => "E1004",
            Self::ReservationExpired => "E2001",
            Self::CancellationWindowClosed => "E2002",
            Self::PastScreening => "E2003",
            Self::AlreadyCancelled => "E2004",
            Self::ExternalService => "E9001",
            Self::Internal => "E9002",
        }
    }

    /// Get the default message for this error
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::Validation => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::Conflict => "Concurrent update conflict",
            Self::Unauthorized => "Not authorized",
            Self::ReservationExpired => "Reservation has expired",
            Self::CancellationWindowClosed => "Cancellation window closed",
            Self::PastScreening => "Screening has already started",
            Self::AlreadyCancelled => "Booking already cancelled",
            Self::ExternalService => "External service failure",
            Self::Internal => "Internal error",
        }
    }

    /// Whether callers may retry the operation as-is.
    ///
    /// Only version/seat races are transient; business-rule rejections
    /// (window closed, past screening, already cancelled) must not be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Unified outward-facing error: code plus human-readable message
#[derive(Debug, Clone, Error)]
#[error("[{code}] {message}")]
pub struct BookingError {
    pub code: ErrorCode,
    pub message: String,
}

impl BookingError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Error with the code's default message
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_conflict_is_retryable() {
        assert!(ErrorCode::Conflict.is_retryable());
        assert!(!ErrorCode::CancellationWindowClosed.is_retryable());
        assert!(!ErrorCode::AlreadyCancelled.is_retryable());
        assert!(!ErrorCode::PastScreening.is_retryable());
        assert!(!ErrorCode::NotFound.is_retryable());
    }

    #[test]
    fn test_error_display_includes_code_and_message() {
        let err = BookingError::new(ErrorCode::ReservationExpired, "seat hold lapsed");
        assert_eq!(err.to_string(), "[E2001] seat hold lapsed");
    }

    #[test]
    fn test_codes_are_unique() {
        let codes = [
            ErrorCode::Validation,
            ErrorCode::NotFound,
            ErrorCode::Conflict,
            ErrorCode::Unauthorized,
            ErrorCode::ReservationExpired,
            ErrorCode::CancellationWindowClosed,
            ErrorCode::PastScreening,
            ErrorCode::AlreadyCancelled,
            ErrorCode::ExternalService,
            ErrorCode::Internal,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in codes.iter().skip(i + 1) {
                assert_ne!(a.code(), b.code());
            }
        }
    }
}
