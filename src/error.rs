use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Stable sub-codes carried by [`CoreError::Booking`].
pub mod codes {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const BOOKING_NOT_CANCELLABLE: &str = "BOOKING_NOT_CANCELLABLE";
    pub const INVALID_TRANSITION: &str = "INVALID_TRANSITION";
}

/// Errors produced by the booking core.
///
/// Every variant maps to a stable machine-readable code (see [`CoreError::code`])
/// so the boundary layer can translate failures uniformly without parsing
/// messages.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The requested room is missing, closed, or fully booked for the dates.
    #[error("room unavailable: {0}")]
    RoomUnavailable(String),
    /// Booking creation/lookup/mutation failure with a stable sub-code.
    #[error("booking error [{code}]: {message}")]
    Booking { code: &'static str, message: String },
    /// Order creation or generic payment failure.
    #[error("payment error: {0}")]
    Payment(String),
    /// Signature mismatch on payment verification. Never downgraded or retried.
    #[error("invalid payment signature")]
    InvalidSignature,
    /// Data store failure. Surfaced opaquely; no partial state is left behind.
    #[error("store error: {0}")]
    Store(String),
    /// The gateway did not answer in time. Outcome unknown, reconciled by the
    /// next webhook delivery; the booking is left untouched.
    #[error("payment gateway timed out after {0:?}")]
    GatewayTimeout(Duration),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::Booking {
            code: codes::NOT_FOUND,
            message: what.into(),
        }
    }

    pub fn not_cancellable(status: &str) -> Self {
        Self::Booking {
            code: codes::BOOKING_NOT_CANCELLABLE,
            message: format!("booking in status {status} cannot be cancelled"),
        }
    }

    pub fn invalid_transition(from: &str, to: &str) -> Self {
        Self::Booking {
            code: codes::INVALID_TRANSITION,
            message: format!("cannot transition booking from {from} to {to}"),
        }
    }

    /// Stable machine-readable code for the boundary layer.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RoomUnavailable(_) => "ROOM_UNAVAILABLE",
            Self::Booking { code, .. } => code,
            Self::Payment(_) => "PAYMENT_FAILED",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::Store(_) => "STORE_ERROR",
            Self::GatewayTimeout(_) => "GATEWAY_TIMEOUT",
            Self::Csv(_) => "INVALID_INPUT",
            Self::Io(_) => "IO_ERROR",
        }
    }
}
