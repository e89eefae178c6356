use crate::domain::money::Money;
use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Created,
    Attempted,
    Captured,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Created => "created",
            PaymentStatus::Attempted => "attempted",
            PaymentStatus::Captured => "captured",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

/// One payment attempt against a booking.
///
/// A retried failed payment creates a new row; rows are never rewritten into a
/// different attempt.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub amount: Money,
    pub currency: String,
    pub gateway: String,
    pub gateway_order_id: String,
    pub gateway_payment_id: Option<String>,
    pub status: PaymentStatus,
    pub method: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub captured_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
}

impl Payment {
    pub fn new(
        booking_id: Uuid,
        amount: Money,
        currency: &str,
        gateway: &str,
        gateway_order_id: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            booking_id,
            amount,
            currency: currency.to_string(),
            gateway: gateway.to_string(),
            gateway_order_id,
            gateway_payment_id: None,
            status: PaymentStatus::Created,
            method: None,
            failure_reason: None,
            created_at: now,
            captured_at: None,
            refunded_at: None,
        }
    }

    /// Marks the payment captured. Returns `false` when it already was, so
    /// the client-driven verify and the webhook can both attempt the same
    /// capture and converge without double-applying it.
    pub fn capture(
        &mut self,
        gateway_payment_id: &str,
        method: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        match self.status {
            PaymentStatus::Captured => Ok(false),
            PaymentStatus::Created | PaymentStatus::Attempted => {
                self.status = PaymentStatus::Captured;
                self.gateway_payment_id = Some(gateway_payment_id.to_string());
                self.method = method.map(str::to_string);
                self.captured_at = Some(now);
                Ok(true)
            }
            other => Err(CoreError::Payment(format!(
                "cannot capture payment in status {}",
                other.as_str()
            ))),
        }
    }

    /// Marks the payment failed. Repeated failure events are a no-op, and a
    /// late failure for an already-captured payment must not regress it.
    pub fn fail(
        &mut self,
        gateway_payment_id: Option<&str>,
        reason: Option<&str>,
    ) -> bool {
        match self.status {
            PaymentStatus::Created | PaymentStatus::Attempted => {
                self.status = PaymentStatus::Failed;
                if let Some(id) = gateway_payment_id {
                    self.gateway_payment_id = Some(id.to_string());
                }
                self.failure_reason = Some(reason.unwrap_or("payment failed").to_string());
                true
            }
            _ => false,
        }
    }

    /// Marks a captured payment refunded.
    pub fn refund(&mut self, now: DateTime<Utc>) -> Result<bool> {
        match self.status {
            PaymentStatus::Refunded => Ok(false),
            PaymentStatus::Captured => {
                self.status = PaymentStatus::Refunded;
                self.refunded_at = Some(now);
                Ok(true)
            }
            other => Err(CoreError::Payment(format!(
                "cannot refund payment in status {}",
                other.as_str()
            ))),
        }
    }
}
