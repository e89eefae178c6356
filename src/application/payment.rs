use crate::application::locks::LockMap;
use crate::domain::booking::{BookingStatus, DepositStatus, SettlementStatus};
use crate::domain::money::{CURRENCY, Money};
use crate::domain::payment::Payment;
use crate::domain::ports::{BookingStoreRef, PaymentGatewayRef, PaymentStoreRef};
use crate::error::{CoreError, Result};
use crate::infrastructure::signature::SignatureVerifier;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Webhook event types pushed by the gateway.
pub mod events {
    pub const PAYMENT_CAPTURED: &str = "payment.captured";
    pub const PAYMENT_FAILED: &str = "payment.failed";
    pub const REFUND_PROCESSED: &str = "refund.processed";
}

/// Default ceiling on any single gateway call.
pub const GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

/// What the caller hands to the gateway checkout.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct PaymentOrder {
    pub order_id: String,
    pub amount: Money,
    pub currency: String,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct PaymentVerification {
    pub success: bool,
    pub payment_id: String,
}

/// Body of a gateway webhook, keyed by the gateway-side identifiers so
/// repeated delivery of the same event is a no-op.
#[derive(Debug, Deserialize, Clone)]
pub struct WebhookPayload {
    pub order_id: String,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Creates gateway orders, verifies capture signatures, and applies webhook
/// events to booking/payment state.
///
/// The client-driven [`verify_payment`](Self::verify_payment) and the pushed
/// `payment.captured` webhook converge on one capture routine guarded by a
/// per-booking lock, so running both concurrently is safe and the second
/// arrival is a no-op. The lock map is shared with the booking orchestrator:
/// cancellation and the hold sweep take the same entry, so no booking write
/// can interleave with a capture.
#[derive(Clone)]
pub struct PaymentReconciler {
    bookings: BookingStoreRef,
    payments: PaymentStoreRef,
    gateway: PaymentGatewayRef,
    verifier: SignatureVerifier,
    booking_locks: LockMap,
    gateway_timeout: Duration,
}

impl PaymentReconciler {
    pub fn new(
        bookings: BookingStoreRef,
        payments: PaymentStoreRef,
        gateway: PaymentGatewayRef,
        verifier: SignatureVerifier,
        booking_locks: LockMap,
    ) -> Self {
        Self {
            bookings,
            payments,
            gateway,
            verifier,
            booking_locks,
            gateway_timeout: GATEWAY_TIMEOUT,
        }
    }

    pub fn with_gateway_timeout(mut self, timeout: Duration) -> Self {
        self.gateway_timeout = timeout;
        self
    }

    /// Creates a gateway order and a local `created` payment row for a booking
    /// still inside its hold window.
    ///
    /// A gateway timeout is an unknown outcome: no local row is written, the
    /// booking is untouched, and the caller retries or waits for a webhook.
    pub async fn create_payment_order(
        &self,
        booking_id: Uuid,
        amount: Money,
    ) -> Result<PaymentOrder> {
        let booking = self
            .bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("booking {booking_id}")))?;

        if booking.status != BookingStatus::Pending {
            return Err(CoreError::Payment(format!(
                "booking {booking_id} is not awaiting payment (status {})",
                booking.status.as_str()
            )));
        }
        if booking.metadata.hold_expires_at <= Utc::now() {
            return Err(CoreError::Payment(format!(
                "hold on booking {booking_id} has expired"
            )));
        }

        let order = tokio::time::timeout(
            self.gateway_timeout,
            self.gateway.create_order(amount, CURRENCY),
        )
        .await
        .map_err(|_| CoreError::GatewayTimeout(self.gateway_timeout))??;

        let payment = Payment::new(
            booking_id,
            amount,
            CURRENCY,
            self.gateway.name(),
            order.id.clone(),
            Utc::now(),
        );
        self.payments.store(payment).await?;
        tracing::info!(%booking_id, order_id = %order.id, amount = amount.0, "payment order created");

        Ok(PaymentOrder {
            order_id: order.id,
            amount,
            currency: CURRENCY.to_string(),
        })
    }

    /// Verifies a client-reported capture against the server-held secret and,
    /// on success, converges payment and booking state.
    ///
    /// The signature is recomputed as HMAC-SHA256 over `order_id|payment_id`
    /// and compared in constant time; any mismatch is `InvalidSignature` and
    /// is never downgraded or retried.
    pub async fn verify_payment(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<PaymentVerification> {
        self.verifier.verify(order_id, payment_id, signature)?;
        self.apply_capture(order_id, payment_id, None).await?;
        Ok(PaymentVerification {
            success: true,
            payment_id: payment_id.to_string(),
        })
    }

    /// Applies a gateway-pushed event. Safe to call repeatedly with the same
    /// event; unknown event types are logged and ignored, never errors.
    pub async fn handle_webhook(&self, event_type: &str, payload: serde_json::Value) -> Result<()> {
        let payload: WebhookPayload = serde_json::from_value(payload)
            .map_err(|e| CoreError::Payment(format!("malformed webhook payload: {e}")))?;

        match event_type {
            events::PAYMENT_CAPTURED => {
                let payment_id = payload.payment_id.as_deref().ok_or_else(|| {
                    CoreError::Payment("payment.captured without payment_id".to_string())
                })?;
                // An order this core never recorded (e.g. created during a
                // timed-out call) cannot be reconciled from the event alone.
                // A capture for a known payment in a terminal state is a
                // genuine anomaly and surfaces as an error.
                if self
                    .payments
                    .by_gateway_order(&payload.order_id)
                    .await?
                    .is_none()
                {
                    tracing::warn!(order_id = %payload.order_id, "capture event for unknown order ignored");
                    return Ok(());
                }
                self.apply_capture(&payload.order_id, payment_id, payload.method.as_deref())
                    .await
            }
            events::PAYMENT_FAILED => self.apply_failure(&payload).await,
            events::REFUND_PROCESSED => self.apply_refund(&payload).await,
            other => {
                tracing::warn!(event_type = other, "unknown webhook event ignored");
                Ok(())
            }
        }
    }

    /// The single converge point for captures, from either the verify path or
    /// the webhook path. Marks the payment captured and the booking confirmed
    /// as one unit under the booking's lock.
    async fn apply_capture(
        &self,
        order_id: &str,
        gateway_payment_id: &str,
        method: Option<&str>,
    ) -> Result<()> {
        let payment = self
            .payments
            .by_gateway_order(order_id)
            .await?
            .ok_or_else(|| CoreError::Payment(format!("no payment for order {order_id}")))?;

        let _guard = self.booking_locks.acquire(payment.booking_id).await;

        // Re-read under the lock; a concurrent path may have captured already.
        let mut payment = self
            .payments
            .get(payment.id)
            .await?
            .ok_or_else(|| CoreError::Payment(format!("payment row vanished for {order_id}")))?;

        let now = Utc::now();
        if !payment.capture(gateway_payment_id, method, now)? {
            return Ok(());
        }
        let booking_id = payment.booking_id;
        self.payments.store(payment).await?;

        let mut booking = self
            .bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("booking {booking_id}")))?;
        if booking.status != BookingStatus::Pending {
            tracing::warn!(
                %booking_id,
                order_id,
                status = booking.status.as_str(),
                "capture applied to a booking no longer pending"
            );
        } else if booking.metadata.hold_expires_at <= now {
            // The slot may have been rebooked once the hold lapsed; confirming
            // now could put the room over capacity. The captured amount stays
            // on the payment row for gateway-side refund.
            tracing::warn!(
                %booking_id,
                order_id,
                "capture arrived after the hold lapsed, booking left unconfirmed"
            );
        } else {
            booking.transition(BookingStatus::Confirmed, now)?;
            booking.payment_status = SettlementStatus::Paid;
            booking.deposit_status = DepositStatus::Held;
            self.bookings.store(booking).await?;
            tracing::info!(%booking_id, order_id, "payment captured, booking confirmed");
        }
        Ok(())
    }

    /// Marks the payment failed without touching the booking: a failed payment
    /// on a still-valid hold allows a retry, as a fresh payment row, until the
    /// hold expires.
    async fn apply_failure(&self, payload: &WebhookPayload) -> Result<()> {
        let Some(payment) = self.payments.by_gateway_order(&payload.order_id).await? else {
            tracing::warn!(order_id = %payload.order_id, "failure event for unknown order ignored");
            return Ok(());
        };

        let _guard = self.booking_locks.acquire(payment.booking_id).await;
        let mut payment = self
            .payments
            .get(payment.id)
            .await?
            .ok_or_else(|| CoreError::Payment("payment row vanished".to_string()))?;

        if payment.fail(payload.payment_id.as_deref(), payload.reason.as_deref()) {
            tracing::info!(
                order_id = %payload.order_id,
                reason = payment.failure_reason.as_deref().unwrap_or_default(),
                "payment failed"
            );
            self.payments.store(payment).await?;
        }
        Ok(())
    }

    /// Marks the payment refunded and the booking's settlement refunded.
    /// Deposit/refund bookkeeping beyond that is outside this core.
    async fn apply_refund(&self, payload: &WebhookPayload) -> Result<()> {
        let Some(payment) = self.payments.by_gateway_order(&payload.order_id).await? else {
            tracing::warn!(order_id = %payload.order_id, "refund event for unknown order ignored");
            return Ok(());
        };

        let _guard = self.booking_locks.acquire(payment.booking_id).await;
        let mut payment = self
            .payments
            .get(payment.id)
            .await?
            .ok_or_else(|| CoreError::Payment("payment row vanished".to_string()))?;

        let now = Utc::now();
        if !payment.refund(now)? {
            return Ok(());
        }
        let booking_id = payment.booking_id;
        self.payments.store(payment).await?;

        if let Some(mut booking) = self.bookings.get(booking_id).await? {
            booking.payment_status = SettlementStatus::Refunded;
            self.bookings.store(booking).await?;
        }
        tracing::info!(%booking_id, order_id = %payload.order_id, "refund processed");
        Ok(())
    }
}
