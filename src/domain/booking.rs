use crate::domain::money::Money;
use crate::domain::pricing::{PriceBreakdown, PricingResult};
use crate::domain::room::Room;
use crate::error::{CoreError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Active,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Active => "active",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// The single transition-validation point for the booking state machine:
    ///
    /// `pending -> confirmed -> active -> completed`, with `pending` and
    /// `confirmed` also allowed to go to `cancelled`. Everything else is
    /// rejected, never silently ignored.
    pub fn can_transition(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Active)
                | (Confirmed, Cancelled)
                | (Active, Completed)
        )
    }
}

/// Settlement progress of the booking as a whole, distinct from the status of
/// any individual payment attempt.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    Pending,
    Partial,
    Paid,
    Refunded,
}

impl SettlementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementStatus::Pending => "pending",
            SettlementStatus::Partial => "partial",
            SettlementStatus::Paid => "paid",
            SettlementStatus::Refunded => "refunded",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum DepositStatus {
    Pending,
    Held,
    Returned,
    Forfeited,
}

/// Audit bag persisted alongside the booking: the promo code used, the hold
/// deadline, and the full price breakdown.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct BookingMetadata {
    pub promo_code: Option<String>,
    pub hold_expires_at: DateTime<Utc>,
    pub breakdown: PriceBreakdown,
}

/// A reservation of room inventory.
///
/// Created as a `pending` hold by the orchestrator, confirmed only by a
/// verified payment capture, and never deleted; cancelled bookings stay for
/// audit. Invariant: `total_amount == base_amount - discount_amount +
/// tax_amount`, all integer minor units.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Booking {
    pub id: Uuid,
    pub room_id: Uuid,
    /// Opaque, already-authenticated owner identity supplied by the caller.
    pub owner_id: String,
    pub status: BookingStatus,
    pub check_in: NaiveDate,
    /// `None` means the stay is open-ended and still ongoing.
    pub check_out: Option<NaiveDate>,
    pub base_amount: Money,
    pub discount_amount: Money,
    pub tax_amount: Money,
    pub total_amount: Money,
    pub payment_status: SettlementStatus,
    pub security_deposit: Money,
    pub deposit_status: DepositStatus,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub metadata: BookingMetadata,
}

impl Booking {
    /// Builds a new `pending` hold from a priced quote.
    pub fn new_hold(
        owner_id: &str,
        room: &Room,
        check_in: NaiveDate,
        check_out: NaiveDate,
        quote: &PricingResult,
        promo_code: Option<&str>,
        now: DateTime<Utc>,
        hold_expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_id: room.id,
            owner_id: owner_id.to_string(),
            status: BookingStatus::Pending,
            check_in,
            check_out: Some(check_out),
            base_amount: quote.base_amount,
            discount_amount: quote.discount_amount,
            tax_amount: quote.tax_amount,
            total_amount: quote.total_amount,
            payment_status: SettlementStatus::Pending,
            // Two nights of base rate, held against damages.
            security_deposit: Money(room.base_rate.0 * 2),
            deposit_status: DepositStatus::Pending,
            created_at: now,
            confirmed_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            metadata: BookingMetadata {
                promo_code: promo_code.map(str::to_string),
                hold_expires_at,
                breakdown: quote.breakdown.clone(),
            },
        }
    }

    /// Applies a state transition, recording the matching timestamp.
    /// Fails with `INVALID_TRANSITION` for any edge outside the state machine.
    pub fn transition(&mut self, next: BookingStatus, now: DateTime<Utc>) -> Result<()> {
        if !self.status.can_transition(next) {
            return Err(CoreError::invalid_transition(
                self.status.as_str(),
                next.as_str(),
            ));
        }
        match next {
            BookingStatus::Confirmed => self.confirmed_at = Some(now),
            BookingStatus::Cancelled => self.cancelled_at = Some(now),
            _ => {}
        }
        self.status = next;
        Ok(())
    }

    /// Whether this booking occupies a room slot at `now`.
    ///
    /// Confirmed and active bookings always do; a pending hold only until its
    /// `hold_expires_at` passes. A lapsed hold behaves as if it never existed,
    /// so expiry needs no background sweep to be enforced.
    pub fn holds_inventory(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            BookingStatus::Confirmed | BookingStatus::Active => true,
            BookingStatus::Pending => self.metadata.hold_expires_at > now,
            _ => false,
        }
    }

    /// Inclusive date-range overlap. An open-ended stay (`check_out == None`)
    /// always overlaps.
    pub fn overlaps(&self, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        self.check_in <= check_out && self.check_out.is_none_or(|existing| existing >= check_in)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pricing::calculate_price;
    use crate::domain::room::RoomType;
    use chrono::Duration;

    fn sample_booking() -> Booking {
        let room = Room::new("pune", RoomType::Single, Money(10_000), 1);
        let check_in = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let check_out = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        let quote = calculate_price(&room, check_in, check_out, None);
        let now = Utc::now();
        Booking::new_hold(
            "owner-1",
            &room,
            check_in,
            check_out,
            &quote,
            None,
            now,
            now + Duration::minutes(15),
        )
    }

    #[test]
    fn test_new_hold_amounts() {
        let booking = sample_booking();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.total_amount, Money(354_000));
        assert_eq!(booking.security_deposit, Money(20_000));
        assert_eq!(
            booking.total_amount,
            booking.base_amount - booking.discount_amount + booking.tax_amount
        );
    }

    #[test]
    fn test_valid_transitions() {
        let mut booking = sample_booking();
        let now = Utc::now();
        booking.transition(BookingStatus::Confirmed, now).unwrap();
        assert!(booking.confirmed_at.is_some());
        booking.transition(BookingStatus::Active, now).unwrap();
        booking.transition(BookingStatus::Completed, now).unwrap();
    }

    #[test]
    fn test_invalid_transition_rejected() {
        let mut booking = sample_booking();
        let now = Utc::now();
        let err = booking
            .transition(BookingStatus::Completed, now)
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_TRANSITION");
        // State unchanged after a rejected transition.
        assert_eq!(booking.status, BookingStatus::Pending);
    }

    #[test]
    fn test_completed_is_terminal() {
        let mut booking = sample_booking();
        let now = Utc::now();
        booking.transition(BookingStatus::Confirmed, now).unwrap();
        booking.transition(BookingStatus::Active, now).unwrap();
        booking.transition(BookingStatus::Completed, now).unwrap();
        assert!(
            booking
                .transition(BookingStatus::Cancelled, now)
                .is_err()
        );
    }

    #[test]
    fn test_expired_hold_releases_inventory() {
        let mut booking = sample_booking();
        assert!(booking.holds_inventory(Utc::now()));
        booking.metadata.hold_expires_at = Utc::now() - Duration::minutes(1);
        assert!(!booking.holds_inventory(Utc::now()));
    }

    #[test]
    fn test_confirmed_holds_inventory_past_expiry() {
        let mut booking = sample_booking();
        booking.transition(BookingStatus::Confirmed, Utc::now()).unwrap();
        booking.metadata.hold_expires_at = Utc::now() - Duration::minutes(1);
        assert!(booking.holds_inventory(Utc::now()));
    }

    #[test]
    fn test_overlap_is_inclusive() {
        let booking = sample_booking();
        let d = |m, day| NaiveDate::from_ymd_opt(2026, m, day).unwrap();
        // Booking spans 2026-06-01..=2026-07-01.
        assert!(booking.overlaps(d(7, 1), d(7, 10)));
        assert!(booking.overlaps(d(5, 1), d(6, 1)));
        assert!(!booking.overlaps(d(7, 2), d(7, 10)));
        assert!(!booking.overlaps(d(5, 1), d(5, 31)));
    }

    #[test]
    fn test_open_ended_stay_always_overlaps() {
        let mut booking = sample_booking();
        booking.check_out = None;
        let d = |m: u32, day| NaiveDate::from_ymd_opt(2027, m, day).unwrap();
        assert!(booking.overlaps(d(1, 1), d(1, 10)));
    }
}
