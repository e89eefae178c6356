use crate::application::availability::AvailabilityChecker;
use crate::application::locks::LockMap;
use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::money::Money;
use crate::domain::ports::{BookingStoreRef, RoomStoreRef};
use crate::domain::pricing::calculate_price;
use crate::error::{CoreError, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

/// How long a pending booking reserves inventory before payment.
pub const HOLD_TTL_MINUTES: i64 = 15;

/// What the caller needs to complete payment before the hold lapses.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct BookingHold {
    pub id: Uuid,
    pub total_amount: Money,
    pub expires_at: DateTime<Utc>,
}

/// Creates, reads, and cancels bookings; owns the hold lifecycle.
///
/// Booking creation takes a per-room advisory lock across the availability
/// check and the insert, so two concurrent requests for the last open slot
/// cannot both succeed. A plain read-count-then-insert would be a race.
///
/// Cancellation and the hold sweep take a per-booking lock from `booking_locks`,
/// which is the same map the payment reconciler holds across a capture, so a
/// cancel can never store a stale copy over a concurrent confirmation.
#[derive(Clone)]
pub struct BookingOrchestrator {
    rooms: RoomStoreRef,
    bookings: BookingStoreRef,
    availability: AvailabilityChecker,
    room_locks: LockMap,
    booking_locks: LockMap,
}

impl BookingOrchestrator {
    pub fn new(rooms: RoomStoreRef, bookings: BookingStoreRef, booking_locks: LockMap) -> Self {
        let availability = AvailabilityChecker::new(rooms.clone(), bookings.clone());
        Self {
            rooms,
            bookings,
            availability,
            room_locks: LockMap::new(),
            booking_locks,
        }
    }

    pub fn availability(&self) -> &AvailabilityChecker {
        &self.availability
    }

    /// Places a 15-minute hold on the room and returns what the caller needs
    /// to pay for it. Fails with `RoomUnavailable` when the room is missing,
    /// closed, or full for the requested dates.
    pub async fn create_booking(
        &self,
        owner_id: &str,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        promo_code: Option<&str>,
    ) -> Result<BookingHold> {
        // Held until the insert below commits; see LockMap.
        let _guard = self.room_locks.acquire(room_id).await;

        let availability = self.availability.check(room_id, check_in, check_out).await?;
        if !availability.available {
            return Err(CoreError::RoomUnavailable(format!(
                "room {room_id} cannot accept a booking for {check_in}..{check_out}"
            )));
        }

        let room = self
            .rooms
            .get(room_id)
            .await?
            .ok_or_else(|| CoreError::RoomUnavailable(format!("room {room_id} not found")))?;

        let quote = calculate_price(&room, check_in, check_out, promo_code);
        let now = Utc::now();
        let expires_at = now + Duration::minutes(HOLD_TTL_MINUTES);
        let booking = Booking::new_hold(
            owner_id, &room, check_in, check_out, &quote, promo_code, now, expires_at,
        );
        let hold = BookingHold {
            id: booking.id,
            total_amount: booking.total_amount,
            expires_at,
        };

        self.bookings.store(booking).await?;
        tracing::info!(
            booking_id = %hold.id,
            %room_id,
            owner_id,
            total = hold.total_amount.0,
            "booking hold created"
        );
        Ok(hold)
    }

    /// Ownership-scoped lookup; `None` rather than an error on a miss or a
    /// booking belonging to someone else.
    pub async fn get_booking(&self, booking_id: Uuid, owner_id: &str) -> Result<Option<Booking>> {
        Ok(self
            .bookings
            .get(booking_id)
            .await?
            .filter(|booking| booking.owner_id == owner_id))
    }

    /// All bookings for an owner, newest first.
    pub async fn get_bookings(&self, owner_id: &str) -> Result<Vec<Booking>> {
        let mut bookings = self.bookings.for_owner(owner_id).await?;
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }

    /// Cancels a pending or confirmed booking, releasing its room slot.
    pub async fn cancel_booking(
        &self,
        booking_id: Uuid,
        owner_id: &str,
        reason: &str,
    ) -> Result<Booking> {
        let _guard = self.booking_locks.acquire(booking_id).await;

        let mut booking = self
            .get_booking(booking_id, owner_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("booking {booking_id}")))?;

        if !matches!(
            booking.status,
            BookingStatus::Pending | BookingStatus::Confirmed
        ) {
            return Err(CoreError::not_cancellable(booking.status.as_str()));
        }

        booking.transition(BookingStatus::Cancelled, Utc::now())?;
        booking.cancellation_reason = Some(reason.to_string());
        self.bookings.store(booking.clone()).await?;
        tracing::info!(%booking_id, owner_id, reason, "booking cancelled");
        Ok(booking)
    }

    /// Housekeeping sweep flipping lapsed pending holds to cancelled.
    ///
    /// Occupancy correctness never depends on this running: expiry is a field
    /// checked by every availability computation.
    pub async fn expire_lapsed_holds(&self) -> Result<usize> {
        let now = Utc::now();
        let mut expired = 0;
        for candidate in self.bookings.pending_holds().await? {
            let _guard = self.booking_locks.acquire(candidate.id).await;
            // Re-read under the lock; a concurrent capture or cancel may have
            // moved the booking on since the snapshot.
            let Some(mut booking) = self.bookings.get(candidate.id).await? else {
                continue;
            };
            if booking.status == BookingStatus::Pending
                && booking.metadata.hold_expires_at <= now
            {
                booking.transition(BookingStatus::Cancelled, now)?;
                booking.cancellation_reason = Some("hold expired".to_string());
                self.bookings.store(booking).await?;
                expired += 1;
            }
        }
        if expired > 0 {
            tracing::info!(expired, "lapsed holds swept");
        }
        Ok(expired)
    }
}
