use crate::domain::ports::{BookingStoreRef, RoomFilters, RoomPage, RoomStoreRef};
use crate::domain::room::RoomStatus;
use crate::error::{CoreError, Result};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Answer to "can this room accept a booking for these dates".
#[derive(Debug, Serialize, PartialEq, Clone, Copy)]
pub struct Availability {
    pub available: bool,
    pub current_occupancy: u32,
    pub max_occupancy: u32,
}

/// Reads room and booking state to compute occupancy over a date range.
///
/// Hold expiry is enforced here as data: every occupancy computation checks
/// `hold_expires_at` itself, so a hold lapsing mid-flight never blocks a
/// legitimate new booking even if no reaper has run.
#[derive(Clone)]
pub struct AvailabilityChecker {
    rooms: RoomStoreRef,
    bookings: BookingStoreRef,
}

impl AvailabilityChecker {
    pub fn new(rooms: RoomStoreRef, bookings: BookingStoreRef) -> Self {
        Self { rooms, bookings }
    }

    /// Fails with `RoomUnavailable` when the room does not exist. Rooms not in
    /// `available` status are never bookable, regardless of occupancy.
    pub async fn check(
        &self,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Availability> {
        let room = self
            .rooms
            .get(room_id)
            .await?
            .ok_or_else(|| CoreError::RoomUnavailable(format!("room {room_id} not found")))?;

        if room.status != RoomStatus::Available {
            return Ok(Availability {
                available: false,
                current_occupancy: 0,
                max_occupancy: room.max_occupancy,
            });
        }

        let now = Utc::now();
        let current_occupancy = self
            .bookings
            .for_room(room_id)
            .await?
            .iter()
            .filter(|booking| booking.holds_inventory(now) && booking.overlaps(check_in, check_out))
            .count() as u32;

        Ok(Availability {
            available: current_occupancy < room.max_occupancy,
            current_occupancy,
            max_occupancy: room.max_occupancy,
        })
    }

    /// Paginated filter over rooms open for booking, ordered by rate ascending.
    pub async fn search_rooms(&self, filters: &RoomFilters) -> Result<RoomPage> {
        self.rooms.search(filters).await
    }
}
