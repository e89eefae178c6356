use crate::domain::money::Money;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Available,
    Occupied,
    Maintenance,
    Reserved,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "available",
            RoomStatus::Occupied => "occupied",
            RoomStatus::Maintenance => "maintenance",
            RoomStatus::Reserved => "reserved",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Single,
    Shared,
    Studio,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Single => "single",
            RoomType::Shared => "shared",
            RoomType::Studio => "studio",
        }
    }
}

/// A bookable room.
///
/// Owned by the property/inventory subsystem; this core only reads it. Only
/// rooms in [`RoomStatus::Available`] accept bookings, regardless of occupancy.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Room {
    pub id: Uuid,
    pub city: String,
    pub room_type: RoomType,
    /// Nightly rate in minor currency units.
    pub base_rate: Money,
    /// Maximum simultaneous occupants.
    pub max_occupancy: u32,
    pub status: RoomStatus,
}

impl Room {
    pub fn new(
        city: impl Into<String>,
        room_type: RoomType,
        base_rate: Money,
        max_occupancy: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            city: city.into(),
            room_type,
            base_rate,
            max_occupancy,
            status: RoomStatus::Available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_status_serialization() {
        let json = serde_json::to_string(&RoomStatus::Maintenance).unwrap();
        assert_eq!(json, "\"maintenance\"");

        let status: RoomStatus = serde_json::from_str("\"available\"").unwrap();
        assert_eq!(status, RoomStatus::Available);
    }

    #[test]
    fn test_new_room_starts_available() {
        let room = Room::new("pune", RoomType::Single, Money(10_000), 1);
        assert_eq!(room.status, RoomStatus::Available);
        assert_eq!(room.base_rate, Money(10_000));
    }
}
