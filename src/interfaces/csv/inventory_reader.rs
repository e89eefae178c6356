use crate::domain::money::Money;
use crate::domain::room::{Room, RoomStatus, RoomType};
use crate::error::{CoreError, Result};
use serde::Deserialize;
use std::io::Read;

/// One room row in the seed inventory file:
/// `id, city, type, rate, occupancy, status`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct RoomRecord {
    pub id: String,
    pub city: String,
    pub r#type: RoomType,
    /// Nightly rate in minor currency units.
    pub rate: i64,
    pub occupancy: u32,
    pub status: RoomStatus,
}

impl RoomRecord {
    /// Converts the record into a room, returning the file-local label the
    /// command log refers to it by.
    pub fn into_room(self) -> (String, Room) {
        let mut room = Room::new(self.city, self.r#type, Money(self.rate), self.occupancy);
        room.status = self.status;
        (self.id, room)
    }
}

/// Reads seed inventory from a CSV source, trimming whitespace.
pub struct InventoryReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> InventoryReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn rooms(self) -> impl Iterator<Item = Result<RoomRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(CoreError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_valid_stream() {
        let data = "id, city, type, rate, occupancy, status\n\
                    R1, pune, single, 10000, 1, available\n\
                    R2, mumbai, shared, 6000, 4, maintenance";
        let records: Vec<Result<RoomRecord>> = InventoryReader::new(data.as_bytes())
            .rooms()
            .collect();

        assert_eq!(records.len(), 2);
        let (label, room) = records[0].as_ref().unwrap().clone().into_room();
        assert_eq!(label, "R1");
        assert_eq!(room.base_rate, Money(10_000));
        assert_eq!(room.status, RoomStatus::Available);

        let (_, closed) = records[1].as_ref().unwrap().clone().into_room();
        assert_eq!(closed.status, RoomStatus::Maintenance);
        assert_eq!(closed.max_occupancy, 4);
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "id, city, type, rate, occupancy, status\n\
                    R1, pune, castle, 10000, 1, available";
        let records: Vec<Result<RoomRecord>> = InventoryReader::new(data.as_bytes())
            .rooms()
            .collect();
        assert!(records[0].is_err());
    }
}
