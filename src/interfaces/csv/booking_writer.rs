use crate::domain::booking::Booking;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// One output row of the replay report.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct BookingRow {
    pub booking: String,
    pub owner: String,
    pub room: String,
    pub status: &'static str,
    pub payment_status: &'static str,
    pub total_amount: i64,
}

impl BookingRow {
    pub fn from_booking(label: &str, room_label: &str, booking: &Booking) -> Self {
        Self {
            booking: label.to_string(),
            owner: booking.owner_id.clone(),
            room: room_label.to_string(),
            status: booking.status.as_str(),
            payment_status: booking.payment_status.as_str(),
            total_amount: booking.total_amount.0,
        }
    }
}

/// Writes the final booking states as CSV.
pub struct BookingWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BookingWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_rows(&mut self, rows: Vec<BookingRow>) -> Result<()> {
        for row in rows {
            self.writer.serialize(row)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
