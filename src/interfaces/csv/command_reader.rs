use crate::error::{CoreError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CommandOp {
    /// Place a hold. `note` carries an optional promo code.
    Book,
    /// Cancel a booking. `note` carries the reason.
    Cancel,
    /// Create an order, simulate checkout, and verify the capture.
    Pay,
}

/// One row of the replay log:
/// `op, booking, owner, room, check_in, check_out, note`.
///
/// `booking` is a file-local label; later rows refer to earlier `book` rows
/// by it. Fields an op does not use are left empty.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Command {
    pub op: CommandOp,
    pub booking: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub check_in: Option<NaiveDate>,
    #[serde(default)]
    pub check_out: Option<NaiveDate>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Streams booking commands from a CSV source.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(CoreError::from))
    }
}
