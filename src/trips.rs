//! Historical trip records and their CSV reader.
//!
//! The reader understands the NYC TLC yellow-taxi layout: columns are found
//! by header name and unknown columns are ignored.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::{RecordError, TrainingError};
use crate::geometry::Point;

/// Local timestamp format of the trip files.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A historical trip. Points are `(longitude, latitude)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripRecord {
    /// Pickup time, epoch seconds.
    pub pickup_time: i64,
    /// Dropoff time, epoch seconds.
    pub dropoff_time: i64,
    pub pickup: Point,
    pub dropoff: Point,
}

#[derive(Debug, Deserialize)]
struct RawTrip {
    #[serde(alias = "tpep_pickup_datetime")]
    pickup_datetime: String,
    #[serde(alias = "tpep_dropoff_datetime")]
    dropoff_datetime: String,
    pickup_longitude: f64,
    pickup_latitude: f64,
    dropoff_longitude: f64,
    dropoff_latitude: f64,
}

/// Parse a local `YYYY-MM-DD HH:MM:SS` timestamp into epoch seconds.
///
/// Times repeated by a DST fall-back resolve to the earlier instant;
/// times skipped by a spring-forward are rejected.
pub fn parse_local_timestamp(text: &str, timezone: Tz) -> Result<i64, RecordError> {
    let naive = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .map_err(|_| RecordError::Timestamp(text.to_string()))?;
    timezone
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.timestamp())
        .ok_or_else(|| RecordError::Timestamp(text.to_string()))
}

/// Streaming reader of trip records. Each item is either a record or the
/// reason that row was rejected.
pub struct TripReader<R> {
    rows: csv::DeserializeRecordsIntoIter<R, RawTrip>,
    timezone: Tz,
}

impl<R: Read> TripReader<R> {
    pub fn new(reader: R, timezone: Tz) -> Self {
        let rows = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader)
            .into_deserialize();
        Self { rows, timezone }
    }

    fn convert(&self, raw: RawTrip) -> Result<TripRecord, RecordError> {
        Ok(TripRecord {
            pickup_time: parse_local_timestamp(&raw.pickup_datetime, self.timezone)?,
            dropoff_time: parse_local_timestamp(&raw.dropoff_datetime, self.timezone)?,
            pickup: Point::new(raw.pickup_longitude, raw.pickup_latitude),
            dropoff: Point::new(raw.dropoff_longitude, raw.dropoff_latitude),
        })
    }
}

impl TripReader<File> {
    pub fn open(path: &Path, timezone: Tz) -> Result<Self, TrainingError> {
        let file = File::open(path).map_err(|source| TrainingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(file, timezone))
    }
}

impl<R: Read> Iterator for TripReader<R> {
    type Item = Result<TripRecord, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        Some(row.map_err(RecordError::from).and_then(|raw| self.convert(raw)))
    }
}
