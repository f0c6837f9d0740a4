use chrono::NaiveDate;
use log::debug;
use serde::Deserialize;
use std::fmt;
use std::io::Read;

use crate::date;

/// One scheduled journey leg from the SNCF TGVmax open-data table.
///
/// Field names map the original French column headers; the raw station
/// name is kept untouched, aliasing only happens at coordinate lookup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimetableRow {
    #[serde(rename = "DATE", with = "date::naive_date")]
    pub date: NaiveDate,
    #[serde(rename = "Origine")]
    pub origin: String,
    #[serde(rename = "Destination")]
    pub destination: String,
    #[serde(rename = "Heure_depart")]
    pub departure_time: String,
    #[serde(
        rename = "Disponibilité de places MAX JEUNE et MAX SENIOR",
        with = "date::oui_non"
    )]
    pub available: bool,
}

#[derive(Debug)]
pub enum TimetableError {
    JsonParseError(serde_json::Error),
    InvalidRow(String),
}

impl fmt::Display for TimetableError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TimetableError::JsonParseError(err) => write!(f, "invalid timetable JSON: {}", err),
            TimetableError::InvalidRow(msg) => write!(f, "invalid timetable row: {}", msg),
        }
    }
}

/// Loads a materialized timetable from its JSON form (an array of rows).
pub fn from_json(reader: impl Read) -> Result<Vec<TimetableRow>, TimetableError> {
    let rows: Vec<TimetableRow> =
        serde_json::from_reader(reader).map_err(TimetableError::JsonParseError)?;

    for row in rows.iter() {
        if row.origin == row.destination {
            return Err(TimetableError::InvalidRow(format!(
                "{} to {} on {}: origin and destination are the same city",
                row.origin,
                row.destination,
                date::format_date(row.date)
            )));
        }
    }

    debug!("Loaded {} timetable rows", rows.len());
    Ok(rows)
}
