use chrono::NaiveDate;
use log::debug;
use std::collections::HashSet;
use std::fmt;

use crate::date;
use crate::geoloc;
use crate::timetable::TimetableRow;

/// TGVmax trains only run between these hours; the UI offers no earlier slot.
pub const MIN_QUERY_HOUR: u32 = 3;
pub const MAX_QUERY_HOUR: u32 = 24;

#[derive(Debug, PartialEq)]
pub enum SearchError {
    MalformedTime(String),
    InvalidWindow(String),
    UnknownOrigin(String),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SearchError::MalformedTime(msg) => write!(f, "malformed departure time: {}", msg),
            SearchError::InvalidWindow(msg) => write!(f, "invalid search window: {}", msg),
            SearchError::UnknownOrigin(msg) => write!(f, "unknown origin city: {}", msg),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    OneWay,
    RoundTrip,
}

/// One date plus a half-open departure-hour range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryWindow {
    pub date: NaiveDate,
    /// Inclusive.
    pub min_hour: u32,
    /// Exclusive.
    pub max_hour: u32,
}

impl QueryWindow {
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.min_hour < MIN_QUERY_HOUR || self.max_hour > MAX_QUERY_HOUR {
            return Err(SearchError::InvalidWindow(format!(
                "hours must stay within {}..{}, got {}..{}",
                MIN_QUERY_HOUR, MAX_QUERY_HOUR, self.min_hour, self.max_hour
            )));
        }
        if self.min_hour >= self.max_hour {
            return Err(SearchError::InvalidWindow(format!(
                "min hour {} is not below max hour {}",
                self.min_hour, self.max_hour
            )));
        }
        Ok(())
    }
}

/// The search request handed over by the UI collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub mode: Mode,
    pub origin_city: String,
    pub outbound: QueryWindow,
    pub return_window: Option<QueryWindow>,
}

impl SearchQuery {
    /// Rejects structurally bad queries before any filtering runs.
    pub fn validate(&self, timetable: &[TimetableRow]) -> Result<(), SearchError> {
        self.outbound.validate()?;
        match (self.mode, &self.return_window) {
            (Mode::RoundTrip, Some(window)) => window.validate()?,
            (Mode::RoundTrip, None) => {
                return Err(SearchError::InvalidWindow(
                    "a round trip query needs a return window".to_string(),
                ))
            }
            (Mode::OneWay, _) => {}
        }
        let destinations = geoloc::distinct_destinations(timetable);
        if !destinations.iter().any(|city| city == &self.origin_city) {
            return Err(SearchError::UnknownOrigin(format!(
                "{} does not appear in the timetable destinations",
                self.origin_city
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Leg {
    Outbound,
    Return,
}

/// One filtered leg, plus the fields later stages derive from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Journey {
    pub date: NaiveDate,
    pub origin: String,
    pub destination: String,
    pub departure_time: String,
    /// Departure hour with minutes truncated, validated during selection.
    pub hour: u32,
    /// The endpoint that is not the query's fixed origin city.
    pub common_destination: String,
    pub lat: f64,
    pub lon: f64,
}

/// Restricts a timetable to one date, one hour window, available seats and
/// the queried endpoint. Rows with an unparseable departure time on the
/// queried date abort the search rather than vanish from the result.
pub fn select_journeys(
    timetable: &[TimetableRow],
    window: &QueryWindow,
    origin_city: &str,
    leg: Leg,
) -> Result<Vec<Journey>, SearchError> {
    let mut selection = Vec::new();

    for row in timetable.iter() {
        if row.date != window.date {
            continue;
        }
        let hour = date::departure_hour(&row.departure_time).map_err(|err| {
            SearchError::MalformedTime(format!("{}: {}", row.departure_time, err))
        })?;
        if !row.available {
            continue;
        }
        let (fixed, common) = match leg {
            Leg::Outbound => (&row.origin, &row.destination),
            Leg::Return => (&row.destination, &row.origin),
        };
        if fixed.as_str() != origin_city {
            continue;
        }
        if hour < window.min_hour || hour >= window.max_hour {
            continue;
        }
        selection.push(Journey {
            date: row.date,
            origin: row.origin.clone(),
            destination: row.destination.clone(),
            departure_time: row.departure_time.clone(),
            hour,
            common_destination: common.clone(),
            lat: 0.0,
            lon: 0.0,
        });
    }

    debug!(
        "{} legs from {} pass the {} - {}h window on {}",
        selection.len(),
        origin_city,
        window.min_hour,
        window.max_hour,
        date::format_date(window.date)
    );
    Ok(selection)
}

/// Keeps only cities reachable both ways. Validity is per city, not per
/// row, so a city served by three outbound trains and one return train
/// survives with all four rows.
pub fn reconcile_round_trips(
    outbound: Vec<Journey>,
    return_: Vec<Journey>,
) -> (Vec<Journey>, Vec<Journey>) {
    let valid: HashSet<String> = {
        let out_cities: HashSet<&str> = outbound
            .iter()
            .map(|journey| journey.common_destination.as_str())
            .collect();
        let ret_cities: HashSet<&str> = return_
            .iter()
            .map(|journey| journey.common_destination.as_str())
            .collect();
        out_cities
            .intersection(&ret_cities)
            .map(|city| city.to_string())
            .collect()
    };

    debug!("{} cities are valid as round trips", valid.len());

    let outbound = outbound
        .into_iter()
        .filter(|journey| valid.contains(&journey.common_destination))
        .collect();
    let return_ = return_
        .into_iter()
        .filter(|journey| valid.contains(&journey.common_destination))
        .collect();
    (outbound, return_)
}

/// A selection sorted by destination, date and hour. Building map points
/// merges adjacent rows, so it only accepts this type.
#[derive(Debug, Clone, PartialEq)]
pub struct SortedJourneys(Vec<Journey>);

impl SortedJourneys {
    pub fn rows(&self) -> &[Journey] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Applies a row-wise update, keeping the sort order intact.
    pub fn map_rows<F>(mut self, mut f: F) -> SortedJourneys
    where
        F: FnMut(&mut Journey),
    {
        for row in self.0.iter_mut() {
            f(row);
        }
        self
    }
}

/// Stable sort by (common destination, date, departure hour). Rows equal on
/// all three keys keep their relative order, minutes are not compared.
pub fn sort_journeys(mut selection: Vec<Journey>) -> SortedJourneys {
    selection.sort_by(|a, b| {
        (a.common_destination.as_str(), a.date, a.hour)
            .cmp(&(b.common_destination.as_str(), b.date, b.hour))
    });
    SortedJourneys(selection)
}
