//! Engine behind the TGVmax destinations map: filters the pass timetable
//! by city, date and hour window, optionally keeps only journeys usable as
//! round trips, and turns the result into placeable map markers.
//!
//! The pipeline is a chain of pure transforms, each owning its output:
//! select (once or twice) -> reconcile -> sort -> attach coordinates ->
//! build points. Downloading the timetable, geocoding the cities and
//! rendering the map all happen elsewhere; this crate only consumes their
//! materialized tables.

use log::{error, info};

pub mod date;
pub mod geoloc;
pub mod map;
pub mod search;
pub mod timetable;

use geoloc::CoordinateTable;
use map::{Category, MapPoint};
use search::{Leg, Mode, SearchError, SearchQuery};
use timetable::TimetableRow;

/// Everything the rendering collaborator needs: one origin marker, one
/// marker per destination, and the cities left without coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub origin: MapPoint,
    pub destinations: Vec<MapPoint>,
    pub unresolved: Vec<String>,
}

impl SearchOutcome {
    /// No journey survived the filters. A valid outcome, not a failure.
    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }
}

/// Runs the whole pipeline for one search. Re-running with the same inputs
/// yields an identical outcome.
pub fn run_search(
    query: &SearchQuery,
    timetable: &[TimetableRow],
    coordinates: &CoordinateTable,
) -> Result<SearchOutcome, SearchError> {
    query.validate(timetable)?;

    let outbound = search::select_journeys(timetable, &query.outbound, &query.origin_city, Leg::Outbound)?;

    let journeys = match (query.mode, &query.return_window) {
        (Mode::RoundTrip, Some(window)) => {
            let return_ =
                search::select_journeys(timetable, window, &query.origin_city, Leg::Return)?;
            let (mut outbound, mut return_) = search::reconcile_round_trips(outbound, return_);
            outbound.append(&mut return_);
            outbound
        }
        _ => outbound,
    };

    let sorted = search::sort_journeys(journeys);
    let (joined, mut unresolved) = geoloc::attach_coordinates(sorted, coordinates, &query.origin_city);

    let (origin_lat, origin_lon) = match coordinates
        .get(geoloc::explicit_name(&query.origin_city))
        .copied()
    {
        Some(coords) => coords,
        None => {
            error!("origin {} geolocalisation not found", query.origin_city);
            unresolved.push(query.origin_city.clone());
            (0.0, 0.0)
        }
    };

    let destinations = map::build_map_points(&joined, &query.origin_city);
    info!(
        "Placed {} destination markers around {}",
        destinations.len(),
        query.origin_city
    );

    Ok(SearchOutcome {
        origin: MapPoint {
            lat: origin_lat,
            lon: origin_lon,
            label: query.origin_city.clone(),
            category: Category::Origin,
        },
        destinations,
        unresolved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::QueryWindow;
    use chrono::NaiveDate;
    use maplit::hashmap;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn row(origin: &str, destination: &str, time: &str) -> TimetableRow {
        TimetableRow {
            date: date(1),
            origin: origin.to_string(),
            destination: destination.to_string(),
            departure_time: time.to_string(),
            available: true,
        }
    }

    fn sample_timetable() -> Vec<TimetableRow> {
        vec![
            row("Paris", "Lyon", "08:00"),
            row("Lyon", "Paris", "18:00"),
            row("Paris", "Marseille", "09:00"),
            row("Marseille", "Paris", "19:00"),
        ]
    }

    fn sample_coordinates() -> CoordinateTable {
        hashmap! {
            "Paris".to_string() => (48.856614, 2.352222),
            "Lyon".to_string() => (45.757814, 4.832011),
            "Marseille".to_string() => (43.296482, 5.36978),
        }
    }

    fn query(mode: Mode, return_window: Option<QueryWindow>) -> SearchQuery {
        SearchQuery {
            mode,
            origin_city: "Paris".to_string(),
            outbound: QueryWindow {
                date: date(1),
                min_hour: 3,
                max_hour: if mode == Mode::RoundTrip { 12 } else { 24 },
            },
            return_window,
        }
    }

    #[test]
    fn test_one_way_search() {
        let outcome = run_search(
            &query(Mode::OneWay, None),
            &sample_timetable(),
            &sample_coordinates(),
        )
        .unwrap();

        assert_eq!(outcome.origin.label, "Paris");
        assert_eq!(outcome.origin.category, Category::Origin);
        assert_eq!(outcome.origin.lat, 48.856614);
        assert!(outcome.unresolved.is_empty());
        assert_eq!(
            outcome
                .destinations
                .iter()
                .map(|point| point.label.as_str())
                .collect::<Vec<_>>(),
            vec![
                "Lyon -- Aller le 2024-06-01 à 08:00",
                "Marseille -- Aller le 2024-06-01 à 09:00",
            ]
        );
    }

    #[test]
    fn test_round_trip_search_combines_both_legs() {
        let return_window = QueryWindow {
            date: date(1),
            min_hour: 12,
            max_hour: 24,
        };
        let outcome = run_search(
            &query(Mode::RoundTrip, Some(return_window)),
            &sample_timetable(),
            &sample_coordinates(),
        )
        .unwrap();

        assert_eq!(
            outcome
                .destinations
                .iter()
                .map(|point| point.label.as_str())
                .collect::<Vec<_>>(),
            vec![
                "Lyon -- Aller le 2024-06-01 à 08:00 -- Retour le 2024-06-01 à 18:00",
                "Marseille -- Aller le 2024-06-01 à 09:00 -- Retour le 2024-06-01 à 19:00",
            ]
        );
    }

    #[test]
    fn test_round_trip_search_drops_one_way_cities() {
        let mut timetable = sample_timetable();
        timetable.push(row("Paris", "Brest", "07:00"));

        let return_window = QueryWindow {
            date: date(1),
            min_hour: 12,
            max_hour: 24,
        };
        let outcome = run_search(
            &query(Mode::RoundTrip, Some(return_window)),
            &timetable,
            &sample_coordinates(),
        )
        .unwrap();

        assert!(outcome
            .destinations
            .iter()
            .all(|point| !point.label.starts_with("Brest")));
        assert_eq!(outcome.destinations.len(), 2);
    }

    #[test]
    fn test_missing_coordinates_do_not_block_the_map() {
        let mut coordinates = sample_coordinates();
        coordinates.remove("Lyon");

        let outcome = run_search(
            &query(Mode::OneWay, None),
            &sample_timetable(),
            &coordinates,
        )
        .unwrap();

        assert_eq!(outcome.unresolved, vec!["Lyon"]);
        let lyon = &outcome.destinations[0];
        assert_eq!((lyon.lat, lyon.lon), (0.0, 0.0));
        let marseille = &outcome.destinations[1];
        assert_eq!(marseille.lat, 43.296482);
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let mut query = query(Mode::OneWay, None);
        query.outbound.date = date(2);

        let outcome = run_search(&query, &sample_timetable(), &sample_coordinates()).unwrap();

        assert!(outcome.is_empty());
        assert!(outcome.unresolved.is_empty());
    }

    #[test]
    fn test_search_is_deterministic() {
        let query = query(Mode::OneWay, None);
        let timetable = sample_timetable();
        let coordinates = sample_coordinates();

        let first = run_search(&query, &timetable, &coordinates).unwrap();
        let second = run_search(&query, &timetable, &coordinates).unwrap();

        assert_eq!(first, second);
    }
}
