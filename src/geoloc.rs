use log::error;
use phf::phf_map;
use std::collections::{HashMap, HashSet};

use crate::search::SortedJourneys;
use crate::timetable::TimetableRow;

/// City name to (latitude, longitude), geocoded out-of-band.
pub type CoordinateTable = HashMap<String, (f64, f64)>;

/// Station names whose geocoded entry lives under a different name. The
/// list is not known to be exhaustive; a station missing from both the raw
/// name and this table simply ends up unresolved.
static EXPLICIT_NAMES: phf::Map<&'static str, &'static str> = phf_map! {
    "PARIS (intramuros)" => "PARIS",
    "CORBIERES VIERZON VILLE" => "VIERZON",
    "VALENCE TGV RHONE ALPES SUD" => "VALENCE FRANCE ALPES",
    "MONTELIMAR GARE SNCF" => "MONTELIMAR",
    "CORBIERES LES AUBRAIS ORLEANS" => "ORLEANS",
    "LYON (gares intramuros)" => "LYON",
    "AEROPORT CDG2 TGV ROISSY" => "ROISSY AEROPORT",
    "ST DENIS PRES MARTEL" => "MARTEL",
    "DIE" => "GARE DIE",
    "JUVISY TGV" => "GARE JUVISY",
    "ORANGE" => "ORANGE FRANCE",
    "SABLE" => "SABLE SUR SARTHE",
};

/// Name under which a station is geocoded. Only for coordinate lookups,
/// row matching always uses the raw destination string.
pub fn explicit_name(city: &str) -> &str {
    EXPLICIT_NAMES.get(city).copied().unwrap_or(city)
}

/// Distinct destination names in first-seen order, then resorted on their
/// first character only. The coordinate cache is populated in this order,
/// so the resort has to stay stable.
pub fn distinct_destinations(timetable: &[TimetableRow]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut destinations: Vec<String> = Vec::new();
    for row in timetable.iter() {
        if seen.insert(row.destination.as_str()) {
            destinations.push(row.destination.clone());
        }
    }
    destinations.sort_by_key(|city| city.chars().next());
    destinations
}

/// Attaches coordinates to every row of a sorted selection. A city missing
/// from the table keeps the (0, 0) sentinel and is reported once; return
/// legs point back at the origin and are placed through their outbound
/// counterpart, so they are not looked up.
pub fn attach_coordinates(
    selection: SortedJourneys,
    coordinates: &CoordinateTable,
    origin_city: &str,
) -> (SortedJourneys, Vec<String>) {
    let mut unresolved: Vec<String> = Vec::new();

    let joined = selection.map_rows(|row| {
        if row.destination == origin_city {
            return;
        }
        match coordinates.get(explicit_name(&row.destination)) {
            Some(&(lat, lon)) => {
                row.lat = lat;
                row.lon = lon;
            }
            None => {
                if !unresolved.contains(&row.destination) {
                    error!("{} geolocalisation not found", row.destination);
                    unresolved.push(row.destination.clone());
                }
            }
        }
    });

    (joined, unresolved)
}
