use chrono::NaiveDate;
use log::debug;

use crate::date;
use crate::search::{Journey, SortedJourneys};

static TIME_CONNECTOR: &str = " ou ";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Category {
    Origin,
    Destination,
}

/// One marker for the rendering collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    pub lat: f64,
    pub lon: f64,
    pub label: String,
    pub category: Category,
}

/// Accumulates one destination city's rows until the city changes.
///
/// Rows whose raw destination equals the query origin are return legs; all
/// others are outbound legs. Each side keeps its date and a growing list of
/// distinct departure times, with consecutive duplicates folded away.
#[derive(Debug)]
struct Cluster {
    city: String,
    lat: f64,
    lon: f64,
    outbound_date: Option<NaiveDate>,
    outbound_times: String,
    last_outbound_time: String,
    return_date: Option<NaiveDate>,
    return_times: String,
    last_return_time: String,
}

impl Cluster {
    fn open(row: &Journey, origin_city: &str) -> Cluster {
        let mut cluster = Cluster {
            city: row.common_destination.clone(),
            lat: 0.0,
            lon: 0.0,
            outbound_date: None,
            outbound_times: String::new(),
            last_outbound_time: String::new(),
            return_date: None,
            return_times: String::new(),
            last_return_time: String::new(),
        };
        cluster.absorb(row, origin_city);
        cluster
    }

    fn absorb(&mut self, row: &Journey, origin_city: &str) {
        if row.destination == origin_city {
            if self.return_times.is_empty() {
                self.return_date = Some(row.date);
                self.return_times = row.departure_time.clone();
            } else if row.departure_time == self.last_return_time {
                return;
            } else {
                self.return_times.push_str(TIME_CONNECTOR);
                self.return_times.push_str(&row.departure_time);
            }
            self.last_return_time = row.departure_time.clone();
        } else {
            if self.outbound_times.is_empty() {
                self.lat = row.lat;
                self.lon = row.lon;
                self.outbound_date = Some(row.date);
                self.outbound_times = row.departure_time.clone();
            } else if row.departure_time == self.last_outbound_time {
                return;
            } else {
                self.outbound_times.push_str(TIME_CONNECTOR);
                self.outbound_times.push_str(&row.departure_time);
            }
            self.last_outbound_time = row.departure_time.clone();
        }
    }

    fn travel_infos(&self) -> String {
        match (self.outbound_date, self.return_date) {
            (Some(out), Some(ret)) => format!(
                "{} -- Aller le {} à {} -- Retour le {} à {}",
                self.city,
                date::format_date(out),
                self.outbound_times,
                date::format_date(ret),
                self.return_times
            ),
            (Some(out), None) => format!(
                "{} -- Aller le {} à {}",
                self.city,
                date::format_date(out),
                self.outbound_times
            ),
            (None, Some(ret)) => format!(
                "{} -- Retour le {} à {}",
                self.city,
                date::format_date(ret),
                self.return_times
            ),
            (None, None) => self.city.clone(),
        }
    }

    fn into_point(self) -> MapPoint {
        MapPoint {
            lat: self.lat,
            lon: self.lon,
            label: self.travel_infos(),
            category: Category::Destination,
        }
    }
}

/// Walks a sorted, geo-joined selection once and emits exactly one point
/// per surviving destination city, however many rows reference it. A round
/// trip surfaces as a single marker carrying both legs.
pub fn build_map_points(selection: &SortedJourneys, origin_city: &str) -> Vec<MapPoint> {
    let mut points = Vec::new();
    let mut current: Option<Cluster> = None;

    for row in selection.rows().iter() {
        match current.as_mut() {
            Some(cluster) if cluster.city == row.common_destination => {
                cluster.absorb(row, origin_city);
                continue;
            }
            _ => {}
        }
        if let Some(done) = current.take() {
            points.push(done.into_point());
        }
        current = Some(Cluster::open(row, origin_city));
    }
    if let Some(done) = current.take() {
        points.push(done.into_point());
    }

    debug!("Built {} destination markers", points.len());
    points
}
