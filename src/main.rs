extern crate structopt;

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{debug, error, info};
use prettytable::{cell, format, row, Table};
use stderrlog;
use structopt::{clap, StructOpt};

use tgvmaxmapper::geoloc::CoordinateTable;
use tgvmaxmapper::map::{Category, MapPoint};
use tgvmaxmapper::search::{Mode, QueryWindow, SearchQuery};
use tgvmaxmapper::timetable::{self, TimetableRow};
use tgvmaxmapper::{date, run_search};

#[derive(StructOpt, Debug)]
#[structopt(name = "tgvmaxmapper")]
struct Opt {
    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[structopt(short, long, parse(from_occurrences))]
    verbose: usize,

    /// TGVmax timetable JSON file, as materialized by the download step
    #[structopt(short, long, value_name = "FILE")]
    timetable: PathBuf,

    /// City coordinates JSON file, as produced by the geocoding step
    #[structopt(short, long, value_name = "FILE")]
    coordinates: PathBuf,

    /// Departure city, as written in the timetable
    origin: String,

    /// Outbound travel date
    #[structopt(short, long, value_name = "YYYY-MM-DD", parse(try_from_str = date::parse_date_from_str), default_value = date::NOW)]
    date: NaiveDate,

    /// Earliest outbound departure hour (inclusive)
    #[structopt(long, default_value = "3")]
    min_hour: u32,

    /// Latest outbound departure hour (exclusive)
    #[structopt(long, default_value = "24")]
    max_hour: u32,

    /// Only keep journeys usable as round trips
    #[structopt(short, long)]
    round_trip: bool,

    /// Return travel date, defaults to the outbound date (round trips only)
    #[structopt(long, value_name = "YYYY-MM-DD", parse(try_from_str = date::parse_date_from_str))]
    return_date: Option<NaiveDate>,

    /// Earliest return departure hour (inclusive)
    #[structopt(long, default_value = "3")]
    return_min_hour: u32,

    /// Latest return departure hour (exclusive)
    #[structopt(long, default_value = "24")]
    return_max_hour: u32,
}

fn main() {
    let opt = Opt::from_args();
    setup_logging(opt.verbose);

    debug!("Parsed opts: {:#?}", opt);

    let timetable = match load_timetable(&opt.timetable) {
        Ok(res) => res,
        Err(err) => clap::Error::value_validation_auto(err).exit(),
    };
    let coordinates = match load_coordinates(&opt.coordinates) {
        Ok(res) => res,
        Err(err) => clap::Error::value_validation_auto(err).exit(),
    };

    let query = SearchQuery {
        mode: if opt.round_trip {
            Mode::RoundTrip
        } else {
            Mode::OneWay
        },
        origin_city: opt.origin.clone(),
        outbound: QueryWindow {
            date: opt.date,
            min_hour: opt.min_hour,
            max_hour: opt.max_hour,
        },
        return_window: if opt.round_trip {
            Some(QueryWindow {
                date: opt.return_date.unwrap_or(opt.date),
                min_hour: opt.return_min_hour,
                max_hour: opt.return_max_hour,
            })
        } else {
            None
        },
    };

    let outcome = match run_search(&query, &timetable, &coordinates) {
        Ok(res) => res,
        Err(err) => {
            error!("{}", err);
            std::process::exit(1);
        }
    };

    if outcome.is_empty() {
        println!("There was no journey matching supplied criteria :(")
    } else {
        info!(
            "Found {} destinations reachable from {}.",
            outcome.destinations.len(),
            opt.origin
        );
        format_results(&outcome.origin, &outcome.destinations).printstd();
    }
}

fn load_timetable(path: &Path) -> Result<Vec<TimetableRow>, String> {
    let file =
        File::open(path).map_err(|err| format!("cannot open {}: {}", path.display(), err))?;
    timetable::from_json(file).map_err(|err| err.to_string())
}

fn load_coordinates(path: &Path) -> Result<CoordinateTable, String> {
    let file =
        File::open(path).map_err(|err| format!("cannot open {}: {}", path.display(), err))?;
    serde_json::from_reader(file)
        .map_err(|err| format!("invalid coordinates JSON in {}: {}", path.display(), err))
}

fn format_results(origin: &MapPoint, destinations: &[MapPoint]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(row!["Marker", "Travel", "Latitude", "Longitude"]);

    for point in std::iter::once(origin).chain(destinations.iter()) {
        let marker = match point.category {
            Category::Origin => "origin",
            Category::Destination => "destination",
        };
        table.add_row(row![marker, point.label, point.lat, point.lon]);
    }
    table
}

fn setup_logging(level: usize) {
    stderrlog::new()
        .module(module_path!())
        .verbosity(level)
        .timestamp(stderrlog::Timestamp::Off)
        .init()
        .unwrap();
}
