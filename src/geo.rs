//! Static origin-city geocoding.

use anyhow::Result;
use log::debug;
use serde::Serialize;

use crate::{data::Value, frame::Frame};

pub const LAT_COLUMN: &str = "lat";
pub const LON_COLUMN: &str = "lon";
pub const ORIGIN_CANDIDATES: [&str; 1] = ["origin"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Geographic centre of India; used for any city not in the table.
pub const DEFAULT_COORDINATE: Coordinate = Coordinate {
    lat: 20.5937,
    lon: 78.9629,
};

const CITY_COORDINATES: [(&str, Coordinate); 8] = [
    ("Mumbai", Coordinate { lat: 19.0760, lon: 72.8777 }),
    ("Delhi", Coordinate { lat: 28.6139, lon: 77.2090 }),
    ("Bangalore", Coordinate { lat: 12.9716, lon: 77.5946 }),
    ("Chennai", Coordinate { lat: 13.0827, lon: 80.2707 }),
    ("Kolkata", Coordinate { lat: 22.5726, lon: 88.3639 }),
    ("Hyderabad", Coordinate { lat: 17.3850, lon: 78.4867 }),
    ("Pune", Coordinate { lat: 18.5204, lon: 73.8567 }),
    ("Ahmedabad", Coordinate { lat: 23.0225, lon: 72.5714 }),
];

pub const CITY_NAMES: [&str; 8] = [
    "Mumbai",
    "Delhi",
    "Bangalore",
    "Chennai",
    "Kolkata",
    "Hyderabad",
    "Pune",
    "Ahmedabad",
];

/// Exact, case-sensitive lookup.
pub fn geocode(city: &str) -> Coordinate {
    CITY_COORDINATES
        .iter()
        .find(|(name, _)| *name == city)
        .map(|(_, coordinate)| *coordinate)
        .unwrap_or(DEFAULT_COORDINATE)
}

/// Adds `lat`/`lon` for each order's origin and returns the origin column that
/// was used, if any. Every row gets a coordinate.
pub fn attach_coordinates(orders: &mut Frame) -> Result<Option<String>> {
    let origin = orders.find_column_or_warn(
        &ORIGIN_CANDIDATES,
        "every order gets the default coordinate",
    );
    let coordinates = (0..orders.height())
        .map(|row| {
            origin
                .as_deref()
                .and_then(|column| orders.value(column, row))
                .map(|value| geocode(&value.as_display()))
                .unwrap_or(DEFAULT_COORDINATE)
        })
        .collect::<Vec<_>>();

    let unmatched = coordinates
        .iter()
        .filter(|c| **c == DEFAULT_COORDINATE)
        .count();
    debug!(
        "Geocoded {} order(s), {} on the default coordinate",
        coordinates.len(),
        unmatched
    );

    orders.set_column(
        LAT_COLUMN,
        coordinates.iter().map(|c| Some(Value::Float(c.lat))).collect(),
    )?;
    orders.set_column(
        LON_COLUMN,
        coordinates.iter().map(|c| Some(Value::Float(c.lon))).collect(),
    )?;
    Ok(origin)
}
