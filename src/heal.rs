//! Deterministic synthesis of columns the inputs are missing.
//!
//! Each synthesized column draws from its own `StdRng` seeded with a fixed
//! constant, so the values depend only on the row count (and, for vehicle
//! types, the candidate list) and never on anything else the process did
//! first. Columns that already exist are never touched.

use anyhow::Result;
use itertools::Itertools;
use log::info;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{data::Value, frame::Frame, geo};

pub const VEHICLE_TYPE_COLUMN: &str = "vehicle_type";
pub const UTILIZATION_COLUMN: &str = "utilization";
pub const STATUS_COLUMN: &str = "status";
pub const LOCATION_COLUMN: &str = "current_location";

pub const VEHICLE_TYPE_SEED: u64 = 42;
pub const UTILIZATION_SEED: u64 = 42;
pub const STATUS_SEED: u64 = 42;
pub const LOCATION_SEED: u64 = 101;

/// Utilization percentages are drawn from `[40, 98)`.
pub const UTILIZATION_RANGE: std::ops::Range<i64> = 40..98;

pub const FALLBACK_VEHICLE_TYPES: [&str; 5] = [
    "REFRIGERATED",
    "LARGE_TRUCK",
    "SMALL_VAN",
    "MEDIUM_TRUCK",
    "EXPRESS_BIKE",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleStatus {
    InTransit,
    Available,
    Maintenance,
    Charging,
}

impl VehicleStatus {
    pub const ALL: [VehicleStatus; 4] = [
        VehicleStatus::InTransit,
        VehicleStatus::Available,
        VehicleStatus::Maintenance,
        VehicleStatus::Charging,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VehicleStatus::InTransit => "In_Transit",
            VehicleStatus::Available => "Available",
            VehicleStatus::Maintenance => "Maintenance",
            VehicleStatus::Charging => "Charging",
        }
    }
}

/// Which columns a healing pass synthesized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealReport {
    pub columns: Vec<&'static str>,
}

impl HealReport {
    pub fn healed(&self, column: &str) -> bool {
        self.columns.iter().any(|c| *c == column)
    }
}

/// One independent uniform pick from `options` per row.
pub fn choose_sequence<T: Clone>(options: &[T], count: usize, seed: u64) -> Vec<T> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .filter_map(|_| options.choose(&mut rng).cloned())
        .collect()
}

pub fn utilization_sequence(count: usize, seed: u64) -> Vec<i64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| rng.gen_range(UTILIZATION_RANGE))
        .collect()
}

/// Distinct vehicle types in first-seen order, falling back to the built-in
/// list when the fleet has none.
pub fn candidate_vehicle_types(fleet: &Frame) -> Vec<String> {
    let from_fleet = fleet
        .column(VEHICLE_TYPE_COLUMN)
        .map(|column| {
            column
                .values
                .iter()
                .flatten()
                .map(Value::as_display)
                .unique()
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    if from_fleet.is_empty() {
        FALLBACK_VEHICLE_TYPES.iter().map(|s| s.to_string()).collect()
    } else {
        from_fleet
    }
}

/// Gives every order a vehicle type when the orders table has none.
pub fn heal_orders(orders: &mut Frame, fleet: &Frame) -> Result<HealReport> {
    let mut report = HealReport::default();
    if orders.is_empty() || orders.has_column(VEHICLE_TYPE_COLUMN) {
        return Ok(report);
    }
    let candidates = candidate_vehicle_types(fleet);
    let assigned = choose_sequence(&candidates, orders.height(), VEHICLE_TYPE_SEED);
    orders.set_column(
        VEHICLE_TYPE_COLUMN,
        assigned.into_iter().map(|t| Some(Value::String(t))).collect(),
    )?;
    info!(
        "Synthesized '{}' for {} order(s) from {} candidate type(s)",
        VEHICLE_TYPE_COLUMN,
        orders.height(),
        candidates.len()
    );
    report.columns.push(VEHICLE_TYPE_COLUMN);
    Ok(report)
}

/// Fills in utilization, live status and current location for a fleet that
/// lacks them.
pub fn heal_fleet(fleet: &mut Frame) -> Result<HealReport> {
    let mut report = HealReport::default();
    if fleet.is_empty() {
        return Ok(report);
    }
    let count = fleet.height();

    if !fleet.has_column(UTILIZATION_COLUMN) {
        let values = utilization_sequence(count, UTILIZATION_SEED)
            .into_iter()
            .map(|v| Some(Value::Integer(v)))
            .collect();
        fleet.set_column(UTILIZATION_COLUMN, values)?;
        report.columns.push(UTILIZATION_COLUMN);
    }

    if !fleet.has_column(STATUS_COLUMN) {
        let values = choose_sequence(&VehicleStatus::ALL, count, STATUS_SEED)
            .into_iter()
            .map(|status| Some(Value::from(status.as_str())))
            .collect();
        fleet.set_column(STATUS_COLUMN, values)?;
        report.columns.push(STATUS_COLUMN);
    }

    if !fleet.has_column(LOCATION_COLUMN) {
        let values = choose_sequence(&geo::CITY_NAMES, count, LOCATION_SEED)
            .into_iter()
            .map(|city| Some(Value::from(city)))
            .collect();
        fleet.set_column(LOCATION_COLUMN, values)?;
        report.columns.push(LOCATION_COLUMN);
    }

    if !report.columns.is_empty() {
        info!(
            "Synthesized fleet column(s) {:?} for {} vehicle(s)",
            report.columns, count
        );
    }
    Ok(report)
}
