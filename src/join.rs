//! Joins the supporting tables onto orders.
//!
//! Two kinds of join happen here:
//!
//! - **Order-level**: performance, routes and costs are left-joined on
//!   `order_id`, in that order. A table that is empty or has no `order_id`
//!   column is skipped. The key is rewritten as a string on both sides first
//!   so `5` and `"5"` land on the same row.
//! - **Emission factors**: the fleet's CO2 column is left-joined onto orders by
//!   upper-cased `vehicle_type`, using one row per vehicle type so the order
//!   count does not change.

use anyhow::Result;
use log::{debug, info, warn};

use crate::{data::Value, frame::Frame, heal::VEHICLE_TYPE_COLUMN};

pub const ORDER_ID_COLUMN: &str = "order_id";
pub const EMISSION_CANDIDATES: [&str; 2] = ["co2", "carbon"];
pub const DISTANCE_CANDIDATES: [&str; 1] = ["distance"];

/// Where the two carbon inputs ended up on the joined order table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissionColumns {
    pub distance: String,
    pub emission: String,
}

/// Rewrites every non-null key cell as its display string.
pub fn stringify_key(frame: &mut Frame, key: &str) -> bool {
    frame.map_column(key, |value| Value::String(value.as_display()))
}

/// Upper-cases `vehicle_type` on both tables so the emission join compares
/// like with like.
pub fn normalize_vehicle_types(orders: &mut Frame, fleet: &mut Frame) {
    for frame in [orders, fleet] {
        frame.map_column(VEHICLE_TYPE_COLUMN, |value| {
            Value::String(value.as_display().to_uppercase())
        });
    }
}

/// Left-joins each `(label, table)` onto `orders` by `order_id`.
pub fn join_order_tables(mut orders: Frame, tables: &[(&str, &Frame)]) -> Result<Frame> {
    if !orders.has_column(ORDER_ID_COLUMN) {
        warn!(
            "Orders have no '{}' column; performance, routes and costs are not joined",
            ORDER_ID_COLUMN
        );
        return Ok(orders);
    }
    stringify_key(&mut orders, ORDER_ID_COLUMN);

    for (label, table) in tables {
        if table.is_empty() || !table.has_column(ORDER_ID_COLUMN) {
            info!("Skipping {label} join: table is empty or has no '{ORDER_ID_COLUMN}'");
            continue;
        }
        let mut right = (*table).clone();
        stringify_key(&mut right, ORDER_ID_COLUMN);
        orders = orders.left_join(&right, ORDER_ID_COLUMN)?;
        debug!(
            "Joined {label}: orders now {} row(s) x {} column(s)",
            orders.height(),
            orders.width()
        );
    }
    Ok(orders)
}

/// Brings the fleet's emission factor onto each order when both a distance
/// column (on orders) and an emission column (on the fleet) exist.
pub fn attach_emission_factors(
    orders: Frame,
    fleet: &Frame,
) -> Result<(Frame, Option<EmissionColumns>)> {
    let emission = fleet.find_column_or_warn(&EMISSION_CANDIDATES, "Carbon_Impact will be 0.0");
    let distance = orders.find_column_or_warn(&DISTANCE_CANDIDATES, "Carbon_Impact will be 0.0");
    let (Some(emission), Some(distance)) = (emission, distance) else {
        return Ok((orders, None));
    };
    if !fleet.has_column(VEHICLE_TYPE_COLUMN) || !orders.has_column(VEHICLE_TYPE_COLUMN) {
        warn!(
            "Cannot match emission factors without '{}' on both orders and fleet; Carbon_Impact will be 0.0",
            VEHICLE_TYPE_COLUMN
        );
        return Ok((orders, None));
    }

    let lookup = fleet
        .select(&[VEHICLE_TYPE_COLUMN, emission.as_str()])
        .distinct_by(VEHICLE_TYPE_COLUMN);
    if lookup.height() < fleet.height() {
        debug!(
            "Using the first of {} fleet row(s) per vehicle type ({} type(s))",
            fleet.height(),
            lookup.height()
        );
    }

    let collides = orders.has_column(&emission);
    let joined = orders.left_join(&lookup, VEHICLE_TYPE_COLUMN)?;
    let columns = if collides {
        EmissionColumns {
            distance: if distance == emission {
                format!("{distance}_x")
            } else {
                distance
            },
            emission: format!("{emission}_y"),
        }
    } else {
        EmissionColumns { distance, emission }
    };
    info!(
        "Matched emission factor '{}' against distance '{}'",
        columns.emission, columns.distance
    );
    Ok((joined, Some(columns)))
}
