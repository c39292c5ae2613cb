//! Runs the stages in order: load, normalize, heal, join, derive, geocode,
//! rank.
//!
//! [`derive`] is the pure half and takes already-loaded tables; [`run`] adds
//! loading from disk. Neither keeps state between calls, so repeated calls on
//! unchanged inputs return identical output.

use anyhow::Result;
use log::info;

use crate::{
    config::PipelineConfig,
    frame::Frame,
    geo, heal, join,
    loader::{self, Tables},
    metrics, ranking,
};

/// Display names given to key order columns in the enriched table.
pub const ORDER_ID_OUTPUT: &str = "Order_ID";
pub const ORIGIN_OUTPUT: &str = "Origin";
pub const PRIORITY_OUTPUT: &str = "Priority";
pub const ORDER_VALUE_OUTPUT: &str = "Order_Value_INR";

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub orders: Frame,
    pub fleet: Frame,
    pub inventory: Frame,
}

pub fn run(config: &PipelineConfig) -> Result<PipelineOutput> {
    let tables = loader::load_tables(config)?;
    derive(tables, config.risk_threshold)
}

pub fn derive(tables: Tables, risk_threshold: f64) -> Result<PipelineOutput> {
    let Tables {
        mut orders,
        performance,
        mut fleet,
        routes,
        inventory,
        costs,
    } = tables;

    heal::heal_orders(&mut orders, &fleet)?;
    join::normalize_vehicle_types(&mut orders, &mut fleet);

    let orders = join::join_order_tables(
        orders,
        &[
            ("performance", &performance),
            ("routes", &routes),
            ("costs", &costs),
        ],
    )?;
    let (mut orders, emission) = join::attach_emission_factors(orders, &fleet)?;

    metrics::derive_metrics(&mut orders, emission.as_ref(), risk_threshold)?;
    let origin = geo::attach_coordinates(&mut orders)?;
    rename_for_display(&mut orders, origin.as_deref());

    heal::heal_fleet(&mut fleet)?;
    let fleet = ranking::rank_fleet(&fleet)?;

    info!(
        "Pipeline complete: {} enriched order(s), {} ranked vehicle(s), {} inventory row(s)",
        orders.height(),
        fleet.height(),
        inventory.height()
    );
    Ok(PipelineOutput {
        orders,
        fleet,
        inventory,
    })
}

fn rename_for_display(orders: &mut Frame, origin: Option<&str>) {
    orders.rename(join::ORDER_ID_COLUMN, ORDER_ID_OUTPUT);
    if let Some(origin) = origin {
        orders.rename(origin, ORIGIN_OUTPUT);
    }
    orders.rename("priority", PRIORITY_OUTPUT);
    orders.rename(metrics::ORDER_VALUE_COLUMN, ORDER_VALUE_OUTPUT);
}
