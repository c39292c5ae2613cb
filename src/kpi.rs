//! Operational summary over the enriched order table.
//!
//! Headline figures for one origin region and a set of priorities: revenue
//! sitting on high-risk orders, total carbon, the share of low-risk orders,
//! and the first few high-risk orders that need intervention. Column lookups
//! use the same candidate matching as the pipeline so the summary works on
//! whatever the inputs called things.

use serde::Serialize;

use crate::{
    data::{Value, coerce_numeric},
    frame::Frame,
    geo::ORIGIN_CANDIDATES,
    metrics::{CARBON_IMPACT_COLUMN, CLV_SCORE_COLUMN, RISK_LEVEL_COLUMN, RiskLevel},
};

pub const INTERVENTION_LIMIT: usize = 5;
const VALUE_CANDIDATES: [&str; 2] = ["order_value", "value_inr"];
const PRIORITY_CANDIDATES: [&str; 1] = ["priority"];
const DESTINATION_CANDIDATES: [&str; 1] = ["destination"];
const ORDER_ID_CANDIDATES: [&str; 1] = ["order_id"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KpiFilter {
    pub region: Option<String>,
    /// Empty means every priority.
    pub priorities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Intervention {
    pub order_id: String,
    pub destination: String,
    pub clv_score: f64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryLevel {
    pub category: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub region: Option<String>,
    pub orders: usize,
    pub revenue_at_risk: f64,
    pub carbon_footprint: f64,
    pub service_recovery: f64,
    pub interventions: Vec<Intervention>,
    pub inventory_levels: Vec<InventoryLevel>,
}

fn cell_text(frame: &Frame, column: Option<&str>, row: usize) -> String {
    column
        .and_then(|name| frame.value(name, row))
        .map(Value::as_display)
        .unwrap_or_default()
}

/// Rows of `orders` selected by `filter`, in table order.
pub fn select_rows(orders: &Frame, filter: &KpiFilter) -> Vec<usize> {
    let origin = orders.find_column(&ORIGIN_CANDIDATES);
    let priority = orders.find_column(&PRIORITY_CANDIDATES);
    (0..orders.height())
        .filter(|&row| {
            filter
                .region
                .as_deref()
                .is_none_or(|region| cell_text(orders, origin, row) == region)
        })
        .filter(|&row| {
            filter.priorities.is_empty()
                || filter
                    .priorities
                    .contains(&cell_text(orders, priority, row))
        })
        .collect()
}

fn is_high_risk(orders: &Frame, row: usize) -> bool {
    orders
        .value(RISK_LEVEL_COLUMN, row)
        .and_then(Value::as_str)
        .is_some_and(|level| level == RiskLevel::High.as_str())
}

pub fn summarize(orders: &Frame, inventory: &Frame, filter: &KpiFilter) -> KpiSummary {
    let rows = select_rows(orders, filter);
    let value_column = orders.find_column(&VALUE_CANDIDATES);
    let destination = orders.find_column(&DESTINATION_CANDIDATES);
    let order_id = orders.find_column(&ORDER_ID_CANDIDATES);

    let high_rows = rows
        .iter()
        .copied()
        .filter(|&row| is_high_risk(orders, row))
        .collect::<Vec<_>>();

    let revenue_at_risk = high_rows
        .iter()
        .map(|&row| coerce_numeric(value_column.and_then(|c| orders.value(c, row)), 0.0))
        .sum();
    let carbon_footprint = rows
        .iter()
        .map(|&row| coerce_numeric(orders.value(CARBON_IMPACT_COLUMN, row), 0.0))
        .sum();
    let service_recovery = if rows.is_empty() {
        100.0
    } else {
        (rows.len() - high_rows.len()) as f64 / rows.len() as f64 * 100.0
    };
    let interventions = high_rows
        .iter()
        .take(INTERVENTION_LIMIT)
        .map(|&row| Intervention {
            order_id: cell_text(orders, order_id, row),
            destination: cell_text(orders, destination, row),
            clv_score: coerce_numeric(orders.value(CLV_SCORE_COLUMN, row), 0.0),
            risk_level: RiskLevel::High,
        })
        .collect();

    KpiSummary {
        region: filter.region.clone(),
        orders: rows.len(),
        revenue_at_risk,
        carbon_footprint,
        service_recovery,
        interventions,
        inventory_levels: inventory_levels(inventory),
    }
}

/// `(category, quantity)` from the inventory's first two columns. A single
/// column serves as both axes.
pub fn inventory_levels(inventory: &Frame) -> Vec<InventoryLevel> {
    let columns = inventory.columns();
    let Some(category) = columns.first() else {
        return Vec::new();
    };
    let quantity = columns.get(1).unwrap_or(category);
    (0..inventory.height())
        .map(|row| InventoryLevel {
            category: category.get(row).map(Value::as_display).unwrap_or_default(),
            quantity: coerce_numeric(quantity.get(row), 0.0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Column;

    fn enriched() -> Frame {
        let text = |values: &[&str]| values.iter().map(|v| Some(Value::from(*v))).collect();
        let floats = |values: &[f64]| values.iter().map(|v| Some(Value::Float(*v))).collect();
        Frame::from_columns(vec![
            Column::new("Order_ID", text(&["A1", "A2", "A3", "A4"])),
            Column::new("Origin", text(&["Pune", "Pune", "Delhi", "Pune"])),
            Column::new("Priority", text(&["Express", "Standard", "Express", "Express"])),
            Column::new("destination", text(&["Goa", "Nashik", "Agra", "Surat"])),
            Column::new("Order_Value_INR", floats(&[1000.0, 200.0, 300.0, 50.0])),
            Column::new(CARBON_IMPACT_COLUMN, floats(&[1.5, 2.5, 3.0, 0.0])),
            Column::new(CLV_SCORE_COLUMN, floats(&[90.0, 40.0, 60.0, 20.0])),
            Column::new(RISK_LEVEL_COLUMN, text(&["High", "Low", "High", "Low"])),
        ])
        .unwrap()
    }

    #[test]
    fn summary_filters_by_region_and_priority() {
        let filter = KpiFilter {
            region: Some("Pune".to_string()),
            priorities: vec!["Express".to_string()],
        };
        let summary = summarize(&enriched(), &Frame::empty(), &filter);
        assert_eq!(summary.orders, 2);
        assert_eq!(summary.revenue_at_risk, 1000.0);
        assert_eq!(summary.carbon_footprint, 1.5);
        assert_eq!(summary.service_recovery, 50.0);
        assert_eq!(summary.interventions.len(), 1);
        assert_eq!(summary.interventions[0].order_id, "A1");
        assert_eq!(summary.interventions[0].destination, "Goa");
    }

    #[test]
    fn empty_selection_reports_full_recovery() {
        let filter = KpiFilter {
            region: Some("Chennai".to_string()),
            priorities: Vec::new(),
        };
        let summary = summarize(&enriched(), &Frame::empty(), &filter);
        assert_eq!(summary.orders, 0);
        assert_eq!(summary.service_recovery, 100.0);
        assert!(summary.interventions.is_empty());
        assert!(summary.inventory_levels.is_empty());
    }

    #[test]
    fn inventory_levels_use_first_two_columns() {
        let inventory = Frame::from_records(
            vec!["category".into(), "stock_units".into(), "warehouse".into()],
            vec![
                vec!["Electronics".into(), "120".into(), "Mumbai".into()],
                vec!["Apparel".into(), "lots".into(), "Delhi".into()],
            ],
        )
        .unwrap();
        let levels = inventory_levels(&inventory);
        assert_eq!(levels[0].category, "Electronics");
        assert_eq!(levels[0].quantity, 120.0);
        assert_eq!(levels[1].quantity, 0.0);
        assert!(inventory_levels(&Frame::empty()).is_empty());
    }
}
