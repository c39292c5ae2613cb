//! Per-order derived metrics.
//!
//! Every metric has a defined fallback, so the enriched table always carries
//! `Carbon_Impact`, `CLV_Score`, `Risk_Level` and `map_weight` for every row,
//! whatever the inputs were missing.

use std::fmt;

use anyhow::Result;
use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    data::{Value, coerce_numeric},
    frame::Frame,
    join::EmissionColumns,
};

pub const CARBON_IMPACT_COLUMN: &str = "Carbon_Impact";
pub const CLV_SCORE_COLUMN: &str = "CLV_Score";
pub const RISK_LEVEL_COLUMN: &str = "Risk_Level";
pub const MAP_WEIGHT_COLUMN: &str = "map_weight";

pub const ORDER_VALUE_COLUMN: &str = "order_value_inr";
pub const RATING_COLUMN: &str = "customer_rating";
pub const RISK_CANDIDATES: [&str; 2] = ["traffic", "delay"];

pub const DEFAULT_RATING: f64 = 3.0;
pub const DEFAULT_CLV_SCORE: f64 = 50.0;
const VALUE_WEIGHT: f64 = 70.0;
const RATING_WEIGHT: f64 = 30.0;
const RATING_SCALE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    High,
    Low,
}

impl RiskLevel {
    /// `High` only when `value` is strictly above `threshold`.
    pub fn classify(value: f64, threshold: f64) -> Self {
        if value > threshold {
            RiskLevel::High
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::High => "High",
            RiskLevel::Low => "Low",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distance × emission factor, both coerced with invalid → 0. Without both
/// columns every order gets 0.0.
pub fn carbon_impact(orders: &Frame, columns: Option<&EmissionColumns>) -> Vec<f64> {
    let Some(columns) = columns else {
        return vec![0.0; orders.height()];
    };
    (0..orders.height())
        .map(|row| {
            let distance = coerce_numeric(orders.value(&columns.distance, row), 0.0);
            let factor = coerce_numeric(orders.value(&columns.emission, row), 0.0);
            distance * factor
        })
        .collect()
}

/// `(value / max_value) * 70 + (rating / 5) * 30`.
///
/// Value coerces invalid → 0, rating coerces invalid → 3.0 (and is 3.0 for
/// every row without a rating column). A non-positive maximum is treated as 1.
/// Without a value column every row scores 50.0.
pub fn clv_scores(orders: &Frame) -> Vec<f64> {
    let Some(value_column) = orders.column(ORDER_VALUE_COLUMN) else {
        warn!(
            "No '{}' column; CLV_Score defaults to {}",
            ORDER_VALUE_COLUMN, DEFAULT_CLV_SCORE
        );
        return vec![DEFAULT_CLV_SCORE; orders.height()];
    };
    let values = value_column
        .values
        .iter()
        .map(|cell| coerce_numeric(cell.as_ref(), 0.0))
        .collect::<Vec<_>>();
    let max_value = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let max_value = if max_value > 0.0 { max_value } else { 1.0 };

    let ratings = orders.column(RATING_COLUMN);
    if ratings.is_none() {
        debug!("No '{RATING_COLUMN}' column; using a rating of {DEFAULT_RATING} for every order");
    }
    values
        .iter()
        .enumerate()
        .map(|(row, value)| {
            let rating = ratings
                .map(|column| coerce_numeric(column.get(row), DEFAULT_RATING))
                .unwrap_or(DEFAULT_RATING);
            (value / max_value) * VALUE_WEIGHT + (rating / RATING_SCALE) * RATING_WEIGHT
        })
        .collect()
}

/// Classifies each order against the first traffic/delay column; `Low` for
/// everything when there is none.
pub fn risk_levels(orders: &Frame, threshold: f64) -> Vec<RiskLevel> {
    let Some(column) = orders.find_column_or_warn(&RISK_CANDIDATES, "every order is Low risk")
    else {
        return vec![RiskLevel::Low; orders.height()];
    };
    (0..orders.height())
        .map(|row| RiskLevel::classify(coerce_numeric(orders.value(&column, row), 0.0), threshold))
        .collect()
}

/// Appends the four metric columns.
pub fn derive_metrics(
    orders: &mut Frame,
    emission: Option<&EmissionColumns>,
    risk_threshold: f64,
) -> Result<()> {
    let carbon = carbon_impact(orders, emission);
    let clv = clv_scores(orders);
    let risk = risk_levels(orders, risk_threshold);

    let high = risk.iter().filter(|r| **r == RiskLevel::High).count();
    info!(
        "Derived metrics for {} order(s): {} high risk, total carbon {:.2}",
        orders.height(),
        high,
        carbon.iter().sum::<f64>()
    );

    orders.set_column(CARBON_IMPACT_COLUMN, floats(&carbon))?;
    orders.set_column(CLV_SCORE_COLUMN, floats(&clv))?;
    orders.set_column(
        RISK_LEVEL_COLUMN,
        risk.iter().map(|r| Some(Value::from(r.as_str()))).collect(),
    )?;
    orders.set_column(MAP_WEIGHT_COLUMN, floats(&carbon))?;
    Ok(())
}

fn floats(values: &[f64]) -> Vec<Option<Value>> {
    values.iter().map(|v| Some(Value::Float(*v))).collect()
}
