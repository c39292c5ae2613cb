//! Fleet efficiency ranking.
//!
//! Four vehicle attributes are min-max normalized across the fleet, age and
//! CO2 inverted so lower is better, and averaged into a 0–100
//! `Efficiency_Score`. Vehicles are then stably sorted by score and given a
//! dense 1-based `Rank` plus a `Status_Advice` label.

use std::fmt;

use anyhow::Result;
use log::{info, warn};
use serde::Serialize;

use crate::{
    data::Value,
    frame::Frame,
    heal::UTILIZATION_COLUMN,
};

pub const EFFICIENCY_SCORE_COLUMN: &str = "Efficiency_Score";
pub const RANK_COLUMN: &str = "Rank";
pub const STATUS_ADVICE_COLUMN: &str = "Status_Advice";

/// Contribution of a metric that cannot be normalized.
pub const NEUTRAL_COMPONENT: f64 = 0.5;
pub const LABELLED_PER_END: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metric {
    pub name: &'static str,
    /// Preferred exact column, then substring candidates.
    pub column: &'static str,
    pub candidates: &'static [&'static str],
    pub lower_is_better: bool,
}

pub const METRICS: [Metric; 4] = [
    Metric {
        name: "fuel efficiency",
        column: "fuel_efficiency_km_per_l",
        candidates: &["fuel_efficiency"],
        lower_is_better: false,
    },
    Metric {
        name: "age",
        column: "age_years",
        candidates: &["age_years", "age"],
        lower_is_better: true,
    },
    Metric {
        name: "co2 emissions",
        column: "co2_emissions_kg_per_km",
        candidates: &["co2", "carbon"],
        lower_is_better: true,
    },
    Metric {
        name: "utilization",
        column: UTILIZATION_COLUMN,
        candidates: &["utilization"],
        lower_is_better: false,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusAdvice {
    TopPerformer,
    Standard,
    CriticalReviewNeeded,
}

impl StatusAdvice {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusAdvice::TopPerformer => "Top Performer",
            StatusAdvice::Standard => "Standard",
            StatusAdvice::CriticalReviewNeeded => "Critical Review Needed",
        }
    }

    /// Label for the vehicle at `position` (0-based) of `count` ranked
    /// vehicles. When the top and bottom three overlap, the bottom label wins.
    pub fn for_position(position: usize, count: usize) -> Self {
        if position + LABELLED_PER_END >= count {
            StatusAdvice::CriticalReviewNeeded
        } else if position < LABELLED_PER_END {
            StatusAdvice::TopPerformer
        } else {
            StatusAdvice::Standard
        }
    }
}

impl fmt::Display for StatusAdvice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Min-max scales `values` into `[0, 1]`, optionally inverted. Non-numeric
/// entries, and every entry when all numeric values are equal, get
/// [`NEUTRAL_COMPONENT`].
pub fn min_max_normalize(values: &[Option<f64>], invert: bool) -> Vec<f64> {
    let numeric = values.iter().flatten().copied();
    let min = numeric.clone().fold(f64::INFINITY, f64::min);
    let max = numeric.fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() || max == min {
        return vec![NEUTRAL_COMPONENT; values.len()];
    }
    let span = max - min;
    values
        .iter()
        .map(|value| match value {
            Some(v) => {
                let scaled = (v - min) / span;
                if invert { 1.0 - scaled } else { scaled }
            }
            None => NEUTRAL_COMPONENT,
        })
        .collect()
}

fn locate_metric(fleet: &Frame, metric: &Metric) -> Option<String> {
    if fleet.has_column(metric.column) {
        return Some(metric.column.to_string());
    }
    fleet.find_column_or_warn(
        metric.candidates,
        &format!("{} contributes {NEUTRAL_COMPONENT} for every vehicle", metric.name),
    )
}

/// Normalized component per vehicle for one metric.
pub fn metric_component(fleet: &Frame, metric: &Metric) -> Vec<f64> {
    let Some(column) = locate_metric(fleet, metric) else {
        return vec![NEUTRAL_COMPONENT; fleet.height()];
    };
    let raw = (0..fleet.height())
        .map(|row| fleet.value(&column, row).and_then(Value::as_f64))
        .collect::<Vec<_>>();
    let invalid = raw.iter().filter(|v| v.is_none()).count();
    if invalid > 0 {
        warn!(
            "{} vehicle(s) have no numeric '{}'; they score {} on {}",
            invalid, column, NEUTRAL_COMPONENT, metric.name
        );
    }
    min_max_normalize(&raw, metric.lower_is_better)
}

/// Mean of the four normalized components, scaled to `[0, 100]`.
pub fn efficiency_scores(fleet: &Frame) -> Vec<f64> {
    let components = METRICS
        .iter()
        .map(|metric| metric_component(fleet, metric))
        .collect::<Vec<_>>();
    (0..fleet.height())
        .map(|row| {
            let sum: f64 = components.iter().map(|component| component[row]).sum();
            sum / METRICS.len() as f64 * 100.0
        })
        .collect()
}

/// Returns the fleet sorted by descending score with `Efficiency_Score`,
/// `Rank` and `Status_Advice` appended. An empty fleet is returned as is.
pub fn rank_fleet(fleet: &Frame) -> Result<Frame> {
    if fleet.is_empty() {
        return Ok(fleet.clone());
    }
    let scores = efficiency_scores(fleet);

    let mut order = (0..fleet.height()).collect::<Vec<_>>();
    order.sort_by(|a, b| scores[*b].total_cmp(&scores[*a]));

    let mut ranked = fleet.take_rows(&order);
    let count = order.len();
    ranked.set_column(
        EFFICIENCY_SCORE_COLUMN,
        order.iter().map(|&row| Some(Value::Float(scores[row]))).collect(),
    )?;
    ranked.set_column(
        RANK_COLUMN,
        (1..=count).map(|rank| Some(Value::Integer(rank as i64))).collect(),
    )?;
    ranked.set_column(
        STATUS_ADVICE_COLUMN,
        (0..count)
            .map(|position| Some(Value::from(StatusAdvice::for_position(position, count).as_str())))
            .collect(),
    )?;
    info!(
        "Ranked {} vehicle(s); best score {:.1}, worst {:.1}",
        count,
        scores[order[0]],
        scores[order[count - 1]]
    );
    Ok(ranked)
}
