mod common;

use std::collections::HashSet;

use common::{TestWorkspace, config_for, control_tower_dir};
use orion_control::{
    data::Value,
    geo::{self, LAT_COLUMN, LON_COLUMN},
    heal::{self, VEHICLE_TYPE_COLUMN},
    kpi::{self, KpiFilter},
    metrics::{CARBON_IMPACT_COLUMN, CLV_SCORE_COLUMN, MAP_WEIGHT_COLUMN, RISK_LEVEL_COLUMN},
    pipeline::{self, ORDER_ID_OUTPUT, ORIGIN_OUTPUT, PipelineOutput},
    ranking::{EFFICIENCY_SCORE_COLUMN, RANK_COLUMN, STATUS_ADVICE_COLUMN},
};

fn run_fixtures() -> PipelineOutput {
    pipeline::run(&config_for(&control_tower_dir())).expect("pipeline run")
}

fn text(output: &PipelineOutput, column: &str, row: usize) -> String {
    output
        .orders
        .value(column, row)
        .map(Value::as_display)
        .unwrap_or_default()
}

#[test]
fn enriched_orders_keep_one_row_per_order() {
    let output = run_fixtures();
    assert_eq!(output.orders.height(), 8);
    let ids = (0..8)
        .map(|row| text(&output, ORDER_ID_OUTPUT, row))
        .collect::<Vec<_>>();
    assert_eq!(ids[0], "ORD000001");
    assert_eq!(ids[7], "ORD000008");
    for column in [
        CARBON_IMPACT_COLUMN,
        CLV_SCORE_COLUMN,
        RISK_LEVEL_COLUMN,
        MAP_WEIGHT_COLUMN,
        LAT_COLUMN,
        LON_COLUMN,
        VEHICLE_TYPE_COLUMN,
    ] {
        let values = &output.orders.column(column).expect(column).values;
        assert!(values.iter().all(Option::is_some), "{column} has nulls");
    }
}

#[test]
fn risk_levels_follow_traffic_delay() {
    let output = run_fixtures();
    let levels = (0..8)
        .map(|row| text(&output, RISK_LEVEL_COLUMN, row))
        .collect::<Vec<_>>();
    // 75, 20, 60, 120, 45, 61, "heavy", no route
    assert_eq!(
        levels,
        vec!["High", "Low", "Low", "High", "Low", "High", "Low", "Low"]
    );
}

#[test]
fn clv_scores_stay_within_bounds_and_use_defaults() {
    let output = run_fixtures();
    for row in 0..output.orders.height() {
        let score = output
            .orders
            .value(CLV_SCORE_COLUMN, row)
            .and_then(Value::as_f64)
            .expect("numeric clv");
        assert!((0.0..=100.0).contains(&score), "row {row}: {score}");
    }
    // No order value and no rating: 0 * 70 + (3 / 5) * 30.
    let last = output
        .orders
        .value(CLV_SCORE_COLUMN, 7)
        .and_then(Value::as_f64)
        .unwrap();
    assert!((last - 18.0).abs() < 1e-9);
}

#[test]
fn carbon_is_non_negative_and_mirrored() {
    let output = run_fixtures();
    for row in 0..output.orders.height() {
        let carbon = output.orders.value(CARBON_IMPACT_COLUMN, row);
        assert_eq!(carbon, output.orders.value(MAP_WEIGHT_COLUMN, row));
        assert!(carbon.and_then(Value::as_f64).unwrap() >= 0.0);
    }
    // No route means no distance.
    assert_eq!(
        output.orders.value(CARBON_IMPACT_COLUMN, 7),
        Some(&Value::Float(0.0))
    );
    // Singapore is far away and every vehicle type emits something.
    assert!(output.orders.value(CARBON_IMPACT_COLUMN, 6).and_then(Value::as_f64).unwrap() > 0.0);
}

#[test]
fn synthesized_vehicle_types_come_from_the_fleet() {
    let output = run_fixtures();
    let fleet_types = output
        .fleet
        .column(VEHICLE_TYPE_COLUMN)
        .unwrap()
        .values
        .iter()
        .flatten()
        .map(Value::as_display)
        .collect::<HashSet<_>>();
    assert!(fleet_types.contains("SMALL_VAN"));
    for row in 0..output.orders.height() {
        assert!(fleet_types.contains(&text(&output, VEHICLE_TYPE_COLUMN, row)));
    }
}

#[test]
fn origins_are_geocoded_with_default_fallback() {
    let output = run_fixtures();
    assert_eq!(text(&output, ORIGIN_OUTPUT, 0), "Mumbai");
    let mumbai = geo::geocode("Mumbai");
    assert_eq!(output.orders.value(LAT_COLUMN, 0), Some(&Value::Float(mumbai.lat)));
    assert_eq!(output.orders.value(LON_COLUMN, 0), Some(&Value::Float(mumbai.lon)));
    assert_eq!(
        output.orders.value(LAT_COLUMN, 6),
        Some(&Value::Float(geo::DEFAULT_COORDINATE.lat))
    );
}

#[test]
fn fleet_is_healed_and_ranked() {
    let output = run_fixtures();
    let fleet = &output.fleet;
    assert_eq!(fleet.height(), 7);
    for column in [
        heal::UTILIZATION_COLUMN,
        heal::STATUS_COLUMN,
        heal::LOCATION_COLUMN,
        EFFICIENCY_SCORE_COLUMN,
        RANK_COLUMN,
        STATUS_ADVICE_COLUMN,
    ] {
        assert!(fleet.has_column(column), "missing {column}");
    }
    // Newest, lightest and cleanest on three of four metrics.
    assert_eq!(fleet.value("vehicle_id", 0), Some(&Value::from("VEH003")));
    let ranks = (0..7)
        .map(|row| fleet.value(RANK_COLUMN, row).cloned())
        .collect::<Vec<_>>();
    assert_eq!(
        ranks,
        (1..=7).map(|r| Some(Value::Integer(r))).collect::<Vec<_>>()
    );
    let advice = (0..7)
        .map(|row| fleet.value(STATUS_ADVICE_COLUMN, row).unwrap().as_display())
        .collect::<Vec<_>>();
    assert_eq!(advice.iter().filter(|a| *a == "Top Performer").count(), 3);
    assert_eq!(advice.iter().filter(|a| *a == "Standard").count(), 1);
    assert_eq!(
        advice.iter().filter(|a| *a == "Critical Review Needed").count(),
        3
    );
}

#[test]
fn repeated_runs_are_identical() {
    assert_eq!(run_fixtures(), run_fixtures());
}

#[test]
fn inventory_passes_through_with_normalized_headers() {
    let output = run_fixtures();
    assert_eq!(output.inventory.height(), 4);
    assert_eq!(
        output.inventory.headers()[..2],
        ["product_category".to_string(), "current_stock_units".to_string()]
    );
}

#[test]
fn summary_over_fixture_orders() {
    let output = run_fixtures();
    let all = kpi::summarize(&output.orders, &output.inventory, &KpiFilter::default());
    assert_eq!(all.orders, 8);
    assert!((all.revenue_at_risk - 39000.5).abs() < 1e-6);
    assert!((all.service_recovery - 62.5).abs() < 1e-9);
    let ids = all
        .interventions
        .iter()
        .map(|i| i.order_id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["ORD000001", "ORD000004", "ORD000006"]);
    assert_eq!(all.inventory_levels.len(), 4);
    assert_eq!(all.inventory_levels[1].quantity, 1250.0);

    let mumbai = kpi::summarize(
        &output.orders,
        &output.inventory,
        &KpiFilter {
            region: Some("Mumbai".to_string()),
            priorities: vec!["Express".to_string()],
        },
    );
    assert_eq!(mumbai.orders, 2);
    assert_eq!(mumbai.service_recovery, 0.0);
    assert!((mumbai.revenue_at_risk - 31400.5).abs() < 1e-6);
}

#[test]
fn orders_without_fleet_use_fallback_types() {
    let workspace = TestWorkspace::new();
    workspace.write(
        "orders.csv",
        "Order_ID,Origin\nA1,Delhi\nA2,Pune\nA3,Goa\n",
    );
    let output = pipeline::run(&workspace.config()).expect("run");
    assert!(output.fleet.is_empty());
    for row in 0..3 {
        let vehicle = text(&output, VEHICLE_TYPE_COLUMN, row);
        assert!(heal::FALLBACK_VEHICLE_TYPES.contains(&vehicle.as_str()));
        assert_eq!(text(&output, CARBON_IMPACT_COLUMN, row), "0");
        assert_eq!(text(&output, CLV_SCORE_COLUMN, row), "50");
        assert_eq!(text(&output, RISK_LEVEL_COLUMN, row), "Low");
    }
}
