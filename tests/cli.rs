mod common;

use std::fs;

use assert_cmd::Command;
use common::{TestWorkspace, control_tower_dir};
use predicates::{prelude::*, str::contains};

fn orion() -> Command {
    Command::cargo_bin("orion-control").expect("binary exists")
}

#[test]
fn export_writes_all_three_tables() {
    let workspace = TestWorkspace::new();
    let output_dir = workspace.path().join("out");
    orion()
        .args([
            "export",
            "--root",
            control_tower_dir().to_str().unwrap(),
            "-o",
            output_dir.to_str().unwrap(),
        ])
        .assert()
        .success();

    let orders = fs::read_to_string(output_dir.join("enriched_orders.csv")).expect("orders");
    let header = orders.lines().next().expect("header line");
    for column in ["Order_ID", "Origin", "Carbon_Impact", "CLV_Score", "Risk_Level", "lat", "lon"] {
        assert!(header.split(',').any(|h| h == column), "missing {column}");
    }
    assert_eq!(orders.lines().count(), 9);

    let fleet = fs::read_to_string(output_dir.join("fleet_ranking.csv")).expect("fleet");
    assert!(fleet.lines().next().unwrap().ends_with("Efficiency_Score,Rank,Status_Advice"));
    assert!(fleet.lines().nth(1).unwrap().starts_with("VEH003,"));

    let inventory =
        fs::read_to_string(output_dir.join("warehouse_inventory.csv")).expect("inventory");
    assert!(inventory.starts_with("product_category,current_stock_units"));
}

#[test]
fn export_on_empty_root_writes_empty_files() {
    let workspace = TestWorkspace::new();
    let output_dir = workspace.path().join("out");
    orion()
        .args([
            "export",
            "--root",
            workspace.path().to_str().unwrap(),
            "-o",
            output_dir.to_str().unwrap(),
        ])
        .assert()
        .success();
    let fleet = fs::read_to_string(output_dir.join("fleet_ranking.csv")).expect("fleet");
    assert!(fleet.is_empty());
}

#[test]
fn fleet_leaderboard_respects_top() {
    orion()
        .args(["fleet", "--root", control_tower_dir().to_str().unwrap(), "--top", "2"])
        .assert()
        .success()
        .stdout(contains("Efficiency_Score"))
        .stdout(contains("VEH003"))
        .stdout(contains("Top Performer"))
        .stdout(contains("Critical Review Needed").not());
}

#[test]
fn preview_shows_requested_dataset() {
    orion()
        .args([
            "preview",
            "--root",
            control_tower_dir().to_str().unwrap(),
            "--dataset",
            "inventory",
            "--rows",
            "2",
        ])
        .assert()
        .success()
        .stdout(contains("Electronics"))
        .stdout(contains("Apparel"))
        .stdout(contains("Books").not());
}

#[test]
fn summary_json_reports_filtered_figures() {
    let assert = orion()
        .args([
            "summary",
            "--root",
            control_tower_dir().to_str().unwrap(),
            "--region",
            "Mumbai",
            "--json",
        ])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf-8");
    let summary: serde_json::Value = serde_json::from_str(&stdout).expect("json summary");
    assert_eq!(summary["region"], "Mumbai");
    assert_eq!(summary["orders"], 2);
    assert_eq!(summary["service_recovery"], 0.0);
    assert_eq!(summary["interventions"][0]["order_id"], "ORD000001");
    assert_eq!(summary["interventions"][0]["risk_level"], "High");
}

#[test]
fn summary_table_lists_interventions() {
    orion()
        .args([
            "summary",
            "--root",
            control_tower_dir().to_str().unwrap(),
            "--priority",
            "Express",
        ])
        .assert()
        .success()
        .stdout(contains("revenue_at_risk"))
        .stdout(contains("39000.50"))
        .stdout(contains("ORD000006"));
}

#[test]
fn config_file_supplies_root_and_threshold() {
    let workspace = TestWorkspace::new();
    let config = workspace.write(
        "orion.yml",
        &format!(
            "root: {}\nrisk_threshold: 100\n",
            control_tower_dir().display()
        ),
    );
    let assert = orion()
        .args(["summary", "--config", config.to_str().unwrap(), "--json"])
        .assert()
        .success();
    let summary: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("json summary");
    // Only the 120 minute delay exceeds 100.
    assert_eq!(summary["interventions"].as_array().unwrap().len(), 1);
    assert_eq!(summary["interventions"][0]["order_id"], "ORD000004");
}

#[test]
fn malformed_input_fails_with_error_message() {
    let workspace = TestWorkspace::new();
    workspace.write("orders.csv", "Order_ID,Priority\nA1,Express,extra\n");
    orion()
        .args(["export", "--root", workspace.path().to_str().unwrap(), "-o", "-"])
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn invalid_config_is_rejected() {
    let workspace = TestWorkspace::new();
    let config = workspace.write("bad.yml", "risk_threshold: [not, a, number]\n");
    orion()
        .args(["fleet", "--config", config.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("configuration"));
}
