pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod frame;
pub mod geo;
pub mod heal;
pub mod io_utils;
pub mod join;
pub mod kpi;
pub mod loader;
pub mod metrics;
pub mod pipeline;
pub mod ranking;
pub mod schema;
pub mod table;

use std::{env, fs, path::Path, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, DatasetKind, SourceArgs},
    config::PipelineConfig,
    frame::Frame,
    kpi::{KpiFilter, KpiSummary},
};

pub const ENRICHED_ORDERS_FILE: &str = "enriched_orders.csv";
pub const FLEET_RANKING_FILE: &str = "fleet_ranking.csv";
pub const INVENTORY_OUTPUT_FILE: &str = "warehouse_inventory.csv";

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("orion_control", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Export(args) => {
            let config = build_config(&args.source)?;
            handle_export(&config, &args.output)
        }
        Commands::Preview(args) => {
            let config = build_config(&args.source)?;
            handle_preview(&config, args.dataset, args.rows)
        }
        Commands::Fleet(args) => {
            let config = build_config(&args.source)?;
            handle_fleet(&config, args.top)
        }
        Commands::Summary(args) => {
            let config = build_config(&args.source)?;
            let filter = KpiFilter {
                region: args.region,
                priorities: args.priorities,
            };
            handle_summary(&config, &filter, args.json)
        }
    }
}

/// Config file (or defaults) with command-line overrides applied on top.
pub fn build_config(source: &SourceArgs) -> Result<PipelineConfig> {
    let mut config = match &source.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Loading configuration from {path:?}"))?,
        None => PipelineConfig::default(),
    };
    if let Some(root) = &source.root {
        config.root = root.clone();
    }
    if let Some(delimiter) = source.delimiter {
        config.delimiter = Some(char::from(delimiter));
    }
    if let Some(encoding) = &source.encoding {
        config.encoding = Some(encoding.clone());
    }
    config.validate()?;
    debug!("Effective configuration: {config:?}");
    Ok(config)
}

fn handle_export(config: &PipelineConfig, output: &Path) -> Result<()> {
    let result = pipeline::run(config)?;
    fs::create_dir_all(output)
        .with_context(|| format!("Creating output directory {output:?}"))?;
    for (name, frame) in [
        (ENRICHED_ORDERS_FILE, &result.orders),
        (FLEET_RANKING_FILE, &result.fleet),
        (INVENTORY_OUTPUT_FILE, &result.inventory),
    ] {
        let path = output.join(name);
        write_frame(frame, &path)?;
        info!("Wrote {} row(s) to {:?}", frame.height(), path);
    }
    Ok(())
}

/// Writes `frame` as comma-separated UTF-8. A frame without columns produces
/// an empty file.
pub fn write_frame(frame: &Frame, path: &Path) -> Result<()> {
    let mut writer = io_utils::open_csv_writer(path, io_utils::DEFAULT_CSV_DELIMITER)?;
    if frame.width() > 0 {
        writer
            .write_record(frame.headers())
            .with_context(|| format!("Writing header to {path:?}"))?;
        for record in frame.records() {
            writer
                .write_record(&record)
                .with_context(|| format!("Writing row to {path:?}"))?;
        }
    }
    writer
        .flush()
        .with_context(|| format!("Flushing output {path:?}"))?;
    Ok(())
}

fn handle_preview(config: &PipelineConfig, dataset: DatasetKind, rows: usize) -> Result<()> {
    let result = pipeline::run(config)?;
    let frame = match dataset {
        DatasetKind::Orders => &result.orders,
        DatasetKind::Fleet => &result.fleet,
        DatasetKind::Inventory => &result.inventory,
    };
    if frame.width() == 0 {
        println!("No {dataset:?} data available.");
        return Ok(());
    }
    print!("{}", table::render_frame(frame, rows));
    info!(
        "Displayed {} of {} row(s)",
        rows.min(frame.height()),
        frame.height()
    );
    Ok(())
}

fn handle_fleet(config: &PipelineConfig, top: Option<usize>) -> Result<()> {
    let result = pipeline::run(config)?;
    if result.fleet.is_empty() {
        println!("No fleet data available.");
        return Ok(());
    }
    let wanted = [
        "vehicle_id",
        heal::VEHICLE_TYPE_COLUMN,
        heal::STATUS_COLUMN,
        ranking::EFFICIENCY_SCORE_COLUMN,
        ranking::RANK_COLUMN,
        ranking::STATUS_ADVICE_COLUMN,
    ];
    let present = wanted
        .into_iter()
        .filter(|name| result.fleet.has_column(name))
        .collect::<Vec<_>>();
    let leaderboard = result.fleet.select(&present);
    print!(
        "{}",
        table::render_frame(&leaderboard, top.unwrap_or(leaderboard.height()))
    );
    Ok(())
}

fn handle_summary(config: &PipelineConfig, filter: &KpiFilter, json: bool) -> Result<()> {
    let result = pipeline::run(config)?;
    let summary = kpi::summarize(&result.orders, &result.inventory, filter);
    if json {
        let rendered =
            serde_json::to_string_pretty(&summary).context("Serializing summary as JSON")?;
        println!("{rendered}");
    } else {
        print!("{}", render_summary(&summary));
    }
    Ok(())
}

pub fn render_summary(summary: &KpiSummary) -> String {
    let headers = vec!["metric".to_string(), "value".to_string()];
    let rows = vec![
        vec![
            "region".to_string(),
            summary.region.clone().unwrap_or_else(|| "all".to_string()),
        ],
        vec!["orders".to_string(), summary.orders.to_string()],
        vec![
            "revenue_at_risk".to_string(),
            format!("{:.2}", summary.revenue_at_risk),
        ],
        vec![
            "carbon_footprint".to_string(),
            format!("{:.2}", summary.carbon_footprint),
        ],
        vec![
            "service_recovery".to_string(),
            format!("{:.1}%", summary.service_recovery),
        ],
    ];
    let mut output = table::render_rows(&headers, &rows, &[false, true]);
    if !summary.interventions.is_empty() {
        let headers = ["order_id", "destination", "clv_score", "risk_level"]
            .map(String::from)
            .to_vec();
        let rows = summary
            .interventions
            .iter()
            .map(|item| {
                vec![
                    item.order_id.clone(),
                    item.destination.clone(),
                    format!("{:.1}", item.clv_score),
                    item.risk_level.to_string(),
                ]
            })
            .collect::<Vec<_>>();
        output.push('\n');
        output.push_str(&table::render_rows(&headers, &rows, &[false, false, true, false]));
    }
    output
}
