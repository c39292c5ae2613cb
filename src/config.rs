//! Pipeline configuration.
//!
//! Every field has a default, so an absent or partial YAML file is valid.
//! Command-line flags are applied on top of whatever the file provides.

use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::{error::PipelineError, io_utils};

pub const DEFAULT_RISK_THRESHOLD: f64 = 60.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TableFiles {
    pub orders: String,
    pub performance: String,
    pub fleet: String,
    pub routes: String,
    pub inventory: String,
    pub costs: String,
}

impl Default for TableFiles {
    fn default() -> Self {
        Self {
            orders: "orders.csv".to_string(),
            performance: "delivery_performance.csv".to_string(),
            fleet: "vehicle_fleet.csv".to_string(),
            routes: "routes_distance.csv".to_string(),
            inventory: "warehouse_inventory.csv".to_string(),
            costs: "cost_breakdown.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// First directory searched; `root/data` is searched second.
    pub root: PathBuf,
    pub files: TableFiles,
    pub delimiter: Option<char>,
    pub encoding: Option<String>,
    /// Delay/traffic values strictly above this are `High` risk.
    pub risk_threshold: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            files: TableFiles::default(),
            delimiter: None,
            encoding: None,
            risk_threshold: DEFAULT_RISK_THRESHOLD,
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("Reading config {path:?}"))?;
        let config: Self =
            serde_yaml::from_str(&contents).map_err(|source| PipelineError::Config {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.risk_threshold.is_finite() {
            return Err(anyhow!("risk_threshold must be a finite number"));
        }
        if let Some(delimiter) = self.delimiter
            && !delimiter.is_ascii()
        {
            return Err(anyhow!("Delimiter must be ASCII, got '{delimiter}'"));
        }
        io_utils::resolve_encoding(self.encoding.as_deref())?;
        Ok(())
    }

    pub fn delimiter_byte(&self) -> Option<u8> {
        self.delimiter.filter(char::is_ascii).map(|c| c as u8)
    }
}
