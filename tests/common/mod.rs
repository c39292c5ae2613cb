#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use orion_control::{config::PipelineConfig, loader::DATA_SUBDIR};
use tempfile::{TempDir, tempdir};

pub const FIXTURE_FILES: [&str; 6] = [
    "orders.csv",
    "delivery_performance.csv",
    "vehicle_fleet.csv",
    "routes_distance.csv",
    "warehouse_inventory.csv",
    "cost_breakdown.csv",
];

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// The complete six-table sample dataset.
pub fn control_tower_dir() -> PathBuf {
    fixture_path("control_tower")
}

pub fn config_for(root: &Path) -> PipelineConfig {
    PipelineConfig {
        root: root.to_path_buf(),
        ..PipelineConfig::default()
    }
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace root.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, contents).expect("write temp file");
        path
    }

    /// Writes `contents` under the workspace's `data/` directory.
    pub fn write_data(&self, name: &str, contents: &str) -> PathBuf {
        let dir = self.temp_dir.path().join(DATA_SUBDIR);
        fs::create_dir_all(&dir).expect("create data dir");
        let path = dir.join(name);
        fs::write(&path, contents).expect("write data file");
        path
    }

    /// Copies the sample dataset into the workspace root.
    pub fn with_fixtures() -> Self {
        let workspace = Self::new();
        for name in FIXTURE_FILES {
            fs::copy(control_tower_dir().join(name), workspace.path().join(name))
                .expect("copy fixture");
        }
        workspace
    }

    pub fn config(&self) -> PipelineConfig {
        config_for(self.path())
    }
}
