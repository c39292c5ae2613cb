//! Loads the six source tables.
//!
//! Each table is looked up at `root/<file>` and then `root/data/<file>`. A
//! table that exists at neither location (or is a zero-byte file) loads as an
//! empty [`Frame`]; a file that exists but does not parse is fatal.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::{debug, info, warn};

use crate::{config::PipelineConfig, error::PipelineError, frame::Frame, io_utils, schema};

pub const DATA_SUBDIR: &str = "data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Orders,
    Performance,
    Fleet,
    Routes,
    Inventory,
    Costs,
}

impl TableKind {
    pub const ALL: [TableKind; 6] = [
        TableKind::Orders,
        TableKind::Performance,
        TableKind::Fleet,
        TableKind::Routes,
        TableKind::Inventory,
        TableKind::Costs,
    ];

    pub fn file_name(self, config: &PipelineConfig) -> &str {
        let files = &config.files;
        match self {
            TableKind::Orders => &files.orders,
            TableKind::Performance => &files.performance,
            TableKind::Fleet => &files.fleet,
            TableKind::Routes => &files.routes,
            TableKind::Inventory => &files.inventory,
            TableKind::Costs => &files.costs,
        }
    }
}

/// The raw inputs, headers already normalized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tables {
    pub orders: Frame,
    pub performance: Frame,
    pub fleet: Frame,
    pub routes: Frame,
    pub inventory: Frame,
    pub costs: Frame,
}

impl Tables {
    pub fn get_mut(&mut self, kind: TableKind) -> &mut Frame {
        match kind {
            TableKind::Orders => &mut self.orders,
            TableKind::Performance => &mut self.performance,
            TableKind::Fleet => &mut self.fleet,
            TableKind::Routes => &mut self.routes,
            TableKind::Inventory => &mut self.inventory,
            TableKind::Costs => &mut self.costs,
        }
    }

    /// Applies the header normalization rule to every table.
    pub fn normalize_headers(&mut self) {
        for kind in TableKind::ALL {
            schema::normalize_headers(self.get_mut(kind));
        }
    }
}

pub fn candidate_paths(root: &Path, file_name: &str) -> [PathBuf; 2] {
    [
        root.join(file_name),
        root.join(DATA_SUBDIR).join(file_name),
    ]
}

/// First candidate location that holds a regular file.
pub fn locate(root: &Path, file_name: &str) -> Option<PathBuf> {
    candidate_paths(root, file_name)
        .into_iter()
        .find(|path| path.is_file())
}

pub fn load_tables(config: &PipelineConfig) -> Result<Tables> {
    config.validate()?;
    let encoding = io_utils::resolve_encoding(config.encoding.as_deref())?;
    let mut tables = Tables::default();
    for kind in TableKind::ALL {
        let file_name = kind.file_name(config);
        let frame = match locate(&config.root, file_name) {
            Some(path) => {
                let delimiter = io_utils::resolve_input_delimiter(&path, config.delimiter_byte());
                read_table(&path, delimiter, encoding)
                    .with_context(|| format!("Loading {kind:?} table"))?
            }
            None => {
                warn!(
                    "{} not found under {:?} or its {}/ directory; using an empty table",
                    file_name, config.root, DATA_SUBDIR
                );
                Frame::empty()
            }
        };
        *tables.get_mut(kind) = frame;
    }
    tables.normalize_headers();
    info!(
        "Loaded tables: orders={} performance={} fleet={} routes={} inventory={} costs={}",
        tables.orders.height(),
        tables.performance.height(),
        tables.fleet.height(),
        tables.routes.height(),
        tables.inventory.height(),
        tables.costs.height()
    );
    Ok(tables)
}

/// Parses one CSV file into a frame. Headers are returned as written.
pub fn read_table(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Frame> {
    let metadata = fs::metadata(path).with_context(|| format!("Inspecting {path:?}"))?;
    if metadata.len() == 0 {
        debug!("{path:?} is empty");
        return Ok(Frame::empty());
    }

    let malformed = |source: csv::Error| PipelineError::MalformedCsv {
        path: path.to_path_buf(),
        source,
    };
    let undecodable = |_| PipelineError::Decode {
        path: path.to_path_buf(),
        encoding: encoding.name(),
    };

    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    let header_record = reader.byte_headers().map_err(malformed)?.clone();
    let headers = io_utils::decode_record(&header_record, encoding).map_err(undecodable)?;

    let mut rows = Vec::new();
    let mut record = csv::ByteRecord::new();
    while reader.read_byte_record(&mut record).map_err(malformed)? {
        rows.push(io_utils::decode_record(&record, encoding).map_err(undecodable)?);
    }
    debug!(
        "Read {} row(s) x {} column(s) from {:?}",
        rows.len(),
        headers.len(),
        path
    );
    Frame::from_records(headers, rows)
        .with_context(|| format!("Building table from {path:?}"))
}
