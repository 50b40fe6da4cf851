//! Purpose: One-call loaders that build a table from a schema and a byte source.
//! Exports: `LoadReport`, `load_reader`, `load_path`, `ApiResult`.
//! Role: Thin wrappers over the pipeline; own table creation and source opening.
//! Invariants: A source that cannot be opened is an error before any thread starts.
//! Invariants: The returned table is aligned (same chunk and row counts per column).
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::error::Error;
use crate::core::pipeline::{PipelineConfig, run_pipeline};
use crate::core::source::open_source;
use crate::core::table::Table;
use crate::core::types::ColumnType;

pub type ApiResult<T> = Result<T, Error>;

/// Summary of one load, shaped for JSON output.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct LoadReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub rows: u64,
    pub chunks: u64,
    pub columns: usize,
    pub bytes: u64,
    pub buffer_size: usize,
    pub workers: usize,
    pub boundary: &'static str,
    pub elapsed_ms: u64,
}

pub fn load_reader<R>(
    reader: R,
    schema: &[ColumnType],
    config: &PipelineConfig,
) -> ApiResult<(Table, LoadReport)>
where
    R: Read + Send,
{
    let mut table = Table::new(schema);
    let outcome = run_pipeline(reader, &mut table, config)?;
    table.check_alignment()?;
    let report = LoadReport {
        path: None,
        rows: outcome.rows,
        chunks: outcome.buffers,
        columns: table.num_columns(),
        bytes: outcome.bytes,
        buffer_size: config.buffer_size,
        workers: config.workers,
        boundary: config.boundary.as_str(),
        elapsed_ms: outcome.elapsed_ms,
    };
    Ok((table, report))
}

pub fn load_path(
    path: &Path,
    schema: &[ColumnType],
    config: &PipelineConfig,
) -> ApiResult<(Table, LoadReport)> {
    config.validate()?;
    let file = open_source(path)?;
    let (table, mut report) =
        load_reader(file, schema, config).map_err(|err| err.with_path(path))?;
    report.path = Some(path.to_path_buf());
    Ok((table, report))
}
