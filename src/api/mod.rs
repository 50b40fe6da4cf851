//! Purpose: Define the stable public Rust API boundary for chunkline.
//! Exports: Value model, table types, pipeline configuration, and load entry points.
//! Role: Public, additive-only surface used by the CLI and integration tests.
//! Invariants: Loading always goes through `core::pipeline::run_pipeline`.

mod load;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::array::ColumnArray;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::parse::parse_chunk;
pub use crate::core::pipeline::{
    DEFAULT_BUFFER_SIZE, DEFAULT_DEPTH, PipelineConfig, PipelineOutcome, RowBoundary,
};
pub use crate::core::table::{ChunkedColumn, Table, create_empty_columns};
pub use crate::core::types::{ColumnType, Decimal, Value};
pub use load::{ApiResult, LoadReport, load_path, load_reader};
