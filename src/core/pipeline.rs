//! Purpose: Drive the tokenizer over a whole byte stream and fill a `Table`.
//! Exports: `PipelineConfig`, `RowBoundary`, `PipelineOutcome`, `run_pipeline`.
//! Role: Three stages: ordered read, parallel parse, ordered append.
//! Invariants: Chunks land in the table in read order regardless of parse completion order.
//! Invariants: At most `depth` buffers are read but not yet appended.
//! Invariants: Only the read stage touches the source; only the append stage touches the table.
use std::collections::BTreeMap;
use std::io::Read;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::core::array::ColumnArray;
use crate::core::error::{Error, ErrorKind};
use crate::core::parse::parse_chunk;
use crate::core::source::{read_buffer, split_trailing_fragment};
use crate::core::table::Table;
use crate::core::types::ColumnType;

pub const DEFAULT_BUFFER_SIZE: usize = 100_000;
pub const DEFAULT_DEPTH: usize = 112;

/// What happens to a row that straddles two buffers.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RowBoundary {
    /// Every buffer skips its first line and rolls back a truncated last row,
    /// so straddling rows are lost.
    #[default]
    Drop,
    /// The read stage carries the bytes after a buffer's last newline into the
    /// next buffer; only the first buffer skips a header line.
    Carry,
}

impl RowBoundary {
    pub fn as_str(self) -> &'static str {
        match self {
            RowBoundary::Drop => "drop",
            RowBoundary::Carry => "carry",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PipelineConfig {
    pub buffer_size: usize,
    pub depth: usize,
    pub workers: usize,
    pub boundary: RowBoundary,
}

impl PipelineConfig {
    pub fn new() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            depth: DEFAULT_DEPTH,
            workers,
            boundary: RowBoundary::Drop,
        }
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_boundary(mut self, boundary: RowBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.buffer_size == 0 {
            return Err(Error::new(ErrorKind::Usage).with_message("buffer size must be at least 1"));
        }
        if self.depth == 0 {
            return Err(Error::new(ErrorKind::Usage).with_message("pipeline depth must be at least 1"));
        }
        if self.workers == 0 {
            return Err(Error::new(ErrorKind::Usage).with_message("worker count must be at least 1"));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PipelineOutcome {
    pub buffers: u64,
    pub bytes: u64,
    pub rows: u64,
    pub elapsed_ms: u64,
}

struct RawBuffer {
    seq: u64,
    data: Vec<u8>,
    skip_header: bool,
}

struct ParsedChunk {
    seq: u64,
    columns: Result<Vec<ColumnArray>, Error>,
}

#[derive(Copy, Clone, Debug, Default)]
struct ReadOutcome {
    buffers: u64,
    bytes: u64,
}

/// Read `reader` to end-of-stream, appending one chunk per buffer to `table`.
pub fn run_pipeline<R>(
    reader: R,
    table: &mut Table,
    config: &PipelineConfig,
) -> Result<PipelineOutcome, Error>
where
    R: Read + Send,
{
    run_pipeline_with(reader, table, config, &parse_chunk)
}

fn run_pipeline_with<R, P>(
    reader: R,
    table: &mut Table,
    config: &PipelineConfig,
    parse: &P,
) -> Result<PipelineOutcome, Error>
where
    R: Read + Send,
    P: Fn(&[ColumnType], &[u8], bool) -> Vec<ColumnArray> + Sync,
{
    config.validate()?;
    if table.num_columns() == 0 {
        return Err(Error::new(ErrorKind::Usage).with_message("schema has no columns"));
    }
    let config = *config;
    let schema = table.schema();
    let started = Instant::now();
    info!(
        columns = schema.len(),
        buffer_size = config.buffer_size,
        depth = config.depth,
        workers = config.workers,
        boundary = config.boundary.as_str(),
        "pipeline start"
    );

    let (read, rows) = std::thread::scope(|scope| -> Result<(ReadOutcome, u64), Error> {
        let (token_tx, token_rx) = mpsc::sync_channel::<()>(config.depth);
        for _ in 0..config.depth {
            let _ = token_tx.send(());
        }
        let (raw_tx, raw_rx) = mpsc::sync_channel::<RawBuffer>(config.depth);
        let (parsed_tx, parsed_rx) = mpsc::sync_channel::<ParsedChunk>(config.depth);
        let raw_rx = Arc::new(Mutex::new(raw_rx));

        let read_handle = scope.spawn(move || read_stage(reader, config, token_rx, raw_tx));
        let worker_handles: Vec<_> = (0..config.workers)
            .map(|worker| {
                let raw_rx = Arc::clone(&raw_rx);
                let parsed_tx = parsed_tx.clone();
                let schema = &schema;
                scope.spawn(move || parse_stage(worker, schema, parse, raw_rx, parsed_tx))
            })
            .collect();
        drop(raw_rx);
        drop(parsed_tx);

        let appended = append_stage(table, parsed_rx, token_tx);

        let read = read_handle
            .join()
            .map_err(|_| Error::new(ErrorKind::Internal).with_message("read stage panicked"))?;
        for handle in worker_handles {
            handle
                .join()
                .map_err(|_| Error::new(ErrorKind::Internal).with_message("parse worker panicked"))?;
        }
        let rows = appended?;
        let read = read?;
        Ok((read, rows))
    })?;

    let outcome = PipelineOutcome {
        buffers: read.buffers,
        bytes: read.bytes,
        rows,
        elapsed_ms: started.elapsed().as_millis() as u64,
    };
    if config.boundary == RowBoundary::Drop && outcome.buffers > 1 {
        warn!(
            buffers = outcome.buffers,
            "rows spanning buffer boundaries are dropped; carry rows to keep them"
        );
    }
    info!(
        buffers = outcome.buffers,
        bytes = outcome.bytes,
        rows = outcome.rows,
        elapsed_ms = outcome.elapsed_ms,
        "pipeline finished"
    );
    Ok(outcome)
}

fn read_stage<R: Read>(
    mut reader: R,
    config: PipelineConfig,
    tokens: Receiver<()>,
    raw_tx: SyncSender<RawBuffer>,
) -> Result<ReadOutcome, Error> {
    let mut outcome = ReadOutcome::default();
    let mut carry = Vec::new();
    loop {
        let mut data =
            read_buffer(&mut reader, config.buffer_size).map_err(|err| err.with_seq(outcome.buffers))?;
        outcome.bytes += data.len() as u64;
        let end_of_stream = data.len() < config.buffer_size;

        if config.boundary == RowBoundary::Carry {
            if !carry.is_empty() {
                carry.extend_from_slice(&data);
                data = std::mem::take(&mut carry);
            }
            if !end_of_stream {
                carry = split_trailing_fragment(&mut data);
            }
        }

        if !data.is_empty() {
            // A closed token channel means the append stage has stopped.
            if tokens.recv().is_err() {
                break;
            }
            let seq = outcome.buffers;
            debug!(seq, bytes = data.len(), carried = carry.len(), "buffer read");
            let buffer = RawBuffer {
                seq,
                data,
                skip_header: config.boundary == RowBoundary::Drop || seq == 0,
            };
            if raw_tx.send(buffer).is_err() {
                break;
            }
            outcome.buffers += 1;
        }
        if end_of_stream {
            break;
        }
    }
    Ok(outcome)
}

fn parse_stage<P>(
    worker: usize,
    schema: &[ColumnType],
    parse: &P,
    raw_rx: Arc<Mutex<Receiver<RawBuffer>>>,
    parsed_tx: SyncSender<ParsedChunk>,
) where
    P: Fn(&[ColumnType], &[u8], bool) -> Vec<ColumnArray> + Sync,
{
    loop {
        let received = match raw_rx.lock() {
            Ok(rx) => rx.recv(),
            Err(_) => break,
        };
        let Ok(buffer) = received else {
            break;
        };
        // A panicking parse becomes an error chunk so the appender stops
        // instead of waiting on a seq that never arrives.
        let parsed = panic::catch_unwind(AssertUnwindSafe(|| {
            parse(schema, &buffer.data, buffer.skip_header)
        }));
        let columns = match parsed {
            Ok(columns) => {
                debug!(
                    worker,
                    seq = buffer.seq,
                    rows = columns.first().map_or(0, ColumnArray::len),
                    "buffer parsed"
                );
                Ok(columns)
            }
            Err(_) => {
                warn!(worker, seq = buffer.seq, "parse worker panicked");
                Err(Error::new(ErrorKind::Internal)
                    .with_message("parse worker panicked")
                    .with_seq(buffer.seq))
            }
        };
        let chunk = ParsedChunk {
            seq: buffer.seq,
            columns,
        };
        if parsed_tx.send(chunk).is_err() {
            break;
        }
    }
}

fn append_stage(
    table: &mut Table,
    parsed_rx: Receiver<ParsedChunk>,
    tokens: SyncSender<()>,
) -> Result<u64, Error> {
    let mut pending: BTreeMap<u64, Result<Vec<ColumnArray>, Error>> = BTreeMap::new();
    let mut next_seq = 0u64;
    let mut rows = 0u64;
    while let Ok(chunk) = parsed_rx.recv() {
        pending.insert(chunk.seq, chunk.columns);
        while let Some(columns) = pending.remove(&next_seq) {
            let columns = columns?;
            let chunk_rows = columns.first().map_or(0, ColumnArray::len) as u64;
            table.append(columns).map_err(|err| err.with_seq(next_seq))?;
            debug!(seq = next_seq, rows = chunk_rows, held = pending.len(), "chunk appended");
            rows += chunk_rows;
            next_seq += 1;
            let _ = tokens.send(());
        }
    }
    if let Some(seq) = pending.keys().next() {
        return Err(Error::new(ErrorKind::Internal)
            .with_message("parsed chunks arrived without their predecessors")
            .with_seq(*seq));
    }
    Ok(rows)
}
