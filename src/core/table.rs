// Chunked columns and the table that owns one per schema position.
use std::io::Write;

use crate::core::array::ColumnArray;
use crate::core::error::{Error, ErrorKind};
use crate::core::types::{ColumnType, Value};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChunkedColumn {
    column_type: ColumnType,
    chunks: Vec<ColumnArray>,
}

impl ChunkedColumn {
    pub fn new(column_type: ColumnType) -> Self {
        Self {
            column_type,
            chunks: Vec::new(),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn chunks(&self) -> &[ColumnArray] {
        &self.chunks
    }

    pub fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Total rows across all chunks.
    pub fn len(&self) -> usize {
        self.chunks.iter().map(ColumnArray::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.iter().all(ColumnArray::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = Value<'_>> + '_ {
        self.chunks.iter().flat_map(ColumnArray::iter)
    }

    fn push_chunk(&mut self, chunk: ColumnArray) {
        self.chunks.push(chunk);
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Table {
    columns: Vec<ChunkedColumn>,
}

impl Table {
    pub fn new(schema: &[ColumnType]) -> Self {
        Self {
            columns: schema.iter().copied().map(ChunkedColumn::new).collect(),
        }
    }

    pub fn schema(&self) -> Vec<ColumnType> {
        self.columns.iter().map(ChunkedColumn::column_type).collect()
    }

    pub fn columns(&self) -> &[ChunkedColumn] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&ChunkedColumn> {
        self.columns.get(index)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_chunks(&self) -> usize {
        self.columns.first().map_or(0, ChunkedColumn::num_chunks)
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, ChunkedColumn::len)
    }

    /// One fresh, empty array per schema position.
    pub fn create_empty_columns(&self) -> Vec<ColumnArray> {
        create_empty_columns(&self.schema())
    }

    /// Fold one parsed chunk into the table, column by column.
    ///
    /// The chunk must carry one array per column with matching types. On a
    /// mismatch nothing is appended.
    pub fn append(&mut self, chunk: Vec<ColumnArray>) -> Result<(), Error> {
        if chunk.len() != self.columns.len() {
            return Err(Error::new(ErrorKind::Schema).with_message(format!(
                "chunk has {} columns, table has {}",
                chunk.len(),
                self.columns.len()
            )));
        }
        for (index, (column, array)) in self.columns.iter().zip(&chunk).enumerate() {
            if column.column_type() != array.column_type() {
                return Err(Error::new(ErrorKind::Schema)
                    .with_message(format!(
                        "expected {} array, got {}",
                        column.column_type(),
                        array.column_type()
                    ))
                    .with_column(index));
            }
        }
        for (column, array) in self.columns.iter_mut().zip(chunk) {
            column.push_chunk(array);
        }
        Ok(())
    }

    /// Check that every column has the same chunk count and that each chunk
    /// index has the same row count across columns.
    pub fn check_alignment(&self) -> Result<(), Error> {
        let Some(first) = self.columns.first() else {
            return Ok(());
        };
        for (index, column) in self.columns.iter().enumerate() {
            if column.num_chunks() != first.num_chunks() {
                return Err(Error::new(ErrorKind::Internal)
                    .with_message(format!(
                        "column has {} chunks, expected {}",
                        column.num_chunks(),
                        first.num_chunks()
                    ))
                    .with_column(index));
            }
        }
        for (chunk_index, expected) in first.chunks().iter().enumerate() {
            for (index, column) in self.columns.iter().enumerate() {
                let rows = column.chunks()[chunk_index].len();
                if rows != expected.len() {
                    return Err(Error::new(ErrorKind::Internal)
                        .with_message(format!(
                            "chunk has {rows} rows, expected {}",
                            expected.len()
                        ))
                        .with_seq(chunk_index as u64)
                        .with_column(index));
                }
            }
        }
        Ok(())
    }

    /// Write every row, chunk by chunk, one line per row with values
    /// separated by a single space.
    pub fn render<W: Write>(&self, out: &mut W) -> Result<(), Error> {
        self.check_alignment()?;
        let write_err = |err| Error::from_io(err, "failed to write table");
        for chunk_index in 0..self.num_chunks() {
            let rows = self.columns[0].chunks()[chunk_index].len();
            for row in 0..rows {
                for (index, column) in self.columns.iter().enumerate() {
                    if index > 0 {
                        out.write_all(b" ").map_err(write_err)?;
                    }
                    if let Some(value) = column.chunks()[chunk_index].get(row) {
                        write!(out, "{value}").map_err(write_err)?;
                    }
                }
                out.write_all(b"\n").map_err(write_err)?;
            }
        }
        Ok(())
    }
}

pub fn create_empty_columns(schema: &[ColumnType]) -> Vec<ColumnArray> {
    schema.iter().copied().map(ColumnArray::new).collect()
}
