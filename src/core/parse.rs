//! Purpose: Tokenize one raw buffer of delimited rows into per-column arrays.
//! Exports: `parse_chunk`, `parse_into`.
//! Role: Parse stage of the pipeline; runs on worker threads with no shared state.
//! Invariants: Fields end at `,`, `\n`, or the end of the buffer; no quoting.
//! Invariants: A row cut short by the end of the buffer is rolled back, so every
//! output array holds the same number of rows.
//! Invariants: Numeric text is not validated; non-digit bytes accumulate as `byte - '0'`.
use bstr::{BString, ByteSlice};

use crate::core::array::ColumnArray;
use crate::core::types::{ColumnType, Decimal};

/// Parse `data` into fresh arrays shaped by `schema`.
///
/// With `skip_header` set, everything up to and including the first newline
/// is ignored before the first row is read.
pub fn parse_chunk(schema: &[ColumnType], data: &[u8], skip_header: bool) -> Vec<ColumnArray> {
    let mut columns: Vec<ColumnArray> = schema.iter().copied().map(ColumnArray::new).collect();
    parse_into(&mut columns, data, skip_header);
    columns
}

/// Append the complete rows of `data` to `columns`, returning how many rows
/// were kept.
pub fn parse_into(columns: &mut [ColumnArray], data: &[u8], skip_header: bool) -> usize {
    if columns.is_empty() {
        return 0;
    }
    let size = data.len();
    let mut cur = 0;
    if skip_header {
        cur = data.find_byte(b'\n').map_or(size, |pos| pos + 1);
    }

    let mut rows = 0;
    'rows: while cur < size {
        for col in 0..columns.len() {
            if cur >= size {
                rollback(&mut columns[..col]);
                break 'rows;
            }
            match &mut columns[col] {
                ColumnArray::Int(values) => values.push(read_int(data, &mut cur)),
                ColumnArray::Decimal(values) => values.push(read_decimal(data, &mut cur)),
                ColumnArray::Text(values) => values.push(read_text(data, &mut cur)),
            }
        }
        rows += 1;
    }
    rows
}

fn rollback(columns: &mut [ColumnArray]) {
    for column in columns {
        column.pop();
    }
}

fn is_delimiter(byte: u8) -> bool {
    byte == b',' || byte == b'\n'
}

fn read_sign(data: &[u8], cur: &mut usize) -> bool {
    if data.get(*cur) == Some(&b'-') {
        *cur += 1;
        return true;
    }
    false
}

fn read_int(data: &[u8], cur: &mut usize) -> i64 {
    let negative = read_sign(data, cur);
    let mut value = 0i64;
    while let Some(&byte) = data.get(*cur) {
        if is_delimiter(byte) {
            break;
        }
        value = value
            .wrapping_mul(10)
            .wrapping_add(i64::from(byte) - i64::from(b'0'));
        *cur += 1;
    }
    *cur += 1;
    if negative { value.wrapping_neg() } else { value }
}

fn accumulate(data: &[u8], cur: &mut usize, stop_at_dot: bool) -> u64 {
    let mut value = 0u64;
    while let Some(&byte) = data.get(*cur) {
        if is_delimiter(byte) || (stop_at_dot && byte == b'.') {
            break;
        }
        value = value
            .wrapping_mul(10)
            .wrapping_add(u64::from(byte.wrapping_sub(b'0')));
        *cur += 1;
    }
    value
}

fn read_decimal(data: &[u8], cur: &mut usize) -> Decimal {
    let negative = read_sign(data, cur);
    let integer = accumulate(data, cur, true);
    let mut fraction = 0;
    if data.get(*cur) == Some(&b'.') {
        *cur += 1;
        fraction = accumulate(data, cur, false);
    }
    *cur += 1;
    Decimal::new(integer, fraction, negative)
}

fn read_text(data: &[u8], cur: &mut usize) -> BString {
    let rest = &data[*cur..];
    let len = rest.find_byteset(b",\n").unwrap_or(rest.len());
    *cur += len + 1;
    BString::from(&rest[..len])
}
