// Single-type growable column arrays; one array backs one chunk of one column.
use bstr::{BString, ByteSlice};

use crate::core::types::{ColumnType, Decimal, Value};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ColumnArray {
    Int(Vec<i64>),
    Decimal(Vec<Decimal>),
    Text(Vec<BString>),
}

impl ColumnArray {
    pub fn new(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Int => ColumnArray::Int(Vec::new()),
            ColumnType::Decimal => ColumnArray::Decimal(Vec::new()),
            ColumnType::Text => ColumnArray::Text(Vec::new()),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnArray::Int(_) => ColumnType::Int,
            ColumnArray::Decimal(_) => ColumnType::Decimal,
            ColumnArray::Text(_) => ColumnType::Text,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnArray::Int(values) => values.len(),
            ColumnArray::Decimal(values) => values.len(),
            ColumnArray::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value<'_>> {
        match self {
            ColumnArray::Int(values) => values.get(index).copied().map(Value::Int),
            ColumnArray::Decimal(values) => values.get(index).copied().map(Value::Decimal),
            ColumnArray::Text(values) => values.get(index).map(|v| Value::Text(v.as_bstr())),
        }
    }

    /// Append a value of the array's own type. Returns `false` and leaves the
    /// array untouched when the tags differ.
    pub fn push_value(&mut self, value: Value<'_>) -> bool {
        if value.column_type() != self.column_type() {
            return false;
        }
        match (self, value) {
            (ColumnArray::Int(values), Value::Int(v)) => values.push(v),
            (ColumnArray::Decimal(values), Value::Decimal(v)) => values.push(v),
            (ColumnArray::Text(values), Value::Text(v)) => values.push(BString::from(v.as_bytes())),
            _ => return false,
        }
        true
    }

    /// Remove the most recently appended value (row rollback).
    pub fn pop(&mut self) {
        match self {
            ColumnArray::Int(values) => {
                values.pop();
            }
            ColumnArray::Decimal(values) => {
                values.pop();
            }
            ColumnArray::Text(values) => {
                values.pop();
            }
        }
    }

    pub fn clear(&mut self) {
        match self {
            ColumnArray::Int(values) => values.clear(),
            ColumnArray::Decimal(values) => values.clear(),
            ColumnArray::Text(values) => values.clear(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Value<'_>> + '_ {
        (0..self.len()).filter_map(move |index| self.get(index))
    }
}
