// Column type tags, the fixed-point decimal value, and borrowed cell values.
use std::fmt;
use std::str::FromStr;

use bstr::BStr;

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ColumnType {
    Int,
    Decimal,
    Text,
}

impl ColumnType {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::Decimal => "decimal",
            ColumnType::Text => "text",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "int" => Ok(ColumnType::Int),
            "decimal" => Ok(ColumnType::Decimal),
            "text" | "string" => Ok(ColumnType::Text),
            other => Err(Error::new(ErrorKind::Usage)
                .with_message(format!("unknown column type `{other}`"))
                .with_hint("Use int, decimal, or text.")),
        }
    }
}

/// Fixed-point number split into integer and fraction magnitudes.
///
/// The number of fraction digits is not kept, so `.5` and `.05` both store a
/// fraction of 5.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Decimal {
    pub integer: u64,
    pub fraction: u64,
    pub negative: bool,
}

impl Decimal {
    pub fn new(integer: u64, fraction: u64, negative: bool) -> Self {
        Self {
            integer,
            fraction,
            negative,
        }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        write!(f, "{}.{}", self.integer, self.fraction)
    }
}

/// One cell borrowed out of a column array.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Value<'a> {
    Int(i64),
    Decimal(Decimal),
    Text(&'a BStr),
}

impl Value<'_> {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Int(_) => ColumnType::Int,
            Value::Decimal(_) => ColumnType::Decimal,
            Value::Text(_) => ColumnType::Text,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{value}"),
            Value::Decimal(value) => write!(f, "{value}"),
            Value::Text(value) => write!(f, "{value}"),
        }
    }
}
