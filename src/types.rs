use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::AppError;

/// One contract pair as returned by the market watch endpoint: general fields
/// plus `_C`/`_P` suffixed leg fields, kept as raw JSON values.
pub type RawOptionRecord = Map<String, Value>;

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Market {
    Bourse,
    FaraBourse,
}

impl Market {
    pub const ALL: [Market; 2] = [Market::Bourse, Market::FaraBourse];

    /// Numeric identifier used by the market watch endpoint.
    pub fn number(self) -> u8 {
        match self {
            Market::Bourse => 1,
            Market::FaraBourse => 2,
        }
    }
}

impl FromStr for Market {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bourse" => Ok(Market::Bourse),
            "fara_bourse" => Ok(Market::FaraBourse),
            other => Err(AppError::InvalidMarket(other.to_string())),
        }
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Market::Bourse => "bourse",
            Market::FaraBourse => "fara_bourse",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Option legs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Suffix carried by this leg's fields in a raw record.
    pub fn suffix(self) -> &'static str {
        match self {
            OptionType::Call => "_C",
            OptionType::Put => "_P",
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

// ---------------------------------------------------------------------------
// Output table
// ---------------------------------------------------------------------------

/// Flat call/put table. Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl OptionTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell of `row` under `column`, if both exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Row as a column → value object, in column order.
    pub fn record(&self, row: usize) -> Option<Map<String, Value>> {
        let cells = self.rows.get(row)?;
        Some(
            self.columns
                .iter()
                .cloned()
                .zip(cells.iter().cloned())
                .collect(),
        )
    }
}
