use std::collections::BTreeSet;

use serde_json::Value;
use tracing::{debug, info};

use crate::config::{GENERAL_FIELDS, SPECIFIC_FIELDS};
use crate::types::{OptionTable, OptionType, RawOptionRecord};

pub const OPTION_TYPE_COLUMN: &str = "option_type";

/// Declared shape of a raw record: general fields as `(raw, canonical)` and
/// per-leg fields as `(base, canonical)`, where the raw leg key is
/// `base` + `_C`/`_P`.
#[derive(Debug, Clone)]
pub struct FieldLayout {
    pub general: Vec<(String, String)>,
    pub specific: Vec<(String, String)>,
}

impl FieldLayout {
    pub fn new(general: &[(&str, &str)], specific: &[(&str, &str)]) -> Self {
        Self {
            general: owned_pairs(general),
            specific: owned_pairs(specific),
        }
    }
}

fn owned_pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(raw, canonical)| (raw.to_string(), canonical.to_string()))
        .collect()
}

impl Default for FieldLayout {
    /// The TSETMC option market watch record.
    fn default() -> Self {
        Self::new(GENERAL_FIELDS, SPECIFIC_FIELDS)
    }
}

fn leg_key(base: &str, leg: OptionType) -> String {
    format!("{base}{}", leg.suffix())
}

/// A per-leg field resolved to its two raw keys.
struct LegField<'a> {
    call_key: String,
    put_key: String,
    canonical: &'a str,
}

impl LegField<'_> {
    fn key(&self, leg: OptionType) -> &str {
        match leg {
            OptionType::Call => &self.call_key,
            OptionType::Put => &self.put_key,
        }
    }
}

/// Split every record into a call row and a put row with canonical column
/// names. Calls come first, then puts, each half in input order.
///
/// A declared field becomes a column when at least one record carries it;
/// records lacking it get a null cell. Values are copied unchanged.
pub fn reshape(records: &[RawOptionRecord], layout: &FieldLayout) -> OptionTable {
    info!("Starting data cleaning process.");

    if records.is_empty() {
        info!("No records to clean.");
        return OptionTable::default();
    }

    let general: Vec<(&str, &str)> = layout
        .general
        .iter()
        .filter(|(raw, _)| records.iter().any(|r| r.contains_key(raw)))
        .map(|(raw, canonical)| (raw.as_str(), canonical.as_str()))
        .collect();

    let specific: Vec<LegField<'_>> = layout
        .specific
        .iter()
        .map(|(base, canonical)| LegField {
            call_key: leg_key(base, OptionType::Call),
            put_key: leg_key(base, OptionType::Put),
            canonical: canonical.as_str(),
        })
        .filter(|f| {
            records
                .iter()
                .any(|r| r.contains_key(&f.call_key) || r.contains_key(&f.put_key))
        })
        .collect();

    log_undeclared_fields(records, layout);

    let mut columns: Vec<String> = Vec::with_capacity(general.len() + specific.len() + 1);
    columns.extend(general.iter().map(|(_, canonical)| canonical.to_string()));
    columns.extend(specific.iter().map(|f| f.canonical.to_string()));
    columns.push(OPTION_TYPE_COLUMN.to_string());

    let mut rows = Vec::with_capacity(records.len() * 2);
    for leg in [OptionType::Call, OptionType::Put] {
        let tag = Value::String(leg.to_string());
        for record in records {
            let mut row = Vec::with_capacity(columns.len());
            row.extend(general.iter().map(|(raw, _)| cell(record, raw)));
            row.extend(specific.iter().map(|f| cell(record, f.key(leg))));
            row.push(tag.clone());
            rows.push(row);
        }
        debug!("Processed {leg} options.");
    }

    info!("Data cleaning completed.");
    OptionTable { columns, rows }
}

fn cell(record: &RawOptionRecord, key: &str) -> Value {
    record.get(key).cloned().unwrap_or(Value::Null)
}

fn log_undeclared_fields(records: &[RawOptionRecord], layout: &FieldLayout) {
    let declared: BTreeSet<String> = layout
        .general
        .iter()
        .map(|(raw, _)| raw.clone())
        .chain(layout.specific.iter().flat_map(|(base, _)| {
            [leg_key(base, OptionType::Call), leg_key(base, OptionType::Put)]
        }))
        .collect();

    let undeclared: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.keys())
        .filter(|k| !declared.contains(k.as_str()))
        .map(String::as_str)
        .collect();

    if !undeclared.is_empty() {
        debug!(
            count = undeclared.len(),
            "Dropping undeclared fields: {undeclared:?}"
        );
    }
}
