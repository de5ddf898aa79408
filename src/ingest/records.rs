//! Score table loader.
//!
//! Reads one CSV per (target, reference state, score type). Rows whose model
//! number, declared version, or score cannot be read are skipped here so the
//! engine only ever sees numeric records. Group labels pass through untouched;
//! the engine decides whether they are well formed.

use std::io::Read;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TwoStateError};
use crate::model::{DeclaredVersion, RecordSet, ReferenceState, ScoreRecord};

/// Column names in score tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ColumnMap {
    pub group: String,
    pub model_number: String,
    /// Optional; absent columns default every row to the file's native version
    pub version: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            group: "Group".to_string(),
            model_number: "Model Number".to_string(),
            version: "Model Version".to_string(),
        }
    }
}

/// A row the loader could not turn into a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// 1-based line in the source file
    pub line: u64,
    pub reason: String,
}

/// Records read from one file, plus the rows that were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedRecords {
    pub set: RecordSet,
    pub skipped: Vec<SkippedRow>,
}

/// Load a score table from disk.
pub fn load_record_set(
    path: &Path,
    reference: ReferenceState,
    score_column: &str,
    columns: &ColumnMap,
) -> Result<LoadedRecords> {
    let file = std::fs::File::open(path).map_err(|e| TwoStateError::io(path, e))?;
    read_record_set(
        file,
        &path.display().to_string(),
        reference,
        score_column,
        columns,
    )
}

/// Load a score table from any reader; `source` names it in errors and logs.
pub fn read_record_set<R: Read>(
    reader: R,
    source: &str,
    reference: ReferenceState,
    score_column: &str,
    columns: &ColumnMap,
) -> Result<LoadedRecords> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let find = |name: &str| headers.iter().position(|h| h == name);
    let require = |name: &str| {
        find(name).ok_or_else(|| TwoStateError::missing_column(source, name, &headers))
    };

    let group_idx = require(&columns.group)?;
    let model_idx = require(&columns.model_number)?;
    let score_idx = require(score_column)?;
    let version_idx = find(&columns.version);
    let native = reference.native_version();
    if version_idx.is_none() {
        tracing::debug!(source, version = %native, "no version column; using native version");
    }

    let mut set = RecordSet::new(reference);
    let mut skipped = Vec::new();

    // Byte records, so one badly encoded row is skipped instead of ending the read.
    for row in reader.byte_records() {
        let row = match row {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let line = e.position().map_or(0, csv::Position::line);
                let reason = e.to_string();
                tracing::warn!(source, line, "skipping row: {reason}");
                skipped.push(SkippedRow { line, reason });
                continue;
            }
        };
        let line = row.position().map_or(0, csv::Position::line);
        let field = |idx: usize| decode_field(row.get(idx).unwrap_or(b""), &headers[idx]);

        let parsed = match (
            field(group_idx),
            field(model_idx),
            version_idx.map(field).transpose(),
            field(score_idx),
        ) {
            (Ok(group), Ok(model), Ok(version), Ok(score)) => {
                parse_row(group, model, version, score, native)
            }
            (Err(reason), ..) | (_, Err(reason), ..) | (.., Err(reason), _) | (.., Err(reason)) => {
                Err(reason)
            }
        };
        match parsed {
            Ok(record) => set.push(record),
            Err(reason) => {
                tracing::warn!(source, line, "skipping row: {reason}");
                skipped.push(SkippedRow { line, reason });
            }
        }
    }

    tracing::debug!(
        source,
        reference = %reference,
        records = set.len(),
        skipped = skipped.len(),
        "loaded score table"
    );
    Ok(LoadedRecords { set, skipped })
}

fn decode_field<'a>(raw: &'a [u8], column: &str) -> std::result::Result<&'a str, String> {
    std::str::from_utf8(raw).map_err(|_| format!("invalid UTF-8 in column '{column}'"))
}

fn parse_row(
    group: &str,
    model: &str,
    version: Option<&str>,
    score: &str,
    native: DeclaredVersion,
) -> std::result::Result<ScoreRecord, String> {
    if group.is_empty() {
        return Err("blank group".to_string());
    }
    let model_number = parse_model_number(model)
        .ok_or_else(|| format!("invalid model number '{model}' for group {group}"))?;
    let declared_version = match version {
        None | Some("") => native,
        Some(v) => v.parse().map_err(|e| format!("{e} for group {group}"))?,
    };
    if score.is_empty() {
        return Err(format!("blank score for group {group} model {model_number}"));
    }
    let value: f64 = score
        .parse()
        .map_err(|_| format!("non-numeric score '{score}' for group {group} model {model_number}"))?;
    if !value.is_finite() {
        return Err(format!("non-finite score for group {group} model {model_number}"));
    }
    Ok(ScoreRecord::new(group, model_number, declared_version, value))
}

/// Accepts `3` as well as `3.0`, which spreadsheet exports often produce.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_model_number(raw: &str) -> Option<u32> {
    if let Ok(n) = raw.parse::<u32>() {
        return Some(n);
    }
    let value: f64 = raw.parse().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        Some(value as u32)
    } else {
        None
    }
}
