//! Input boundary: score tables and group-name lookups.
//!
//! Everything here is I/O and runs before the engine. Failures that make a
//! whole file unusable are returned as errors; individual bad rows are
//! skipped and reported.

mod lookup;
mod records;

pub use lookup::{load_group_names, read_group_names, GROUP_NAME_COLUMN, GROUP_NUMBER_COLUMN};
pub use records::{load_record_set, read_record_set, ColumnMap, LoadedRecords, SkippedRow};

/// Default file-name pattern for score tables.
pub const DEFAULT_FILE_PATTERN: &str = "{target}_{tag}_{score}_scores.csv";

/// Expand a score-table file-name pattern.
///
/// Recognised placeholders are `{target}`, `{tag}` and `{score}`.
pub fn score_file_name(pattern: &str, target: &str, tag: &str, score: &str) -> String {
    pattern
        .replace("{target}", target)
        .replace("{tag}", tag)
        .replace("{score}", score)
}
