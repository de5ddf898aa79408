//! Group-name lookup table loader.
//!
//! Expects a CSV with `Group Number` and `Group Name` columns. Numbers are
//! normalized like any other group label, so `14`, `014` and `TS014` all map
//! to the same entry.

use std::io::Read;
use std::path::Path;

use crate::error::{Result, TwoStateError};
use crate::model::GroupNameLookup;

pub const GROUP_NUMBER_COLUMN: &str = "Group Number";
pub const GROUP_NAME_COLUMN: &str = "Group Name";

/// Load the lookup table from disk.
pub fn load_group_names(path: &Path) -> Result<GroupNameLookup> {
    let file = std::fs::File::open(path).map_err(|e| TwoStateError::io(path, e))?;
    read_group_names(file, &path.display().to_string())
}

/// Load the lookup table from any reader.
pub fn read_group_names<R: Read>(reader: R, source: &str) -> Result<GroupNameLookup> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| TwoStateError::missing_column(source, name, &headers))
    };
    let number_idx = column(GROUP_NUMBER_COLUMN)?;
    let name_idx = column(GROUP_NAME_COLUMN)?;

    let mut lookup = GroupNameLookup::new();
    for row in reader.byte_records() {
        let row = match row {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                tracing::warn!(source, "skipping lookup row: {e}");
                continue;
            }
        };
        let (Some(number), Some(name)) = (row.get(number_idx), row.get(name_idx)) else {
            continue;
        };
        let (Ok(number), Ok(name)) = (std::str::from_utf8(number), std::str::from_utf8(name))
        else {
            let line = row.position().map_or(0, csv::Position::line);
            tracing::warn!(source, line, "skipping lookup row with invalid UTF-8");
            continue;
        };
        if !lookup.insert(number, name) {
            tracing::debug!(source, number, "ignoring lookup row without a group number");
        }
    }

    tracing::debug!(source, groups = lookup.len(), "loaded group names");
    Ok(lookup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GroupId;

    #[test]
    fn test_read_group_names() {
        let csv = "Group Number,Group Name\n14,  Kihara \n304,AF3-server\n-,header junk\n";
        let lookup = read_group_names(csv.as_bytes(), "inline").unwrap();

        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.resolve_name(&GroupId::normalize("TS014").unwrap()), "Kihara");
        assert_eq!(lookup.resolve_name(&GroupId::normalize("304").unwrap()), "AF3-server");
        assert_eq!(lookup.resolve_name(&GroupId::normalize("1").unwrap()), "Unknown");
    }

    #[test]
    fn test_undecodable_row_does_not_drop_the_table() {
        let bytes: &[u8] = b"Group Number,Group Name\n14,Kihara\n27,Bad\xfeName\n304,AF3-server\n";
        let lookup = read_group_names(bytes, "inline").unwrap();

        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.resolve_name(&GroupId::normalize("304").unwrap()), "AF3-server");
        assert_eq!(lookup.resolve_name(&GroupId::normalize("27").unwrap()), "Unknown");
    }

    #[test]
    fn test_missing_name_column() {
        let err = read_group_names("Group Number\n14\n".as_bytes(), "inline").unwrap_err();
        assert!(err.to_string().contains("Failed to ingest"));
    }
}
