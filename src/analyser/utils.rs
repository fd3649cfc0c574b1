//! Capture log loading.
//!
//! The timestamp column is strict: one bad row fails the whole file. The
//! identifier column is lenient: a blank or unparsable id only keeps that row
//! out of the identifier mapping.
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use super::containers::{CaptureLog, PacketId, TimestampMicros};
use crate::error::LoadError;

pub const DEFAULT_TIMESTAMP_COLUMN: &str = "Timestamp_us";
pub const DEFAULT_ID_COLUMN: &str = "ID";

/// Which header columns to read and how fields are separated.
#[derive(Clone, Debug)]
pub struct RowSchema {
    pub timestamp_column: String,
    pub id_column: String,
    pub delimiter: char,
}

impl Default for RowSchema {
    fn default() -> Self {
        Self {
            timestamp_column: DEFAULT_TIMESTAMP_COLUMN.to_string(),
            id_column: DEFAULT_ID_COLUMN.to_string(),
            delimiter: ',',
        }
    }
}

/// Column positions resolved from a header row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ColumnLayout {
    timestamp: usize,
    id: Option<usize>,
}

/// One validated row.
#[derive(Debug, PartialEq, Eq)]
struct Row {
    timestamp: TimestampMicros,
    id: Option<PacketId>,
}

impl RowSchema {
    fn resolve(&self, header: &str, path: &Path) -> Result<ColumnLayout, LoadError> {
        let position = |name: &str| header.split(self.delimiter).position(|col| col.trim() == name);

        let timestamp = position(&self.timestamp_column).ok_or_else(|| LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: self.timestamp_column.clone(),
        })?;

        Ok(ColumnLayout {
            timestamp,
            id: position(&self.id_column),
        })
    }

    fn parse_row(&self, layout: ColumnLayout, line: &str, line_no: usize, path: &Path) -> Result<Row, LoadError> {
        let fields: Vec<&str> = line.split(self.delimiter).map(str::trim).collect();

        let raw_ts = fields.get(layout.timestamp).copied().unwrap_or("");
        let timestamp = raw_ts.parse::<TimestampMicros>().map_err(|_| LoadError::MalformedTimestampRow {
            path: path.to_path_buf(),
            line: line_no,
            value: raw_ts.to_string(),
        })?;

        let id = match layout.id.and_then(|i| fields.get(i)) {
            Some(raw) if !raw.is_empty() => match raw.parse::<PacketId>() {
                Ok(id) => Some(id),
                Err(_) => {
                    log::debug!("{}:{line_no}: ignoring malformed id '{raw}'", path.display());
                    None
                }
            },
            _ => None,
        };

        Ok(Row { timestamp, id })
    }
}

/// Parses an already opened capture log.
///
/// `path` is only used for diagnostics. An input with no header at all is an
/// empty capture.
pub fn parse_log<R: BufRead>(reader: R, path: &Path, label: &str, schema: &RowSchema) -> Result<CaptureLog, LoadError> {
    let mut capture = CaptureLog::empty(label);
    let mut layout = None;

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let Some(columns) = layout else {
            layout = Some(schema.resolve(line, path)?);
            continue;
        };

        let row = schema.parse_row(columns, line, index + 1, path)?;
        capture.timestamps.push(row.timestamp);
        if let Some(id) = row.id {
            if capture.ids.insert(id, row.timestamp).is_some() {
                log::debug!("{}:{}: duplicate id {id}, keeping the later row", path.display(), index + 1);
            }
        }
    }

    if layout.is_some_and(|l| l.id.is_none()) {
        log::info!("{} has no '{}' column, no packets can be matched from it", path.display(), schema.id_column);
    }

    Ok(capture)
}

/// Loads one capture log from disk.
pub fn load_file(path: &Path, label: &str, schema: &RowSchema) -> Result<CaptureLog, LoadError> {
    log::info!("Loading {label} capture from {}", path.display());

    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::MissingSourceFile {
            path: path.to_path_buf(),
        },
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let capture = parse_log(BufReader::new(file), path, label, schema)?;
    log::info!("Read {} packets ({} with id) from {}", capture.timestamps.len(), capture.ids.len(), path.display());

    Ok(capture)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(input: &str) -> Result<CaptureLog, LoadError> {
        parse_log(Cursor::new(input), Path::new("test.csv"), "test", &RowSchema::default())
    }

    #[test]
    fn reads_timestamps_in_row_order_and_ids() {
        let log = parse("Timestamp_us,ID\n300,3\n100,1\n200,2\n").unwrap();
        assert_eq!(log.timestamps, vec![300, 100, 200]);
        assert_eq!(log.ids.len(), 3);
        assert_eq!(log.ids[&1], 100);
        assert_eq!(log.label, "test");
    }

    #[test]
    fn bad_id_keeps_timestamp_but_not_mapping() {
        let log = parse("Timestamp_us,ID\n100,1\n200,abc\n300,\n400,-4\n").unwrap();
        assert_eq!(log.timestamps, vec![100, 200, 300, 400]);
        assert_eq!(log.ids.len(), 1);
        assert!(log.ids.contains_key(&1));
    }

    #[test]
    fn bad_timestamp_fails_the_load() {
        let err = parse("Timestamp_us,ID\n100,1\nnope,2\n").unwrap_err();
        match err {
            LoadError::MalformedTimestampRow { line, value, .. } => {
                assert_eq!(line, 3);
                assert_eq!(value, "nope");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn short_row_is_a_malformed_timestamp() {
        let err = parse("ID,Timestamp_us\n1\n").unwrap_err();
        assert!(matches!(err, LoadError::MalformedTimestampRow { line: 2, .. }));
    }

    #[test]
    fn header_without_timestamp_column_fails() {
        let err = parse("Time,ID\n1,2\n").unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { ref column, .. } if column == "Timestamp_us"));
    }

    #[test]
    fn header_without_id_column_yields_empty_mapping() {
        let log = parse("Timestamp_us,Source MAC,Destination MAC\n10,aa,bb\n20,cc,dd\n").unwrap();
        assert_eq!(log.timestamps, vec![10, 20]);
        assert!(log.ids.is_empty());
    }

    #[test]
    fn trims_fields_and_skips_blank_lines() {
        let log = parse("Timestamp_us , ID\r\n\r\n 5 , 7 \r\n\n6,8\n").unwrap();
        assert_eq!(log.timestamps, vec![5, 6]);
        assert_eq!(log.ids[&7], 5);
        assert_eq!(log.ids[&8], 6);
    }

    #[test]
    fn empty_input_is_an_empty_capture() {
        let log = parse("").unwrap();
        assert!(log.timestamps.is_empty());
        assert!(log.ids.is_empty());
    }

    #[test]
    fn duplicate_id_keeps_later_row() {
        let log = parse("Timestamp_us,ID\n100,1\n150,1\n").unwrap();
        assert_eq!(log.timestamps, vec![100, 150]);
        assert_eq!(log.ids[&1], 150);
    }

    #[test]
    fn custom_delimiter_and_columns() {
        let schema = RowSchema {
            timestamp_column: "ts".into(),
            id_column: "seq".into(),
            delimiter: ';',
        };
        let log = parse_log(Cursor::new("seq;ts\n9;1000\n"), Path::new("x"), "x", &schema).unwrap();
        assert_eq!(log.timestamps, vec![1000]);
        assert_eq!(log.ids[&9], 1000);
    }

    #[test]
    fn missing_file_is_recoverable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("absent.csv"), "a", &RowSchema::default()).unwrap_err();
        assert!(matches!(err, LoadError::MissingSourceFile { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(&path, "Timestamp_us,ID\n1000000,1\n2000000,2\n").unwrap();

        let log = load_file(&path, "disk", &RowSchema::default()).unwrap();
        assert_eq!(log.timestamps, vec![1_000_000, 2_000_000]);
        assert_eq!(log.ids.len(), 2);
    }
}
