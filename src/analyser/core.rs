use std::path::PathBuf;

use super::containers::{CaptureLog, ComparisonReport, SourceReport, SourceStatus};
use super::utils::{self, RowSchema};
use super::{delay, matching, rate};

/// Where one capture comes from and what to call it in the report.
#[derive(Clone, Debug)]
pub struct SourceSpec {
    pub label: String,
    pub path: PathBuf,
}

impl SourceSpec {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

/// A loaded (or degraded) capture, ready to be compared.
#[derive(Debug)]
pub struct LoadedSource {
    pub spec: SourceSpec,
    pub log: CaptureLog,
    pub status: SourceStatus,
}

/// Loads a source, degrading to an empty capture on any failure.
///
/// A missing file is a warning; anything else is an error for this source
/// only and is recorded in the returned status.
pub fn load_source(spec: &SourceSpec, schema: &RowSchema) -> LoadedSource {
    let (capture, status) = match utils::load_file(&spec.path, &spec.label, schema) {
        Ok(capture) => (capture, SourceStatus::Loaded),
        Err(err) if err.is_recoverable() => {
            log::warn!("Error: {err}");
            (CaptureLog::empty(&spec.label), SourceStatus::Missing)
        }
        Err(err) => {
            log::error!("Could not load {} capture: {err}", spec.label);
            (
                CaptureLog::empty(&spec.label),
                SourceStatus::Failed {
                    reason: err.to_string(),
                },
            )
        }
    };

    LoadedSource {
        spec: spec.clone(),
        log: capture,
        status,
    }
}

fn source_report(source: &LoadedSource) -> SourceReport {
    SourceReport {
        label: source.log.label.clone(),
        path: source.spec.path.display().to_string(),
        status: source.status.clone(),
        stats: rate::analyse_rate(&source.log.timestamps),
        ids_seen: source.log.ids.len(),
    }
}

/// Joins both captures into one comparison. Performs no I/O.
pub fn assemble(first: &LoadedSource, second: &LoadedSource) -> ComparisonReport {
    log::info!("Assembling comparison of {} and {}.", first.spec.label, second.spec.label);

    let first_report = source_report(first);
    let second_report = source_report(second);

    let count_difference = first_report.stats.packet_count as i64 - second_report.stats.packet_count as i64;
    let rate_ratio = if second_report.stats.packet_rate > 0.0 {
        Some(first_report.stats.packet_rate / second_report.stats.packet_rate)
    } else {
        None
    };

    let matches = matching::match_ids(&first.log.ids, &second.log.ids);
    let delay = delay::summarise(matches.delays.values().copied());

    ComparisonReport {
        first: first_report,
        second: second_report,
        count_difference,
        rate_ratio,
        matches,
        delay,
    }
}

/// Loads both captures and compares them. Never aborts on a single bad source.
pub fn analyse(first: &SourceSpec, second: &SourceSpec, schema: &RowSchema) -> ComparisonReport {
    log::info!("Starting analysis.");

    let first = load_source(first, schema);
    let second = load_source(second, schema);

    assemble(&first, &second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyser::containers::DelaySummary;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> SourceSpec {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        SourceSpec::new(name, path)
    }

    #[test]
    fn compares_two_captures() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(&dir, "a.csv", "Timestamp_us,ID\n1000000,1\n2000000,2\n4000000,3\n");
        let b = write(&dir, "b.csv", "Timestamp_us,ID\n1000000,2\n3000000,3\n4000000,4\n5000000,x\n");

        let report = analyse(&a, &b, &RowSchema::default());

        assert_eq!(report.first.status, SourceStatus::Loaded);
        assert_eq!(report.first.stats.packet_count, 3);
        assert_eq!(report.first.stats.packet_rate, 1.0);
        assert_eq!(report.second.stats.packet_count, 4);
        assert_eq!(report.second.ids_seen, 3);
        assert_eq!(report.count_difference, -1);
        assert_eq!(report.rate_ratio, Some(1.0));
        assert_eq!(report.matches.matched.len(), 2);
        assert_eq!(report.matches.unmatched.len(), 2);
        assert_eq!(
            report.delay,
            DelaySummary::Samples {
                count: 2,
                average: -1_000_000.0,
                min: -1_000_000,
                max: -1_000_000,
            }
        );
    }

    #[test]
    fn missing_file_degrades_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(&dir, "a.csv", "Timestamp_us,ID\n1,1\n2,2\n");
        let b = SourceSpec::new("b", dir.path().join("absent.csv"));

        let report = analyse(&a, &b, &RowSchema::default());

        assert_eq!(report.first.stats.packet_count, 2);
        assert_eq!(report.second.status, SourceStatus::Missing);
        assert_eq!(report.second.stats.packet_count, 0);
        assert_eq!(report.rate_ratio, None);
        assert_eq!(report.delay, DelaySummary::NoSamples);
        assert!(!report.both_populated());
        assert!(!report.any_failed());
    }

    #[test]
    fn malformed_timestamp_fails_only_that_source() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(&dir, "a.csv", "Timestamp_us,ID\n1,1\nbad,2\n");
        let b = write(&dir, "b.csv", "Timestamp_us,ID\n0,1\n2000000,2\n");

        let report = analyse(&a, &b, &RowSchema::default());

        assert!(matches!(report.first.status, SourceStatus::Failed { .. }));
        assert_eq!(report.first.stats.packet_count, 0);
        assert_eq!(report.second.stats.packet_count, 2);
        assert_eq!(report.second.stats.packet_rate, 1.0);
        assert_eq!(report.rate_ratio, Some(0.0));
        assert!(report.any_failed());
    }

    #[test]
    fn non_numeric_id_still_counts_toward_rate() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(&dir, "a.csv", "Timestamp_us,ID\n0,1\n1000000,oops\n");
        let b = write(&dir, "b.csv", "Timestamp_us,ID\n0,1\n");

        let report = analyse(&a, &b, &RowSchema::default());

        assert_eq!(report.first.stats.packet_count, 2);
        assert_eq!(report.first.stats.duration_seconds, 1.0);
        assert_eq!(report.first.stats.packet_rate, 2.0);
        assert_eq!(report.first.ids_seen, 1);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let dir = tempfile::tempdir().unwrap();
        let ids: String = (0..200).map(|i| format!("{},{}\n", i * 37, (i * 7919) % 1000)).collect();
        let a = write(&dir, "a.csv", &format!("Timestamp_us,ID\n{ids}"));
        let b = write(&dir, "b.csv", &format!("ID,Timestamp_us\n{ids}"));

        let first = serde_json::to_string(&analyse(&a, &b, &RowSchema::default())).unwrap();
        let second = serde_json::to_string(&analyse(&a, &b, &RowSchema::default())).unwrap();
        assert_eq!(first, second);
    }
}
