use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Microseconds, as stamped by the capture tool.
pub type TimestampMicros = i64;
pub type PacketId = u64;

/// One parsed capture log. Built once per run and never mutated afterwards.
#[derive(Clone, Debug, Default)]
pub struct CaptureLog {
    pub label: String,
    /// File row order, not necessarily sorted.
    pub timestamps: Vec<TimestampMicros>,
    /// Rows without a usable identifier are absent here but still present in `timestamps`.
    pub ids: HashMap<PacketId, TimestampMicros>,
}

impl CaptureLog {
    pub fn empty(label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CaptureStats {
    pub packet_count: usize,
    pub duration_seconds: f64,
    pub packet_rate: f64,
    pub avg_inter_arrival_micros: f64,
    pub first_timestamp: Option<TimestampMicros>,
    pub last_timestamp: Option<TimestampMicros>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub matched: BTreeSet<PacketId>,
    pub unmatched: BTreeSet<PacketId>,
    /// The two halves of `unmatched`.
    pub only_in_first: BTreeSet<PacketId>,
    pub only_in_second: BTreeSet<PacketId>,
    /// `second - first`, defined only for `matched` ids.
    pub delays: BTreeMap<PacketId, i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DelaySummary {
    NoSamples,
    Samples {
        count: usize,
        average: f64,
        min: i64,
        max: i64,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    Loaded,
    Missing,
    Failed { reason: String },
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SourceStatus::Loaded => write!(f, "loaded"),
            SourceStatus::Missing => write!(f, "missing"),
            SourceStatus::Failed { reason } => write!(f, "failed ({reason})"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SourceReport {
    pub label: String,
    pub path: String,
    pub status: SourceStatus,
    pub stats: CaptureStats,
    /// Number of rows that made it into the identifier mapping.
    pub ids_seen: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub first: SourceReport,
    pub second: SourceReport,
    /// `first.packet_count - second.packet_count`
    pub count_difference: i64,
    /// `first.packet_rate / second.packet_rate`, absent when the second rate is 0.
    pub rate_ratio: Option<f64>,
    pub matches: MatchResult,
    pub delay: DelaySummary,
}

impl ComparisonReport {
    /// Both captures contributed at least one packet.
    pub fn both_populated(&self) -> bool {
        self.first.stats.packet_count > 0 && self.second.stats.packet_count > 0
    }

    pub fn any_failed(&self) -> bool {
        matches!(self.first.status, SourceStatus::Failed { .. })
            || matches!(self.second.status, SourceStatus::Failed { .. })
    }
}
