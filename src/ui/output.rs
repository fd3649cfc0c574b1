use crate::analyser::containers::{CaptureStats, ComparisonReport, DelaySummary, SourceReport, SourceStatus};
use ansi_term::Colour;
use chrono::DateTime;
use std::fmt::{self, Write as _};
use std::path::Path;

const BAR: &str = "\u{2503}";

/// Applies a colour only when enabled by [`use_colour`].
struct Painter {
    colour: bool,
}

impl Painter {
    fn paint(&self, colour: Colour, text: impl ToString) -> String {
        if self.colour {
            colour.paint(text.to_string()).to_string()
        } else {
            text.to_string()
        }
    }
}

/// Colour only for a report printed straight to a terminal.
pub fn use_colour(to_file: bool, stdout_is_terminal: bool) -> bool {
    !to_file && stdout_is_terminal
}

/// Renders the report as human-readable text.
///
/// `list_ids` adds every matched id with its delay and the unmatched ids per side.
pub fn render_text(report: &ComparisonReport, list_ids: bool, colour: bool) -> String {
    let p = Painter { colour };
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = render_report(&mut out, &p, report, list_ids);

    out
}

fn render_report(out: &mut String, p: &Painter, report: &ComparisonReport, list_ids: bool) -> fmt::Result {
    writeln!(out, "\n\u{250F}\u{2501}\u{2501}\u{2501}\u{2501} Results")?;
    render_source(out, p, &report.first)?;
    render_source(out, p, &report.second)?;
    render_comparison(out, p, report)?;
    render_matches(out, p, report, list_ids)?;
    writeln!(out, "\u{2517}\u{2501}\u{2501}\u{2501}\u{2501}")
}

fn row(out: &mut String, name: &str, value: impl fmt::Display) -> fmt::Result {
    writeln!(out, "{BAR} {name:<26}: {value}")
}

fn render_source(out: &mut String, p: &Painter, source: &SourceReport) -> fmt::Result {
    let status = match source.status {
        SourceStatus::Loaded => p.paint(Colour::Green, &source.status),
        SourceStatus::Missing => p.paint(Colour::Yellow, &source.status),
        SourceStatus::Failed { .. } => p.paint(Colour::Red, &source.status),
    };
    let stats: &CaptureStats = &source.stats;

    writeln!(out, "{BAR}")?;
    writeln!(out, "{BAR} Capture {} ({})", p.paint(Colour::Red, &source.label), source.path)?;
    row(out, "Status", status)?;
    row(out, "Total Packets", p.paint(Colour::Fixed(226), stats.packet_count))?;
    row(out, "Capture Duration", format!("{:.2} seconds", stats.duration_seconds))?;
    row(out, "Packet Rate", format!("{:.2} packets/sec", stats.packet_rate))?;
    row(out, "Avg Time Between Packets", format!("{:.2} \u{b5}s", stats.avg_inter_arrival_micros))?;
    if let (Some(first), Some(last)) = (stats.first_timestamp, stats.last_timestamp) {
        row(out, "First Packet", wall_clock(first))?;
        row(out, "Last Packet", wall_clock(last))?;
    }
    Ok(())
}

fn render_comparison(out: &mut String, p: &Painter, report: &ComparisonReport) -> fmt::Result {
    let (first, second) = (&report.first.label, &report.second.label);

    writeln!(out, "{BAR}")?;
    writeln!(out, "{BAR} {}", p.paint(Colour::Cyan, "Comparison Summary"))?;
    if !report.both_populated() {
        writeln!(out, "{BAR} {}", p.paint(Colour::Red, "Could not analyze packets correctly."))?;
    }
    writeln!(out, "{BAR} {first} captured {} more packets than {second}.", report.count_difference)?;
    match report.rate_ratio {
        Some(ratio) => writeln!(out, "{BAR} {first} packet rate is {ratio:.2} times that of {second}."),
        None => writeln!(out, "{BAR} Rate ratio undefined: {second} packet rate is 0."),
    }
}

fn render_matches(out: &mut String, p: &Painter, report: &ComparisonReport, list_ids: bool) -> fmt::Result {
    let (first, second) = (&report.first.label, &report.second.label);
    let matches = &report.matches;

    writeln!(out, "{BAR}")?;
    writeln!(out, "{BAR} {}", p.paint(Colour::Cyan, "Packet ID Match Analysis"))?;
    row(out, &format!("{first} Packets with ID"), report.first.ids_seen)?;
    row(out, &format!("{second} Packets with ID"), report.second.ids_seen)?;
    row(out, "Matched Packet IDs", matches.matched.len())?;
    row(out, "Unmatched IDs", matches.unmatched.len())?;

    match report.delay {
        DelaySummary::NoSamples => {
            writeln!(out, "{BAR} {}", p.paint(Colour::Yellow, "No common packet IDs found to compare delays."))?;
        }
        DelaySummary::Samples { average, min, max, .. } => {
            writeln!(out, "{BAR}")?;
            writeln!(out, "{BAR} Delay ({second} - {first}) [in \u{b5}s]:")?;
            row(out, "Average Delay", format!("{average:.2} \u{b5}s"))?;
            row(out, "Minimum Delay", format!("{min} \u{b5}s"))?;
            row(out, "Maximum Delay", format!("{max} \u{b5}s"))?;
        }
    }

    if !list_ids {
        return Ok(());
    }

    if !matches.delays.is_empty() {
        writeln!(out, "{BAR}")?;
        writeln!(out, "{BAR} Per-ID Delays")?;
        for (id, delay) in &matches.delays {
            writeln!(out, "{BAR}   {id:>10} : {delay} \u{b5}s")?;
        }
    }
    for (label, ids) in [(first, &matches.only_in_first), (second, &matches.only_in_second)] {
        if ids.is_empty() {
            continue;
        }
        let list: Vec<String> = ids.iter().map(u64::to_string).collect();
        writeln!(out, "{BAR} Only in {label}: {}", list.join(", "))?;
    }
    Ok(())
}

/// Capture tools stamp packets with wall-clock microseconds since the epoch.
fn wall_clock(micros: i64) -> String {
    let secs = micros.div_euclid(1_000_000);
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;

    match DateTime::from_timestamp(secs, nanos) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S%.6f UTC").to_string(),
        None => format!("{micros} \u{b5}s"),
    }
}

pub fn data_as_json(report: &ComparisonReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

pub fn data_to_file(data: &str, path: &Path) -> std::io::Result<()> {
    std::fs::write(path, data)
}
