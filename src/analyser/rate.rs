//! Arrival-rate statistics over one capture's timestamp sequence.
use super::containers::{CaptureStats, TimestampMicros};

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Derives count, duration, rate and mean inter-arrival time.
///
/// Timestamps are taken in row order. Unsorted input is not corrected, so a
/// capture whose last row predates its first yields a negative duration and a
/// rate of 0.
pub fn analyse_rate(timestamps: &[TimestampMicros]) -> CaptureStats {
    let packet_count = timestamps.len();

    let (first_timestamp, last_timestamp) = (timestamps.first().copied(), timestamps.last().copied());

    let duration_seconds = match (first_timestamp, last_timestamp) {
        (Some(first), Some(last)) if packet_count >= 2 => (last as i128 - first as i128) as f64 / MICROS_PER_SECOND,
        _ => 0.0,
    };

    let packet_rate = if duration_seconds > 0.0 {
        packet_count as f64 / duration_seconds
    } else {
        0.0
    };

    let avg_inter_arrival_micros = if packet_count >= 2 {
        let total: i128 = timestamps.windows(2).map(|w| w[1] as i128 - w[0] as i128).sum();
        total as f64 / (packet_count - 1) as f64
    } else {
        0.0
    };

    CaptureStats {
        packet_count,
        duration_seconds,
        packet_rate,
        avg_inter_arrival_micros,
        first_timestamp,
        last_timestamp,
    }
}
