use super::containers::DelaySummary;

/// Summarises delay samples. No samples is its own outcome, never an average of 0.
pub fn summarise<I>(delays: I) -> DelaySummary
where
    I: IntoIterator<Item = i64>,
{
    let mut count = 0usize;
    let mut total: i128 = 0;
    let mut min = i64::MAX;
    let mut max = i64::MIN;

    for delay in delays {
        count += 1;
        total += delay as i128;
        min = min.min(delay);
        max = max.max(delay);
    }

    if count == 0 {
        return DelaySummary::NoSamples;
    }

    DelaySummary::Samples {
        count,
        average: total as f64 / count as f64,
        min,
        max,
    }
}
