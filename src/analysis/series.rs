/// Time-series helpers for metric cards and charts.
///
/// Everything here is pure. Functions that depend on the current time take
/// it as a `now` parameter (`*_at`) so tests stay deterministic.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::model::{Sample, StationReading, Trend, sort_by_time};

/// Relative change beyond which a series counts as rising or falling.
pub const TREND_THRESHOLD: f64 = 0.10;

/// Largest gap accepted when pairing a secondary sample with a primary
/// timestamp.
pub const MAX_ALIGNMENT_GAP_HOURS: i64 = 4;

// ---------------------------------------------------------------------------
// Latest value and trend
// ---------------------------------------------------------------------------

/// The sample with the greatest timestamp. Input need not be sorted.
pub fn latest(samples: &[Sample]) -> Option<Sample> {
    samples.iter().copied().max_by_key(|s| s.time)
}

/// Classifies the last 24 hours of a series relative to `now`.
///
/// The reference is the most recent sample at or before `now - 24h`; when
/// the series doesn't reach back that far, the oldest sample is used.
/// Fewer than two samples, or a reference of exactly zero, is `Stable`.
pub fn trend_at(samples: &[Sample], now: DateTime<Utc>) -> Trend {
    if samples.len() < 2 {
        return Trend::Stable;
    }
    let Some(current) = latest(samples) else {
        return Trend::Stable;
    };

    let cutoff = now - Duration::hours(24);
    let reference = samples
        .iter()
        .filter(|s| s.time <= cutoff)
        .max_by_key(|s| s.time)
        .or_else(|| samples.iter().min_by_key(|s| s.time));

    let Some(reference) = reference else {
        return Trend::Stable;
    };
    if reference.value == 0.0 {
        return Trend::Stable;
    }

    let change = (current.value - reference.value) / reference.value.abs();
    if change > TREND_THRESHOLD {
        Trend::Rising
    } else if change < -TREND_THRESHOLD {
        Trend::Falling
    } else {
        Trend::Stable
    }
}

// ---------------------------------------------------------------------------
// Downsampling
// ---------------------------------------------------------------------------

/// Decimates `samples` to at most `max_points` by keeping every Nth sample,
/// N = ceil(len / max_points), starting with the first. Order is preserved.
/// A series that already fits is returned unchanged.
pub fn downsample(samples: &[Sample], max_points: usize) -> Vec<Sample> {
    if samples.len() <= max_points {
        return samples.to_vec();
    }
    if max_points == 0 {
        return Vec::new();
    }
    let step = samples.len().div_ceil(max_points);
    samples.iter().step_by(step).copied().collect()
}

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

/// For each primary timestamp, the value of the secondary sample nearest in
/// time, or `None` when the nearest is `MAX_ALIGNMENT_GAP_HOURS` or more away.
pub fn align_nearest(primary: &[Sample], secondary: &[Sample]) -> Vec<Option<f64>> {
    let mut sorted = secondary.to_vec();
    sort_by_time(&mut sorted);
    let max_gap = Duration::hours(MAX_ALIGNMENT_GAP_HOURS);

    primary
        .iter()
        .map(|p| {
            let idx = sorted.partition_point(|s| s.time < p.time);
            let before = idx.checked_sub(1).and_then(|i| sorted.get(i));
            let after = sorted.get(idx);
            let nearest = match (before, after) {
                (Some(b), Some(a)) => {
                    if (p.time - b.time) <= (a.time - p.time) { Some(b) } else { Some(a) }
                }
                (b, a) => b.or(a),
            }?;
            let gap = (nearest.time - p.time).abs();
            (gap < max_gap).then_some(nearest.value)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Chart view
// ---------------------------------------------------------------------------

/// Chart-ready series for one station: discharge sorted and downsampled,
/// water temperature aligned to the discharge timestamps, forecast sorted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub discharge: Vec<Sample>,
    pub water_temp: Vec<Option<f64>>,
    pub forecast: Vec<Sample>,
}

pub fn chart_view(reading: &StationReading, max_points: usize) -> ChartView {
    let sorted = reading.series.sorted();
    let discharge = downsample(&sorted.discharge, max_points);
    let water_temp = align_nearest(&discharge, &sorted.water_temp);
    let forecast = downsample(&sorted.forecast, max_points);
    ChartView { discharge, water_temp, forecast }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
