//! Higher-timeframe bar aggregation.
//!
//! Buckets are left-closed, `window` wide and aligned to the Unix epoch
//! (UTC midnight, 1970-01-01), so two runs over overlapping data always agree
//! on bucket boundaries. Each output bar is stamped with its bucket start.

use crate::domain::bar::{is_strictly_ordered, Bar, BarSeries};
use crate::domain::error::ScanError;
use chrono::{DateTime, Duration, Utc};
use std::borrow::Cow;

/// Start of the epoch-aligned bucket containing `timestamp`.
pub fn bucket_start(
    timestamp: DateTime<Utc>,
    window: Duration,
) -> Result<DateTime<Utc>, ScanError> {
    let width = window_millis(window)?;
    let start = timestamp.timestamp_millis().div_euclid(width) * width;
    DateTime::from_timestamp_millis(start)
        .ok_or_else(|| ScanError::invalid("timestamp", "bucket start out of range"))
}

fn window_millis(window: Duration) -> Result<i64, ScanError> {
    let width = window.num_milliseconds();
    if width <= 0 {
        return Err(ScanError::invalid(
            "target_window",
            format!("must be a positive duration, got {}ms", width),
        ));
    }
    Ok(width)
}

/// Collapses `bars` into `window`-wide buckets.
///
/// Input that is not strictly ordered is sorted (and deduplicated) on a copy;
/// the caller's bars are never touched. Empty buckets produce no bar.
pub fn aggregate(bars: &[Bar], window: Duration) -> Result<BarSeries, ScanError> {
    let width = window_millis(window)?;

    let ordered: Cow<'_, [Bar]> = if is_strictly_ordered(bars) {
        Cow::Borrowed(bars)
    } else {
        Cow::Owned(BarSeries::new(bars.to_vec()).into_inner())
    };

    let mut aggregated: Vec<Bar> = Vec::new();
    let mut current: Option<(i64, Bar)> = None;

    for bar in ordered.iter() {
        let key = bar.timestamp.timestamp_millis().div_euclid(width);

        if let Some((_, agg)) = current.as_mut().filter(|(k, _)| *k == key) {
            agg.high = agg.high.max(bar.high);
            agg.low = agg.low.min(bar.low);
            agg.close = bar.close;
            agg.volume = match (agg.volume, bar.volume) {
                (Some(a), Some(b)) => Some(a + b),
                (a, b) => a.or(b),
            };
            continue;
        }

        if let Some((_, done)) = current.take() {
            aggregated.push(done);
        }
        let start = DateTime::from_timestamp_millis(key * width)
            .ok_or_else(|| ScanError::invalid("timestamp", "bucket start out of range"))?;
        current = Some((
            key,
            Bar::new(start, bar.open, bar.high, bar.low, bar.close, bar.volume),
        ));
    }

    if let Some((_, done)) = current {
        aggregated.push(done);
    }

    Ok(BarSeries::new(aggregated))
}
