//! Time series summaries for charts

use crate::types::PricePoint;
use serde::Serialize;

/// Headline figures of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub first: PricePoint,
    pub last: PricePoint,
    pub min: f64,
    pub max: f64,
    /// Change from first to last value in percent; `None` when the first value is zero
    pub change_pct: Option<f64>,
}

/// Summarizes a series, `None` when it has no points
pub fn summarize(points: &[PricePoint]) -> Option<SeriesSummary> {
    let first = *points.first()?;
    let last = *points.last()?;

    let (min, max) = points
        .iter()
        .map(|p| p.value)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    let change_pct = if first.value != 0.0 {
        Some((last.value - first.value) / first.value * 100.0)
    } else {
        None
    };

    Some(SeriesSummary {
        first,
        last,
        min,
        max,
        change_pct,
    })
}

/// Picks at most `max_points` evenly spaced points, always keeping both ends
pub fn downsample(points: &[PricePoint], max_points: usize) -> Vec<PricePoint> {
    if points.len() <= max_points {
        return points.to_vec();
    }
    match max_points {
        0 => Vec::new(),
        1 => points.last().copied().into_iter().collect(),
        _ => {
            let span = (points.len() - 1) as f64 / (max_points - 1) as f64;
            (0..max_points)
                .map(|i| points[((i as f64 * span).round() as usize).min(points.len() - 1)])
                .collect()
        }
    }
}
