//! Request metrics collection and reporting
//!
//! Tracks latency percentiles, failures and rate-limit hits per dataset.

use crate::types::Dataset;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::RwLock;

/// Maximum number of samples kept per dataset for percentile calculation
const MAX_SAMPLES: usize = 100;

/// How a fetch operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    RateLimited,
}

/// Metrics for one dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetMetrics {
    pub dataset: Dataset,
    /// 50th percentile latency of successful fetches in milliseconds
    pub latency_p50_ms: f64,
    /// 99th percentile latency of successful fetches in milliseconds
    pub latency_p99_ms: f64,
    /// Success rate (0.0 to 1.0)
    pub success_rate: f64,
    pub total_requests: u64,
    /// Includes rate-limited requests
    pub failed_requests: u64,
    pub rate_limited_requests: u64,
}

impl DatasetMetrics {
    /// Creates metrics with no data
    pub fn empty(dataset: Dataset) -> Self {
        Self {
            dataset,
            latency_p50_ms: 0.0,
            latency_p99_ms: 0.0,
            success_rate: 1.0,
            total_requests: 0,
            failed_requests: 0,
            rate_limited_requests: 0,
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    samples: VecDeque<f64>,
    total: u64,
    failed: u64,
    rate_limited: u64,
}

/// Collects and computes metrics for fetch operations
#[derive(Debug, Default)]
pub struct MetricsCollector {
    by_dataset: RwLock<HashMap<Dataset, Counters>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one fetch operation with its duration and outcome
    pub async fn record(&self, dataset: Dataset, duration: Duration, outcome: Outcome) {
        let mut by_dataset = self.by_dataset.write().await;
        let counters = by_dataset.entry(dataset).or_default();

        counters.total += 1;
        match outcome {
            Outcome::Success => {
                if counters.samples.len() >= MAX_SAMPLES {
                    counters.samples.pop_front();
                }
                counters.samples.push_back(duration.as_secs_f64() * 1000.0);
            }
            Outcome::Failure => counters.failed += 1,
            Outcome::RateLimited => {
                counters.failed += 1;
                counters.rate_limited += 1;
            }
        }
    }

    /// Computes current metrics for one dataset
    pub async fn snapshot(&self, dataset: Dataset) -> DatasetMetrics {
        let by_dataset = self.by_dataset.read().await;
        let Some(counters) = by_dataset.get(&dataset) else {
            return DatasetMetrics::empty(dataset);
        };

        let mut latencies: Vec<f64> = counters.samples.iter().copied().collect();
        latencies.sort_by(|a, b| a.total_cmp(b));

        let success_rate = if counters.total > 0 {
            (counters.total - counters.failed) as f64 / counters.total as f64
        } else {
            1.0
        };

        DatasetMetrics {
            dataset,
            latency_p50_ms: percentile(&latencies, 50.0),
            latency_p99_ms: percentile(&latencies, 99.0),
            success_rate,
            total_requests: counters.total,
            failed_requests: counters.failed,
            rate_limited_requests: counters.rate_limited,
        }
    }
}

/// Calculate percentile from sorted values
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let idx = (p / 100.0 * (sorted_values.len() - 1) as f64).round() as usize;
    sorted_values[idx.min(sorted_values.len() - 1)]
}
