//! Prediction statistics tracked in-process and logged periodically.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector shared by every presentation surface
pub struct PredictionMetrics {
    /// Predictions served
    pub predictions: AtomicU64,
    /// Predicted passes
    pub passes: AtomicU64,
    /// Submissions rejected before prediction
    pub rejected: AtomicU64,
    /// Predictions that errored
    pub failures: AtomicU64,
    /// Predictions by surface ("web", "nats")
    by_surface: RwLock<HashMap<String, u64>>,
    /// Latencies (in microseconds)
    latencies: RwLock<Vec<u64>>,
    /// Pass probability distribution buckets
    probability_buckets: RwLock<[u64; 10]>,
    start_time: Instant,
}

impl PredictionMetrics {
    pub fn new() -> Self {
        Self {
            predictions: AtomicU64::new(0),
            passes: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            by_surface: RwLock::new(HashMap::new()),
            latencies: RwLock::new(Vec::with_capacity(1000)),
            probability_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a served prediction
    pub fn record_prediction(&self, surface: &str, latency: Duration, probability: f64, passed: bool) {
        self.predictions.fetch_add(1, Ordering::Relaxed);
        if passed {
            self.passes.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut by_surface) = self.by_surface.write() {
            *by_surface.entry(surface.to_string()).or_insert(0) += 1;
        }

        if let Ok(mut latencies) = self.latencies.write() {
            latencies.push(latency.as_micros() as u64);
            // Keep only the most recent samples
            if latencies.len() > 10000 {
                latencies.drain(0..5000);
            }
        }

        let bucket = (probability.clamp(0.0, 1.0) * 10.0).min(9.0) as usize;
        if let Ok(mut buckets) = self.probability_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    /// Record a submission rejected by validation
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a prediction error
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Latency statistics
    pub fn latency_stats(&self) -> LatencyStats {
        let latencies = match self.latencies.read() {
            Ok(latencies) => latencies,
            Err(_) => return LatencyStats::default(),
        };
        if latencies.is_empty() {
            return LatencyStats::default();
        }

        let mut sorted = latencies.clone();
        sorted.sort_unstable();

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p99_us: sorted[((count as f64 * 0.99) as usize).min(count - 1)],
            max_us: sorted[count - 1],
        }
    }

    /// Point-in-time view of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            predictions: self.predictions.load(Ordering::Relaxed),
            passes: self.passes.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            by_surface: self
                .by_surface
                .read()
                .map(|m| m.clone())
                .unwrap_or_default(),
            probability_distribution: self
                .probability_buckets
                .read()
                .map(|b| *b)
                .unwrap_or_default(),
            latency: self.latency_stats(),
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log summary statistics
    pub fn print_summary(&self) {
        let snapshot = self.snapshot();
        let pass_rate = if snapshot.predictions > 0 {
            (snapshot.passes as f64 / snapshot.predictions as f64) * 100.0
        } else {
            0.0
        };

        info!(
            predictions = snapshot.predictions,
            passes = snapshot.passes,
            pass_rate = format!("{:.1}%", pass_rate),
            rejected = snapshot.rejected,
            failures = snapshot.failures,
            latency_mean_us = snapshot.latency.mean_us,
            latency_p99_us = snapshot.latency.p99_us,
            uptime_secs = snapshot.uptime_secs,
            "Prediction summary"
        );

        let total: u64 = snapshot.probability_distribution.iter().sum();
        if total > 0 {
            for (i, &count) in snapshot.probability_distribution.iter().enumerate() {
                let pct = (count as f64 / total as f64) * 100.0;
                let bar = "█".repeat(((pct / 5.0) as usize).min(20));
                info!(
                    "  p(pass) {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                    i as f64 / 10.0,
                    (i + 1) as f64 / 10.0,
                    count,
                    pct,
                    bar
                );
            }
        }
    }
}

impl Default for PredictionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Latency statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Serializable metrics view
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub predictions: u64,
    pub passes: u64,
    pub rejected: u64,
    pub failures: u64,
    pub by_surface: HashMap<String, u64>,
    pub probability_distribution: [u64; 10],
    pub latency: LatencyStats,
    pub uptime_secs: u64,
}

/// Periodically logs a metrics summary
pub struct MetricsReporter {
    metrics: Arc<PredictionMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<PredictionMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        // first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}
